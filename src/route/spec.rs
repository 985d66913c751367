use std::collections::BTreeMap;
use std::fmt;

use super::content::{Content, ContentType};
use crate::schema::SchemaRef;

/// Schemas for the inbound parts of a request.
///
/// An absent schema means the part is neither validated nor documented.
#[derive(Clone, Default)]
pub struct RequestSpec {
    pub params: Option<SchemaRef>,
    pub query: Option<SchemaRef>,
    pub headers: Option<SchemaRef>,
    pub body: Content,
}

impl fmt::Debug for RequestSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSpec")
            .field("params", &self.params.is_some())
            .field("query", &self.query.is_some())
            .field("headers", &self.headers.is_some())
            .field("body", &self.body)
            .finish()
    }
}

/// One documented response: a description plus zero or more media types.
#[derive(Debug, Clone, Default)]
pub struct ResponseDoc {
    pub description: String,
    pub content: Content,
}

impl ResponseDoc {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            content: Content::new(),
        }
    }
}

/// Type-erased route declaration.
///
/// This is what the router stores, what validation reads and what the
/// document generator walks. [`RouteSchema`](super::RouteSchema) produces one,
/// or it can be assembled by hand for routes that need no static typing.
#[derive(Debug, Clone, Default)]
pub struct RouteSpec {
    pub summary: Option<String>,
    pub operation_id: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub deprecated: bool,
    pub request: RequestSpec,
    /// Keyed by HTTP status code
    pub responses: BTreeMap<u16, ResponseDoc>,
}

impl RouteSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    #[must_use]
    pub fn params(mut self, schema: SchemaRef) -> Self {
        self.request.params = Some(schema);
        self
    }

    #[must_use]
    pub fn query(mut self, schema: SchemaRef) -> Self {
        self.request.query = Some(schema);
        self
    }

    #[must_use]
    pub fn headers(mut self, schema: SchemaRef) -> Self {
        self.request.headers = Some(schema);
        self
    }

    #[must_use]
    pub fn body(mut self, content_type: ContentType, schema: SchemaRef) -> Self {
        self.request.body.insert(content_type, schema);
        self
    }

    #[must_use]
    pub fn response(mut self, status: u16, response: ResponseDoc) -> Self {
        self.responses.insert(status, response);
        self
    }
}
