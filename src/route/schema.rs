use std::marker::PhantomData;
use std::sync::Arc;

use super::content::{Content, ContentType};
use super::spec::{ResponseDoc, RouteSpec};
use super::status::Code;
use crate::schema::SchemaType;
use crate::typed::{Cons, Declared, Slots, Status, Unset};

/// Typed route declaration builder.
///
/// The type parameters record what has been declared: `P`, `Q` and `H` for
/// params, query and headers, `B` for the body slots per media type and `R`
/// for the type-level list of responses. They are erased by
/// [`into_spec`](RouteSchema::into_spec) and only consulted by the type
/// projection in [`typed`](crate::typed).
pub struct RouteSchema<P = Unset, Q = Unset, H = Unset, B = Slots, R = crate::typed::Nil> {
    spec: RouteSpec,
    _types: PhantomData<fn() -> (P, Q, H, B, R)>,
}

impl RouteSchema {
    #[must_use]
    pub fn new() -> Self {
        Self {
            spec: RouteSpec::default(),
            _types: PhantomData,
        }
    }
}

impl Default for RouteSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, Q, H, B, R> Clone for RouteSchema<P, Q, H, B, R> {
    fn clone(&self) -> Self {
        Self {
            spec: self.spec.clone(),
            _types: PhantomData,
        }
    }
}

impl<P, Q, H, B, R> std::fmt::Debug for RouteSchema<P, Q, H, B, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RouteSchema").field(&self.spec).finish()
    }
}

impl<P, Q, H, B, R> RouteSchema<P, Q, H, B, R> {
    fn retype<P2, Q2, H2, B2, R2>(self) -> RouteSchema<P2, Q2, H2, B2, R2> {
        RouteSchema {
            spec: self.spec,
            _types: PhantomData,
        }
    }

    #[must_use]
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.spec.summary = Some(summary.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.spec.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.spec.operation_id = Some(operation_id.into());
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.spec.tags.push(tag.into());
        self
    }

    #[must_use]
    pub fn deprecated(mut self) -> Self {
        self.spec.deprecated = true;
        self
    }

    /// Declare the path parameter schema.
    #[must_use]
    pub fn params<S: SchemaType>(mut self, schema: S) -> RouteSchema<Declared<S::Output>, Q, H, B, R> {
        self.spec.request.params = Some(Arc::new(schema));
        self.retype()
    }

    /// Declare the query string schema.
    #[must_use]
    pub fn query<S: SchemaType>(mut self, schema: S) -> RouteSchema<P, Declared<S::Output>, H, B, R> {
        self.spec.request.query = Some(Arc::new(schema));
        self.retype()
    }

    /// Declare the header schema. Header names match case-insensitively.
    #[must_use]
    pub fn headers<S: SchemaType>(mut self, schema: S) -> RouteSchema<P, Q, Declared<S::Output>, B, R> {
        self.spec.request.headers = Some(Arc::new(schema));
        self.retype()
    }

    /// Declare a response for `code`.
    ///
    /// Declaring the same code twice replaces the documented entry; typed
    /// replies for that code then fail to resolve at compile time.
    #[must_use]
    pub fn response<const S: u16, C>(
        mut self,
        _code: Code<S>,
        response: ResponseSpec<C>,
    ) -> RouteSchema<P, Q, H, B, Cons<Status<S, C>, R>> {
        self.spec.responses.insert(S, response.doc);
        self.retype()
    }

    #[must_use]
    pub fn spec(&self) -> &RouteSpec {
        &self.spec
    }

    #[must_use]
    pub fn into_spec(self) -> RouteSpec {
        self.spec
    }
}

impl<P, Q, H, J, M, T, X, R> RouteSchema<P, Q, H, Slots<J, M, T, X>, R> {
    #[must_use]
    pub fn json_body<S: SchemaType>(
        mut self,
        schema: S,
    ) -> RouteSchema<P, Q, H, Slots<Declared<S::Output>, M, T, X>, R> {
        self.spec
            .request
            .body
            .insert(ContentType::ApplicationJson, Arc::new(schema));
        self.retype()
    }

    #[must_use]
    pub fn multipart_body<S: SchemaType>(
        mut self,
        schema: S,
    ) -> RouteSchema<P, Q, H, Slots<J, Declared<S::Output>, T, X>, R> {
        self.spec
            .request
            .body
            .insert(ContentType::MultipartFormData, Arc::new(schema));
        self.retype()
    }

    #[must_use]
    pub fn text_body<S: SchemaType>(
        mut self,
        schema: S,
    ) -> RouteSchema<P, Q, H, Slots<J, M, Declared<S::Output>, X>, R> {
        self.spec
            .request
            .body
            .insert(ContentType::TextPlain, Arc::new(schema));
        self.retype()
    }

    #[must_use]
    pub fn html_body<S: SchemaType>(
        mut self,
        schema: S,
    ) -> RouteSchema<P, Q, H, Slots<J, M, T, Declared<S::Output>>, R> {
        self.spec
            .request
            .body
            .insert(ContentType::TextHtml, Arc::new(schema));
        self.retype()
    }
}

/// One declared response: description plus typed media-type slots.
pub struct ResponseSpec<C = Slots> {
    doc: ResponseDoc,
    _content: PhantomData<fn() -> C>,
}

impl ResponseSpec {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            doc: ResponseDoc::new(description),
            _content: PhantomData,
        }
    }
}

impl<J, M, T, X> ResponseSpec<Slots<J, M, T, X>> {
    fn with<C2>(mut self, content_type: ContentType, schema: crate::schema::SchemaRef) -> ResponseSpec<C2> {
        self.doc.content.insert(content_type, schema);
        ResponseSpec {
            doc: self.doc,
            _content: PhantomData,
        }
    }

    #[must_use]
    pub fn json<S: SchemaType>(self, schema: S) -> ResponseSpec<Slots<Declared<S::Output>, M, T, X>> {
        self.with(ContentType::ApplicationJson, Arc::new(schema))
    }

    #[must_use]
    pub fn multipart<S: SchemaType>(self, schema: S) -> ResponseSpec<Slots<J, Declared<S::Output>, T, X>> {
        self.with(ContentType::MultipartFormData, Arc::new(schema))
    }

    #[must_use]
    pub fn text<S: SchemaType>(self, schema: S) -> ResponseSpec<Slots<J, M, Declared<S::Output>, X>> {
        self.with(ContentType::TextPlain, Arc::new(schema))
    }

    #[must_use]
    pub fn html<S: SchemaType>(self, schema: S) -> ResponseSpec<Slots<J, M, T, Declared<S::Output>>> {
        self.with(ContentType::TextHtml, Arc::new(schema))
    }

    #[must_use]
    pub fn content(&self) -> &Content {
        &self.doc.content
    }
}
