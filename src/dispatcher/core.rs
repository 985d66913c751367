use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

use crate::ids::RequestId;
use crate::route::ContentType;
use crate::schema::ValidationError;

/// Inbound request as seen by middleware and handlers.
///
/// `params`, `query` and `body` are JSON so that validation can replace them
/// with their transformed shapes. Header names are lower-case.
#[derive(Debug, Clone)]
pub struct Request {
    /// Unique request ID for tracing and correlation
    pub request_id: RequestId,
    pub method: http::Method,
    /// Path without the query string
    pub path: String,
    /// Path parameters, filled in when a route matches
    pub params: Value,
    pub query: Value,
    pub headers: HashMap<String, String>,
    /// Bytes read off the wire
    pub raw_body: Vec<u8>,
    /// Parsed body, `Null` until a body parser runs
    pub body: Value,
    /// Free-form values middleware can hand to later steps
    pub locals: Map<String, Value>,
}

impl Request {
    pub fn new(method: http::Method, path: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            path: path.into(),
            params: Value::Object(Map::new()),
            query: Value::Object(Map::new()),
            headers: HashMap::new(),
            raw_body: Vec::new(),
            body: Value::Null,
            locals: Map::new(),
        }
    }

    #[must_use]
    pub fn with_query(mut self, name: &str, value: &str) -> Self {
        if let Value::Object(query) = &mut self.query {
            query.insert(name.to_string(), Value::String(value.to_string()));
        }
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    /// Attach a raw body together with its `Content-Type`.
    #[must_use]
    pub fn with_body(mut self, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        self.raw_body = body.into();
        self.with_header("content-type", content_type)
    }

    /// Attach a JSON body, already parsed.
    #[must_use]
    pub fn with_json(mut self, body: &Value) -> Self {
        self.raw_body = body.to_string().into_bytes();
        self.body = body.clone();
        self.with_header("content-type", ContentType::ApplicationJson.as_str())
    }

    /// Header lookup (case-insensitive per RFC 7230).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }
}

/// Outbound response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    /// `None` sends no `Content-Type` header
    pub content_type: Option<ContentType>,
    pub body: Vec<u8>,
}

impl Response {
    #[must_use]
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            content_type: Some(ContentType::ApplicationJson),
            body: body.to_string().into_bytes(),
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some(ContentType::TextPlain),
            body: body.into().into_bytes(),
        }
    }

    pub fn html(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some(ContentType::TextHtml),
            body: body.into().into_bytes(),
        }
    }

    /// Encode a JSON value for the given media type.
    ///
    /// Strings are sent verbatim for text media types. A `Null` body with no
    /// media type produces an empty body.
    #[must_use]
    pub fn from_value(status: u16, content_type: Option<ContentType>, body: &Value) -> Self {
        match (content_type, body) {
            (None, Value::Null) => Self::empty(status),
            (Some(ct), Value::String(s)) if ct.is_text() => Self {
                status,
                content_type: Some(ct),
                body: s.clone().into_bytes(),
            },
            (None, other) => Self::json(status, other),
            (Some(ct), other) => Self {
                status,
                content_type: Some(ct),
                body: other.to_string().into_bytes(),
            },
        }
    }

    /// Error body shape used when no error handler answers.
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, &serde_json::json!({ "error": message }))
    }

    #[must_use]
    pub fn body_json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }

    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Outcome of one chain step.
#[derive(Debug)]
pub enum Flow {
    /// Continue with the next step
    Next,
    /// Stop and send this response
    Respond(Response),
}

/// Part of the request a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestPart {
    Params,
    Query,
    Headers,
    Body,
}

impl fmt::Display for RequestPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RequestPart::Params => "params",
            RequestPart::Query => "query",
            RequestPart::Headers => "headers",
            RequestPart::Body => "body",
        })
    }
}

/// Failure raised by a chain step.
#[derive(Debug)]
pub enum RouteError {
    /// A request part did not satisfy its schema
    Validation {
        part: RequestPart,
        error: ValidationError,
    },
    /// A middleware or handler returned an error
    Handler(anyhow::Error),
    /// A middleware or handler panicked
    Panic(String),
}

impl RouteError {
    #[must_use]
    pub fn validation(part: RequestPart, error: ValidationError) -> Self {
        RouteError::Validation { part, error }
    }

    /// Status used when no error handler produces a response.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            RouteError::Validation { .. } => 400,
            RouteError::Handler(_) | RouteError::Panic(_) => 500,
        }
    }
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::Validation { part, error } => write!(f, "invalid {part}: {error}"),
            RouteError::Handler(e) => write!(f, "handler error: {e}"),
            RouteError::Panic(msg) => write!(f, "handler panicked: {msg}"),
        }
    }
}

impl std::error::Error for RouteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouteError::Validation { error, .. } => Some(error),
            RouteError::Handler(e) => Some(&**e),
            RouteError::Panic(_) => None,
        }
    }
}

impl From<anyhow::Error> for RouteError {
    fn from(e: anyhow::Error) -> Self {
        RouteError::Handler(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let req = Request::new(http::Method::GET, "/").with_header("X-Token", "abc");
        assert_eq!(req.header("x-token"), Some("abc"));
        assert_eq!(req.header("X-TOKEN"), Some("abc"));
        assert_eq!(req.header("missing"), None);
    }

    #[test]
    fn test_text_response_sends_string_raw() {
        let res = Response::from_value(200, Some(ContentType::TextPlain), &json!("hi"));
        assert_eq!(res.body, b"hi".to_vec());
        let res = Response::from_value(200, Some(ContentType::ApplicationJson), &json!("hi"));
        assert_eq!(res.body, b"\"hi\"".to_vec());
    }

    #[test]
    fn test_error_status() {
        let v = RouteError::validation(RequestPart::Body, ValidationError::single("", "bad"));
        assert_eq!(v.status(), 400);
        assert_eq!(v.to_string(), "invalid body: validation failed: bad");
        assert_eq!(RouteError::from(anyhow::anyhow!("boom")).status(), 500);
        assert_eq!(RouteError::Panic("x".into()).status(), 500);
    }
}
