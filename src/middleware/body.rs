use serde_json::{Map, Value};
use tracing::debug;

use super::core::Middleware;
use crate::dispatcher::{Flow, Request, RequestPart, RouteError};
use crate::route::ContentType;
use crate::schema::ValidationError;

/// Decode a raw body according to its `Content-Type`.
///
/// JSON is parsed, text and HTML become strings and
/// `application/x-www-form-urlencoded` becomes an object of strings. Empty
/// bodies and unsupported media types (multipart included) decode to `None`.
///
/// # Errors
///
/// Returns a validation error when a JSON body is malformed.
pub fn decode_body(content_type: Option<&str>, raw: &[u8]) -> Result<Option<Value>, ValidationError> {
    if raw.is_empty() {
        return Ok(None);
    }
    let essence = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase());
    match essence.as_deref() {
        Some("application/x-www-form-urlencoded") => {
            let form: Map<String, Value> = url::form_urlencoded::parse(raw)
                .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
                .collect();
            Ok(Some(Value::Object(form)))
        }
        Some(ct) => match ContentType::from_header(ct) {
            Some(ContentType::ApplicationJson) => serde_json::from_slice(raw)
                .map(Some)
                .map_err(|e| ValidationError::single("", format!("malformed JSON body: {e}"))),
            Some(ContentType::TextPlain | ContentType::TextHtml) => {
                Ok(Some(Value::String(String::from_utf8_lossy(raw).into_owned())))
            }
            Some(ContentType::MultipartFormData) | None => Ok(None),
        },
        // No content type: accept JSON when it parses, otherwise leave it raw.
        None => Ok(serde_json::from_slice(raw).ok()),
    }
}

/// Server-wide step that fills [`Request::body`] from the raw bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BodyParser;

impl BodyParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for BodyParser {
    fn handle(&self, req: &mut Request) -> Result<Flow, RouteError> {
        if !req.body.is_null() {
            return Ok(Flow::Next);
        }
        let decoded = decode_body(req.content_type(), &req.raw_body)
            .map_err(|e| RouteError::validation(RequestPart::Body, e))?;
        if let Some(body) = decoded {
            debug!(
                request_id = %req.request_id,
                body_size_bytes = req.raw_body.len(),
                "Request body decoded"
            );
            req.body = body;
        }
        Ok(Flow::Next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_json() {
        let out = decode_body(Some("application/json; charset=utf-8"), br#"{"a":1}"#).unwrap();
        assert_eq!(out, Some(json!({ "a": 1 })));
    }

    #[test]
    fn test_decode_malformed_json_fails() {
        assert!(decode_body(Some("application/json"), b"{nope").is_err());
    }

    #[test]
    fn test_decode_text_and_form() {
        assert_eq!(
            decode_body(Some("text/plain"), b"hello").unwrap(),
            Some(json!("hello"))
        );
        assert_eq!(
            decode_body(Some("application/x-www-form-urlencoded"), b"a=1&b=two+words").unwrap(),
            Some(json!({ "a": "1", "b": "two words" }))
        );
    }

    #[test]
    fn test_empty_and_multipart_stay_unparsed() {
        assert_eq!(decode_body(Some("application/json"), b"").unwrap(), None);
        assert_eq!(decode_body(Some("multipart/form-data; boundary=x"), b"--x").unwrap(), None);
    }

    #[test]
    fn test_body_parser_fills_request() {
        let mut req = Request::new(http::Method::POST, "/").with_body("application/json", r#"[1,2]"#);
        assert!(matches!(BodyParser.handle(&mut req), Ok(Flow::Next)));
        assert_eq!(req.body, json!([1, 2]));
    }
}
