use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use super::body::decode_body;
use super::core::Middleware;
use crate::dispatcher::{Flow, Request, RequestPart, RouteError};
use crate::route::RouteSpec;
use crate::schema::{align_object_keys, coerce_object, Schema};

/// Header object presented to a header schema: keys aligned to the declared
/// spelling and values coerced to the declared types.
#[must_use]
pub fn header_object(headers: &HashMap<String, String>, doc: Option<&Value>) -> Value {
    let aligned = align_object_keys(headers, doc);
    match doc {
        Some(doc) => coerce_object(&aligned, doc),
        None => aligned,
    }
}

/// Validates a matched request against its route declaration.
///
/// Parts are checked in a fixed order: body, params, query, headers. Each
/// schema's output replaces the inbound part so later steps see the
/// transformed value. Headers are checked but left as received. The first
/// failing part ends the chain with [`RouteError::Validation`].
pub struct ValidationMiddleware {
    spec: Arc<RouteSpec>,
    params_doc: Option<Value>,
    query_doc: Option<Value>,
    headers_doc: Option<Value>,
}

impl ValidationMiddleware {
    pub fn new(spec: Arc<RouteSpec>) -> Self {
        let describe = |s: &Option<crate::schema::SchemaRef>| s.as_ref().map(|s| s.describe());
        Self {
            params_doc: describe(&spec.request.params),
            query_doc: describe(&spec.request.query),
            headers_doc: describe(&spec.request.headers),
            spec,
        }
    }

    fn reject(req: &Request, part: RequestPart, error: crate::schema::ValidationError) -> RouteError {
        warn!(
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path,
            part = %part,
            issues = error.issues.len(),
            error = %error,
            "Request validation failed"
        );
        RouteError::validation(part, error)
    }

    fn validate_body(&self, req: &mut Request) -> Result<(), RouteError> {
        let Some((content_type, schema)) = self.spec.request.body.select(req.content_type()) else {
            return Ok(());
        };
        if req.body.is_null() {
            match decode_body(req.content_type(), &req.raw_body) {
                Ok(Some(body)) => req.body = body,
                Ok(None) => {}
                Err(e) => return Err(Self::reject(req, RequestPart::Body, e)),
            }
        }
        tracing::debug!(
            request_id = %req.request_id,
            content_type = %content_type,
            "Validating request body"
        );
        match schema.validate(&req.body) {
            Ok(body) => {
                req.body = body;
                Ok(())
            }
            Err(e) => Err(Self::reject(req, RequestPart::Body, e)),
        }
    }

    fn validate_object(
        req: &Request,
        part: RequestPart,
        schema: &dyn Schema,
        input: &Value,
        doc: Option<&Value>,
    ) -> Result<Value, RouteError> {
        let coerced = match doc {
            Some(doc) => coerce_object(input, doc),
            None => input.clone(),
        };
        schema
            .validate(&coerced)
            .map_err(|e| Self::reject(req, part, e))
    }
}

impl Middleware for ValidationMiddleware {
    fn handle(&self, req: &mut Request) -> Result<Flow, RouteError> {
        self.validate_body(req)?;

        if let Some(schema) = &self.spec.request.params {
            req.params = Self::validate_object(
                req,
                RequestPart::Params,
                schema.as_ref(),
                &req.params,
                self.params_doc.as_ref(),
            )?;
        }

        if let Some(schema) = &self.spec.request.query {
            req.query = Self::validate_object(
                req,
                RequestPart::Query,
                schema.as_ref(),
                &req.query,
                self.query_doc.as_ref(),
            )?;
        }

        if let Some(schema) = &self.spec.request.headers {
            let headers = header_object(&req.headers, self.headers_doc.as_ref());
            schema
                .validate(&headers)
                .map_err(|e| Self::reject(req, RequestPart::Headers, e))?;
        }

        Ok(Flow::Next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::ContentType;
    use crate::schema::{JsonSchema, SchemaExt};
    use serde_json::json;

    fn json_schema(doc: Value) -> crate::schema::SchemaRef {
        Arc::new(JsonSchema::new(doc).unwrap())
    }

    fn run(spec: RouteSpec, req: &mut Request) -> Result<Flow, RouteError> {
        ValidationMiddleware::new(Arc::new(spec)).handle(req)
    }

    #[test]
    fn test_params_are_coerced_and_replaced() {
        let spec = RouteSpec::new().params(json_schema(json!({
            "type": "object",
            "properties": { "id": { "type": "integer" } },
            "required": ["id"]
        })));
        let mut req = Request::new(http::Method::GET, "/pets/7");
        req.params = json!({ "id": "7" });
        run(spec, &mut req).unwrap();
        assert_eq!(req.params, json!({ "id": 7 }));
    }

    #[test]
    fn test_transform_output_replaces_query() {
        let upper = JsonSchema::new(json!({ "type": "object" }))
            .unwrap()
            .transform(|v| match v {
                Value::Object(m) => Value::Object(
                    m.into_iter()
                        .map(|(k, v)| (k, Value::String(v.as_str().unwrap_or_default().to_uppercase())))
                        .collect(),
                ),
                other => other,
            });
        let spec = RouteSpec::new().query(Arc::new(upper));
        let mut req = Request::new(http::Method::GET, "/").with_query("name", "rex");
        run(spec, &mut req).unwrap();
        assert_eq!(req.query, json!({ "name": "REX" }));
    }

    #[test]
    fn test_body_checked_before_params() {
        let spec = RouteSpec::new()
            .params(json_schema(json!({ "type": "object", "required": ["id"] })))
            .body(ContentType::ApplicationJson, json_schema(json!({ "type": "object" })));
        let mut req = Request::new(http::Method::POST, "/").with_json(&json!([1]));
        match run(spec, &mut req) {
            Err(RouteError::Validation { part, .. }) => assert_eq!(part, RequestPart::Body),
            other => panic!("expected body validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_body_parsed_when_raw() {
        let spec = RouteSpec::new().body(
            ContentType::ApplicationJson,
            json_schema(json!({ "type": "object", "required": ["name"] })),
        );
        let mut req = Request::new(http::Method::POST, "/").with_body("application/json", r#"{"name":"rex"}"#);
        run(spec, &mut req).unwrap();
        assert_eq!(req.body, json!({ "name": "rex" }));
    }

    #[test]
    fn test_body_schema_selected_by_content_type() {
        let spec = RouteSpec::new()
            .body(ContentType::ApplicationJson, json_schema(json!({ "type": "object" })))
            .body(ContentType::TextPlain, json_schema(json!({ "type": "string", "minLength": 3 })));
        let mut req = Request::new(http::Method::POST, "/").with_body("text/plain", "hello");
        run(spec.clone(), &mut req).unwrap();
        assert_eq!(req.body, json!("hello"));

        let mut short = Request::new(http::Method::POST, "/").with_body("text/plain", "hi");
        assert!(run(spec, &mut short).is_err());
    }

    #[test]
    fn test_headers_validated_but_untouched() {
        let spec = RouteSpec::new().headers(json_schema(json!({
            "type": "object",
            "properties": { "X-Limit": { "type": "integer", "maximum": 10 } },
            "required": ["X-Limit"]
        })));
        let mut req = Request::new(http::Method::GET, "/").with_header("x-limit", "5");
        run(spec.clone(), &mut req).unwrap();
        assert_eq!(req.header("x-limit"), Some("5"));

        let mut too_big = Request::new(http::Method::GET, "/").with_header("X-Limit", "50");
        match run(spec.clone(), &mut too_big) {
            Err(RouteError::Validation { part, .. }) => assert_eq!(part, RequestPart::Headers),
            other => panic!("expected header validation error, got {other:?}"),
        }

        let mut missing = Request::new(http::Method::GET, "/");
        assert!(run(spec, &mut missing).is_err());
    }

    #[test]
    fn test_undeclared_parts_pass() {
        let mut req = Request::new(http::Method::GET, "/").with_query("anything", "goes");
        assert!(matches!(run(RouteSpec::new(), &mut req), Ok(Flow::Next)));
        assert_eq!(req.query, json!({ "anything": "goes" }));
    }
}
