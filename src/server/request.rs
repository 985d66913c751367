use may_minihttp::Request as WireRequest;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::Read;
use tracing::{debug, warn};

use crate::dispatcher::{Request, Response};
use crate::ids::RequestId;

/// Parse a query string into an object of strings; later duplicates win.
#[must_use]
pub fn parse_query(query: &str) -> Value {
    let pairs: Map<String, Value> = url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
        .collect();
    Value::Object(pairs)
}

/// Build a pipeline request from its wire parts.
///
/// # Errors
///
/// Returns a ready `400` response when the method token is not valid HTTP.
pub fn build_request(
    method: &str,
    target: &str,
    headers: HashMap<String, String>,
    raw_body: Vec<u8>,
) -> Result<Request, Response> {
    let method = http::Method::from_bytes(method.as_bytes())
        .map_err(|_| Response::error(400, "invalid method"))?;
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, query),
        None => (target, ""),
    };
    let mut request = Request::new(method, if path.is_empty() { "/" } else { path });
    request.request_id = RequestId::from_header_or_new(headers.get("x-request-id").map(String::as_str));
    request.query = parse_query(query);
    request.headers = headers;
    request.raw_body = raw_body;
    Ok(request)
}

/// Read everything the pipeline needs from a `may_minihttp` request.
pub(crate) fn parse_request(req: WireRequest) -> Result<Request, Response> {
    let method = req.method().to_string();
    let target = req.path().to_string();
    let headers: HashMap<String, String> = req
        .headers()
        .iter()
        .map(|h| {
            (
                h.name.to_ascii_lowercase(),
                String::from_utf8_lossy(h.value).into_owned(),
            )
        })
        .collect();
    debug!(
        method = %method,
        target = %target,
        header_count = headers.len(),
        "Headers extracted"
    );

    let mut raw_body = Vec::new();
    if let Err(e) = req.body().read_to_end(&mut raw_body) {
        warn!(error = %e, "Request body could not be read");
        return Err(Response::error(400, "unreadable request body"));
    }

    build_request(&method, &target, headers, raw_body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_query_decodes() {
        assert_eq!(
            parse_query("limit=10&name=a%20b&limit=20"),
            json!({ "limit": "20", "name": "a b" })
        );
        assert_eq!(parse_query(""), json!({}));
    }

    #[test]
    fn test_build_request_splits_target() {
        let req = build_request("GET", "/pets?limit=5", HashMap::new(), Vec::new()).unwrap();
        assert_eq!(req.method, http::Method::GET);
        assert_eq!(req.path, "/pets");
        assert_eq!(req.query, json!({ "limit": "5" }));
        assert!(req.body.is_null());
    }

    #[test]
    fn test_build_request_keeps_request_id_header() {
        let id = RequestId::new();
        let mut headers = HashMap::new();
        headers.insert("x-request-id".to_string(), id.to_string());
        let req = build_request("GET", "/", headers, Vec::new()).unwrap();
        assert_eq!(req.request_id, id);
    }

    #[test]
    fn test_build_request_rejects_bad_method() {
        let res = build_request("G E T", "/", HashMap::new(), Vec::new()).unwrap_err();
        assert_eq!(res.status, 400);
    }
}
