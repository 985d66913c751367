use std::time::Duration;
use tracing::info;

use super::Middleware;
use crate::dispatcher::{Flow, Request, Response, RouteError};

/// Logs each request on arrival and again with its status and latency.
///
/// The request ID is also stored in `locals["request_id"]` for handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn handle(&self, req: &mut Request) -> Result<Flow, RouteError> {
        info!(
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path,
            "Request received"
        );
        req.locals.insert(
            "request_id".to_string(),
            serde_json::Value::String(req.request_id.to_string()),
        );
        Ok(Flow::Next)
    }

    fn after(&self, req: &Request, res: &mut Response, latency: Duration) {
        info!(
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path,
            status = res.status,
            latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
            "Request completed"
        );
    }
}
