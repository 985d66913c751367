use serde_json::json;
use tracing::error;

use super::core::ErrorHandler;
use crate::dispatcher::{Request, Response, RouteError};

/// Answers every failure with a JSON problem body.
///
/// Validation failures become `400 {"message", "part", "errors"}`; anything
/// else becomes `500 {"message"}` and is logged, since the detail is not sent
/// to the client.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProblemErrorHandler;

impl ErrorHandler for ProblemErrorHandler {
    fn handle(&self, err: &RouteError, req: &Request) -> Option<Response> {
        match err {
            RouteError::Validation { part, error } => Some(Response::json(
                400,
                &json!({
                    "message": format!("invalid request {part}"),
                    "part": part,
                    "errors": error.issues,
                }),
            )),
            RouteError::Handler(_) | RouteError::Panic(_) => {
                error!(
                    request_id = %req.request_id,
                    method = %req.method,
                    path = %req.path,
                    error = %err,
                    "Request failed"
                );
                Some(Response::json(
                    err.status(),
                    &json!({ "message": "internal server error" }),
                ))
            }
        }
    }
}
