use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error};

use super::core::{Flow, Request, Response, RouteError};
use crate::middleware::Middleware;

/// Chain step wrapper that turns a panic into [`RouteError::Panic`].
pub(crate) struct Guarded {
    inner: Arc<dyn Middleware>,
}

impl Guarded {
    pub(crate) fn wrap(inner: Arc<dyn Middleware>) -> Arc<dyn Middleware> {
        Arc::new(Self { inner })
    }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}

impl Middleware for Guarded {
    fn handle(&self, req: &mut Request) -> Result<Flow, RouteError> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.inner.handle(req))) {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(
                    request_id = %req.request_id,
                    path = %req.path,
                    panic = %message,
                    "Chain step panicked"
                );
                Err(RouteError::Panic(message))
            }
        }
    }

    fn after(&self, req: &Request, res: &mut Response, latency: std::time::Duration) {
        if panic::catch_unwind(AssertUnwindSafe(|| self.inner.after(req, res, latency))).is_err() {
            error!(request_id = %req.request_id, "Middleware after hook panicked");
        }
    }
}

/// Run steps in order until one responds or fails.
///
/// `Ok(None)` means every step passed control on.
pub(crate) fn run_chain(
    steps: &[Arc<dyn Middleware>],
    req: &mut Request,
) -> Result<Option<Response>, RouteError> {
    for (idx, step) in steps.iter().enumerate() {
        match step.handle(req)? {
            Flow::Next => {}
            Flow::Respond(res) => {
                debug!(
                    request_id = %req.request_id,
                    step = idx,
                    status = res.status,
                    "Chain step responded"
                );
                return Ok(Some(res));
            }
        }
    }
    Ok(None)
}
