use std::sync::Arc;
use std::time::Duration;

use crate::dispatcher::{Flow, Request, Response, RouteError};

/// One step of a request chain.
pub trait Middleware: Send + Sync {
    fn handle(&self, req: &mut Request) -> Result<Flow, RouteError>;

    /// Called with the final response for server-wide middleware.
    fn after(&self, _req: &Request, _res: &mut Response, _latency: Duration) {}
}

impl<F> Middleware for F
where
    F: Fn(&mut Request) -> Result<Flow, RouteError> + Send + Sync,
{
    fn handle(&self, req: &mut Request) -> Result<Flow, RouteError> {
        self(req)
    }
}

/// Turn a closure into a shareable chain step.
pub fn from_fn<F>(f: F) -> Arc<dyn Middleware>
where
    F: Fn(&mut Request) -> Result<Flow, RouteError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Receives failures raised anywhere in a chain.
///
/// Returning `None` defers to the next handler; when none answers, the server
/// responds with the error's [`status`](RouteError::status).
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, err: &RouteError, req: &Request) -> Option<Response>;
}

impl<F> ErrorHandler for F
where
    F: Fn(&RouteError, &Request) -> Option<Response> + Send + Sync,
{
    fn handle(&self, err: &RouteError, req: &Request) -> Option<Response> {
        self(err, req)
    }
}

pub fn error_handler_fn<F>(f: F) -> Arc<dyn ErrorHandler>
where
    F: Fn(&RouteError, &Request) -> Option<Response> + Send + Sync + 'static,
{
    Arc::new(f)
}
