use std::fmt;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::http_server::{HttpServer, ServerHandle};
use super::service::AppService;
use crate::dispatcher::{run_chain, Guarded, Request, Response, RouteError};
use crate::middleware::{ErrorHandler, Middleware};
use crate::router::{Router, RouterRoute};
use crate::runtime_config::RuntimeConfig;

#[derive(Debug)]
pub enum ServerError {
    /// Middleware, error handlers and routers can only be added before `listen`
    RegistrationClosed,
    /// `listen` was called while already listening
    AlreadyListening,
    Io(io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::RegistrationClosed => {
                write!(f, "registration is closed once the server has started listening")
            }
            ServerError::AlreadyListening => write!(f, "server is already listening"),
            ServerError::Io(e) => write!(f, "listener error: {e}"),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ServerError {
    fn from(e: io::Error) -> Self {
        ServerError::Io(e)
    }
}

/// Everything a request passes through, frozen when the server listens.
#[derive(Clone, Default)]
pub(crate) struct Pipeline {
    middlewares: Vec<Arc<dyn Middleware>>,
    error_handlers: Vec<Arc<dyn ErrorHandler>>,
    routers: Vec<Router>,
}

impl Pipeline {
    fn route(&self, req: &mut Request) -> Result<Option<Response>, RouteError> {
        if let Some(res) = run_chain(&self.middlewares, req)? {
            return Ok(Some(res));
        }
        for router in &self.routers {
            if let Some(res) = router.dispatch(req)? {
                return Ok(Some(res));
            }
        }
        Ok(None)
    }

    fn handle_error(&self, err: &RouteError, req: &Request) -> Response {
        for (idx, handler) in self.error_handlers.iter().enumerate() {
            match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(err, req))) {
                Ok(Some(res)) => return res,
                Ok(None) => {}
                Err(_) => {
                    error!(
                        request_id = %req.request_id,
                        error_handler = idx,
                        "Error handler panicked"
                    );
                }
            }
        }
        debug!(request_id = %req.request_id, error = %err, "No error handler answered");
        Response::error(err.status(), &err.to_string())
    }

    /// Run a request through middleware, routers and error handlers.
    pub(crate) fn handle(&self, mut req: Request) -> Response {
        let start = Instant::now();
        let mut response = match self.route(&mut req) {
            Ok(Some(res)) => res,
            Ok(None) => {
                warn!(
                    request_id = %req.request_id,
                    method = %req.method,
                    path = %req.path,
                    "No route matched"
                );
                Response::json(
                    404,
                    &serde_json::json!({
                        "error": "Not Found",
                        "method": req.method.as_str(),
                        "path": req.path,
                    }),
                )
            }
            Err(err) => self.handle_error(&err, &req),
        };
        let latency = start.elapsed();
        for mw in &self.middlewares {
            mw.after(&req, &mut response, latency);
        }
        response
    }
}

/// Aggregates routers, runs server-wide middleware and listens for HTTP.
///
/// Registration (`use_*`) is open until [`listen`](Server::listen); after
/// that the pipeline is frozen and further registration fails with
/// [`ServerError::RegistrationClosed`].
pub struct Server {
    config: RuntimeConfig,
    pipeline: Pipeline,
    routes: Vec<RouterRoute>,
    handle: Option<ServerHandle>,
    sealed: bool,
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

impl Server {
    /// Server configured from the environment.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::from_env())
    }

    #[must_use]
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            config,
            pipeline: Pipeline::default(),
            routes: Vec::new(),
            handle: None,
            sealed: false,
        }
    }

    fn ensure_open(&self) -> Result<(), ServerError> {
        if self.sealed {
            Err(ServerError::RegistrationClosed)
        } else {
            Ok(())
        }
    }

    /// Append server-wide middleware; it runs before any router.
    ///
    /// # Errors
    ///
    /// [`ServerError::RegistrationClosed`] after `listen`.
    pub fn use_middleware(&mut self, middleware: Arc<dyn Middleware>) -> Result<&mut Self, ServerError> {
        self.ensure_open()?;
        self.pipeline.middlewares.push(Guarded::wrap(middleware));
        Ok(self)
    }

    /// Append an error handler; handlers are consulted in order.
    ///
    /// # Errors
    ///
    /// [`ServerError::RegistrationClosed`] after `listen`.
    pub fn use_error_handler(&mut self, handler: Arc<dyn ErrorHandler>) -> Result<&mut Self, ServerError> {
        self.ensure_open()?;
        self.pipeline.error_handlers.push(handler);
        Ok(self)
    }

    /// Append routers and their routes to the aggregate.
    ///
    /// Routes keep their order, and routers are consulted in the order they
    /// were added. The same method and path in two routers is allowed; the
    /// earlier router answers first.
    ///
    /// # Errors
    ///
    /// [`ServerError::RegistrationClosed`] after `listen`.
    pub fn use_routers<I>(&mut self, routers: I) -> Result<&mut Self, ServerError>
    where
        I: IntoIterator<Item = Router>,
    {
        self.ensure_open()?;
        for router in routers {
            for route in router.routes() {
                if self.routes.iter().any(|r| r.key() == route.key()) {
                    warn!(
                        method = %route.method,
                        path = %route.path,
                        "Route registered by more than one router"
                    );
                }
                self.routes.push(route.clone());
            }
            self.pipeline.routers.push(router);
        }
        Ok(self)
    }

    /// Every route from every router, in the order they were added.
    #[must_use]
    pub fn routes(&self) -> &[RouterRoute] {
        &self.routes
    }

    /// Run one request through the pipeline in-process.
    #[must_use]
    pub fn dispatch(&self, req: Request) -> Response {
        self.pipeline.handle(req)
    }

    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.handle.is_some()
    }

    /// Start accepting HTTP connections and close registration.
    ///
    /// Port `0` picks a free port; the bound address is returned.
    ///
    /// # Errors
    ///
    /// [`ServerError::AlreadyListening`] if already running, or
    /// [`ServerError::Io`] if the address cannot be bound.
    pub fn listen<A: ToSocketAddrs>(&mut self, addr: A) -> Result<SocketAddr, ServerError> {
        if self.handle.is_some() {
            return Err(ServerError::AlreadyListening);
        }
        self.config.apply();
        self.sealed = true;

        let service = AppService::new(Arc::new(self.pipeline.clone()));
        let handle = HttpServer(service).start(addr)?;
        handle.wait_ready()?;
        let bound = handle.addr();
        info!(
            addr = %bound,
            routes = self.routes.len(),
            routers = self.pipeline.routers.len(),
            stack_size = self.config.stack_size,
            "Server listening"
        );
        self.handle = Some(handle);
        Ok(bound)
    }

    /// Stop listening. Does nothing if the server never started.
    pub fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            let addr = handle.addr();
            handle.stop();
            info!(addr = %addr, "Server closed");
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Flow;
    use crate::middleware::{error_handler_fn, from_fn};
    use crate::route::{Method, RouteSpec};
    use serde_json::json;

    fn router_with(path: &str, body: &'static str) -> Router {
        let mut router = Router::new();
        router
            .register(
                Method::Get,
                path,
                Arc::new(RouteSpec::new()),
                vec![],
                vec![from_fn(move |_req: &mut Request| {
                    Ok(Flow::Respond(Response::text(200, body)))
                })],
            )
            .unwrap();
        router
    }

    #[test]
    fn test_routes_aggregate_in_order() {
        let mut server = Server::with_config(RuntimeConfig::default());
        server
            .use_routers([router_with("/a", "a"), router_with("/b", "b")])
            .unwrap()
            .use_routers([router_with("/c", "c")])
            .unwrap();
        let paths: Vec<&str> = server.routes().iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, ["/a", "/b", "/c"]);
    }

    #[test]
    fn test_overlapping_routers_first_wins() {
        let mut server = Server::with_config(RuntimeConfig::default());
        server
            .use_routers([router_with("/x", "first"), router_with("/x", "second")])
            .unwrap();
        assert_eq!(server.routes().len(), 2);
        let res = server.dispatch(Request::new(http::Method::GET, "/x"));
        assert_eq!(res.body_text(), "first");
    }

    #[test]
    fn test_unmatched_is_404() {
        let server = Server::with_config(RuntimeConfig::default());
        let res = server.dispatch(Request::new(http::Method::GET, "/nowhere"));
        assert_eq!(res.status, 404);
    }

    #[test]
    fn test_global_middleware_can_answer() {
        let mut server = Server::with_config(RuntimeConfig::default());
        server
            .use_middleware(from_fn(|_req: &mut Request| {
                Ok(Flow::Respond(Response::text(503, "maintenance")))
            }))
            .unwrap()
            .use_routers([router_with("/a", "a")])
            .unwrap();
        let res = server.dispatch(Request::new(http::Method::GET, "/a"));
        assert_eq!(res.status, 503);
    }

    #[test]
    fn test_error_handlers_run_in_order() {
        let mut server = Server::with_config(RuntimeConfig::default());
        server
            .use_middleware(from_fn(|_req: &mut Request| {
                Err(RouteError::from(anyhow::anyhow!("nope")))
            }))
            .unwrap()
            .use_error_handler(error_handler_fn(|_err: &RouteError, _req: &Request| None))
            .unwrap()
            .use_error_handler(error_handler_fn(|err: &RouteError, _req: &Request| {
                Some(Response::json(418, &json!({ "seen": err.to_string() })))
            }))
            .unwrap();
        let res = server.dispatch(Request::new(http::Method::GET, "/"));
        assert_eq!(res.status, 418);
        assert_eq!(res.body_json().unwrap()["seen"], "handler error: nope");
    }

    #[test]
    fn test_fallback_error_response_uses_status() {
        let mut server = Server::with_config(RuntimeConfig::default());
        server
            .use_middleware(from_fn(|_req: &mut Request| -> Result<Flow, RouteError> {
                panic!("middleware blew up")
            }))
            .unwrap();
        let res = server.dispatch(Request::new(http::Method::GET, "/"));
        assert_eq!(res.status, 500);
    }

    #[test]
    fn test_close_without_listen_is_noop() {
        let mut server = Server::with_config(RuntimeConfig::default());
        server.close();
        assert!(!server.is_listening());
        assert!(server.use_routers([router_with("/a", "a")]).is_ok());
    }
}
