use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::path::{normalize_path, PathMatcher};
use crate::dispatcher::{run_chain, Guarded, Request, Response, RouteError};
use crate::middleware::{Middleware, ValidationMiddleware};
use crate::route::{Method, RouteSpec};
use crate::typed::{ReplyFor, RequestFor, RouteContract, TypedHandler};

/// Per-method shorthands for [`Router::route`]: `get(path, schema, handler)`
/// and `get_with(path, schema, middlewares, handler)`, and so on.
macro_rules! verb_helpers {
    ($($plain:ident, $with:ident => $method:ident;)*) => {
        $(
            #[doc = concat!("Register a typed `", stringify!($method), "` route.")]
            ///
            /// # Errors
            ///
            /// Same as [`register`](Router::register).
            pub fn $plain<S, F>(&mut self, path: &str, schema: S, handler: F) -> Result<&mut Self, RouterError>
            where
                S: RouteContract + 'static,
                F: Fn(RequestFor<S>) -> anyhow::Result<ReplyFor<S>> + Send + Sync + 'static,
            {
                self.route(Method::$method, path, schema, Vec::new(), handler)
            }

            #[doc = concat!("Register a typed `", stringify!($method), "` route with route-level middleware.")]
            ///
            /// # Errors
            ///
            /// Same as [`register`](Router::register).
            pub fn $with<S, F>(
                &mut self,
                path: &str,
                schema: S,
                middlewares: Vec<Arc<dyn Middleware>>,
                handler: F,
            ) -> Result<&mut Self, RouterError>
            where
                S: RouteContract + 'static,
                F: Fn(RequestFor<S>) -> anyhow::Result<ReplyFor<S>> + Send + Sync + 'static,
            {
                self.route(Method::$method, path, schema, middlewares, handler)
            }
        )*
    };
}

/// A registered route: method, path template and its declaration.
#[derive(Debug, Clone)]
pub struct RouterRoute {
    pub method: Method,
    /// Path template as registered, e.g. `/pets/:id`
    pub path: String,
    pub schema: Arc<RouteSpec>,
}

impl RouterRoute {
    /// Identity used for duplicate detection.
    #[must_use]
    pub fn key(&self) -> (Method, String) {
        (self.method, normalize_path(&self.path))
    }
}

#[derive(Debug)]
pub enum RouterError {
    /// The same method and path were registered twice on one router
    DuplicateRoute { method: Method, path: String },
    /// The path template could not be compiled
    InvalidPath { path: String, reason: String },
}

impl RouterError {
    pub(crate) fn invalid(path: &str, reason: impl Into<String>) -> Self {
        RouterError::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::DuplicateRoute { method, path } => {
                write!(f, "route {method} {path} is already registered")
            }
            RouterError::InvalidPath { path, reason } => write!(f, "invalid path `{path}`: {reason}"),
        }
    }
}

impl std::error::Error for RouterError {}

#[derive(Clone)]
struct CompiledRoute {
    method: Method,
    matcher: PathMatcher,
    chain: Vec<Arc<dyn Middleware>>,
}

/// A group of routes with their middleware chains.
///
/// Routes are tried in registration order; the first one whose method and
/// path match and whose chain responds answers the request.
#[derive(Clone, Default)]
pub struct Router {
    routes: Vec<RouterRoute>,
    compiled: Vec<CompiledRoute>,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route with an erased declaration and raw chain steps.
    ///
    /// The chain that runs for a match is: validation against `schema`, then
    /// `middlewares`, then `handlers`. Every step, validation included, is
    /// guarded so that a panic in a schema or handler reaches the error
    /// handlers.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::DuplicateRoute`] if `method` and `path` are
    /// already registered here, or [`RouterError::InvalidPath`] if the path
    /// template is malformed.
    pub fn register(
        &mut self,
        method: Method,
        path: &str,
        schema: Arc<RouteSpec>,
        middlewares: Vec<Arc<dyn Middleware>>,
        handlers: Vec<Arc<dyn Middleware>>,
    ) -> Result<&mut Self, RouterError> {
        let route = RouterRoute {
            method,
            path: path.to_string(),
            schema,
        };
        if self.routes.iter().any(|r| r.key() == route.key()) {
            error!(method = %method, path = %path, "Duplicate route registration");
            return Err(RouterError::DuplicateRoute {
                method,
                path: path.to_string(),
            });
        }
        let matcher = PathMatcher::compile(path)?;

        let mut chain: Vec<Arc<dyn Middleware>> =
            Vec::with_capacity(1 + middlewares.len() + handlers.len());
        let validation: Arc<dyn Middleware> =
            Arc::new(ValidationMiddleware::new(Arc::clone(&route.schema)));
        chain.extend(
            std::iter::once(validation)
                .chain(middlewares)
                .chain(handlers)
                .map(Guarded::wrap),
        );

        info!(
            method = %method,
            path = %path,
            params = ?matcher.param_names(),
            steps = chain.len(),
            "Route registered"
        );

        self.compiled.push(CompiledRoute {
            method,
            matcher,
            chain,
        });
        self.routes.push(route);
        Ok(self)
    }

    /// Register a route whose handler receives projected types.
    ///
    /// # Errors
    ///
    /// Same as [`register`](Router::register).
    pub fn route<S, F>(
        &mut self,
        method: Method,
        path: &str,
        schema: S,
        middlewares: Vec<Arc<dyn Middleware>>,
        handler: F,
    ) -> Result<&mut Self, RouterError>
    where
        S: RouteContract + 'static,
        F: Fn(RequestFor<S>) -> anyhow::Result<ReplyFor<S>> + Send + Sync + 'static,
    {
        let spec = Arc::new(schema.into_spec());
        let handler: Arc<dyn Middleware> = Arc::new(TypedHandler::<S, F>::new(&spec, handler));
        self.register(method, path, spec, middlewares, vec![handler])
    }

    verb_helpers! {
        get, get_with => Get;
        post, post_with => Post;
        put, put_with => Put;
        patch, patch_with => Patch;
        delete, delete_with => Delete;
        options, options_with => Options;
        head, head_with => Head;
        trace, trace_with => Trace;
    }

    /// Routes in registration order.
    #[must_use]
    pub fn routes(&self) -> &[RouterRoute] {
        &self.routes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Try each matching route in order.
    ///
    /// Each attempt runs on a copy of `req`, so a chain that passes control
    /// on leaves no trace for the next route.
    pub(crate) fn dispatch(&self, req: &Request) -> Result<Option<Response>, RouteError> {
        for (route, compiled) in self.routes.iter().zip(&self.compiled) {
            if !compiled.method.matches(&req.method) {
                continue;
            }
            let Some(params) = compiled.matcher.matches(&req.path) else {
                continue;
            };
            debug!(
                request_id = %req.request_id,
                method = %req.method,
                path = %req.path,
                route_pattern = %route.path,
                "Route matched"
            );
            let mut attempt = req.clone();
            attempt.params = serde_json::Value::Object(params);
            if let Some(res) = run_chain(&compiled.chain, &mut attempt)? {
                return Ok(Some(res));
            }
        }
        Ok(None)
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router").field("routes", &self.routes).finish()
    }
}
