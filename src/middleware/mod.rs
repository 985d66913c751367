//! # Middleware Module
//!
//! Chain steps and error handlers.
//!
//! A [`Middleware`] inspects or mutates the request and either passes control
//! on, answers the request, or fails it with a [`RouteError`](crate::dispatcher::RouteError).
//! Failures go to the server's [`ErrorHandler`]s in registration order.
//!
//! Built-in steps:
//!
//! - [`ValidationMiddleware`] - validates and transforms body, params, query
//!   and headers against a route's declaration; installed by the router for
//!   every route
//! - [`BodyParser`] - decodes raw bodies by `Content-Type`
//! - [`TracingMiddleware`] - request logging and latency
//! - [`ProblemErrorHandler`] - JSON problem responses for failures

mod body;
mod core;
mod errors;
mod tracing;
mod validation;

pub use body::{decode_body, BodyParser};
pub use core::{error_handler_fn, from_fn, ErrorHandler, Middleware};
pub use errors::ProblemErrorHandler;
pub use tracing::TracingMiddleware;
pub use validation::{header_object, ValidationMiddleware};
