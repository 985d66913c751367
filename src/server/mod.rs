//! # Server Module
//!
//! The [`Server`] aggregates routers, holds server-wide middleware and error
//! handlers, and serves HTTP through `may_minihttp` on the `may` coroutine
//! runtime.
//!
//! Requests go through server-wide middleware first, then each router in the
//! order added. A request no route answers gets a JSON `404`. Failures from
//! any step are passed to the error handlers in order; if none answers, the
//! response carries the error's status (`400` for validation, `500`
//! otherwise).

mod core;
mod http_server;
mod request;
mod response;
mod service;

pub use core::{Server, ServerError};
pub use http_server::ServerHandle;
pub use request::{build_request, parse_query};
