//! # Dispatcher Module
//!
//! Request and response values that flow through middleware chains, the
//! outcome of each chain step and the errors a step can raise.
//!
//! ## Request Flow
//!
//! 1. The server parses the wire request into a [`Request`]
//! 2. Server-wide middleware runs in registration order
//! 3. Each router tries its routes in registration order; a matching route
//!    runs validation, its own middleware and finally its handler
//! 4. The first step that returns [`Flow::Respond`] ends the request
//! 5. A step that returns or panics into a [`RouteError`] skips the rest of the
//!    chain and goes to the error handlers instead
//!
//! Every user-supplied step is wrapped so that a panic is caught and surfaces
//! as [`RouteError::Panic`] on the error channel rather than taking down the
//! connection coroutine.

mod chain;
mod core;

pub(crate) use chain::{run_chain, Guarded};
pub use core::{Flow, Request, RequestPart, Response, RouteError};
