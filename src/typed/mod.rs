//! # Typed Module
//!
//! Compile-time projection from a route declaration to handler types.
//!
//! A [`RouteSchema`](crate::route::RouteSchema) carries marker types for each
//! declared part. This module turns those markers into the concrete types a
//! handler sees:
//!
//! | Declared part | Projected type when declared | Fallback |
//! |---------------|------------------------------|----------|
//! | params        | schema output                | [`Dictionary`] |
//! | query         | schema output                | [`Dictionary`] |
//! | headers       | schema output                | [`Dictionary`] |
//! | body          | output of the highest priority media type | [`Unknown`] |
//!
//! Responses become a type-level list keyed by status code, so
//! [`Reply::new`] only accepts a status the route declared together with the
//! body type declared for it. Everything here is erased at runtime; the
//! router only ever sees [`RouteSpec`](crate::route::RouteSpec).
//!
//! ```rust,ignore
//! fn get_pet(req: RequestFor<GetPet>) -> anyhow::Result<ReplyFor<GetPet>> {
//!     let pet = load(req.params.id)?;
//!     Reply::new(status::OK, pet)
//! }
//! ```

mod contract;
mod handler;
mod project;
mod reply;

pub use contract::{ReplyFor, RequestFor, RouteContract, TypedRequest};
pub(crate) use handler::TypedHandler;
pub use project::{Declared, Dictionary, PickContent, Projection, Slots, Unknown, Unset};
pub use reply::{Cons, HasStatus, Here, Nil, Reply, Status, There, Unchecked};
