//! # Route Module
//!
//! The declarative contract for one route: documentation strings, request
//! schemas for path params, query, headers and body (per content type), and
//! the possible responses per status code per content type.
//!
//! Two views of the same declaration exist:
//!
//! - [`RouteSchema`] - the typed builder. Each call records the schema at
//!   runtime *and* records its Rust type in a type parameter, which is what
//!   lets [`typed`](crate::typed) project concrete handler types from it.
//! - [`RouteSpec`] - the erased model the router validates with and the
//!   document generator reads. It can also be built directly when no static
//!   typing is wanted.
//!
//! ```rust,ignore
//! use schemaroute::route::{status, ResponseSpec, RouteSchema};
//! use schemaroute::schema::Typed;
//!
//! let schema = RouteSchema::new()
//!     .summary("Get a pet")
//!     .params(Typed::<PetPath>::new())
//!     .response(status::OK, ResponseSpec::new("The pet").json(Typed::<Pet>::new()))
//!     .response(status::NOT_FOUND, ResponseSpec::new("Missing").json(Typed::<Problem>::new()));
//! ```

mod content;
mod method;
mod schema;
mod spec;
pub mod status;

pub use content::{Content, ContentType};
pub use method::Method;
pub use schema::{ResponseSpec, RouteSchema};
pub use spec::{RequestSpec, ResponseDoc, RouteSpec};
pub use status::Code;
