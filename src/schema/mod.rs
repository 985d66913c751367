//! # Schema Module
//!
//! The schema module defines the pluggable validation capability every route
//! declaration is built from. A schema validates an inbound value, may
//! transform it, and can describe its own shape as a JSON Schema document
//! for the OpenAPI generator.
//!
//! ## Implementations
//!
//! - [`Typed`] - derives the JSON Schema from a Rust type (`schemars`) and
//!   validates by checking the document and deserializing into the type
//! - [`JsonSchema`] - wraps a hand-written JSON Schema document
//! - [`Transformed`] - runs a conversion on the output of another schema
//!
//! Anything implementing [`Schema`] plugs into a route, so the router never
//! depends on a particular validation backend.
//!
//! ## Example
//!
//! ```rust,ignore
//! use schemaroute::schema::{Schema, SchemaExt, Typed};
//!
//! #[derive(serde::Serialize, serde::Deserialize, schemars::JsonSchema)]
//! struct PetId { id: String }
//!
//! let schema = Typed::<PetId>::new().transform(|mut v| {
//!     if let Some(id) = v.get_mut("id").and_then(|s| s.as_str().map(str::to_uppercase)) {
//!         v["id"] = id.into();
//!     }
//!     v
//! });
//! let out = schema.validate(&serde_json::json!({ "id": "abc" }))?;
//! assert_eq!(out["id"], "ABC");
//! ```

mod coerce;
mod core;
mod json;
mod transform;
mod typed;

pub use self::core::{Issue, Schema, SchemaExt, SchemaRef, SchemaType, ValidationError};
pub use coerce::{align_object_keys, coerce_object, coerce_value, object_properties};
pub use json::JsonSchema;
pub use transform::Transformed;
pub use typed::Typed;
