//! # Spec Module
//!
//! Generates an OpenAPI 3.1 document from the routes a
//! [`Server`](crate::server::Server) has aggregated.
//!
//! Generation is a pure function of the route list at call time:
//!
//! 1. each route path is translated from `:name` to `{name}` form
//! 2. params, query and headers schemas become `parameters` (one per
//!    property, `required` taken from the schema; path parameters are always
//!    required)
//! 3. every declared body media type appears under `requestBody.content`
//! 4. every declared status appears under `responses` with all of its media
//!    types
//! 5. schema `$defs` are hoisted into `components.schemas`
//!
//! Documentation lists every media type a route declares, while typed
//! handlers only see the highest priority one.
//!
//! ```rust,ignore
//! let doc = spec::generate(&DocumentMetadata::new("Pet Store", "1.0.0"), &server)?;
//! spec::write_document(&doc, "openapi.yaml", DocumentFormat::Yaml)?;
//! ```

mod document;
mod generate;
mod metadata;
mod path;
mod persist;

pub use document::{
    Components, Info, MediaType, Operation, Parameter, ParameterLocation, PathItem, RequestBody,
    ResponseObject, SecurityRequirement, ServerObject, SpecDocument, Tag,
};
pub use generate::{generate, generate_from_routes, GenerateError};
pub use metadata::{DocumentMetadata, DEFAULT_OPENAPI_VERSION};
pub use path::{template_params, to_openapi_path};
pub use persist::{render_document, write_document, DocumentFormat};
