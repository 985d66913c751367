//! # schemaroute
//!
//! Declare an HTTP route once and derive three things from it:
//!
//! 1. runtime validation and transformation of each inbound request before
//!    the handler runs
//! 2. handler signatures whose parameter, query, header and body types are
//!    projected from the declared schemas at compile time
//! 3. an [OpenAPI 3.1](https://spec.openapis.org/oas/v3.1.0) document built
//!    from every route a server has aggregated
//!
//! ## Architecture
//!
//! - **[`schema`]** - the validate/describe capability and its JSON Schema,
//!   `schemars` and transforming implementations
//! - **[`route`]** - route declarations: the typed [`route::RouteSchema`]
//!   builder and the erased [`route::RouteSpec`]
//! - **[`typed`]** - compile-time projection from a declaration to handler
//!   request and reply types
//! - **[`dispatcher`]** - request, response and chain-step outcome types
//! - **[`middleware`]** - chain steps, validation and error handlers
//! - **[`router`]** - route registration with duplicate detection and
//!   path matching
//! - **[`server`]** - router aggregation and the `may_minihttp` listener
//! - **[`spec`]** - OpenAPI document generation and persistence
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Http as may_minihttp
//!     participant Server as Server pipeline
//!     participant Router
//!     participant Validation as ValidationMiddleware
//!     participant Handler
//!     participant Errors as ErrorHandlers
//!     Client->>Http: HTTP request
//!     Http->>Server: Request (method, path, query, headers, raw body)
//!     Server->>Server: server-wide middleware
//!     Server->>Router: dispatch
//!     Router->>Validation: body, params, query, headers
//!     alt invalid
//!         Validation-->>Errors: RouteError::Validation
//!         Errors-->>Client: error response
//!     else valid
//!         Validation->>Handler: transformed request
//!         Handler-->>Client: Reply
//!     end
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use schemaroute::route::{status, ResponseSpec, RouteSchema};
//! use schemaroute::router::Router;
//! use schemaroute::schema::Typed;
//! use schemaroute::server::Server;
//! use schemaroute::typed::Reply;
//!
//! let mut router = Router::new();
//! router.get(
//!     "/pets/:id",
//!     RouteSchema::new()
//!         .params(Typed::<PetPath>::new())
//!         .response(status::OK, ResponseSpec::new("A pet").json(Typed::<Pet>::new())),
//!     |req| Reply::new(status::OK, find_pet(req.params.id)?),
//! )?;
//!
//! let mut server = Server::new();
//! server.use_routers([router])?;
//! server.listen("0.0.0.0:8080")?;
//! ```

pub mod dispatcher;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod route;
pub mod router;
pub mod runtime_config;
pub mod schema;
pub mod server;
pub mod spec;
pub mod typed;

pub use dispatcher::{Flow, Request, Response, RouteError};
pub use route::{status, Method, ResponseSpec, RouteSchema, RouteSpec};
pub use router::Router;
pub use server::Server;
pub use typed::{Reply, ReplyFor, RequestFor};
