//! # Router Module
//!
//! A [`Router`] groups routes and owns the middleware chain for each one.
//!
//! Paths use `:name` segments for parameters (`/pets/:petId`). A route is
//! identified by its method plus its normalized path; registering the same
//! identity twice on one router is an error, while different routers may
//! overlap freely.
//!
//! ```rust,ignore
//! let mut router = Router::new();
//! router.get("/pets/:id", get_pet_schema(), |req| {
//!     Reply::new(status::OK, lookup(req.params.id)?)
//! })?;
//! ```

mod core;
mod path;


pub use core::{Router, RouterError, RouterRoute};
pub use path::normalize_path;
