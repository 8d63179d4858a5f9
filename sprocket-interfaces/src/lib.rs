//! # Sprocket Interfaces
//!
//! Core types and traits shared by the Sprocket resolver crates.
//!
//! This crate is the neutral ground between the resolver factories and the
//! collaborators they are wired to: the instance container, the type converter,
//! the pub-sub engine and user-provided middlewares and auth checkers.
//!
//! ## Main Interfaces
//!
//! - [`ActionData`] - The per-request bundle of root, args, context and info
//! - [`Middleware`] - Request interceptor with before/after/short-circuit capability
//! - [`AuthChecker`] - Pluggable authorization predicate
//! - [`InstanceContainer`] - Lookup of resolver target instances
//! - [`TypeConverter`] - Conversion of root values into concrete object instances
//! - [`PubSubEngine`] - Publish/subscribe handle injectable into resolvers

pub mod action;
pub mod auth;
pub mod container;
pub mod conversion;
pub mod error;
pub mod middleware;
pub mod pubsub;

// Re-export commonly used types
pub use action::{ActionData, RequestContext, ResolveInfo};
pub use auth::AuthChecker;
pub use container::{Instance, InstanceContainer, ServiceKey};
pub use conversion::{ObjectType, ObjectValue, TypeConverter, TypeThunk};
pub use error::{ResolverError, ResolverResult};
pub use middleware::{middleware_fn, Middleware, MiddlewareFn, MiddlewareFuture, Next};
pub use pubsub::{PubSubEngine, PubSubError};
