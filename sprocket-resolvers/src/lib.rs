//! Resolver factories for the Sprocket GraphQL framework
//!
//! Turns declarative field metadata into resolver closures for a schema
//! execution engine. Each closure runs an ordered middleware chain (with the
//! authorization gate always first) around the final action: extracting the
//! handler parameters and invoking the handler, or reading a property.
//!
//! Resolvers are built once, at schema construction time, from a
//! [`BuildContext`]. Configuration mistakes (such as roles declared without an
//! auth checker) fail the build instead of surfacing per request.

pub mod auth;
pub mod chain;
pub mod container;
pub mod context;
pub mod conversion;
pub mod error;
pub mod factory;
pub mod metadata;
pub mod params;
pub mod pubsub;
pub mod validation;

pub use auth::{apply_auth_checker, AuthMiddleware, Principal, PrincipalRolesChecker};
pub use chain::apply_middlewares;
pub use container::InstanceRegistry;
pub use context::BuildContext;
pub use conversion::TypeConverterRegistry;
pub use error::{BuildError, BuildResult};
pub use factory::{
    create_advanced_field_resolver, create_handler_resolver, create_resolver, create_simple_field_resolver,
    FieldResolver,
};
pub use metadata::{
    FieldAccess, FieldMetadata, FieldResolverKind, FieldResolverMetadata, Handler, HandlerMetadata, ResolverMetadata,
};
pub use params::{get_params, CompiledParams, CustomParamResolver, ParamMetadata, ParamSource, ParamValue};
pub use pubsub::{InMemoryPubSub, Publisher};

// Re-export the shared interfaces so users only need this crate
pub use sprocket_config::AuthMode;
pub use sprocket_interfaces::{
    middleware_fn, ActionData, AuthChecker, Instance, InstanceContainer, Middleware, MiddlewareFuture, Next,
    ObjectType, ObjectValue, PubSubEngine, PubSubError, RequestContext, ResolveInfo, ResolverError, ResolverResult,
    ServiceKey, TypeConverter, TypeThunk,
};
