//! # Sprocket GraphQL
//!
//! Adapter between Sprocket resolvers and the `async-graphql` dynamic schema.
//!
//! - [`resolver_field`] exposes a built resolver as a schema field
//! - [`SchemaAssembler`] builds a whole schema from declarative object definitions
//! - [`GraphQLErrorExt`] maps resolution errors to GraphQL errors with a `code` extension
//!
//! Requests carry their [`RequestContext`](sprocket_interfaces::RequestContext)
//! as `Arc<RequestContext>` request data.

pub mod errors;
pub mod field;
pub mod schema;

pub use errors::{GraphQLError, GraphQLErrorExt, Result};
pub use field::resolver_field;
pub use schema::{FieldDefinition, ObjectDefinition, SchemaAssembler};

// Re-export the dynamic schema types used in definitions
pub use async_graphql::dynamic::{InputValue, Schema, TypeRef};
