//! GraphQL error mapping

use async_graphql::dynamic::SchemaError;
use async_graphql::ErrorExtensions;
use sprocket_interfaces::ResolverError;
use sprocket_resolvers::BuildError;
use thiserror::Error;

/// Schema assembly errors
#[derive(Error, Debug)]
pub enum GraphQLError {
    #[error("Resolver build error: {0}")]
    Build(#[from] BuildError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("No query type defined")]
    MissingQuery,
}

/// Result type for schema assembly
pub type Result<T> = std::result::Result<T, GraphQLError>;

/// Conversion of resolution errors into GraphQL field errors
pub trait GraphQLErrorExt {
    fn to_graphql_error(&self) -> async_graphql::Error;
}

impl GraphQLErrorExt for ResolverError {
    /// Keeps the message and adds a `code` extension; validation errors also
    /// carry every violation under `validationErrors`.
    fn to_graphql_error(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| {
            e.set("code", self.code());

            if let ResolverError::Validation { errors, .. } = self {
                e.set("validationErrors", errors.clone());
            }
        })
    }
}
