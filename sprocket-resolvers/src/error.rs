//! Build-phase errors
//!
//! Raised while resolvers are being constructed. They abort schema
//! construction; none of them can occur once a resolver has been built.

use thiserror::Error;

/// Result type for resolver construction
pub type BuildResult<T> = Result<T, BuildError>;

/// Resolver construction errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// Roles were declared but no auth checker is configured
    #[error("Field {field} declares roles but no auth checker is configured")]
    MissingAuthChecker { field: String },

    /// The container has no instance of the resolver type
    #[error("Cannot get instance of {type_name} for field {field} from the container")]
    InstanceNotFound { field: String, type_name: String },

    /// A parameter declares an invalid JSON Schema
    #[error("Invalid schema for parameter {param} of field {field}: {message}")]
    InvalidSchema {
        field: String,
        param: String,
        message: String,
    },

    /// The metadata combination cannot be built
    #[error("Invalid metadata for field {field}: {message}")]
    InvalidMetadata { field: String, message: String },
}

impl BuildError {
    /// Create a new invalid metadata error
    pub fn invalid_metadata(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidMetadata {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Field the error was raised for
    pub fn field(&self) -> &str {
        match self {
            Self::MissingAuthChecker { field }
            | Self::InstanceNotFound { field, .. }
            | Self::InvalidSchema { field, .. }
            | Self::InvalidMetadata { field, .. } => field,
        }
    }
}
