//! Resolution errors
//!
//! Errors raised while a field is being resolved. They propagate unchanged
//! through every middleware up to the schema engine, which reports them as
//! field errors.

use thiserror::Error;

use crate::pubsub::PubSubError;

/// Result type for field resolution
pub type ResolverResult<T> = Result<T, ResolverError>;

/// Field resolution errors
#[derive(Error, Debug)]
pub enum ResolverError {
    /// The caller is not authorized at all
    #[error("Access denied! You need to be authorized to perform this action!")]
    Unauthorized,

    /// The caller lacks the required roles
    #[error("Access denied! You don't have permission for this action!")]
    Forbidden,

    /// An argument failed validation
    #[error("Argument Validation Error: {message}")]
    Validation { message: String, errors: Vec<String> },

    /// A handler was bound to an instance of another type
    #[error("Resolver target is not an instance of {expected}")]
    TargetMismatch { expected: &'static str },

    /// A root value could not be converted into its object type
    #[error("Cannot convert value to {type_name}: {message}")]
    Conversion { type_name: String, message: String },

    /// Pub-sub operation failed
    #[error("PubSub error: {0}")]
    PubSub(#[from] PubSubError),

    /// Error raised by business logic
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

impl ResolverError {
    /// Create a new validation error
    pub fn validation(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self::Validation {
            message: message.into(),
            errors,
        }
    }

    /// Create a new conversion error
    pub fn conversion(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conversion {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// Check if this is an authorization rejection
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::Forbidden)
    }

    /// Stable error code reported to clients
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::Validation { .. } => "ARGUMENT_VALIDATION_ERROR",
            Self::TargetMismatch { .. } | Self::Conversion { .. } | Self::PubSub(_) | Self::Handler(_) => {
                "INTERNAL_SERVER_ERROR"
            }
        }
    }
}
