//! Configuration management for Sprocket
//!
//! Build-time settings read by the resolver factories (validation default,
//! auth mode, pub-sub buffering) and the logging setup, with YAML loading,
//! environment variable overrides and validation.

pub mod error;
pub mod loader;
pub mod validation;

// Domain-specific configuration modules
pub mod domains;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use validation::Validatable;

// Re-export domain configurations
pub use domains::{
    logging::{LogFormat, LogLevel, LoggingConfig},
    resolvers::{AuthMode, ResolverConfig},
    SprocketConfig,
};
