//! Logging setup for Sprocket
//!
//! Resolver crates log through `tracing`; this crate installs the global
//! subscriber from a [`LoggingConfig`].

pub mod init;

pub use init::{build_env_filter, init_logging, init_simple_tracing};
pub use sprocket_config::{LogFormat, LogLevel, LoggingConfig};
