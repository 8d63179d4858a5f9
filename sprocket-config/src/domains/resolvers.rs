//! Resolver build configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigResult;
use crate::validation::{validate_positive, Validatable};

/// Settings captured by every resolver when the schema is built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Validate arguments by default when a parameter declares a schema
    #[serde(default = "crate::domains::utils::default_true")]
    pub validate: bool,

    /// How authorization rejections are surfaced
    #[serde(default)]
    pub auth_mode: AuthMode,

    /// Buffered payloads per pub-sub trigger
    #[serde(default = "crate::domains::utils::default_pub_sub_buffer")]
    pub pub_sub_buffer: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            validate: true,
            auth_mode: AuthMode::default(),
            pub_sub_buffer: crate::domains::utils::default_pub_sub_buffer(),
        }
    }
}

/// Policy for surfacing an authorization rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Reject by raising an error
    #[default]
    Error,
    /// Reject by resolving the field to null
    Null,
}

impl FromStr for AuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(AuthMode::Error),
            "null" => Ok(AuthMode::Null),
            _ => Err(format!("Invalid auth mode: {}", s)),
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::Error => f.write_str("error"),
            AuthMode::Null => f.write_str("null"),
        }
    }
}

impl Validatable for ResolverConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(self.pub_sub_buffer, "pub_sub_buffer", self.domain_name())
    }

    fn domain_name(&self) -> &'static str {
        "resolvers"
    }
}
