//! Configuration loading and environment variable handling

use crate::domains::SprocketConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use std::str::FromStr;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "SPROCKET".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<SprocketConfig> {
        let content = std::fs::read_to_string(path)?;
        self.from_yaml(&content)
    }

    /// Load configuration from YAML text with environment overrides
    pub fn from_yaml(&self, content: &str) -> ConfigResult<SprocketConfig> {
        let mut config: SprocketConfig = serde_yaml::from_str(content)?;
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<SprocketConfig> {
        let mut config = SprocketConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<SprocketConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut SprocketConfig) -> ConfigResult<()> {
        self.apply_resolver_overrides(&mut config.resolvers)?;
        self.apply_logging_overrides(&mut config.logging)?;
        Ok(())
    }

    /// Apply resolver config overrides
    fn apply_resolver_overrides(
        &self,
        config: &mut crate::domains::resolvers::ResolverConfig,
    ) -> ConfigResult<()> {
        if let Ok(validate) = self.get_env_var("VALIDATE") {
            config.validate = validate
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid VALIDATE: {}", e)))?;
        }

        if let Ok(auth_mode) = self.get_env_var("AUTH_MODE") {
            config.auth_mode = crate::domains::resolvers::AuthMode::from_str(&auth_mode)
                .map_err(|e| ConfigError::EnvError(format!("Invalid AUTH_MODE: {}", e)))?;
        }

        if let Ok(buffer) = self.get_env_var("PUBSUB_BUFFER") {
            config.pub_sub_buffer = buffer
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid PUBSUB_BUFFER: {}", e)))?;
        }

        Ok(())
    }

    /// Apply logging config overrides
    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Ok(log_level) = self.get_env_var("LOG_LEVEL") {
            config.level = crate::domains::logging::LogLevel::from_str(&log_level)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_LEVEL: {}", log_level)))?;
        }

        if let Ok(log_format) = self.get_env_var("LOG_FORMAT") {
            config.format = crate::domains::logging::LogFormat::from_str(&log_format)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_FORMAT: {}", log_format)))?;
        }

        Ok(())
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}
