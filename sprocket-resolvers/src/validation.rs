//! Argument validation against JSON Schema
//!
//! Schemas are compiled once while the resolver is built; invalid schemas fail
//! the build. At request time the compiled validator checks the raw argument
//! value and reports every violation.

use jsonschema::Validator;
use serde_json::Value;
use sprocket_interfaces::{ResolverError, ResolverResult};
use std::sync::Arc;
use tracing::debug;

use crate::error::{BuildError, BuildResult};

/// Compiled argument schema
#[derive(Clone)]
pub struct ArgSchema {
    validator: Arc<Validator>,
}

impl ArgSchema {
    /// Compile a JSON Schema for the parameter `param` of `field`
    pub fn compile(schema: &Value, field: &str, param: &str) -> BuildResult<Self> {
        let validator = jsonschema::validator_for(schema).map_err(|e| BuildError::InvalidSchema {
            field: field.to_string(),
            param: param.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            validator: Arc::new(validator),
        })
    }

    /// Validate a value, collecting every violation
    pub fn validate(&self, value: &Value, param: &str) -> ResolverResult<()> {
        let errors: Vec<String> = self
            .validator
            .iter_errors(value)
            .map(|error| {
                let path = error.instance_path.to_string();
                if path.is_empty() {
                    error.to_string()
                } else {
                    format!("{}: {}", path, error)
                }
            })
            .collect();

        if errors.is_empty() {
            return Ok(());
        }

        debug!(param, errors = ?errors, "Argument validation failed");
        Err(ResolverError::validation(
            format!("invalid value for {}", param),
            errors,
        ))
    }
}

impl std::fmt::Debug for ArgSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArgSchema").finish_non_exhaustive()
    }
}

/// Per-parameter override wins over the global default
pub fn should_validate(global: bool, per_param: Option<bool>) -> bool {
    per_param.unwrap_or(global)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recipe_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": { "type": "string", "minLength": 3 },
                "ratings": { "type": "array", "items": { "type": "integer", "maximum": 5 } }
            },
            "required": ["title"]
        })
    }

    #[test]
    fn test_valid_value_passes() {
        let schema = ArgSchema::compile(&recipe_schema(), "addRecipe", "data").unwrap();
        assert!(schema.validate(&json!({ "title": "Soup", "ratings": [4, 5] }), "data").is_ok());
    }

    #[test]
    fn test_every_violation_is_reported() {
        let schema = ArgSchema::compile(&recipe_schema(), "addRecipe", "data").unwrap();

        let err = schema
            .validate(&json!({ "title": "S", "ratings": [9] }), "data")
            .unwrap_err();

        match err {
            ResolverError::Validation { message, errors } => {
                assert_eq!(message, "invalid value for data");
                assert_eq!(errors.len(), 2);
                assert!(errors.iter().any(|e| e.starts_with("/title")));
                assert!(errors.iter().any(|e| e.starts_with("/ratings/0")));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_schema_fails_build() {
        let err = ArgSchema::compile(&json!({ "type": "recipe" }), "addRecipe", "data").unwrap_err();
        assert!(matches!(err, BuildError::InvalidSchema { ref param, .. } if param == "data"));
    }

    #[test]
    fn test_should_validate() {
        assert!(should_validate(true, None));
        assert!(!should_validate(false, None));
        assert!(!should_validate(true, Some(false)));
        assert!(should_validate(false, Some(true)));
    }
}
