//! Build context
//!
//! Schema-wide settings every resolver factory reads: the validation default,
//! the auth mode and checker, the global middlewares and the collaborators
//! resolvers are wired to. Passed explicitly to the factories and captured by
//! the built resolvers.

use sprocket_config::{AuthMode, ResolverConfig};
use sprocket_interfaces::{AuthChecker, InstanceContainer, Middleware, PubSubEngine, TypeConverter};
use std::sync::Arc;

use crate::auth::apply_auth_checker;
use crate::container::InstanceRegistry;
use crate::conversion::TypeConverterRegistry;
use crate::error::BuildResult;
use crate::pubsub::InMemoryPubSub;

/// Schema-wide resolver settings and collaborators
#[derive(Clone)]
pub struct BuildContext {
    /// Validate arguments unless a parameter overrides it
    pub validate: bool,
    pub auth_mode: AuthMode,
    pub auth_checker: Option<Arc<dyn AuthChecker>>,
    /// Run before every field's own middlewares
    pub global_middlewares: Vec<Arc<dyn Middleware>>,
    pub pub_sub: Arc<dyn PubSubEngine>,
    pub container: Arc<dyn InstanceContainer>,
    pub converter: Arc<dyn TypeConverter>,
}

impl BuildContext {
    /// Create a context with validation on, auth mode `error` and in-memory collaborators
    pub fn new() -> Self {
        Self::from_config(&ResolverConfig::default())
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        Self {
            validate: config.validate,
            auth_mode: config.auth_mode,
            auth_checker: None,
            global_middlewares: Vec::new(),
            pub_sub: Arc::new(InMemoryPubSub::new(config.pub_sub_buffer)),
            container: Arc::new(InstanceRegistry::new()),
            converter: Arc::new(TypeConverterRegistry::new()),
        }
    }

    pub fn with_validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn with_auth_mode(mut self, auth_mode: AuthMode) -> Self {
        self.auth_mode = auth_mode;
        self
    }

    pub fn with_auth_checker(mut self, checker: Arc<dyn AuthChecker>) -> Self {
        self.auth_checker = Some(checker);
        self
    }

    pub fn with_global_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.global_middlewares.push(middleware);
        self
    }

    pub fn with_pub_sub(mut self, pub_sub: Arc<dyn PubSubEngine>) -> Self {
        self.pub_sub = pub_sub;
        self
    }

    pub fn with_container(mut self, container: Arc<dyn InstanceContainer>) -> Self {
        self.container = container;
        self
    }

    pub fn with_converter(mut self, converter: Arc<dyn TypeConverter>) -> Self {
        self.converter = converter;
        self
    }

    /// Middleware chain of one field: global, then field, with the auth gate in front
    pub fn assemble_middlewares(
        &self,
        field: &str,
        field_middlewares: &[Arc<dyn Middleware>],
        roles: Option<&[String]>,
        field_checker: Option<&Arc<dyn AuthChecker>>,
    ) -> BuildResult<Vec<Arc<dyn Middleware>>> {
        let mut middlewares: Vec<Arc<dyn Middleware>> = self
            .global_middlewares
            .iter()
            .chain(field_middlewares)
            .cloned()
            .collect();

        let checker = field_checker.or(self.auth_checker.as_ref());
        apply_auth_checker(&mut middlewares, self.auth_mode, checker, roles, field)?;

        Ok(middlewares)
    }
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildContext")
            .field("validate", &self.validate)
            .field("auth_mode", &self.auth_mode)
            .field("auth_checker", &self.auth_checker.is_some())
            .field("global_middlewares", &self.global_middlewares.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;
    use sprocket_interfaces::{middleware_fn, ActionData};

    fn allow_all() -> Arc<dyn AuthChecker> {
        Arc::new(|_: &ActionData, _: &[String]| true)
    }

    fn pass(name: &str) -> Arc<dyn Middleware> {
        middleware_fn(name, |_action, next| next.run())
    }

    #[test]
    fn test_defaults_follow_config() {
        let context = BuildContext::new();
        assert!(context.validate);
        assert_eq!(context.auth_mode, AuthMode::Error);
        assert!(context.auth_checker.is_none());

        let config = ResolverConfig {
            validate: false,
            auth_mode: AuthMode::Null,
            pub_sub_buffer: 4,
        };
        let context = BuildContext::from_config(&config);
        assert!(!context.validate);
        assert_eq!(context.auth_mode, AuthMode::Null);
    }

    #[test]
    fn test_global_middlewares_run_first() {
        let context = BuildContext::new()
            .with_global_middleware(pass("global"))
            .with_auth_checker(allow_all());
        let roles = vec!["admin".to_string()];

        let chain = context
            .assemble_middlewares("recipes", &[pass("field")], Some(roles.as_slice()), None)
            .unwrap();

        let names: Vec<&str> = chain.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["auth", "global", "field"]);
    }

    #[test]
    fn test_field_checker_overrides_missing_global() {
        let context = BuildContext::new();
        let roles = vec!["admin".to_string()];

        let err = context
            .assemble_middlewares("recipes", &[], Some(roles.as_slice()), None)
            .err()
            .unwrap();
        assert!(matches!(err, BuildError::MissingAuthChecker { .. }));

        let chain = context
            .assemble_middlewares("recipes", &[], Some(roles.as_slice()), Some(&allow_all()))
            .unwrap();
        assert_eq!(chain.len(), 1);
    }
}
