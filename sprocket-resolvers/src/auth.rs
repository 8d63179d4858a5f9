//! Authorization gate
//!
//! Fields that declare roles get an [`AuthMiddleware`] prepended to their
//! middleware chain, so the auth check always runs before any other
//! middleware and before the handler.

use async_trait::async_trait;
use serde_json::Value;
use sprocket_config::AuthMode;
use sprocket_interfaces::{ActionData, AuthChecker, Middleware, Next, ResolverError, ResolverResult};
use std::sync::Arc;
use tracing::debug;

use crate::error::{BuildError, BuildResult};

/// Middleware rejecting requests the auth checker does not grant
pub struct AuthMiddleware {
    checker: Arc<dyn AuthChecker>,
    mode: AuthMode,
    roles: Vec<String>,
}

impl AuthMiddleware {
    pub fn new(checker: Arc<dyn AuthChecker>, mode: AuthMode, roles: Vec<String>) -> Self {
        Self { checker, mode, roles }
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }
}

#[async_trait]
impl Middleware for AuthMiddleware {
    async fn resolve<'a>(&'a self, action: &'a ActionData, next: Next<'a>) -> ResolverResult<Option<Value>> {
        if self.checker.check(action, &self.roles).await? {
            return next.run().await;
        }

        debug!(
            field = %action.info.field_name,
            parent_type = %action.info.parent_type,
            roles = ?self.roles,
            auth_mode = %self.mode,
            "Access denied"
        );

        match self.mode {
            AuthMode::Null => Ok(None),
            AuthMode::Error if self.roles.is_empty() => Err(ResolverError::Unauthorized),
            AuthMode::Error => Err(ResolverError::Forbidden),
        }
    }

    fn name(&self) -> &str {
        "auth"
    }
}

/// Prepend the auth gate when the field declares roles
///
/// `roles == None` leaves the chain untouched. Declared roles without a
/// checker is a configuration error reported at build time.
pub fn apply_auth_checker(
    middlewares: &mut Vec<Arc<dyn Middleware>>,
    mode: AuthMode,
    checker: Option<&Arc<dyn AuthChecker>>,
    roles: Option<&[String]>,
    field: &str,
) -> BuildResult<()> {
    let Some(roles) = roles else {
        return Ok(());
    };

    let checker = checker.ok_or_else(|| BuildError::MissingAuthChecker {
        field: field.to_string(),
    })?;

    middlewares.insert(0, Arc::new(AuthMiddleware::new(checker.clone(), mode, roles.to_vec())));
    Ok(())
}

/// Authenticated caller, stored as a [`RequestContext`](sprocket_interfaces::RequestContext) extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub roles: Vec<String>,
}

impl Principal {
    pub fn new(id: impl Into<String>, roles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            id: id.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_any_role(&self, roles: &[String]) -> bool {
        roles.iter().any(|role| self.roles.contains(role))
    }
}

/// Checker granting access based on the request's [`Principal`]
///
/// An empty role list only requires a principal; otherwise the principal must
/// hold at least one of the roles.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrincipalRolesChecker;

#[async_trait]
impl AuthChecker for PrincipalRolesChecker {
    async fn check(&self, action: &ActionData, roles: &[String]) -> ResolverResult<bool> {
        let Some(principal) = action.context.extension::<Principal>() else {
            return Ok(false);
        };

        Ok(roles.is_empty() || principal.has_any_role(roles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::apply_middlewares;
    use futures::FutureExt;
    use serde_json::{json, Map};
    use sprocket_interfaces::{RequestContext, ResolveInfo};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn action_with(context: RequestContext) -> ActionData {
        ActionData::new(
            json!({}),
            Map::new(),
            Arc::new(context),
            ResolveInfo::new("secret", "Query"),
        )
    }

    fn deny_all() -> Arc<dyn AuthChecker> {
        Arc::new(|_: &ActionData, _: &[String]| false)
    }

    fn roles(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_roles_adds_no_gate() {
        let mut middlewares = Vec::new();
        apply_auth_checker(&mut middlewares, AuthMode::Error, Some(&deny_all()), None, "recipes").unwrap();
        assert!(middlewares.is_empty());
    }

    #[test]
    fn test_roles_without_checker_fail_fast() {
        let mut middlewares = Vec::new();
        let err = apply_auth_checker(&mut middlewares, AuthMode::Error, None, Some(roles(&["admin"]).as_slice()), "recipes")
            .unwrap_err();

        assert!(matches!(err, BuildError::MissingAuthChecker { ref field } if field == "recipes"));
        assert!(middlewares.is_empty());
    }

    #[test]
    fn test_empty_roles_still_add_gate() {
        let mut middlewares = Vec::new();
        apply_auth_checker(&mut middlewares, AuthMode::Error, Some(&deny_all()), Some(&[]), "me").unwrap();
        assert_eq!(middlewares.len(), 1);
    }

    #[test]
    fn test_gate_is_prepended() {
        let existing = sprocket_interfaces::middleware_fn("log", |_action, next| next.run());
        let mut middlewares = vec![existing];
        apply_auth_checker(&mut middlewares, AuthMode::Error, Some(&deny_all()), Some(roles(&["admin"]).as_slice()), "x")
            .unwrap();

        assert_eq!(middlewares.len(), 2);
        assert_eq!(middlewares[0].name(), "auth");
        assert_eq!(middlewares[1].name(), "log");
    }

    async fn run_gate(mode: AuthMode, gate_roles: Vec<String>, calls: &Arc<AtomicUsize>) -> ResolverResult<Option<Value>> {
        let gate: Arc<dyn Middleware> = Arc::new(AuthMiddleware::new(deny_all(), mode, gate_roles));
        let data = action_with(RequestContext::new());
        let calls = calls.clone();
        apply_middlewares(&data, &[gate], || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(json!("secret")))
        })
        .await
    }

    #[tokio::test]
    async fn test_rejection_in_error_mode() {
        let calls = Arc::new(AtomicUsize::new(0));

        let forbidden = run_gate(AuthMode::Error, roles(&["admin"]), &calls).await;
        assert!(matches!(forbidden, Err(ResolverError::Forbidden)));

        let unauthorized = run_gate(AuthMode::Error, Vec::new(), &calls).await;
        assert!(matches!(unauthorized, Err(ResolverError::Unauthorized)));

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rejection_in_null_mode() {
        let calls = Arc::new(AtomicUsize::new(0));

        let result = run_gate(AuthMode::Null, roles(&["admin"]), &calls).await.unwrap();

        assert_eq!(result, None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_checker_receives_roles_and_errors_propagate() {
        struct FailingChecker;

        #[async_trait]
        impl AuthChecker for FailingChecker {
            async fn check(&self, _action: &ActionData, roles: &[String]) -> ResolverResult<bool> {
                Err(anyhow::anyhow!("token service down for {:?}", roles).into())
            }
        }

        let gate = AuthMiddleware::new(Arc::new(FailingChecker), AuthMode::Null, roles(&["admin"]));
        let data = action_with(RequestContext::new());

        let err = gate
            .resolve(&data, Next::new(|| async { Ok(Some(json!("secret"))) }.boxed()))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "token service down for [\"admin\"]");
    }

    #[tokio::test]
    async fn test_principal_roles_checker() {
        let checker = PrincipalRolesChecker;
        let anonymous = action_with(RequestContext::new());
        let editor = action_with(RequestContext::new().with_extension(Principal::new("u1", ["editor"])));

        assert!(!checker.check(&anonymous, &[]).await.unwrap());
        assert!(checker.check(&editor, &[]).await.unwrap());
        assert!(checker.check(&editor, &roles(&["admin", "editor"])).await.unwrap());
        assert!(!checker.check(&editor, &roles(&["admin"])).await.unwrap());
    }
}
