//! Authorization checker interface

use async_trait::async_trait;

use crate::action::ActionData;
use crate::error::ResolverResult;

/// Pluggable authorization predicate
///
/// Called once per request for every field that declares roles. An empty role
/// list means the field only requires an authorized caller.
#[async_trait]
pub trait AuthChecker: Send + Sync {
    /// Decide whether the request may proceed
    async fn check(&self, action: &ActionData, roles: &[String]) -> ResolverResult<bool>;
}

/// Plain synchronous closures are auth checkers
#[async_trait]
impl<F> AuthChecker for F
where
    F: Fn(&ActionData, &[String]) -> bool + Send + Sync,
{
    async fn check(&self, action: &ActionData, roles: &[String]) -> ResolverResult<bool> {
        Ok(self(action, roles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{RequestContext, ResolveInfo};
    use serde_json::{json, Map};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_closure_checker() {
        let checker: Arc<dyn AuthChecker> = Arc::new(|action: &ActionData, roles: &[String]| {
            action.context.get("role").and_then(|r| r.as_str().map(String::from)).map_or(false, |r| roles.contains(&r))
        });

        let context = Arc::new(RequestContext::new());
        context.insert("role", json!("admin"));
        let action = ActionData::new(json!(null), Map::new(), context, ResolveInfo::default());

        assert!(checker.check(&action, &["admin".to_string()]).await.unwrap());
        assert!(!checker.check(&action, &["owner".to_string()]).await.unwrap());
    }
}
