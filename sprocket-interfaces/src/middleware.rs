//! Middleware interface
//!
//! A middleware receives the [`ActionData`] of a field resolution and a
//! [`Next`] continuation. It may run logic before and after calling the
//! continuation, transform its result, or never call it and return its own
//! value instead.

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;
use std::sync::Arc;

use crate::action::ActionData;
use crate::error::ResolverResult;

/// Future produced by a middleware stage
pub type MiddlewareFuture<'a> = BoxFuture<'a, ResolverResult<Option<Value>>>;

/// Continuation into the rest of the middleware chain
///
/// Consumed on use, so a middleware can run the rest of the chain at most once.
pub struct Next<'a> {
    run: Box<dyn FnOnce() -> MiddlewareFuture<'a> + Send + 'a>,
}

impl<'a> Next<'a> {
    pub fn new<F>(run: F) -> Self
    where
        F: FnOnce() -> MiddlewareFuture<'a> + Send + 'a,
    {
        Self { run: Box::new(run) }
    }

    /// Run the remaining middlewares and the final action
    pub fn run(self) -> MiddlewareFuture<'a> {
        (self.run)()
    }
}

/// Request interceptor wrapped around a field resolution
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Intercept a resolution; call `next.run()` to proceed
    async fn resolve<'a>(&'a self, action: &'a ActionData, next: Next<'a>) -> ResolverResult<Option<Value>>;

    /// Name used in logs
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Middleware backed by a closure, see [`middleware_fn`]
pub struct MiddlewareFn<F> {
    name: String,
    f: F,
}

#[async_trait]
impl<F> Middleware for MiddlewareFn<F>
where
    F: for<'a> Fn(&'a ActionData, Next<'a>) -> MiddlewareFuture<'a> + Send + Sync,
{
    async fn resolve<'a>(&'a self, action: &'a ActionData, next: Next<'a>) -> ResolverResult<Option<Value>> {
        (self.f)(action, next).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Wrap a closure as a middleware
///
/// ```ignore
/// let log = middleware_fn("log", |action, next| {
///     async move {
///         tracing::info!(field = %action.info.field_name, "resolving");
///         next.run().await
///     }
///     .boxed()
/// });
/// ```
pub fn middleware_fn<F>(name: impl Into<String>, f: F) -> Arc<dyn Middleware>
where
    F: for<'a> Fn(&'a ActionData, Next<'a>) -> MiddlewareFuture<'a> + Send + Sync + 'static,
{
    Arc::new(MiddlewareFn { name: name.into(), f })
}
