//! Middleware chain composition
//!
//! The middlewares are folded from the right into nested continuations with
//! the final action innermost, then the outermost one is awaited. Each stage
//! awaits the next, so execution is strictly sequential: for middlewares
//! `[A, B]` around action `H` the order is A-before, B-before, H, B-after,
//! A-after. Errors propagate unchanged through every awaiting stage.

use futures::FutureExt;
use serde_json::Value;
use sprocket_interfaces::{ActionData, Middleware, MiddlewareFuture, Next, ResolverResult};
use std::future::Future;
use std::sync::Arc;

type FinalAction<'a> = Box<dyn FnOnce() -> MiddlewareFuture<'a> + Send + 'a>;

/// Run `action` wrapped by `middlewares`, first middleware outermost
pub async fn apply_middlewares<'a, F, Fut>(
    data: &'a ActionData,
    middlewares: &'a [Arc<dyn Middleware>],
    action: F,
) -> ResolverResult<Option<Value>>
where
    F: FnOnce() -> Fut + Send + 'a,
    Fut: Future<Output = ResolverResult<Option<Value>>> + Send + 'a,
{
    dispatch(data, middlewares, Box::new(move || action().boxed())).await
}

fn dispatch<'a>(
    data: &'a ActionData,
    middlewares: &'a [Arc<dyn Middleware>],
    action: FinalAction<'a>,
) -> MiddlewareFuture<'a> {
    match middlewares.split_first() {
        None => action(),
        Some((middleware, rest)) => {
            let next = Next::new(move || dispatch(data, rest, action));
            middleware.resolve(data, next)
        }
    }
}
