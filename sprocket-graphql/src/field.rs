//! Field adapter
//!
//! Wraps a [`FieldResolver`] into an `async_graphql::dynamic::Field`. The
//! parent value and arguments are converted to JSON, the request context is
//! taken from the request data, and the resolver result is converted back.

use async_graphql::dynamic::{Field, FieldFuture, FieldValue, TypeRef};
use async_graphql::Value;
use serde_json::Map;
use sprocket_interfaces::{RequestContext, ResolveInfo};
use sprocket_resolvers::FieldResolver;
use std::sync::Arc;

use crate::errors::GraphQLErrorExt;

/// Expose a built resolver as a dynamic schema field
///
/// Requests without an `Arc<RequestContext>` in their data get a fresh empty
/// context.
pub fn resolver_field(
    name: impl Into<String>,
    ty: impl Into<TypeRef>,
    parent_type: impl Into<String>,
    resolver: FieldResolver,
) -> Field {
    let parent_type: Arc<str> = parent_type.into().into();

    Field::new(name, ty, move |ctx| {
        let resolver = resolver.clone();
        let parent_type = parent_type.clone();

        FieldFuture::new(async move {
            let root = ctx
                .parent_value
                .as_value()
                .cloned()
                .unwrap_or(Value::Null)
                .into_json()?;

            let mut args = Map::new();
            for (name, value) in ctx.args.iter() {
                args.insert(name.to_string(), value.as_value().clone().into_json()?);
            }

            let request = ctx.data_opt::<Arc<RequestContext>>().cloned().unwrap_or_default();
            let info = ResolveInfo::new(ctx.field().name(), &*parent_type);

            let result = resolver(root, args, request, info)
                .await
                .map_err(|e| e.to_graphql_error())?;

            result.map(into_field_value).transpose()
        })
    })
}

/// Lists become field value lists so their items resolve as objects
fn into_field_value<'a>(value: serde_json::Value) -> async_graphql::Result<FieldValue<'a>> {
    match value {
        serde_json::Value::Array(items) => Ok(FieldValue::list(
            items
                .into_iter()
                .map(into_field_value)
                .collect::<async_graphql::Result<Vec<_>>>()?,
        )),
        value => Ok(FieldValue::value(Value::from_json(value)?)),
    }
}
