//! Resolver factories
//!
//! Each factory runs the build phase once (instance lookup, middleware
//! assembly, auth gate, schema compilation) and returns a [`FieldResolver`]
//! closure for the request phase. Build errors abort before any request is
//! served.

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::{Map, Value};
use sprocket_interfaces::{
    ActionData, Instance, Middleware, ObjectType, PubSubEngine, RequestContext, ResolveInfo, ResolverResult,
    TypeConverter,
};
use std::sync::Arc;
use tracing::debug;

use crate::chain::apply_middlewares;
use crate::context::BuildContext;
use crate::error::{BuildError, BuildResult};
use crate::metadata::{
    FieldAccess, FieldMetadata, FieldResolverKind, FieldResolverMetadata, Handler, HandlerMetadata, ResolverMetadata,
};
use crate::params::{get_params, CompiledParams};

/// Built field resolver: `(root, args, context, info) -> result`
pub type FieldResolver = Arc<
    dyn Fn(Value, Map<String, Value>, Arc<RequestContext>, ResolveInfo) -> BoxFuture<'static, ResolverResult<Option<Value>>>
        + Send
        + Sync,
>;

/// Build the resolver for any kind of field
pub fn create_resolver(metadata: &ResolverMetadata, context: &BuildContext) -> BuildResult<FieldResolver> {
    match metadata {
        ResolverMetadata::Handler(handler) => create_handler_resolver(handler, context),
        ResolverMetadata::AdvancedField(field) => create_advanced_field_resolver(field, context),
        ResolverMetadata::SimpleField(field) => create_simple_field_resolver(field, context),
    }
}

/// Parameter resolution settings captured at build time
struct Invocation {
    params: CompiledParams,
    validate: bool,
    pub_sub: Arc<dyn PubSubEngine>,
}

impl Invocation {
    fn new(params: CompiledParams, context: &BuildContext) -> Self {
        Self {
            params,
            validate: context.validate,
            pub_sub: context.pub_sub.clone(),
        }
    }

    async fn call(&self, handler: &Handler, instance: Instance, action: &ActionData) -> ResolverResult<Option<Value>> {
        let params = get_params(&self.params, action, self.validate, &self.pub_sub).await?;
        handler.call(instance, params).await.map(Some)
    }
}

struct HandlerResolver {
    instance: Instance,
    handler: Handler,
    invocation: Invocation,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl HandlerResolver {
    async fn resolve(&self, action: &ActionData) -> ResolverResult<Option<Value>> {
        apply_middlewares(action, &self.middlewares, || {
            self.invocation.call(&self.handler, self.instance.clone(), action)
        })
        .await
    }
}

/// Build the resolver of a query, mutation or subscription handler
///
/// The target instance is looked up once, here; every request reuses it.
pub fn create_handler_resolver(metadata: &HandlerMetadata, context: &BuildContext) -> BuildResult<FieldResolver> {
    let field = metadata.field_name.as_str();

    let instance = context
        .container
        .get_instance(&metadata.target)
        .ok_or_else(|| BuildError::InstanceNotFound {
            field: field.to_string(),
            type_name: metadata.target.to_string(),
        })?;

    let middlewares = context.assemble_middlewares(
        field,
        &metadata.middlewares,
        metadata.roles.as_deref(),
        metadata.auth_checker.as_ref(),
    )?;
    let params = CompiledParams::compile(&metadata.params, field)?;

    debug!(
        field,
        target = %metadata.target,
        params = params.len(),
        middlewares = middlewares.len(),
        "Built handler resolver"
    );

    let state = Arc::new(HandlerResolver {
        instance,
        handler: metadata.handler.clone(),
        invocation: Invocation::new(params, context),
        middlewares,
    });

    Ok(Arc::new(move |root: Value, args: Map<String, Value>, request: Arc<RequestContext>, info: ResolveInfo| {
        let state = state.clone();
        async move {
            let action = ActionData::new(root, args, request, info);
            state.resolve(&action).await
        }
        .boxed()
    }))
}

struct ObjectFieldResolver {
    object_type: ObjectType,
    converter: Arc<dyn TypeConverter>,
    access: FieldAccess,
    invocation: Invocation,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl ObjectFieldResolver {
    async fn resolve(&self, action: &ActionData) -> ResolverResult<Option<Value>> {
        apply_middlewares(action, &self.middlewares, || async move {
            // Converted per request, only once the chain lets the request through.
            let object = self.converter.convert(&self.object_type, &action.root)?;
            match &self.access {
                FieldAccess::Method(handler) => self.invocation.call(handler, object.into_instance(), action).await,
                FieldAccess::Property(name) => Ok(object.property(name)),
            }
        })
        .await
    }
}

/// Build the resolver of a field resolved against its owning object type
///
/// External fields are plain handlers on a separate resolver type and are
/// built by [`create_handler_resolver`].
pub fn create_advanced_field_resolver(
    metadata: &FieldResolverMetadata,
    context: &BuildContext,
) -> BuildResult<FieldResolver> {
    let field = metadata.field_name.as_str();

    if metadata.kind == FieldResolverKind::External {
        let handler = metadata.as_handler_metadata().ok_or_else(|| {
            BuildError::invalid_metadata(field, "external field resolvers need a target type and a method")
        })?;
        return create_handler_resolver(&handler, context);
    }

    let object_type = (metadata.object_type)();
    let middlewares = context.assemble_middlewares(
        field,
        &metadata.middlewares,
        metadata.roles.as_deref(),
        metadata.auth_checker.as_ref(),
    )?;
    let params = CompiledParams::compile(&metadata.params, field)?;

    debug!(
        field,
        object_type = %object_type.name,
        method = matches!(metadata.access, FieldAccess::Method(_)),
        middlewares = middlewares.len(),
        "Built field resolver"
    );

    let state = Arc::new(ObjectFieldResolver {
        object_type,
        converter: context.converter.clone(),
        access: metadata.access.clone(),
        invocation: Invocation::new(params, context),
        middlewares,
    });

    Ok(Arc::new(move |root: Value, args: Map<String, Value>, request: Arc<RequestContext>, info: ResolveInfo| {
        let state = state.clone();
        async move {
            let action = ActionData::new(root, args, request, info);
            state.resolve(&action).await
        }
        .boxed()
    }))
}

/// Build the resolver of a plain property of the parent value
pub fn create_simple_field_resolver(metadata: &FieldMetadata, context: &BuildContext) -> BuildResult<FieldResolver> {
    let middlewares = context.assemble_middlewares(
        &metadata.name,
        &metadata.middlewares,
        metadata.roles.as_deref(),
        metadata.auth_checker.as_ref(),
    )?;

    debug!(field = %metadata.name, middlewares = middlewares.len(), "Built simple field resolver");

    let middlewares: Arc<[Arc<dyn Middleware>]> = middlewares.into();
    let name: Arc<str> = metadata.name.as_str().into();

    Ok(Arc::new(move |root: Value, args: Map<String, Value>, request: Arc<RequestContext>, info: ResolveInfo| {
        let middlewares = middlewares.clone();
        let name = name.clone();
        async move {
            let action = ActionData::new(root, args, request, info);
            let root = &action.root;
            let name = &*name;
            apply_middlewares(&action, &middlewares, move || async move { Ok(root.get(name).cloned()) }).await
        }
        .boxed()
    }))
}
