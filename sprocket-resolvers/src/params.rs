//! Handler parameter resolution
//!
//! Every handler declares its parameters as [`ParamMetadata`] entries. At
//! build time they are sorted by position and their schemas compiled into
//! [`CompiledParams`]; at request time [`get_params`] produces exactly one
//! [`ParamValue`] per declared parameter, in order. Missing sources yield
//! [`ParamValue::Undefined`] instead of being skipped.

use async_trait::async_trait;
use futures::future::try_join_all;
use serde_json::Value;
use sprocket_interfaces::{ActionData, PubSubEngine, RequestContext, ResolveInfo, ResolverResult};
use std::sync::Arc;

use crate::error::BuildResult;
use crate::pubsub::Publisher;
use crate::validation::{should_validate, ArgSchema};

/// Resolver for user-defined parameter kinds
#[async_trait]
pub trait CustomParamResolver: Send + Sync {
    async fn resolve(&self, action: &ActionData) -> ResolverResult<ParamValue>;
}

/// Where a parameter takes its value from
#[derive(Clone)]
pub enum ParamSource {
    /// The parent value, or one of its properties
    Root { property: Option<String> },
    /// All arguments as one object
    Args { schema: Option<Value>, validate: Option<bool> },
    /// A single named argument
    Arg {
        name: String,
        schema: Option<Value>,
        validate: Option<bool>,
    },
    /// The request context, or one of its named values
    Context { property: Option<String> },
    /// The resolve info
    Info,
    /// The pub-sub engine, or a publisher bound to a trigger
    PubSub { trigger: Option<String> },
    /// A user-defined resolver
    Custom(Arc<dyn CustomParamResolver>),
}

impl std::fmt::Debug for ParamSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root { property } => f.debug_struct("Root").field("property", property).finish(),
            Self::Args { schema, validate } => f
                .debug_struct("Args")
                .field("schema", schema)
                .field("validate", validate)
                .finish(),
            Self::Arg { name, schema, validate } => f
                .debug_struct("Arg")
                .field("name", name)
                .field("schema", schema)
                .field("validate", validate)
                .finish(),
            Self::Context { property } => f.debug_struct("Context").field("property", property).finish(),
            Self::Info => f.write_str("Info"),
            Self::PubSub { trigger } => f.debug_struct("PubSub").field("trigger", trigger).finish(),
            Self::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// Declared handler parameter
#[derive(Debug, Clone)]
pub struct ParamMetadata {
    /// Position in the handler's parameter list
    pub index: usize,
    pub source: ParamSource,
}

impl ParamMetadata {
    pub fn new(index: usize, source: ParamSource) -> Self {
        Self { index, source }
    }

    pub fn root(index: usize) -> Self {
        Self::new(index, ParamSource::Root { property: None })
    }

    pub fn root_property(index: usize, property: impl Into<String>) -> Self {
        Self::new(
            index,
            ParamSource::Root {
                property: Some(property.into()),
            },
        )
    }

    pub fn args(index: usize) -> Self {
        Self::new(
            index,
            ParamSource::Args {
                schema: None,
                validate: None,
            },
        )
    }

    pub fn arg(index: usize, name: impl Into<String>) -> Self {
        Self::new(
            index,
            ParamSource::Arg {
                name: name.into(),
                schema: None,
                validate: None,
            },
        )
    }

    /// Argument validated against a JSON Schema
    pub fn validated_arg(index: usize, name: impl Into<String>, schema: Value) -> Self {
        Self::new(
            index,
            ParamSource::Arg {
                name: name.into(),
                schema: Some(schema),
                validate: None,
            },
        )
    }

    pub fn context(index: usize) -> Self {
        Self::new(index, ParamSource::Context { property: None })
    }

    pub fn context_property(index: usize, property: impl Into<String>) -> Self {
        Self::new(
            index,
            ParamSource::Context {
                property: Some(property.into()),
            },
        )
    }

    pub fn info(index: usize) -> Self {
        Self::new(index, ParamSource::Info)
    }

    pub fn pub_sub(index: usize, trigger: Option<&str>) -> Self {
        Self::new(
            index,
            ParamSource::PubSub {
                trigger: trigger.map(String::from),
            },
        )
    }

    pub fn custom(index: usize, resolver: Arc<dyn CustomParamResolver>) -> Self {
        Self::new(index, ParamSource::Custom(resolver))
    }

    /// Override the global validation default for this parameter
    pub fn with_validation(mut self, enabled: bool) -> Self {
        match &mut self.source {
            ParamSource::Args { validate, .. } | ParamSource::Arg { validate, .. } => *validate = Some(enabled),
            _ => {}
        }
        self
    }
}

/// One resolved handler argument
#[derive(Clone)]
pub enum ParamValue {
    /// The source had no value
    Undefined,
    Value(Value),
    Context(Arc<RequestContext>),
    Info(ResolveInfo),
    PubSub(Arc<dyn PubSubEngine>),
    Publisher(Publisher),
}

impl ParamValue {
    fn from_option(value: Option<Value>) -> Self {
        value.map_or(Self::Undefined, Self::Value)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_context(&self) -> Option<&Arc<RequestContext>> {
        match self {
            Self::Context(context) => Some(context),
            _ => None,
        }
    }

    pub fn as_info(&self) -> Option<&ResolveInfo> {
        match self {
            Self::Info(info) => Some(info),
            _ => None,
        }
    }

    pub fn as_pub_sub(&self) -> Option<&Arc<dyn PubSubEngine>> {
        match self {
            Self::PubSub(engine) => Some(engine),
            _ => None,
        }
    }

    pub fn as_publisher(&self) -> Option<&Publisher> {
        match self {
            Self::Publisher(publisher) => Some(publisher),
            _ => None,
        }
    }
}

impl std::fmt::Debug for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undefined => f.write_str("Undefined"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Context(context) => f.debug_tuple("Context").field(context).finish(),
            Self::Info(info) => f.debug_tuple("Info").field(info).finish(),
            Self::PubSub(_) => f.write_str("PubSub"),
            Self::Publisher(publisher) => f.debug_tuple("Publisher").field(&publisher.trigger()).finish(),
        }
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

#[derive(Clone)]
enum CompiledSource {
    Root(Option<String>),
    Args(Option<ArgSchema>, Option<bool>),
    Arg(String, Option<ArgSchema>, Option<bool>),
    Context(Option<String>),
    Info,
    PubSub(Option<String>),
    Custom(Arc<dyn CustomParamResolver>),
}

/// Parameters sorted by position with their schemas compiled
#[derive(Clone)]
pub struct CompiledParams {
    sources: Vec<CompiledSource>,
}

impl CompiledParams {
    /// Sort and compile the declared parameters of `field`
    pub fn compile(params: &[ParamMetadata], field: &str) -> BuildResult<Self> {
        let mut sorted: Vec<&ParamMetadata> = params.iter().collect();
        sorted.sort_by_key(|param| param.index);

        let sources = sorted
            .into_iter()
            .map(|param| compile_source(&param.source, field))
            .collect::<BuildResult<Vec<_>>>()?;

        Ok(Self { sources })
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

fn compile_source(source: &ParamSource, field: &str) -> BuildResult<CompiledSource> {
    let compile_schema = |schema: &Option<Value>, param: &str| {
        schema
            .as_ref()
            .map(|schema| ArgSchema::compile(schema, field, param))
            .transpose()
    };

    Ok(match source {
        ParamSource::Root { property } => CompiledSource::Root(property.clone()),
        ParamSource::Args { schema, validate } => CompiledSource::Args(compile_schema(schema, "args")?, *validate),
        ParamSource::Arg { name, schema, validate } => {
            CompiledSource::Arg(name.clone(), compile_schema(schema, name.as_str())?, *validate)
        }
        ParamSource::Context { property } => CompiledSource::Context(property.clone()),
        ParamSource::Info => CompiledSource::Info,
        ParamSource::PubSub { trigger } => CompiledSource::PubSub(trigger.clone()),
        ParamSource::Custom(resolver) => CompiledSource::Custom(resolver.clone()),
    })
}

/// Produce the handler arguments for one request
///
/// Fails as a whole if any argument fails validation or a custom resolver
/// fails; a partial list is never returned.
pub async fn get_params(
    params: &CompiledParams,
    action: &ActionData,
    global_validate: bool,
    pub_sub: &Arc<dyn PubSubEngine>,
) -> ResolverResult<Vec<ParamValue>> {
    try_join_all(
        params
            .sources
            .iter()
            .map(|source| resolve_source(source, action, global_validate, pub_sub)),
    )
    .await
}

async fn resolve_source(
    source: &CompiledSource,
    action: &ActionData,
    global_validate: bool,
    pub_sub: &Arc<dyn PubSubEngine>,
) -> ResolverResult<ParamValue> {
    match source {
        CompiledSource::Root(None) => Ok(ParamValue::Value(action.root.clone())),
        CompiledSource::Root(Some(property)) => Ok(ParamValue::from_option(action.root.get(property).cloned())),
        CompiledSource::Args(schema, validate) => {
            let args = Value::Object(action.args.clone());
            validate_arg(&args, "args", schema.as_ref(), global_validate, *validate)?;
            Ok(ParamValue::Value(args))
        }
        CompiledSource::Arg(name, schema, validate) => match action.args.get(name) {
            Some(value) => {
                validate_arg(value, name, schema.as_ref(), global_validate, *validate)?;
                Ok(ParamValue::Value(value.clone()))
            }
            None => Ok(ParamValue::Undefined),
        },
        CompiledSource::Context(None) => Ok(ParamValue::Context(action.context.clone())),
        CompiledSource::Context(Some(property)) => Ok(ParamValue::from_option(action.context.get(property))),
        CompiledSource::Info => Ok(ParamValue::Info(action.info.clone())),
        CompiledSource::PubSub(None) => Ok(ParamValue::PubSub(pub_sub.clone())),
        CompiledSource::PubSub(Some(trigger)) => {
            Ok(ParamValue::Publisher(Publisher::new(pub_sub.clone(), trigger.clone())))
        }
        CompiledSource::Custom(resolver) => resolver.resolve(action).await,
    }
}

fn validate_arg(
    value: &Value,
    param: &str,
    schema: Option<&ArgSchema>,
    global_validate: bool,
    per_param: Option<bool>,
) -> ResolverResult<()> {
    match schema {
        Some(schema) if should_validate(global_validate, per_param) => schema.validate(value, param),
        _ => Ok(()),
    }
}
