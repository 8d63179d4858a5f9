//! Declarative field metadata
//!
//! Describes what a field resolves to: a handler bound to a resolver
//! instance, a method or property of the owning object type, or a plain
//! property of the parent value. Metadata is immutable once handed to the
//! factories.

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use sprocket_interfaces::{AuthChecker, Instance, Middleware, ResolverError, ResolverResult, ServiceKey, TypeThunk};
use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use crate::params::{ParamMetadata, ParamValue};

type HandlerFn = dyn Fn(Instance, Vec<ParamValue>) -> BoxFuture<'static, ResolverResult<Value>> + Send + Sync;

/// Business logic invoked with the target instance and resolved parameters
#[derive(Clone)]
pub struct Handler(Arc<HandlerFn>);

impl Handler {
    /// Handler over the type-erased instance
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(Instance, Vec<ParamValue>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ResolverResult<Value>> + Send + 'static,
    {
        Self(Arc::new(move |instance, params| handler(instance, params).boxed()))
    }

    /// Handler over a concrete instance type
    ///
    /// Fails with [`ResolverError::TargetMismatch`] when invoked with an
    /// instance of another type.
    pub fn for_type<T, F, Fut>(handler: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(Arc<T>, Vec<ParamValue>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ResolverResult<Value>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        Self(Arc::new(move |instance: Instance, params| {
            match instance.downcast::<T>() {
                Ok(target) => handler(target, params).boxed(),
                Err(_) => futures::future::ready(Err(ResolverError::TargetMismatch {
                    expected: std::any::type_name::<T>(),
                }))
                .boxed(),
            }
        }))
    }

    pub fn call(&self, instance: Instance, params: Vec<ParamValue>) -> BoxFuture<'static, ResolverResult<Value>> {
        (self.0)(instance, params)
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Handler")
    }
}

/// How an advanced field reads its value from the owning object
#[derive(Debug, Clone)]
pub enum FieldAccess {
    /// Call a method with resolved parameters
    Method(Handler),
    /// Read a named property
    Property(String),
}

/// Where an advanced field resolver is declared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldResolverKind {
    /// On the object type itself
    Internal,
    /// On a separate resolver type
    External,
}

/// Query, mutation or subscription handler
#[derive(Clone)]
pub struct HandlerMetadata {
    pub field_name: String,
    /// Container key of the resolver type
    pub target: ServiceKey,
    pub handler: Handler,
    pub params: Vec<ParamMetadata>,
    /// `None` for public fields
    pub roles: Option<Vec<String>>,
    pub middlewares: Vec<Arc<dyn Middleware>>,
    /// Overrides the global auth checker
    pub auth_checker: Option<Arc<dyn AuthChecker>>,
}

impl HandlerMetadata {
    pub fn new(field_name: impl Into<String>, target: ServiceKey, handler: Handler) -> Self {
        Self {
            field_name: field_name.into(),
            target,
            handler,
            params: Vec::new(),
            roles: None,
            middlewares: Vec::new(),
            auth_checker: None,
        }
    }

    pub fn with_params(mut self, params: Vec<ParamMetadata>) -> Self {
        self.params = params;
        self
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    pub fn with_auth_checker(mut self, checker: Arc<dyn AuthChecker>) -> Self {
        self.auth_checker = Some(checker);
        self
    }
}

impl std::fmt::Debug for HandlerMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerMetadata")
            .field("field_name", &self.field_name)
            .field("target", &self.target)
            .field("params", &self.params)
            .field("roles", &self.roles)
            .field("middlewares", &self.middlewares.len())
            .finish_non_exhaustive()
    }
}

/// Field resolved against its owning object type
#[derive(Clone)]
pub struct FieldResolverMetadata {
    pub field_name: String,
    pub kind: FieldResolverKind,
    /// Resolver type for external fields
    pub target: Option<ServiceKey>,
    /// Owning object type, evaluated when the resolver is built
    pub object_type: TypeThunk,
    pub access: FieldAccess,
    pub params: Vec<ParamMetadata>,
    pub roles: Option<Vec<String>>,
    pub middlewares: Vec<Arc<dyn Middleware>>,
    pub auth_checker: Option<Arc<dyn AuthChecker>>,
}

impl FieldResolverMetadata {
    /// Field declared on the object type itself
    pub fn internal(field_name: impl Into<String>, object_type: TypeThunk, access: FieldAccess) -> Self {
        Self {
            field_name: field_name.into(),
            kind: FieldResolverKind::Internal,
            target: None,
            object_type,
            access,
            params: Vec::new(),
            roles: None,
            middlewares: Vec::new(),
            auth_checker: None,
        }
    }

    /// Field declared on a separate resolver type
    pub fn external(field_name: impl Into<String>, object_type: TypeThunk, target: ServiceKey, handler: Handler) -> Self {
        Self {
            kind: FieldResolverKind::External,
            target: Some(target),
            ..Self::internal(field_name, object_type, FieldAccess::Method(handler))
        }
    }

    pub fn with_params(mut self, params: Vec<ParamMetadata>) -> Self {
        self.params = params;
        self
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    pub fn with_auth_checker(mut self, checker: Arc<dyn AuthChecker>) -> Self {
        self.auth_checker = Some(checker);
        self
    }

    /// View as handler metadata, when the field has a target and a method
    pub fn as_handler_metadata(&self) -> Option<HandlerMetadata> {
        let FieldAccess::Method(handler) = &self.access else {
            return None;
        };

        Some(HandlerMetadata {
            field_name: self.field_name.clone(),
            target: self.target?,
            handler: handler.clone(),
            params: self.params.clone(),
            roles: self.roles.clone(),
            middlewares: self.middlewares.clone(),
            auth_checker: self.auth_checker.clone(),
        })
    }
}

impl std::fmt::Debug for FieldResolverMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldResolverMetadata")
            .field("field_name", &self.field_name)
            .field("kind", &self.kind)
            .field("target", &self.target)
            .field("access", &self.access)
            .field("params", &self.params)
            .field("roles", &self.roles)
            .field("middlewares", &self.middlewares.len())
            .finish_non_exhaustive()
    }
}

/// Plain field read from the parent value
#[derive(Clone, Default)]
pub struct FieldMetadata {
    pub name: String,
    pub roles: Option<Vec<String>>,
    pub middlewares: Vec<Arc<dyn Middleware>>,
    pub auth_checker: Option<Arc<dyn AuthChecker>>,
}

impl FieldMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    pub fn with_auth_checker(mut self, checker: Arc<dyn AuthChecker>) -> Self {
        self.auth_checker = Some(checker);
        self
    }
}

impl std::fmt::Debug for FieldMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldMetadata")
            .field("name", &self.name)
            .field("roles", &self.roles)
            .field("middlewares", &self.middlewares.len())
            .finish_non_exhaustive()
    }
}

/// Metadata of any resolvable field
#[derive(Debug, Clone)]
pub enum ResolverMetadata {
    Handler(HandlerMetadata),
    AdvancedField(FieldResolverMetadata),
    SimpleField(FieldMetadata),
}

impl ResolverMetadata {
    pub fn field_name(&self) -> &str {
        match self {
            Self::Handler(metadata) => &metadata.field_name,
            Self::AdvancedField(metadata) => &metadata.field_name,
            Self::SimpleField(metadata) => &metadata.name,
        }
    }
}

impl From<HandlerMetadata> for ResolverMetadata {
    fn from(metadata: HandlerMetadata) -> Self {
        Self::Handler(metadata)
    }
}

impl From<FieldResolverMetadata> for ResolverMetadata {
    fn from(metadata: FieldResolverMetadata) -> Self {
        Self::AdvancedField(metadata)
    }
}

impl From<FieldMetadata> for ResolverMetadata {
    fn from(metadata: FieldMetadata) -> Self {
        Self::SimpleField(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sprocket_interfaces::ObjectType;

    struct RecipeResolver {
        prefix: String,
    }

    fn recipe_type() -> TypeThunk {
        Arc::new(|| ObjectType::new("Recipe"))
    }

    fn greet() -> Handler {
        Handler::for_type(|resolver: Arc<RecipeResolver>, _params| async move {
            Ok(json!(format!("{} recipe", resolver.prefix)))
        })
    }

    #[tokio::test]
    async fn test_typed_handler_downcasts_instance() {
        let instance: Instance = Arc::new(RecipeResolver {
            prefix: "Tasty".to_string(),
        });

        let result = greet().call(instance, Vec::new()).await.unwrap();
        assert_eq!(result, json!("Tasty recipe"));
    }

    #[tokio::test]
    async fn test_typed_handler_rejects_other_instances() {
        let instance: Instance = Arc::new(json!({}));

        let err = greet().call(instance, Vec::new()).await.unwrap_err();
        assert!(matches!(err, ResolverError::TargetMismatch { expected } if expected.ends_with("RecipeResolver")));
    }

    #[test]
    fn test_external_field_as_handler_metadata() {
        let field = FieldResolverMetadata::external("author", recipe_type(), ServiceKey::of::<RecipeResolver>(), greet())
            .with_params(vec![ParamMetadata::root(0)])
            .with_roles(["editor"]);

        let handler = field.as_handler_metadata().unwrap();

        assert_eq!(handler.field_name, "author");
        assert_eq!(handler.target, ServiceKey::of::<RecipeResolver>());
        assert_eq!(handler.params.len(), 1);
        assert_eq!(handler.roles, Some(vec!["editor".to_string()]));
    }

    #[test]
    fn test_property_field_has_no_handler_view() {
        let field = FieldResolverMetadata::internal("title", recipe_type(), FieldAccess::Property("title".into()));
        assert!(field.as_handler_metadata().is_none());
        assert_eq!(field.kind, FieldResolverKind::Internal);
    }

    #[test]
    fn test_metadata_field_names() {
        let simple: ResolverMetadata = FieldMetadata::new("title").into();
        let handler: ResolverMetadata =
            HandlerMetadata::new("recipes", ServiceKey::of::<RecipeResolver>(), greet()).into();

        assert_eq!(simple.field_name(), "title");
        assert_eq!(handler.field_name(), "recipes");
    }
}
