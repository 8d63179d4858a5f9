//! Type converter registry
//!
//! Default [`TypeConverter`]: object types registered with a serde type are
//! deserialized from the root value; unregistered types fall back to the plain
//! JSON value.

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sprocket_interfaces::{Instance, ObjectType, ObjectValue, ResolverError, ResolverResult, TypeConverter};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

type ConvertFn = Arc<dyn Fn(&Value) -> ResolverResult<Arc<dyn ObjectValue>> + Send + Sync>;

/// Instance of a registered serde type
///
/// Properties are read from the re-serialized instance, so serde defaults and
/// renames apply. Handlers downcast to `T`.
pub struct TypedObject<T> {
    instance: Arc<T>,
    properties: Value,
}

impl<T: Any + Send + Sync> ObjectValue for TypedObject<T> {
    fn property(&self, name: &str) -> Option<Value> {
        self.properties.get(name).cloned()
    }

    fn into_instance(self: Arc<Self>) -> Instance {
        self.instance.clone()
    }
}

/// Registry of object type conversions keyed by type name
#[derive(Default)]
pub struct TypeConverterRegistry {
    converters: RwLock<HashMap<String, ConvertFn>>,
    strict: bool,
}

impl TypeConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject unregistered types instead of passing the JSON value through
    pub fn strict() -> Self {
        Self {
            converters: RwLock::default(),
            strict: true,
        }
    }

    /// Convert roots of `type_name` into `T`
    pub fn register<T>(&self, type_name: impl Into<String>) -> &Self
    where
        T: DeserializeOwned + Serialize + Send + Sync + 'static,
    {
        let type_name = type_name.into();
        let name = type_name.clone();
        self.register_with(type_name, move |root| {
            let instance: T =
                serde_json::from_value(root.clone()).map_err(|e| ResolverError::conversion(&name, e.to_string()))?;
            let properties =
                serde_json::to_value(&instance).map_err(|e| ResolverError::conversion(&name, e.to_string()))?;

            Ok(Arc::new(TypedObject {
                instance: Arc::new(instance),
                properties,
            }) as Arc<dyn ObjectValue>)
        })
    }

    /// Register a custom conversion
    pub fn register_with<F>(&self, type_name: impl Into<String>, convert: F) -> &Self
    where
        F: Fn(&Value) -> ResolverResult<Arc<dyn ObjectValue>> + Send + Sync + 'static,
    {
        self.converters.write().insert(type_name.into(), Arc::new(convert));
        self
    }

    pub fn is_registered(&self, type_name: &str) -> bool {
        self.converters.read().contains_key(type_name)
    }
}

impl TypeConverter for TypeConverterRegistry {
    fn convert(&self, target: &ObjectType, root: &Value) -> ResolverResult<Arc<dyn ObjectValue>> {
        let converter = self.converters.read().get(&target.name).cloned();

        match converter {
            Some(convert) => convert(root),
            None if self.strict => Err(ResolverError::conversion(
                &target.name,
                "no conversion registered",
            )),
            None => Ok(Arc::new(root.clone())),
        }
    }
}

impl std::fmt::Debug for TypeConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeConverterRegistry")
            .field("types", &self.converters.read().keys().collect::<Vec<_>>())
            .field("strict", &self.strict)
            .finish()
    }
}
