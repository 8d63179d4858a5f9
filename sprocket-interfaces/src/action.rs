//! Per-request resolution data
//!
//! Every field resolution receives four values from the schema engine: the
//! parent (root) value, the field arguments, the request context and the
//! resolve info. They are bundled into [`ActionData`] and handed to every
//! middleware and parameter resolver in the chain.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// The root/args/context/info bundle for a single field resolution
#[derive(Clone)]
pub struct ActionData {
    /// Parent value of the field being resolved
    pub root: Value,
    /// Field arguments
    pub args: Map<String, Value>,
    /// Request context shared by every field of the same request
    pub context: Arc<RequestContext>,
    /// Information about the field being resolved
    pub info: ResolveInfo,
}

impl ActionData {
    pub fn new(root: Value, args: Map<String, Value>, context: Arc<RequestContext>, info: ResolveInfo) -> Self {
        Self {
            root,
            args,
            context,
            info,
        }
    }

    /// Get a single argument by name
    pub fn arg(&self, name: &str) -> Option<&Value> {
        self.args.get(name)
    }
}

impl std::fmt::Debug for ActionData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionData")
            .field("root", &self.root)
            .field("args", &self.args)
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

/// Information about the field being resolved
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveInfo {
    /// Name of the field in the schema
    pub field_name: String,
    /// Name of the object type owning the field
    pub parent_type: String,
}

impl ResolveInfo {
    pub fn new(field_name: impl Into<String>, parent_type: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            parent_type: parent_type.into(),
        }
    }
}

/// Request-scoped context
///
/// Holds named JSON values, readable by resolver parameters and writable by
/// business logic, plus typed extensions such as the authenticated principal.
/// One context is shared by all the fields resolved for a request.
#[derive(Default)]
pub struct RequestContext {
    values: RwLock<Map<String, Value>>,
    extensions: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context pre-populated with named values
    pub fn with_values(values: Map<String, Value>) -> Self {
        Self {
            values: RwLock::new(values),
            extensions: RwLock::default(),
        }
    }

    /// Add a typed extension, builder style
    pub fn with_extension<T: Any + Send + Sync>(self, extension: T) -> Self {
        self.insert_extension(extension);
        self
    }

    /// Get a named value
    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.read().get(key).cloned()
    }

    /// Set a named value, returning the previous one
    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.values.write().insert(key.into(), value)
    }

    /// Remove a named value
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.values.write().remove(key)
    }

    /// Snapshot of all named values
    pub fn values(&self) -> Map<String, Value> {
        self.values.read().clone()
    }

    /// Store a typed extension, replacing any previous value of the same type
    pub fn insert_extension<T: Any + Send + Sync>(&self, extension: T) {
        self.extensions.write().insert(TypeId::of::<T>(), Arc::new(extension));
    }

    /// Get a typed extension
    pub fn extension<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let extension = self.extensions.read().get(&TypeId::of::<T>()).cloned()?;
        extension.downcast::<T>().ok()
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("values", &*self.values.read())
            .field("extensions", &self.extensions.read().len())
            .finish()
    }
}
