//! Type conversion interface
//!
//! Fields declared on an object type are resolved against a concrete instance
//! of that type, rebuilt from the plain root value on every request. The same
//! field metadata may serve many concrete roots (interfaces, unions), so the
//! conversion cannot be cached.

use serde_json::Value;
use std::sync::Arc;

use crate::container::Instance;
use crate::error::ResolverResult;

/// Reference to a schema object type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectType {
    pub name: String,
}

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Lazily evaluated object type reference
///
/// Types can reference each other cyclically, so metadata records a thunk that
/// is only evaluated when the resolver is built.
pub type TypeThunk = Arc<dyn Fn() -> ObjectType + Send + Sync>;

/// Concrete object instance a field can be resolved against
pub trait ObjectValue: Send + Sync + 'static {
    /// Read a named property, `None` when absent
    fn property(&self, name: &str) -> Option<Value>;

    /// Erase into an instance handlers can downcast
    fn into_instance(self: Arc<Self>) -> Instance;
}

impl ObjectValue for Value {
    fn property(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn into_instance(self: Arc<Self>) -> Instance {
        self
    }
}

/// Converts a plain root value into an instance of the target type
pub trait TypeConverter: Send + Sync {
    fn convert(&self, target: &ObjectType, root: &Value) -> ResolverResult<Arc<dyn ObjectValue>>;
}
