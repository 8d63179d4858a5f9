//! Instance registry
//!
//! Default [`InstanceContainer`]: resolver instances registered up front, or
//! factories run once on first lookup with the result cached as a singleton.

use parking_lot::RwLock;
use sprocket_interfaces::{Instance, InstanceContainer, ServiceKey};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

type InstanceFactory = Arc<dyn Fn() -> Instance + Send + Sync>;

/// Registry of resolver target instances keyed by type
#[derive(Default)]
pub struct InstanceRegistry {
    instances: RwLock<HashMap<ServiceKey, Instance>>,
    factories: RwLock<HashMap<ServiceKey, InstanceFactory>>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a ready-made instance, replacing any previous registration
    pub fn register<T: Any + Send + Sync>(&self, instance: T) -> &Self {
        self.register_arc(Arc::new(instance))
    }

    /// Register a shared instance
    pub fn register_arc<T: Any + Send + Sync>(&self, instance: Arc<T>) -> &Self {
        let key = ServiceKey::of::<T>();
        self.factories.write().remove(&key);
        self.instances.write().insert(key, instance);
        self
    }

    /// Register a factory run on first lookup
    pub fn register_factory<T, F>(&self, factory: F) -> &Self
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let key = ServiceKey::of::<T>();
        self.instances.write().remove(&key);
        self.factories
            .write()
            .insert(key, Arc::new(move || Arc::new(factory()) as Instance));
        self
    }

    /// Typed lookup
    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.get_instance(&ServiceKey::of::<T>())?.downcast::<T>().ok()
    }

    pub fn contains(&self, key: &ServiceKey) -> bool {
        self.instances.read().contains_key(key) || self.factories.read().contains_key(key)
    }
}

impl InstanceContainer for InstanceRegistry {
    fn get_instance(&self, key: &ServiceKey) -> Option<Instance> {
        if let Some(instance) = self.instances.read().get(key) {
            return Some(instance.clone());
        }

        let factory = self.factories.read().get(key).cloned()?;

        // Built with no lock held; factories may resolve their own dependencies.
        debug!(service = %key, "Creating resolver instance");
        let built = factory();

        // A concurrent lookup may have stored the singleton in the meantime.
        let instance = self.instances.write().entry(*key).or_insert(built).clone();
        Some(instance)
    }
}

impl std::fmt::Debug for InstanceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceRegistry")
            .field("instances", &self.instances.read().len())
            .field("factories", &self.factories.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, PartialEq)]
    struct RecipeResolver {
        page_size: usize,
    }

    struct UserResolver;

    #[test]
    fn test_registered_instance_is_shared() {
        let registry = InstanceRegistry::new();
        registry.register(RecipeResolver { page_size: 20 });

        let first = registry.get::<RecipeResolver>().unwrap();
        let second = registry.get::<RecipeResolver>().unwrap();

        assert_eq!(first.page_size, 20);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(registry.get::<UserResolver>().is_none());
    }

    #[test]
    fn test_factory_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = InstanceRegistry::new();
        let counter = calls.clone();
        registry.register_factory(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            RecipeResolver { page_size: 10 }
        });

        assert!(registry.contains(&ServiceKey::of::<RecipeResolver>()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let first = registry.get::<RecipeResolver>().unwrap();
        let second = registry.get::<RecipeResolver>().unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_factory_resolves_dependency_from_registry() {
        struct RecipeService {
            resolver: Arc<RecipeResolver>,
        }

        let registry = Arc::new(InstanceRegistry::new());
        registry.register_factory(|| RecipeResolver { page_size: 5 });
        let inner = Arc::downgrade(&registry);
        registry.register_factory(move || RecipeService {
            resolver: inner.upgrade().and_then(|registry| registry.get::<RecipeResolver>()).unwrap(),
        });

        let lookup = registry.clone();
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let _ = tx.send(lookup.get::<RecipeService>().map(|service| service.resolver.page_size));
        });

        let page_size = rx.recv_timeout(std::time::Duration::from_secs(2)).unwrap();
        assert_eq!(page_size, Some(5));
        assert!(Arc::ptr_eq(
            &registry.get::<RecipeService>().unwrap().resolver,
            &registry.get::<RecipeResolver>().unwrap()
        ));
    }

    #[test]
    fn test_reregistration_replaces() {
        let registry = InstanceRegistry::new();
        registry
            .register_factory(|| RecipeResolver { page_size: 1 })
            .register(RecipeResolver { page_size: 2 });

        assert_eq!(registry.get::<RecipeResolver>().unwrap().page_size, 2);
    }
}
