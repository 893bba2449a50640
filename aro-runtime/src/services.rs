//! Name-erased service lookup by type identity (`spec.md` §4.1:
//! `service<T>` / `register`). One registry is created at the root context
//! and shared by every descendant; registration replaces whatever was
//! there before, matching the read-mostly discipline `spec.md` §5 asks of
//! shared engine resources.

use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::sync::Arc;

#[derive(Default)]
pub struct ServiceRegistry {
    entries: RwLock<fxhash::FxHashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        ServiceRegistry { entries: RwLock::new(fxhash::FxHashMap::default()) }
    }

    pub fn register<T: Send + Sync + 'static>(&self, service: Arc<T>) {
        self.entries.write().insert(TypeId::of::<T>(), service);
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.entries.read().get(&TypeId::of::<T>()).cloned().and_then(|a| a.downcast::<T>().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Greeter(&'static str);

    #[test]
    fn register_then_lookup_round_trips() {
        let services = ServiceRegistry::new();
        services.register(Arc::new(Greeter("hi")));
        assert_eq!(services.get::<Greeter>().unwrap().0, "hi");
    }

    #[test]
    fn lookup_of_unregistered_type_is_none() {
        let services = ServiceRegistry::new();
        assert!(services.get::<Greeter>().is_none());
    }

    #[test]
    fn re_register_replaces_prior_instance() {
        let services = ServiceRegistry::new();
        services.register(Arc::new(Greeter("first")));
        services.register(Arc::new(Greeter("second")));
        assert_eq!(services.get::<Greeter>().unwrap().0, "second");
    }
}
