//! The runtime variable context and scope graph (`spec.md` §4.1).

use crate::ServiceRegistry;
use aro_errors::{AroError, AroResult};
use aro_events::EventBus;
use aro_globals::GlobalSymbolStore;
use aro_repository::RepositoryStore;
use aro_streaming::StreamRegistry;
use aro_system_objects::SystemObjectRegistry;
use arcstr::ArcStr;
use aro_value::{Value, ValueMap};
use compact_str::CompactString;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

/// `spec.md` §3's `outputContext`: how an error or response should be
/// rendered back to whatever's driving this execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputContext {
    Human,
    Machine,
    Developer,
}

/// `spec.md` I6: every response carries a status string and a data map.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: ArcStr,
    pub reason: Option<ArcStr>,
    pub data: ValueMap,
}

impl Response {
    pub fn ok(data: ValueMap) -> Self {
        Response { status: ArcStr::from("OK"), reason: None, data }
    }
}

/// The engine-wide resources every context in a tree shares by reference
/// (`spec.md` §4.1: "child inherits ... services and the event bus and
/// global store"). Bundled behind one `Arc` rather than six separate
/// fields on [`RuntimeContext`], the way the teacher groups related shared
/// state into a single runtime struct instead of threading each piece
/// through individually.
pub struct Environment {
    pub event_bus: Arc<EventBus>,
    pub global_store: Arc<GlobalSymbolStore>,
    pub repository_store: Arc<RepositoryStore>,
    pub stream_registry: Arc<StreamRegistry>,
    pub system_objects: Arc<SystemObjectRegistry>,
    pub services: Arc<ServiceRegistry>,
}

impl Environment {
    pub fn new(system_objects: Arc<SystemObjectRegistry>) -> Arc<Self> {
        Arc::new(Environment {
            event_bus: Arc::new(EventBus::new()),
            global_store: Arc::new(GlobalSymbolStore::new()),
            repository_store: Arc::new(RepositoryStore::new()),
            stream_registry: Arc::new(StreamRegistry::new()),
            system_objects,
            services: Arc::new(ServiceRegistry::new()),
        })
    }

    /// Shares every engine-wide resource with `self` except the system
    /// object registry, which is replaced wholesale. Used to give a single
    /// HTTP/event/socket handler invocation request-scoped system objects
    /// (via [`SystemObjectRegistry::overlay`]) without disturbing the
    /// event bus, global store, or repositories every other invocation
    /// shares.
    pub fn with_system_objects(&self, system_objects: Arc<SystemObjectRegistry>) -> Arc<Self> {
        Arc::new(Environment {
            event_bus: self.event_bus.clone(),
            global_store: self.global_store.clone(),
            repository_store: self.repository_store.clone(),
            stream_registry: self.stream_registry.clone(),
            system_objects,
            services: self.services.clone(),
        })
    }
}

/// A node in the scope graph (`spec.md` §4.1). Bindings always land on the
/// node they're created on; `resolve` walks self -> parent -> ... The
/// parent handle is read-only from a child's perspective — `spec.md` §9
/// calls for explicit parent handles over a cyclic graph, since lifetimes
/// here are strictly nested.
pub struct RuntimeContext {
    pub feature_set_name: ArcStr,
    pub business_activity: ArcStr,
    pub output_context: OutputContext,
    pub execution_id: Uuid,
    parent: Option<Arc<RuntimeContext>>,
    bindings: RwLock<FxHashMap<CompactString, Value>>,
    response: RwLock<Option<Response>>,
    pub env: Arc<Environment>,
}

impl RuntimeContext {
    /// Creates the root context for one top-level invocation.
    pub fn root(
        feature_set_name: impl Into<ArcStr>,
        business_activity: impl Into<ArcStr>,
        output_context: OutputContext,
        env: Arc<Environment>,
    ) -> Arc<Self> {
        Arc::new(RuntimeContext {
            feature_set_name: feature_set_name.into(),
            business_activity: business_activity.into(),
            output_context,
            execution_id: Uuid::new_v4(),
            parent: None,
            bindings: RwLock::new(FxHashMap::default()),
            response: RwLock::new(None),
            env,
        })
    }

    /// `spec.md` §4.1: a fresh child node, used for loop-iteration and
    /// match-arm bodies as well as nested feature-set invocations. Inherits
    /// `output_context` and every shared engine resource; gets its own
    /// bindings/immutability table and a fresh execution id.
    pub fn create_child(self: &Arc<Self>, feature_set_name: impl Into<ArcStr>) -> Arc<Self> {
        self.create_child_for_activity(feature_set_name, self.business_activity.clone())
    }

    pub fn create_child_for_activity(
        self: &Arc<Self>,
        feature_set_name: impl Into<ArcStr>,
        business_activity: impl Into<ArcStr>,
    ) -> Arc<Self> {
        Arc::new(RuntimeContext {
            feature_set_name: feature_set_name.into(),
            business_activity: business_activity.into(),
            output_context: self.output_context,
            execution_id: Uuid::new_v4(),
            parent: Some(self.clone()),
            bindings: RwLock::new(FxHashMap::default()),
            response: RwLock::new(None),
            env: self.env.clone(),
        })
    }

    /// A name is framework-internal, and therefore freely rebindable in
    /// place, iff it starts with `_` (`spec.md` §4.1). This is the
    /// immutability test in its entirety — "the immutability record"
    /// `unbind` clears is just this same binding, since a user name is
    /// immutable for exactly as long as it remains bound.
    pub fn is_framework_internal(name: &str) -> bool {
        name.starts_with('_')
    }

    /// Inserts into the current node. Fails with `ImmutableRebind` if a
    /// non-framework name is already bound here.
    pub fn bind(&self, name: impl Into<CompactString>, value: Value) -> AroResult<()> {
        let name = name.into();
        let mut bindings = self.bindings.write();
        if !Self::is_framework_internal(&name) && bindings.contains_key(&name) {
            return Err(AroError::immutable_rebind(&name));
        }
        bindings.insert(name, value);
        Ok(())
    }

    pub fn bind_all(&self, entries: impl IntoIterator<Item = (CompactString, Value)>) -> AroResult<()> {
        for (name, value) in entries {
            self.bind(name, value)?;
        }
        Ok(())
    }

    /// Removes the binding (and with it, any immutability it was
    /// enforcing) from the current node only.
    pub fn unbind(&self, name: &str) {
        self.bindings.write().remove(name);
    }

    /// Walks self -> parent -> ... returning the first binding found.
    pub fn resolve(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.bindings.read().get(name) {
            return Some(v.clone());
        }
        self.parent.as_ref().and_then(|p| p.resolve(name))
    }

    /// Resolves a dotted `key_path` (`base.field1.field2`) by resolving the
    /// base name, then walking nested map/entity fields.
    pub fn resolve_path(&self, key_path: &str) -> Option<Value> {
        let mut segments = key_path.split('.');
        let base = segments.next()?;
        let mut current = self.resolve(base)?;
        for seg in segments {
            current = current.field(seg)?.clone();
        }
        Some(current)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.bindings.read().contains_key(name) || self.parent.as_ref().is_some_and(|p| p.exists(name))
    }

    pub fn service<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.env.services.get::<T>()
    }

    pub fn register_service<T: Send + Sync + 'static>(&self, service: Arc<T>) {
        self.env.services.register(service);
    }

    pub fn set_response(&self, response: Response) {
        *self.response.write() = Some(response);
    }

    pub fn get_response(&self) -> Option<Response> {
        self.response.read().clone()
    }

    pub fn has_response(&self) -> bool {
        self.response.read().is_some()
    }

    pub fn parent(&self) -> Option<&Arc<RuntimeContext>> {
        self.parent.as_ref()
    }
}
