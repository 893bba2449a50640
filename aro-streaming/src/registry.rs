use crate::source::StreamSource;
use aro_value::StreamId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps the opaque [`StreamId`] carried by `Value::Stream` to the live
/// producer it identifies. A `Value::Stream` handle is meaningless
/// without a registry to resolve it against; the registry lives
/// alongside a `RuntimeContext` and is shared (via `createChild`) down
/// the whole context tree.
#[derive(Default)]
pub struct StreamRegistry {
    sources: RwLock<HashMap<StreamId, Arc<dyn StreamSource>>>,
}

impl StreamRegistry {
    pub fn new() -> Self {
        StreamRegistry { sources: RwLock::new(HashMap::new()) }
    }

    pub fn register(&self, source: Arc<dyn StreamSource>) -> StreamId {
        let id = StreamId::next();
        self.sources.write().insert(id, source);
        id
    }

    pub fn get(&self, id: StreamId) -> Option<Arc<dyn StreamSource>> {
        self.sources.read().get(&id).cloned()
    }

    pub fn release(&self, id: StreamId) {
        self.sources.write().remove(&id);
    }
}
