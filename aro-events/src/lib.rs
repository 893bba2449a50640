//! The in-process event bus (`spec.md` §4.4) and state-transition guard
//! matching (`spec.md` §4.6).

mod bus;
mod guard;

pub use bus::{EventBus, EventHandler, SubscriptionId};
pub use guard::{StateGuard, StateGuardSet};

use arcstr::ArcStr;
use aro_value::Value;
use chrono::{DateTime, Utc};
use compact_str::CompactString;
use fxhash::FxHashMap;

/// `spec.md` §3: `{eventType, payload, timestamp}`. Distinguished subtypes
/// (`state.transition`, `websocket.*`, user-defined) are just different
/// `event_type` strings with conventional payload shapes; the bus does not
/// special-case them.
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: ArcStr,
    pub payload: FxHashMap<CompactString, Value>,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(event_type: impl Into<ArcStr>) -> Self {
        Event { event_type: event_type.into(), payload: FxHashMap::default(), timestamp: Utc::now() }
    }

    pub fn with_field(mut self, key: impl Into<CompactString>, value: Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }

    /// Read a dotted field path (`a.b.c`) out of the payload, per the
    /// guard-matching rule in `spec.md` §4.4: missing segments simply
    /// produce `None`, they are never an error.
    pub fn field(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.payload.get(first)?;
        for seg in segments {
            current = current.field(seg)?;
        }
        Some(current)
    }

    pub fn state_transition(
        field_name: impl Into<ArcStr>,
        object_name: impl Into<ArcStr>,
        from_state: impl Into<ArcStr>,
        to_state: impl Into<ArcStr>,
        entity_id: Option<Value>,
        entity: Value,
    ) -> Self {
        let mut ev = Event::new("state.transition")
            .with_field("fieldName", Value::String(field_name.into()))
            .with_field("objectName", Value::String(object_name.into()))
            .with_field("fromState", Value::String(from_state.into()))
            .with_field("toState", Value::String(to_state.into()))
            .with_field("entity", entity);
        if let Some(id) = entity_id {
            ev = ev.with_field("entityId", id);
        }
        ev
    }
}
