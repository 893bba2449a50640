use crate::object::{Capability, SystemObject};
use aro_errors::AroResult;
use aro_events::Event;
use aro_value::Value;
use async_trait::async_trait;
use compact_str::CompactString;

/// `event` (source): the event that triggered the current handler
/// invocation. `type` reads the event's type; any other property reads a
/// payload field; no property flattens `type` and every payload field
/// into one map (`spec.md` §4.9).
pub struct EventObject {
    event: Event,
}

impl EventObject {
    pub fn new(event: Event) -> Self {
        EventObject { event }
    }
}

#[async_trait]
impl SystemObject for EventObject {
    fn capabilities(&self) -> Capability {
        Capability::Source
    }

    async fn read(&self, property: Option<&str>) -> AroResult<Value> {
        match property {
            Some("type") => Ok(Value::String(self.event.event_type.clone())),
            Some(name) => Ok(self.event.field(name).cloned().unwrap_or(Value::Null)),
            None => {
                let mut entries: Vec<(CompactString, Value)> =
                    self.event.payload.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                entries.push((CompactString::from("type"), Value::String(self.event.event_type.clone())));
                Ok(Value::map(entries))
            }
        }
    }
}
