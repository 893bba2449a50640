use crate::object::{Capability, SystemObject};
use aro_errors::AroResult;
use aro_value::Value;
use async_trait::async_trait;

/// `request`, `pathParameters`, `queryParameters`, `body` (source): a
/// fixed map handed down by an HTTP handler invocation, read by field name
/// (`spec.md` §4.9). The (external) HTTP transport supplies the map;
/// the engine re-registers one `FieldObject` per identifier for the
/// duration of a single request.
pub struct FieldObject {
    data: Value,
}

impl FieldObject {
    pub fn new(data: Value) -> Self {
        FieldObject { data }
    }
}

#[async_trait]
impl SystemObject for FieldObject {
    fn capabilities(&self) -> Capability {
        Capability::Source
    }

    async fn read(&self, property: Option<&str>) -> AroResult<Value> {
        match property {
            Some(name) => Ok(self.data.field(name).cloned().unwrap_or(Value::Null)),
            None => Ok(self.data.clone()),
        }
    }
}

/// `headers` (source): like [`FieldObject`] but matches property names
/// case-insensitively, per `spec.md` §4.9.
pub struct HeadersObject {
    data: Value,
}

impl HeadersObject {
    pub fn new(data: Value) -> Self {
        HeadersObject { data }
    }
}

#[async_trait]
impl SystemObject for HeadersObject {
    fn capabilities(&self) -> Capability {
        Capability::Source
    }

    async fn read(&self, property: Option<&str>) -> AroResult<Value> {
        match property {
            Some(name) => {
                let Value::Map(m) | Value::Entity(m) = &self.data else {
                    return Ok(Value::Null);
                };
                let found = m.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.clone());
                Ok(found.unwrap_or(Value::Null))
            }
            None => Ok(self.data.clone()),
        }
    }
}
