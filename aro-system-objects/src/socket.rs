use crate::object::{Capability, SystemObject};
use aro_errors::AroResult;
use aro_value::Value;
use async_trait::async_trait;

/// `connection`, `packet` (source): socket-handler data handed down by the
/// (external) transport for one message invocation, read by field name
/// (`spec.md` §4.9). Outbound socket writes are a transport concern this
/// core does not implement, so `write` keeps the trait's default
/// unsupported behavior.
pub struct SocketObject {
    data: Value,
}

impl SocketObject {
    pub fn new(data: Value) -> Self {
        SocketObject { data }
    }
}

#[async_trait]
impl SystemObject for SocketObject {
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
