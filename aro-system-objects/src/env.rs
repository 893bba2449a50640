use crate::object::{Capability, SystemObject};
use aro_errors::AroResult;
use aro_value::Value;
use async_trait::async_trait;
use compact_str::CompactString;

/// `env` (source): property = variable name; no property returns the full
/// map.
pub struct EnvObject;

#[async_trait]
impl SystemObject for EnvObject {
    fn capabilities(&self) -> Capability {
        Capability::Source
    }

    async fn read(&self, property: Option<&str>) -> AroResult<Value> {
        match property {
            Some(name) => Ok(std::env::var(name).map(Value::string).unwrap_or(Value::Null)),
            None => {
                let entries = std::env::vars().map(|(k, v)| (CompactString::from(k), Value::string(v)));
                Ok(Value::map(entries))
            }
        }
    }
}
