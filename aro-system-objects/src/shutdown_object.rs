use crate::object::{Capability, SystemObject};
use aro_errors::AroResult;
use aro_shutdown::ShutdownCoordinator;
use aro_value::Value;
use async_trait::async_trait;
use compact_str::CompactString;
use std::sync::Arc;

/// `shutdown` (source): `{reason, signal?, exitCode?}`, populated once the
/// coordinator has fired (`spec.md` §4.9). Read before shutdown begins,
/// every field is `Null`.
pub struct ShutdownObject {
    coordinator: Arc<ShutdownCoordinator>,
}

impl ShutdownObject {
    pub fn new(coordinator: Arc<ShutdownCoordinator>) -> Self {
        ShutdownObject { coordinator }
    }
}

#[async_trait]
impl SystemObject for ShutdownObject {
    fn capabilities(&self) -> Capability {
        Capability::Source
    }

    async fn read(&self, property: Option<&str>) -> AroResult<Value> {
        let info = self.coordinator.info();
        let field = |name: &str| -> Value {
            match (&info, name) {
                (Some(i), "reason") => Value::string(i.reason.clone()),
                (Some(i), "signal") => i.signal.clone().map(Value::string).unwrap_or(Value::Null),
                (Some(i), "exitCode") => i.exit_code.map(|c| Value::Int(c as i64)).unwrap_or(Value::Null),
                _ => Value::Null,
            }
        };
        match property {
            Some(name) => Ok(field(name)),
            None => Ok(Value::map([
                (CompactString::from("reason"), field("reason")),
                (CompactString::from("signal"), field("signal")),
                (CompactString::from("exitCode"), field("exitCode")),
            ])),
        }
    }
}
