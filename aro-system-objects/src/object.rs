use aro_errors::{AroError, AroResult, ErrorKind};
use aro_value::Value;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Source,
    Sink,
    Bidirectional,
}

/// A built-in identifier's runtime adapter (`spec.md` §4.9). `read`/`write`
/// default to a capability-mismatch error so each adapter only needs to
/// override the direction(s) it actually supports.
#[async_trait]
pub trait SystemObject: Send + Sync {
    fn capabilities(&self) -> Capability;

    async fn read(&self, property: Option<&str>) -> AroResult<Value> {
        let _ = property;
        Err(unsupported("read"))
    }

    async fn write(&self, value: Value) -> AroResult<()> {
        let _ = value;
        Err(unsupported("write"))
    }
}

fn unsupported(direction: &str) -> AroError {
    AroError::new(ErrorKind::Runtime, format!("this system object does not support {direction}"))
}
