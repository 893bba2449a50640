use crate::object::SystemObject;
use aro_errors::{AroError, AroResult, ErrorKind};
use std::collections::HashMap;
use std::sync::Arc;

pub type Factory = Arc<dyn Fn(&[String]) -> AroResult<Arc<dyn SystemObject>> + Send + Sync>;

/// Maps a built-in identifier (`console`, `file`, `url`, ...) to a factory
/// that builds a fresh adapter instance from the object descriptor's
/// specifiers (`spec.md` §4.9). Read-mostly: populated once at startup,
/// then only read from during dispatch.
#[derive(Default)]
pub struct SystemObjectRegistry {
    factories: HashMap<String, Factory>,
}

impl SystemObjectRegistry {
    pub fn new() -> Self {
        SystemObjectRegistry { factories: HashMap::new() }
    }

    pub fn register(&mut self, identifier: impl Into<String>, factory: Factory) {
        self.factories.insert(identifier.into(), factory);
    }

    pub fn is_system_object(&self, identifier: &str) -> bool {
        self.factories.contains_key(identifier)
    }

    pub fn create(&self, identifier: &str, specifiers: &[String]) -> AroResult<Arc<dyn SystemObject>> {
        let factory = self
            .factories
            .get(identifier)
            .ok_or_else(|| AroError::new(ErrorKind::MissingService, format!("no system object named `{identifier}`")))?;
        factory(specifiers)
    }

    /// Builds a new registry carrying every factory this one has, with
    /// `extra` layered on top (overwriting identifiers it shares). Used to
    /// give one HTTP/event/socket handler invocation request-scoped
    /// objects (`request`, `pathParameters`, `event`, ...) without mutating
    /// the engine-wide registry every other invocation shares.
    pub fn overlay(&self, extra: impl IntoIterator<Item = (String, Factory)>) -> SystemObjectRegistry {
        let mut factories = self.factories.clone();
        for (identifier, factory) in extra {
            factories.insert(identifier, factory);
        }
        SystemObjectRegistry { factories }
    }
}
