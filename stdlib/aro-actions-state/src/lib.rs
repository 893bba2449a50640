//! The `Accept` state-transition action (`spec.md` §4.6).

mod accept;

pub use accept::AcceptAction;

use aro_runtime::ActionRegistry;
use std::sync::Arc;

pub fn register_all(registry: &mut ActionRegistry) {
    registry.register(Arc::new(AcceptAction));
}
