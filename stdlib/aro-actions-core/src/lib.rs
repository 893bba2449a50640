//! Compute, Validate, Compare, Transform and Extract (`spec.md` §4.2):
//! the specifier-routed value-transformation actions.

mod compare;
mod compute;
mod extract;
mod transform;
mod validate;

pub use compare::CompareAction;
pub use compute::ComputeAction;
pub use extract::ExtractAction;
pub use transform::TransformAction;
pub use validate::ValidateAction;

use aro_runtime::ActionRegistry;
use std::sync::Arc;

/// Registers every action this crate provides.
pub fn register_all(registry: &mut ActionRegistry) {
    registry.register(Arc::new(ComputeAction));
    registry.register(Arc::new(ValidateAction));
    registry.register(Arc::new(CompareAction));
    registry.register(Arc::new(TransformAction));
    registry.register(Arc::new(ExtractAction));
}
