//! Read, Write, Append, Log, Return, Publish, Broadcast, Throw and
//! filesystem ARO actions (`spec.md` §4.2, §4.9).

mod append;
mod broadcast;
mod filesystem;
mod log_action;
mod publish;
mod read;
mod return_action;
mod throw;
mod write;

pub use append::AppendAction;
pub use broadcast::BroadcastAction;
pub use filesystem::{CopyAction, CreateDirectoryAction, MoveAction};
pub use log_action::LogAction;
pub use publish::PublishAction;
pub use read::ReadAction;
pub use return_action::ReturnAction;
pub use throw::ThrowAction;
pub use write::WriteAction;

use aro_runtime::ActionRegistry;
use std::sync::Arc;

pub fn register_all(registry: &mut ActionRegistry) {
    registry.register(Arc::new(ReadAction));
    registry.register(Arc::new(WriteAction));
    registry.register(Arc::new(AppendAction));
    registry.register(Arc::new(LogAction));
    registry.register(Arc::new(ReturnAction));
    registry.register(Arc::new(PublishAction));
    registry.register(Arc::new(BroadcastAction));
    registry.register(Arc::new(ThrowAction));
    registry.register(Arc::new(CreateDirectoryAction));
    registry.register(Arc::new(CopyAction));
    registry.register(Arc::new(MoveAction));
}
