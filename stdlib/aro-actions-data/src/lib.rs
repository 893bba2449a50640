//! Create, Update, Delete, Sort, Merge, Retrieve and Include (`spec.md`
//! §4.2, §4.7): entity shaping and repository CRUD.

mod create;
mod delete;
mod include;
mod merge;
mod retrieve;
mod sort;
mod update;

pub use create::CreateAction;
pub use delete::DeleteAction;
pub use include::IncludeAction;
pub use merge::MergeAction;
pub use retrieve::RetrieveAction;
pub use sort::SortAction;
pub use update::UpdateAction;

use aro_ast::Condition;
use aro_errors::{AroError, AroResult, ErrorKind};
use aro_value::Value;

/// Repository operations support only single-field equality filtering
/// (`spec.md` §4.7). A statement's optional `filter` (its repository
/// `where`-clause — see `StatementDescriptor::filter`'s doc comment for why
/// this is a separate field from the `when`-guard `condition`) must
/// therefore reduce to `Condition::Equals`; anything else is a contract
/// error rather than a silent no-op.
pub(crate) fn single_field_filter(filter: Option<&Condition>) -> AroResult<Option<(&str, &Value)>> {
    match filter {
        None => Ok(None),
        Some(Condition::Equals(field, value)) => Ok(Some((field.as_str(), value))),
        Some(_) => Err(AroError::new(
            ErrorKind::Runtime,
            "repository operations support only single-field equality `where` clauses",
        )),
    }
}

use aro_runtime::ActionRegistry;
use std::sync::Arc;

pub fn register_all(registry: &mut ActionRegistry) {
    registry.register(Arc::new(CreateAction));
    registry.register(Arc::new(UpdateAction));
    registry.register(Arc::new(DeleteAction));
    registry.register(Arc::new(SortAction));
    registry.register(Arc::new(MergeAction));
    registry.register(Arc::new(RetrieveAction));
    registry.register(Arc::new(IncludeAction));
}
