//! `Publish` (`spec.md` §4.3, §4.5): hands the resolved object to the
//! global symbol store under the statement's result name, tagged with the
//! current feature set and business activity.

use aro_ast::{Preposition, Role};
use aro_errors::{AroError, AroResult, ErrorKind};
use aro_runtime::{Action, ActionOutcome, ActionRequest};
use async_trait::async_trait;

pub struct PublishAction;

#[async_trait]
impl Action for PublishAction {
    fn role(&self) -> Role {
        Role::Export
    }

    fn verbs(&self) -> &'static [&'static str] {
        &["publish"]
    }

    fn valid_prepositions(&self) -> &'static [Preposition] {
        &[Preposition::To, Preposition::With, Preposition::From]
    }

    async fn execute(&self, request: &ActionRequest<'_>) -> AroResult<ActionOutcome> {
        let value = request.object.as_value().cloned().ok_or_else(|| {
            AroError::new(ErrorKind::TypeMismatch, "publish requires a resolved value, not a system object")
        })?;
        let name = request.statement.result.base.as_str();
        request.ctx.env.global_store.publish(
            name,
            value,
            request.ctx.feature_set_name.clone(),
            request.ctx.business_activity.clone(),
        );
        Ok(ActionOutcome::NoBind)
    }
}
