//! `Accept` (`spec.md` §4.6): `<Accept the <transition: FROM_to_TO> on the
//! <entity: field>.>`. Like [`aro_actions_data::UpdateAction`][update], this
//! re-binds an existing context variable, so it performs its own
//! `unbind`+`bind` and reports [`ActionOutcome::NoBind`] rather than racing
//! the dispatcher's write-once auto-bind.
//!
//! [update]: https://docs.rs/aro-actions-data

use aro_ast::{Preposition, Role};
use aro_errors::{AroError, AroResult, ErrorKind};
use aro_events::Event;
use aro_runtime::{Action, ActionOutcome, ActionRequest};
use aro_value::Value;
use async_trait::async_trait;

pub struct AcceptAction;

fn parse_transition(specifier: &str) -> AroResult<(&str, &str)> {
    let mut parts = specifier.splitn(2, "_to_");
    let from = parts.next().filter(|s| !s.is_empty());
    let to = parts.next().filter(|s| !s.is_empty());
    match (from, to) {
        (Some(from), Some(to)) => Ok((from, to)),
        _ => Err(AroError::new(
            ErrorKind::Runtime,
            format!("invalid transition specifier `{specifier}`, expected `FROM_to_TO`"),
        )),
    }
}

#[async_trait]
impl Action for AcceptAction {
    fn role(&self) -> Role {
        Role::Own
    }

    fn verbs(&self) -> &'static [&'static str] {
        &["accept"]
    }

    fn valid_prepositions(&self) -> &'static [Preposition] {
        &[Preposition::On]
    }

    async fn execute(&self, request: &ActionRequest<'_>) -> AroResult<ActionOutcome> {
        let specifier = request
            .first_specifier()
            .ok_or_else(|| AroError::new(ErrorKind::Runtime, "accept requires a `FROM_to_TO` transition specifier"))?;
        let (from, to) = parse_transition(specifier)?;

        let object_name = request.statement.object.base.as_str();
        let field = request.object_specifiers().first().map(|s| s.as_str()).unwrap_or("status");

        let entity = request.ctx.resolve(object_name).ok_or_else(|| AroError::undefined_variable(object_name))?;
        let map = match &entity {
            Value::Map(m) | Value::Entity(m) => m.clone(),
            other => return Err(AroError::type_mismatch("map or entity", other)),
        };

        let actual = map.get(field).cloned().unwrap_or(Value::Null);
        let actual_str = match &actual {
            Value::String(s) => s.to_string(),
            other => other.to_string(),
        };
        if actual_str != from {
            return Err(AroError::state_transition_rejected(from, to, &actual_str, object_name, field));
        }

        let updated_map = map.with_set(field, Value::string(to));
        let updated = match &entity {
            Value::Entity(_) => Value::Entity(updated_map.clone()),
            _ => Value::Map(updated_map.clone()),
        };

        request.ctx.unbind(object_name);
        request.ctx.bind(object_name, updated.clone())?;

        let entity_id = updated_map.get("id").cloned();
        request
            .ctx
            .env
            .event_bus
            .emit(Event::state_transition(field, object_name, from, to, entity_id, updated));

        Ok(ActionOutcome::NoBind)
    }
}
