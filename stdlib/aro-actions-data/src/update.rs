//! `Update` (`spec.md` §4.2): the specifier names the field to overwrite
//! in the map already bound under the statement's result name.
//!
//! This is one of two actions (with `Accept`, `spec.md` §4.6) that
//! re-bind an existing user variable rather than introduce a new one.
//! `spec.md` §4.1 makes user bindings write-once, so `Update` performs its
//! own `unbind` + `bind` on the context directly and reports `NoBind` to
//! the dispatcher, instead of going through the normal auto-bind path that
//! would reject the second bind as an `ImmutableRebind`.

use aro_ast::{Preposition, Role};
use aro_errors::{AroError, AroResult, ErrorKind};
use aro_runtime::{Action, ActionOutcome, ActionRequest};
use aro_value::Value;
use async_trait::async_trait;

pub struct UpdateAction;

#[async_trait]
impl Action for UpdateAction {
    fn role(&self) -> Role {
        Role::Own
    }

    fn verbs(&self) -> &'static [&'static str] {
        &["update", "modify", "change", "set"]
    }

    fn valid_prepositions(&self) -> &'static [Preposition] {
        &[Preposition::With, Preposition::For]
    }

    async fn execute(&self, request: &ActionRequest<'_>) -> AroResult<ActionOutcome> {
        let field = request
            .first_specifier()
            .ok_or_else(|| AroError::new(ErrorKind::Runtime, "update requires a field specifier"))?;
        let new_value = request.object.as_value().cloned().ok_or_else(|| {
            AroError::new(ErrorKind::TypeMismatch, "update requires a resolved value, not a system object")
        })?;

        let base = request.statement.result.base.as_str();
        let current = request.ctx.resolve(base).ok_or_else(|| AroError::undefined_variable(base))?;
        let updated = match current {
            Value::Map(m) => Value::Map(m.with_set(field, new_value)),
            Value::Entity(m) => Value::Entity(m.with_set(field, new_value)),
            other => return Err(AroError::type_mismatch("map or entity", &other)),
        };

        request.ctx.unbind(base);
        request.ctx.bind(base, updated)?;
        Ok(ActionOutcome::NoBind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aro_ast::{ObjectDescriptor, ResultDescriptor, Span, StatementDescriptor};
    use aro_runtime::{Environment, ObjectResolution, OutputContext, RuntimeContext};
    use aro_system_objects::SystemObjectRegistry;
    use compact_str::CompactString;
    use std::sync::Arc;

    #[tokio::test]
    async fn updates_a_field_in_place_without_violating_write_once() {
        let env = Environment::new(Arc::new(SystemObjectRegistry::new()));
        let ctx = RuntimeContext::root("S", "", OutputContext::Human, env);
        ctx.bind("order", Value::map([(CompactString::from("status"), Value::string("draft"))])).unwrap();

        let statement = StatementDescriptor {
            verb: "update".into(),
            role: Role::Own,
            result: ResultDescriptor::new("order", vec!["status".into()], Span::default()),
            object: ObjectDescriptor::new(Preposition::With, "newStatus", vec![], Span::default()),
            condition: None,
            filter: None,
            span: Span::default(),
            source_text: "<Update the <order: status> with the <newStatus>.>".into(),
        };
        let req = ActionRequest { ctx: &ctx, statement: &statement, object: ObjectResolution::Value(Value::string("placed")) };
        let outcome = UpdateAction.execute(&req).await.unwrap();
        assert!(matches!(outcome, ActionOutcome::NoBind));
        assert_eq!(ctx.resolve("order").unwrap().field("status"), Some(&Value::string("placed")));
    }
}
