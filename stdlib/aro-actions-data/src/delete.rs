//! `Delete` (`spec.md` §4.2, §4.7): removes matching records from a
//! repository, or clears it outright when the verb alias is `clear` and no
//! filter is given; against a plain map value, removes a named field.

use crate::single_field_filter;
use aro_ast::{Preposition, Role};
use aro_errors::{AroError, AroResult, ErrorKind};
use aro_runtime::{Action, ActionOutcome, ActionRequest, ObjectResolution};
use aro_value::Value;
use async_trait::async_trait;

pub struct DeleteAction;

#[async_trait]
impl Action for DeleteAction {
    fn role(&self) -> Role {
        Role::Own
    }

    fn verbs(&self) -> &'static [&'static str] {
        &["delete", "remove", "destroy", "clear"]
    }

    fn valid_prepositions(&self) -> &'static [Preposition] {
        &[Preposition::From, Preposition::Against]
    }

    async fn execute(&self, request: &ActionRequest<'_>) -> AroResult<ActionOutcome> {
        match &request.object {
            ObjectResolution::Repository(repo) => {
                let activity = request.ctx.business_activity.as_str();
                let filter = single_field_filter(request.statement.filter.as_ref())?;
                let removed = match filter {
                    Some((field, value)) => request.ctx.env.repository_store.delete(repo, activity, field, value),
                    None => {
                        let all = request.ctx.env.repository_store.retrieve(repo, activity, None, None);
                        request.ctx.env.repository_store.clear(repo, activity);
                        all
                    }
                };
                Ok(Value::list(removed).into())
            }
            ObjectResolution::Value(value) => {
                let field = request.first_specifier().ok_or_else(|| {
                    AroError::new(ErrorKind::Runtime, "delete against a plain value requires a field specifier")
                })?;
                match value {
                    Value::Map(m) => {
                        let mut copy = m.clone();
                        copy.to_mut().shift_remove(field);
                        Ok(Value::Map(copy).into())
                    }
                    other => Err(AroError::type_mismatch("map", other)),
                }
            }
            ObjectResolution::SystemObject(_) => {
                Err(AroError::new(ErrorKind::TypeMismatch, "delete does not operate on system objects"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aro_ast::{Condition, ObjectDescriptor, ResultDescriptor, Span, StatementDescriptor};
    use aro_runtime::{Environment, OutputContext, RuntimeContext};
    use aro_system_objects::SystemObjectRegistry;
    use compact_str::CompactString;
    use std::sync::Arc;

    #[tokio::test]
    async fn deletes_matching_repository_records() {
        let env = Environment::new(Arc::new(SystemObjectRegistry::new()));
        let ctx = RuntimeContext::root("S", "orders", OutputContext::Human, env);
        ctx.env.repository_store.store(
            Value::map([(CompactString::from("id"), Value::string("1")), (CompactString::from("status"), Value::string("cancelled"))]),
            "orders-repository",
            "orders",
        );

        let statement = StatementDescriptor {
            verb: "delete".into(),
            role: Role::Own,
            result: ResultDescriptor::new("removed", vec![], Span::default()),
            object: ObjectDescriptor::new(Preposition::From, "orders-repository", vec![], Span::default()),
            condition: None,
            filter: Some(Condition::equals("status", Value::string("cancelled"))),
            span: Span::default(),
            source_text: "<Delete the <removed> from the <orders-repository> where status=cancelled.>".into(),
        };
        let req = ActionRequest { ctx: &ctx, statement: &statement, object: ObjectResolution::Repository("orders-repository".into()) };
        let outcome = DeleteAction.execute(&req).await.unwrap();
        let ActionOutcome::Bind(Value::List(l)) = outcome else { panic!("expected a list") };
        assert_eq!(l.len(), 1);
        assert_eq!(ctx.env.repository_store.retrieve("orders-repository", "orders", None, None).len(), 0);
    }
}
