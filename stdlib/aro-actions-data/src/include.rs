//! `Include` (`spec.md` §4.2, §4.7): persists an entity into a repository.
//! The object resolves to the repository itself, so the entity to store is
//! named by the object's first specifier and resolved through the context
//! — the same side-channel convention [`crate::merge`] uses for its second
//! operand, applied here because the object slot is already spent naming
//! the destination.

use aro_ast::{Preposition, Role};
use aro_errors::{AroError, AroResult, ErrorKind};
use aro_runtime::{Action, ActionOutcome, ActionRequest, ObjectResolution};
use aro_value::Value;
use async_trait::async_trait;
use compact_str::CompactString;

pub struct IncludeAction;

#[async_trait]
impl Action for IncludeAction {
    fn role(&self) -> Role {
        Role::Own
    }

    fn verbs(&self) -> &'static [&'static str] {
        &["include", "embed", "insert"]
    }

    fn valid_prepositions(&self) -> &'static [Preposition] {
        &[Preposition::Into]
    }

    async fn execute(&self, request: &ActionRequest<'_>) -> AroResult<ActionOutcome> {
        let ObjectResolution::Repository(repo) = &request.object else {
            return Err(AroError::new(ErrorKind::TypeMismatch, "include requires a repository object"));
        };
        let entity_var = request
            .object_specifiers()
            .first()
            .ok_or_else(|| AroError::new(ErrorKind::Runtime, "include requires an entity specifier naming the bound value to store"))?;
        let value = request
            .ctx
            .resolve_path(entity_var.as_str())
            .ok_or_else(|| AroError::undefined_variable(entity_var.as_str()))?;

        let activity = request.ctx.business_activity.as_str();
        let result = request.ctx.env.repository_store.store(value, repo, activity);

        let summary = Value::map([
            (CompactString::from("stored"), result.stored),
            (CompactString::from("isUpdate"), Value::Bool(result.is_update)),
            (CompactString::from("entityId"), result.entity_id),
        ]);
        Ok(summary.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aro_ast::{ObjectDescriptor, ResultDescriptor, Span, StatementDescriptor};
    use aro_runtime::{Environment, OutputContext, RuntimeContext};
    use aro_system_objects::SystemObjectRegistry;
    use std::sync::Arc;

    #[tokio::test]
    async fn stores_the_named_entity_into_the_repository() {
        let env = Environment::new(Arc::new(SystemObjectRegistry::new()));
        let ctx = RuntimeContext::root("S", "orders", OutputContext::Human, env);
        ctx.bind("order", Value::map([(CompactString::from("status"), Value::string("placed"))])).unwrap();

        let statement = StatementDescriptor {
            verb: "include".into(),
            role: Role::Own,
            result: ResultDescriptor::new("result", vec![], Span::default()),
            object: ObjectDescriptor::new(Preposition::Into, "orders-repository", vec!["order".into()], Span::default()),
            condition: None,
            filter: None,
            span: Span::default(),
            source_text: "<Include the <result> into the <orders-repository: order>.>".into(),
        };
        let req = ActionRequest { ctx: &ctx, statement: &statement, object: ObjectResolution::Repository("orders-repository".into()) };
        let outcome = IncludeAction.execute(&req).await.unwrap();
        let ActionOutcome::Bind(Value::Map(m)) = outcome else { panic!("expected a map") };
        assert_eq!(m.get("isUpdate"), Some(&Value::Bool(false)));
        assert_eq!(ctx.env.repository_store.retrieve("orders-repository", "orders", None, None).len(), 1);
    }
}
