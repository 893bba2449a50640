//! `Retrieve` (`spec.md` §4.2, §4.7): reads from a repository (optionally
//! filtered by a single equality condition) or passes an already-resolved
//! value through under a new name.

use crate::single_field_filter;
use aro_ast::{Preposition, Role};
use aro_errors::AroResult;
use aro_runtime::{Action, ActionOutcome, ActionRequest, ObjectResolution};
use aro_value::Value;
use async_trait::async_trait;

pub struct RetrieveAction;

#[async_trait]
impl Action for RetrieveAction {
    fn role(&self) -> Role {
        Role::Request
    }

    fn verbs(&self) -> &'static [&'static str] {
        &["retrieve", "get", "fetch", "load", "find"]
    }

    fn valid_prepositions(&self) -> &'static [Preposition] {
        &[Preposition::From, Preposition::Via]
    }

    async fn execute(&self, request: &ActionRequest<'_>) -> AroResult<ActionOutcome> {
        match &request.object {
            ObjectResolution::Repository(repo) => {
                let activity = request.ctx.business_activity.as_str();
                let filter = single_field_filter(request.statement.filter.as_ref())?;
                let records = match filter {
                    Some((field, value)) => request.ctx.env.repository_store.retrieve(repo, activity, Some(field), Some(value)),
                    None => request.ctx.env.repository_store.retrieve(repo, activity, None, None),
                };
                Ok(Value::list(records).into())
            }
            ObjectResolution::Value(value) => Ok(value.clone().into()),
            ObjectResolution::SystemObject(obj) => Ok(obj.read(request.first_specifier()).await?.into()),
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
    async fn retrieves_filtered_repository_records() {
        let env = Environment::new(Arc::new(SystemObjectRegistry::new()));
        let ctx = RuntimeContext::root("S", "orders", OutputContext::Human, env);
        ctx.env.repository_store.store(
            Value::map([(CompactString::from("id"), Value::string("1")), (CompactString::from("status"), Value::string("placed"))]),
            "orders-repository",
            "orders",
        );
        ctx.env.repository_store.store(
            Value::map([(CompactString::from("id"), Value::string("2")), (CompactString::from("status"), Value::string("cancelled"))]),
            "orders-repository",
            "orders",
        );

        let statement = StatementDescriptor {
            verb: "retrieve".into(),
            role: Role::Request,
            result: ResultDescriptor::new("placedOrders", vec![], Span::default()),
            object: ObjectDescriptor::new(Preposition::From, "orders-repository", vec![], Span::default()),
            condition: None,
            filter: Some(Condition::equals("status", Value::string("placed"))),
            span: Span::default(),
            source_text: "<Retrieve the <placedOrders> from the <orders-repository> where status=placed.>".into(),
        };
        let req = ActionRequest { ctx: &ctx, statement: &statement, object: ObjectResolution::Repository("orders-repository".into()) };
        let outcome = RetrieveAction.execute(&req).await.unwrap();
        let ActionOutcome::Bind(Value::List(l)) = outcome else { panic!("expected a list") };
        assert_eq!(l.len(), 1);
    }
}
