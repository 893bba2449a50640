//! `Throw` (`spec.md` §4.2, §7): raises an explicit runtime error,
//! carrying the resolved object as its message (a string, or a map's
//! `message` field).

use aro_ast::{Preposition, Role};
use aro_errors::{AroError, AroResult, ErrorKind};
use aro_runtime::{Action, ActionOutcome, ActionRequest};
use aro_value::Value;
use async_trait::async_trait;

pub struct ThrowAction;

#[async_trait]
impl Action for ThrowAction {
    fn role(&self) -> Role {
        Role::Response
    }

    fn verbs(&self) -> &'static [&'static str] {
        &["throw"]
    }

    fn valid_prepositions(&self) -> &'static [Preposition] {
        &[Preposition::From, Preposition::With]
    }

    async fn execute(&self, request: &ActionRequest<'_>) -> AroResult<ActionOutcome> {
        let value = request.object.as_value().cloned().unwrap_or(Value::Null);
        let message = match &value {
            Value::String(s) => s.to_string(),
            Value::Map(m) | Value::Entity(m) => match m.get("message") {
                Some(Value::String(s)) => s.to_string(),
                _ => value.to_string(),
            },
            other => other.to_string(),
        };
        Err(AroError::new(ErrorKind::Runtime, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aro_ast::{ObjectDescriptor, ResultDescriptor, Span, StatementDescriptor};
    use aro_runtime::{Environment, ObjectResolution, OutputContext, RuntimeContext};
    use aro_system_objects::SystemObjectRegistry;
    use std::sync::Arc;

    #[tokio::test]
    async fn raises_a_runtime_error_carrying_the_message() {
        let env = Environment::new(Arc::new(SystemObjectRegistry::new()));
        let ctx = RuntimeContext::root("S", "", OutputContext::Human, env);
        let statement = StatementDescriptor {
            verb: "throw".into(),
            role: Role::Response,
            result: ResultDescriptor::new("error", vec![], Span::default()),
            object: ObjectDescriptor::new(Preposition::With, "reason", vec![], Span::default()),
            condition: None,
            filter: None,
            span: Span::default(),
            source_text: "<Throw the <error> with the <reason>.>".into(),
        };
        let req = ActionRequest { ctx: &ctx, statement: &statement, object: ObjectResolution::Value(Value::string("out of stock")) };
        let err = ThrowAction.execute(&req).await.unwrap_err();
        assert_eq!(err.message.as_str(), "out of stock");
    }
}
