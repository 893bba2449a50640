//! `Log` (`spec.md` §4.2): `log|print|output|debug` route the resolved
//! object through the `log` facade at a severity named by the result's
//! first specifier (default `info`), the way every other crate in this
//! workspace emits structured log lines instead of printing directly.

use aro_ast::{Preposition, Role};
use aro_errors::AroResult;
use aro_runtime::{Action, ActionOutcome, ActionRequest};
use async_trait::async_trait;

pub struct LogAction;

#[async_trait]
impl Action for LogAction {
    fn role(&self) -> Role {
        Role::Response
    }

    fn verbs(&self) -> &'static [&'static str] {
        &["log", "print", "output", "debug"]
    }

    fn valid_prepositions(&self) -> &'static [Preposition] {
        &[Preposition::From]
    }

    async fn execute(&self, request: &ActionRequest<'_>) -> AroResult<ActionOutcome> {
        let value = request.object.as_value().cloned().unwrap_or(aro_value::Value::Null);
        let message = value.to_string();
        match request.first_specifier() {
            Some("error") => log::error!("{message}"),
            Some("warn") | Some("warning") => log::warn!("{message}"),
            Some("debug") => log::debug!("{message}"),
            _ => log::info!("{message}"),
        }
        Ok(ActionOutcome::NoBind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aro_ast::{ObjectDescriptor, ResultDescriptor, Span, StatementDescriptor};
    use aro_runtime::{Environment, ObjectResolution, OutputContext, RuntimeContext};
    use aro_system_objects::SystemObjectRegistry;
    use aro_value::Value;
    use std::sync::Arc;

    #[tokio::test]
    async fn logs_without_binding_anything() {
        let env = Environment::new(Arc::new(SystemObjectRegistry::new()));
        let ctx = RuntimeContext::root("S", "", OutputContext::Human, env);
        let statement = StatementDescriptor {
            verb: "log".into(),
            role: Role::Response,
            result: ResultDescriptor::new("entry", vec!["warn".into()], Span::default()),
            object: ObjectDescriptor::new(Preposition::From, "message", vec![], Span::default()),
            condition: None,
            filter: None,
            span: Span::default(),
            source_text: "<Log the <entry: warn> from the <message>.>".into(),
        };
        let req = ActionRequest { ctx: &ctx, statement: &statement, object: ObjectResolution::Value(Value::string("careful")) };
        let outcome = LogAction.execute(&req).await.unwrap();
        assert!(matches!(outcome, ActionOutcome::NoBind));
    }
}
