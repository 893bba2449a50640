//! `Write` (`spec.md` §4.2, §4.9): the object names the sink system object
//! (`console`, `file`, `url`, ...); the value written is looked up from the
//! context under the statement's result name, the same "operate on an
//! existing binding named by the result" idiom `Update` uses.

use aro_ast::{Preposition, Role};
use aro_errors::{AroError, AroResult, ErrorKind};
use aro_runtime::{Action, ActionOutcome, ActionRequest, ObjectResolution};
use async_trait::async_trait;

pub struct WriteAction;

#[async_trait]
impl Action for WriteAction {
    fn role(&self) -> Role {
        Role::Response
    }

    fn verbs(&self) -> &'static [&'static str] {
        &["write"]
    }

    fn valid_prepositions(&self) -> &'static [Preposition] {
        &[Preposition::To, Preposition::Into]
    }

    async fn execute(&self, request: &ActionRequest<'_>) -> AroResult<ActionOutcome> {
        let ObjectResolution::SystemObject(sink) = &request.object else {
            return Err(AroError::new(ErrorKind::TypeMismatch, "write requires a system object sink"));
        };
        let name = request.statement.result.base.as_str();
        let value = request.ctx.resolve(name).ok_or_else(|| AroError::undefined_variable(name))?;
        sink.write(value).await?;
        Ok(ActionOutcome::NoBind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aro_ast::{ObjectDescriptor, ResultDescriptor, Span, StatementDescriptor};
    use aro_runtime::{Environment, OutputContext, RuntimeContext};
    use aro_system_objects::SystemObjectRegistry;
    use aro_value::Value;
    use std::sync::Arc;

    #[tokio::test]
    async fn writes_the_bound_value_to_the_resolved_sink() {
        let mut registry = SystemObjectRegistry::new();
        registry.register(
            "console",
            Arc::new(|specifiers: &[String]| {
                Ok(Arc::new(aro_system_objects::ConsoleObject::new(specifiers)) as Arc<dyn aro_system_objects::SystemObject>)
            }),
        );
        let env = Environment::new(Arc::new(registry));
        let ctx = RuntimeContext::root("S", "", OutputContext::Human, env);
        ctx.bind("message", Value::string("hello")).unwrap();

        let statement = StatementDescriptor {
            verb: "write".into(),
            role: Role::Response,
            result: ResultDescriptor::new("message", vec![], Span::default()),
            object: ObjectDescriptor::new(Preposition::To, "console", vec![], Span::default()),
            condition: None,
            filter: None,
            span: Span::default(),
            source_text: "<Write the <message> to the <console>.>".into(),
        };
        let obj = ctx.env.system_objects.create("console", &[]).unwrap();
        let req = ActionRequest { ctx: &ctx, statement: &statement, object: ObjectResolution::SystemObject(obj) };
        let outcome = WriteAction.execute(&req).await.unwrap();
        assert!(matches!(outcome, ActionOutcome::NoBind));
    }
}
