//! `Append` (`spec.md` §4.2, §4.9): like [`crate::write::WriteAction`], but
//! intended for sinks that grow rather than overwrite (the `file` object
//! appends in place of overwriting whenever its path resolves to `.log`
//! format; for every other sink `append` and `write` coincide, since
//! `SystemObject` exposes a single `write` operation with the growth
//! policy decided by the adapter, not the verb).

use aro_ast::{Preposition, Role};
use aro_errors::{AroError, AroResult, ErrorKind};
use aro_runtime::{Action, ActionOutcome, ActionRequest, ObjectResolution};
use async_trait::async_trait;

pub struct AppendAction;

#[async_trait]
impl Action for AppendAction {
    fn role(&self) -> Role {
        Role::Response
    }

    fn verbs(&self) -> &'static [&'static str] {
        &["append"]
    }

    fn valid_prepositions(&self) -> &'static [Preposition] {
        &[Preposition::To, Preposition::Into]
    }

    async fn execute(&self, request: &ActionRequest<'_>) -> AroResult<ActionOutcome> {
        let ObjectResolution::SystemObject(sink) = &request.object else {
            return Err(AroError::new(ErrorKind::TypeMismatch, "append requires a system object sink"));
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
    use aro_system_objects::FileObject;
    use aro_value::Value;
    use std::sync::Arc;

    #[tokio::test]
    async fn appends_to_a_log_formatted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.log");

        let mut registry = aro_system_objects::SystemObjectRegistry::new();
        registry.register(
            "sink",
            Arc::new(|specifiers: &[String]| {
                Ok(Arc::new(FileObject::new(specifiers)?) as Arc<dyn aro_system_objects::SystemObject>)
            }),
        );
        let env = Environment::new(Arc::new(registry));
        let ctx = RuntimeContext::root("S", "", OutputContext::Human, env);
        ctx.bind("line", Value::string("first")).unwrap();

        let statement = StatementDescriptor {
            verb: "append".into(),
            role: Role::Response,
            result: ResultDescriptor::new("line", vec![], Span::default()),
            object: ObjectDescriptor::new(Preposition::To, "sink", vec![path.to_string_lossy().into_owned().into()], Span::default()),
            condition: None,
            filter: None,
            span: Span::default(),
            source_text: "<Append the <line> to the <sink: path>.>".into(),
        };
        let obj = ctx.env.system_objects.create("sink", &[path.to_string_lossy().into_owned()]).unwrap();
        let req = ActionRequest { ctx: &ctx, statement: &statement, object: ObjectResolution::SystemObject(obj.clone()) };
        AppendAction.execute(&req).await.unwrap();

        ctx.unbind("line");
        ctx.bind("line", Value::string("second")).unwrap();
        let req2 = ActionRequest { ctx: &ctx, statement: &statement, object: ObjectResolution::SystemObject(obj) };
        AppendAction.execute(&req2).await.unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
