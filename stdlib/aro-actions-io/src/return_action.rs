//! `Return` (`spec.md` §4.3): populates the context's response and, per the
//! executor's protocol, halts the rest of the feature set. Halting itself
//! is the executor's job (it checks `ctx.has_response()` between
//! statements); this action only needs to set the response.
//!
//! The status comes from the result's first specifier (default `"OK"`),
//! the optional reason from its second; the resolved object supplies the
//! response data and must be a map.

use aro_ast::{Preposition, Role};
use aro_errors::{AroError, AroResult, ErrorKind};
use aro_runtime::{Action, ActionOutcome, ActionRequest, Response};
use async_trait::async_trait;

pub struct ReturnAction;

#[async_trait]
impl Action for ReturnAction {
    fn role(&self) -> Role {
        Role::Response
    }

    fn verbs(&self) -> &'static [&'static str] {
        &["return", "respond"]
    }

    fn valid_prepositions(&self) -> &'static [Preposition] {
        &[Preposition::With, Preposition::From]
    }

    async fn execute(&self, request: &ActionRequest<'_>) -> AroResult<ActionOutcome> {
        let value = request.object.as_value().cloned().ok_or_else(|| {
            AroError::new(ErrorKind::TypeMismatch, "return requires a resolved value, not a system object")
        })?;
        let data = match value {
            aro_value::Value::Map(m) | aro_value::Value::Entity(m) => m.as_map().clone(),
            other => return Err(AroError::type_mismatch("map", &other)),
        };
        let status = request.specifier(0).unwrap_or("OK");
        let reason = request.specifier(1).map(arcstr::ArcStr::from);
        request.ctx.set_response(Response { status: arcstr::ArcStr::from(status), reason, data });
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
    use compact_str::CompactString;
    use std::sync::Arc;

    #[tokio::test]
    async fn sets_the_response_on_the_context() {
        let env = Environment::new(Arc::new(SystemObjectRegistry::new()));
        let ctx = RuntimeContext::root("S", "", OutputContext::Human, env);
        let statement = StatementDescriptor {
            verb: "return".into(),
            role: Role::Response,
            result: ResultDescriptor::new("response", vec!["Created".into()], Span::default()),
            object: ObjectDescriptor::new(Preposition::With, "order", vec![], Span::default()),
            condition: None,
            filter: None,
            span: Span::default(),
            source_text: "<Return the <response: Created> with the <order>.>".into(),
        };
        let data = Value::map([(CompactString::from("id"), Value::string("o-1"))]);
        let req = ActionRequest { ctx: &ctx, statement: &statement, object: ObjectResolution::Value(data) };
        ReturnAction.execute(&req).await.unwrap();
        let response = ctx.get_response().unwrap();
        assert_eq!(response.status.as_str(), "Created");
        assert_eq!(response.data.get("id"), Some(&Value::string("o-1")));
    }
}
