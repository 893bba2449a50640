//! `Broadcast` (`spec.md` §4.2, §4.4): emits an event on the process-wide
//! bus. The event type is the statement's result name (matching
//! `<EventType> Handler` declarative subscriptions, §4.4); the resolved
//! object supplies the payload and must be a map.

use aro_ast::{Preposition, Role};
use aro_errors::{AroError, AroResult, ErrorKind};
use aro_runtime::{Action, ActionOutcome, ActionRequest};
use aro_events::Event;
use async_trait::async_trait;

pub struct BroadcastAction;

#[async_trait]
impl Action for BroadcastAction {
    fn role(&self) -> Role {
        Role::Response
    }

    fn verbs(&self) -> &'static [&'static str] {
        &["broadcast"]
    }

    fn valid_prepositions(&self) -> &'static [Preposition] {
        &[Preposition::From, Preposition::With]
    }

    async fn execute(&self, request: &ActionRequest<'_>) -> AroResult<ActionOutcome> {
        let value = request.object.as_value().cloned().ok_or_else(|| {
            AroError::new(ErrorKind::TypeMismatch, "broadcast requires a resolved value, not a system object")
        })?;
        let payload = match value {
            aro_value::Value::Map(m) | aro_value::Value::Entity(m) => m,
            other => return Err(AroError::type_mismatch("map", &other)),
        };
        let event_type = request.statement.result.base.as_str();
        let mut event = Event::new(event_type);
        for (k, v) in payload.iter() {
            event = event.with_field(k.clone(), v.clone());
        }
        request.ctx.env.event_bus.emit(event);
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
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[tokio::test]
    async fn emits_an_event_with_the_result_name_as_its_type() {
        let env = Environment::new(Arc::new(SystemObjectRegistry::new()));
        let ctx = RuntimeContext::root("S", "orders", OutputContext::Human, env);
        let seen: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
        let seen2 = seen.clone();
        ctx.env.event_bus.subscribe(
            "OrderPlaced",
            Arc::new(move |ev: &aro_events::Event| {
                *seen2.lock() = ev.field("status").map(|v| v.to_string());
            }),
        );

        let statement = StatementDescriptor {
            verb: "broadcast".into(),
            role: Role::Response,
            result: ResultDescriptor::new("OrderPlaced", vec![], Span::default()),
            object: ObjectDescriptor::new(Preposition::From, "order", vec![], Span::default()),
            condition: None,
            filter: None,
            span: Span::default(),
            source_text: "<Broadcast the <OrderPlaced> from the <order>.>".into(),
        };
        let payload = Value::map([(CompactString::from("status"), Value::string("placed"))]);
        let req = ActionRequest { ctx: &ctx, statement: &statement, object: ObjectResolution::Value(payload) };
        BroadcastAction.execute(&req).await.unwrap();
        assert_eq!(seen.lock().as_deref(), Some("placed"));
    }
}
