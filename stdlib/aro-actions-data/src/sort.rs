//! `Sort` (`spec.md` §4.2): `ascending|descending`, stable by default.
//! Total ordering is defined for `Int`/`Double`/`String`; heterogeneous
//! lists are a `TypeMismatch`.

use aro_ast::{Preposition, Role};
use aro_errors::{AroError, AroResult, ErrorKind};
use aro_runtime::{Action, ActionOutcome, ActionRequest};
use aro_value::Value;
use async_trait::async_trait;
use std::cmp::Ordering;

pub struct SortAction;

fn compare(a: &Value, b: &Value) -> AroResult<Ordering> {
    match (a, b) {
        (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
        (Value::Double(a), Value::Double(b)) => Ok(a.partial_cmp(b).unwrap_or(Ordering::Equal)),
        (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
        (a, b) => Err(AroError::new(
            ErrorKind::TypeMismatch,
            format!("cannot order a heterogeneous list ({} vs {})", a.type_name(), b.type_name()),
        )),
    }
}

#[async_trait]
impl Action for SortAction {
    fn role(&self) -> Role {
        Role::Own
    }

    fn verbs(&self) -> &'static [&'static str] {
        &["sort"]
    }

    fn valid_prepositions(&self) -> &'static [Preposition] {
        &[Preposition::From]
    }

    async fn execute(&self, request: &ActionRequest<'_>) -> AroResult<ActionOutcome> {
        let value = request.object.as_value().cloned().ok_or_else(|| {
            AroError::new(ErrorKind::TypeMismatch, "sort requires a resolved value, not a system object")
        })?;
        let Value::List(items) = value else {
            return Err(AroError::type_mismatch("list", &value));
        };
        let descending = matches!(request.first_specifier(), Some("descending"));

        let mut items: Vec<Value> = items.iter().cloned().collect();
        let mut err = None;
        items.sort_by(|a, b| match compare(a, b) {
            Ok(ord) => {
                if descending {
                    ord.reverse()
                } else {
                    ord
                }
            }
            Err(e) => {
                err.get_or_insert(e);
                Ordering::Equal
            }
        });
        if let Some(e) = err {
            return Err(e);
        }
        Ok(Value::list(items).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aro_ast::{ObjectDescriptor, ResultDescriptor, Span, StatementDescriptor};
    use aro_runtime::{Environment, ObjectResolution, OutputContext, RuntimeContext};
    use aro_system_objects::SystemObjectRegistry;
    use std::sync::Arc;

    fn stmt(specifier: &str) -> StatementDescriptor {
        StatementDescriptor {
            verb: "sort".into(),
            role: Role::Own,
            result: ResultDescriptor::new("sorted", vec![specifier.into()], Span::default()),
            object: ObjectDescriptor::new(Preposition::From, "items", vec![], Span::default()),
            condition: None,
            filter: None,
            span: Span::default(),
            source_text: "<Sort the <sorted: ascending> from the <items>.>".into(),
        }
    }

    #[tokio::test]
    async fn sorts_ascending_stably() {
        let env = Environment::new(Arc::new(SystemObjectRegistry::new()));
        let ctx = RuntimeContext::root("S", "", OutputContext::Human, env);
        let statement = stmt("ascending");
        let list = Value::list([Value::Int(3), Value::Int(1), Value::Int(2)]);
        let req = ActionRequest { ctx: &ctx, statement: &statement, object: ObjectResolution::Value(list) };
        let outcome = SortAction.execute(&req).await.unwrap();
        let ActionOutcome::Bind(Value::List(l)) = outcome else { panic!("expected a list") };
        assert_eq!(l.as_slice(), &[Value::Int(1), Value::Int(2), Value::Int(3)]);
    }

    #[tokio::test]
    async fn heterogeneous_list_is_a_type_mismatch() {
        let env = Environment::new(Arc::new(SystemObjectRegistry::new()));
        let ctx = RuntimeContext::root("S", "", OutputContext::Human, env);
        let statement = stmt("ascending");
        let list = Value::list([Value::Int(1), Value::string("x")]);
        let req = ActionRequest { ctx: &ctx, statement: &statement, object: ObjectResolution::Value(list) };
        let err = SortAction.execute(&req).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }
}
