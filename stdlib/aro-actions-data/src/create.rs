//! `Create` (`spec.md` §4.2): wraps the object value as an `Entity` with a
//! fresh v4 id when a PascalCase specifier names the schema, otherwise
//! passes the value through unshaped.

use aro_ast::{Preposition, Role};
use aro_errors::{AroError, AroResult, ErrorKind};
use aro_runtime::{Action, ActionOutcome, ActionRequest};
use aro_value::{Value, ValueMap};
use arcstr::ArcStr;
use async_trait::async_trait;
use uuid::Uuid;

pub struct CreateAction;

fn is_pascal_case(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

fn as_map(value: Value) -> AroResult<ValueMap> {
    match value {
        Value::Map(m) | Value::Entity(m) => Ok(m.as_map().clone()),
        other => Err(AroError::type_mismatch("map", &other)),
    }
}

#[async_trait]
impl Action for CreateAction {
    fn role(&self) -> Role {
        Role::Own
    }

    fn verbs(&self) -> &'static [&'static str] {
        &["create", "build", "construct"]
    }

    fn valid_prepositions(&self) -> &'static [Preposition] {
        &[Preposition::From, Preposition::With]
    }

    async fn execute(&self, request: &ActionRequest<'_>) -> AroResult<ActionOutcome> {
        let value = request.object.as_value().cloned().ok_or_else(|| {
            AroError::new(ErrorKind::TypeMismatch, "create requires a resolved value, not a system object")
        })?;

        match request.first_specifier() {
            Some(schema) if is_pascal_case(schema) => {
                let mut map = as_map(value)?;
                let existing_id = map.get("id").and_then(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    _ => None,
                });
                let id = existing_id.unwrap_or_else(|| ArcStr::from(Uuid::new_v4().to_string()));
                map.shift_remove("id");
                Ok(Value::wrap_entity(map, id).into())
            }
            _ => Ok(value.into()),
        }
    }
}
