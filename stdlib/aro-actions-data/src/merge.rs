//! `Merge` (`spec.md` §4.2): since a statement carries only one object
//! slot, the left operand is named by the result descriptor's first
//! specifier (the same side-channel convention [`crate::compare`] uses for
//! its right operand) and resolved through the context; the statement's
//! object is the right operand. `List`+`List` concatenates; `Map`+`Map`
//! merges keys with the right side winning ties.

use aro_ast::{Preposition, Role};
use aro_errors::{AroError, AroResult, ErrorKind};
use aro_runtime::{Action, ActionOutcome, ActionRequest};
use aro_value::Value;
use async_trait::async_trait;

pub struct MergeAction;

#[async_trait]
impl Action for MergeAction {
    fn role(&self) -> Role {
        Role::Own
    }

    fn verbs(&self) -> &'static [&'static str] {
        &["merge", "combine", "join", "concat"]
    }

    fn valid_prepositions(&self) -> &'static [Preposition] {
        &[Preposition::With]
    }

    async fn execute(&self, request: &ActionRequest<'_>) -> AroResult<ActionOutcome> {
        let left_name = request
            .first_specifier()
            .ok_or_else(|| AroError::new(ErrorKind::Runtime, "merge requires a left-operand specifier"))?;
        let left = request.ctx.resolve(left_name).ok_or_else(|| AroError::undefined_variable(left_name))?;
        let right = request.object.as_value().cloned().ok_or_else(|| {
            AroError::new(ErrorKind::TypeMismatch, "merge requires a resolved value, not a system object")
        })?;

        let merged = match (left, right) {
            (Value::List(a), Value::List(b)) => {
                let mut items: Vec<Value> = a.iter().cloned().collect();
                items.extend(b.iter().cloned());
                Value::list(items)
            }
            (Value::Map(a), Value::Map(b)) => {
                let mut merged = a.clone();
                for (k, v) in b.iter() {
                    merged.to_mut().insert(k.clone(), v.clone());
                }
                Value::Map(merged)
            }
            (a, b) => {
                return Err(AroError::new(
                    ErrorKind::TypeMismatch,
                    format!("cannot merge {} with {}", a.type_name(), b.type_name()),
                ))
            }
        };
        Ok(merged.into())
    }
}
