//! `Transform` (`spec.md` §4.2, Table T-1): `string|int|double|bool|...`
//! coerce the object value to the specifier's type, exactly per the
//! per-type-pair rules the spec lays out for string-origin conversions,
//! extended symmetrically to the other scalar pairs (not in conflict with
//! anything Table T-1 specifies, since it only constrains conversions
//! *from* string).

use aro_ast::{Preposition, Role};
use aro_errors::{AroError, AroResult, ErrorKind};
use aro_runtime::{Action, ActionOutcome, ActionRequest};
use aro_value::Value;
use async_trait::async_trait;

pub struct TransformAction;

fn string_to_int(s: &str) -> AroResult<Value> {
    let trimmed = s;
    if trimmed != s.trim() {
        return Err(AroError::new(ErrorKind::TypeMismatch, format!("`{s}` has leading/trailing whitespace")));
    }
    trimmed
        .parse::<i64>()
        .map(Value::Int)
        .map_err(|_| AroError::new(ErrorKind::TypeMismatch, format!("`{s}` is not a valid integer")))
}

fn string_to_double(s: &str) -> AroResult<Value> {
    if s != s.trim() {
        return Err(AroError::new(ErrorKind::TypeMismatch, format!("`{s}` has leading/trailing whitespace")));
    }
    s.parse::<f64>()
        .map(Value::Double)
        .map_err(|_| AroError::new(ErrorKind::TypeMismatch, format!("`{s}` is not a valid double")))
}

fn string_to_bool(s: &str) -> AroResult<Value> {
    let lower = s.to_ascii_lowercase();
    match lower.as_str() {
        "true" | "1" => Ok(Value::Bool(true)),
        "false" | "0" => Ok(Value::Bool(false)),
        _ => Err(AroError::new(ErrorKind::TypeMismatch, format!("`{s}` is not a valid boolean"))),
    }
}

#[async_trait]
impl Action for TransformAction {
    fn role(&self) -> Role {
        Role::Own
    }

    fn verbs(&self) -> &'static [&'static str] {
        &["transform"]
    }

    fn valid_prepositions(&self) -> &'static [Preposition] {
        &[Preposition::From, Preposition::With]
    }

    async fn execute(&self, request: &ActionRequest<'_>) -> AroResult<ActionOutcome> {
        let value = request.object.as_value().cloned().ok_or_else(|| {
            AroError::new(ErrorKind::TypeMismatch, "transform requires a resolved value, not a system object")
        })?;
        let target = request.first_specifier().ok_or_else(|| {
            AroError::new(ErrorKind::Runtime, "transform requires a target-type specifier")
        })?;

        let result = match (value, target) {
            (Value::String(s), "int") => string_to_int(&s)?,
            (Value::String(s), "double") => string_to_double(&s)?,
            (Value::String(s), "bool") => string_to_bool(&s)?,
            (Value::String(s), "string") => Value::String(s),
            (Value::Int(i), "string") => Value::string(i.to_string()),
            (Value::Int(i), "double") => Value::Double(i as f64),
            (Value::Int(i), "bool") => Value::Bool(i != 0),
            (Value::Int(i), "int") => Value::Int(i),
            (Value::Double(d), "string") => Value::string(d.to_string()),
            (Value::Double(d), "int") => Value::Int(d as i64),
            (Value::Double(d), "bool") => Value::Bool(d != 0.0),
            (Value::Double(d), "double") => Value::Double(d),
            (Value::Bool(b), "string") => Value::string(b.to_string()),
            (Value::Bool(b), "int") => Value::Int(b as i64),
            (Value::Bool(b), "bool") => Value::Bool(b),
            (value, target) => return Err(AroError::type_mismatch(target, &value)),
        };
        Ok(result.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aro_ast::{ObjectDescriptor, ResultDescriptor, Span, StatementDescriptor};
    use aro_runtime::{Environment, ObjectResolution, OutputContext, RuntimeContext};
    use aro_system_objects::SystemObjectRegistry;
    use std::sync::Arc;

    fn stmt(target: &str) -> StatementDescriptor {
        StatementDescriptor {
            verb: "transform".into(),
            role: Role::Own,
            result: ResultDescriptor::new("result", vec![target.into()], Span::default()),
            object: ObjectDescriptor::new(Preposition::From, "input", vec![], Span::default()),
            condition: None,
            filter: None,
            span: Span::default(),
            source_text: "<Transform the <result: int> from the <input>.>".into(),
        }
    }

    #[tokio::test]
    async fn string_to_int_parses_signed_decimal() {
        let env = Environment::new(Arc::new(SystemObjectRegistry::new()));
        let ctx = RuntimeContext::root("S", "", OutputContext::Human, env);
        let statement = stmt("int");
        let req = ActionRequest { ctx: &ctx, statement: &statement, object: ObjectResolution::Value(Value::string("-42")) };
        let outcome = TransformAction.execute(&req).await.unwrap();
        assert!(matches!(outcome, ActionOutcome::Bind(Value::Int(-42))));
    }

    #[tokio::test]
    async fn string_to_int_rejects_surrounding_whitespace() {
        let env = Environment::new(Arc::new(SystemObjectRegistry::new()));
        let ctx = RuntimeContext::root("S", "", OutputContext::Human, env);
        let statement = stmt("int");
        let req = ActionRequest { ctx: &ctx, statement: &statement, object: ObjectResolution::Value(Value::string(" 42 ")) };
        let err = TransformAction.execute(&req).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[tokio::test]
    async fn string_to_bool_is_case_insensitive() {
        let env = Environment::new(Arc::new(SystemObjectRegistry::new()));
        let ctx = RuntimeContext::root("S", "", OutputContext::Human, env);
        let statement = stmt("bool");
        let req = ActionRequest { ctx: &ctx, statement: &statement, object: ObjectResolution::Value(Value::string("TRUE")) };
        let outcome = TransformAction.execute(&req).await.unwrap();
        assert!(matches!(outcome, ActionOutcome::Bind(Value::Bool(true))));
    }
}
