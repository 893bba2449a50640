//! `Compare` (`spec.md` §2's Action Implementations share; not otherwise
//! detailed in §4.2). Open Question, decided per `spec.md` §9's license to
//! resolve ambiguity and recorded in `DESIGN.md`: the operator is the
//! result's first specifier (`equals|notEquals|greaterThan|greaterOrEqual|
//! lessThan|lessOrEqual|contains`, default `equals`) and the right-hand
//! operand is the name of a second context variable named by the result's
//! second specifier, keeping the object descriptor's normal nested-field
//! semantics free for the left-hand operand.

use aro_ast::{Preposition, Role};
use aro_errors::{AroError, AroResult, ErrorKind};
use aro_runtime::{Action, ActionOutcome, ActionRequest};
use aro_value::Value;
use async_trait::async_trait;
use std::cmp::Ordering;

pub struct CompareAction;

fn numeric_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    let (a, b) = match (a, b) {
        (Value::Int(a), Value::Int(b)) => return Some(a.cmp(b)),
        (Value::Double(a), Value::Double(b)) => (*a, *b),
        (Value::Int(a), Value::Double(b)) => (*a as f64, *b),
        (Value::Double(a), Value::Int(b)) => (*a, *b as f64),
        _ => return None,
    };
    a.partial_cmp(&b)
}

#[async_trait]
impl Action for CompareAction {
    fn role(&self) -> Role {
        Role::Own
    }

    fn verbs(&self) -> &'static [&'static str] {
        &["compare", "match"]
    }

    fn valid_prepositions(&self) -> &'static [Preposition] {
        &[Preposition::Against, Preposition::With, Preposition::To]
    }

    async fn execute(&self, request: &ActionRequest<'_>) -> AroResult<ActionOutcome> {
        let left = request.object.as_value().cloned().ok_or_else(|| {
            AroError::new(ErrorKind::TypeMismatch, "compare requires a resolved value, not a system object")
        })?;
        let operator = request.first_specifier().unwrap_or("equals");
        let right_name = request.specifier(1).ok_or_else(|| {
            AroError::new(ErrorKind::Runtime, "compare requires a second specifier naming the right-hand operand")
        })?;
        let right = request
            .ctx
            .resolve_path(right_name)
            .ok_or_else(|| AroError::undefined_variable(right_name))?;

        let result = match operator {
            "equals" => left == right,
            "notEquals" => left != right,
            "greaterThan" => numeric_cmp(&left, &right) == Some(Ordering::Greater),
            "greaterOrEqual" => matches!(numeric_cmp(&left, &right), Some(Ordering::Greater | Ordering::Equal)),
            "lessThan" => numeric_cmp(&left, &right) == Some(Ordering::Less),
            "lessOrEqual" => matches!(numeric_cmp(&left, &right), Some(Ordering::Less | Ordering::Equal)),
            "contains" => match (&left, &right) {
                (Value::String(haystack), Value::String(needle)) => haystack.contains(needle.as_str()),
                (Value::List(items), needle) => items.iter().any(|v| v == needle),
                _ => return Err(AroError::type_mismatch("string or list", &left)),
            },
            other => return Err(AroError::new(ErrorKind::Runtime, format!("unknown compare operator `{other}`"))),
        };
        Ok(Value::Bool(result).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aro_ast::{ObjectDescriptor, ResultDescriptor, Span, StatementDescriptor};
    use aro_runtime::{Environment, ObjectResolution, OutputContext, RuntimeContext};
    use aro_system_objects::SystemObjectRegistry;
    use std::sync::Arc;

    fn stmt(specifiers: Vec<&str>) -> StatementDescriptor {
        StatementDescriptor {
            verb: "compare".into(),
            role: Role::Own,
            result: ResultDescriptor::new("result", specifiers.into_iter().map(Into::into).collect(), Span::default()),
            object: ObjectDescriptor::new(Preposition::Against, "balance", vec![], Span::default()),
            condition: None,
            filter: None,
            span: Span::default(),
            source_text: "<Compare the <result: greaterThan, threshold> against the <balance>.>".into(),
        }
    }

    #[tokio::test]
    async fn greater_than_reads_second_operand_from_context() {
        let env = Environment::new(Arc::new(SystemObjectRegistry::new()));
        let ctx = RuntimeContext::root("S", "", OutputContext::Human, env);
        ctx.bind("threshold", Value::Int(100)).unwrap();
        let statement = stmt(vec!["greaterThan", "threshold"]);
        let req = ActionRequest { ctx: &ctx, statement: &statement, object: ObjectResolution::Value(Value::Int(150)) };
        let outcome = CompareAction.execute(&req).await.unwrap();
        assert!(matches!(outcome, ActionOutcome::Bind(Value::Bool(true))));
    }
}
