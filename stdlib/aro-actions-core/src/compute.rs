//! `Compute` (`spec.md` §4.2): `length|count|hash|uppercase|lowercase|
//! identity`, plus the legacy mode where the result's base name itself is
//! the operation (`<length>` with no specifier).

use aro_ast::{Preposition, Role};
use aro_errors::{AroError, AroResult, ErrorKind};
use aro_runtime::{Action, ActionOutcome, ActionRequest};
use aro_value::Value;
use async_trait::async_trait;
use sha2::{Digest, Sha256};

pub struct ComputeAction;

fn op_name<'a>(request: &'a ActionRequest<'_>) -> &'a str {
    request.first_specifier().unwrap_or_else(|| request.statement.result.base.as_str())
}

fn length_of(value: &Value) -> AroResult<i64> {
    let len = match value {
        Value::String(s) => s.chars().count(),
        Value::Bytes(b) => b.len(),
        Value::List(l) => l.len(),
        Value::Map(m) | Value::Entity(m) => m.len(),
        other => return Err(AroError::type_mismatch("string, bytes, list or map", other)),
    };
    Ok(len as i64)
}

#[async_trait]
impl Action for ComputeAction {
    fn role(&self) -> Role {
        Role::Own
    }

    fn verbs(&self) -> &'static [&'static str] {
        &["compute", "calculate", "derive"]
    }

    fn valid_prepositions(&self) -> &'static [Preposition] {
        &[Preposition::From, Preposition::Via, Preposition::With]
    }

    async fn execute(&self, request: &ActionRequest<'_>) -> AroResult<ActionOutcome> {
        let value = request.object.as_value().cloned().ok_or_else(|| {
            AroError::new(ErrorKind::TypeMismatch, "compute requires a resolved value, not a system object")
        })?;

        let result = match op_name(request) {
            "length" | "count" => Value::Int(length_of(&value)?),
            "hash" => {
                let mut hasher = Sha256::new();
                hasher.update(value.to_string().as_bytes());
                Value::string(format!("{:x}", hasher.finalize()))
            }
            "uppercase" => match &value {
                Value::String(s) => Value::string(s.to_ascii_uppercase()),
                other => return Err(AroError::type_mismatch("string", other)),
            },
            "lowercase" => match &value {
                Value::String(s) => Value::string(s.to_ascii_lowercase()),
                other => return Err(AroError::type_mismatch("string", other)),
            },
            "identity" => value,
            other => {
                return Err(AroError::new(ErrorKind::Runtime, format!("unknown compute operation `{other}`")))
            }
        };
        Ok(result.into())
    }
}
