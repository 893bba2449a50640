//! `Validate` (`spec.md` §4.2): `required|email|numeric|range|...` produce a
//! `ValidationResult {isValid, rule, message?}` rather than raising an
//! error — validation failure is an ordinary value, not a control-flow
//! event (`spec.md` §7).

use aro_ast::{Preposition, Role};
use aro_errors::{AroError, AroResult, ErrorKind};
use aro_runtime::{Action, ActionOutcome, ActionRequest};
use aro_value::Value;
use async_trait::async_trait;
use compact_str::CompactString;
use regex::Regex;
use std::sync::OnceLock;

pub struct ValidateAction;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email regex is valid"))
}

fn validation_result(rule: &str, is_valid: bool, message: Option<String>) -> Value {
    let mut entries = vec![
        (CompactString::from("isValid"), Value::Bool(is_valid)),
        (CompactString::from("rule"), Value::string(rule)),
    ];
    if let Some(message) = message {
        entries.push((CompactString::from("message"), Value::string(message)));
    }
    Value::map(entries)
}

fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Int(_) | Value::Double(_) => true,
        Value::String(s) => s.trim().parse::<f64>().is_ok(),
        _ => false,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::Double(d) => Some(*d),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[async_trait]
impl Action for ValidateAction {
    fn role(&self) -> Role {
        Role::Own
    }

    fn verbs(&self) -> &'static [&'static str] {
        &["validate", "verify", "check"]
    }

    fn valid_prepositions(&self) -> &'static [Preposition] {
        &[Preposition::For, Preposition::With, Preposition::Against]
    }

    async fn execute(&self, request: &ActionRequest<'_>) -> AroResult<ActionOutcome> {
        let value = request.object.as_value().cloned().ok_or_else(|| {
            AroError::new(ErrorKind::TypeMismatch, "validate requires a resolved value, not a system object")
        })?;
        let rule = request.first_specifier().unwrap_or("required");

        let result = match rule {
            "required" => {
                let ok = !value.is_null() && value.truthy();
                validation_result(rule, ok, (!ok).then(|| "value is required".to_string()))
            }
            "email" => match &value {
                Value::String(s) => {
                    let ok = email_regex().is_match(s);
                    validation_result(rule, ok, (!ok).then(|| format!("`{s}` is not a valid email address")))
                }
                other => validation_result(rule, false, Some(format!("expected a string, found {}", other.type_name()))),
            },
            "numeric" => {
                let ok = is_numeric(&value);
                validation_result(rule, ok, (!ok).then(|| "value is not numeric".to_string()))
            }
            "range" => {
                let min = request.specifier(1).and_then(|s| s.parse::<f64>().ok());
                let max = request.specifier(2).and_then(|s| s.parse::<f64>().ok());
                match (as_f64(&value), min, max) {
                    (Some(v), Some(min), Some(max)) => {
                        let ok = v >= min && v <= max;
                        validation_result(rule, ok, (!ok).then(|| format!("{v} is not within [{min}, {max}]")))
                    }
                    _ => validation_result(rule, false, Some("range validation requires numeric min/max specifiers".to_string())),
                }
            }
            other => validation_result(other, true, None),
        };
        Ok(result.into())
    }
}
