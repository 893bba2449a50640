//! `Read` (`spec.md` §4.2): the request-role catchall for `read`, `list`,
//! `stat`, `exists`, `receive`, `call` and `parse` once `get`/`retrieve`/
//! `fetch`/`load`/`find` have already been claimed by the repository-
//! oriented `Retrieve` action.
//!
//! Since dispatch step 4 already requires the object to resolve before an
//! action ever runs, `stat`/`exists` can't observe "absent" — by the time
//! this action sees the request, existence is already established. They
//! report on what *did* resolve: `exists` is unconditionally `true`, and
//! `stat` describes the resolved value's shape.

use aro_ast::{Preposition, Role};
use aro_errors::AroResult;
use aro_runtime::{Action, ActionOutcome, ActionRequest, ObjectResolution};
use aro_value::Value;
use async_trait::async_trait;
use compact_str::CompactString;

pub struct ReadAction;

fn stat_of(value: &Value) -> Value {
    let type_name = value.type_name();
    let len = match value {
        Value::List(l) => Some(l.len() as i64),
        Value::Map(m) | Value::Entity(m) => Some(m.len() as i64),
        Value::String(s) => Some(s.chars().count() as i64),
        _ => None,
    };
    let mut fields = vec![(CompactString::from("type"), Value::string(type_name))];
    if let Some(len) = len {
        fields.push((CompactString::from("length"), Value::Int(len)));
    }
    Value::map(fields)
}

#[async_trait]
impl Action for ReadAction {
    fn role(&self) -> Role {
        Role::Request
    }

    fn verbs(&self) -> &'static [&'static str] {
        &["read", "list", "stat", "exists", "receive", "call", "parse"]
    }

    fn valid_prepositions(&self) -> &'static [Preposition] {
        &[Preposition::From, Preposition::Via]
    }

    async fn execute(&self, request: &ActionRequest<'_>) -> AroResult<ActionOutcome> {
        let verb = request.statement.verb.as_str();

        let resolved = match &request.object {
            ObjectResolution::SystemObject(obj) => obj.read(request.first_specifier()).await?,
            ObjectResolution::Value(v) => v.clone(),
            ObjectResolution::Repository(repo) => {
                let activity = request.ctx.business_activity.as_str();
                Value::list(request.ctx.env.repository_store.retrieve(repo, activity, None, None))
            }
        };

        let outcome = match verb {
            "exists" => Value::Bool(true),
            "stat" => stat_of(&resolved),
            _ => resolved,
        };
        Ok(outcome.into())
    }
}
