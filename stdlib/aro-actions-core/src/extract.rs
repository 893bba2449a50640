//! `Extract` (`spec.md` §4.2): four distinct specifier-routed behaviors —
//! schema validation, reserved lazy-sequence indices, numeric array index,
//! and nested-property access.

use aro_ast::{Preposition, Role};
use aro_errors::{AroError, AroResult, ErrorKind};
use aro_runtime::{Action, ActionOutcome, ActionRequest, SchemaRegistryHandle};
use aro_streaming::{collect, StreamSource};
use aro_value::Value;
use async_trait::async_trait;

pub struct ExtractAction;

fn is_pascal_case(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// Drains a `List` or `Stream` in full. Only `last`/`previous` need this —
/// both require knowing where the sequence ends, so there's no way to
/// answer them without seeing every element.
async fn materialize(request: &ActionRequest<'_>, value: &Value) -> AroResult<Option<Vec<Value>>> {
    match value {
        Value::List(items) => Ok(Some(items.iter().cloned().collect())),
        Value::Stream(id) => {
            let source = request
                .ctx
                .env
                .stream_registry
                .get(*id)
                .ok_or_else(|| AroError::new(ErrorKind::Runtime, "stream handle no longer registered"))?;
            let items = collect(source.as_ref() as &dyn StreamSource).await?;
            Ok(Some(items))
        }
        _ => Ok(None),
    }
}

/// Pulls only the first `count` elements of a `List` or `Stream`
/// (`spec.md` §4.8: streams are cold, pull-based, finite-or-infinite — a
/// stream must never be drained just to answer `first`/`next`/a small
/// numeric index, or an infinite producer would hang the call forever).
/// Stops early if the sequence is shorter than `count`.
async fn pull_prefix(request: &ActionRequest<'_>, value: &Value, count: usize) -> AroResult<Option<Vec<Value>>> {
    match value {
        Value::List(items) => Ok(Some(items.iter().take(count).cloned().collect())),
        Value::Stream(id) => {
            let source = request
                .ctx
                .env
                .stream_registry
                .get(*id)
                .ok_or_else(|| AroError::new(ErrorKind::Runtime, "stream handle no longer registered"))?;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                match source.next().await? {
                    Some(v) => items.push(v),
                    None => break,
                }
            }
            Ok(Some(items))
        }
        _ => Ok(None),
    }
}

fn sequence_index(items: &[Value], reserved: &str) -> AroResult<Value> {
    let idx = match reserved {
        "first" => 0usize,
        "last" => items.len().checked_sub(1).ok_or_else(|| {
            AroError::new(ErrorKind::Runtime, "cannot extract `last` of an empty sequence")
        })?,
        "next" => 1usize,
        "previous" => items.len().checked_sub(2).ok_or_else(|| {
            AroError::new(ErrorKind::Runtime, "cannot extract `previous` of a sequence shorter than 2")
        })?,
        other => unreachable!("not a reserved specifier: {other}"),
    };
    items
        .get(idx)
        .cloned()
        .ok_or_else(|| AroError::new(ErrorKind::Runtime, format!("sequence has no `{reserved}` element")))
}

#[async_trait]
impl Action for ExtractAction {
    fn role(&self) -> Role {
        Role::Request
    }

    fn verbs(&self) -> &'static [&'static str] {
        &["extract"]
    }

    fn valid_prepositions(&self) -> &'static [Preposition] {
        &[Preposition::From, Preposition::Via]
    }

    async fn execute(&self, request: &ActionRequest<'_>) -> AroResult<ActionOutcome> {
        let value = request.object.as_value().cloned().ok_or_else(|| {
            AroError::new(ErrorKind::TypeMismatch, "extract requires a resolved value, not a system object")
        })?;
        let specifier = request.first_specifier().ok_or_else(|| {
            AroError::new(ErrorKind::Runtime, "extract requires a specifier")
        })?;

        if is_pascal_case(specifier) {
            let handle = request
                .ctx
                .service::<SchemaRegistryHandle>()
                .ok_or_else(|| AroError::missing_service("SchemaRegistry"))?;
            handle
                .0
                .validate(specifier, &value)
                .map_err(|e| AroError::new(ErrorKind::SchemaValidationError, e.to_string()))?;
            return Ok(value.into());
        }

        if matches!(specifier, "first" | "last" | "previous" | "next") {
            let items = match specifier {
                "first" => pull_prefix(request, &value, 1).await?,
                "next" => pull_prefix(request, &value, 2).await?,
                _ => materialize(request, &value).await?,
            }
            .ok_or_else(|| AroError::type_mismatch("list or stream", &value))?;
            return Ok(sequence_index(&items, specifier)?.into());
        }

        if let Ok(index) = specifier.parse::<usize>() {
            let items = pull_prefix(request, &value, index + 1)
                .await?
                .ok_or_else(|| AroError::type_mismatch("list or stream", &value))?;
            return Ok(items
                .get(index)
                .cloned()
                .ok_or_else(|| AroError::new(ErrorKind::Runtime, format!("index {index} out of bounds")))?
                .into());
        }

        value
            .field(specifier)
            .cloned()
            .ok_or_else(|| AroError::undefined_variable(specifier))
            .map(Into::into)
    }
}
