use crate::source::StreamSource;
use aro_errors::{AroError, AroResult, ErrorKind};
use aro_value::Value;
use std::cmp::Ordering;
use std::sync::Arc;

pub async fn collect(source: &dyn StreamSource) -> AroResult<Vec<Value>> {
    let mut out = Vec::new();
    while let Some(v) = source.next().await? {
        out.push(v);
    }
    Ok(out)
}

pub async fn reduce(
    source: &dyn StreamSource,
    seed: Value,
    f: impl Fn(Value, Value) -> AroResult<Value>,
) -> AroResult<Value> {
    let mut acc = seed;
    while let Some(v) = source.next().await? {
        acc = f(acc, v)?;
    }
    Ok(acc)
}

pub async fn count(source: &dyn StreamSource) -> AroResult<i64> {
    let mut n = 0i64;
    while source.next().await?.is_some() {
        n += 1;
    }
    Ok(n)
}

pub async fn first(source: &dyn StreamSource) -> AroResult<Option<Value>> {
    source.next().await
}

pub async fn first_matching(
    source: &dyn StreamSource,
    pred: impl Fn(&Value) -> bool,
) -> AroResult<Option<Value>> {
    while let Some(v) = source.next().await? {
        if pred(&v) {
            return Ok(Some(v));
        }
    }
    Ok(None)
}

pub async fn contains(source: &dyn StreamSource, target: &Value) -> AroResult<bool> {
    while let Some(v) = source.next().await? {
        if &v == target {
            return Ok(true);
        }
    }
    Ok(false)
}

pub async fn all_satisfy(source: &dyn StreamSource, pred: impl Fn(&Value) -> bool) -> AroResult<bool> {
    while let Some(v) = source.next().await? {
        if !pred(&v) {
            return Ok(false);
        }
    }
    Ok(true)
}

pub async fn sum(source: &dyn StreamSource) -> AroResult<Value> {
    let mut int_total: i64 = 0;
    let mut double_total: f64 = 0.0;
    let mut saw_double = false;
    while let Some(v) = source.next().await? {
        match v {
            Value::Int(i) => int_total += i,
            Value::Double(d) => {
                saw_double = true;
                double_total += d;
            }
            other => return Err(AroError::type_mismatch("int or double", &other)),
        }
    }
    if saw_double {
        Ok(Value::Double(double_total + int_total as f64))
    } else {
        Ok(Value::Int(int_total))
    }
}

fn compare_numeric(a: &Value, b: &Value) -> AroResult<Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(x.cmp(y)),
        (Value::Double(x), Value::Double(y)) => {
            x.partial_cmp(y).ok_or_else(|| AroError::new(ErrorKind::TypeMismatch, "NaN is not orderable"))
        }
        (Value::Int(x), Value::Double(y)) => (*x as f64)
            .partial_cmp(y)
            .ok_or_else(|| AroError::new(ErrorKind::TypeMismatch, "NaN is not orderable")),
        (Value::Double(x), Value::Int(y)) => x
            .partial_cmp(&(*y as f64))
            .ok_or_else(|| AroError::new(ErrorKind::TypeMismatch, "NaN is not orderable")),
        (Value::String(x), Value::String(y)) => Ok(x.cmp(y)),
        _ => Err(AroError::type_mismatch("comparable values of the same kind", b)),
    }
}

pub async fn min(source: &dyn StreamSource) -> AroResult<Option<Value>> {
    extremum(source, Ordering::Less).await
}

pub async fn max(source: &dyn StreamSource) -> AroResult<Option<Value>> {
    extremum(source, Ordering::Greater).await
}

async fn extremum(source: &dyn StreamSource, keep_if: Ordering) -> AroResult<Option<Value>> {
    let mut best: Option<Value> = None;
    while let Some(v) = source.next().await? {
        best = match best {
            None => Some(v),
            Some(current) => {
                if compare_numeric(&v, &current)? == keep_if {
                    Some(v)
                } else {
                    Some(current)
                }
            }
        };
    }
    Ok(best)
}

/// Convenience entry point matching the `Arc<dyn StreamSource>` handles
/// callers hold onto, so they don't need to deref before calling a sink.
pub async fn collect_arc(source: &Arc<dyn StreamSource>) -> AroResult<Vec<Value>> {
    collect(source.as_ref()).await
}
