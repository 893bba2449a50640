//! Bridges between `Value` and `serde_json::Value`, shared by the JSONL
//! stream source, the `file`/`url` system objects, and JSON `Transform`.
//! Dates, streams and foreign objects have no JSON representation and are
//! serialized as their `Display` string — round-tripping them back into
//! the same `Value` variant is not attempted, matching the teacher's rule
//! of thumb that wire formats are lossy at the edges of the type system.

use crate::{SharedList, SharedMap, Value, ValueMap};
use compact_str::CompactString;

pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::Number((*i).into()),
        Value::Double(d) => serde_json::Number::from_f64(*d)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.to_string()),
        Value::List(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
        Value::Map(m) | Value::Entity(m) => {
            serde_json::Value::Object(m.iter().map(|(k, v)| (k.to_string(), value_to_json(v))).collect())
        }
        other => serde_json::Value::String(other.to_string()),
    }
}

pub fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else {
                Value::Double(n.as_f64().unwrap_or(0.0))
            }
        }
        serde_json::Value::String(s) => Value::string(s),
        serde_json::Value::Array(items) => {
            Value::List(SharedList::from_vec(items.into_iter().map(json_to_value).collect()))
        }
        serde_json::Value::Object(map) => {
            let entries: ValueMap =
                map.into_iter().map(|(k, v)| (CompactString::from(k), json_to_value(v))).collect();
            Value::Map(SharedMap::from_map(entries))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_map_of_scalars() {
        let v = Value::map([
            (CompactString::from("name"), Value::string("widget")),
            (CompactString::from("count"), Value::Int(3)),
            (CompactString::from("active"), Value::Bool(true)),
        ]);
        let json = value_to_json(&v);
        let back = json_to_value(json);
        assert_eq!(v, back);
    }
}
