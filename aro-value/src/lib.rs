//! The ARO `Value` type.
//!
//! `Value` is the single currency every action, binding and repository
//! record in the execution core trades in. It is a closed discriminated
//! sum (no `Box<dyn Any>`, no runtime reflection) so that every action's
//! contract can be expressed as ordinary Rust pattern matching.

mod date;
mod display;
mod eq;
mod ids;
mod json;
mod map;

pub use date::{DateDistance, DateRange, DateUnit, DateValue};
pub use ids::{ForeignId, StreamId};
pub use json::{json_to_value, value_to_json};
pub use map::{SharedList, SharedMap, ValueMap};

use arcstr::ArcStr;
use compact_str::CompactString;
use std::fmt;

/// The canonical ARO runtime value.
///
/// Cloning a `Value` is always cheap: collection and entity variants are
/// reference-counted (`triomphe::Arc`) and copy their payload only when a
/// mutation actually needs a unique view of it (see [`map::SharedMap::to_mut`]
/// and [`map::SharedList::to_mut`]).
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(ArcStr),
    Bytes(SharedList<u8>),
    List(SharedList<Value>),
    Map(SharedMap),
    Date(DateValue),
    DateRange(DateRange),
    DateDistance(DateDistance),
    /// A handle to a lazy stream producer (see `aro-streaming`). Streams
    /// compare by identity, never by the elements they would yield.
    Stream(StreamId),
    /// An opaque record carrying an `id` field. Structurally equal to
    /// another entity iff their underlying maps are equal.
    Entity(SharedMap),
    /// A handle to a system object (console, file, url, ...). Compares by
    /// identity, like `Stream`.
    ForeignObject(ForeignId),
}

impl Value {
    pub fn string(s: impl Into<ArcStr>) -> Self {
        Value::String(s.into())
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(SharedList::from_vec(items.into_iter().collect()))
    }

    pub fn map(entries: impl IntoIterator<Item = (CompactString, Value)>) -> Self {
        Value::Map(SharedMap::from_map(ValueMap::from_iter(entries)))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Best-effort truthiness, used by `when` guards and `match` arms.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Double(d) => *d != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Bytes(b) => !b.is_empty(),
            Value::List(l) => !l.is_empty(),
            Value::Map(m) => !m.is_empty(),
            Value::Entity(_) => true,
            Value::Date(_) | Value::DateRange(_) | Value::DateDistance(_) => true,
            Value::Stream(_) | Value::ForeignObject(_) => true,
        }
    }

    /// Human-readable name of this value's kind, used in `TypeMismatch`
    /// diagnostics and the error template's `<var>` substitution.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Date(_) => "date",
            Value::DateRange(_) => "date-range",
            Value::DateDistance(_) => "date-distance",
            Value::Stream(_) => "stream",
            Value::Entity(_) => "entity",
            Value::ForeignObject(_) => "foreign-object",
        }
    }

    /// Read a single field of a `Map` or `Entity` value by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Map(m) | Value::Entity(m) => m.get(name),
            _ => None,
        }
    }

    pub fn as_entity_id(&self) -> Option<ArcStr> {
        match self.field("id") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(ArcStr::from(other.to_string())),
            None => None,
        }
    }

    pub fn wrap_entity(mut map: ValueMap, id: ArcStr) -> Value {
        map.insert(CompactString::from("id"), Value::String(id));
        Value::Entity(SharedMap::from_map(map))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display::fmt_value(self, f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(ArcStr::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(ArcStr::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthy_matches_spec_examples() {
        assert!(!Value::Null.truthy());
        assert!(!Value::Int(0).truthy());
        assert!(Value::Int(1).truthy());
        assert!(!Value::string("").truthy());
        assert!(Value::string("x").truthy());
    }

    #[test]
    fn entity_field_access() {
        let mut m = ValueMap::new();
        m.insert(CompactString::from("status"), Value::string("draft"));
        let e = Value::wrap_entity(m, ArcStr::from("o-1"));
        assert_eq!(e.field("status").unwrap().to_string(), "draft");
        assert_eq!(e.as_entity_id().unwrap().as_str(), "o-1");
    }
}
