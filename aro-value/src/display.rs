use crate::Value;
use std::fmt;

/// Rendering used by the `<var>` placeholder substitution in the
/// human-readable error template (`spec.md` §6) and by `Log`/console
/// output.
pub fn fmt_value(v: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match v {
        Value::Null => write!(f, "null"),
        Value::Bool(b) => write!(f, "{b}"),
        Value::Int(i) => write!(f, "{i}"),
        Value::Double(d) => write!(f, "{d}"),
        Value::String(s) => write!(f, "{s}"),
        Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        Value::List(items) => {
            write!(f, "[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{item}")?;
            }
            write!(f, "]")
        }
        Value::Map(m) | Value::Entity(m) => {
            write!(f, "{{")?;
            for (i, (k, val)) in m.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{k}: {val}")?;
            }
            write!(f, "}}")
        }
        Value::Date(d) => write!(f, "{d}"),
        Value::DateRange(r) => write!(f, "{r}"),
        Value::DateDistance(d) => write!(f, "{d}"),
        Value::Stream(id) => write!(f, "<stream {id}>"),
        Value::ForeignObject(id) => write!(f, "<foreign-object {id}>"),
    }
}
