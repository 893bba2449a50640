use crate::Value;

/// Structural equality for every variant except `Stream` and
/// `ForeignObject`, which compare by handle identity (`spec.md` §3).
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Int(a), Value::Double(b)) | (Value::Double(b), Value::Int(a)) => {
                *a as f64 == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Entity(a), Value::Entity(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::DateRange(a), Value::DateRange(b)) => a == b,
            (Value::DateDistance(a), Value::DateDistance(b)) => a == b,
            (Value::Stream(a), Value::Stream(b)) => a == b,
            (Value::ForeignObject(a), Value::ForeignObject(b)) => a == b,
            _ => false,
        }
    }
}
