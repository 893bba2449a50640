//! The lazy, pull-based streaming pipeline (`spec.md` §4.8): stream
//! construction and combinators, CSV/JSONL parsing, the ring-buffered
//! `tee` fan-out, and the registry that resolves a `Value::Stream` handle
//! to its live producer.

mod combinators;
mod csv_source;
mod jsonl_source;
mod registry;
mod ring_buffer;
mod sinks;
mod source;

pub use combinators::{
    compact_map, drop_n, drop_while, field, filter, flat_map, map, project, take, take_while, where_field,
    CompactMapFn, FlatMapFn, MapFn, Predicate,
};
pub use csv_source::{from_csv, CsvConfig};
pub use jsonl_source::{from_jsonl, JsonlConfig};
pub use registry::StreamRegistry;
pub use ring_buffer::{tee, RingBuffer};
pub use sinks::{all_satisfy, collect, collect_arc, contains, count, first, first_matching, max, min, reduce, sum};
pub use source::{empty, from_buffered, from_list, just, StreamSource};

use aro_errors::AroResult;
use aro_value::Value;
use async_trait::async_trait;

/// Feeds `fromBuffered` — an arbitrary external pull source (a socket
/// read, a generator, ...) that the ring-buffered channel wraps with
/// look-ahead.
#[async_trait]
pub trait Supplier: Send + Sync {
    async fn supply(&self) -> AroResult<Option<Value>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn filter_map_take_compose_in_order() {
        let s = from_list(vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]);
        let s = filter(s, std::sync::Arc::new(|v: &Value| matches!(v, Value::Int(i) if i % 2 == 0)));
        let s = map(s, std::sync::Arc::new(|v: Value| Ok(match v {
            Value::Int(i) => Value::Int(i * 10),
            other => other,
        })));
        let out = collect(s.as_ref()).await.unwrap();
        assert_eq!(out, vec![Value::Int(20), Value::Int(40)]);
    }

    #[tokio::test]
    async fn take_while_stops_at_first_failure() {
        let s = from_list(vec![Value::Int(1), Value::Int(2), Value::Int(5), Value::Int(1)]);
        let s = take_while(s, std::sync::Arc::new(|v: &Value| matches!(v, Value::Int(i) if *i < 3)));
        let out = collect(s.as_ref()).await.unwrap();
        assert_eq!(out, vec![Value::Int(1), Value::Int(2)]);
    }

    #[tokio::test]
    async fn sum_and_max_over_ints() {
        let s = from_list(vec![Value::Int(3), Value::Int(7), Value::Int(2)]);
        assert_eq!(sum(s.as_ref()).await.unwrap(), Value::Int(12));
        let s = from_list(vec![Value::Int(3), Value::Int(7), Value::Int(2)]);
        assert_eq!(max(s.as_ref()).await.unwrap(), Some(Value::Int(7)));
    }
}
