use crate::object::{Capability, SystemObject};
use aro_errors::AroResult;
use aro_value::Value;
use async_trait::async_trait;
use compact_str::CompactString;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// Process-wide command-line parameter storage, populated once by the
/// front-end before any feature set runs (`spec.md` §4.9, §6).
#[derive(Default)]
pub struct ParameterStore {
    values: RwLock<FxHashMap<String, Value>>,
}

impl ParameterStore {
    pub fn new() -> Arc<Self> {
        Arc::new(ParameterStore { values: RwLock::new(FxHashMap::default()) })
    }

    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.values.write().insert(name.into(), value);
    }
}

/// `parameter` (source): reads one named parameter, or the full map when
/// no property is given.
pub struct ParameterObject {
    store: Arc<ParameterStore>,
}

impl ParameterObject {
    pub fn new(store: Arc<ParameterStore>) -> Self {
        ParameterObject { store }
    }
}

#[async_trait]
impl SystemObject for ParameterObject {
    fn capabilities(&self) -> Capability {
        Capability::Source
    }

    async fn read(&self, property: Option<&str>) -> AroResult<Value> {
        let values = self.store.values.read();
        match property {
            Some(name) => Ok(values.get(name).cloned().unwrap_or(Value::Null)),
            None => Ok(Value::map(values.iter().map(|(k, v)| (CompactString::from(k.as_str()), v.clone())))),
        }
    }
}

/// Coerces a raw command-line value `Int -> Double -> Bool -> String`
/// (`spec.md` §6), trying each parse in turn and falling back to the raw
/// string.
fn coerce(raw: &str) -> Value {
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(d) = raw.parse::<f64>() {
        return Value::Double(d);
    }
    if raw.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    Value::string(raw)
}

/// Parses `argv` into `store` per `spec.md` §6: `--name value`,
/// `--name=value`, `--flag` (boolean true), and short `-abc` which splits
/// into three boolean flags `a`, `b`, `c`. Positional arguments (anything
/// not introduced by `-`) are skipped. The front-end driving the engine
/// calls this once at startup, before any feature set runs — the store
/// itself is already safe for concurrent reads from then on.
pub fn parse_args<S: AsRef<str>>(store: &ParameterStore, argv: impl IntoIterator<Item = S>) {
    let args: Vec<String> = argv.into_iter().map(|s| s.as_ref().to_string()).collect();
    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        if let Some(long) = arg.strip_prefix("--") {
            if let Some((name, value)) = long.split_once('=') {
                store.set(name.to_string(), coerce(value));
                i += 1;
                continue;
            }
            match args.get(i + 1) {
                Some(next) if !next.starts_with('-') => {
                    store.set(long.to_string(), coerce(next));
                    i += 2;
                }
                _ => {
                    store.set(long.to_string(), Value::Bool(true));
                    i += 1;
                }
            }
        } else if let Some(short) = arg.strip_prefix('-') {
            if !short.is_empty() && !short.starts_with('-') {
                for flag in short.chars() {
                    store.set(flag.to_string(), Value::Bool(true));
                }
            }
            i += 1;
        } else {
            i += 1;
        }
    }
}
