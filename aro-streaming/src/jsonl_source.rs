use crate::source::{ChannelSource, StreamSource};
use aro_errors::{AroError, AroResult, ErrorKind};
use aro_events::{Event, EventBus};
use aro_value::{json_to_value, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Clone, Default)]
pub struct JsonlConfig {
    /// When set, malformed lines are reported as `jsonl.parse_error`
    /// events instead of silently vanishing.
    pub diagnostics: Option<Arc<EventBus>>,
}

fn emit_parse_error(diagnostics: &Option<Arc<EventBus>>, line: usize, message: String) {
    if let Some(bus) = diagnostics {
        bus.emit(
            Event::new("jsonl.parse_error")
                .with_field("line", Value::Int(line as i64))
                .with_field("message", Value::string(message)),
        );
    }
}

/// One JSON document per line, or a single top-level JSON array if the
/// file's first non-whitespace character is `[` (`spec.md` §4.8).
pub fn from_jsonl(path: impl Into<PathBuf>, config: JsonlConfig) -> Arc<dyn StreamSource> {
    let path = path.into();
    let (tx, rx) = mpsc::channel(256);
    tokio::task::spawn_blocking(move || {
        let outcome = (|| -> AroResult<()> {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| AroError::new(ErrorKind::FileSystemError, format!("{}: {e}", path.display())))?;

            if text.trim_start().starts_with('[') {
                let array: Vec<serde_json::Value> = serde_json::from_str(&text)
                    .map_err(|e| AroError::new(ErrorKind::FileSystemError, format!("{}: {e}", path.display())))?;
                for json in array {
                    if tx.blocking_send(Ok(json_to_value(json))).is_err() {
                        return Ok(());
                    }
                }
                return Ok(());
            }

            for (idx, line) in text.lines().enumerate() {
                let line_no = idx + 1;
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
                    continue;
                }
                match serde_json::from_str::<serde_json::Value>(trimmed) {
                    Ok(json) => {
                        if tx.blocking_send(Ok(json_to_value(json))).is_err() {
                            return Ok(());
                        }
                    }
                    Err(e) => emit_parse_error(&config.diagnostics, line_no, e.to_string()),
                }
            }
            Ok(())
        })();
        if let Err(e) = outcome {
            let _ = tx.blocking_send(Err(e));
        }
    });
    ChannelSource::new(rx)
}
