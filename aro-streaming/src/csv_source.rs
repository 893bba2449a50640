use crate::source::{ChannelSource, StreamSource};
use aro_errors::{AroError, AroResult, ErrorKind};
use aro_value::{SharedMap, Value, ValueMap};
use compact_str::CompactString;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub struct CsvConfig {
    pub delimiter: u8,
    pub quote: u8,
    pub header: bool,
    pub trim: bool,
}

impl Default for CsvConfig {
    fn default() -> Self {
        CsvConfig { delimiter: b',', quote: b'"', header: true, trim: true }
    }
}

/// Lowercases a CSV header cell, replaces spaces and periods with hyphens,
/// and collapses repeated hyphens, per `spec.md` §4.8.
fn normalize_header(raw: &str) -> CompactString {
    let mut out = String::with_capacity(raw.len());
    let mut last_was_hyphen = false;
    for ch in raw.trim().chars() {
        let mapped = match ch {
            ' ' | '.' => '-',
            c => c.to_ascii_lowercase(),
        };
        if mapped == '-' {
            if !last_was_hyphen {
                out.push('-');
            }
            last_was_hyphen = true;
        } else {
            out.push(mapped);
            last_was_hyphen = false;
        }
    }
    CompactString::from(out)
}

/// Typed auto-coercion per cell: boolean-looking tokens first, then
/// integers, then doubles, else the raw string, per `spec.md` §4.8.
fn coerce_cell(raw: &str) -> Value {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => return Value::Bool(true),
        "false" | "no" | "0" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(d) = raw.parse::<f64>() {
        return Value::Double(d);
    }
    Value::string(raw)
}

fn csv_err(path: &std::path::Path, e: impl std::fmt::Display) -> AroError {
    AroError::new(ErrorKind::FileSystemError, format!("{}: {e}", path.display()))
}

pub fn from_csv(path: impl Into<PathBuf>, config: CsvConfig) -> Arc<dyn StreamSource> {
    let path = path.into();
    let (tx, rx) = mpsc::channel(256);
    tokio::task::spawn_blocking(move || {
        let outcome = (|| -> AroResult<()> {
            let file = std::fs::File::open(&path).map_err(|e| csv_err(&path, e))?;
            let mut builder = csv::ReaderBuilder::new();
            builder
                .delimiter(config.delimiter)
                .quote(config.quote)
                .has_headers(config.header)
                .trim(if config.trim { csv::Trim::All } else { csv::Trim::None });
            let mut reader = builder.from_reader(file);

            let headers: Vec<CompactString> = if config.header {
                reader.headers().map_err(|e| csv_err(&path, e))?.iter().map(normalize_header).collect()
            } else {
                Vec::new()
            };

            for record in reader.records() {
                let record = record.map_err(|e| csv_err(&path, e))?;
                let map: ValueMap = if config.header {
                    headers.iter().cloned().zip(record.iter().map(coerce_cell)).collect()
                } else {
                    record
                        .iter()
                        .enumerate()
                        .map(|(i, cell)| (CompactString::from(format!("column_{i}")), coerce_cell(cell)))
                        .collect()
                };
                if tx.blocking_send(Ok(Value::Map(SharedMap::from_map(map)))).is_err() {
                    return Ok(());
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_headers() {
        assert_eq!(normalize_header("First Name"), "first-name");
        assert_eq!(normalize_header("Zip..Code"), "zip-code");
    }

    #[test]
    fn coerces_bool_int_double_then_string() {
        assert_eq!(coerce_cell("yes"), Value::Bool(true));
        assert_eq!(coerce_cell("0"), Value::Bool(false));
        assert_eq!(coerce_cell("42"), Value::Int(42));
        assert_eq!(coerce_cell("3.14"), Value::Double(3.14));
        assert_eq!(coerce_cell("hello"), Value::string("hello"));
    }
}
