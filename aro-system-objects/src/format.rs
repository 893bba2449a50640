//! Content-format detection and (de)serialization shared by the `file` and
//! `url` system objects (`spec.md` §6).

use aro_errors::{AroError, AroResult, ErrorKind};
use aro_value::{json_to_value, value_to_json, SharedList, SharedMap, Value, ValueMap};
use compact_str::CompactString;
use std::io::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Json,
    Xml,
    Csv,
    Tsv,
    Yaml,
    Toml,
    Jsonl,
    Markdown,
    Html,
    Text,
    Sql,
    /// Write-only: `file` writes append rather than overwrite.
    Log,
    Env,
    Binary,
}

impl DataFormat {
    pub fn from_extension(ext: &str) -> DataFormat {
        match ext.to_ascii_lowercase().as_str() {
            "json" => DataFormat::Json,
            "yaml" | "yml" => DataFormat::Yaml,
            "xml" => DataFormat::Xml,
            "toml" => DataFormat::Toml,
            "csv" => DataFormat::Csv,
            "tsv" => DataFormat::Tsv,
            "md" => DataFormat::Markdown,
            "html" | "htm" => DataFormat::Html,
            "txt" => DataFormat::Text,
            "sql" => DataFormat::Sql,
            "jsonl" | "ndjson" => DataFormat::Jsonl,
            "log" => DataFormat::Log,
            "env" => DataFormat::Env,
            "bin" | "obj" => DataFormat::Binary,
            _ => DataFormat::Binary,
        }
    }

    pub fn from_content_type(content_type: &str) -> DataFormat {
        let base = content_type.split(';').next().unwrap_or(content_type).trim().to_ascii_lowercase();
        match base.as_str() {
            "application/json" => DataFormat::Json,
            t if t.starts_with("application/") && t.ends_with("+json") => DataFormat::Json,
            "application/xml" | "text/xml" => DataFormat::Xml,
            "text/csv" | "application/csv" => DataFormat::Csv,
            "text/tab-separated-values" => DataFormat::Tsv,
            "text/yaml" | "application/x-yaml" | "application/yaml" => DataFormat::Yaml,
            "application/toml" | "text/toml" => DataFormat::Toml,
            "application/x-ndjson" | "application/jsonl" => DataFormat::Jsonl,
            "text/markdown" => DataFormat::Markdown,
            "text/html" => DataFormat::Html,
            "text/plain" => DataFormat::Text,
            _ => DataFormat::Text,
        }
    }

    pub fn parse(self, bytes: &[u8]) -> AroResult<Value> {
        match self {
            DataFormat::Json => {
                let json: serde_json::Value = serde_json::from_slice(bytes).map_err(format_err)?;
                Ok(json_to_value(json))
            }
            DataFormat::Jsonl => {
                let text = String::from_utf8_lossy(bytes);
                let items: Vec<Value> = text
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with("//"))
                    .map(|l| serde_json::from_str::<serde_json::Value>(l).map(json_to_value).map_err(format_err))
                    .collect::<AroResult<Vec<_>>>()?;
                Ok(Value::List(SharedList::from_vec(items)))
            }
            DataFormat::Yaml => {
                let yaml: serde_yaml::Value = serde_yaml::from_slice(bytes).map_err(format_err)?;
                let json = serde_json::to_value(yaml).map_err(format_err)?;
                Ok(json_to_value(json))
            }
            DataFormat::Toml => {
                let text = std::str::from_utf8(bytes).map_err(format_err)?;
                let toml_value: toml::Value = toml::from_str(text).map_err(format_err)?;
                let json = serde_json::to_value(toml_value).map_err(format_err)?;
                Ok(json_to_value(json))
            }
            DataFormat::Csv | DataFormat::Tsv => parse_delimited(bytes, if self == DataFormat::Tsv { b'\t' } else { b',' }),
            DataFormat::Xml => parse_xml(bytes),
            DataFormat::Env => parse_env(bytes),
            DataFormat::Markdown | DataFormat::Html | DataFormat::Text | DataFormat::Sql | DataFormat::Log => {
                Ok(Value::string(String::from_utf8_lossy(bytes).into_owned()))
            }
            DataFormat::Binary => Ok(Value::Bytes(SharedList::from_vec(bytes.to_vec()))),
        }
    }

    pub fn serialize(self, value: &Value) -> AroResult<Vec<u8>> {
        match self {
            DataFormat::Json => serde_json::to_vec_pretty(&value_to_json(value)).map_err(format_err),
            DataFormat::Jsonl => {
                let Value::List(items) = value else {
                    return Err(AroError::type_mismatch("list", value));
                };
                let mut out = Vec::new();
                for item in items.iter() {
                    serde_json::to_writer(&mut out, &value_to_json(item)).map_err(format_err)?;
                    out.push(b'\n');
                }
                Ok(out)
            }
            DataFormat::Yaml => {
                let json = value_to_json(value);
                serde_yaml::to_string(&json).map(String::into_bytes).map_err(format_err)
            }
            DataFormat::Toml => {
                let json = value_to_json(value);
                let toml_value: toml::Value = serde_json::from_value(json).map_err(format_err)?;
                toml::to_string_pretty(&toml_value).map(String::into_bytes).map_err(format_err)
            }
            DataFormat::Csv | DataFormat::Tsv => serialize_delimited(value, if self == DataFormat::Tsv { b'\t' } else { b',' }),
            DataFormat::Xml => serialize_xml(value),
            DataFormat::Env => serialize_env(value),
            DataFormat::Markdown | DataFormat::Html | DataFormat::Text | DataFormat::Sql | DataFormat::Log => {
                Ok(display_value(value).into_bytes())
            }
            DataFormat::Binary => match value {
                Value::Bytes(b) => Ok(b.as_slice().to_vec()),
                other => Ok(display_value(other).into_bytes()),
            },
        }
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.to_string(),
        other => other.to_string(),
    }
}

fn format_err(e: impl std::fmt::Display) -> AroError {
    AroError::new(ErrorKind::FileSystemError, e.to_string())
}

fn parse_delimited(bytes: &[u8], delimiter: u8) -> AroResult<Value> {
    let mut reader = csv::ReaderBuilder::new().delimiter(delimiter).has_headers(true).from_reader(Cursor::new(bytes));
    let headers: Vec<CompactString> = reader.headers().map_err(format_err)?.iter().map(CompactString::from).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(format_err)?;
        let map: ValueMap = headers.iter().cloned().zip(record.iter().map(Value::string)).collect();
        rows.push(Value::Map(SharedMap::from_map(map)));
    }
    Ok(Value::List(SharedList::from_vec(rows)))
}

fn serialize_delimited(value: &Value, delimiter: u8) -> AroResult<Vec<u8>> {
    let Value::List(rows) = value else {
        return Err(AroError::type_mismatch("list of maps", value));
    };
    let mut writer = csv::WriterBuilder::new().delimiter(delimiter).from_writer(Vec::new());
    let mut headers_written = false;
    for row in rows.iter() {
        let Value::Map(map) | Value::Entity(map) = row else {
            return Err(AroError::type_mismatch("map", row));
        };
        if !headers_written {
            let headers: Vec<String> = map.as_map().keys().map(|k| k.to_string()).collect();
            writer.write_record(&headers).map_err(format_err)?;
            headers_written = true;
        }
        let cells: Vec<String> = map.as_map().values().map(display_value).collect();
        writer.write_record(&cells).map_err(format_err)?;
    }
    writer.into_inner().map_err(|e| format_err(e.to_string()))
}

/// A minimal, best-effort XML/Value mapping: each element becomes a map
/// with `@attr` entries for attributes and a `#text` entry for bare text
/// content; repeated sibling tags collapse into a list.
fn parse_xml(bytes: &[u8]) -> AroResult<Value> {
    use quick_xml::events::Event as XmlEvent;
    use quick_xml::reader::Reader;

    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);
    let mut stack: Vec<(String, ValueMap, String)> = Vec::new();
    let mut root: Option<Value> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).map_err(format_err)? {
            XmlEvent::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let mut map = ValueMap::new();
                for attr in e.attributes().flatten() {
                    let key = format!("@{}", String::from_utf8_lossy(attr.key.as_ref()));
                    let val = attr.unescape_value().unwrap_or_default().into_owned();
                    map.insert(CompactString::from(key), Value::string(val));
                }
                stack.push((name, map, String::new()));
            }
            XmlEvent::Text(t) => {
                if let Some((_, _, text)) = stack.last_mut() {
                    text.push_str(&t.unescape().unwrap_or_default());
                }
            }
            XmlEvent::End(_) => {
                if let Some((name, mut map, text)) = stack.pop() {
                    if !text.trim().is_empty() {
                        map.insert(CompactString::from("#text"), Value::string(text.trim().to_string()));
                    }
                    let element = Value::Map(SharedMap::from_map(map));
                    if let Some((_, parent_map, _)) = stack.last_mut() {
                        insert_xml_child(parent_map, &name, element);
                    } else {
                        root = Some(element);
                    }
                }
            }
            XmlEvent::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(root.unwrap_or(Value::Null))
}

fn insert_xml_child(parent: &mut ValueMap, name: &str, child: Value) {
    let key = CompactString::from(name);
    match parent.get_mut(&key) {
        Some(Value::List(items)) => items.to_mut().push(child),
        Some(existing) => {
            let prior = existing.clone();
            *existing = Value::List(SharedList::from_vec(vec![prior, child]));
        }
        None => {
            parent.insert(key, child);
        }
    }
}

fn serialize_xml(value: &Value) -> AroResult<Vec<u8>> {
    let mut out = String::from("<root>");
    write_xml_value(&mut out, value);
    out.push_str("</root>");
    Ok(out.into_bytes())
}

fn write_xml_value(out: &mut String, value: &Value) {
    match value {
        Value::Map(m) | Value::Entity(m) => {
            for (k, v) in m.iter() {
                if k.starts_with('@') || k.as_str() == "#text" {
                    continue;
                }
                out.push('<');
                out.push_str(k);
                out.push('>');
                write_xml_value(out, v);
                out.push_str("</");
                out.push_str(k);
                out.push('>');
            }
        }
        Value::List(items) => {
            for item in items.iter() {
                write_xml_value(out, item);
            }
        }
        other => out.push_str(&display_value(other)),
    }
}

fn parse_env(bytes: &[u8]) -> AroResult<Value> {
    let text = String::from_utf8_lossy(bytes);
    let mut map = ValueMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, val)) = line.split_once('=') {
            map.insert(CompactString::from(key.trim()), Value::string(val.trim()));
        }
    }
    Ok(Value::Map(SharedMap::from_map(map)))
}

/// Uppercases keys and flattens nested maps by underscore-joining, per
/// `spec.md` §6.
fn serialize_env(value: &Value) -> AroResult<Vec<u8>> {
    let Value::Map(map) | Value::Entity(map) = value else {
        return Err(AroError::type_mismatch("map", value));
    };
    let mut lines = Vec::new();
    flatten_env(map.as_map(), String::new(), &mut lines);
    Ok(lines.join("\n").into_bytes())
}

fn flatten_env(map: &ValueMap, prefix: String, out: &mut Vec<String>) {
    for (k, v) in map.iter() {
        let key = if prefix.is_empty() { k.to_ascii_uppercase() } else { format!("{prefix}_{}", k.to_ascii_uppercase()) };
        match v {
            Value::Map(nested) | Value::Entity(nested) => flatten_env(nested.as_map(), key, out),
            other => out.push(format!("{key}={}", display_value(other))),
        }
    }
}
