use crate::object::{Capability, SystemObject};
use aro_errors::AroResult;
use aro_value::Value;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// `console` (sink): writes strings; a leading `error` specifier routes to
/// standard error, `output` (the default) to standard output.
pub struct ConsoleObject {
    to_stderr: bool,
}

impl ConsoleObject {
    pub fn new(specifiers: &[String]) -> Self {
        ConsoleObject { to_stderr: specifiers.first().map(|s| s.eq_ignore_ascii_case("error")).unwrap_or(false) }
    }
}

#[async_trait]
impl SystemObject for ConsoleObject {
    fn capabilities(&self) -> Capability {
        Capability::Sink
    }

    async fn write(&self, value: Value) -> AroResult<()> {
        let text = match &value {
            Value::String(s) => s.to_string(),
            other => other.to_string(),
        };
        if self.to_stderr {
            let mut stderr = tokio::io::stderr();
            let _ = stderr.write_all(text.as_bytes()).await;
            let _ = stderr.write_all(b"\n").await;
        } else {
            let mut stdout = tokio::io::stdout();
            let _ = stdout.write_all(text.as_bytes()).await;
            let _ = stdout.write_all(b"\n").await;
        }
        Ok(())
    }
}

/// `stderr` (sink): like `console` with `error` always implied.
pub struct StderrObject;

#[async_trait]
impl SystemObject for StderrObject {
    fn capabilities(&self) -> Capability {
        Capability::Sink
    }

    async fn write(&self, value: Value) -> AroResult<()> {
        ConsoleObject { to_stderr: true }.write(value).await
    }
}

/// `stdin` (source): reads one line per `read` call.
pub struct StdinObject;

#[async_trait]
impl SystemObject for StdinObject {
    fn capabilities(&self) -> Capability {
        Capability::Source
    }

    async fn read(&self, _property: Option<&str>) -> AroResult<Value> {
        let mut reader = BufReader::new(tokio::io::stdin());
        let mut line = String::new();
        reader.read_line(&mut line).await.ok();
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Value::string(line))
    }
}
