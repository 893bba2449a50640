use crate::format::DataFormat;
use crate::object::{Capability, SystemObject};
use aro_errors::{AroError, AroResult, ErrorKind};
use aro_value::Value;
use async_trait::async_trait;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// `url` (bidirectional): reads GET the URL and auto-deserialize the
/// response by its `Content-Type` header; writes POST the value, JSON
/// encoded by default (`spec.md` §4.9, §6).
pub struct UrlObject {
    url: String,
    client: reqwest::Client,
}

impl UrlObject {
    pub fn new(specifiers: &[String]) -> AroResult<Self> {
        Self::with_timeout(specifiers, DEFAULT_TIMEOUT)
    }

    /// Like [`Self::new`], but with an engine-configured timeout instead of
    /// the 30s default (`spec.md` §5: "Timeouts on URL reads default to
    /// 30s and are overridable per call").
    pub fn with_timeout(specifiers: &[String], timeout: Duration) -> AroResult<Self> {
        let url = specifiers
            .first()
            .ok_or_else(|| AroError::new(ErrorKind::UrlError, "url system object requires a url specifier"))?
            .clone();
        let client =
            reqwest::Client::builder().timeout(timeout).build().map_err(|e| AroError::new(ErrorKind::UrlError, e.to_string()))?;
        Ok(UrlObject { url, client })
    }
}

fn url_err(e: impl std::fmt::Display) -> AroError {
    AroError::new(ErrorKind::UrlError, e.to_string())
}

#[async_trait]
impl SystemObject for UrlObject {
    fn capabilities(&self) -> Capability {
        Capability::Bidirectional
    }

    async fn read(&self, _property: Option<&str>) -> AroResult<Value> {
        let response = self.client.get(&self.url).header("Accept", "*/*").send().await.map_err(url_err)?;
        let format = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(DataFormat::from_content_type)
            .unwrap_or(DataFormat::Text);
        let bytes = response.bytes().await.map_err(url_err)?;
        format.parse(&bytes)
    }

    async fn write(&self, value: Value) -> AroResult<()> {
        let body = DataFormat::Json.serialize(&value)?;
        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(url_err)?;
        if !response.status().is_success() {
            return Err(AroError::new(ErrorKind::UrlError, format!("{} responded {}", self.url, response.status())));
        }
        Ok(())
    }
}
