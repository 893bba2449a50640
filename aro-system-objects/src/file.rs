use crate::format::DataFormat;
use crate::object::{Capability, SystemObject};
use aro_errors::{AroError, AroResult, ErrorKind};
use aro_value::Value;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// `file` (bidirectional): constructed with a path validated against path
/// traversal; content format is auto-derived from the extension
/// (`spec.md` §4.9, §6).
pub struct FileObject {
    path: PathBuf,
    format: DataFormat,
}

impl FileObject {
    pub fn new(specifiers: &[String]) -> AroResult<Self> {
        let raw = specifiers.first().ok_or_else(|| {
            AroError::new(ErrorKind::FileSystemError, "file system object requires a path specifier")
        })?;
        let path = Path::new(raw);
        if path.components().any(|c| matches!(c, std::path::Component::ParentDir)) {
            return Err(AroError::new(ErrorKind::FileSystemError, format!("path traversal rejected: `{raw}`")));
        }
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .map(DataFormat::from_extension)
            .unwrap_or(DataFormat::Binary);
        Ok(FileObject { path: path.to_path_buf(), format })
    }
}

#[async_trait]
impl SystemObject for FileObject {
    fn capabilities(&self) -> Capability {
        Capability::Bidirectional
    }

    async fn read(&self, _property: Option<&str>) -> AroResult<Value> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| AroError::new(ErrorKind::FileSystemError, format!("{}: {e}", self.path.display())))?;
        self.format.parse(&bytes)
    }

    async fn write(&self, value: Value) -> AroResult<()> {
        let bytes = self.format.serialize(&value)?;
        if self.format == DataFormat::Log {
            use tokio::io::AsyncWriteExt;
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .await
                .map_err(|e| AroError::new(ErrorKind::FileSystemError, format!("{}: {e}", self.path.display())))?;
            file.write_all(&bytes)
                .await
                .map_err(|e| AroError::new(ErrorKind::FileSystemError, format!("{}: {e}", self.path.display())))?;
            file.write_all(b"\n")
                .await
                .map_err(|e| AroError::new(ErrorKind::FileSystemError, format!("{}: {e}", self.path.display())))?;
            return Ok(());
        }
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| AroError::new(ErrorKind::FileSystemError, format!("{}: {e}", self.path.display())))
    }
}
