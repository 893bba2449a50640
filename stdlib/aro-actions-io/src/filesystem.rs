//! `Createdirectory`/`mkdir`, `copy`, `move`/`rename` (`spec.md` §4.2):
//! own-role filesystem verbs. Source/destination paths are always plain
//! strings resolved through the context, validated the same way
//! `FileObject` rejects `..` traversal.

use aro_ast::{Preposition, Role};
use aro_errors::{AroError, AroResult, ErrorKind};
use aro_runtime::{Action, ActionOutcome, ActionRequest};
use aro_value::Value;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

fn safe_path(raw: &str) -> AroResult<PathBuf> {
    let path = Path::new(raw);
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(AroError::new(ErrorKind::FileSystemError, format!("path traversal rejected: `{raw}`")));
    }
    Ok(path.to_path_buf())
}

fn path_of(value: &Value) -> AroResult<&str> {
    match value {
        Value::String(s) => Ok(s.as_str()),
        other => Err(AroError::type_mismatch("string path", other)),
    }
}

pub struct CreateDirectoryAction;

#[async_trait]
impl Action for CreateDirectoryAction {
    fn role(&self) -> Role {
        Role::Own
    }

    fn verbs(&self) -> &'static [&'static str] {
        &["createdirectory", "mkdir"]
    }

    fn valid_prepositions(&self) -> &'static [Preposition] {
        &[Preposition::At]
    }

    async fn execute(&self, request: &ActionRequest<'_>) -> AroResult<ActionOutcome> {
        let value = request.object.as_value().ok_or_else(|| {
            AroError::new(ErrorKind::TypeMismatch, "createdirectory requires a resolved path value")
        })?;
        let path = safe_path(path_of(value)?)?;
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|e| AroError::new(ErrorKind::FileSystemError, format!("{}: {e}", path.display())))?;
        Ok(Value::Bool(true).into())
    }
}

pub struct CopyAction;

#[async_trait]
impl Action for CopyAction {
    fn role(&self) -> Role {
        Role::Own
    }

    fn verbs(&self) -> &'static [&'static str] {
        &["copy"]
    }

    fn valid_prepositions(&self) -> &'static [Preposition] {
        &[Preposition::To]
    }

    async fn execute(&self, request: &ActionRequest<'_>) -> AroResult<ActionOutcome> {
        let from_name = request.statement.result.base.as_str();
        let from = request.ctx.resolve(from_name).ok_or_else(|| AroError::undefined_variable(from_name))?;
        let from_path = safe_path(path_of(&from)?)?;
        let to_value = request.object.as_value().ok_or_else(|| {
            AroError::new(ErrorKind::TypeMismatch, "copy requires a resolved destination path")
        })?;
        let to_path = safe_path(path_of(to_value)?)?;
        tokio::fs::copy(&from_path, &to_path)
            .await
            .map_err(|e| AroError::new(ErrorKind::FileSystemError, format!("{} -> {}: {e}", from_path.display(), to_path.display())))?;
        Ok(Value::Bool(true).into())
    }
}

pub struct MoveAction;

#[async_trait]
impl Action for MoveAction {
    fn role(&self) -> Role {
        Role::Own
    }

    fn verbs(&self) -> &'static [&'static str] {
        &["move", "rename"]
    }

    fn valid_prepositions(&self) -> &'static [Preposition] {
        &[Preposition::To]
    }

    async fn execute(&self, request: &ActionRequest<'_>) -> AroResult<ActionOutcome> {
        let from_name = request.statement.result.base.as_str();
        let from = request.ctx.resolve(from_name).ok_or_else(|| AroError::undefined_variable(from_name))?;
        let from_path = safe_path(path_of(&from)?)?;
        let to_value = request.object.as_value().ok_or_else(|| {
            AroError::new(ErrorKind::TypeMismatch, "move requires a resolved destination path")
        })?;
        let to_path = safe_path(path_of(to_value)?)?;
        tokio::fs::rename(&from_path, &to_path)
            .await
            .map_err(|e| AroError::new(ErrorKind::FileSystemError, format!("{} -> {}: {e}", from_path.display(), to_path.display())))?;
        Ok(Value::Bool(true).into())
    }
}
