//! The ARO execution core's error taxonomy (`spec.md` §7).
//!
//! Every fallible engine operation returns [`AroResult<T>`]. `AroError` is a
//! flat struct with a matchable `kind` field rather than a trait-object
//! hierarchy, so callers can match on `.kind` without downcasting. The
//! taxonomy lives in its own crate rather than folded into whichever crate
//! raises a given variant, so every downstream crate can depend on it
//! without pulling in the runtime.

use arcstr::ArcStr;
use aro_value::Value;
use std::fmt;

pub type AroResult<T> = Result<T, AroError>;

/// Stable, matchable error kind. Mirrors the taxonomy in `spec.md` §7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownAction,
    InvalidPreposition,
    UndefinedVariable,
    UndefinedRepository,
    ImmutableRebind,
    TypeMismatch,
    ValidationFailed,
    SchemaValidationError,
    StateTransitionRejected,
    MissingService,
    FileSystemError,
    UrlError,
    TemplateError,
    Runtime,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::UnknownAction => "UnknownAction",
            Self::InvalidPreposition => "InvalidPreposition",
            Self::UndefinedVariable => "UndefinedVariable",
            Self::UndefinedRepository => "UndefinedRepository",
            Self::ImmutableRebind => "ImmutableRebind",
            Self::TypeMismatch => "TypeMismatch",
            Self::ValidationFailed => "ValidationFailed",
            Self::SchemaValidationError => "SchemaValidationError",
            Self::StateTransitionRejected => "StateTransitionRejected",
            Self::MissingService => "MissingService",
            Self::FileSystemError => "FileSystemError",
            Self::UrlError => "UrlError",
            Self::TemplateError => "TemplateError",
            Self::Runtime => "RuntimeError",
        };
        f.write_str(s)
    }
}

/// A single execution-core error.
///
/// `message` already has `<var>` placeholders substituted with resolved
/// values by the time it reaches a feature set's caller (see
/// [`AroError::render`]); `statement_text` and provenance fields are filled
/// in by the executor as the error propagates, for the four-line error
/// template in `spec.md` §6.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct AroError {
    pub kind: ErrorKind,
    pub message: ArcStr,
    pub feature_set: Option<ArcStr>,
    pub business_activity: Option<ArcStr>,
    pub statement_text: Option<ArcStr>,
    pub cause: Option<ArcStr>,
}

impl AroError {
    pub fn new(kind: ErrorKind, message: impl Into<ArcStr>) -> Self {
        AroError {
            kind,
            message: message.into(),
            feature_set: None,
            business_activity: None,
            statement_text: None,
            cause: None,
        }
    }

    pub fn unknown_action(verb: &str) -> Self {
        Self::new(ErrorKind::UnknownAction, format!("unknown action `{verb}`"))
    }

    pub fn invalid_preposition(received: &str, expected: &[&str]) -> Self {
        Self::new(
            ErrorKind::InvalidPreposition,
            format!(
                "preposition `{received}` is not valid here, expected one of: {}",
                expected.join(", ")
            ),
        )
    }

    pub fn undefined_variable(name: &str) -> Self {
        Self::new(ErrorKind::UndefinedVariable, format!("undefined variable `{name}`"))
    }

    pub fn undefined_repository(name: &str) -> Self {
        Self::new(ErrorKind::UndefinedRepository, format!("undefined repository `{name}`"))
    }

    pub fn immutable_rebind(name: &str) -> Self {
        Self::new(
            ErrorKind::ImmutableRebind,
            format!("`{name}` is already bound in this scope and cannot be rebound"),
        )
    }

    pub fn type_mismatch(expected: &str, found: &Value) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!("expected {expected}, found {} (`{found}`)", found.type_name()),
        )
    }

    pub fn state_transition_rejected(
        expected_from: &str,
        expected_to: &str,
        actual_state: &str,
        object_name: &str,
        field_name: &str,
    ) -> Self {
        Self::new(
            ErrorKind::StateTransitionRejected,
            format!(
                "cannot transition `{object_name}.{field_name}` from `{expected_from}` to \
                 `{expected_to}`: actual state is `{actual_state}`"
            ),
        )
    }

    pub fn missing_service(name: &str) -> Self {
        Self::new(ErrorKind::MissingService, format!("no service registered for `{name}`"))
    }

    pub fn with_feature_set(mut self, name: impl Into<ArcStr>) -> Self {
        self.feature_set = Some(name.into());
        self
    }

    pub fn with_business_activity(mut self, activity: impl Into<ArcStr>) -> Self {
        self.business_activity = Some(activity.into());
        self
    }

    pub fn with_statement_text(mut self, text: impl Into<ArcStr>) -> Self {
        self.statement_text = Some(text.into());
        self
    }

    pub fn with_cause(mut self, cause: impl fmt::Display) -> Self {
        self.cause = Some(ArcStr::from(cause.to_string()));
        self
    }

    /// Render the four-line human error template from `spec.md` §6.
    pub fn render_human(&self) -> String {
        format!(
            "Runtime Error: {}\nFeature: {}\nBusiness Activity: {}\nStatement: {}",
            self.message,
            self.feature_set.as_deref().unwrap_or("<unknown>"),
            self.business_activity.as_deref().unwrap_or(""),
            self.statement_text.as_deref().unwrap_or("<unknown>"),
        )
    }
}

impl From<anyhow::Error> for AroError {
    fn from(e: anyhow::Error) -> Self {
        AroError::new(ErrorKind::Runtime, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_template_has_four_lines_in_order() {
        let err = AroError::new(ErrorKind::TypeMismatch, "expected int, found string")
            .with_feature_set("Checkout")
            .with_business_activity("Order API")
            .with_statement_text("<Compute the <x> from the <y>.>");
        let lines: Vec<&str> = err.render_human().lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Runtime Error:"));
        assert!(lines[1].starts_with("Feature:"));
        assert!(lines[2].starts_with("Business Activity:"));
        assert!(lines[3].starts_with("Statement:"));
    }
}
