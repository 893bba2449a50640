//! Shared statement-builder helpers for the scenario/boundary/invariant
//! tests. Kept deliberately terse — a handwritten AST is the only input an
//! analyzer-free test harness has.

use aro_ast::{Condition, ObjectDescriptor, Preposition, ResultDescriptor, Role, Span, Statement, StatementDescriptor};
use aro_engine::{Engine, EngineConfig};
use std::sync::Arc;

pub fn engine() -> Arc<Engine> {
    Engine::new(EngineConfig::default())
}

pub fn engine_with(config: EngineConfig) -> Arc<Engine> {
    Engine::new(config)
}

#[allow(clippy::too_many_arguments)]
pub fn statement(
    verb: &str,
    role: Role,
    result_base: &str,
    result_specifiers: Vec<&str>,
    preposition: Preposition,
    object_base: &str,
    object_specifiers: Vec<&str>,
    condition: Option<Condition>,
    source_text: &str,
) -> Statement {
    statement_with_filter(
        verb,
        role,
        result_base,
        result_specifiers,
        preposition,
        object_base,
        object_specifiers,
        condition,
        None,
        source_text,
    )
}

/// Like [`statement`], but also sets the repository `where`-filter
/// (`StatementDescriptor::filter`) independently of the `when`-guard
/// (`condition`) — the two are separate AST slots precisely so a
/// `Retrieve`/`Delete` can carry both at once.
#[allow(clippy::too_many_arguments)]
pub fn statement_with_filter(
    verb: &str,
    role: Role,
    result_base: &str,
    result_specifiers: Vec<&str>,
    preposition: Preposition,
    object_base: &str,
    object_specifiers: Vec<&str>,
    condition: Option<Condition>,
    filter: Option<Condition>,
    source_text: &str,
) -> Statement {
    Statement::Action(StatementDescriptor {
        verb: verb.into(),
        role,
        result: ResultDescriptor::new(result_base, result_specifiers.into_iter().map(Into::into).collect(), Span::default()),
        object: ObjectDescriptor::new(preposition, object_base, object_specifiers.into_iter().map(Into::into).collect(), Span::default()),
        condition,
        filter,
        span: Span::default(),
        source_text: source_text.into(),
    })
}

/// `<Compute the <result: length> from the <object>.>`
pub fn compute_length(result: &str, object: &str) -> Statement {
    statement(
        "compute",
        Role::Own,
        result,
        vec!["length"],
        Preposition::From,
        object,
        vec![],
        None,
        &format!("<Compute the <{result}: length> from the <{object}>.>"),
    )
}

/// `<Validate the <result: rule> for the <object>.>`
pub fn validate(result: &str, rule: &str, object: &str) -> Statement {
    statement(
        "validate",
        Role::Own,
        result,
        vec![rule],
        Preposition::For,
        object,
        vec![],
        None,
        &format!("<Validate the <{result}: {rule}> for the <{object}>.>"),
    )
}

/// `<Publish the <result> with the <object>.>`
pub fn publish(result: &str, object: &str) -> Statement {
    statement(
        "publish",
        Role::Export,
        result,
        vec![],
        Preposition::With,
        object,
        vec![],
        None,
        &format!("<Publish the <{result}> with the <{object}>.>"),
    )
}

/// `<Retrieve the <result> from the <object>.>`
pub fn retrieve(result: &str, object: &str) -> Statement {
    statement(
        "retrieve",
        Role::Request,
        result,
        vec![],
        Preposition::From,
        object,
        vec![],
        None,
        &format!("<Retrieve the <{result}> from the <{object}>.>"),
    )
}

/// `<Retrieve the <result> from the <object> where field=value.>` — a
/// repository retrieval carrying a `where`-filter, distinct from any
/// `when`-guard on the statement itself.
pub fn retrieve_where(result: &str, object: &str, field: &str, value: aro_value::Value) -> Statement {
    statement_with_filter(
        "retrieve",
        Role::Request,
        result,
        vec![],
        Preposition::From,
        object,
        vec![],
        None,
        Some(Condition::equals(field, value)),
        &format!("<Retrieve the <{result}> from the <{object}> where {field}=...>"),
    )
}

/// `<Accept the <transition: FROM_to_TO> on the <object: field>.>`
pub fn accept(transition: &str, object: &str, field: &str) -> Statement {
    statement(
        "accept",
        Role::Own,
        "transition",
        vec![transition],
        Preposition::On,
        object,
        vec![field],
        None,
        &format!("<Accept the <transition: {transition}> on the <{object}: {field}>.>"),
    )
}

/// `<Return the <response> with the <object>.>`
pub fn return_with(object: &str) -> Statement {
    statement(
        "return",
        Role::Response,
        "response",
        vec![],
        Preposition::With,
        object,
        vec![],
        None,
        &format!("<Return the <response> with the <{object}>.>"),
    )
}
