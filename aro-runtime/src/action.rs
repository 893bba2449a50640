//! The action registry and the dispatch protocol between verbs and typed
//! system objects (`spec.md` §4.2).

use crate::context::RuntimeContext;
use aro_ast::{Preposition, Role, StatementDescriptor};
use aro_errors::{AroError, AroResult, ErrorKind};
use aro_repository::RepositoryStore;
use aro_system_objects::SystemObject;
use aro_value::Value;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// What a statement's object resolved to, per dispatch step 4: either an
/// ordinary bound variable, a system-object adapter instance, or the name
/// of a repository (suffix convention: ends in `-repository`). Computed
/// once by the dispatcher so every action implementation shares the same
/// routing decision instead of re-deriving it.
pub enum ObjectResolution {
    Value(Value),
    SystemObject(Arc<dyn SystemObject>),
    Repository(String),
}

impl ObjectResolution {
    /// Convenience for actions that only ever operate on an ordinary
    /// value and treat system objects/repositories as a type error.
    pub fn into_value(self) -> AroResult<Value> {
        match self {
            ObjectResolution::Value(v) => Ok(v),
            ObjectResolution::SystemObject(_) => {
                Err(AroError::new(ErrorKind::TypeMismatch, "expected a value, found a system object"))
            }
            ObjectResolution::Repository(name) => Err(AroError::new(
                ErrorKind::TypeMismatch,
                format!("expected a value, found repository `{name}`"),
            )),
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            ObjectResolution::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// One statement's full dispatch request, handed to [`Action::execute`].
pub struct ActionRequest<'a> {
    pub ctx: &'a Arc<RuntimeContext>,
    pub statement: &'a StatementDescriptor,
    pub object: ObjectResolution,
}

impl<'a> ActionRequest<'a> {
    pub fn specifier(&self, index: usize) -> Option<&str> {
        self.statement.result.specifiers.get(index).map(|s| s.as_str())
    }

    pub fn first_specifier(&self) -> Option<&str> {
        self.statement.result.first_specifier()
    }

    pub fn object_specifiers(&self) -> &[arcstr::ArcStr] {
        &self.statement.object.specifiers
    }
}

/// What happens to an action's return value, per dispatch step 6: most
/// request/own verbs bind it under the statement's result name; response
/// and export verbs act through side effects on the context and bind
/// nothing.
pub enum ActionOutcome {
    Bind(Value),
    NoBind,
}

impl From<Value> for ActionOutcome {
    fn from(v: Value) -> Self {
        ActionOutcome::Bind(v)
    }
}

/// The implementation of one verb family (`spec.md` §4.2). A single
/// `Action` instance may answer to several verb aliases — `compute` and
/// `calculate` both route to the same implementation.
#[async_trait]
pub trait Action: Send + Sync {
    fn role(&self) -> Role;
    fn verbs(&self) -> &'static [&'static str];
    fn valid_prepositions(&self) -> &'static [Preposition];
    async fn execute(&self, request: &ActionRequest<'_>) -> AroResult<ActionOutcome>;
}

/// A process-wide (or engine-scoped) table mapping a lowercase verb to its
/// `Action` (`spec.md` §4.2). Read-mostly: built once at startup by
/// registering every stdlib action, then only read from during dispatch.
#[derive(Default)]
pub struct ActionRegistry {
    by_verb: HashMap<String, Arc<dyn Action>>,
}

/// Resolves a dotted key path against a context's scope chain first,
/// falling back to the global symbol store (`spec.md` §4.5) for the base
/// name when no context binding shadows it. This is how `Retrieve`-style
/// statements see a value an unrelated feature set `Publish`ed: the
/// business-activity visibility rule lives entirely in
/// [`aro_globals::GlobalSymbolStore::resolve`].
fn resolve_value_or_global(ctx: &Arc<RuntimeContext>, key_path: &str) -> AroResult<Value> {
    if let Some(value) = ctx.resolve_path(key_path) {
        return Ok(value);
    }
    let mut segments = key_path.split('.');
    let base = segments.next().ok_or_else(|| AroError::undefined_variable(key_path))?;
    let mut current = ctx
        .env
        .global_store
        .resolve(base, ctx.business_activity.as_str())
        .ok_or_else(|| AroError::undefined_variable(key_path))?;
    for seg in segments {
        current = current.field(seg).cloned().ok_or_else(|| AroError::undefined_variable(key_path))?;
    }
    Ok(current)
}

impl ActionRegistry {
    pub fn new() -> Self {
        ActionRegistry { by_verb: HashMap::new() }
    }

    pub fn register(&mut self, action: Arc<dyn Action>) {
        for verb in action.verbs() {
            self.by_verb.insert(verb.to_ascii_lowercase(), action.clone());
        }
    }

    pub fn lookup(&self, verb: &str) -> Option<Arc<dyn Action>> {
        self.by_verb.get(&verb.to_ascii_lowercase()).cloned()
    }

    /// Resolves a statement's object per dispatch step 4: a system object
    /// if the base names one, a repository if it uses the `-repository`
    /// suffix convention, otherwise an ordinary variable looked up through
    /// the context's scope chain.
    pub fn resolve_object(&self, ctx: &Arc<RuntimeContext>, statement: &StatementDescriptor) -> AroResult<ObjectResolution> {
        let base = statement.object.base.as_str();
        if ctx.env.system_objects.is_system_object(base) {
            let specifiers: Vec<String> = statement.object.specifiers.iter().map(|s| s.to_string()).collect();
            let obj = ctx.env.system_objects.create(base, &specifiers)?;
            return Ok(ObjectResolution::SystemObject(obj));
        }
        if RepositoryStore::is_repository_name(base) {
            return Ok(ObjectResolution::Repository(base.to_string()));
        }
        let key_path = statement.object.key_path();
        let value = resolve_value_or_global(ctx, &key_path)?;
        Ok(ObjectResolution::Value(value))
    }

    /// Runs the full dispatch algorithm in `spec.md` §4.2 for one
    /// statement: verb lookup, preposition validation, role contract
    /// check, object resolution, execution, and result binding.
    pub async fn dispatch(&self, ctx: &Arc<RuntimeContext>, statement: &StatementDescriptor) -> AroResult<Option<Value>> {
        let action = self
            .lookup(statement.verb.as_str())
            .ok_or_else(|| AroError::unknown_action(statement.verb.as_str()))?;

        if !action.valid_prepositions().contains(&statement.object.preposition) {
            let expected: Vec<&str> = action.valid_prepositions().iter().map(|p| p.as_str()).collect();
            return Err(AroError::invalid_preposition(statement.object.preposition.as_str(), &expected));
        }

        if action.role() != statement.role {
            return Err(AroError::new(
                ErrorKind::Runtime,
                format!(
                    "verb `{}` is registered as a {:?}-role action but was used as {:?}",
                    statement.verb, action.role(), statement.role
                ),
            ));
        }

        let object = self.resolve_object(ctx, statement)?;
        let request = ActionRequest { ctx, statement, object };
        let outcome = action.execute(&request).await?;

        match outcome {
            ActionOutcome::Bind(value) => {
                ctx.bind(statement.result.base.as_str(), value.clone())?;
                Ok(Some(value))
            }
            ActionOutcome::NoBind => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Environment, OutputContext};
    use aro_ast::{ObjectDescriptor, ResultDescriptor, Span};
    use aro_system_objects::SystemObjectRegistry;

    struct Echo;

    #[async_trait]
    impl Action for Echo {
        fn role(&self) -> Role {
            Role::Own
        }

        fn verbs(&self) -> &'static [&'static str] {
            &["echo"]
        }

        fn valid_prepositions(&self) -> &'static [Preposition] {
            &[Preposition::From]
        }

        async fn execute(&self, request: &ActionRequest<'_>) -> AroResult<ActionOutcome> {
            Ok(request.object.as_value().cloned().unwrap_or(Value::Null).into())
        }
    }

    fn statement(verb: &str, result: &str, object_base: &str) -> StatementDescriptor {
        StatementDescriptor {
            verb: verb.into(),
            role: Role::Own,
            result: ResultDescriptor::new(result, vec![], Span::default()),
            object: ObjectDescriptor::new(Preposition::From, object_base, vec![], Span::default()),
            condition: None,
            filter: None,
            span: Span::default(),
            source_text: format!("<{verb} the <{result}> from the <{object_base}>.>").into(),
        }
    }

    #[tokio::test]
    async fn dispatch_resolves_binds_and_rejects_unknown_verbs() {
        let env = Environment::new(Arc::new(SystemObjectRegistry::new()));
        let ctx = RuntimeContext::root("Test", "", OutputContext::Human, env);
        ctx.bind("source", Value::string("hi")).unwrap();

        let mut registry = ActionRegistry::new();
        registry.register(Arc::new(Echo));

        let out = registry.dispatch(&ctx, &statement("echo", "copy", "source")).await.unwrap();
        assert_eq!(out, Some(Value::string("hi")));
        assert_eq!(ctx.resolve("copy"), Some(Value::string("hi")));

        let err = registry.dispatch(&ctx, &statement("vanish", "x", "source")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownAction);
    }

    #[tokio::test]
    async fn invalid_preposition_is_rejected() {
        let env = Environment::new(Arc::new(SystemObjectRegistry::new()));
        let ctx = RuntimeContext::root("Test", "", OutputContext::Human, env);
        ctx.bind("source", Value::string("hi")).unwrap();
        let mut registry = ActionRegistry::new();
        registry.register(Arc::new(Echo));

        let mut bad = statement("echo", "copy", "source");
        bad.object.preposition = Preposition::To;
        let err = registry.dispatch(&ctx, &bad).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidPreposition);
    }
}
