//! The composition root (`SPEC_FULL.md`'s "Supplemental features" section):
//! owns every engine-wide resource, registers the stdlib actions, and
//! exposes the entry points an external CLI/REPL/HTTP front end calls.

use crate::config::EngineConfig;
use crate::executor::FeatureSetExecutor;
use aro_ast::AnalyzedFeatureSet;
use aro_errors::AroResult;
use aro_events::{Event, StateGuardSet};
use aro_repository::RepositoryStore;
use aro_runtime::{ActionRegistry, Environment, OutputContext, Response, RuntimeContext};
use aro_shutdown::{ShutdownCoordinator, ShutdownInfo};
use aro_system_objects::{
    ConsoleObject, EnvObject, Factory, FieldObject, FileObject, HeadersObject, ParameterObject, ParameterStore,
    ShutdownObject, StderrObject, StdinObject, SystemObject, SystemObjectRegistry, UrlObject,
};
use aro_value::{Value, ValueMap};
use arcstr::ArcStr;
use compact_str::CompactString;
use std::sync::Arc;

/// Owns the `ActionRegistry`, `EventBus`, `GlobalSymbolStore`,
/// `RepositoryStore`, `SystemObjectRegistry`, and `ShutdownCoordinator` for
/// one running program (`spec.md` §9's "engine-scoped structs, not
/// singletons" note). Every field a statement's dispatch needs is reachable
/// through `env`; the rest of this struct is wiring and lifecycle.
pub struct Engine {
    pub config: Arc<EngineConfig>,
    pub env: Arc<Environment>,
    pub shutdown: Arc<ShutdownCoordinator>,
    pub parameters: Arc<ParameterStore>,
    action_registry: Arc<ActionRegistry>,
    executor: Arc<FeatureSetExecutor>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Arc<Self> {
        let config = Arc::new(config);
        let shutdown = ShutdownCoordinator::new();
        let parameters = ParameterStore::new();
        let system_objects = Arc::new(Self::default_system_objects(&config, &shutdown, &parameters));
        let env = Environment::new(system_objects);

        let mut registry = ActionRegistry::new();
        aro_actions_core::register_all(&mut registry);
        aro_actions_data::register_all(&mut registry);
        aro_actions_io::register_all(&mut registry);
        aro_actions_state::register_all(&mut registry);
        let action_registry = Arc::new(registry);

        let executor = Arc::new(FeatureSetExecutor::new(action_registry.clone(), config.clone()));

        Arc::new(Engine { config, env, shutdown, parameters, action_registry, executor })
    }

    /// The built-in system objects every engine registers (`spec.md` §4.9):
    /// `console`, `stderr`, `stdin`, `env`, `file`, `url`, `shutdown`,
    /// `parameter`. Request/event/socket-scoped objects (`request`,
    /// `pathParameters`, `event`, ...) are layered in per-invocation via
    /// [`aro_system_objects::SystemObjectRegistry::overlay`] instead, since
    /// they only exist for the duration of one handler call.
    fn default_system_objects(
        config: &Arc<EngineConfig>,
        shutdown: &Arc<ShutdownCoordinator>,
        parameters: &Arc<ParameterStore>,
    ) -> SystemObjectRegistry {
        let mut registry = SystemObjectRegistry::new();

        registry.register(
            "console",
            Arc::new(|specs: &[String]| Ok(Arc::new(ConsoleObject::new(specs)) as Arc<dyn SystemObject>)),
        );
        registry.register("stderr", Arc::new(|_: &[String]| Ok(Arc::new(StderrObject) as Arc<dyn SystemObject>)));
        registry.register("stdin", Arc::new(|_: &[String]| Ok(Arc::new(StdinObject) as Arc<dyn SystemObject>)));
        registry.register("env", Arc::new(|_: &[String]| Ok(Arc::new(EnvObject) as Arc<dyn SystemObject>)));
        registry.register(
            "file",
            Arc::new(|specs: &[String]| Ok(Arc::new(FileObject::new(specs)?) as Arc<dyn SystemObject>)),
        );

        let url_timeout = config.url_timeout;
        registry.register(
            "url",
            Arc::new(move |specs: &[String]| Ok(Arc::new(UrlObject::with_timeout(specs, url_timeout)?) as Arc<dyn SystemObject>)),
        );

        let shutdown_for_factory = shutdown.clone();
        registry.register(
            "shutdown",
            Arc::new(move |_: &[String]| Ok(Arc::new(ShutdownObject::new(shutdown_for_factory.clone())) as Arc<dyn SystemObject>)),
        );

        let parameters_for_factory = parameters.clone();
        registry.register(
            "parameter",
            Arc::new(move |_: &[String]| Ok(Arc::new(ParameterObject::new(parameters_for_factory.clone())) as Arc<dyn SystemObject>)),
        );

        registry
    }

    pub fn action_registry(&self) -> &Arc<ActionRegistry> {
        &self.action_registry
    }

    pub fn repository_store(&self) -> &Arc<RepositoryStore> {
        &self.env.repository_store
    }

    /// Runs one feature set from a fresh root context. The building block
    /// every other entry point below is written in terms of.
    pub async fn run_feature_set(&self, feature_set: &AnalyzedFeatureSet, output_context: OutputContext) -> AroResult<Response> {
        let ctx = RuntimeContext::root(
            feature_set.name.clone(),
            feature_set.business_activity.clone(),
            output_context,
            self.env.clone(),
        );
        self.executor.run(feature_set, &ctx).await
    }

    /// Runs a whole analyzed program: subscribes every declarative handler
    /// feature set, then drives the `Application-Start` / `Application-End`
    /// lifecycle in `spec.md` §6, §4.10 and §7 ("an error in
    /// `Application-Start` becomes an `Application-End: Error` trigger at
    /// process scope"). Returns the `Application-Start` result (or a
    /// default `OK` if the program has no `Application-Start` at all, e.g.
    /// a program that is purely event/HTTP-driven).
    pub async fn run_program(self: &Arc<Self>, feature_sets: &[AnalyzedFeatureSet]) -> AroResult<Response> {
        self.subscribe_handlers(feature_sets);

        let Some(start) = feature_sets.iter().find(|fs| fs.is_application_start()) else {
            return Ok(Response::ok(ValueMap::new()));
        };

        let result = self.run_feature_set(start, OutputContext::Machine).await;

        match &result {
            Ok(_) => {
                if let Some(end) = feature_sets.iter().find(|fs| fs.is_application_end_success()) {
                    if let Err(e) = self.run_feature_set(end, OutputContext::Machine).await {
                        log::error!("Application-End: Success feature set failed: {}", e.render_human());
                    }
                }
            }
            Err(e) => {
                log::error!("{}", e.render_human());
                self.shutdown.signal_shutdown(ShutdownInfo::error(e.message.to_string()));
                if let Some(end) = feature_sets.iter().find(|fs| fs.is_application_end_error()) {
                    if let Err(inner) = self.run_feature_set(end, OutputContext::Machine).await {
                        log::error!("Application-End: Error feature set failed: {}", inner.render_human());
                    }
                }
            }
        }
        result
    }

    /// Subscribes every `<EventType> Handler<guards>` feature set
    /// (`spec.md` §4.4, §6) to the event bus. Delivery is synchronous per
    /// [`aro_events::EventBus::subscribe`] — preserving "handlers run in
    /// subscription order" for the moment each handler *starts* — but the
    /// handler's own feature-set body runs on a spawned task so a slow
    /// handler never blocks the emitter or its sibling handlers.
    fn subscribe_handlers(self: &Arc<Self>, feature_sets: &[AnalyzedFeatureSet]) {
        for feature_set in feature_sets {
            let Some(handler) = &feature_set.handler else { continue };
            let guard_set = StateGuardSet::parse(&handler.guard_source);
            let event_type = handler.event_type.clone();
            let engine = self.clone();
            let owned_feature_set = Arc::new(feature_set.clone());

            self.env.event_bus.subscribe(
                event_type,
                Arc::new(move |event: &Event| {
                    if !guard_set.all_match(event) {
                        return;
                    }
                    let engine = engine.clone();
                    let feature_set = owned_feature_set.clone();
                    let event = event.clone();
                    tokio::spawn(async move {
                        if let Err(e) = engine.run_handler(&feature_set, event).await {
                            log::error!("{}", e.render_human());
                        }
                    });
                }),
            );
        }
    }

    /// Runs a handler feature set triggered by `event`, with an `event`
    /// system object overlaid for the duration of the call (`spec.md`
    /// §4.9). Uses [`Environment::with_system_objects`] rather than
    /// mutating `self.env` so concurrently-running handlers never see each
    /// other's event.
    async fn run_handler(&self, feature_set: &AnalyzedFeatureSet, event: Event) -> AroResult<Response> {
        let overlay = self.env.system_objects.overlay([(
            "event".to_string(),
            event_factory(event),
        )]);
        let env = self.env.with_system_objects(Arc::new(overlay));
        let ctx = RuntimeContext::root(feature_set.name.clone(), feature_set.business_activity.clone(), OutputContext::Machine, env);
        self.executor.run(feature_set, &ctx).await
    }

    /// Runs an `HTTP <method> <path>` feature set for one inbound request
    /// (`spec.md` §4.9, §6): overlays `request`/`pathParameters`/
    /// `queryParameters`/`body`/`headers` system objects scoped to this call
    /// only, then converts a propagated error into a 5xx-shaped `Response`
    /// rather than letting it escape — the transport layer this core hands
    /// off to has no other way to observe what went wrong.
    pub async fn run_http_feature_set(
        &self,
        feature_set: &AnalyzedFeatureSet,
        request: Value,
        path_parameters: Value,
        query_parameters: Value,
        headers: Value,
        body: Value,
        output_context: OutputContext,
    ) -> Response {
        let overlay = self.env.system_objects.overlay([
            ("request".to_string(), field_factory(request)),
            ("pathParameters".to_string(), field_factory(path_parameters)),
            ("queryParameters".to_string(), field_factory(query_parameters)),
            ("body".to_string(), field_factory(body)),
            ("headers".to_string(), headers_factory(headers)),
        ]);
        let env = self.env.with_system_objects(Arc::new(overlay));
        let ctx = RuntimeContext::root(feature_set.name.clone(), feature_set.business_activity.clone(), output_context, env);
        match self.executor.run(feature_set, &ctx).await {
            Ok(response) => response,
            Err(e) => Self::error_response(&e, output_context),
        }
    }

    /// Renders a propagated `AroError` as a `Response`, per `spec.md` §7:
    /// the four-line human template in a `message` field for
    /// `OutputContext::Human`, a structured envelope otherwise. Callers
    /// that need an actual HTTP status code map `response.status` to one
    /// themselves — this core has no opinion on transport-level codes.
    pub fn error_response(error: &aro_errors::AroError, output_context: OutputContext) -> Response {
        let mut data = ValueMap::new();
        match output_context {
            OutputContext::Human => {
                data.insert(CompactString::from("message"), Value::string(error.render_human()));
            }
            OutputContext::Machine | OutputContext::Developer => {
                data.insert(CompactString::from("kind"), Value::string(error.kind.to_string()));
                data.insert(CompactString::from("message"), Value::string(error.message.to_string()));
                if let Some(fs) = &error.feature_set {
                    data.insert(CompactString::from("featureSet"), Value::string(fs.to_string()));
                }
                if let Some(activity) = &error.business_activity {
                    data.insert(CompactString::from("businessActivity"), Value::string(activity.to_string()));
                }
                if let Some(statement) = &error.statement_text {
                    data.insert(CompactString::from("statement"), Value::string(statement.to_string()));
                }
            }
        }
        Response { status: ArcStr::from("Error"), reason: Some(ArcStr::from(error.kind.to_string())), data }
    }
}

fn event_factory(event: Event) -> Factory {
    Arc::new(move |_: &[String]| Ok(Arc::new(aro_system_objects::EventObject::new(event.clone())) as Arc<dyn SystemObject>))
}

fn field_factory(data: Value) -> Factory {
    Arc::new(move |_: &[String]| Ok(Arc::new(FieldObject::new(data.clone())) as Arc<dyn SystemObject>))
}

fn headers_factory(data: Value) -> Factory {
    Arc::new(move |_: &[String]| Ok(Arc::new(HeadersObject::new(data.clone())) as Arc<dyn SystemObject>))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aro_ast::{ObjectDescriptor, Preposition, ResultDescriptor, Role, Span, Statement, StatementDescriptor};

    fn compute_length(binding: &str, source: &str) -> Statement {
        Statement::Action(StatementDescriptor {
            verb: "compute".into(),
            role: Role::Own,
            result: ResultDescriptor::new(binding, vec!["length".into()], Span::default()),
            object: ObjectDescriptor::new(Preposition::From, source, vec![], Span::default()),
            condition: None,
            filter: None,
            span: Span::default(),
            source_text: format!("<Compute the <{binding}: length> from the <{source}>.>").into(),
        })
    }

    fn read_parameters_as_payload() -> Statement {
        Statement::Action(StatementDescriptor {
            verb: "read".into(),
            role: Role::Request,
            result: ResultDescriptor::new("payload", vec![], Span::default()),
            object: ObjectDescriptor::new(Preposition::From, "parameter", vec![], Span::default()),
            condition: None,
            filter: None,
            span: Span::default(),
            source_text: "<Read the <payload> from the <parameter>.>".into(),
        })
    }

    fn return_ok() -> Statement {
        Statement::Action(StatementDescriptor {
            verb: "return".into(),
            role: Role::Response,
            result: ResultDescriptor::new("response", vec![], Span::default()),
            object: ObjectDescriptor::new(Preposition::With, "payload", vec![], Span::default()),
            condition: None,
            filter: None,
            span: Span::default(),
            source_text: "<Return the <response> with the <payload>.>".into(),
        })
    }

    #[tokio::test]
    async fn engine_registers_stdlib_actions_and_dispatches_them() {
        let engine = Engine::new(EngineConfig::default());
        let mut feature_set = AnalyzedFeatureSet::new("Greeting", "Demo API");
        feature_set.statements.push(compute_length("len", "text"));

        let ctx = RuntimeContext::root("Greeting", "Demo API", OutputContext::Human, engine.env.clone());
        ctx.bind("text", Value::string("Hello World")).unwrap();
        let response = engine.executor.run(&feature_set, &ctx).await.unwrap();
        assert_eq!(response.status.as_str(), "OK");
        assert_eq!(ctx.resolve("len"), Some(Value::Int(11)));
    }

    #[tokio::test]
    async fn run_program_runs_application_start_and_application_end_success() {
        let engine = Engine::new(EngineConfig::default());

        let mut start = AnalyzedFeatureSet::new("Application-Start", "");
        start.statements.push(read_parameters_as_payload());
        start.statements.push(return_ok());

        let mut end_success = AnalyzedFeatureSet::new("Application-End: Success", "");
        end_success.statements.push(read_parameters_as_payload());
        end_success.statements.push(Statement::Action(StatementDescriptor {
            verb: "publish".into(),
            role: Role::Export,
            result: ResultDescriptor::new("startedUp", vec![], Span::default()),
            object: ObjectDescriptor::new(Preposition::With, "payload", vec![], Span::default()),
            condition: None,
            filter: None,
            span: Span::default(),
            source_text: "<Publish the <startedUp> with the <payload>.>".into(),
        }));

        let programs = [start, end_success];
        let response = engine.run_program(&programs).await.unwrap();
        assert_eq!(response.status.as_str(), "OK");
    }

    #[test]
    fn error_response_uses_four_line_template_for_human_output() {
        let error = aro_errors::AroError::unknown_action("vanish")
            .with_feature_set("Checkout")
            .with_business_activity("Order API")
            .with_statement_text("<Vanish the <x> from the <y>.>");
        let response = Engine::error_response(&error, OutputContext::Human);
        assert_eq!(response.status.as_str(), "Error");
        let message = response.data.get("message").unwrap().to_string();
        assert!(message.starts_with("Runtime Error:"));
    }
}
