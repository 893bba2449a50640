//! Sequences one feature set's statements against the dispatch protocol
//! (`spec.md` §4.3): per-statement guards, `for-each`/`match` control flow,
//! the conservative parallel-I/O batching mode, and the
//! `featureset.start`/`featureset.end` lifecycle events.

use crate::config::EngineConfig;
use aro_ast::{AnalyzedFeatureSet, Condition, ForEachBlock, MatchBlock, Role, Statement, StatementDescriptor};
use aro_errors::{AroError, AroResult};
use aro_events::Event;
use aro_runtime::{ActionRegistry, Response, RuntimeContext};
use aro_value::Value;
use std::sync::Arc;

/// Walks a `when`-guard against a context's bindings. `spec.md` §4.3: a
/// guard that names an unbound variable is simply false, never an error —
/// the same leniency `Event::field` already extends to missing payload
/// paths.
pub fn evaluate_condition(ctx: &Arc<RuntimeContext>, condition: &Condition) -> bool {
    match condition {
        Condition::Truthy(path) => ctx.resolve_path(path).map(|v| v.truthy()).unwrap_or(false),
        Condition::Equals(path, expected) => ctx.resolve_path(path).map(|v| &v == expected).unwrap_or(false),
        Condition::Not(inner) => !evaluate_condition(ctx, inner),
        Condition::And(clauses) => clauses.iter().all(|c| evaluate_condition(ctx, c)),
        Condition::Or(clauses) => clauses.iter().any(|c| evaluate_condition(ctx, c)),
    }
}

/// Statements whose verb role never carries an observable side effect and
/// is inherently I/O/fetch-shaped are the only ones eligible for the
/// parallel-I/O batching mode (`spec.md` §4.3, an Open Question `spec.md`
/// §9 leaves to the implementation). `Role::Request` is exactly that set:
/// `Log`, `Broadcast`, `Return`, `Throw` and `Publish` are all
/// `Response`/`Export`-role and therefore structurally excluded, so the
/// "side effects keep their written order" requirement holds without this
/// function having to know about any specific verb.
fn is_batchable(statement: &Statement) -> bool {
    matches!(statement, Statement::Action(desc) if desc.role == Role::Request && desc.condition.is_none())
}

/// True if statement `b`'s object could observe a write statement `a`
/// made — i.e. `a`'s result name is a prefix of (or equal to) `b`'s object
/// base. Conservative on purpose: a false positive here only costs a
/// missed batching opportunity, never incorrect ordering. One-directional
/// by itself — see [`conflicts`], which is what callers should use.
fn writes_before_read(a: &StatementDescriptor, b: &StatementDescriptor) -> bool {
    a.result.base == b.object.base
}

/// Whether two statements dispatched in the same batch could observe each
/// other's write: `a` reading what `b` writes, or `b` reading what `a`
/// writes. Batched statements run concurrently via `join_all`, with no
/// guarantee about which finishes first, so the read/write relation is
/// symmetric — checking only one direction would let a later statement's
/// write race an earlier statement's read of that same name.
fn conflicts(a: &StatementDescriptor, b: &StatementDescriptor) -> bool {
    writes_before_read(a, b) || writes_before_read(b, a)
}

/// Sequences a feature set's statements against the shared dispatch
/// registry. One executor instance is cheap to construct and safe to share
/// across concurrently-running feature sets: it holds no mutable state of
/// its own, only `Arc` handles into engine-wide ones.
pub struct FeatureSetExecutor {
    registry: Arc<ActionRegistry>,
    config: Arc<EngineConfig>,
}

impl FeatureSetExecutor {
    pub fn new(registry: Arc<ActionRegistry>, config: Arc<EngineConfig>) -> Self {
        FeatureSetExecutor { registry, config }
    }

    /// Runs one feature set to completion against `ctx`, per the lifecycle
    /// in `spec.md` §4.3: `featureset.start`, then statements in order
    /// (`Return` halts the remainder), then `featureset.end` — delivered
    /// synchronously, so any handler subscribed to it observes the final
    /// context state before this call returns — then the response, or a
    /// default `OK` if no statement ever set one.
    pub async fn run(&self, feature_set: &AnalyzedFeatureSet, ctx: &Arc<RuntimeContext>) -> AroResult<Response> {
        ctx.env
            .event_bus
            .emit(Event::new("featureset.start").with_field("name", Value::string(feature_set.name.as_str())));

        let result = self.run_statements(&feature_set.statements, ctx).await;

        ctx.env
            .event_bus
            .emit(Event::new("featureset.end").with_field("name", Value::string(feature_set.name.as_str())));

        result?;
        Ok(ctx.get_response().unwrap_or_else(|| Response::ok(Default::default())))
    }

    /// Runs a statement sequence — a feature set's top level, or a
    /// `for-each`/`match` arm's body. Stops as soon as a `Return` (or any
    /// earlier-established response) has fired, leaving later statements
    /// unexecuted.
    async fn run_statements(&self, statements: &[Statement], ctx: &Arc<RuntimeContext>) -> AroResult<()> {
        let mut i = 0;
        while i < statements.len() {
            if ctx.has_response() {
                return Ok(());
            }
            if self.config.enable_parallel_io {
                let batch_len = batchable_run_length(&statements[i..]);
                if batch_len > 1 {
                    self.run_batch(&statements[i..i + batch_len], ctx).await?;
                    i += batch_len;
                    continue;
                }
            }
            self.run_one(&statements[i], ctx).await?;
            i += 1;
        }
        Ok(())
    }

    /// Runs a batch of adjacent, conflict-free `Request`-role statements
    /// concurrently. Each gets dispatched on its own, then results are
    /// bound back in source order so a later statement's resolution sees a
    /// deterministic state no matter which dispatch actually finished
    /// first.
    async fn run_batch(&self, statements: &[Statement], ctx: &Arc<RuntimeContext>) -> AroResult<()> {
        let futures = statements.iter().map(|s| {
            let Statement::Action(desc) = s else { unreachable!("batch only ever contains Action statements") };
            self.registry.dispatch(ctx, desc)
        });
        let results = futures::future::join_all(futures).await;
        for (statement, result) in statements.iter().zip(results) {
            let Statement::Action(desc) = statement else { unreachable!() };
            result.map_err(|e| annotate(e, ctx, desc))?;
        }
        Ok(())
    }

    async fn run_one(&self, statement: &Statement, ctx: &Arc<RuntimeContext>) -> AroResult<()> {
        match statement {
            Statement::Action(desc) => self.run_action(desc, ctx).await,
            Statement::ForEach(block) => self.run_for_each(block, ctx).await,
            Statement::Match(block) => self.run_match(block, ctx).await,
        }
    }

    async fn run_action(&self, desc: &StatementDescriptor, ctx: &Arc<RuntimeContext>) -> AroResult<()> {
        if let Some(condition) = &desc.condition {
            if !evaluate_condition(ctx, condition) {
                return Ok(());
            }
        }
        self.registry.dispatch(ctx, desc).await.map(|_| ()).map_err(|e| annotate(e, ctx, desc))
    }

    /// `spec.md` §4.3's `for-each`: one child context per element, each
    /// seeded with `binding` bound to that element. A `Return` inside the
    /// loop body propagates up and ends the loop immediately, same as it
    /// would for a top-level statement sequence.
    async fn run_for_each(&self, block: &ForEachBlock, ctx: &Arc<RuntimeContext>) -> AroResult<()> {
        let key_path = block.source.key_path();
        let source = ctx.resolve_path(&key_path).ok_or_else(|| AroError::undefined_variable(&key_path))?;

        match source {
            Value::List(items) => {
                for item in items.iter() {
                    if self.run_for_each_iteration(block, ctx, item.clone()).await? {
                        break;
                    }
                }
            }
            Value::Stream(stream_id) => {
                let Some(producer) = ctx.env.stream_registry.get(stream_id) else {
                    return Err(AroError::undefined_variable(&key_path));
                };
                while let Some(item) = producer.next().await? {
                    if self.run_for_each_iteration(block, ctx, item).await? {
                        break;
                    }
                }
            }
            other => return Err(AroError::type_mismatch("list or stream", &other)),
        }
        Ok(())
    }

    /// Runs one loop body over `item`; returns whether the loop should stop
    /// (a `Return` fired and its response has been propagated to `ctx`).
    async fn run_for_each_iteration(&self, block: &ForEachBlock, ctx: &Arc<RuntimeContext>, item: Value) -> AroResult<bool> {
        let child = ctx.create_child(ctx.feature_set_name.clone());
        child.bind(block.binding.as_str(), item)?;
        self.run_statements(&block.body, &child).await?;
        if let Some(response) = child.get_response() {
            ctx.set_response(response);
            return Ok(true);
        }
        Ok(false)
    }

    /// `spec.md` §4.3's `match`: the first arm whose guard evaluates true
    /// runs its body in a child context; later arms are never evaluated.
    /// No arm matching is not an error — it's simply a no-op, the same as
    /// a guarded statement whose condition is false.
    async fn run_match(&self, block: &MatchBlock, ctx: &Arc<RuntimeContext>) -> AroResult<()> {
        for arm in &block.arms {
            if evaluate_condition(ctx, &arm.guard) {
                let child = ctx.create_child(ctx.feature_set_name.clone());
                self.run_statements(&arm.body, &child).await?;
                if let Some(response) = child.get_response() {
                    ctx.set_response(response);
                }
                return Ok(());
            }
        }
        Ok(())
    }
}

fn annotate(error: AroError, ctx: &Arc<RuntimeContext>, statement: &StatementDescriptor) -> AroError {
    error
        .with_feature_set(ctx.feature_set_name.clone())
        .with_business_activity(ctx.business_activity.clone())
        .with_statement_text(statement.source_text.clone())
}

/// How many statements starting at `statements[0]` can run as one
/// conflict-free batch: a maximal run of `is_batchable` statements with no
/// two members' read/write sets intersecting in either direction
/// (`spec.md` §4.3: "two statements may run in parallel iff neither reads
/// a name the other binds").
fn batchable_run_length(statements: &[Statement]) -> usize {
    let mut run = Vec::new();
    for statement in statements {
        if !is_batchable(statement) {
            break;
        }
        let Statement::Action(desc) = statement else { unreachable!() };
        let has_conflict = run.iter().any(|earlier: &&StatementDescriptor| conflicts(earlier, desc));
        if has_conflict {
            break;
        }
        run.push(desc);
    }
    run.len()
}
