//! Boundary behaviors called out in `spec.md` §8 that span more than one
//! crate, so don't fit naturally as a unit test alongside a single module.

mod support;

use aro_ast::AnalyzedFeatureSet;
use aro_engine::FeatureSetExecutor;
use aro_errors::ErrorKind;
use aro_runtime::{Environment, OutputContext, RuntimeContext};
use aro_system_objects::SystemObjectRegistry;
use aro_value::Value;
use std::sync::Arc;
use support::*;

#[tokio::test]
async fn csv_line_with_embedded_quoted_comma_parses_as_one_field() {
    use aro_streaming::{collect_arc, from_csv, CsvConfig};
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "name,note").unwrap();
    writeln!(file, "Alice,\"Hello, world\"").unwrap();

    let source = from_csv(file.path(), CsvConfig::default());
    let rows = collect_arc(&source).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].field("note"), Some(&Value::string("Hello, world")));
}

#[tokio::test]
async fn empty_feature_set_produces_default_ok() {
    let engine = engine();
    let fs = AnalyzedFeatureSet::new("DoNothing", "");
    let ctx = RuntimeContext::root("DoNothing", "", OutputContext::Human, engine.env.clone());
    let executor = FeatureSetExecutor::new(engine.action_registry().clone(), engine.config.clone());
    let response = executor.run(&fs, &ctx).await.unwrap();
    assert_eq!(response.status.as_str(), "OK");
    assert!(response.data.is_empty());
}

#[test]
fn child_context_cannot_see_a_parent_rebind_after_the_child_was_created() {
    let env = Environment::new(Arc::new(SystemObjectRegistry::new()));
    let parent = RuntimeContext::root("Parent", "", OutputContext::Human, env);
    parent.bind("y", Value::Int(10)).unwrap();
    let child = parent.create_child("Child");

    assert_eq!(child.resolve("y"), Some(Value::Int(10)));
    assert!(parent.bind("y", Value::Int(99)).is_err());
    assert_eq!(child.resolve("y"), Some(Value::Int(10)));
    assert_eq!(parent.resolve("y"), Some(Value::Int(10)));
}

#[tokio::test]
async fn ring_buffer_blocks_producer_until_slow_consumer_makes_room() {
    use aro_streaming::RingBuffer;
    use std::time::Duration;

    let buffer = RingBuffer::new(2);
    let c0 = buffer.register_consumer();

    buffer.produce(Value::Int(1)).await;
    buffer.produce(Value::Int(2)).await;
    assert!(buffer.is_available(0));
    assert!(buffer.is_available(1));

    let producer = {
        let buffer = buffer.clone();
        tokio::spawn(async move {
            buffer.produce(Value::Int(3)).await;
        })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!producer.is_finished(), "producer should still be blocked: buffer is at capacity");

    let drained = buffer.element_at(c0, 0).await.unwrap();
    assert_eq!(drained, Some(Value::Int(1)));

    producer.await.unwrap();
    assert!(buffer.is_available(2));
}

#[tokio::test]
async fn unknown_action_reports_its_kind_even_when_its_object_is_unbound() {
    let engine = engine();
    let ctx = RuntimeContext::root("S", "", OutputContext::Human, engine.env.clone());
    let statement = statement(
        "vanish",
        aro_ast::Role::Own,
        "x",
        vec![],
        aro_ast::Preposition::From,
        "y",
        vec![],
        None,
        "<Vanish the <x> from the <y>.>",
    );
    let aro_ast::Statement::Action(desc) = &statement else { unreachable!() };
    let err = engine.action_registry().dispatch(&ctx, desc).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownAction);
}

/// A repository `where`-filter and a statement's `when`-guard name
/// different things (a record field vs. a context variable) and must not
/// share one AST slot. Driving this through `FeatureSetExecutor::run`
/// (rather than `dispatch` directly, as the repository action tests do) is
/// the regression: `run_action` evaluates `condition` against context
/// bindings to decide whether to dispatch at all, so a where-filter that
/// leaked into that same field would see an unbound `status` variable and
/// silently skip the whole statement.
#[tokio::test]
async fn retrieve_where_filter_and_when_guard_are_independent() {
    let engine = engine();
    let ctx = RuntimeContext::root("ListPlacedOrders", "orders", OutputContext::Human, engine.env.clone());
    ctx.env.repository_store.store(
        Value::map([
            (compact_str::CompactString::from("id"), Value::string("1")),
            (compact_str::CompactString::from("status"), Value::string("placed")),
        ]),
        "orders-repository",
        "orders",
    );
    ctx.env.repository_store.store(
        Value::map([
            (compact_str::CompactString::from("id"), Value::string("2")),
            (compact_str::CompactString::from("status"), Value::string("cancelled")),
        ]),
        "orders-repository",
        "orders",
    );
    ctx.bind("includeResults", Value::Bool(true)).unwrap();

    let retrieve_stmt = retrieve_where("placedOrders", "orders-repository", "status", Value::string("placed"));
    let aro_ast::Statement::Action(mut desc) = retrieve_stmt else { unreachable!() };
    desc.condition = Some(aro_ast::Condition::truthy("includeResults"));

    let mut fs = AnalyzedFeatureSet::new("ListPlacedOrders", "orders");
    fs.statements.push(aro_ast::Statement::Action(desc));

    let executor = FeatureSetExecutor::new(engine.action_registry().clone(), engine.config.clone());
    executor.run(&fs, &ctx).await.unwrap();

    let Value::List(results) = ctx.resolve("placedOrders").unwrap() else { panic!("expected a list") };
    assert_eq!(results.len(), 1);
    assert_eq!(results.get(0).unwrap().field("status"), Some(&Value::string("placed")));
}
