//! # MessageStream Test Suite
//!
//! Operator chaining on stream handles: auto-named transforms, named
//! operators, multi-input operators and the repartition splice.

use crate::config::JobConfig;
use crate::descriptors::SystemDescriptor;
use crate::error::{Capability, FunctionRole, GraphError};
use crate::functions::{
    message, FilterFunction, FlatMapFunction, JoinFn, JoinFunction, MapFn, MapFunction, Message,
    SinkFunction, WatermarkFunction,
};
use crate::graph_builder::GraphBuilder;
use crate::naming::OpCode;
use crate::partitioning::PartitionKey;
use crate::serdes::{is_serde, NoOpSerde, SerdePair, StringSerde};
use crate::spec::{FoldFunction, JoinSerdes, Window};
use crate::stream::MessageStream;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Helpers
// ============================================================================

struct ConcatJoin;

impl JoinFn for ConcatJoin {
    fn apply(&self, left: Message, right: Message) -> Message {
        let left = left.downcast_ref::<String>().cloned().unwrap_or_default();
        let right = right.downcast_ref::<String>().cloned().unwrap_or_default();
        message(format!("{left}{right}"))
    }

    fn first_key(&self, message: &Message) -> PartitionKey {
        PartitionKey::from_message(message).unwrap_or_else(|| PartitionKey::from(""))
    }

    fn second_key(&self, message: &Message) -> PartitionKey {
        PartitionKey::from_message(message).unwrap_or_else(|| PartitionKey::from(""))
    }
}

struct WatermarkKey;

impl MapFn for WatermarkKey {
    fn apply(&self, message: Message) -> Message {
        message
    }
}

impl WatermarkFunction for WatermarkKey {
    fn process_watermark(&self, _watermark: u64) -> Vec<Message> {
        Vec::new()
    }

    fn output_watermark(&self) -> Option<u64> {
        None
    }
}

fn builder() -> GraphBuilder {
    GraphBuilder::new(JobConfig::new("testJob", "1"))
}

fn input(app: &GraphBuilder, stream_id: &str) -> MessageStream {
    app.input_stream(&SystemDescriptor::new("kafka").input_descriptor(stream_id, SerdePair::unconfigured()))
        .unwrap()
}

fn identity() -> MapFunction {
    MapFunction::new(|m: Message| m)
}

fn count_window() -> Window {
    Window::tumbling(
        Duration::from_secs(60),
        FoldFunction::new(|| message(0u64), |_m: Message, acc: Message| acc),
    )
}

// ============================================================================
// Transforms
// ============================================================================

#[test]
fn test_stream_transforms_use_counter_ids() {
    let app = builder();
    let source = input(&app, "in");

    let mapped = source.map(identity()).unwrap();
    let filtered = mapped.filter(FilterFunction::new(|_: &Message| true)).unwrap();
    let flattened = filtered
        .flat_map(FlatMapFunction::new(|m: Message| vec![m.clone(), m]))
        .unwrap();

    assert_eq!(mapped.op_id(), "testJob-1-map-0");
    assert_eq!(filtered.op_id(), "testJob-1-filter-1");
    assert_eq!(flattened.op_id(), "testJob-1-flat_map-2");

    let graph = app.build().unwrap();
    assert_eq!(
        graph.operator(flattened.op_id()).unwrap().op_code(),
        OpCode::FlatMap
    );
}

#[test]
fn test_stream_fan_out() {
    let app = builder();
    let source = input(&app, "in");

    let a = source.map(identity()).unwrap();
    let b = source.map(identity()).unwrap();

    assert_eq!(
        app.registered_specs(source.op_id()).unwrap(),
        vec![a.op_id().to_string(), b.op_id().to_string()]
    );
}

#[test]
fn test_stream_sink_is_terminal() {
    let app = builder();
    input(&app, "in").sink(SinkFunction::new(|_: Message| {})).unwrap();

    let graph = app.build().unwrap();
    let sink = graph.operator("testJob-1-sink-0").unwrap();
    assert!(sink.is_terminal());
    assert!(sink.registered_specs().is_empty());
}

#[test]
fn test_stream_send_to() {
    let app = builder();
    let output = app
        .output_stream(&SystemDescriptor::new("kafka").output_descriptor("out", SerdePair::of(StringSerde, StringSerde)))
        .unwrap();
    input(&app, "in").send_to(&output).unwrap();

    let graph = app.build().unwrap();
    let send_to = graph.operator("testJob-1-send_to-0").unwrap().as_send_to().unwrap();
    assert_eq!(send_to.output_stream().stream_id(), "out");
    assert!(is_serde::<StringSerde>(graph.output_stream("out").unwrap().key_serde().unwrap()));
}

#[test]
fn test_stream_send_to_undeclared_output() {
    let app = builder();
    let other = builder();
    let output = other
        .output_stream(&SystemDescriptor::new("kafka").output_descriptor("out", SerdePair::unconfigured()))
        .unwrap();

    let err = input(&app, "in").send_to(&output).unwrap_err();
    assert!(matches!(err, GraphError::ForeignStream(id) if id == "out"));
    assert_eq!(app.operator_count(), 1);
}

#[test]
fn test_stream_send_to_output_of_another_builder_with_same_id() {
    let app = builder();
    let other = builder();
    let kafka = SystemDescriptor::new("kafka");
    let own = app
        .output_stream(&kafka.output_descriptor("out", SerdePair::of(StringSerde, StringSerde)))
        .unwrap();
    let foreign = other
        .output_stream(&kafka.output_descriptor("out", SerdePair::of(NoOpSerde, NoOpSerde)))
        .unwrap();
    let source = input(&app, "in");

    let err = source.send_to(&foreign).unwrap_err();
    assert!(matches!(err, GraphError::ForeignStream(id) if id == "out"));
    assert_eq!(app.operator_count(), 1);

    source.send_to(&own).unwrap();
    let graph = app.build().unwrap();
    let written = graph.operator("testJob-1-send_to-0").unwrap().as_send_to().unwrap();
    assert!(Arc::ptr_eq(
        written.output_stream().key_serde().unwrap(),
        own.key_serde().unwrap()
    ));
}

// ============================================================================
// Merge
// ============================================================================

#[test]
fn test_stream_merge() {
    let app = builder();
    let a = input(&app, "a");
    let b = input(&app, "b");
    let c = input(&app, "c");

    let merged = a.merge(&[&b, &c]).unwrap();
    assert_eq!(merged.op_id(), "testJob-1-merge-0");

    let graph = app.build().unwrap();
    for stream_id in ["a", "b", "c"] {
        let spec = graph.input_operator_spec(stream_id).unwrap();
        assert_eq!(spec.registered_specs(), [merged.op_id()]);
    }
    assert_eq!(graph.topological_order().last().copied(), Some(merged.op_id()));
}

#[test]
fn test_stream_merge_rejects_foreign_stream() {
    let app = builder();
    let other = builder();
    let a = input(&app, "a");
    let b = input(&other, "b");

    let err = a.merge(&[&b]).unwrap_err();
    assert!(matches!(err, GraphError::ForeignStream(id) if id == "testJob-1-input-b"));
    assert_eq!(app.registered_specs(a.op_id()), Some(Vec::new()));
}

// ============================================================================
// Window
// ============================================================================

#[test]
fn test_stream_window_named() {
    let app = builder();
    let windowed = input(&app, "in").window(count_window(), "perMinute").unwrap();

    assert_eq!(windowed.op_id(), "testJob-1-window-perMinute");
    let graph = app.build().unwrap();
    assert!(graph.operator(windowed.op_id()).unwrap().as_window().is_some());
}

#[test]
fn test_stream_window_duplicate_name() {
    let app = builder();
    let source = input(&app, "in");
    source.window(count_window(), "w").unwrap();

    let err = source.window(count_window(), "w").unwrap_err();
    assert!(matches!(err, GraphError::DuplicateOperatorId(id) if id == "testJob-1-window-w"));
    assert_eq!(app.operator_count(), 2);
}

#[test]
fn test_stream_window_rejects_watermark_key_function() {
    let app = builder();
    let source = input(&app, "in");

    let err = source
        .window(count_window().keyed_by(MapFunction::watermarked(WatermarkKey)), "w")
        .unwrap_err();
    assert!(matches!(
        err,
        GraphError::InvalidCapability {
            operator: OpCode::Window,
            role: FunctionRole::Key,
            capability: Capability::Watermark,
        }
    ));
    assert_eq!(app.operator_count(), 1);

    let keyed = source
        .window(count_window().keyed_by(identity()), "w")
        .unwrap();
    assert_eq!(keyed.op_id(), "testJob-1-window-w");
}

#[test]
fn test_stream_window_name_is_trimmed() {
    let app = builder();
    let windowed = input(&app, "in").window(count_window(), "  w1 ").unwrap();

    assert_eq!(windowed.op_id(), "testJob-1-window-w1");
}

// ============================================================================
// Join
// ============================================================================

#[test]
fn test_stream_join() {
    let app = builder();
    let left = input(&app, "left");
    let right = input(&app, "right");

    let joined = left
        .join(
            &right,
            JoinFunction::new(ConcatJoin),
            JoinSerdes::default(),
            Duration::from_secs(30),
            "j",
        )
        .unwrap();
    assert_eq!(joined.op_id(), "testJob-1-join-j");

    let graph = app.build().unwrap();
    let join = graph.operator(joined.op_id()).unwrap().as_join().unwrap();
    assert_eq!(join.left_op_id(), left.op_id());
    assert_eq!(join.right_op_id(), right.op_id());
    assert_eq!(join.ttl(), Duration::from_secs(30));
    let out = join
        .join_fn()
        .apply(message("a".to_string()), message("b".to_string()));
    assert_eq!(out.downcast_ref::<String>().map(String::as_str), Some("ab"));

    for stream_id in ["left", "right"] {
        assert_eq!(
            graph.input_operator_spec(stream_id).unwrap().registered_specs(),
            [joined.op_id()]
        );
    }
}

#[test]
fn test_stream_self_join() {
    let app = builder();
    let source = input(&app, "in");

    let err = source
        .join(
            &source.clone(),
            JoinFunction::new(ConcatJoin),
            JoinSerdes::default(),
            Duration::from_secs(1),
            "self",
        )
        .unwrap_err();
    assert!(matches!(err, GraphError::SelfJoin));
    assert_eq!(app.operator_count(), 1);
}

// ============================================================================
// PartitionBy
// ============================================================================

#[test]
fn test_stream_partition_by_splices_boundary() {
    let app = builder();
    let source = input(&app, "in");

    let repartitioned = source
        .partition_by(identity(), identity(), SerdePair::of(NoOpSerde, NoOpSerde), "byKey")
        .unwrap();

    let pid = "testJob-1-partition_by-byKey";
    assert_eq!(repartitioned.op_id(), "testJob-1-input-testJob-1-partition_by-byKey");
    assert_eq!(app.registered_specs(source.op_id()), Some(vec![pid.to_string()]));
    assert_eq!(app.registered_specs(pid), Some(Vec::new()));
    assert_eq!(app.input_stream_count(), 2);
}

#[test]
fn test_stream_partition_by_continues_from_intermediate_input() {
    let app = builder();
    let mapped = input(&app, "in")
        .partition_by(identity(), identity(), SerdePair::unconfigured(), "p")
        .unwrap()
        .map(identity())
        .unwrap();

    let graph = app.build().unwrap();
    let intermediate = graph
        .input_operator_spec("testJob-1-partition_by-p")
        .unwrap();
    assert_eq!(intermediate.registered_specs(), [mapped.op_id()]);
}

#[test]
fn test_stream_partition_by_duplicate_name() {
    let app = builder();
    let source = input(&app, "in");
    source
        .partition_by(identity(), identity(), SerdePair::unconfigured(), "p")
        .unwrap();

    let err = source
        .partition_by(identity(), identity(), SerdePair::unconfigured(), "p")
        .unwrap_err();
    assert!(matches!(err, GraphError::DuplicateOperatorId(_)));
    assert_eq!(app.operator_count(), 3);
}

#[test]
fn test_stream_partition_by_stream_id_taken() {
    let app = builder();
    input(&app, "testJob-1-partition_by-p");
    let source = input(&app, "in");

    let err = source
        .partition_by(identity(), identity(), SerdePair::unconfigured(), "p")
        .unwrap_err();
    assert!(matches!(err, GraphError::DuplicateStream(id) if id == "testJob-1-partition_by-p"));
    assert_eq!(app.operator_count(), 2);
}

#[test]
fn test_stream_partition_by_invalid_names() {
    let app = builder();
    let source = input(&app, "in");

    for name in ["", "   ", "by key", "by.key", "by/key"] {
        let err = source
            .partition_by(identity(), identity(), SerdePair::unconfigured(), name)
            .unwrap_err();
        assert!(matches!(err, GraphError::InvalidOperatorName(_)), "{name:?}");
    }
    assert_eq!(app.operator_count(), 1);
}
