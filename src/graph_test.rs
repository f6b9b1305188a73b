//! # OperatorSpecGraph Test Suite
//!
//! Assembly validation (duplicates, cycles, dangling edges, intermediate
//! streams), reachability pruning and topological ordering.

use crate::error::GraphError;
use crate::functions::{MapFunction, Message};
use crate::graph::OperatorSpecGraph;
use crate::spec::{
    InputOperatorSpec, OperatorSpec, OutputOperatorSpec, OutputStream, PartitionByOperatorSpec,
    SpecBody, StreamOperatorSpec, TransformFunction,
};
use pretty_assertions::assert_eq;

// ============================================================================
// Helpers
// ============================================================================

fn input(op_id: &str, stream_id: &str, next: &[&str]) -> OperatorSpec {
    with_edges(
        OperatorSpec::new(
            op_id,
            SpecBody::Input(InputOperatorSpec::new(stream_id, None, None, false)),
        ),
        next,
    )
}

fn map(op_id: &str, next: &[&str]) -> OperatorSpec {
    with_edges(
        OperatorSpec::new(
            op_id,
            SpecBody::Stream(StreamOperatorSpec::new(TransformFunction::Map(
                MapFunction::new(|m: Message| m),
            ))),
        ),
        next,
    )
}

fn send_to(op_id: &str, stream_id: &str) -> OperatorSpec {
    OperatorSpec::new(
        op_id,
        SpecBody::SendTo(OutputOperatorSpec::new(OutputStream::new(
            stream_id, None, None, false,
        ))),
    )
}

fn partition_by(op_id: &str) -> OperatorSpec {
    let spec = PartitionByOperatorSpec::new(
        MapFunction::new(|m: Message| m),
        MapFunction::new(|m: Message| m),
        OutputStream::intermediate(op_id, None, None),
    )
    .unwrap();
    OperatorSpec::new(op_id, SpecBody::PartitionBy(spec))
}

fn with_edges(mut spec: OperatorSpec, next: &[&str]) -> OperatorSpec {
    for op_id in next {
        spec.register_next(*op_id);
    }
    spec
}

// ============================================================================
// Assembly
// ============================================================================

#[test]
fn test_assemble_linear_graph() {
    let graph = OperatorSpecGraph::assemble(vec![
        input("j-1-input-in", "in", &["j-1-map-0"]),
        map("j-1-map-0", &["j-1-send_to-1"]),
        send_to("j-1-send_to-1", "out"),
    ])
    .unwrap();

    assert_eq!(graph.input_operator_count(), 1);
    assert_eq!(graph.all_operators().count(), 3);
    assert_eq!(graph.input_stream_ids().collect::<Vec<_>>(), vec!["in"]);
    assert!(graph.output_stream("out").is_some());
    assert_eq!(graph.intermediate_stream_ids().count(), 0);
}

#[test]
fn test_assemble_empty_graph() {
    let graph = OperatorSpecGraph::assemble(Vec::<OperatorSpec>::new()).unwrap();

    assert_eq!(graph.input_operator_count(), 0);
    assert!(graph.topological_order().is_empty());
}

#[test]
fn test_assemble_duplicate_operator_id() {
    let err = OperatorSpecGraph::assemble(vec![
        input("j-1-input-in", "in", &["j-1-map-0"]),
        map("j-1-map-0", &[]),
        map("j-1-map-0", &[]),
    ])
    .unwrap_err();

    assert!(matches!(err, GraphError::DuplicateOperatorId(id) if id == "j-1-map-0"));
}

#[test]
fn test_assemble_duplicate_input_stream() {
    let err = OperatorSpecGraph::assemble(vec![
        input("j-1-input-a", "in", &[]),
        input("j-1-input-b", "in", &[]),
    ])
    .unwrap_err();

    assert!(matches!(err, GraphError::DuplicateStream(id) if id == "in"));
}

#[test]
fn test_assemble_detects_cycle() {
    let err = OperatorSpecGraph::assemble(vec![
        input("j-1-input-in", "in", &["j-1-map-0"]),
        map("j-1-map-0", &["j-1-map-1"]),
        map("j-1-map-1", &["j-1-map-0"]),
    ])
    .unwrap_err();

    match err {
        GraphError::Cycle(path) => {
            assert_eq!(path, "j-1-input-in -> j-1-map-0 -> j-1-map-1 -> j-1-map-0");
        }
        other => panic!("expected cycle, got {other:?}"),
    }
}

#[test]
fn test_assemble_deep_linear_pipeline() {
    const DEPTH: usize = 100_000;
    let ids: Vec<String> = (0..DEPTH).map(|i| format!("j-1-map-{i}")).collect();
    let mut specs = vec![input("j-1-input-in", "in", &[ids[0].as_str()])];
    for (i, op_id) in ids.iter().enumerate() {
        let next: Vec<&str> = ids.get(i + 1).map(String::as_str).into_iter().collect();
        specs.push(map(op_id, &next));
    }

    let graph = OperatorSpecGraph::assemble(specs).unwrap();
    assert_eq!(graph.all_operators().count(), DEPTH + 1);
    let order = graph.topological_order();
    assert_eq!(order.first().copied(), Some("j-1-input-in"));
    assert_eq!(order.last().copied(), Some(ids[DEPTH - 1].as_str()));
}

#[test]
fn test_assemble_detects_deep_cycle() {
    const DEPTH: usize = 100_000;
    let ids: Vec<String> = (0..DEPTH).map(|i| format!("j-1-map-{i}")).collect();
    let mut specs = vec![input("j-1-input-in", "in", &[ids[0].as_str()])];
    for (i, op_id) in ids.iter().enumerate() {
        let next = ids.get(i + 1).unwrap_or(&ids[0]);
        specs.push(map(op_id, &[next.as_str()]));
    }

    let err = OperatorSpecGraph::assemble(specs).unwrap_err();
    match err {
        GraphError::Cycle(path) => {
            assert!(path.starts_with("j-1-input-in -> j-1-map-0 -> j-1-map-1"));
            assert!(path.ends_with(&format!("{} -> j-1-map-0", ids[DEPTH - 1])));
        }
        other => panic!("expected cycle, got {other:?}"),
    }
}

#[test]
fn test_assemble_detects_dangling_edge() {
    let err = OperatorSpecGraph::assemble(vec![input("j-1-input-in", "in", &["j-1-map-9"])])
        .unwrap_err();

    assert!(matches!(
        err,
        GraphError::DanglingEdge { from, to } if from == "j-1-input-in" && to == "j-1-map-9"
    ));
}

#[test]
fn test_assemble_drops_unreachable_operators() {
    let graph = OperatorSpecGraph::assemble(vec![
        input("j-1-input-in", "in", &["j-1-map-0"]),
        map("j-1-map-0", &[]),
        map("j-1-map-7", &["j-1-send_to-8"]),
        send_to("j-1-send_to-8", "orphan"),
    ])
    .unwrap();

    assert_eq!(graph.all_operators().count(), 2);
    assert!(graph.operator("j-1-map-7").is_none());
    assert!(graph.output_stream("orphan").is_none());
}

#[test]
fn test_assemble_shared_output_stream() {
    let graph = OperatorSpecGraph::assemble(vec![
        input("j-1-input-a", "a", &["j-1-send_to-0"]),
        input("j-1-input-b", "b", &["j-1-send_to-1"]),
        send_to("j-1-send_to-0", "out"),
        send_to("j-1-send_to-1", "out"),
    ])
    .unwrap();

    assert_eq!(graph.output_streams().count(), 1);
}

#[test]
fn test_assemble_intermediate_stream_read_back() {
    let pid = "j-1-partition_by-p";
    let graph = OperatorSpecGraph::assemble(vec![
        input("j-1-input-in", "in", &[pid]),
        partition_by(pid),
        input("j-1-input-j-1-partition_by-p", pid, &[]),
    ])
    .unwrap();

    assert_eq!(graph.input_operator_count(), 2);
    assert_eq!(graph.intermediate_stream_ids().collect::<Vec<_>>(), vec![pid]);
    let repartitioned = graph.input_operator(pid).unwrap();
    assert_eq!(repartitioned.stream_id(), pid);
}

#[test]
fn test_assemble_missing_intermediate_input() {
    let pid = "j-1-partition_by-p";
    let err = OperatorSpecGraph::assemble(vec![
        input("j-1-input-in", "in", &[pid]),
        partition_by(pid),
    ])
    .unwrap_err();

    assert!(matches!(err, GraphError::MissingIntermediateInput(id) if id == pid));
}

#[test]
fn test_assemble_intermediate_collides_with_user_output() {
    let pid = "j-1-partition_by-p";
    let err = OperatorSpecGraph::assemble(vec![
        input("j-1-input-in", "in", &[pid, "j-1-send_to-0"]),
        partition_by(pid),
        send_to("j-1-send_to-0", pid),
        input("j-1-input-j-1-partition_by-p", pid, &[]),
    ])
    .unwrap_err();

    assert!(matches!(err, GraphError::DuplicateStream(id) if id == pid));
}

// ============================================================================
// Access
// ============================================================================

#[test]
fn test_input_operator_spec_exposes_edges() {
    let graph = OperatorSpecGraph::assemble(vec![
        input("j-1-input-in", "in", &["j-1-map-0", "j-1-map-1"]),
        map("j-1-map-0", &[]),
        map("j-1-map-1", &[]),
    ])
    .unwrap();

    let spec = graph.input_operator_spec("in").unwrap();
    assert_eq!(spec.registered_specs(), ["j-1-map-0", "j-1-map-1"]);
    assert!(graph.input_operator_spec("missing").is_none());
}

#[test]
fn test_topological_order_diamond() {
    let graph = OperatorSpecGraph::assemble(vec![
        input("j-1-input-in", "in", &["j-1-map-1", "j-1-map-0"]),
        map("j-1-map-0", &["j-1-map-2"]),
        map("j-1-map-1", &["j-1-map-2"]),
        map("j-1-map-2", &[]),
    ])
    .unwrap();

    assert_eq!(
        graph.topological_order(),
        vec!["j-1-input-in", "j-1-map-0", "j-1-map-1", "j-1-map-2"]
    );
}

#[test]
fn test_operator_mut_registers_edge() {
    let mut graph = OperatorSpecGraph::assemble(vec![
        input("j-1-input-in", "in", &["j-1-map-0"]),
        map("j-1-map-0", &[]),
    ])
    .unwrap();

    graph
        .operator_mut("j-1-map-0")
        .unwrap()
        .register_next("j-1-map-0-extra");

    assert_eq!(
        graph.operator("j-1-map-0").unwrap().registered_specs(),
        ["j-1-map-0-extra"]
    );
}
