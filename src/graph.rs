//! # Operator Spec Graph
//!
//! The assembled, validated operator DAG of one application.
//!
//! ## Assembly
//!
//! [`OperatorSpecGraph::assemble`] takes the operator table produced while the
//! pipeline was described and:
//!
//! 1. Rejects duplicate operator ids and duplicate input stream ids
//! 2. Walks depth-first from every input operator along `registered_specs`,
//!    failing on cycles and on edges to unknown operators
//! 3. Keeps every reachable operator and drops the rest
//! 4. Collects the output streams written by `send_to` and `partition_by`
//!    operators and checks that every intermediate stream is read back
//!
//! ## Access
//!
//! After assembly the graph is read-only for planning purposes
//! ([`input_operators`](OperatorSpecGraph::input_operators),
//! [`operator`](OperatorSpecGraph::operator), ...). Each task gets its own copy
//! through [`Clone`], see [`crate::cloner`]; only that copy should be mutated.
//!
//! ## Example
//!
//! ```rust
//! use streamweave_opgraph::graph::OperatorSpecGraph;
//! use streamweave_opgraph::spec::{InputOperatorSpec, OperatorSpec, SpecBody};
//!
//! let mut input = OperatorSpec::new(
//!     "job-1-input-in",
//!     SpecBody::Input(InputOperatorSpec::new("in", None, None, false)),
//! );
//! input.register_next("job-1-merge-0");
//! let merge = OperatorSpec::new("job-1-merge-0", SpecBody::Merge);
//!
//! let graph = OperatorSpecGraph::assemble(vec![input, merge]).unwrap();
//! assert_eq!(graph.input_operator_count(), 1);
//! assert_eq!(graph.all_operators().count(), 2);
//! ```

use crate::error::{GraphError, Result};
use crate::spec::{InputOperatorSpec, OperatorSpec, OutputStream, SpecBody};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Validated operator DAG.
#[derive(Debug)]
pub struct OperatorSpecGraph {
    /// stream id -> op id of its input operator
    input_operators: BTreeMap<String, String>,
    /// op id -> operator
    all_operators: BTreeMap<String, OperatorSpec>,
    /// stream id -> output stream
    output_streams: BTreeMap<String, OutputStream>,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Mark {
    Temp,
    Perm,
}

/// Depth-first walk from `root` on an explicit stack of `(op id, next edge)`
/// frames. `path` holds the chain of operators still marked `Temp`.
fn visit<'a>(
    root: &'a str,
    arena: &'a BTreeMap<String, OperatorSpec>,
    marks: &mut BTreeMap<String, Mark>,
    path: &mut Vec<String>,
) -> Result<()> {
    if marks.get(root) == Some(&Mark::Perm) {
        return Ok(());
    }
    // Callers only pass ids they resolved against the arena.
    if !arena.contains_key(root) {
        return Err(GraphError::UnknownOperator(root.to_string()));
    }

    marks.insert(root.to_string(), Mark::Temp);
    path.push(root.to_string());
    let mut stack: Vec<(&'a str, usize)> = vec![(root, 0)];

    while let Some((op_id, index)) = stack.last_mut() {
        let op_id: &'a str = *op_id;
        let Some(spec) = arena.get(op_id) else {
            return Err(GraphError::UnknownOperator(op_id.to_string()));
        };
        let Some(next) = spec.registered_specs().get(*index) else {
            stack.pop();
            path.pop();
            marks.insert(op_id.to_string(), Mark::Perm);
            continue;
        };
        *index += 1;

        let Some((next_id, _)) = arena.get_key_value(next) else {
            return Err(GraphError::DanglingEdge {
                from: op_id.to_string(),
                to: next.clone(),
            });
        };
        match marks.get(next_id) {
            Some(Mark::Perm) => {}
            Some(Mark::Temp) => {
                path.push(next_id.clone());
                return Err(GraphError::Cycle(path.join(" -> ")));
            }
            None => {
                marks.insert(next_id.clone(), Mark::Temp);
                path.push(next_id.clone());
                stack.push((next_id.as_str(), 0));
            }
        }
    }
    Ok(())
}

fn insert_output(
    outputs: &mut BTreeMap<String, OutputStream>,
    stream: &OutputStream,
) -> Result<()> {
    match outputs.entry(stream.stream_id().to_string()) {
        Entry::Vacant(slot) => {
            slot.insert(stream.clone());
            Ok(())
        }
        // Several send_to operators may share one user output stream.
        Entry::Occupied(existing)
            if !existing.get().is_intermediate() && !stream.is_intermediate() =>
        {
            Ok(())
        }
        Entry::Occupied(_) => Err(GraphError::DuplicateStream(stream.stream_id().to_string())),
    }
}

impl OperatorSpecGraph {
    /// Validates `specs` and builds the graph rooted at its input operators.
    pub fn assemble(specs: impl IntoIterator<Item = OperatorSpec>) -> Result<Self> {
        let mut arena = BTreeMap::<String, OperatorSpec>::new();
        for spec in specs {
            match arena.entry(spec.op_id().to_string()) {
                Entry::Vacant(slot) => {
                    slot.insert(spec);
                }
                Entry::Occupied(slot) => {
                    return Err(GraphError::DuplicateOperatorId(slot.key().clone()));
                }
            }
        }

        let mut input_operators = BTreeMap::<String, String>::new();
        for spec in arena.values() {
            if let Some(input) = spec.as_input() {
                if input_operators
                    .insert(input.stream_id().to_string(), spec.op_id().to_string())
                    .is_some()
                {
                    return Err(GraphError::DuplicateStream(input.stream_id().to_string()));
                }
            }
        }

        let mut marks = BTreeMap::<String, Mark>::new();
        let mut path = Vec::<String>::new();
        for op_id in input_operators.values() {
            path.clear();
            visit(op_id, &arena, &mut marks, &mut path)?;
        }

        let total = arena.len();
        arena.retain(|op_id, spec| {
            let reachable = marks.get(op_id) == Some(&Mark::Perm);
            if !reachable {
                warn!(op_id = %op_id, op_code = %spec.op_code(), "dropping unreachable operator");
            }
            reachable
        });

        let mut output_streams = BTreeMap::<String, OutputStream>::new();
        for spec in arena.values() {
            match spec.body() {
                SpecBody::PartitionBy(partition_by) => {
                    let stream = partition_by.output_stream();
                    if !input_operators.contains_key(stream.stream_id()) {
                        return Err(GraphError::MissingIntermediateInput(
                            stream.stream_id().to_string(),
                        ));
                    }
                    insert_output(&mut output_streams, stream)?;
                }
                SpecBody::SendTo(send_to) => {
                    insert_output(&mut output_streams, send_to.output_stream())?;
                }
                _ => {}
            }
        }

        info!(
            inputs = input_operators.len(),
            operators = arena.len(),
            dropped = total - arena.len(),
            outputs = output_streams.len(),
            "assembled operator graph"
        );

        Ok(Self {
            input_operators,
            all_operators: arena,
            output_streams,
        })
    }

    /// Rebuilds a graph from already validated parts.
    pub(crate) fn from_parts(
        input_operators: BTreeMap<String, String>,
        all_operators: BTreeMap<String, OperatorSpec>,
        output_streams: BTreeMap<String, OutputStream>,
    ) -> Self {
        Self {
            input_operators,
            all_operators,
            output_streams,
        }
    }

    pub(crate) fn parts(
        &self,
    ) -> (
        &BTreeMap<String, String>,
        &BTreeMap<String, OperatorSpec>,
        &BTreeMap<String, OutputStream>,
    ) {
        (&self.input_operators, &self.all_operators, &self.output_streams)
    }

    /// Input operators keyed by stream id, including repartition inputs.
    pub fn input_operators(&self) -> impl Iterator<Item = (&str, &InputOperatorSpec)> {
        self.input_operators.iter().filter_map(|(stream_id, op_id)| {
            self.all_operators
                .get(op_id)
                .and_then(OperatorSpec::as_input)
                .map(|input| (stream_id.as_str(), input))
        })
    }

    /// The input operator reading `stream_id`.
    pub fn input_operator(&self, stream_id: &str) -> Option<&InputOperatorSpec> {
        self.input_operator_spec(stream_id)
            .and_then(OperatorSpec::as_input)
    }

    /// The node of the input operator reading `stream_id`, with its edges.
    pub fn input_operator_spec(&self, stream_id: &str) -> Option<&OperatorSpec> {
        self.input_operators
            .get(stream_id)
            .and_then(|op_id| self.all_operators.get(op_id))
    }

    /// Number of input operators, repartition inputs included.
    pub fn input_operator_count(&self) -> usize {
        self.input_operators.len()
    }

    /// Stream ids with an input operator, sorted.
    pub fn input_stream_ids(&self) -> impl Iterator<Item = &str> {
        self.input_operators.keys().map(String::as_str)
    }

    /// Every operator, keyed by op id.
    pub fn all_operators(&self) -> impl Iterator<Item = (&str, &OperatorSpec)> {
        self.all_operators
            .iter()
            .map(|(op_id, spec)| (op_id.as_str(), spec))
    }

    /// The operator with id `op_id`.
    pub fn operator(&self, op_id: &str) -> Option<&OperatorSpec> {
        self.all_operators.get(op_id)
    }

    /// Mutable access for the task owning this copy of the graph.
    pub fn operator_mut(&mut self, op_id: &str) -> Option<&mut OperatorSpec> {
        self.all_operators.get_mut(op_id)
    }

    /// Output streams keyed by stream id.
    pub fn output_streams(&self) -> impl Iterator<Item = (&str, &OutputStream)> {
        self.output_streams
            .iter()
            .map(|(stream_id, stream)| (stream_id.as_str(), stream))
    }

    /// The output stream `stream_id`, user-declared or intermediate.
    pub fn output_stream(&self, stream_id: &str) -> Option<&OutputStream> {
        self.output_streams.get(stream_id)
    }

    /// Streams written by `partition_by` and read back by this application.
    pub fn intermediate_stream_ids(&self) -> impl Iterator<Item = &str> {
        self.output_streams
            .values()
            .filter(|stream| stream.is_intermediate())
            .map(OutputStream::stream_id)
    }

    /// Operator ids ordered so that every operator follows all of its
    /// upstreams. Ties are broken by op id.
    pub fn topological_order(&self) -> Vec<&str> {
        let mut in_degree = BTreeMap::<&str, usize>::new();
        for op_id in self.all_operators.keys() {
            in_degree.entry(op_id.as_str()).or_insert(0);
        }
        for spec in self.all_operators.values() {
            for next in spec.registered_specs() {
                *in_degree.entry(next.as_str()).or_insert(0) += 1;
            }
        }

        let mut ready: BTreeSet<&str> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(op_id, _)| *op_id)
            .collect();
        let mut order = Vec::with_capacity(self.all_operators.len());
        while let Some(op_id) = ready.pop_first() {
            order.push(op_id);
            if let Some(spec) = self.all_operators.get(op_id) {
                for next in spec.registered_specs() {
                    if let Some(degree) = in_degree.get_mut(next.as_str()) {
                        *degree -= 1;
                        if *degree == 0 {
                            ready.insert(next.as_str());
                        }
                    }
                }
            }
        }
        debug!(operators = order.len(), "computed topological order");
        order
    }
}

