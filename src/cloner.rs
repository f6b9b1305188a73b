//! # Graph Cloner
//!
//! Every task executing an application gets its own [`OperatorSpecGraph`].
//! Cloning rebuilds the operator arena node by node with
//! [`OperatorSpec::fresh_copy`]:
//!
//! - op ids, stream ids, edges and serde configuration are copied
//! - runtime state (window panes) starts empty
//! - user functions and serdes are shared by `Arc`, they are stateless
//!
//! After the clone no mutation of one graph is visible in the other, so tasks
//! run without locking.

use crate::graph::OperatorSpecGraph;
use crate::spec::OperatorSpec;
use std::collections::BTreeMap;
use tracing::debug;

/// Produces an independent copy of `graph` with identical topology.
pub fn clone_graph(graph: &OperatorSpecGraph) -> OperatorSpecGraph {
    let (input_operators, all_operators, output_streams) = graph.parts();
    let operators: BTreeMap<String, OperatorSpec> = all_operators
        .iter()
        .map(|(op_id, spec)| (op_id.clone(), spec.fresh_copy()))
        .collect();
    debug!(operators = operators.len(), "cloned operator graph");
    OperatorSpecGraph::from_parts(input_operators.clone(), operators, output_streams.clone())
}

impl Clone for OperatorSpecGraph {
    fn clone(&self) -> Self {
        clone_graph(self)
    }
}
