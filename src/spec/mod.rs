//! # Operator Specs
//!
//! An [`OperatorSpec`] is one node of the logical pipeline DAG: its id, the
//! ids of the operators it feeds (`registered_specs`) and a [`SpecBody`]
//! holding the operator-specific configuration.
//!
//! Nodes reference their children by op id rather than by pointer. The
//! [`OperatorSpecGraph`](crate::graph::OperatorSpecGraph) owns every node in an
//! arena keyed by op id, which makes cloning a plain data copy.
//!
//! ## Edge Ownership
//!
//! An upstream node owns its outgoing edge list. Nodes know nothing about
//! their upstreams; a node with several parents (merge, join) simply appears
//! in several edge lists.

pub mod input;
pub mod join;
pub mod output;
pub mod partition_by;
pub mod stream_op;
pub mod window;

pub use input::InputOperatorSpec;
pub use join::{JoinOperatorSpec, JoinSerdes};
pub use output::{OutputOperatorSpec, OutputStream, SinkOperatorSpec};
pub use partition_by::PartitionByOperatorSpec;
pub use stream_op::{StreamOperatorSpec, TransformFunction};
pub use window::{FoldFunction, Window, WindowOperatorSpec, WindowPanes, WindowType};

use crate::functions::{ScheduledFunction, WatermarkFunction};
use crate::naming::OpCode;
use std::sync::Arc;

/// Operator-specific part of an [`OperatorSpec`].
#[derive(Debug)]
pub enum SpecBody {
    /// Entry point bound to a stream.
    Input(InputOperatorSpec),
    /// Map, filter or flat map.
    Stream(StreamOperatorSpec),
    /// Terminal user callback.
    Sink(SinkOperatorSpec),
    /// Terminal write to an output stream.
    SendTo(OutputOperatorSpec),
    /// Write side of a repartition.
    PartitionBy(PartitionByOperatorSpec),
    /// Union of its upstreams.
    Merge,
    /// Keyed window aggregation.
    Window(WindowOperatorSpec),
    /// Two-stream join.
    Join(JoinOperatorSpec),
}

/// A node of the operator graph.
#[derive(Debug)]
pub struct OperatorSpec {
    op_id: String,
    registered_specs: Vec<String>,
    body: SpecBody,
}

impl OperatorSpec {
    /// Creates a node without downstream operators.
    pub fn new(op_id: impl Into<String>, body: SpecBody) -> Self {
        Self {
            op_id: op_id.into(),
            registered_specs: Vec::new(),
            body,
        }
    }

    /// Globally unique id within the job.
    pub fn op_id(&self) -> &str {
        &self.op_id
    }

    /// Kind tag.
    pub fn op_code(&self) -> OpCode {
        match &self.body {
            SpecBody::Input(_) => OpCode::Input,
            SpecBody::Stream(spec) => spec.op_code(),
            SpecBody::Sink(_) => OpCode::Sink,
            SpecBody::SendTo(_) => OpCode::SendTo,
            SpecBody::PartitionBy(_) => OpCode::PartitionBy,
            SpecBody::Merge => OpCode::Merge,
            SpecBody::Window(_) => OpCode::Window,
            SpecBody::Join(_) => OpCode::Join,
        }
    }

    /// Ids of downstream operators, in registration order.
    pub fn registered_specs(&self) -> &[String] {
        &self.registered_specs
    }

    /// Adds a downstream operator. Registering the same id twice keeps one
    /// edge.
    pub fn register_next(&mut self, op_id: impl Into<String>) {
        let op_id = op_id.into();
        if !self.registered_specs.contains(&op_id) {
            self.registered_specs.push(op_id);
        }
    }

    /// Operator configuration.
    pub fn body(&self) -> &SpecBody {
        &self.body
    }

    /// Mutable operator configuration.
    pub fn body_mut(&mut self) -> &mut SpecBody {
        &mut self.body
    }

    /// True for operators that emit no stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self.body, SpecBody::Sink(_) | SpecBody::SendTo(_))
    }

    /// The input configuration, if this is an input operator.
    pub fn as_input(&self) -> Option<&InputOperatorSpec> {
        match &self.body {
            SpecBody::Input(spec) => Some(spec),
            _ => None,
        }
    }

    /// The transform, if this is a map, filter or flat map operator.
    pub fn as_stream(&self) -> Option<&StreamOperatorSpec> {
        match &self.body {
            SpecBody::Stream(spec) => Some(spec),
            _ => None,
        }
    }

    /// The repartition configuration, if this is a `partition_by` operator.
    pub fn as_partition_by(&self) -> Option<&PartitionByOperatorSpec> {
        match &self.body {
            SpecBody::PartitionBy(spec) => Some(spec),
            _ => None,
        }
    }

    /// The written stream, if this is a `send_to` operator.
    pub fn as_send_to(&self) -> Option<&OutputOperatorSpec> {
        match &self.body {
            SpecBody::SendTo(spec) => Some(spec),
            _ => None,
        }
    }

    /// The window, if this is a window operator.
    pub fn as_window(&self) -> Option<&WindowOperatorSpec> {
        match &self.body {
            SpecBody::Window(spec) => Some(spec),
            _ => None,
        }
    }

    /// Mutable window access for the task owning this copy.
    pub fn as_window_mut(&mut self) -> Option<&mut WindowOperatorSpec> {
        match &mut self.body {
            SpecBody::Window(spec) => Some(spec),
            _ => None,
        }
    }

    /// The join configuration, if this is a join operator.
    pub fn as_join(&self) -> Option<&JoinOperatorSpec> {
        match &self.body {
            SpecBody::Join(spec) => Some(spec),
            _ => None,
        }
    }

    /// Timer capability the runtime must bind to this operator instance.
    ///
    /// Repartition, output, merge and window operators never carry one. An
    /// input operator carries one only through its transformer.
    pub fn scheduled_fn(&self) -> Option<&Arc<dyn ScheduledFunction>> {
        match &self.body {
            SpecBody::Input(spec) => spec
                .transformer()
                .and_then(|transformer| transformer.capabilities().scheduled()),
            SpecBody::Stream(spec) => spec.transform().capabilities().scheduled(),
            SpecBody::Sink(spec) => spec.sink_fn().capabilities().scheduled(),
            SpecBody::Join(spec) => spec.join_fn().capabilities().scheduled(),
            SpecBody::PartitionBy(spec) => spec.scheduled_fn(),
            SpecBody::SendTo(_) | SpecBody::Merge | SpecBody::Window(_) => None,
        }
    }

    /// Watermark capability the runtime must bind to this operator instance.
    pub fn watermark_fn(&self) -> Option<&Arc<dyn WatermarkFunction>> {
        match &self.body {
            SpecBody::Input(spec) => spec
                .transformer()
                .and_then(|transformer| transformer.capabilities().watermark()),
            SpecBody::Stream(spec) => spec.transform().capabilities().watermark(),
            SpecBody::Sink(spec) => spec.sink_fn().capabilities().watermark(),
            SpecBody::Join(spec) => spec.join_fn().capabilities().watermark(),
            SpecBody::PartitionBy(spec) => spec.watermark_fn(),
            SpecBody::SendTo(_) | SpecBody::Merge | SpecBody::Window(_) => None,
        }
    }

    /// Copies configuration and edges into a new node; runtime state starts
    /// from its construction-time default.
    pub fn fresh_copy(&self) -> OperatorSpec {
        let body = match &self.body {
            SpecBody::Input(spec) => SpecBody::Input(spec.clone()),
            SpecBody::Stream(spec) => SpecBody::Stream(spec.clone()),
            SpecBody::Sink(spec) => SpecBody::Sink(spec.clone()),
            SpecBody::SendTo(spec) => SpecBody::SendTo(spec.clone()),
            SpecBody::PartitionBy(spec) => SpecBody::PartitionBy(spec.clone()),
            SpecBody::Merge => SpecBody::Merge,
            SpecBody::Window(spec) => SpecBody::Window(spec.fresh_copy()),
            SpecBody::Join(spec) => SpecBody::Join(spec.clone()),
        };
        OperatorSpec {
            op_id: self.op_id.clone(),
            registered_specs: self.registered_specs.clone(),
            body,
        }
    }
}
