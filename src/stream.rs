//! # MessageStream
//!
//! A [`MessageStream`] is a handle on the output of one operator. Each
//! transformation appends a new operator below it and returns a handle on that
//! operator; the handle itself never changes, so one stream can feed several
//! branches.
//!
//! ## Repartitioning
//!
//! [`partition_by`](MessageStream::partition_by) splices a repartition
//! boundary into the graph:
//!
//! - a [`PartitionByOperatorSpec`] below this stream writes re-keyed messages
//!   to an intermediate stream whose id is the operator's id
//! - a keyed input operator reads that stream back; the returned handle is
//!   bound to it
//!
//! All checks run before the operator table is touched, so a failed call
//! leaves the description unchanged.

use crate::error::{FunctionRole, GraphError, Result};
use crate::functions::{FilterFunction, FlatMapFunction, JoinFunction, MapFunction, SinkFunction};
use crate::graph_builder::BuilderState;
use crate::naming::OpCode;
use crate::serdes::SerdePair;
use crate::spec::partition_by::ensure_plain;
use crate::spec::{
    InputOperatorSpec, JoinOperatorSpec, JoinSerdes, OperatorSpec, OutputOperatorSpec,
    OutputStream, PartitionByOperatorSpec, SinkOperatorSpec, SpecBody, StreamOperatorSpec,
    TransformFunction, Window, WindowOperatorSpec,
};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;
use tracing::debug;

/// Builder handle bound to the output of one operator.
#[derive(Clone)]
pub struct MessageStream {
    op_id: String,
    state: Rc<RefCell<BuilderState>>,
}

impl fmt::Debug for MessageStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageStream")
            .field("op_id", &self.op_id)
            .finish()
    }
}

impl MessageStream {
    pub(crate) fn new(op_id: String, state: Rc<RefCell<BuilderState>>) -> Self {
        Self { op_id, state }
    }

    /// Id of the operator this handle is bound to.
    pub fn op_id(&self) -> &str {
        &self.op_id
    }

    fn same_application(&self, other: &MessageStream) -> Result<()> {
        if !Rc::ptr_eq(&self.state, &other.state) {
            return Err(GraphError::ForeignStream(other.op_id.clone()));
        }
        Ok(())
    }

    fn append_transform(&self, transform: TransformFunction) -> Result<MessageStream> {
        let mut state = self.state.borrow_mut();
        let op_id = state.naming.next_id(transform.op_code());
        let spec = OperatorSpec::new(
            op_id.clone(),
            SpecBody::Stream(StreamOperatorSpec::new(transform)),
        );
        state.append(&[self.op_id.as_str()], spec)?;
        Ok(MessageStream::new(op_id, Rc::clone(&self.state)))
    }

    /// Applies `map_fn` to every message.
    pub fn map(&self, map_fn: MapFunction) -> Result<MessageStream> {
        self.append_transform(TransformFunction::Map(map_fn))
    }

    /// Keeps messages for which `filter_fn` returns true.
    pub fn filter(&self, filter_fn: FilterFunction) -> Result<MessageStream> {
        self.append_transform(TransformFunction::Filter(filter_fn))
    }

    /// Replaces every message by the messages `flat_map_fn` returns.
    pub fn flat_map(&self, flat_map_fn: FlatMapFunction) -> Result<MessageStream> {
        self.append_transform(TransformFunction::FlatMap(flat_map_fn))
    }

    /// Hands every message to `sink_fn`.
    pub fn sink(&self, sink_fn: SinkFunction) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let op_id = state.naming.next_id(OpCode::Sink);
        let spec = OperatorSpec::new(op_id, SpecBody::Sink(SinkOperatorSpec::new(sink_fn)));
        state.append(&[self.op_id.as_str()], spec)
    }

    /// Writes every message to `output`, which must have been declared with
    /// [`GraphBuilder::output_stream`](crate::GraphBuilder::output_stream).
    pub fn send_to(&self, output: &OutputStream) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let Some(declared) = state
            .output_stream(output.stream_id())
            .filter(|declared| !declared.is_intermediate() && declared.is_same_stream(output))
            .cloned()
        else {
            return Err(GraphError::ForeignStream(output.stream_id().to_string()));
        };
        let op_id = state.naming.next_id(OpCode::SendTo);
        let spec = OperatorSpec::new(op_id, SpecBody::SendTo(OutputOperatorSpec::new(declared)));
        state.append(&[self.op_id.as_str()], spec)
    }

    /// Unions this stream with `others`.
    pub fn merge(&self, others: &[&MessageStream]) -> Result<MessageStream> {
        for other in others {
            self.same_application(other)?;
        }
        let mut parents: Vec<&str> = vec![self.op_id.as_str()];
        parents.extend(others.iter().map(|other| other.op_id.as_str()));

        let mut state = self.state.borrow_mut();
        let op_id = state.naming.next_id(OpCode::Merge);
        state.append(&parents, OperatorSpec::new(op_id.clone(), SpecBody::Merge))?;
        Ok(MessageStream::new(op_id, Rc::clone(&self.state)))
    }

    /// Re-keys the stream through an intermediate stream.
    ///
    /// `key_function` and `value_function` run inside the repartition write and
    /// must not carry the scheduled or watermark capability. When `serde` is
    /// unconfigured the intermediate stream's serdes stay `None` and are
    /// resolved from the system default.
    ///
    /// # Errors
    ///
    /// - [`GraphError::InvalidCapability`] for a scheduled or watermark function
    /// - [`GraphError::InvalidOperatorName`] if `name` is not `[A-Za-z0-9_-]+`
    /// - [`GraphError::DuplicateOperatorId`] if `name` was already used for a
    ///   repartition of this job
    /// - [`GraphError::DuplicateStream`] if the derived stream id is taken
    pub fn partition_by(
        &self,
        key_function: MapFunction,
        value_function: MapFunction,
        serde: SerdePair,
        name: &str,
    ) -> Result<MessageStream> {
        let mut state = self.state.borrow_mut();
        let op_id = state.naming.named_id(OpCode::PartitionBy, name)?;

        let output_stream =
            OutputStream::intermediate(op_id.clone(), serde.key_serde(), serde.value_serde());
        let partition_by =
            PartitionByOperatorSpec::new(key_function, value_function, output_stream.clone())?;

        let input_op_id = state.naming.input_id(&op_id);
        state.ensure_operator_present(&self.op_id)?;
        state.ensure_operator_absent(&op_id)?;
        state.ensure_stream_absent(&op_id)?;
        state.ensure_operator_absent(&input_op_id)?;

        state.attach(
            &[self.op_id.as_str()],
            OperatorSpec::new(op_id.clone(), SpecBody::PartitionBy(partition_by)),
        );
        state.attach_output(output_stream);
        let input = InputOperatorSpec::new(
            op_id.clone(),
            serde.key_serde(),
            serde.value_serde(),
            true,
        );
        state.attach_input(input_op_id.clone(), input);
        debug!(source = %self.op_id, stream_id = %op_id, "spliced repartition boundary");

        Ok(MessageStream::new(input_op_id, Rc::clone(&self.state)))
    }

    /// Aggregates the stream into windows.
    ///
    /// # Errors
    ///
    /// - [`GraphError::InvalidCapability`] if the window's key function is a
    ///   scheduled or watermark function
    /// - [`GraphError::InvalidOperatorName`] / [`GraphError::DuplicateOperatorId`]
    ///   for a bad or taken `name`
    pub fn window(&self, window: Window, name: &str) -> Result<MessageStream> {
        if let Some(key_function) = window.key_function() {
            ensure_plain(OpCode::Window, FunctionRole::Key, key_function.capabilities())?;
        }
        let mut state = self.state.borrow_mut();
        let op_id = state.naming.named_id(OpCode::Window, name)?;
        let spec = OperatorSpec::new(
            op_id.clone(),
            SpecBody::Window(WindowOperatorSpec::new(window)),
        );
        state.append(&[self.op_id.as_str()], spec)?;
        Ok(MessageStream::new(op_id, Rc::clone(&self.state)))
    }

    /// Joins this stream with `other` on the keys produced by `join_fn`.
    ///
    /// Messages wait up to `ttl` for their counterpart.
    pub fn join(
        &self,
        other: &MessageStream,
        join_fn: JoinFunction,
        serdes: JoinSerdes,
        ttl: Duration,
        name: &str,
    ) -> Result<MessageStream> {
        self.same_application(other)?;
        if other.op_id == self.op_id {
            return Err(GraphError::SelfJoin);
        }

        let mut state = self.state.borrow_mut();
        let op_id = state.naming.named_id(OpCode::Join, name)?;
        let spec = OperatorSpec::new(
            op_id.clone(),
            SpecBody::Join(JoinOperatorSpec::new(
                self.op_id.clone(),
                other.op_id.clone(),
                join_fn,
                serdes,
                ttl,
            )),
        );
        state.append(&[self.op_id.as_str(), other.op_id.as_str()], spec)?;
        Ok(MessageStream::new(op_id, Rc::clone(&self.state)))
    }
}
