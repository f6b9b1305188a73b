//! # GraphBuilder
//!
//! Entry point for describing a stream application.
//!
//! The `GraphBuilder` owns the operator table while the pipeline is being
//! described. Declaring an input returns a [`MessageStream`] handle; every
//! transformation on a handle appends an operator to the table and returns a
//! handle bound to the new operator. Once the description is complete,
//! [`build`](GraphBuilder::build) validates the table and produces the
//! [`OperatorSpecGraph`].
//!
//! Description is single-threaded: the builder and its handles share state
//! through `Rc<RefCell<_>>` and are neither `Send` nor `Sync`.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use streamweave_opgraph::config::JobConfig;
//! use streamweave_opgraph::descriptors::SystemDescriptor;
//! use streamweave_opgraph::functions::{MapFunction, Message};
//! use streamweave_opgraph::serdes::{NoOpSerde, SerdePair, SerdeRef};
//! use streamweave_opgraph::GraphBuilder;
//!
//! let system = SystemDescriptor::new("kafka");
//! let pageviews = system.input_descriptor("pageviews", Arc::new(NoOpSerde) as SerdeRef);
//!
//! let graph = GraphBuilder::describe(JobConfig::new("views", "1"), |app| {
//!     app.input_stream(&pageviews)?.partition_by(
//!         MapFunction::new(|m: Message| m),
//!         MapFunction::new(|m: Message| m),
//!         SerdePair::of(NoOpSerde, NoOpSerde),
//!         "byUser",
//!     )?;
//!     Ok(())
//! })
//! .unwrap();
//!
//! assert!(graph.input_operator("views-1-partition_by-byUser").is_some());
//! ```

use crate::config::JobConfig;
use crate::descriptors::{InputDescriptor, OutputDescriptor};
use crate::error::{GraphError, Result};
use crate::graph::OperatorSpecGraph;
use crate::naming::NamingAuthority;
use crate::spec::{InputOperatorSpec, OperatorSpec, OutputStream, SpecBody};
use crate::stream::MessageStream;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::debug;

/// Operator table shared by a builder and its stream handles.
pub(crate) struct BuilderState {
    pub(crate) naming: NamingAuthority,
    /// op id -> operator
    operators: BTreeMap<String, OperatorSpec>,
    /// stream id -> op id of the input operator
    input_streams: BTreeMap<String, String>,
    /// stream id -> declared or intermediate output stream
    output_streams: BTreeMap<String, OutputStream>,
}

impl BuilderState {
    fn new(config: &JobConfig) -> Self {
        Self {
            naming: NamingAuthority::new(config),
            operators: BTreeMap::new(),
            input_streams: BTreeMap::new(),
            output_streams: BTreeMap::new(),
        }
    }

    pub(crate) fn ensure_operator_absent(&self, op_id: &str) -> Result<()> {
        if self.operators.contains_key(op_id) {
            return Err(GraphError::DuplicateOperatorId(op_id.to_string()));
        }
        Ok(())
    }

    pub(crate) fn ensure_operator_present(&self, op_id: &str) -> Result<()> {
        if !self.operators.contains_key(op_id) {
            return Err(GraphError::UnknownOperator(op_id.to_string()));
        }
        Ok(())
    }

    pub(crate) fn ensure_stream_absent(&self, stream_id: &str) -> Result<()> {
        if self.input_streams.contains_key(stream_id) || self.output_streams.contains_key(stream_id)
        {
            return Err(GraphError::DuplicateStream(stream_id.to_string()));
        }
        Ok(())
    }

    /// The declared output stream `stream_id`, if any.
    pub(crate) fn output_stream(&self, stream_id: &str) -> Option<&OutputStream> {
        self.output_streams.get(stream_id)
    }

    /// Checks that `spec` can be attached below `parents`, then attaches it.
    pub(crate) fn append(&mut self, parents: &[&str], spec: OperatorSpec) -> Result<()> {
        self.ensure_operator_absent(spec.op_id())?;
        for parent in parents {
            self.ensure_operator_present(parent)?;
        }
        self.attach(parents, spec);
        Ok(())
    }

    /// Inserts `spec` and registers it on every parent. Callers have
    /// validated ids.
    pub(crate) fn attach(&mut self, parents: &[&str], spec: OperatorSpec) {
        let op_id = spec.op_id().to_string();
        debug!(op_id = %op_id, op_code = %spec.op_code(), parents = parents.len(), "registered operator");
        for parent in parents {
            if let Some(parent) = self.operators.get_mut(*parent) {
                parent.register_next(op_id.clone());
            }
        }
        self.operators.insert(op_id, spec);
    }

    /// Registers an input operator. Callers have validated ids.
    pub(crate) fn attach_input(&mut self, op_id: String, input: InputOperatorSpec) {
        self.input_streams
            .insert(input.stream_id().to_string(), op_id.clone());
        self.attach(&[], OperatorSpec::new(op_id, SpecBody::Input(input)));
    }

    pub(crate) fn attach_output(&mut self, stream: OutputStream) {
        self.output_streams
            .insert(stream.stream_id().to_string(), stream);
    }
}

/// Describes one stream application and builds its operator graph.
pub struct GraphBuilder {
    config: JobConfig,
    state: Rc<RefCell<BuilderState>>,
}

impl GraphBuilder {
    /// Creates an empty builder for the given job.
    pub fn new(config: JobConfig) -> Self {
        let state = Rc::new(RefCell::new(BuilderState::new(&config)));
        Self { config, state }
    }

    /// Validates `config`, runs `describe` against a fresh builder and builds
    /// the graph. The first error aborts the whole description.
    pub fn describe<F>(config: JobConfig, describe: F) -> Result<OperatorSpecGraph>
    where
        F: FnOnce(&GraphBuilder) -> Result<()>,
    {
        config.validate()?;
        let builder = GraphBuilder::new(config);
        describe(&builder)?;
        builder.build()
    }

    /// Job identity used for operator ids.
    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Declares an input stream and returns a handle on its input operator.
    ///
    /// # Errors
    ///
    /// - [`GraphError::DuplicateStream`] if the stream is already an input or
    ///   output of this application
    /// - [`GraphError::DuplicateOperatorId`] if the input operator id is taken
    pub fn input_stream(&self, descriptor: &InputDescriptor) -> Result<MessageStream> {
        let mut state = self.state.borrow_mut();
        let stream_id = descriptor.stream_id();
        state.ensure_stream_absent(stream_id)?;
        let op_id = state.naming.input_id(stream_id);
        state.ensure_operator_absent(&op_id)?;

        let serde = descriptor.serde();
        let mut input = InputOperatorSpec::new(
            stream_id,
            serde.key_serde(),
            serde.value_serde(),
            serde.is_keyed(),
        );
        if let Some(transformer) = descriptor.transformer() {
            input = input.with_transformer(transformer.clone());
        }
        state.attach_input(op_id.clone(), input);
        Ok(MessageStream::new(op_id, Rc::clone(&self.state)))
    }

    /// Declares an output stream that handles can `send_to`.
    pub fn output_stream(&self, descriptor: &OutputDescriptor) -> Result<OutputStream> {
        let mut state = self.state.borrow_mut();
        state.ensure_stream_absent(descriptor.stream_id())?;
        let serde = descriptor.serde();
        let stream = OutputStream::new(
            descriptor.stream_id(),
            serde.key_serde(),
            serde.value_serde(),
            serde.is_keyed(),
        );
        state.attach_output(stream.clone());
        Ok(stream)
    }

    /// Number of operators described so far.
    pub fn operator_count(&self) -> usize {
        self.state.borrow().operators.len()
    }

    /// Number of input operators, including repartition inputs.
    pub fn input_stream_count(&self) -> usize {
        self.state.borrow().input_streams.len()
    }

    /// Downstream op ids registered on `op_id`.
    pub fn registered_specs(&self, op_id: &str) -> Option<Vec<String>> {
        self.state
            .borrow()
            .operators
            .get(op_id)
            .map(|spec| spec.registered_specs().to_vec())
    }

    /// Validates the description and assembles the graph.
    ///
    /// The builder keeps its table, so the graph can be rebuilt after further
    /// operators were added.
    pub fn build(&self) -> Result<OperatorSpecGraph> {
        let state = self.state.borrow();
        let specs: Vec<OperatorSpec> = state
            .operators
            .values()
            .map(OperatorSpec::fresh_copy)
            .collect();
        OperatorSpecGraph::assemble(specs)
    }
}
