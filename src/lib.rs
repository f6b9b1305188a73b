//! # StreamWeave OpGraph
//!
//! Construction layer of the StreamWeave dataflow engine: describes a stream
//! application as a DAG of operator specs before anything runs.
//!
//! A [`GraphBuilder`] hands out [`MessageStream`] handles for declared input
//! streams. Transformations on a handle append operators to the graph;
//! [`MessageStream::partition_by`] splices in a repartition boundary made of a
//! write to an intermediate stream and an input reading it back. The finished
//! description is validated into an [`OperatorSpecGraph`], and every task
//! executing the application works on its own [`Clone`] of it.
//!
//! ## Key Features
//!
//! - **Deterministic Ids**: operator ids are derived from job name, job id,
//!   operator kind and a user name, so they match across restarts
//! - **Capability Checks**: functions whose timers or watermarks would never be
//!   invoked are rejected when the operator is declared
//! - **Independent Clones**: per-task copies share stateless functions and
//!   start with empty window state
//!
//! ## Quick Start
//!
//! ```rust
//! use streamweave_opgraph::config::JobConfig;
//! use streamweave_opgraph::descriptors::SystemDescriptor;
//! use streamweave_opgraph::functions::{MapFunction, Message};
//! use streamweave_opgraph::serdes::{SerdePair, StringSerde};
//! use streamweave_opgraph::GraphBuilder;
//!
//! let kafka = SystemDescriptor::new("kafka");
//! let clicks = kafka.input_descriptor("clicks", SerdePair::of(StringSerde, StringSerde));
//! let out = kafka.output_descriptor("clicks-by-user", SerdePair::of(StringSerde, StringSerde));
//!
//! let graph = GraphBuilder::describe(JobConfig::new("clicks", "1"), |app| {
//!     let output = app.output_stream(&out)?;
//!     app.input_stream(&clicks)?
//!         .partition_by(
//!             MapFunction::new(|m: Message| m),
//!             MapFunction::new(|m: Message| m),
//!             SerdePair::of(StringSerde, StringSerde),
//!             "byUser",
//!         )?
//!         .send_to(&output)
//! })
//! .unwrap();
//!
//! assert_eq!(graph.input_operator_count(), 2);
//! let per_task = graph.clone();
//! assert_eq!(per_task.topological_order(), graph.topological_order());
//! ```

#![deny(missing_docs)]

/// Per-task deep copies of an operator graph.
pub mod cloner;
/// Job identity configuration.
pub mod config;
/// Input and output stream descriptors.
pub mod descriptors;
/// Error types for graph construction.
pub mod error;
/// Functions, capabilities and the message type.
pub mod functions;
/// The assembled operator DAG.
pub mod graph;
/// Fluent construction of operator graphs.
pub mod graph_builder;
/// `tracing` subscriber setup.
pub mod logging;
/// Deterministic operator ids.
pub mod naming;
/// Partition keys.
pub mod partitioning;
/// Key and value serdes.
pub mod serdes;
/// Operator specs, one module per operator kind.
pub mod spec;
/// Stream handles returned while describing a pipeline.
pub mod stream;

pub use config::JobConfig;
pub use error::{GraphError, Result};
pub use graph::OperatorSpecGraph;
pub use graph_builder::GraphBuilder;
pub use stream::MessageStream;

#[cfg(test)]
mod graph_test;
#[cfg(test)]
mod stream_test;
