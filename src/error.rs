//! # Error Handling
//!
//! Every failure in graph construction is synchronous and fatal to the
//! description being built: there is no per-message error channel and no
//! local recovery. Errors surface at the call that violated the rule
//! (`partition_by`, `input_stream`, ...) or at graph assembly time.
//!
//! ## Error Kinds
//!
//! - **Capability**: a user function carries a capability the operator cannot honour
//! - **Identity**: duplicate operator or stream ids, malformed operator names
//! - **Structure**: cycles, dangling edges, intermediate streams without a consumer
//! - **Configuration**: missing or empty job identity

use crate::config::ConfigError;
use crate::naming::OpCode;
use std::fmt;

/// Optional capability a user function may implement next to its primary
/// transform.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Capability {
    /// Timer callbacks registered through a [`Scheduler`](crate::functions::Scheduler).
    Scheduled,
    /// Output-watermark tracking.
    Watermark,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Scheduled => f.write_str("ScheduledFunction"),
            Capability::Watermark => f.write_str("WatermarkFunction"),
        }
    }
}

/// Argument position of a function passed to an operator.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FunctionRole {
    /// The key extractor of a repartition or keyed window.
    Key,
    /// The value extractor of a repartition.
    Value,
}

impl fmt::Display for FunctionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionRole::Key => f.write_str("key"),
            FunctionRole::Value => f.write_str("value"),
        }
    }
}

/// Error type for operator graph construction.
#[derive(thiserror::Error, Debug)]
pub enum GraphError {
    /// A function supplied to an operator implements a capability the
    /// operator would silently never invoke.
    #[error("{role} function for {operator} must not be a {capability}")]
    InvalidCapability {
        /// Operator the function was passed to.
        operator: OpCode,
        /// Which argument carried the capability.
        role: FunctionRole,
        /// The offending capability.
        capability: Capability,
    },
    /// The computed operator id already exists in the graph.
    #[error("found duplicate operator id {0} in the graph, operator ids must be unique")]
    DuplicateOperatorId(String),
    /// A stream id was registered twice as input or output.
    #[error("stream {0} is already registered in this application")]
    DuplicateStream(String),
    /// A user-supplied operator name contains characters outside `[A-Za-z0-9_-]`.
    #[error("operator name must not contain spaces or special characters: {0:?}")]
    InvalidOperatorName(String),
    /// Traversal found a cycle; the payload is the offending path.
    #[error("cycle detected in operator graph: {0}")]
    Cycle(String),
    /// An operator registers a downstream operator that is not part of the graph.
    #[error("operator {from} registers unknown operator {to}")]
    DanglingEdge {
        /// Upstream operator id.
        from: String,
        /// Missing downstream operator id.
        to: String,
    },
    /// A repartition writes to a stream nobody reads back.
    #[error("intermediate stream {0} has no input operator")]
    MissingIntermediateInput(String),
    /// A stream handle points at an operator that no longer exists.
    #[error("unknown operator {0}")]
    UnknownOperator(String),
    /// `join` was called with the same stream on both sides.
    #[error("cannot join a message stream with itself")]
    SelfJoin,
    /// A stream handle from a different [`GraphBuilder`](crate::GraphBuilder) was passed in.
    #[error("message stream {0} belongs to a different application")]
    ForeignStream(String),
    /// Job configuration is incomplete.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result alias for graph construction.
pub type Result<T> = std::result::Result<T, GraphError>;
