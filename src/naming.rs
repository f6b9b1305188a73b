//! # Operator Naming
//!
//! Operator and intermediate stream ids are derived, never random:
//!
//! ```text
//! <jobName>-<jobId>-<opCode>-<name>
//! ```
//!
//! Re-describing the same pipeline must produce the same ids so that state
//! persisted per operator can be re-attached after a restart. `name` is either
//! supplied by the user or, for operators that do not need a stable handle,
//! the position of the operator in the description.

use crate::config::JobConfig;
use crate::error::GraphError;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Kind tag of an operator, used in ids and logs.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum OpCode {
    /// Entry point bound to a stream.
    Input,
    /// One-to-one transform.
    Map,
    /// One-to-many transform.
    FlatMap,
    /// Predicate.
    Filter,
    /// Terminal user callback.
    Sink,
    /// Terminal write to an output stream.
    SendTo,
    /// Union of several streams.
    Merge,
    /// Write side of a repartition.
    PartitionBy,
    /// Keyed window aggregation.
    Window,
    /// Two-stream join.
    Join,
}

impl OpCode {
    /// Returns the tag used in operator ids.
    pub fn as_str(&self) -> &'static str {
        match self {
            OpCode::Input => "input",
            OpCode::Map => "map",
            OpCode::FlatMap => "flat_map",
            OpCode::Filter => "filter",
            OpCode::Sink => "sink",
            OpCode::SendTo => "send_to",
            OpCode::Merge => "merge",
            OpCode::PartitionBy => "partition_by",
            OpCode::Window => "window",
            OpCode::Join => "join",
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formats an operator id. Pure: identical inputs give identical ids.
pub fn operator_id(job_name: &str, job_id: &str, op_code: OpCode, name: &str) -> String {
    format!("{}-{}-{}-{}", job_name, job_id, op_code.as_str(), name)
}

static NAME_PATTERN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$"));

/// Returns true if `name` is a legal user-supplied operator name.
pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN
        .as_ref()
        .is_ok_and(|pattern| pattern.is_match(name))
}

/// Allocates operator ids for one application description.
///
/// Collision detection is left to the caller, which owns the operator table.
#[derive(Clone, Debug)]
pub struct NamingAuthority {
    job_name: String,
    job_id: String,
    next_op_num: u32,
}

impl NamingAuthority {
    /// Creates an authority for the given job identity.
    pub fn new(config: &JobConfig) -> Self {
        Self {
            job_name: config.job_name.clone(),
            job_id: config.job_id.clone(),
            next_op_num: 0,
        }
    }

    /// Id for an operator with a user-supplied name.
    ///
    /// The name is trimmed and must match `[A-Za-z0-9_-]+`.
    pub fn named_id(&self, op_code: OpCode, name: &str) -> Result<String, GraphError> {
        let name = name.trim();
        if !is_valid_name(name) {
            return Err(GraphError::InvalidOperatorName(name.to_string()));
        }
        Ok(operator_id(&self.job_name, &self.job_id, op_code, name))
    }

    /// Id for an operator without a user-supplied name.
    ///
    /// Uses the position in the description, so it is stable only as long as
    /// the pipeline is described in the same order.
    pub fn next_id(&mut self, op_code: OpCode) -> String {
        let id = operator_id(
            &self.job_name,
            &self.job_id,
            op_code,
            &self.next_op_num.to_string(),
        );
        self.next_op_num += 1;
        id
    }

    /// Id of the input operator reading `stream_id`.
    pub fn input_id(&self, stream_id: &str) -> String {
        operator_id(&self.job_name, &self.job_id, OpCode::Input, stream_id)
    }
}
