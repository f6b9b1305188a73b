//! Two-stream join.

use crate::functions::JoinFunction;
use crate::serdes::SerdeRef;
use std::time::Duration;

/// Serdes of the join's state stores. `None` means system default.
#[derive(Clone, Debug, Default)]
pub struct JoinSerdes {
    /// Serde of the join key.
    pub key: Option<SerdeRef>,
    /// Serde of messages from the first stream.
    pub message: Option<SerdeRef>,
    /// Serde of messages from the second stream.
    pub other_message: Option<SerdeRef>,
}

/// Joins messages from two upstream operators sharing a key within `ttl`.
///
/// The spec is registered as a downstream of both inputs; `left_op_id` and
/// `right_op_id` tell the runtime which side a message arrived on.
#[derive(Clone, Debug)]
pub struct JoinOperatorSpec {
    left_op_id: String,
    right_op_id: String,
    join_fn: JoinFunction,
    serdes: JoinSerdes,
    ttl: Duration,
}

impl JoinOperatorSpec {
    /// Joins the operators `left_op_id` and `right_op_id`.
    pub fn new(
        left_op_id: impl Into<String>,
        right_op_id: impl Into<String>,
        join_fn: JoinFunction,
        serdes: JoinSerdes,
        ttl: Duration,
    ) -> Self {
        Self {
            left_op_id: left_op_id.into(),
            right_op_id: right_op_id.into(),
            join_fn,
            serdes,
            ttl,
        }
    }

    /// Op id of the left input.
    pub fn left_op_id(&self) -> &str {
        &self.left_op_id
    }

    /// Op id of the right input.
    pub fn right_op_id(&self) -> &str {
        &self.right_op_id
    }

    /// The user join function.
    pub fn join_fn(&self) -> &JoinFunction {
        &self.join_fn
    }

    /// Serdes of the join state stores.
    pub fn serdes(&self) -> &JoinSerdes {
        &self.serdes
    }

    /// How long a message waits for its counterpart.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
