//! Stateless one-input operators: map, filter and flat map.

use crate::functions::{Capabilities, FilterFunction, FlatMapFunction, MapFunction, Message};
use crate::naming::OpCode;

/// The user function of a [`StreamOperatorSpec`].
#[derive(Clone, Debug)]
pub enum TransformFunction {
    /// Replaces each message.
    Map(MapFunction),
    /// Keeps messages matching a predicate.
    Filter(FilterFunction),
    /// Replaces each message by zero or more messages.
    FlatMap(FlatMapFunction),
}

impl TransformFunction {
    /// Operator code matching the function kind.
    pub fn op_code(&self) -> OpCode {
        match self {
            TransformFunction::Map(_) => OpCode::Map,
            TransformFunction::Filter(_) => OpCode::Filter,
            TransformFunction::FlatMap(_) => OpCode::FlatMap,
        }
    }

    /// Capabilities of the wrapped function.
    pub fn capabilities(&self) -> &Capabilities {
        match self {
            TransformFunction::Map(f) => f.capabilities(),
            TransformFunction::Filter(f) => f.capabilities(),
            TransformFunction::FlatMap(f) => f.capabilities(),
        }
    }

    /// Applies the function as a flat map: a map emits one message, a filter
    /// zero or one.
    pub fn apply(&self, message: Message) -> Vec<Message> {
        match self {
            TransformFunction::Map(f) => vec![f.apply(message)],
            TransformFunction::Filter(f) => {
                if f.apply(&message) {
                    vec![message]
                } else {
                    Vec::new()
                }
            }
            TransformFunction::FlatMap(f) => f.apply(message),
        }
    }
}

/// Map, filter or flat map operator.
#[derive(Clone, Debug)]
pub struct StreamOperatorSpec {
    transform: TransformFunction,
}

impl StreamOperatorSpec {
    /// Wraps `transform`.
    pub fn new(transform: TransformFunction) -> Self {
        Self { transform }
    }

    /// The wrapped user function.
    pub fn transform(&self) -> &TransformFunction {
        &self.transform
    }

    /// Operator code matching the function kind.
    pub fn op_code(&self) -> OpCode {
        self.transform.op_code()
    }
}
