//! # Repartition Write Side
//!
//! A [`PartitionByOperatorSpec`] re-keys every message it receives and writes
//! the resulting key/value pair to an intermediate stream. The stream id of
//! that stream is the operator's own id; the application reads it back
//! through an input operator with the same stream id.
//!
//! The key and value functions run fused into the write path rather than as
//! operators of their own. The runtime would therefore never register their
//! timers or track their watermarks, so functions carrying either capability
//! are rejected when the spec is created.

use crate::error::{FunctionRole, GraphError};
use crate::functions::{Capabilities, MapFunction, Message, ScheduledFunction, WatermarkFunction};
use crate::naming::OpCode;
use crate::serdes::SerdeRef;
use crate::spec::output::OutputStream;
use std::sync::Arc;

/// Fails if `capabilities` holds anything besides the plain transform.
pub fn ensure_plain(
    operator: OpCode,
    role: FunctionRole,
    capabilities: &Capabilities,
) -> Result<(), GraphError> {
    match capabilities.present().first() {
        Some(&capability) => Err(GraphError::InvalidCapability {
            operator,
            role,
            capability,
        }),
        None => Ok(()),
    }
}

/// Write side of a repartition boundary.
#[derive(Clone, Debug)]
pub struct PartitionByOperatorSpec {
    key_function: MapFunction,
    value_function: MapFunction,
    output_stream: OutputStream,
}

impl PartitionByOperatorSpec {
    /// Creates the spec after checking that both functions are plain transforms.
    pub fn new(
        key_function: MapFunction,
        value_function: MapFunction,
        output_stream: OutputStream,
    ) -> Result<Self, GraphError> {
        ensure_plain(
            OpCode::PartitionBy,
            FunctionRole::Key,
            key_function.capabilities(),
        )?;
        ensure_plain(
            OpCode::PartitionBy,
            FunctionRole::Value,
            value_function.capabilities(),
        )?;
        Ok(Self {
            key_function,
            value_function,
            output_stream,
        })
    }

    /// Extracts the new key.
    pub fn key_function(&self) -> &MapFunction {
        &self.key_function
    }

    /// Extracts the new value.
    pub fn value_function(&self) -> &MapFunction {
        &self.value_function
    }

    /// The intermediate stream written by this operator.
    pub fn output_stream(&self) -> &OutputStream {
        &self.output_stream
    }

    /// Key serde of the intermediate stream.
    pub fn key_serde(&self) -> Option<&SerdeRef> {
        self.output_stream.key_serde()
    }

    /// Value serde of the intermediate stream.
    pub fn value_serde(&self) -> Option<&SerdeRef> {
        self.output_stream.value_serde()
    }

    /// Always `None`.
    pub fn scheduled_fn(&self) -> Option<&Arc<dyn ScheduledFunction>> {
        None
    }

    /// Always `None`.
    pub fn watermark_fn(&self) -> Option<&Arc<dyn WatermarkFunction>> {
        None
    }

    /// Splits a message into the key/value pair written downstream.
    pub fn extract(&self, message: Message) -> (Message, Message) {
        let key = self.key_function.apply(message.clone());
        let value = self.value_function.apply(message);
        (key, value)
    }
}
