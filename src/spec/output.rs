//! Output streams and the terminal operators writing to them.

use crate::functions::SinkFunction;
use crate::serdes::SerdeRef;
use std::sync::Arc;

fn same_serde(a: Option<&SerdeRef>, b: Option<&SerdeRef>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// A stream the application writes to.
///
/// Intermediate streams are created by `partition_by` and read back by the
/// same application; all others are declared through an output descriptor.
#[derive(Clone, Debug)]
pub struct OutputStream {
    stream_id: String,
    key_serde: Option<SerdeRef>,
    value_serde: Option<SerdeRef>,
    keyed: bool,
    intermediate: bool,
}

impl OutputStream {
    /// A stream declared by the user.
    pub fn new(
        stream_id: impl Into<String>,
        key_serde: Option<SerdeRef>,
        value_serde: Option<SerdeRef>,
        keyed: bool,
    ) -> Self {
        Self {
            stream_id: stream_id.into(),
            key_serde,
            value_serde,
            keyed,
            intermediate: false,
        }
    }

    /// A keyed stream written and read by the same application.
    pub fn intermediate(
        stream_id: impl Into<String>,
        key_serde: Option<SerdeRef>,
        value_serde: Option<SerdeRef>,
    ) -> Self {
        Self {
            stream_id: stream_id.into(),
            key_serde,
            value_serde,
            keyed: true,
            intermediate: true,
        }
    }

    /// Stream id, unique among the application's streams.
    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    /// Key serde; `None` defers to the system default.
    pub fn key_serde(&self) -> Option<&SerdeRef> {
        self.key_serde.as_ref()
    }

    /// Value serde; `None` defers to the system default.
    pub fn value_serde(&self) -> Option<&SerdeRef> {
        self.value_serde.as_ref()
    }

    /// Whether messages are key/value pairs.
    pub fn is_keyed(&self) -> bool {
        self.keyed
    }

    /// Whether the stream was created by `partition_by`.
    pub fn is_intermediate(&self) -> bool {
        self.intermediate
    }

    /// Whether `other` is a handle on this very stream: same id and kind and
    /// the same serde instances.
    pub fn is_same_stream(&self, other: &OutputStream) -> bool {
        self.stream_id == other.stream_id
            && self.keyed == other.keyed
            && self.intermediate == other.intermediate
            && same_serde(self.key_serde(), other.key_serde())
            && same_serde(self.value_serde(), other.value_serde())
    }
}

/// Hands every message to a user callback.
#[derive(Clone, Debug)]
pub struct SinkOperatorSpec {
    sink_fn: SinkFunction,
}

impl SinkOperatorSpec {
    /// Wraps `sink_fn`.
    pub fn new(sink_fn: SinkFunction) -> Self {
        Self { sink_fn }
    }

    /// The user sink function.
    pub fn sink_fn(&self) -> &SinkFunction {
        &self.sink_fn
    }
}

/// Writes every message to an output stream.
#[derive(Clone, Debug)]
pub struct OutputOperatorSpec {
    output_stream: OutputStream,
}

impl OutputOperatorSpec {
    /// Writes to `output_stream`.
    pub fn new(output_stream: OutputStream) -> Self {
        Self { output_stream }
    }

    /// The stream written to.
    pub fn output_stream(&self) -> &OutputStream {
        &self.output_stream
    }
}
