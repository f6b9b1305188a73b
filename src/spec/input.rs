//! Input operator: an entry point of the graph bound to one stream.

use crate::functions::MapFunction;
use crate::serdes::SerdeRef;

/// Entry point reading `stream_id`.
///
/// Serdes left as `None` are resolved from the system default by the runtime.
/// An optional input transformer runs on every incoming message before it
/// reaches the registered operators. A transformer that is also a scheduled or
/// watermark function gives the input operator that capability.
#[derive(Clone, Debug)]
pub struct InputOperatorSpec {
    stream_id: String,
    key_serde: Option<SerdeRef>,
    value_serde: Option<SerdeRef>,
    keyed: bool,
    transformer: Option<MapFunction>,
}

impl InputOperatorSpec {
    /// Creates an input without a transformer.
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
            transformer: None,
        }
    }

    /// Attaches an input transformer.
    pub fn with_transformer(mut self, transformer: MapFunction) -> Self {
        self.transformer = Some(transformer);
        self
    }

    /// Stream this operator reads.
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

    /// Input transformer, if one was attached.
    pub fn transformer(&self) -> Option<&MapFunction> {
        self.transformer.as_ref()
    }
}
