//! Input and output stream descriptors.
//!
//! A descriptor names a stream within a system and carries its serde. The
//! graph treats the stream id as an opaque key; resolving it to physical
//! topics or partitions happens elsewhere.

use crate::functions::MapFunction;
use crate::serdes::{SerdePair, SerdeRef};

/// Serde declared on a stream descriptor.
#[derive(Clone, Debug)]
pub enum StreamSerde {
    /// Messages are key/value pairs; the stream is keyed.
    Kv(SerdePair),
    /// Messages are plain values; the stream is not keyed.
    Value(SerdeRef),
}

impl StreamSerde {
    /// Whether messages on the stream are key/value pairs.
    pub fn is_keyed(&self) -> bool {
        matches!(self, StreamSerde::Kv(_))
    }

    /// Key serde, if any.
    pub fn key_serde(&self) -> Option<SerdeRef> {
        match self {
            StreamSerde::Kv(pair) => pair.key_serde(),
            StreamSerde::Value(_) => None,
        }
    }

    /// Value serde, if any.
    pub fn value_serde(&self) -> Option<SerdeRef> {
        match self {
            StreamSerde::Kv(pair) => pair.value_serde(),
            StreamSerde::Value(serde) => Some(serde.clone()),
        }
    }
}

impl From<SerdePair> for StreamSerde {
    fn from(pair: SerdePair) -> Self {
        StreamSerde::Kv(pair)
    }
}

impl From<SerdeRef> for StreamSerde {
    fn from(serde: SerdeRef) -> Self {
        StreamSerde::Value(serde)
    }
}

/// A messaging system streams are read from and written to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SystemDescriptor {
    system_name: String,
}

impl SystemDescriptor {
    /// Creates a descriptor for the named system.
    pub fn new(system_name: impl Into<String>) -> Self {
        Self {
            system_name: system_name.into(),
        }
    }

    /// System name.
    pub fn system_name(&self) -> &str {
        &self.system_name
    }

    /// Describes a stream read from this system.
    pub fn input_descriptor(
        &self,
        stream_id: impl Into<String>,
        serde: impl Into<StreamSerde>,
    ) -> InputDescriptor {
        InputDescriptor {
            stream_id: stream_id.into(),
            system_name: self.system_name.clone(),
            serde: serde.into(),
            transformer: None,
        }
    }

    /// Describes a stream written to this system.
    pub fn output_descriptor(
        &self,
        stream_id: impl Into<String>,
        serde: impl Into<StreamSerde>,
    ) -> OutputDescriptor {
        OutputDescriptor {
            stream_id: stream_id.into(),
            system_name: self.system_name.clone(),
            serde: serde.into(),
        }
    }
}

/// A stream the application reads.
#[derive(Clone, Debug)]
pub struct InputDescriptor {
    stream_id: String,
    system_name: String,
    serde: StreamSerde,
    transformer: Option<MapFunction>,
}

impl InputDescriptor {
    /// Applies `transformer` to every incoming message before it reaches the
    /// first operator.
    pub fn with_transformer(mut self, transformer: MapFunction) -> Self {
        self.transformer = Some(transformer);
        self
    }

    /// Input transformer, if one was set.
    pub fn transformer(&self) -> Option<&MapFunction> {
        self.transformer.as_ref()
    }

    /// Stream id.
    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    /// Owning system.
    pub fn system_name(&self) -> &str {
        &self.system_name
    }

    /// Declared serde.
    pub fn serde(&self) -> &StreamSerde {
        &self.serde
    }
}

/// A stream the application writes.
#[derive(Clone, Debug)]
pub struct OutputDescriptor {
    stream_id: String,
    system_name: String,
    serde: StreamSerde,
}

impl OutputDescriptor {
    /// Stream id.
    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    /// Owning system.
    pub fn system_name(&self) -> &str {
        &self.system_name
    }

    /// Declared serde.
    pub fn serde(&self) -> &StreamSerde {
        &self.serde
    }
}
