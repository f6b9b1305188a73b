//! # Serdes
//!
//! Key and value codecs attached to streams. The graph layer only threads
//! serde references through; encoding happens in the runtime. A stream's
//! serde is either a key/value pair ([`KvSerde`]) or left unconfigured, in
//! which case the runtime resolves a system default later.

use crate::functions::{Message, message};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Error type for serde operations.
#[derive(thiserror::Error, Debug)]
pub enum SerdeError {
    /// The serde does not handle this payload type.
    #[error("{serde} cannot handle payload: {reason}")]
    Unsupported {
        /// Serde name.
        serde: &'static str,
        /// What went wrong.
        reason: String,
    },
    /// JSON encoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// Bytes were not valid UTF-8.
    #[error("utf-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Codec between [`Message`]s and bytes.
pub trait Serde: Send + Sync + fmt::Debug {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Encodes a message.
    fn to_bytes(&self, message: &Message) -> Result<Vec<u8>, SerdeError>;

    /// Decodes a message.
    fn from_bytes(&self, bytes: &[u8]) -> Result<Message, SerdeError>;

    /// Access to the concrete type.
    fn as_any(&self) -> &dyn Any;
}

/// Shared serde reference.
pub type SerdeRef = Arc<dyn Serde>;

/// Marker serde for streams whose messages never leave the process in
/// serialized form. Refuses to encode or decode.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpSerde;

impl Serde for NoOpSerde {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn to_bytes(&self, _message: &Message) -> Result<Vec<u8>, SerdeError> {
        Err(SerdeError::Unsupported {
            serde: self.name(),
            reason: "NoOpSerde must not be used to serialize".to_string(),
        })
    }

    fn from_bytes(&self, _bytes: &[u8]) -> Result<Message, SerdeError> {
        Err(SerdeError::Unsupported {
            serde: self.name(),
            reason: "NoOpSerde must not be used to deserialize".to_string(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// UTF-8 strings.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringSerde;

impl Serde for StringSerde {
    fn name(&self) -> &'static str {
        "string"
    }

    fn to_bytes(&self, message: &Message) -> Result<Vec<u8>, SerdeError> {
        message
            .downcast_ref::<String>()
            .map(|s| s.as_bytes().to_vec())
            .ok_or(SerdeError::Unsupported {
                serde: "string",
                reason: "payload is not a String".to_string(),
            })
    }

    fn from_bytes(&self, bytes: &[u8]) -> Result<Message, SerdeError> {
        Ok(message(String::from_utf8(bytes.to_vec())?))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// JSON documents carried as `serde_json::Value`.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonSerde;

impl Serde for JsonSerde {
    fn name(&self) -> &'static str {
        "json"
    }

    fn to_bytes(&self, message: &Message) -> Result<Vec<u8>, SerdeError> {
        let value = message
            .downcast_ref::<serde_json::Value>()
            .ok_or(SerdeError::Unsupported {
                serde: "json",
                reason: "payload is not a serde_json::Value".to_string(),
            })?;
        Ok(serde_json::to_vec(value)?)
    }

    fn from_bytes(&self, bytes: &[u8]) -> Result<Message, SerdeError> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        Ok(message(value))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A key serde and a value serde.
#[derive(Clone, Debug)]
pub struct KvSerde {
    key: SerdeRef,
    value: SerdeRef,
}

impl KvSerde {
    /// Pairs a key and a value serde.
    pub fn of(key: impl Serde + 'static, value: impl Serde + 'static) -> Self {
        Self {
            key: Arc::new(key),
            value: Arc::new(value),
        }
    }

    /// Pairs already shared serdes.
    pub fn from_refs(key: SerdeRef, value: SerdeRef) -> Self {
        Self { key, value }
    }

    /// Key serde.
    pub fn key_serde(&self) -> &SerdeRef {
        &self.key
    }

    /// Value serde.
    pub fn value_serde(&self) -> &SerdeRef {
        &self.value
    }
}

/// Serde configuration of a keyed stream.
#[derive(Clone, Debug, Default)]
pub enum SerdePair {
    /// Explicit key and value serdes.
    Configured(KvSerde),
    /// Resolved from the system default later.
    #[default]
    Unconfigured,
}

impl SerdePair {
    /// Shorthand for `SerdePair::Configured(KvSerde::of(key, value))`.
    pub fn of(key: impl Serde + 'static, value: impl Serde + 'static) -> Self {
        SerdePair::Configured(KvSerde::of(key, value))
    }

    /// The unconfigured placeholder.
    pub fn unconfigured() -> Self {
        SerdePair::Unconfigured
    }

    /// Key serde, if configured.
    pub fn key_serde(&self) -> Option<SerdeRef> {
        match self {
            SerdePair::Configured(kv) => Some(kv.key.clone()),
            SerdePair::Unconfigured => None,
        }
    }

    /// Value serde, if configured.
    pub fn value_serde(&self) -> Option<SerdeRef> {
        match self {
            SerdePair::Configured(kv) => Some(kv.value.clone()),
            SerdePair::Unconfigured => None,
        }
    }
}

/// Returns true if `serde` is an instance of `T`.
pub fn is_serde<T: Serde + 'static>(serde: &SerdeRef) -> bool {
    serde.as_any().is::<T>()
}
