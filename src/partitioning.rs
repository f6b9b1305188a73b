//! # Partition Keys
//!
//! Keys produced by repartition, window and join functions. A key is the
//! string form of whatever the user's key function returned; operators use it
//! to group messages and the runtime hashes it to pick a partition.

use crate::functions::Message;
use std::fmt;

/// Key that groups messages within a partitioned stream.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PartitionKey(pub String);

impl PartitionKey {
    /// Creates a new partition key from a string.
    pub fn new(s: String) -> Self {
        Self(s)
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derives a key from a message produced by a key function.
    ///
    /// Strings and integers are supported; anything else yields `None`.
    pub fn from_message(message: &Message) -> Option<Self> {
        if let Some(s) = message.downcast_ref::<String>() {
            return Some(Self(s.clone()));
        }
        if let Some(s) = message.downcast_ref::<&'static str>() {
            return Some(Self((*s).to_string()));
        }
        if let Some(key) = message.downcast_ref::<PartitionKey>() {
            return Some(key.clone());
        }
        if let Some(n) = message.downcast_ref::<i64>() {
            return Some(Self(n.to_string()));
        }
        if let Some(n) = message.downcast_ref::<u64>() {
            return Some(Self(n.to_string()));
        }
        if let Some(n) = message.downcast_ref::<i32>() {
            return Some(Self(n.to_string()));
        }
        message.downcast_ref::<u32>().map(|n| Self(n.to_string()))
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PartitionKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PartitionKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
