//! # User Functions
//!
//! Operators are parameterised by user functions over type-erased
//! [`Message`]s. Besides its primary transform, a function may implement two
//! optional capabilities:
//!
//! - [`ScheduledFunction`]: registers timer callbacks with the runtime
//! - [`WatermarkFunction`]: tracks and emits output watermarks
//!
//! The runtime has to bind both to a concrete operator instance. Instead of
//! probing a function's type at registration time, every wrapper
//! ([`MapFunction`], [`FilterFunction`], ...) carries a [`Capabilities`]
//! descriptor filled in by the constructor that was used:
//!
//! ```rust
//! use streamweave_opgraph::functions::{message, MapFunction, Message};
//!
//! let key_fn = MapFunction::new(|m: Message| {
//!     message(m.downcast_ref::<String>().cloned().unwrap_or_default())
//! });
//! assert!(key_fn.capabilities().is_plain());
//! ```
//!
//! Functions are shared by `Arc` between a graph and its clones and must be
//! free of per-instance mutable state.

use crate::error::Capability;
use crate::partitioning::PartitionKey;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Type-erased payload flowing between operators.
pub type Message = Arc<dyn Any + Send + Sync>;

/// Wraps a value into a [`Message`].
pub fn message<T: Any + Send + Sync>(value: T) -> Message {
    Arc::new(value)
}

/// Registration interface handed to [`ScheduledFunction::schedule`].
pub trait Scheduler {
    /// Requests a callback for `key` at `timestamp` (ms since epoch).
    fn schedule(&mut self, key: String, timestamp: u64);
}

/// Capability: the function owns timers.
pub trait ScheduledFunction: Send + Sync {
    /// Registers the initial timers.
    fn schedule(&self, scheduler: &mut dyn Scheduler);

    /// Invoked when a timer for `key` fires; returns messages to emit.
    fn on_callback(&self, key: &str, timestamp: u64) -> Vec<Message>;
}

/// Capability: the function participates in watermark propagation.
pub trait WatermarkFunction: Send + Sync {
    /// Processes an input watermark; returns messages to emit.
    fn process_watermark(&self, watermark: u64) -> Vec<Message>;

    /// Current output watermark, if the function overrides it.
    fn output_watermark(&self) -> Option<u64>;
}

/// Optional capabilities attached to a user function.
#[derive(Clone, Default)]
pub struct Capabilities {
    scheduled: Option<Arc<dyn ScheduledFunction>>,
    watermark: Option<Arc<dyn WatermarkFunction>>,
}

impl Capabilities {
    /// The timer capability, if present.
    pub fn scheduled(&self) -> Option<&Arc<dyn ScheduledFunction>> {
        self.scheduled.as_ref()
    }

    /// The watermark capability, if present.
    pub fn watermark(&self) -> Option<&Arc<dyn WatermarkFunction>> {
        self.watermark.as_ref()
    }

    /// True if neither capability is present.
    pub fn is_plain(&self) -> bool {
        self.scheduled.is_none() && self.watermark.is_none()
    }

    /// Capabilities present, scheduled first.
    pub fn present(&self) -> Vec<Capability> {
        let mut present = Vec::new();
        if self.scheduled.is_some() {
            present.push(Capability::Scheduled);
        }
        if self.watermark.is_some() {
            present.push(Capability::Watermark);
        }
        present
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("scheduled", &self.scheduled.is_some())
            .field("watermark", &self.watermark.is_some())
            .finish()
    }
}

/// Message to message transform.
pub trait MapFn: Send + Sync {
    /// Transforms one message.
    fn apply(&self, message: Message) -> Message;
}

impl<F> MapFn for F
where
    F: Fn(Message) -> Message + Send + Sync,
{
    fn apply(&self, message: Message) -> Message {
        self(message)
    }
}

/// Predicate over messages.
pub trait FilterFn: Send + Sync {
    /// Returns true to keep the message.
    fn apply(&self, message: &Message) -> bool;
}

impl<F> FilterFn for F
where
    F: Fn(&Message) -> bool + Send + Sync,
{
    fn apply(&self, message: &Message) -> bool {
        self(message)
    }
}

/// Message to zero or more messages.
pub trait FlatMapFn: Send + Sync {
    /// Transforms one message.
    fn apply(&self, message: Message) -> Vec<Message>;
}

impl<F> FlatMapFn for F
where
    F: Fn(Message) -> Vec<Message> + Send + Sync,
{
    fn apply(&self, message: Message) -> Vec<Message> {
        self(message)
    }
}

/// Terminal callback.
pub trait SinkFn: Send + Sync {
    /// Consumes one message.
    fn apply(&self, message: Message);
}

impl<F> SinkFn for F
where
    F: Fn(Message) + Send + Sync,
{
    fn apply(&self, message: Message) {
        self(message)
    }
}

/// Joins a message with a message from the other stream sharing its key.
pub trait JoinFn: Send + Sync {
    /// Combines a message from this stream with one from the other stream.
    fn apply(&self, message: Message, other: Message) -> Message;

    /// Join key of a message from this stream.
    fn first_key(&self, message: &Message) -> PartitionKey;

    /// Join key of a message from the other stream.
    fn second_key(&self, message: &Message) -> PartitionKey;
}

macro_rules! user_function {
    ($(#[$doc:meta])* $name:ident, $fn_trait:ident) => {
        $(#[$doc])*
        #[derive(Clone)]
        pub struct $name {
            inner: Arc<dyn $fn_trait>,
            capabilities: Capabilities,
        }

        impl $name {
            /// Wraps a function without optional capabilities.
            pub fn new<F: $fn_trait + 'static>(function: F) -> Self {
                Self {
                    inner: Arc::new(function),
                    capabilities: Capabilities::default(),
                }
            }

            /// Wraps a function that also owns timers.
            pub fn scheduled<F>(function: F) -> Self
            where
                F: $fn_trait + ScheduledFunction + 'static,
            {
                let function = Arc::new(function);
                Self {
                    inner: function.clone() as Arc<dyn $fn_trait>,
                    capabilities: Capabilities {
                        scheduled: Some(function as Arc<dyn ScheduledFunction>),
                        watermark: None,
                    },
                }
            }

            /// Wraps a function that also tracks watermarks.
            pub fn watermarked<F>(function: F) -> Self
            where
                F: $fn_trait + WatermarkFunction + 'static,
            {
                let function = Arc::new(function);
                Self {
                    inner: function.clone() as Arc<dyn $fn_trait>,
                    capabilities: Capabilities {
                        scheduled: None,
                        watermark: Some(function as Arc<dyn WatermarkFunction>),
                    },
                }
            }

            /// Wraps a function implementing both capabilities.
            pub fn scheduled_watermarked<F>(function: F) -> Self
            where
                F: $fn_trait + ScheduledFunction + WatermarkFunction + 'static,
            {
                let function = Arc::new(function);
                Self {
                    inner: function.clone() as Arc<dyn $fn_trait>,
                    capabilities: Capabilities {
                        scheduled: Some(function.clone() as Arc<dyn ScheduledFunction>),
                        watermark: Some(function as Arc<dyn WatermarkFunction>),
                    },
                }
            }

            /// Capability descriptor of this function.
            pub fn capabilities(&self) -> &Capabilities {
                &self.capabilities
            }

            /// True if both wrappers share one function instance.
            pub fn ptr_eq(&self, other: &Self) -> bool {
                Arc::ptr_eq(&self.inner, &other.inner)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("capabilities", &self.capabilities)
                    .finish()
            }
        }
    };
}

user_function!(
    /// A [`MapFn`] with its capability descriptor.
    MapFunction,
    MapFn
);
user_function!(
    /// A [`FilterFn`] with its capability descriptor.
    FilterFunction,
    FilterFn
);
user_function!(
    /// A [`FlatMapFn`] with its capability descriptor.
    FlatMapFunction,
    FlatMapFn
);
user_function!(
    /// A [`SinkFn`] with its capability descriptor.
    SinkFunction,
    SinkFn
);
user_function!(
    /// A [`JoinFn`] with its capability descriptor.
    JoinFunction,
    JoinFn
);

impl MapFunction {
    /// Applies the wrapped function.
    pub fn apply(&self, message: Message) -> Message {
        self.inner.apply(message)
    }
}

impl FilterFunction {
    /// Applies the wrapped predicate.
    pub fn apply(&self, message: &Message) -> bool {
        self.inner.apply(message)
    }
}

impl FlatMapFunction {
    /// Applies the wrapped function.
    pub fn apply(&self, message: Message) -> Vec<Message> {
        self.inner.apply(message)
    }
}

impl SinkFunction {
    /// Applies the wrapped callback.
    pub fn apply(&self, message: Message) {
        self.inner.apply(message)
    }
}

impl JoinFunction {
    /// Applies the wrapped join.
    pub fn apply(&self, message: Message, other: Message) -> Message {
        self.inner.apply(message, other)
    }

    /// Key of a message from the first stream.
    pub fn first_key(&self, message: &Message) -> PartitionKey {
        self.inner.first_key(message)
    }

    /// Key of a message from the second stream.
    pub fn second_key(&self, message: &Message) -> PartitionKey {
        self.inner.second_key(message)
    }
}
