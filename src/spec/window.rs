//! # Windows
//!
//! A [`WindowOperatorSpec`] folds messages into per-key panes. The panes are
//! the only mutable runtime state held by a spec: they belong to one task's
//! copy of the graph and start empty in every clone.

use crate::functions::{MapFunction, Message};
use crate::partitioning::PartitionKey;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Key used for panes of windows without a key function.
pub const GLOBAL_PANE: &str = "";

/// How panes are triggered.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WindowType {
    /// Fixed-size, non-overlapping windows.
    Tumbling(Duration),
    /// Closed after the given gap without messages.
    Session(Duration),
}

type Initializer = Arc<dyn Fn() -> Message + Send + Sync>;
type Folder = Arc<dyn Fn(Message, Message) -> Message + Send + Sync>;

/// Initial accumulator plus fold step.
#[derive(Clone)]
pub struct FoldFunction {
    initial: Initializer,
    fold: Folder,
}

impl FoldFunction {
    /// Pairs an initializer with a fold step.
    pub fn new<I, F>(initial: I, fold: F) -> Self
    where
        I: Fn() -> Message + Send + Sync + 'static,
        F: Fn(Message, Message) -> Message + Send + Sync + 'static,
    {
        Self {
            initial: Arc::new(initial),
            fold: Arc::new(fold),
        }
    }

    /// A fresh accumulator.
    pub fn initial(&self) -> Message {
        (self.initial)()
    }

    /// Folds `message` into `accumulator`.
    pub fn fold(&self, message: Message, accumulator: Message) -> Message {
        (self.fold)(message, accumulator)
    }
}

impl fmt::Debug for FoldFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FoldFunction")
    }
}

/// Window definition.
#[derive(Clone, Debug)]
pub struct Window {
    window_type: WindowType,
    key_function: Option<MapFunction>,
    fold: FoldFunction,
}

impl Window {
    /// Global tumbling window.
    pub fn tumbling(size: Duration, fold: FoldFunction) -> Self {
        Self {
            window_type: WindowType::Tumbling(size),
            key_function: None,
            fold,
        }
    }

    /// Global session window.
    pub fn session(gap: Duration, fold: FoldFunction) -> Self {
        Self {
            window_type: WindowType::Session(gap),
            key_function: None,
            fold,
        }
    }

    /// Keys panes by the result of `key_function`.
    pub fn keyed_by(mut self, key_function: MapFunction) -> Self {
        self.key_function = Some(key_function);
        self
    }

    /// Trigger policy.
    pub fn window_type(&self) -> WindowType {
        self.window_type
    }

    /// Key function, `None` for a global window.
    pub fn key_function(&self) -> Option<&MapFunction> {
        self.key_function.as_ref()
    }

    /// Accumulation step.
    pub fn fold_function(&self) -> &FoldFunction {
        &self.fold
    }

    /// Pane key of a message; messages whose key cannot be derived fall into
    /// the global pane.
    pub fn pane_key(&self, message: &Message) -> PartitionKey {
        self.key_function
            .as_ref()
            .and_then(|f| PartitionKey::from_message(&f.apply(message.clone())))
            .unwrap_or_else(|| PartitionKey::from(GLOBAL_PANE))
    }
}

/// In-progress accumulators, one per pane key.
#[derive(Default)]
pub struct WindowPanes {
    panes: BTreeMap<PartitionKey, Message>,
}

impl WindowPanes {
    /// Accumulator of the pane `key`.
    pub fn get(&self, key: &PartitionKey) -> Option<&Message> {
        self.panes.get(key)
    }

    /// Number of open panes.
    pub fn len(&self) -> usize {
        self.panes.len()
    }

    /// True if no pane is open.
    pub fn is_empty(&self) -> bool {
        self.panes.is_empty()
    }

    /// Open pane keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &PartitionKey> {
        self.panes.keys()
    }

    /// Drains every pane, e.g. when the window fires.
    pub fn take_all(&mut self) -> BTreeMap<PartitionKey, Message> {
        std::mem::take(&mut self.panes)
    }

    fn accumulate(&mut self, key: PartitionKey, message: Message, fold: &FoldFunction) {
        let accumulator = self.panes.remove(&key).unwrap_or_else(|| fold.initial());
        self.panes.insert(key, fold.fold(message, accumulator));
    }
}

impl fmt::Debug for WindowPanes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.panes.keys()).finish()
    }
}

/// Window operator with its panes.
#[derive(Debug)]
pub struct WindowOperatorSpec {
    window: Window,
    panes: WindowPanes,
}

impl WindowOperatorSpec {
    /// A window operator with no open panes.
    pub fn new(window: Window) -> Self {
        Self {
            window,
            panes: WindowPanes::default(),
        }
    }

    /// The window definition.
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Open panes.
    pub fn panes(&self) -> &WindowPanes {
        &self.panes
    }

    /// Mutable panes, for firing.
    pub fn panes_mut(&mut self) -> &mut WindowPanes {
        &mut self.panes
    }

    /// Folds a message into its pane.
    pub fn accumulate(&mut self, message: Message) {
        let key = self.window.pane_key(&message);
        self.panes.accumulate(key, message, &self.window.fold);
    }

    /// Same window, empty panes.
    pub fn fresh_copy(&self) -> Self {
        Self::new(self.window.clone())
    }
}
