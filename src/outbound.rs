//! Outbound messages and the session id source.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic id generator shared by everything inside one session.
///
/// Outbound message ids and lag probe tokens are drawn from the same
/// counter, so a probe token never collides with a message id.
#[derive(Clone, Debug, Default)]
pub struct IdSource(Arc<AtomicU64>);

impl IdSource {
    /// Create a counter starting at 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id. Never returns the same value twice.
    pub fn next_id(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// A command queued for the writer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Correlates `DataSent` / `DataSendFail` with the enqueue call.
    pub id: u64,
    /// Raw command text, possibly several commands separated by `\n`.
    pub text: String,
}

impl OutboundMessage {
    pub fn new(ids: &IdSource, text: impl Into<String>) -> Self {
        Self {
            id: ids.next_id(),
            text: text.into(),
        }
    }
}
