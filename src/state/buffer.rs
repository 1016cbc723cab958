//! Bounded message history.

use slirc_wire::Message;
use std::collections::VecDeque;

/// FIFO of received messages holding at most `capacity` entries.
///
/// Pushing into a full buffer evicts the oldest message.
#[derive(Clone, Debug)]
pub struct MessageBuffer {
    items: VecDeque<Message>,
    capacity: usize,
}

impl MessageBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    pub fn push(&mut self, msg: Message) {
        if self.capacity == 0 {
            return;
        }
        while self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(msg);
    }

    /// Messages, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.items.iter()
    }

    pub fn latest(&self) -> Option<&Message> {
        self.items.back()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
