//! User entity.

use super::buffer::MessageBuffer;
use slirc_wire::Message;

/// A user seen on the server.
///
/// The global registry and every channel member map hold their own `User`
/// for the same nick. `prefix` holds channel mode chars (e.g. `o` for `@`)
/// and is only meaningful on channel members.
#[derive(Clone, Debug)]
pub struct User {
    nick: String,
    prefix: String,
    buffer: MessageBuffer,
}

impl User {
    pub fn new(nick: impl Into<String>, buffer_length: usize) -> Self {
        Self {
            nick: nick.into(),
            prefix: String::new(),
            buffer: MessageBuffer::new(buffer_length),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn nick(&self) -> &str {
        &self.nick
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
    }

    pub fn rename(&mut self, nick: impl Into<String>) {
        self.nick = nick.into();
    }

    pub fn add_message(&mut self, msg: Message) {
        self.buffer.push(msg);
    }

    pub fn messages(&self) -> &MessageBuffer {
        &self.buffer
    }
}
