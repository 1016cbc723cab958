//! Channel entity.

use super::buffer::MessageBuffer;
use super::user::User;
use chrono::{DateTime, Utc};
use slirc_wire::Message;
use std::collections::HashMap;

/// A channel we have joined at least once.
#[derive(Clone, Debug)]
pub struct Channel {
    name: String,
    topic: String,
    buffer: MessageBuffer,
    members: HashMap<String, User>,
    user_buffer_length: usize,
    first_joined: DateTime<Utc>,
    last_joined: DateTime<Utc>,
    left: bool,
}

impl Channel {
    pub fn new(
        name: impl Into<String>,
        buffer_length: usize,
        user_buffer_length: usize,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            topic: String::new(),
            buffer: MessageBuffer::new(buffer_length),
            members: HashMap::new(),
            user_buffer_length,
            first_joined: now,
            last_joined: now,
            left: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn set_topic(&mut self, topic: impl Into<String>) {
        self.topic = topic.into();
    }

    pub fn add_message(&mut self, msg: Message) {
        self.buffer.push(msg);
    }

    pub fn messages(&self) -> &MessageBuffer {
        &self.buffer
    }

    /// Add a member, or update the prefix of an existing one.
    pub fn add_user(&mut self, nick: &str, prefix: &str) {
        match self.members.get_mut(nick) {
            Some(user) => user.set_prefix(prefix),
            None => {
                let user = User::new(nick, self.user_buffer_length).with_prefix(prefix);
                self.members.insert(nick.to_string(), user);
            }
        }
    }

    pub fn remove_user(&mut self, nick: &str) -> Option<User> {
        self.members.remove(nick)
    }

    /// Re-key a member, keeping its prefix and history.
    pub fn rename_user(&mut self, old: &str, new: &str) -> bool {
        match self.members.remove(old) {
            Some(mut user) => {
                user.rename(new);
                self.members.insert(new.to_string(), user);
                true
            }
            None => false,
        }
    }

    pub fn has_user(&self, nick: &str) -> bool {
        self.members.contains_key(nick)
    }

    pub fn user(&self, nick: &str) -> Option<&User> {
        self.members.get(nick)
    }

    pub fn user_mut(&mut self, nick: &str) -> Option<&mut User> {
        self.members.get_mut(nick)
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.members.values()
    }

    /// Member nicks, sorted.
    pub fn nicks(&self) -> Vec<String> {
        let mut nicks: Vec<String> = self.members.keys().cloned().collect();
        nicks.sort();
        nicks
    }

    pub fn user_count(&self) -> usize {
        self.members.len()
    }

    pub fn first_joined(&self) -> DateTime<Utc> {
        self.first_joined
    }

    pub fn last_joined(&self) -> DateTime<Utc> {
        self.last_joined
    }

    pub fn is_left(&self) -> bool {
        self.left
    }

    /// Mark the channel left. The member list is stale from here on.
    pub fn mark_left(&mut self) {
        self.left = true;
    }

    /// Rejoin a previously left channel.
    pub fn rejoin(&mut self, now: DateTime<Utc>) {
        self.left = false;
        self.last_joined = now;
        self.members.clear();
    }
}
