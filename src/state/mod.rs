//! Session state and the channel/user store.
//!
//! The [`Store`] is the client's view of the network: channels we are in
//! (or were in, when preserved), their members, and users we have talked to.
//! Only the dispatcher mutates it, from the reader task.

mod buffer;
mod channel;
mod conversation;
mod session;
mod user;

pub use buffer::MessageBuffer;
pub use channel::Channel;
pub use conversation::{Chat, ChatKind, Conversation};
pub use session::{Phase, SessionState};
pub use user::User;

use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Channels and users known to one session.
#[derive(Clone, Debug)]
pub struct Store {
    channels: HashMap<String, Channel>,
    users: HashMap<String, User>,
    channel_buffer_length: usize,
    user_buffer_length: usize,
}

impl Store {
    pub fn new(channel_buffer_length: usize, user_buffer_length: usize) -> Self {
        Self {
            channels: HashMap::new(),
            users: HashMap::new(),
            channel_buffer_length,
            user_buffer_length,
        }
    }

    // ------------------------------------------------------------------------
    // Channels
    // ------------------------------------------------------------------------

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(name)
    }

    pub fn channel_mut(&mut self, name: &str) -> Option<&mut Channel> {
        self.channels.get_mut(name)
    }

    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    /// Our own JOIN: create the channel or reuse a known one.
    pub fn join_channel(&mut self, name: &str, now: DateTime<Utc>) -> &mut Channel {
        let (channel_len, user_len) = (self.channel_buffer_length, self.user_buffer_length);
        let channel = self
            .channels
            .entry(name.to_string())
            .or_insert_with(|| Channel::new(name, channel_len, user_len, now));
        if channel.is_left() {
            channel.rejoin(now);
        }
        channel
    }

    /// Get or create a channel without touching its join state.
    pub fn ensure_channel(&mut self, name: &str, now: DateTime<Utc>) -> &mut Channel {
        let (channel_len, user_len) = (self.channel_buffer_length, self.user_buffer_length);
        self.channels
            .entry(name.to_string())
            .or_insert_with(|| Channel::new(name, channel_len, user_len, now))
    }

    /// We left `name`: mark it left, drop it unless `preserve_channels`, and
    /// purge members that are no longer visible unless `preserve_users`.
    pub fn leave_channel(&mut self, name: &str, preserve_channels: bool, preserve_users: bool) {
        let former = match self.channels.get_mut(name) {
            Some(channel) => {
                channel.mark_left();
                channel.nicks()
            }
            None => return,
        };
        if !preserve_channels {
            self.channels.remove(name);
        }
        if !preserve_users {
            for nick in former {
                self.purge_if_invisible(&nick);
            }
        }
    }

    /// Someone else left `channel`.
    pub fn remove_member(&mut self, channel: &str, nick: &str, preserve_users: bool) {
        if let Some(channel) = self.channels.get_mut(channel) {
            channel.remove_user(nick);
        }
        if !preserve_users {
            self.purge_if_invisible(nick);
        }
    }

    // ------------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------------

    pub fn user(&self, nick: &str) -> Option<&User> {
        self.users.get(nick)
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn has_user(&self, nick: &str) -> bool {
        self.users.contains_key(nick)
    }

    pub fn ensure_user(&mut self, nick: &str) -> &mut User {
        let len = self.user_buffer_length;
        self.users
            .entry(nick.to_string())
            .or_insert_with(|| User::new(nick, len))
    }

    /// Whether `nick` is a member of any channel we are still in.
    pub fn is_visible(&self, nick: &str) -> bool {
        self.channels
            .values()
            .any(|c| !c.is_left() && c.has_user(nick))
    }

    pub fn purge_if_invisible(&mut self, nick: &str) -> bool {
        if self.is_visible(nick) {
            return false;
        }
        self.users.remove(nick).is_some()
    }

    /// Re-key `old` as `new` in every channel and in the registry.
    pub fn rename_user(&mut self, old: &str, new: &str) {
        for channel in self.channels.values_mut() {
            channel.rename_user(old, new);
        }
        if let Some(mut user) = self.users.remove(old) {
            user.rename(new);
            self.users.insert(new.to_string(), user);
        }
    }

    /// `nick` quit: drop it from every channel, and from the registry unless
    /// `preserve_users`.
    pub fn remove_user_everywhere(&mut self, nick: &str, preserve_users: bool) {
        for channel in self.channels.values_mut() {
            channel.remove_user(nick);
        }
        if !preserve_users {
            self.users.remove(nick);
        }
    }
}
