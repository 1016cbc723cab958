//! Channels and users as conversations.

use super::buffer::MessageBuffer;
use super::channel::Channel;
use super::user::User;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatKind {
    Channel,
    Direct,
}

/// Something the embedder can show as a conversation window.
pub trait Chat {
    fn kind(&self) -> ChatKind;

    /// Window title: the channel name or the other user's nick.
    fn title(&self) -> &str;

    /// Nicks taking part, sorted.
    fn participants(&self) -> Vec<String>;

    fn history(&self) -> &MessageBuffer;
}

impl Chat for Channel {
    fn kind(&self) -> ChatKind {
        ChatKind::Channel
    }

    fn title(&self) -> &str {
        self.name()
    }

    fn participants(&self) -> Vec<String> {
        self.nicks()
    }

    fn history(&self) -> &MessageBuffer {
        self.messages()
    }
}

impl Chat for User {
    fn kind(&self) -> ChatKind {
        ChatKind::Direct
    }

    fn title(&self) -> &str {
        self.nick()
    }

    fn participants(&self) -> Vec<String> {
        vec![self.nick().to_string()]
    }

    fn history(&self) -> &MessageBuffer {
        self.messages()
    }
}

/// A snapshot of either conversation type.
#[derive(Clone, Debug)]
pub enum Conversation {
    Channel(Channel),
    Direct(User),
}

impl Conversation {
    pub fn as_chat(&self) -> &dyn Chat {
        match self {
            Self::Channel(channel) => channel,
            Self::Direct(user) => user,
        }
    }
}

impl Chat for Conversation {
    fn kind(&self) -> ChatKind {
        self.as_chat().kind()
    }

    fn title(&self) -> &str {
        self.as_chat().title()
    }

    fn participants(&self) -> Vec<String> {
        self.as_chat().participants()
    }

    fn history(&self) -> &MessageBuffer {
        self.as_chat().history()
    }
}
