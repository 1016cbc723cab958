//! Parsed IRC line representation.

mod parse;

use std::fmt;

/// Classification of a received line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// `:server 001 nick ...` style numeric reply.
    Numeric,
    /// Prefixed command, e.g. `:nick!user@host PRIVMSG #chan :hi`.
    Action,
    /// Unprefixed command such as `PING :token` or `ERROR :Closing link`.
    Other,
    /// The line could not be parsed.
    Unknown,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Numeric => "numeric",
            Self::Action => "action",
            Self::Other => "other",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A `nick!user@host` message source.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Source {
    /// Nickname.
    pub nick: String,
    /// Username (ident).
    pub user: String,
    /// Hostname.
    pub host: String,
}

impl Source {
    /// Parse a `nick!user@host` prefix (without the leading colon).
    ///
    /// All three parts must be non-empty.
    pub fn parse(prefix: &str) -> Option<Self> {
        let (nick, rest) = prefix.split_once('!')?;
        let (user, host) = rest.split_once('@')?;
        if nick.is_empty() || user.is_empty() || host.is_empty() {
            return None;
        }
        Some(Self {
            nick: nick.to_string(),
            user: user.to_string(),
            host: host.to_string(),
        })
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}@{}", self.nick, self.user, self.host)
    }
}

/// A received IRC line broken into its parts.
///
/// Produced by [`Message::parse`], which never fails: a line that cannot be
/// understood yields [`MessageKind::Unknown`] with `failed` set and every
/// other field empty.
///
/// # Example
///
/// ```
/// use slirc_wire::{Message, MessageKind};
///
/// let msg = Message::parse(":irc.example.net 005 me PREFIX=(ov)@+ :are supported");
/// assert_eq!(msg.kind, MessageKind::Numeric);
/// assert_eq!(msg.numeric, "005");
/// assert_eq!(msg.args, vec!["me", "PREFIX=(ov)@+"]);
/// assert_eq!(msg.sub_command, "are");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// The line as received, without line terminators.
    pub raw: String,
    /// Line classification.
    pub kind: MessageKind,
    /// Set when the line could not be parsed.
    pub failed: bool,
    /// Source of an [`MessageKind::Action`] line when it has the
    /// `nick!user@host` form.
    pub source: Option<Source>,
    /// Raw prefix without the leading colon (empty for unprefixed lines).
    pub origin: String,
    /// Server that sent a numeric reply.
    pub server_name: String,
    /// Three-digit numeric code.
    pub numeric: String,
    /// Command word of action and other lines.
    pub command: String,
    /// Positional parameters, excluding the trailing one.
    pub args: Vec<String>,
    /// Text after the first `" :"`.
    pub trailing: String,
    /// First word of `trailing`.
    pub sub_command: String,
    /// Remaining words of `trailing`.
    pub sub_args: Vec<String>,
}

impl Message {
    /// An unparseable line.
    pub fn unknown(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            kind: MessageKind::Unknown,
            failed: true,
            source: None,
            origin: String::new(),
            server_name: String::new(),
            numeric: String::new(),
            command: String::new(),
            args: Vec::new(),
            trailing: String::new(),
            sub_command: String::new(),
            sub_args: Vec::new(),
        }
    }

    /// Whether the line carried a `nick!user@host` prefix.
    pub fn has_prefix(&self) -> bool {
        self.source.is_some()
    }

    /// Nickname of the source, or an empty string.
    pub fn nick(&self) -> &str {
        self.source.as_ref().map_or("", |s| s.nick.as_str())
    }

    /// Dispatch key: the numeric code for numeric replies, otherwise the
    /// uppercased command.
    pub fn verb(&self) -> String {
        match self.kind {
            MessageKind::Numeric => self.numeric.clone(),
            MessageKind::Action | MessageKind::Other => self.command.to_ascii_uppercase(),
            MessageKind::Unknown => String::new(),
        }
    }

    /// Positional argument `n`, if present.
    pub fn arg(&self, n: usize) -> Option<&str> {
        self.args.get(n).map(String::as_str)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for Message {
    fn from(line: &str) -> Self {
        Message::parse(line)
    }
}
