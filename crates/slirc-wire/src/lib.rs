//! # slirc-wire
//!
//! Line-level IRC parsing and framing used by the slirc client engine.
//!
//! ## Features
//!
//! - Lenient, total line parser producing a flat [`Message`]
//! - Outbound command compilation and 510-byte line framing
//! - PRIVMSG splitting for long or multi-line text
//! - ISUPPORT token helpers and the channel membership [`PrefixTable`]
//! - Optional Tokio line codec
//!
//! ## Quick Start
//!
//! ```rust
//! use slirc_wire::{encode, Message, MessageKind};
//!
//! let msg = Message::parse(":alice!a@example.org PRIVMSG #rust :hello there");
//! assert_eq!(msg.kind, MessageKind::Action);
//! assert_eq!(msg.nick(), "alice");
//! assert_eq!(msg.trailing, "hello there");
//!
//! let line = encode::compile("PRIVMSG", &["#rust"], "hi");
//! assert_eq!(line, "PRIVMSG #rust :hi");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod encode;
pub mod error;
pub mod isupport;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;

pub use self::encode::{compile, frame, privmsg, MAX_LINE_LEN};
pub use self::error::ProtocolError;
pub use self::isupport::{split_token, PrefixTable};
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;
pub use self::message::{Message, MessageKind, Source};
