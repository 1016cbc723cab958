//! Translation of chat input into raw commands.
//!
//! Plain text becomes a `PRIVMSG` to the current target; `/command args`
//! maps to the matching IRC command. A leading `//` sends the text
//! literally with one slash removed.

use crate::lag::{LagProbe, ProbeKind};
use crate::outbound::IdSource;
use parking_lot::Mutex;
use slirc_wire::{compile, privmsg};

/// Translated input.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Parsed {
    Line(String),
    /// `/ping`: a user lag probe, armed only once it is queued.
    Probe(u64),
}

impl Parsed {
    pub(crate) fn line(&self) -> String {
        match self {
            Self::Line(line) => line.clone(),
            Self::Probe(id) => probe_line(*id),
        }
    }
}

/// `PING` for user probe `id`.
pub(crate) fn probe_line(id: u64) -> String {
    compile::<&str>("PING", &[], &ProbeKind::User.token(id))
}

fn is_channel(name: &str) -> bool {
    name.starts_with('#') || name.starts_with('&')
}

/// Split `"target rest of text"` at the first space.
fn split_first(args: &str) -> (&str, &str) {
    match args.split_once(' ') {
        Some((head, tail)) => (head, tail.trim_start()),
        None => (args, ""),
    }
}

/// Parse one line of user input typed while `current` is focused.
///
/// Returns `None` when the input produces nothing to send (for instance
/// `/msg` without text, or `/ping` while a probe is still unanswered).
pub(crate) fn parse(
    current: &str,
    input: &str,
    user_probe: &Mutex<LagProbe>,
    ids: &IdSource,
) -> Option<Parsed> {
    if input.is_empty() {
        return None;
    }
    if let Some(literal) = input.strip_prefix("//") {
        return Some(Parsed::Line(privmsg(current, &format!("/{literal}"))));
    }
    let Some(command_line) = input.strip_prefix('/') else {
        return Some(Parsed::Line(privmsg(current, input)));
    };

    let (command, args) = split_first(command_line);
    let command = command.to_ascii_lowercase();

    let line = match command.as_str() {
        "msg" | "privmsg" => {
            let (target, text) = split_first(args);
            if target.is_empty() || text.is_empty() {
                return None;
            }
            privmsg(target, text)
        }
        "ns" | "nickserv" => (!args.is_empty()).then(|| privmsg("NickServ", args))?,
        "cs" | "chanserv" => (!args.is_empty()).then(|| privmsg("ChanServ", args))?,
        "me" => privmsg(current, &format!("\x01ACTION {args}\x01")),
        "part" | "close" => {
            let (first, rest) = split_first(args);
            let (channel, reason) = if is_channel(first) {
                (first, rest)
            } else {
                (current, args)
            };
            compile("PART", &[channel], reason)
        }
        "quit" | "bye" | "disconnect" | "discon" => compile::<&str>("QUIT", &[], args),
        "ping" => {
            if user_probe.lock().in_flight() {
                return None;
            }
            return Some(Parsed::Probe(ids.next_id()));
        }
        "raw" | "quote" => (!args.is_empty()).then(|| args.to_string())?,
        _ if args.is_empty() => command.to_ascii_uppercase(),
        _ => format!("{} {}", command.to_ascii_uppercase(), args),
    };
    Some(Parsed::Line(line))
}
