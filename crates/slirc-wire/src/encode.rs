//! Outbound command construction and line framing.
//!
//! Everything here works on plain strings. A payload handed to the writer
//! may hold several commands separated by `\n`; [`frame`] turns it into
//! CRLF-terminated physical lines that respect [`MAX_LINE_LEN`].
//!
//! # Example
//!
//! ```
//! use slirc_wire::encode::{compile, frame};
//!
//! let line = compile("USER", &["guest", "0", "*"], "Guest User");
//! assert_eq!(line, "USER guest 0 * :Guest User");
//! assert_eq!(frame(&line), vec!["USER guest 0 * :Guest User\r\n"]);
//! ```

/// Maximum length of an outbound line, excluding CRLF.
pub const MAX_LINE_LEN: usize = 510;

/// `target.len() + text.len()` above which a PRIVMSG is split.
const PRIVMSG_SPLIT_THRESHOLD: usize = 498;

/// Build `COMMAND arg1 arg2 :trailing`.
///
/// The ` :trailing` segment is omitted when `trailing` is empty.
pub fn compile<S: AsRef<str>>(command: &str, args: &[S], trailing: &str) -> String {
    let mut line = String::with_capacity(64 + trailing.len());
    line.push_str(command);
    for arg in args {
        line.push(' ');
        line.push_str(arg.as_ref());
    }
    if !trailing.is_empty() {
        line.push_str(" :");
        line.push_str(trailing);
    }
    line
}

/// Build one or more `PRIVMSG` commands, joined by `\n`.
///
/// Each line of a multi-line `msg` becomes its own command (empty lines are
/// skipped). A line where `target.len() + msg.len()` exceeds 498 bytes is
/// cut at byte offset `498 - target.len()` and the rest is sent as further
/// commands, so no compiled line exceeds [`MAX_LINE_LEN`]. Splitting is
/// byte-oriented and only moves back to respect UTF-8 boundaries.
///
/// A target that alone uses up the budget gets a single command, which
/// [`frame`] truncates.
pub fn privmsg(target: &str, msg: &str) -> String {
    if msg.contains('\n') {
        return msg
            .split('\n')
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .map(|line| privmsg(target, line))
            .collect::<Vec<_>>()
            .join("\n");
    }

    if target.len() >= PRIVMSG_SPLIT_THRESHOLD {
        return compile("PRIVMSG", &[target], msg);
    }

    let mut commands = Vec::new();
    let mut rest = msg;
    while !rest.is_empty() && target.len() + rest.len() > PRIVMSG_SPLIT_THRESHOLD {
        let at = split_point(rest, PRIVMSG_SPLIT_THRESHOLD.saturating_sub(target.len()));
        let (head, tail) = rest.split_at(at);
        commands.push(compile("PRIVMSG", &[target], head));
        rest = tail;
    }
    if !rest.is_empty() || commands.is_empty() {
        commands.push(compile("PRIVMSG", &[target], rest));
    }
    commands.join("\n")
}

/// Split a writer payload into CRLF-terminated physical lines.
///
/// Empty lines are dropped and every line is truncated to
/// [`MAX_LINE_LEN`] bytes.
pub fn frame(data: &str) -> Vec<String> {
    data.split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .map(|line| {
            let line = truncate(line, MAX_LINE_LEN);
            let mut framed = String::with_capacity(line.len() + 2);
            framed.push_str(line);
            framed.push_str("\r\n");
            framed
        })
        .collect()
}

/// Longest prefix of `s` that is at most `max` bytes.
pub fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    &s[..floor_char_boundary(s, max)]
}

/// Byte offset to cut `s` at: `want` moved back to a char boundary, but
/// always past the first char so splitting makes progress.
fn split_point(s: &str, want: usize) -> usize {
    let at = floor_char_boundary(s, want);
    if at > 0 {
        return at;
    }
    s.chars().next().map_or(s.len(), char::len_utf8)
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}
