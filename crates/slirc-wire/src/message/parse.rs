//! Lenient line parser.
//!
//! The parser is intentionally forgiving: it works on whitespace-separated
//! words and the first `" :"` marker rather than a strict RFC grammar, and
//! every input produces a [`Message`].

use super::{Message, MessageKind, Source};

impl Message {
    /// Parse a raw line received from the server.
    ///
    /// Never fails; see [`MessageKind::Unknown`].
    ///
    /// # Example
    ///
    /// ```
    /// use slirc_wire::{Message, MessageKind};
    ///
    /// let msg = Message::parse("PING :irc.example.net");
    /// assert_eq!(msg.kind, MessageKind::Other);
    /// assert_eq!(msg.command, "PING");
    /// assert_eq!(msg.trailing, "irc.example.net");
    /// ```
    pub fn parse(line: &str) -> Message {
        let line = line.trim();
        if line.is_empty() {
            return Message::unknown(line);
        }

        let mut msg = Message::unknown(line);
        msg.failed = false;

        if !line.starts_with(':') {
            parse_other(line, &mut msg);
        } else {
            let words: Vec<&str> = line.split(' ').collect();
            if words.len() < 3 {
                return Message::unknown(line);
            }

            msg.origin = words[0][1..].to_string();
            let rest = after_tokens(line, 2);

            if is_numeric(words[1]) {
                msg.kind = MessageKind::Numeric;
                msg.server_name = msg.origin.clone();
                msg.numeric = words[1].to_string();
            } else {
                msg.kind = MessageKind::Action;
                msg.source = Source::parse(&msg.origin);
                msg.command = words[1].to_string();
            }
            parse_params(rest, &mut msg);
        }

        // A single bare parameter doubles as the trailing text.
        if msg.trailing.is_empty() && msg.args.len() == 1 {
            msg.trailing = msg.args[0].clone();
        }

        msg
    }
}

/// Unprefixed lines: `COMMAND args... [:trailing]`.
fn parse_other(line: &str, msg: &mut Message) {
    msg.kind = MessageKind::Other;

    let (left, trailing) = match line.split_once(" :") {
        Some((left, right)) => (left, Some(right)),
        None => (line, None),
    };

    let mut words = split_words(left).into_iter();
    msg.command = words.next().unwrap_or_default();
    msg.args = words.collect();

    match trailing {
        Some(t) => msg.trailing = t.to_string(),
        None if msg.args.len() == 1 => msg.trailing = msg.args[0].clone(),
        None => {}
    }
}

/// Split the text after the command/numeric token into positional
/// arguments, the trailing parameter, and the trailing's first word.
fn parse_params(rest: &str, msg: &mut Message) {
    let trailing = if let Some(t) = rest.strip_prefix(':') {
        Some(t)
    } else if let Some((left, right)) = rest.split_once(" :") {
        msg.args = split_words(left);
        Some(right)
    } else {
        msg.args = split_words(rest);
        None
    };

    if let Some(t) = trailing {
        msg.trailing = t.to_string();
        let (head, tail) = t.split_once(' ').unwrap_or((t, ""));
        msg.sub_command = head.to_string();
        msg.sub_args = split_words(tail);
    }
}

/// Text following the first `n` single-space separated tokens.
fn after_tokens(line: &str, n: usize) -> &str {
    let mut rest = line;
    for _ in 0..n {
        match rest.split_once(' ') {
            Some((_, tail)) => rest = tail,
            None => return "",
        }
    }
    rest
}

fn split_words(s: &str) -> Vec<String> {
    s.split(' ')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_numeric(word: &str) -> bool {
    word.len() == 3 && word.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_with_trailing() {
        let msg = Message::parse("PING :irc.example.net\r\n");
        assert_eq!(msg.kind, MessageKind::Other);
        assert!(!msg.failed);
        assert_eq!(msg.command, "PING");
        assert!(msg.args.is_empty());
        assert_eq!(msg.trailing, "irc.example.net");
        assert_eq!(msg.raw, "PING :irc.example.net");
    }

    #[test]
    fn test_other_two_words_bare_trailing() {
        let msg = Message::parse("PING token123");
        assert_eq!(msg.command, "PING");
        assert_eq!(msg.args, vec!["token123"]);
        assert_eq!(msg.trailing, "token123");
    }

    #[test]
    fn test_other_first_marker_wins() {
        let msg = Message::parse("ERROR :Closing link: a :b");
        assert_eq!(msg.command, "ERROR");
        assert_eq!(msg.trailing, "Closing link: a :b");
    }

    #[test]
    fn test_other_embedded_colon_not_marker() {
        let msg = Message::parse("FOO a:b c :tail");
        assert_eq!(msg.args, vec!["a:b", "c"]);
        assert_eq!(msg.trailing, "tail");
    }

    #[test]
    fn test_action_full_prefix() {
        let msg = Message::parse(":nick!user@host ACTION arg1 arg2 :trailing text");
        assert_eq!(msg.kind, MessageKind::Action);
        assert!(msg.has_prefix());
        let source = msg.source.as_ref().unwrap();
        assert_eq!(source.nick, "nick");
        assert_eq!(source.user, "user");
        assert_eq!(source.host, "host");
        assert_eq!(msg.command, "ACTION");
        assert_eq!(msg.args, vec!["arg1", "arg2"]);
        assert_eq!(msg.trailing, "trailing text");
        assert_eq!(msg.sub_command, "trailing");
        assert_eq!(msg.sub_args, vec!["text"]);
    }

    #[test]
    fn test_action_server_prefix() {
        let msg = Message::parse(":irc.example.net CAP * LS :multi-prefix sasl");
        assert_eq!(msg.kind, MessageKind::Action);
        assert!(!msg.has_prefix());
        assert_eq!(msg.origin, "irc.example.net");
        assert_eq!(msg.command, "CAP");
        assert_eq!(msg.args, vec!["*", "LS"]);
        assert_eq!(msg.trailing, "multi-prefix sasl");
    }

    #[test]
    fn test_action_trailing_only() {
        let msg = Message::parse(":alice!a@h JOIN :#t");
        assert!(msg.args.is_empty());
        assert_eq!(msg.trailing, "#t");
    }

    #[test]
    fn test_action_single_arg_collapses() {
        let msg = Message::parse(":alice!a@h JOIN #t");
        assert_eq!(msg.args, vec!["#t"]);
        assert_eq!(msg.trailing, "#t");
    }

    #[test]
    fn test_action_no_trailing_keeps_empty() {
        let msg = Message::parse(":op!o@h KICK #t bob");
        assert_eq!(msg.args, vec!["#t", "bob"]);
        assert_eq!(msg.trailing, "");
        assert_eq!(msg.sub_command, "");
    }

    #[test]
    fn test_numeric_reply() {
        let msg = Message::parse(":irc.example.net 001 mynick :Welcome to the network");
        assert_eq!(msg.kind, MessageKind::Numeric);
        assert_eq!(msg.server_name, "irc.example.net");
        assert_eq!(msg.numeric, "001");
        assert_eq!(msg.args, vec!["mynick"]);
        assert_eq!(msg.trailing, "Welcome to the network");
        assert_eq!(msg.sub_command, "Welcome");
        assert_eq!(msg.sub_args, vec!["to", "the", "network"]);
        assert_eq!(msg.verb(), "001");
    }

    #[test]
    fn test_numeric_names_reply() {
        let msg = Message::parse(":irc 353 mynick = #t :@alice bob");
        assert_eq!(msg.args, vec!["mynick", "=", "#t"]);
        assert_eq!(msg.trailing, "@alice bob");
    }

    #[test]
    fn test_numeric_code_inside_server_name() {
        let msg = Message::parse(":irc001.net 001 me :hi");
        assert_eq!(msg.server_name, "irc001.net");
        assert_eq!(msg.args, vec!["me"]);
        assert_eq!(msg.trailing, "hi");
    }

    #[test]
    fn test_unknown_short_prefixed_line() {
        let msg = Message::parse(":server NOTICE");
        assert_eq!(msg.kind, MessageKind::Unknown);
        assert!(msg.failed);
        assert!(msg.args.is_empty());
        assert_eq!(msg.verb(), "");
    }

    #[test]
    fn test_unknown_empty_line() {
        let msg = Message::parse("  \r\n");
        assert_eq!(msg.kind, MessageKind::Unknown);
        assert!(msg.failed);
    }

    #[test]
    fn test_long_line_not_truncated() {
        let text = "x".repeat(700);
        let msg = Message::parse(&format!(":a!b@c PRIVMSG #t :{}", text));
        assert_eq!(msg.trailing.len(), 700);
    }

    #[test]
    fn test_verb_uppercases_command() {
        let msg = Message::parse("ping :x");
        assert_eq!(msg.verb(), "PING");
    }
}
