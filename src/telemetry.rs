//! Standardized span constructors for session observability.

pub mod spans {
    use tracing::{Span, debug_span, info_span};

    /// Span covering one session, from connect to teardown.
    pub fn session(host: &str, port: u16, nick: &str) -> Span {
        info_span!("session", host = %host, port = port, nick = %nick)
    }

    /// Span covering the dispatch of one received line.
    pub fn dispatch(command: &str, origin: &str) -> Span {
        if origin.is_empty() {
            debug_span!("irc.dispatch", command = %command)
        } else {
            debug_span!("irc.dispatch", command = %command, origin = %origin)
        }
    }
}
