//! Command handler registry and dispatch.
//!
//! Each command word or numeric code maps to exactly one handler. Codes are
//! never chained: a line is handled by its own handler or not at all.

use super::context::{Context, Handler};
use crate::handlers::{
    cap::CapHandler,
    channel::{EndOfNamesHandler, JoinHandler, KickHandler, NamesHandler, PartHandler, TopicHandler},
    connection::{NickInUseHandler, PingHandler, PongHandler, UnknownCommandHandler, WelcomeHandler},
    messaging::PrivmsgHandler,
    server::{IsupportHandler, MotdHandler},
    user::{NickHandler, QuitHandler},
};
use slirc_wire::Message;
use std::collections::HashMap;
use tracing::debug;

/// Registry of command handlers.
pub struct Registry {
    handlers: HashMap<&'static str, Box<dyn Handler>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create a registry with all handlers registered.
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Box<dyn Handler>> = HashMap::new();

        // Connection/registration handlers
        handlers.insert("PING", Box::new(PingHandler));
        handlers.insert("PONG", Box::new(PongHandler));
        handlers.insert("CAP", Box::new(CapHandler));
        handlers.insert("001", Box::new(WelcomeHandler));
        handlers.insert("421", Box::new(UnknownCommandHandler));
        handlers.insert("433", Box::new(NickInUseHandler));

        // Channel handlers
        handlers.insert("JOIN", Box::new(JoinHandler));
        handlers.insert("PART", Box::new(PartHandler));
        handlers.insert("KICK", Box::new(KickHandler));
        handlers.insert("TOPIC", Box::new(TopicHandler::command()));
        handlers.insert("332", Box::new(TopicHandler::reply()));
        handlers.insert("353", Box::new(NamesHandler));
        handlers.insert("366", Box::new(EndOfNamesHandler));

        // User handlers
        handlers.insert("NICK", Box::new(NickHandler));
        handlers.insert("QUIT", Box::new(QuitHandler));

        // Messaging handlers
        handlers.insert("PRIVMSG", Box::new(PrivmsgHandler));

        // Server info handlers
        handlers.insert("005", Box::new(IsupportHandler));
        handlers.insert("375", Box::new(MotdHandler::start()));
        handlers.insert("372", Box::new(MotdHandler::line()));
        handlers.insert("376", Box::new(MotdHandler::end()));

        Self { handlers }
    }

    /// Whether a handler exists for `verb`.
    pub fn handles(&self, verb: &str) -> bool {
        self.handlers.contains_key(verb)
    }

    /// Dispatch a parsed line to its handler.
    ///
    /// Lines without a handler (including failed parses) are ignored; the
    /// reader has already forwarded them as `DataReceived`. Handler errors
    /// are logged and dropped.
    pub fn dispatch(&self, ctx: &mut Context<'_>, msg: &Message) {
        let verb = msg.verb();
        let Some(handler) = self.handlers.get(verb.as_str()) else {
            return;
        };

        let _span = crate::telemetry::spans::dispatch(&verb, &msg.origin).entered();

        if let Err(e) = handler.handle(ctx, msg) {
            debug!(command = %verb, error = %e, raw = %msg.raw, "Command error");
        }
    }
}
