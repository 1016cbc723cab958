//! Handler context and trait.
//!
//! Dispatch is synchronous: a handler mutates state through the context and
//! records the events and outbound lines it produces. The reader forwards
//! both once the state lock is released.

use crate::config::{ServerInfo, SessionConfig};
use crate::error::HandlerResult;
use crate::event::Event;
use crate::lag::LagProbe;
use crate::outbound::IdSource;
use crate::state::{Phase, SessionState, Store};
use parking_lot::Mutex;
use slirc_wire::{Message, compile};
use std::time::Instant;
use tracing::{debug, info};

/// Everything a handler may touch while handling one line.
pub struct Context<'a> {
    pub state: &'a mut SessionState,
    pub store: &'a mut Store,
    pub server: &'a ServerInfo,
    pub config: &'a SessionConfig,
    pub ids: &'a IdSource,
    /// Probe armed by `/ping` on the embedder's side.
    pub user_probe: &'a Mutex<LagProbe>,
    /// When the line was received.
    pub now: Instant,
    pub events: Vec<Event>,
    pub outbound: Vec<String>,
}

impl<'a> Context<'a> {
    pub fn new(
        state: &'a mut SessionState,
        store: &'a mut Store,
        server: &'a ServerInfo,
        config: &'a SessionConfig,
        ids: &'a IdSource,
        user_probe: &'a Mutex<LagProbe>,
    ) -> Self {
        Self {
            state,
            store,
            server,
            config,
            ids,
            user_probe,
            now: Instant::now(),
            events: Vec::new(),
            outbound: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Queue a raw command for the writer.
    pub fn send(&mut self, line: impl Into<String>) {
        self.outbound.push(line.into());
    }

    pub fn is_self(&self, nick: &str) -> bool {
        self.state.is_self(nick)
    }

    /// Send `PASS`/`NICK`/`USER` with the current nick.
    ///
    /// Only runs while registering, so a late `CAP LS` or 421 cannot
    /// register twice.
    pub fn register(&mut self) {
        if self.state.phase != Phase::Registering {
            debug!(phase = %self.state.phase, "Ignoring registration request");
            return;
        }

        let server = self.server;
        if let Some(pass) = server.server_password.as_deref().filter(|p| !p.is_empty()) {
            self.send(compile("PASS", &[pass], ""));
        }
        let nick = self.state.nick.clone();
        self.send(compile("NICK", &[nick.as_str()], ""));
        self.send(compile(
            "USER",
            &[server.username.as_str(), "0", "*"],
            &server.realname,
        ));

        self.state.phase = Phase::Registered;
        info!(nick = %nick, "Registration sent");
    }
}

/// Handles one command or numeric.
pub trait Handler: Send + Sync {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult;
}
