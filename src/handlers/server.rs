//! Server information: ISUPPORT (005) and MOTD (375/372/376).

use super::{Context, Handler};
use crate::error::HandlerResult;
use crate::event::Event;
use slirc_wire::{Message, PrefixTable, split_token};
use tracing::{debug, info};

/// Handler for RPL_ISUPPORT (005).
pub struct IsupportHandler;

impl Handler for IsupportHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        // :server 005 me TOKEN TOKEN=value ... :are supported by this server
        for token in msg.args.iter().skip(1) {
            let (key, value) = split_token(token);
            match key.as_str() {
                "PREFIX" => match PrefixTable::parse(value) {
                    Some(table) => ctx.state.prefixes = table,
                    None => debug!(value = %value, "Malformed PREFIX token"),
                },
                "NETWORK" if !value.is_empty() => {
                    info!(network = %value, "Network name");
                    ctx.state.server_name = value.to_string();
                    ctx.emit(Event::GotServerName(value.to_string()));
                }
                _ => {}
            }
            ctx.state.isupport.insert(key, value.to_string());
        }
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum MotdStep {
    Start,
    Line,
    End,
}

/// Handler for RPL_MOTDSTART, RPL_MOTD and RPL_ENDOFMOTD.
pub struct MotdHandler {
    step: MotdStep,
}

impl MotdHandler {
    pub fn start() -> Self {
        Self {
            step: MotdStep::Start,
        }
    }

    pub fn line() -> Self {
        Self {
            step: MotdStep::Line,
        }
    }

    pub fn end() -> Self {
        Self { step: MotdStep::End }
    }
}

impl Handler for MotdHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        match self.step {
            MotdStep::Start => ctx.state.start_motd(),
            MotdStep::Line => ctx.state.push_motd(&msg.trailing),
            MotdStep::End => {
                let motd = ctx.state.finish_motd();
                ctx.emit(Event::GotMotd(motd));
            }
        }
        Ok(())
    }
}
