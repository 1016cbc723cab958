//! IRCv3 capability negotiation.
//!
//! `CAP LS` may span several lines (`CAP * LS * :...`); offers are collected
//! until the final line, then the wanted subset is requested and
//! negotiation is closed with `CAP END` before registering.

use super::{Context, Handler};
use crate::error::{HandlerError, HandlerResult};
use crate::event::Event;
use crate::state::Phase;
use slirc_wire::{Message, compile};
use tracing::debug;

/// Handler for CAP.
pub struct CapHandler;

impl Handler for CapHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        ctx.state.ircv3 = true;

        let sub = msg.arg(1).ok_or(HandlerError::NeedMoreParams)?;
        match sub.to_ascii_uppercase().as_str() {
            "LS" => handle_ls(ctx, msg),
            "ACK" => {
                ctx.state
                    .enabled_caps
                    .extend(msg.trailing.split_whitespace().map(str::to_string));
                ctx.emit(Event::CapabilityAccepted(msg.trailing.clone()));
            }
            "NAK" => ctx.emit(Event::CapabilityRejected(msg.trailing.clone())),
            other => debug!(subcommand = %other, "Ignoring CAP subcommand"),
        }
        Ok(())
    }
}

fn handle_ls(ctx: &mut Context<'_>, msg: &Message) {
    ctx.state
        .offered_caps
        .extend(msg.trailing.split_whitespace().map(str::to_string));

    // More LS lines follow.
    if msg.arg(2) == Some("*") {
        return;
    }

    if ctx.state.phase != Phase::Registering {
        return;
    }

    let wanted: Vec<&str> = ctx
        .config
        .request_caps
        .iter()
        .map(String::as_str)
        .filter(|cap| ctx.state.offers(cap))
        .collect();
    let request = wanted.join(" ");

    debug!(offered = ctx.state.offered_caps.len(), requested = %request, "CAP LS complete");

    if !request.is_empty() {
        ctx.send(compile("CAP", &["REQ"], &request));
    }
    ctx.send("CAP END");
    ctx.register();
}
