//! Connection and registration handlers: PING, PONG, 001, 421, 433.

use super::{Context, Handler};
use crate::error::HandlerResult;
use crate::event::Event;
use crate::state::Phase;
use slirc_wire::{Message, compile};
use tracing::{debug, info, warn};

/// Handler for PING.
pub struct PingHandler;

impl Handler for PingHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        // Echo the parameters verbatim when we can.
        let pong = match msg.raw.strip_prefix("PING") {
            Some(params) => format!("PONG{params}"),
            None => compile::<&str>("PONG", &[], &msg.trailing),
        };
        ctx.send(pong);
        Ok(())
    }
}

/// Handler for PONG: completes lag probes.
pub struct PongHandler;

impl Handler for PongHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        // Some servers send the token as a plain final parameter.
        let payload = match msg.trailing.as_str() {
            "" => msg.args.last().map_or("", String::as_str),
            trailing => trailing,
        };

        if let Some(rtt) = ctx.state.lag_probe.complete(payload, ctx.now) {
            ctx.state.lag = Some(rtt);
            ctx.emit(Event::LagMeasured(rtt.as_millis() as u64));
            return Ok(());
        }

        let user_rtt = ctx.user_probe.lock().complete(payload, ctx.now);
        if let Some(rtt) = user_rtt {
            ctx.emit(Event::UserLagMeasured(rtt.as_millis() as u64));
        }
        Ok(())
    }
}

/// Handler for RPL_WELCOME (001).
pub struct WelcomeHandler;

impl Handler for WelcomeHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        ctx.state.welcomed = true;
        if ctx.state.phase.is_open() {
            ctx.state.phase = Phase::Registered;
        }
        if let Some(nick) = msg.arg(0).filter(|n| !n.is_empty()) {
            ctx.state.nick = nick.to_string();
        }
        if ctx.state.server_name.is_empty() {
            ctx.state.server_name = msg.server_name.clone();
        }
        ctx.state.lag_timer_armed = true;

        info!(server = %msg.server_name, nick = %ctx.state.nick, "Registered");
        ctx.emit(Event::Connected(msg.server_name.clone()));

        let (server, config) = (ctx.server, ctx.config);
        if let Some(pass) = server.nickserv_password.as_deref().filter(|p| !p.is_empty()) {
            ctx.send(compile("PRIVMSG", &["NickServ"], &format!("IDENTIFY {pass}")));
        }

        for channel in &config.autojoin {
            ctx.send(compile("JOIN", &[channel.as_str()], ""));
        }
        Ok(())
    }
}

/// Handler for ERR_UNKNOWNCOMMAND (421).
///
/// A server without `CAP` support rejects our `CAP LS`; register directly.
pub struct UnknownCommandHandler;

impl Handler for UnknownCommandHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        if msg.arg(1).is_some_and(|cmd| cmd.eq_ignore_ascii_case("CAP")) {
            debug!("Server does not support CAP");
            ctx.register();
        }
        Ok(())
    }
}

/// Handler for ERR_NICKNAMEINUSE (433) during registration.
pub struct NickInUseHandler;

impl Handler for NickInUseHandler {
    fn handle(&self, ctx: &mut Context<'_>, _msg: &Message) -> HandlerResult {
        if ctx.state.welcomed || ctx.state.registration_abandoned {
            return Ok(());
        }

        let nick = ctx.state.nick.clone();
        if !ctx.state.using_second_nick {
            let second = ctx.server.second_nick();
            warn!(nick = %nick, retry = %second, "Nickname in use");
            ctx.emit(Event::FirstNickInUse(nick));
            ctx.state.nick = second.clone();
            ctx.state.using_second_nick = true;
            ctx.send(compile("NICK", &[second.as_str()], ""));
        } else {
            warn!(nick = %nick, "All nicknames in use, giving up registration");
            ctx.emit(Event::AllNicksInUse(nick));
            ctx.state.registration_abandoned = true;
        }
        Ok(())
    }
}
