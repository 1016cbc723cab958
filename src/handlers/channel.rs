//! Channel handlers: JOIN, PART, KICK, TOPIC/332, NAMES (353/366).

use super::{Context, Handler};
use crate::error::{HandlerError, HandlerResult};
use crate::event::Event;
use chrono::Utc;
use slirc_wire::Message;
use tracing::{debug, info};

/// First positional argument, or the trailing text (`JOIN :#chan`).
fn channel_param(msg: &Message) -> Result<&str, HandlerError> {
    msg.arg(0)
        .or(Some(msg.trailing.as_str()))
        .filter(|c| !c.is_empty())
        .ok_or(HandlerError::NeedMoreParams)
}

/// Handler for JOIN.
pub struct JoinHandler;

impl Handler for JoinHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let channel = channel_param(msg)?;
        let nick = msg.nick();
        if nick.is_empty() {
            return Err(HandlerError::NoSource);
        }

        if ctx.is_self(nick) {
            info!(channel = %channel, "Joined channel");
            ctx.store.join_channel(channel, Utc::now());
            return Ok(());
        }

        // Joins to channels we are not in are not tracked.
        let Some(chan) = ctx.store.channel_mut(channel) else {
            return Ok(());
        };
        chan.add_user(nick, "");
        ctx.store.ensure_user(nick);
        Ok(())
    }
}

/// Handler for PART.
pub struct PartHandler;

impl Handler for PartHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let channel = channel_param(msg)?;
        let nick = msg.nick();
        let (preserve_channels, preserve_users) =
            (ctx.config.preserve_channels, ctx.config.preserve_users);

        if ctx.is_self(nick) {
            info!(channel = %channel, "Left channel");
            ctx.emit(Event::LeftChannel(channel.to_string()));
            ctx.store
                .leave_channel(channel, preserve_channels, preserve_users);
        } else {
            ctx.store.remove_member(channel, nick, preserve_users);
        }
        Ok(())
    }
}

/// Handler for KICK.
pub struct KickHandler;

impl Handler for KickHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let (Some(channel), Some(target)) = (msg.arg(0), msg.arg(1)) else {
            return Err(HandlerError::NeedMoreParams);
        };
        let (preserve_channels, preserve_users) =
            (ctx.config.preserve_channels, ctx.config.preserve_users);

        if ctx.is_self(target) {
            info!(channel = %channel, by = %msg.nick(), reason = %msg.trailing, "Kicked");
            ctx.emit(Event::Kicked(msg.clone()));
            ctx.emit(Event::LeftChannel(channel.to_string()));
            ctx.store
                .leave_channel(channel, preserve_channels, preserve_users);
        } else {
            ctx.store.remove_member(channel, target, preserve_users);
        }
        Ok(())
    }
}

/// Handler for TOPIC and RPL_TOPIC (332).
pub struct TopicHandler {
    /// Index of the channel argument.
    channel_arg: usize,
}

impl TopicHandler {
    /// `:nick!user@host TOPIC #chan :text`
    pub fn command() -> Self {
        Self { channel_arg: 0 }
    }

    /// `:server 332 me #chan :text`
    pub fn reply() -> Self {
        Self { channel_arg: 1 }
    }
}

impl Handler for TopicHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let channel = msg
            .arg(self.channel_arg)
            .ok_or(HandlerError::NeedMoreParams)?;

        // A lone channel argument is copied into `trailing`; that is a
        // cleared topic, not a topic equal to the channel name.
        let topic = if msg.args.len() == self.channel_arg + 1
            && msg.trailing == channel
            && !msg.raw.ends_with(&format!(" :{channel}"))
        {
            ""
        } else {
            msg.trailing.as_str()
        };

        match ctx.store.channel_mut(channel) {
            Some(chan) => chan.set_topic(topic),
            None => debug!(channel = %channel, "Topic for unknown channel"),
        }
        Ok(())
    }
}

/// Handler for RPL_NAMREPLY (353).
pub struct NamesHandler;

impl Handler for NamesHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        // :server 353 me = #chan :@alice +bob carol
        if msg.args.len() < 2 {
            return Err(HandlerError::NeedMoreParams);
        }
        let channel = msg.args.last().ok_or(HandlerError::NeedMoreParams)?;

        let now = Utc::now();
        for entry in msg.trailing.split_whitespace() {
            let (modes, nick) = ctx.state.prefixes.split_nick(entry);
            if nick.is_empty() {
                continue;
            }
            ctx.store.ensure_channel(channel, now).add_user(nick, &modes);
            ctx.store.ensure_user(nick);
        }
        Ok(())
    }
}

/// Handler for RPL_ENDOFNAMES (366).
pub struct EndOfNamesHandler;

impl Handler for EndOfNamesHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let channel = msg.arg(1).ok_or(HandlerError::NeedMoreParams)?;
        ctx.emit(Event::JoinedChannel(channel.to_string()));
        Ok(())
    }
}
