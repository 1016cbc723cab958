//! PRIVMSG routing into channel and user buffers.

use super::{Context, Handler};
use crate::error::{HandlerError, HandlerResult};
use slirc_wire::Message;

fn is_channel(target: &str) -> bool {
    target.starts_with('#') || target.starts_with('&')
}

/// Handler for PRIVMSG.
pub struct PrivmsgHandler;

impl Handler for PrivmsgHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let target = msg.arg(0).ok_or(HandlerError::NeedMoreParams)?;
        let sender = msg.nick();

        if is_channel(target) {
            if let Some(channel) = ctx.store.channel_mut(target) {
                channel.add_message(msg.clone());
                if let Some(member) = channel.user_mut(sender) {
                    member.add_message(msg.clone());
                }
            }
            return Ok(());
        }

        // Direct message: the conversation is keyed by the sender.
        if sender.is_empty() {
            return Err(HandlerError::NoSource);
        }
        ctx.store.ensure_user(sender).add_message(msg.clone());
        Ok(())
    }
}
