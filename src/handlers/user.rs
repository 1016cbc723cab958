//! User handlers: NICK, QUIT.

use super::{Context, Handler};
use crate::error::{HandlerError, HandlerResult};
use slirc_wire::Message;
use tracing::info;

/// Handler for NICK.
pub struct NickHandler;

impl Handler for NickHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let old = msg.nick();
        if old.is_empty() {
            return Err(HandlerError::NoSource);
        }
        let new = msg.trailing.as_str();
        if new.is_empty() {
            return Err(HandlerError::NeedMoreParams);
        }

        if ctx.is_self(old) {
            info!(old = %old, new = %new, "Our nick changed");
            ctx.state.nick = new.to_string();
        }
        ctx.store.rename_user(old, new);
        Ok(())
    }
}

/// Handler for QUIT.
pub struct QuitHandler;

impl Handler for QuitHandler {
    fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let nick = msg.nick();
        if nick.is_empty() {
            return Err(HandlerError::NoSource);
        }
        let preserve_users = ctx.config.preserve_users;
        ctx.store.remove_user_everywhere(nick, preserve_users);
        Ok(())
    }
}
