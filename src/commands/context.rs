//! Handler trait and the per-dispatch context handed to it.

use std::sync::Arc;

use async_trait::async_trait;

use super::permission::Principal;
use crate::context::BotContext;
use crate::error::CommandResult;

/// Everything a handler may see while it runs: the caller and the shared,
/// read-only bot services.
pub struct CommandContext {
    pub principal: Principal,
    pub bot: Arc<BotContext>,
}

impl CommandContext {
    pub fn new(principal: Principal, bot: Arc<BotContext>) -> Self {
        Self { principal, bot }
    }

    /// Send `text` to wherever the command came from, ahead of the reply.
    pub fn publish(&self, text: &str) {
        self.bot.deliver(&self.principal, text);
    }
}

/// A leaf command implementation.
///
/// `args` is the residual input after the command path, passed verbatim.
/// The returned string is the reply; an empty string sends nothing.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, args: &str, ctx: &CommandContext) -> CommandResult;
}
