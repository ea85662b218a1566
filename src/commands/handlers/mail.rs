//! `mail <nick> <message>`

use async_trait::async_trait;

use crate::commands::context::{CommandContext, CommandHandler};
use crate::error::{CommandError, CommandResult};

pub struct MailHandler;

#[async_trait]
impl CommandHandler for MailHandler {
    async fn handle(&self, args: &str, ctx: &CommandContext) -> CommandResult {
        let (nick, text) = args.split_once(' ').unwrap_or((args, ""));
        let text = text.trim_start_matches(' ');
        if nick.is_empty() || text.is_empty() {
            let usage = format!("Usage : {}mail <pseudo> <message>", ctx.bot.table.sigil());
            return Err(CommandError::Usage(usage));
        }

        ctx.bot.mail.post(&ctx.principal.nick, nick, text);
        Ok(format!("Send message to {nick}"))
    }
}
