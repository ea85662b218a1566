//! Bot-internal commands: help, list, say, stop, vdm.

use async_trait::async_trait;
use tracing::info;

use crate::commands::context::{CommandContext, CommandHandler};
use crate::commands::resolver::{Outcome, resolve};
use crate::error::{CommandError, CommandResult};

fn command_list(ctx: &CommandContext) -> String {
    let names: Vec<_> = ctx.bot.table.names().collect();
    format!("Command list : {}", names.join(", "))
}

/// `help [command]`
pub struct HelpHandler;

#[async_trait]
impl CommandHandler for HelpHandler {
    async fn handle(&self, args: &str, ctx: &CommandContext) -> CommandResult {
        if args.is_empty() {
            return Ok(format!(
                "/help <command> to get the help of the command \n{}",
                command_list(ctx)
            ));
        }

        let reply = match resolve(ctx.bot.table.root(), args).outcome {
            Outcome::Found { node, .. } => node.help.clone(),
            Outcome::UnknownSubcommand { branch, .. } => {
                let mut text = format!("{}\n", branch.help);
                for child in branch.children() {
                    text.push_str(&format!("{}\n\t{}\n", child.name, child.help));
                }
                text
            }
            Outcome::Unknown => "Command not found".to_string(),
        };
        Ok(reply)
    }
}

/// `list`
pub struct ListHandler;

#[async_trait]
impl CommandHandler for ListHandler {
    async fn handle(&self, _args: &str, ctx: &CommandContext) -> CommandResult {
        Ok(command_list(ctx))
    }
}

/// `say <text>`: echo `text` verbatim to where the command came from.
pub struct SayHandler;

#[async_trait]
impl CommandHandler for SayHandler {
    async fn handle(&self, args: &str, ctx: &CommandContext) -> CommandResult {
        if args.is_empty() {
            let usage = format!("Usage: {}say text", ctx.bot.table.sigil());
            return Err(CommandError::Usage(usage));
        }
        ctx.publish(args);
        Ok(String::new())
    }
}

/// `stop`
pub struct StopHandler;

#[async_trait]
impl CommandHandler for StopHandler {
    async fn handle(&self, _args: &str, ctx: &CommandContext) -> CommandResult {
        info!(nick = %ctx.principal.nick, "Stop requested");
        ctx.publish("Noooo, I died !! Good bye my friends !");
        ctx.bot.request_shutdown();
        Ok("Server stop...".to_string())
    }
}

pub struct VdmHandler;

#[async_trait]
impl CommandHandler for VdmHandler {
    async fn handle(&self, _args: &str, _ctx: &CommandContext) -> CommandResult {
        Ok("WIP".to_string())
    }
}
