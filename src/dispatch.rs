//! Handler runtime.
//!
//! Every accepted command line runs in its own task: resolve, check the
//! permission floor, run the handler under a deadline and queue the reply.
//! A semaphore caps the number of running tasks; when it is exhausted the
//! caller gets an immediate "busy" reply instead of a queued task.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Level, debug, span, warn};

use crate::commands::{CommandContext, NodeKind, Outcome, Principal, check, resolve};
use crate::context::BotContext;
use crate::error::CommandError;

const UNKNOWN_COMMAND: &str = "Unknown command.";

pub struct Dispatcher {
    bot: Arc<BotContext>,
    permits: Arc<Semaphore>,
    max_inflight: u32,
    handler_timeout: Duration,
    /// Aborts tasks still running when the drain deadline passes.
    cancel: CancellationToken,
    closed: AtomicBool,
}

impl Dispatcher {
    pub fn new(bot: Arc<BotContext>) -> Self {
        let limits = &bot.config.limits;
        let max_inflight = u32::try_from(limits.max_inflight)
            .unwrap_or(u32::MAX)
            .max(1);
        let handler_timeout = limits.handler_timeout();
        Self {
            permits: Arc::new(Semaphore::new(max_inflight as usize)),
            max_inflight,
            handler_timeout,
            cancel: CancellationToken::new(),
            closed: AtomicBool::new(false),
            bot,
        }
    }

    /// Start a task for `line` (sigil already stripped). Returns `false` when
    /// the line was not run: either the runtime is draining or it is full,
    /// in which case the caller has been told it is busy.
    pub fn dispatch(&self, line: &str, principal: Principal) -> bool {
        if self.closed.load(Ordering::Acquire) {
            debug!(line = %line, "Dispatcher closed, dropping command");
            return false;
        }

        let Ok(permit) = self.permits.clone().try_acquire_owned() else {
            debug!(nick = %principal.nick, "Too many commands in flight");
            self.bot.deliver(&principal, &CommandError::Busy.reply());
            return false;
        };

        let bot = self.bot.clone();
        let cancel = self.cancel.clone();
        let timeout = self.handler_timeout;
        let line = line.to_string();
        let task_span = span!(
            Level::DEBUG,
            "command",
            nick = %principal.nick,
            channel = principal.channel_name(),
        );

        tokio::spawn(
            async move {
                let _permit = permit;
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!(line = %line, "Command abandoned at shutdown");
                    }
                    reply = execute(&bot, &line, &principal, timeout) => {
                        bot.deliver(&principal, &reply);
                    }
                }
            }
            .instrument(task_span),
        );
        true
    }

    /// Number of running dispatch tasks.
    pub fn inflight(&self) -> usize {
        (self.max_inflight as usize).saturating_sub(self.permits.available_permits())
    }

    /// Refuse new work, wait up to `drain` for running tasks, then cancel
    /// whatever is left.
    pub async fn shutdown(&self, drain: Duration) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let running = self.inflight();
        if running > 0 {
            debug!(running, "Draining dispatch tasks");
        }
        match tokio::time::timeout(drain, self.permits.acquire_many(self.max_inflight)).await {
            Ok(_) => debug!("All dispatch tasks finished"),
            Err(_) => warn!(
                abandoned = self.inflight(),
                "Drain deadline reached, cancelling dispatch tasks"
            ),
        }
        self.cancel.cancel();
    }
}

/// Resolve and run one command line; the result is the text to send back
/// (possibly empty).
pub async fn execute(
    bot: &Arc<BotContext>,
    line: &str,
    principal: &Principal,
    timeout: Duration,
) -> String {
    let resolution = resolve(bot.table.root(), line);
    let (node, args) = match resolution.outcome {
        Outcome::Found { node, args } => (node, args),
        Outcome::UnknownSubcommand { branch, .. } => return branch.help.clone(),
        Outcome::Unknown => {
            debug!(line = %line, "Unknown command");
            return UNKNOWN_COMMAND.to_string();
        }
    };
    let NodeKind::Leaf(handler) = &node.kind else {
        return UNKNOWN_COMMAND.to_string();
    };

    if let Err(e) = check(node.min_permission, principal.permission) {
        debug!(
            command = node.name,
            nick = %principal.nick,
            required = ?node.min_permission,
            "Permission denied"
        );
        return e.reply();
    }

    let ctx = CommandContext::new(principal.clone(), bot.clone());
    let result = match tokio::time::timeout(timeout, handler.handle(args, &ctx)).await {
        Ok(result) => result,
        Err(_) => Err(CommandError::Timeout(node.name.to_string())),
    };

    match result {
        Ok(reply) => reply,
        Err(e) => {
            match &e {
                CommandError::Upstream { .. } | CommandError::Timeout(_) => {
                    warn!(command = node.name, code = e.error_code(), error = %e, "Command failed")
                }
                _ => debug!(command = node.name, code = e.error_code(), error = %e, "Command error"),
            }
            e.reply()
        }
    }
}
