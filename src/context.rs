//! Shared bot services.
//!
//! One `BotContext` is built at startup and handed to the supervisor, the
//! dispatcher and every handler. It only holds read-only data and
//! collaborators that synchronize internally.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::commands::{CommandTable, Principal};
use crate::config::Config;
use crate::http::{GitlabApi, GitlabClient, HttpJsonFetcher, JsonFetcher};
use crate::mail::MailQueue;
use crate::outbound::OutboundQueue;

pub struct BotContext {
    pub config: Arc<Config>,
    pub table: CommandTable,
    pub outbound: Arc<OutboundQueue>,
    pub mail: Arc<MailQueue>,
    pub json: Arc<dyn JsonFetcher>,
    pub gitlab: Arc<dyn GitlabApi>,
    /// Tripped by `stop`; every long-lived task watches it.
    pub shutdown: CancellationToken,
}

impl BotContext {
    /// Build the context with the real HTTP collaborators.
    pub fn new(config: Config) -> Self {
        let timeout = config.limits.handler_timeout();
        let json = Arc::new(HttpJsonFetcher::new(timeout));
        let gitlab = Arc::new(GitlabClient::new(
            &config.gitlab.uri,
            &config.gitlab.api_key,
            timeout,
        ));
        Self::with_collaborators(config, json, gitlab)
    }

    /// Build the context around caller-provided HTTP collaborators.
    pub fn with_collaborators(
        config: Config,
        json: Arc<dyn JsonFetcher>,
        gitlab: Arc<dyn GitlabApi>,
    ) -> Self {
        let table = CommandTable::builtin(config.irc.sigil);
        let outbound = Arc::new(OutboundQueue::new(config.limits.outbound_ttl()));
        Self {
            config: Arc::new(config),
            table,
            outbound,
            mail: Arc::new(MailQueue::new()),
            json,
            gitlab,
            shutdown: CancellationToken::new(),
        }
    }

    /// Route `text` to the principal's reply target. Console replies go to
    /// stdout; everything else goes through the outbound queue.
    pub fn deliver(&self, principal: &Principal, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        match principal.reply_target() {
            Some(target) => {
                self.outbound.enqueue(target, text);
            }
            None => {
                for line in text.lines().map(str::trim_end).filter(|l| !l.is_empty()) {
                    println!("{line}");
                }
            }
        }
    }

    /// Trip the shutdown token.
    pub fn request_shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            info!("Shutdown requested");
            self.shutdown.cancel();
        }
    }
}
