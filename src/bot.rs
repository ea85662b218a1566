//! Wiring of the long-lived tasks.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::Config;
use crate::console;
use crate::context::BotContext;
use crate::dispatch::Dispatcher;
use crate::error::ConnectionError;
use crate::outbound::OutboundWriter;
use crate::session::{LogRouter, Router, SessionState, Supervisor};

pub struct Bot {
    ctx: Arc<BotContext>,
    router: Arc<dyn Router>,
}

impl Bot {
    pub fn new(config: Config) -> Self {
        Self::with_context(Arc::new(BotContext::new(config)))
    }

    /// Build around an existing context, e.g. one with stubbed HTTP collaborators.
    pub fn with_context(ctx: Arc<BotContext>) -> Self {
        Self {
            ctx,
            router: Arc::new(LogRouter),
        }
    }

    #[must_use]
    pub fn with_router(mut self, router: Arc<dyn Router>) -> Self {
        self.router = router;
        self
    }

    pub fn context(&self) -> &Arc<BotContext> {
        &self.ctx
    }

    /// Run until `stop` or a fatal initial connection failure.
    pub async fn run(self) -> Result<(), ConnectionError> {
        let ctx = self.ctx;
        let config = ctx.config.clone();
        let dispatcher = Arc::new(Dispatcher::new(ctx.clone()));
        let state = Arc::new(SessionState::new());

        let writer_stop = CancellationToken::new();
        let writer = tokio::spawn(
            OutboundWriter::new(ctx.outbound.clone(), config.limits.outbound_spacing())
                .run(writer_stop.clone()),
        );

        let console = config.console.enabled.then(|| {
            tokio::spawn(console::run(
                console::stdin_lines(),
                dispatcher.clone(),
                config.irc.sigil,
                ctx.shutdown.clone(),
            ))
        });

        info!(nick = %config.irc.name, "Starting slircbot");
        let supervisor = Supervisor::new(ctx.clone(), state, self.router, dispatcher.clone());
        let result = supervisor.run().await;

        ctx.request_shutdown();
        dispatcher.shutdown(config.limits.drain_timeout()).await;
        writer_stop.cancel();
        if let Err(e) = writer.await {
            debug!(error = %e, "Outbound writer task failed");
        }
        if let Some(console) = console {
            console.abort();
        }

        info!("slircbot stopped");
        result
    }
}
