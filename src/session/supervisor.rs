//! IRC session supervisor.
//!
//! Owns the connection: connect, register, run the read/write loop and
//! reconnect after a fixed backoff until shutdown. Only the supervisor ever
//! writes to the socket; dispatch tasks reach it through the outbound queue.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tracing::{error, info, warn};

use super::events::EventHandler;
use super::router::Router;
use super::state::SessionState;
use crate::context::BotContext;
use crate::dispatch::Dispatcher;
use crate::error::ConnectionError;
use crate::irc::{self, BotStream, Command, IrcCodec, Message};
use crate::outbound::Outgoing;

const QUIT_MESSAGE: &str = "Good bye";
const WIRE_CAPACITY: usize = 64;

type IrcFramed = Framed<BotStream, IrcCodec>;
type Drain = Pin<Box<dyn Future<Output = ()> + Send>>;

pub struct Supervisor {
    bot: Arc<BotContext>,
    state: Arc<SessionState>,
    router: Arc<dyn Router>,
    dispatcher: Arc<Dispatcher>,
}

impl Supervisor {
    pub fn new(
        bot: Arc<BotContext>,
        state: Arc<SessionState>,
        router: Arc<dyn Router>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            bot,
            state,
            router,
            dispatcher,
        }
    }

    /// Run until shutdown. Fails only when the very first connection
    /// attempt cannot be established.
    pub async fn run(&self) -> Result<(), ConnectionError> {
        let server = &self.bot.config.irc;
        let shutdown = self.bot.shutdown.clone();
        let backoff = self.bot.config.limits.reconnect_backoff();
        let mut attempt: u64 = 0;

        loop {
            attempt += 1;
            info!(server = %server.server, port = server.port, tls = server.tls, attempt, "Connecting");

            let connected = tokio::select! {
                _ = shutdown.cancelled() => return Ok(()),
                res = irc::connect(&server.server, server.port, server.tls) => res,
            };

            match connected {
                Ok(stream) => {
                    info!(tls = stream.is_tls(), "Connected, registering");
                    match self.run_session(stream).await {
                        Ok(()) => return Ok(()),
                        Err(e) => warn!(error = %e, "Session ended"),
                    }
                }
                Err(e) if attempt == 1 => {
                    error!(error = %e, "Initial connection failed");
                    return Err(e);
                }
                Err(e) => warn!(error = %e, "Connection failed"),
            }

            if shutdown.is_cancelled() {
                return Ok(());
            }
            info!(delay_secs = backoff.as_secs(), "Reconnecting after backoff");
            tokio::select! {
                _ = shutdown.cancelled() => return Ok(()),
                _ = tokio::time::sleep(backoff) => {}
            }
        }
    }

    /// One connection lifetime. `Ok` means the session ended on shutdown.
    async fn run_session(&self, stream: BotStream) -> Result<(), ConnectionError> {
        let mut framed = Framed::new(stream, IrcCodec::new());
        let (wire_tx, mut wire_rx) = mpsc::channel(WIRE_CAPACITY);

        let result = self.drive(&mut framed, wire_tx, &mut wire_rx).await;

        self.bot.outbound.detach();
        self.bot.outbound.reclaim(&mut wire_rx);
        self.state.set_connected(false);
        self.state.clear_pending();
        result
    }

    async fn drive(
        &self,
        framed: &mut IrcFramed,
        wire_tx: mpsc::Sender<Outgoing>,
        wire_rx: &mut mpsc::Receiver<Outgoing>,
    ) -> Result<(), ConnectionError> {
        let identity = &self.bot.config.irc;
        let limits = &self.bot.config.limits;

        if let Some(password) = &identity.server_password {
            framed.send(Message::from(Command::PASS(password.clone()))).await?;
        }
        framed.send(Message::from(Command::NICK(identity.name.clone()))).await?;
        framed
            .send(Message::from(Command::USER(
                identity.name.clone(),
                "0".to_string(),
                identity.realname.clone(),
            )))
            .await?;

        let mut events = EventHandler::new(
            self.bot.clone(),
            self.state.clone(),
            self.router.clone(),
            self.dispatcher.clone(),
        );
        let registration = tokio::time::sleep(limits.registration_timeout());
        tokio::pin!(registration);

        let mut stopping = false;
        let mut drain: Drain = Box::pin(std::future::pending());

        loop {
            tokio::select! {
                _ = self.bot.shutdown.cancelled(), if !stopping => {
                    stopping = true;
                    info!("Stopping: draining commands and outbound queue");
                    drain = self.drain_future();
                }
                _ = &mut drain => {
                    while let Ok(item) = wire_rx.try_recv() {
                        self.write_outgoing(framed, item).await?;
                    }
                    framed
                        .send(Message::from(Command::QUIT(Some(QUIT_MESSAGE.to_string()))))
                        .await?;
                    info!("Sent QUIT");
                    return Ok(());
                }
                _ = &mut registration, if !events.is_registered() => {
                    return Err(ConnectionError::RegistrationTimeout(
                        limits.registration_timeout_secs,
                    ));
                }
                Some(item) = wire_rx.recv() => {
                    self.write_outgoing(framed, item).await?;
                }
                incoming = framed.next() => {
                    let msg = match incoming {
                        Some(Ok(msg)) => msg,
                        Some(Err(e)) => return Err(e.into()),
                        None => return Err(ConnectionError::Closed),
                    };
                    let was_registered = events.is_registered();
                    for reply in events.handle(&msg)? {
                        framed.send(reply).await?;
                    }
                    if !was_registered && events.is_registered() {
                        self.bot.outbound.attach(wire_tx.clone());
                    }
                }
            }
        }
    }

    /// Write one queued line; it counts as delivered only once it is on the
    /// socket, otherwise it goes back to the queue.
    async fn write_outgoing(
        &self,
        framed: &mut IrcFramed,
        item: Outgoing,
    ) -> Result<(), ConnectionError> {
        match framed.send(item.to_message()).await {
            Ok(()) => {
                self.bot.outbound.mark_done();
                Ok(())
            }
            Err(e) => {
                self.bot.outbound.requeue(item);
                Err(e.into())
            }
        }
    }

    /// Command drain and outbound flush share one deadline.
    fn drain_future(&self) -> Drain {
        let dispatcher = self.dispatcher.clone();
        let outbound = self.bot.outbound.clone();
        let budget = self.bot.config.limits.drain_timeout();
        Box::pin(async move {
            let deadline = tokio::time::Instant::now() + budget;
            dispatcher.shutdown(budget).await;
            if tokio::time::timeout_at(deadline, outbound.wait_idle())
                .await
                .is_err()
            {
                warn!(pending = outbound.len(), "Outbound queue not empty at QUIT");
            }
        })
    }
}
