//! Integration test common infrastructure.
//!
//! The tests play the IRC server: [`FakeServer`] listens on an ephemeral
//! port, the bot under test connects to it and every line it writes can be
//! asserted on.

pub mod server;
pub mod stubs;

use std::sync::Arc;

use slircbot::error::ConnectionError;
use slircbot::{Bot, BotContext, Config};
use tokio::task::JoinHandle;

#[allow(unused_imports)]
pub use server::{FakeServer, ServerConn};
#[allow(unused_imports)]
pub use stubs::{StubGitlab, StubJson};

const CONFIG_TEMPLATE: &str = r##"
admins = ["root"]

[irc]
server = "127.0.0.1"
port = {port}
name = "slircbot"
password = "hunter2"

[[irc.channels]]
name = "#dev"
gitlab = { project = "bot", namespace = "straylight" }

[gitlab]
uri = "http://gitlab.invalid"
api_key = "secret"

[webknox]
api_key = "knox"

[limits]
outbound_spacing_ms = 0
reconnect_backoff_secs = 1
drain_timeout_secs = 2
registration_timeout_secs = 5
"##;

/// Test configuration pointing at `port`.
pub fn config(port: u16) -> Config {
    let text = CONFIG_TEMPLATE.replace("{port}", &port.to_string());
    toml::from_str(&text).expect("test config must parse")
}

/// Start the bot with stubbed HTTP collaborators.
pub fn start(config: Config) -> (Arc<BotContext>, JoinHandle<Result<(), ConnectionError>>) {
    let ctx = Arc::new(BotContext::with_collaborators(
        config,
        Arc::new(StubJson),
        Arc::new(StubGitlab),
    ));
    let bot = Bot::with_context(ctx.clone());
    (ctx, tokio::spawn(bot.run()))
}
