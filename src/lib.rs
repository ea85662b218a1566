//! slircbot - Straylight IRC Bot
//!
//! An IRC bot that answers sigil-prefixed commands from a static command
//! tree. Commands run as bounded, deadline-limited tasks; their replies go
//! through a rate-limited outbound queue owned by the session supervisor.

pub mod bot;
pub mod commands;
pub mod config;
pub mod console;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod irc;
pub mod mail;
pub mod outbound;
pub mod session;

pub use bot::Bot;
pub use config::Config;
pub use context::BotContext;
