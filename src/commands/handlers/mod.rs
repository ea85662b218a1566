//! Built-in command handlers.
//!
//! Handlers are organized by concern:
//! - [`builtin`]: help, list, say, stop, vdm
//! - [`fun`]: weather and the joke/quote APIs
//! - [`gitlab`]: `gitlab issue`
//! - [`mail`]: `mail`

mod builtin;
mod fun;
mod gitlab;
mod mail;

pub use builtin::{HelpHandler, ListHandler, SayHandler, StopHandler, VdmHandler};
pub use fun::{ChuckNorrisHandler, JokeHandler, QuoteHandler, WeatherHandler};
pub use gitlab::GitlabIssueHandler;
pub use mail::MailHandler;
