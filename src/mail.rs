//! In-memory mail queue.
//!
//! `mail <nick> <text>` stores a message here; it is handed out the next
//! time the recipient speaks or joins a channel the bot is in. Mail does not
//! survive a restart.

use std::collections::HashMap;

use chrono::{DateTime, Local};
use parking_lot::Mutex;

#[derive(Debug, Clone)]
pub struct Mail {
    pub from: String,
    pub text: String,
    pub sent_at: DateTime<Local>,
}

impl Mail {
    /// Render the delivery line addressed to `recipient`.
    pub fn render(&self, recipient: &str) -> String {
        format!(
            "{recipient}: {} t'a laissé un message ({}) : {}",
            self.from,
            self.sent_at.format("%d/%m/%Y %H:%M"),
            self.text
        )
    }
}

#[derive(Debug, Default)]
pub struct MailQueue {
    /// Keyed by lowercased recipient nick.
    pending: Mutex<HashMap<String, Vec<Mail>>>,
}

impl MailQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&self, from: &str, to: &str, text: &str) {
        let mail = Mail {
            from: from.to_string(),
            text: text.to_string(),
            sent_at: Local::now(),
        };
        self.pending
            .lock()
            .entry(to.to_lowercase())
            .or_default()
            .push(mail);
    }

    /// Remove and return every pending mail for `nick`, oldest first.
    pub fn take(&self, nick: &str) -> Vec<Mail> {
        self.pending
            .lock()
            .remove(&nick.to_lowercase())
            .unwrap_or_default()
    }

    pub fn pending(&self, nick: &str) -> usize {
        self.pending
            .lock()
            .get(&nick.to_lowercase())
            .map_or(0, Vec::len)
    }
}
