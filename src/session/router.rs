//! Event sink for everything that is not a command.

use tracing::debug;

/// Receives IRC events the bot itself does not act on. All methods default
/// to doing nothing.
pub trait Router: Send + Sync {
    fn on_connection(&self, _own_nick: &str) {}

    fn on_message(&self, _target: &str, _nick: &str, _text: &str) {}

    fn on_notice(&self, _source: &str, _text: &str) {}

    fn on_join(&self, _channel: &str, _nick: &str) {}

    fn on_part(&self, _channel: &str, _nick: &str) {}

    fn on_kick(&self, _channel: &str, _victim: &str, _by: &str) {}

    fn on_topic(&self, _channel: &str, _topic: &str) {}

    fn on_members(&self, _channel: &str, _members: &[String]) {}
}

/// Records every event at `debug`.
#[derive(Debug, Default)]
pub struct LogRouter;

impl Router for LogRouter {
    fn on_connection(&self, own_nick: &str) {
        debug!(nick = %own_nick, "Connected");
    }

    fn on_message(&self, target: &str, nick: &str, text: &str) {
        debug!(target = %target, nick = %nick, text = %text, "Message");
    }

    fn on_notice(&self, source: &str, text: &str) {
        debug!(source = %source, text = %text, "Notice");
    }

    fn on_join(&self, channel: &str, nick: &str) {
        debug!(channel = %channel, nick = %nick, "Join");
    }

    fn on_part(&self, channel: &str, nick: &str) {
        debug!(channel = %channel, nick = %nick, "Part");
    }

    fn on_kick(&self, channel: &str, victim: &str, by: &str) {
        debug!(channel = %channel, victim = %victim, by = %by, "Kick");
    }

    fn on_topic(&self, channel: &str, topic: &str) {
        debug!(channel = %channel, topic = %topic, "Topic");
    }

    fn on_members(&self, channel: &str, members: &[String]) {
        debug!(channel = %channel, count = members.len(), "Members");
    }
}
