//! IRC session registry: own nick, joined channels, topics and NAMES.
//!
//! One mutex guards everything so a NAMES list is always published as a
//! single consistent snapshot.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;

/// Status prefixes a server may put in front of a NAMES entry.
const STATUS_PREFIXES: &[char] = &['@', '+', '%', '~', '&'];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IrcChannel {
    pub name: String,
    pub topic: String,
    pub members: Vec<String>,
}

impl IrcChannel {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    own_nick: String,
    connected: bool,
    /// Keyed by lowercased channel name.
    channels: HashMap<String, IrcChannel>,
    pending_names: HashMap<String, VecDeque<String>>,
}

#[derive(Debug, Default)]
pub struct SessionState {
    inner: Mutex<Inner>,
}

fn key(channel: &str) -> String {
    channel.to_lowercase()
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_own_nick(&self, nick: &str) {
        self.inner.lock().own_nick = nick.to_string();
    }

    pub fn own_nick(&self) -> String {
        self.inner.lock().own_nick.clone()
    }

    /// Whether `nick` is the bot itself.
    pub fn is_self(&self, nick: &str) -> bool {
        let inner = self.inner.lock();
        !inner.own_nick.is_empty() && inner.own_nick.eq_ignore_ascii_case(nick)
    }

    pub fn set_connected(&self, connected: bool) {
        self.inner.lock().connected = connected;
    }

    pub fn is_connected(&self) -> bool {
        self.inner.lock().connected
    }

    /// Register a channel the bot joined. Returns `false` if it was already known.
    pub fn on_self_join(&self, channel: &str) -> bool {
        let mut inner = self.inner.lock();
        let k = key(channel);
        if inner.channels.contains_key(&k) {
            return false;
        }
        inner.channels.insert(k, IrcChannel::new(channel));
        true
    }

    /// Forget a channel the bot left or was kicked from.
    pub fn on_self_leave(&self, channel: &str) -> Option<IrcChannel> {
        let mut inner = self.inner.lock();
        let k = key(channel);
        inner.pending_names.remove(&k);
        inner.channels.remove(&k)
    }

    /// Update the topic of a registered channel. Returns `false` for
    /// unknown channels.
    pub fn set_topic(&self, channel: &str, topic: &str) -> bool {
        match self.inner.lock().channels.get_mut(&key(channel)) {
            Some(chan) => {
                chan.topic = topic.to_string();
                true
            }
            None => false,
        }
    }

    /// Accumulate one NAMREPLY payload (space-separated, maybe prefixed).
    pub fn push_names(&self, channel: &str, names: &str) {
        let mut inner = self.inner.lock();
        let pending = inner.pending_names.entry(key(channel)).or_default();
        pending.extend(
            names
                .split(' ')
                .map(|n| n.trim_start_matches(STATUS_PREFIXES))
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        );
    }

    /// Move the accumulated NAMES into the channel's member list and hand
    /// the result to `publish` while still holding the lock. Returns
    /// `false` when the channel is not registered.
    pub fn finish_names(&self, channel: &str, publish: impl FnOnce(&str, &[String])) -> bool {
        let mut inner = self.inner.lock();
        let k = key(channel);
        let names: Vec<String> = inner
            .pending_names
            .remove(&k)
            .map(Vec::from)
            .unwrap_or_default();
        match inner.channels.get_mut(&k) {
            Some(chan) => {
                chan.members = names;
                publish(&chan.name, &chan.members);
                true
            }
            None => false,
        }
    }

    /// Names of all registered channels.
    pub fn channel_names(&self) -> Vec<String> {
        self.inner
            .lock()
            .channels
            .values()
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn channel(&self, channel: &str) -> Option<IrcChannel> {
        self.inner.lock().channels.get(&key(channel)).cloned()
    }

    /// Drop half-received NAMES lists; called when a session ends.
    pub fn clear_pending(&self) {
        self.inner.lock().pending_names.clear();
    }
}
