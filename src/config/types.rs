//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// IRC connection and channel list.
    pub irc: IrcConfig,
    /// GitLab API endpoint used by `gitlab issue`.
    #[serde(default)]
    pub gitlab: GitlabConfig,
    #[serde(default)]
    pub openweathermap: ApiKeyConfig,
    /// Key for the webknox joke API.
    #[serde(default)]
    pub webknox: ApiKeyConfig,
    /// Nicks granted the ADMIN permission.
    #[serde(default)]
    pub admins: Vec<String>,
    /// Concurrency, deadline and flood-control limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Whether `nick` is listed in `admins` (IRC nicks compare case-insensitively).
    pub fn is_admin(&self, nick: &str) -> bool {
        self.admins.iter().any(|a| a.eq_ignore_ascii_case(nick))
    }

    /// GitLab project for a channel, falling back to the first channel that has one.
    pub fn gitlab_project_for(&self, channel: Option<&str>) -> Option<&GitlabProject> {
        channel
            .and_then(|name| {
                self.irc
                    .channels
                    .iter()
                    .find(|c| c.name.eq_ignore_ascii_case(name))
            })
            .and_then(|c| c.gitlab.as_ref())
            .or_else(|| self.irc.channels.iter().find_map(|c| c.gitlab.as_ref()))
    }
}

/// IRC connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IrcConfig {
    /// Server hostname (e.g., "irc.libera.chat").
    pub server: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Nickname, also used as username.
    pub name: String,
    /// NickServ password; empty disables IDENTIFY.
    #[serde(default)]
    pub password: String,
    /// Connection password sent with PASS before registration.
    #[serde(default)]
    pub server_password: Option<String>,
    #[serde(default)]
    pub tls: bool,
    #[serde(default = "default_realname")]
    pub realname: String,
    /// Character that marks a channel message as a command.
    #[serde(default = "default_sigil")]
    pub sigil: char,
    /// Channels to join automatically.
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    pub name: String,
    /// GitLab project backing `gitlab issue` in this channel.
    #[serde(default)]
    pub gitlab: Option<GitlabProject>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GitlabProject {
    pub project: String,
    pub namespace: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitlabConfig {
    /// Base URI, e.g. "https://gitlab.com".
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiKeyConfig {
    #[serde(default)]
    pub api_key: String,
}

/// Runtime limits.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum number of dispatch tasks running at once.
    #[serde(default = "default_max_inflight")]
    pub max_inflight: usize,
    /// Per-handler deadline.
    #[serde(default = "default_handler_timeout")]
    pub handler_timeout_secs: u64,
    /// How long shutdown waits for in-flight work.
    #[serde(default = "default_drain_timeout")]
    pub drain_timeout_secs: u64,
    /// Fixed delay between reconnect attempts.
    #[serde(default = "default_reconnect_backoff")]
    pub reconnect_backoff_secs: u64,
    /// Minimum spacing between two outbound messages.
    #[serde(default = "default_outbound_spacing")]
    pub outbound_spacing_ms: u64,
    /// Queued messages older than this are dropped instead of sent.
    #[serde(default = "default_outbound_ttl")]
    pub outbound_ttl_secs: u64,
    #[serde(default = "default_registration_timeout")]
    pub registration_timeout_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_inflight: default_max_inflight(),
            handler_timeout_secs: default_handler_timeout(),
            drain_timeout_secs: default_drain_timeout(),
            reconnect_backoff_secs: default_reconnect_backoff(),
            outbound_spacing_ms: default_outbound_spacing(),
            outbound_ttl_secs: default_outbound_ttl(),
            registration_timeout_secs: default_registration_timeout(),
        }
    }
}

impl LimitsConfig {
    pub fn handler_timeout(&self) -> Duration {
        Duration::from_secs(self.handler_timeout_secs)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }

    pub fn reconnect_backoff(&self) -> Duration {
        Duration::from_secs(self.reconnect_backoff_secs)
    }

    pub fn outbound_spacing(&self) -> Duration {
        Duration::from_millis(self.outbound_spacing_ms)
    }

    pub fn outbound_ttl(&self) -> Duration {
        Duration::from_secs(self.outbound_ttl_secs)
    }

    pub fn registration_timeout(&self) -> Duration {
        Duration::from_secs(self.registration_timeout_secs)
    }
}

/// Local console input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub enabled: bool,
}
