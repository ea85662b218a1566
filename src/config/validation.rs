//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("irc.server is required")]
    MissingServer,
    #[error("irc.name is required")]
    MissingName,
    #[error("irc.port must be non-zero")]
    InvalidPort,
    #[error("irc.sigil must be a printable ASCII character, got {0:?}")]
    InvalidSigil(char),
    #[error("channel name must start with '#' or '&', got '{0}'")]
    InvalidChannel(String),
    #[error("gitlab.uri must be an http(s) URL when a channel has a gitlab project, got '{0}'")]
    InvalidGitlabUri(String),
    #[error("limits.max_inflight must be greater than zero")]
    ZeroInflight,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // Required fields
    if config.irc.server.trim().is_empty() {
        errors.push(ValidationError::MissingServer);
    }
    if config.irc.name.trim().is_empty() {
        errors.push(ValidationError::MissingName);
    }
    if config.irc.port == 0 {
        errors.push(ValidationError::InvalidPort);
    }

    let sigil = config.irc.sigil;
    if !sigil.is_ascii_graphic() {
        errors.push(ValidationError::InvalidSigil(sigil));
    }

    for channel in &config.irc.channels {
        if !channel.name.starts_with(['#', '&']) {
            errors.push(ValidationError::InvalidChannel(channel.name.clone()));
        }
    }

    let wants_gitlab = config.irc.channels.iter().any(|c| c.gitlab.is_some());
    let uri = &config.gitlab.uri;
    if wants_gitlab && !(uri.starts_with("http://") || uri.starts_with("https://")) {
        errors.push(ValidationError::InvalidGitlabUri(uri.clone()));
    }

    if config.limits.max_inflight == 0 {
        errors.push(ValidationError::ZeroInflight);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
