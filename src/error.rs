//! Unified error handling for slircbot.
//!
//! Command errors never leave their dispatch task: each one renders to a
//! single user-visible line through [`CommandError::reply`]. Connection
//! errors drive the supervisor's reconnect loop.

use thiserror::Error;

// ============================================================================
// Command Errors (dispatch tasks)
// ============================================================================

/// Errors that can occur while running a command handler.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid argument")]
    InvalidArgument,

    /// Missing or malformed arguments; carries the usage line to show.
    #[error("usage: {0}")]
    Usage(String),

    #[error("permission denied")]
    PermissionDenied,

    #[error("api key {0} is not configured")]
    MissingKey(&'static str),

    #[error("upstream {source_name} failed: {error}")]
    Upstream {
        source_name: String,
        #[source]
        error: UpstreamError,
    },

    #[error("timeout fetching {0}")]
    Timeout(String),

    #[error("too many commands in flight")]
    Busy,

    /// Handler-specific refusal with its own reply text.
    #[error("{0}")]
    Rejected(String),
}

impl CommandError {
    pub fn upstream(source_name: impl Into<String>, error: UpstreamError) -> Self {
        Self::Upstream {
            source_name: source_name.into(),
            error,
        }
    }

    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::Usage(_) => "usage",
            Self::PermissionDenied => "permission_denied",
            Self::MissingKey(_) => "missing_key",
            Self::Upstream { .. } => "upstream",
            Self::Timeout(_) => "timeout",
            Self::Busy => "busy",
            Self::Rejected(_) => "rejected",
        }
    }

    /// The one-line reply shown to the caller.
    pub fn reply(&self) -> String {
        match self {
            Self::InvalidArgument => "Invalid argument.".to_string(),
            Self::Usage(usage) => usage.clone(),
            Self::PermissionDenied => "Tu n'as pas la permission !".to_string(),
            Self::MissingKey(name) => format!("Key {name} doesn't exist !"),
            Self::Upstream { source_name, .. } => format!("Unable to reach {source_name}."),
            Self::Timeout(source_name) => format!("timeout fetching {source_name}"),
            Self::Busy => "Busy, try again later.".to_string(),
            Self::Rejected(text) => text.clone(),
        }
    }
}

/// Result type for command handlers: the reply text on success.
pub type CommandResult = Result<String, CommandError>;

// ============================================================================
// Upstream Errors (HTTP/JSON collaborators)
// ============================================================================

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("not found")]
    NotFound,

    #[error("unexpected payload: missing {0}")]
    Json(String),

    #[error("invalid url: {0}")]
    Url(String),
}

// ============================================================================
// Connection Errors (supervisor)
// ============================================================================

/// Transient connection failures; the supervisor reconnects after any of them.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("tls error: {0}")]
    Tls(String),

    #[error("connection closed by server")]
    Closed,

    #[error("server sent ERROR: {0}")]
    ServerError(String),

    #[error("registration did not complete within {0} seconds")]
    RegistrationTimeout(u64),
}

impl From<crate::irc::CodecError> for ConnectionError {
    fn from(err: crate::irc::CodecError) -> Self {
        match err {
            crate::irc::CodecError::Io(e) => Self::Io(e),
        }
    }
}
