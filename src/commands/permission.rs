//! Principals and the permission gate.

use crate::error::CommandError;

/// Permission levels, totally ordered: `User < Admin < Console`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Permission {
    #[default]
    User = 0,
    Admin = 1,
    Console = 2,
}

/// Where a command line came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A channel message; replies go back to the channel.
    Channel(String),
    /// A private message; replies go back to the sender.
    Private,
    /// The local console.
    Console,
}

/// The identified source of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub source: Source,
    pub nick: String,
    pub permission: Permission,
}

impl Principal {
    pub fn channel(channel: impl Into<String>, nick: impl Into<String>, permission: Permission) -> Self {
        Self {
            source: Source::Channel(channel.into()),
            nick: nick.into(),
            permission,
        }
    }

    pub fn private(nick: impl Into<String>, permission: Permission) -> Self {
        Self {
            source: Source::Private,
            nick: nick.into(),
            permission,
        }
    }

    pub fn console() -> Self {
        Self {
            source: Source::Console,
            nick: "console".to_string(),
            permission: Permission::Console,
        }
    }

    /// IRC target that replies should be sent to; `None` for the console.
    pub fn reply_target(&self) -> Option<&str> {
        match &self.source {
            Source::Channel(channel) => Some(channel),
            Source::Private => Some(&self.nick),
            Source::Console => None,
        }
    }

    /// Channel the command was issued in, if any.
    pub fn channel_name(&self) -> Option<&str> {
        match &self.source {
            Source::Channel(channel) => Some(channel),
            _ => None,
        }
    }
}

/// Reject the caller when its permission is below `required`.
pub fn check(required: Permission, caller: Permission) -> Result<(), CommandError> {
    if required > caller {
        Err(CommandError::PermissionDenied)
    } else {
        Ok(())
    }
}
