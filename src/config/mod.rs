//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Config struct definitions and TOML loading
//! - [`defaults`]: serde default value functions
//! - [`validation`]: startup validation

mod defaults;
mod types;
mod validation;

pub use types::{
    ApiKeyConfig, ChannelConfig, Config, ConfigError, ConsoleConfig, GitlabConfig, GitlabProject,
    IrcConfig, LimitsConfig,
};
pub use validation::{ValidationError, validate};
