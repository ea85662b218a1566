//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

// =============================================================================
// IRC Defaults
// =============================================================================

pub fn default_port() -> u16 {
    6667
}

pub fn default_realname() -> String {
    "slircbot".to_string()
}

pub fn default_sigil() -> char {
    '.'
}

// =============================================================================
// Runtime Limits Defaults
// =============================================================================

pub fn default_max_inflight() -> usize {
    16
}

pub fn default_handler_timeout() -> u64 {
    15
}

pub fn default_drain_timeout() -> u64 {
    5
}

pub fn default_reconnect_backoff() -> u64 {
    30
}

pub fn default_outbound_spacing() -> u64 {
    500
}

pub fn default_outbound_ttl() -> u64 {
    60
}

pub fn default_registration_timeout() -> u64 {
    60
}

