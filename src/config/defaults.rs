//! Default value functions for configuration.

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_port() -> u16 {
    6667
}

pub fn default_username() -> String {
    "slirc".to_string()
}

pub fn default_realname() -> String {
    "slirc client".to_string()
}

// =============================================================================
// Session Defaults
// =============================================================================

pub fn default_buffer_length() -> usize {
    1000
}

pub fn default_throttle_rate() -> u32 {
    2
}

pub fn default_throttle_burst() -> u32 {
    5
}

pub fn default_connect_timeout() -> u64 {
    30
}

pub fn default_request_caps() -> Vec<String> {
    vec!["multi-prefix".to_string()]
}
