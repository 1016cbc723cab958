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

/// Client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server to connect to and the identity to register with.
    pub server: ServerInfo,
    /// Session behaviour (buffers, retention, throttling, TLS pinning).
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Configuration with default session settings.
    pub fn new(server: ServerInfo) -> Self {
        Self {
            server,
            session: SessionConfig::default(),
        }
    }
}

/// Connection and identity information for one server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfo {
    /// Server hostname or address.
    pub host: String,
    /// Server port (default: 6667).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Primary nickname.
    pub nick: String,
    /// Nickname tried when the primary is in use (default: primary + `_`).
    #[serde(default)]
    pub second_nick: Option<String>,
    /// Username sent in `USER`.
    #[serde(default = "default_username")]
    pub username: String,
    /// Realname sent as the `USER` trailing parameter.
    #[serde(default = "default_realname")]
    pub realname: String,
    /// Password sent to NickServ after the welcome.
    #[serde(default)]
    pub nickserv_password: Option<String>,
    /// Connection password (`PASS`).
    #[serde(default)]
    pub server_password: Option<String>,
    /// Connect over TLS.
    #[serde(default)]
    pub tls: bool,
    /// Accept certificates that fail validation (self-signed, expired...).
    #[serde(default)]
    pub tls_insecure: bool,
}

impl ServerInfo {
    /// Plain-text server info with default username and realname.
    pub fn new(host: impl Into<String>, port: u16, nick: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            nick: nick.into(),
            second_nick: None,
            username: default_username(),
            realname: default_realname(),
            nickserv_password: None,
            server_password: None,
            tls: false,
            tls_insecure: false,
        }
    }

    /// The fallback nickname.
    pub fn second_nick(&self) -> String {
        match &self.second_nick {
            Some(nick) if !nick.is_empty() => nick.clone(),
            _ => format!("{}_", self.nick),
        }
    }

    /// `host:port` for logging.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Session behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Messages kept per channel (default: 1000).
    #[serde(default = "default_buffer_length")]
    pub channel_buffer_length: usize,
    /// Messages kept per user (default: 1000).
    #[serde(default = "default_buffer_length")]
    pub user_buffer_length: usize,
    /// Keep channels (marked left) after we part or are kicked.
    #[serde(default)]
    pub preserve_channels: bool,
    /// Keep users that are no longer visible in any channel.
    #[serde(default)]
    pub preserve_users: bool,
    /// Rate-limit outbound lines (default: true).
    #[serde(default = "default_true")]
    pub throttle: bool,
    /// Lines per second when throttling (default: 2).
    #[serde(default = "default_throttle_rate")]
    pub throttle_rate: u32,
    /// Lines that may be sent back to back before throttling kicks in
    /// (default: 5).
    #[serde(default = "default_throttle_burst")]
    pub throttle_burst: u32,
    /// Ask the embedder to accept the certificate fingerprint when
    /// `tls_insecure` is set (default: true).
    #[serde(default = "default_true")]
    pub pin_certificate: bool,
    /// TCP connect timeout in seconds (default: 30).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Capabilities requested when the server offers them
    /// (default: `multi-prefix`).
    #[serde(default = "default_request_caps")]
    pub request_caps: Vec<String>,
    /// Channels joined after the welcome.
    #[serde(default)]
    pub autojoin: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            channel_buffer_length: default_buffer_length(),
            user_buffer_length: default_buffer_length(),
            preserve_channels: false,
            preserve_users: false,
            throttle: true,
            throttle_rate: default_throttle_rate(),
            throttle_burst: default_throttle_burst(),
            pin_certificate: true,
            connect_timeout_secs: default_connect_timeout(),
            request_caps: default_request_caps(),
            autojoin: Vec::new(),
        }
    }
}

impl SessionConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
