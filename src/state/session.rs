//! Per-connection protocol state.

use crate::lag::{LagProbe, ProbeKind};
use slirc_wire::PrefixTable;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Lifecycle of a session.
///
/// `Idle → Connecting → (TlsHandshaking → [CertPinningWait]) → Connected →
/// Registering → Registered → Closing → Closed`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Connecting,
    TlsHandshaking,
    CertPinningWait,
    Connected,
    Registering,
    Registered,
    Closing,
    Closed,
}

impl Phase {
    /// Whether the socket is (still) usable.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Connected | Self::Registering | Self::Registered)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::TlsHandshaking => "tls-handshaking",
            Self::CertPinningWait => "cert-pinning-wait",
            Self::Connected => "connected",
            Self::Registering => "registering",
            Self::Registered => "registered",
            Self::Closing => "closing",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Protocol state mutated by the dispatcher.
#[derive(Debug)]
pub struct SessionState {
    pub phase: Phase,
    /// Nick we are registering with or were confirmed under.
    pub nick: String,
    pub using_second_nick: bool,
    /// 001 received.
    pub welcomed: bool,
    /// Both nicks were rejected; no further NICK attempts.
    pub registration_abandoned: bool,
    /// The server answered `CAP`.
    pub ircv3: bool,
    pub offered_caps: Vec<String>,
    pub enabled_caps: Vec<String>,
    /// Network name from ISUPPORT, or the server name until then.
    pub server_name: String,
    /// Raw ISUPPORT tokens, keys uppercased.
    pub isupport: BTreeMap<String, String>,
    pub prefixes: PrefixTable,
    motd_buffer: String,
    pub motd: Option<String>,
    /// Last measured periodic round trip.
    pub lag: Option<Duration>,
    pub lag_probe: LagProbe,
    /// Set by the welcome; the reader starts the lag interval.
    pub lag_timer_armed: bool,
}

impl SessionState {
    pub fn new(nick: impl Into<String>) -> Self {
        Self {
            phase: Phase::Idle,
            nick: nick.into(),
            using_second_nick: false,
            welcomed: false,
            registration_abandoned: false,
            ircv3: false,
            offered_caps: Vec::new(),
            enabled_caps: Vec::new(),
            server_name: String::new(),
            isupport: BTreeMap::new(),
            prefixes: PrefixTable::default(),
            motd_buffer: String::new(),
            motd: None,
            lag: None,
            lag_probe: LagProbe::new(ProbeKind::Periodic),
            lag_timer_armed: false,
        }
    }

    pub fn is_self(&self, nick: &str) -> bool {
        !nick.is_empty() && self.nick.eq_ignore_ascii_case(nick)
    }

    /// Whether the server offered `cap` (values like `sasl=PLAIN` match
    /// `sasl`).
    pub fn offers(&self, cap: &str) -> bool {
        self.offered_caps
            .iter()
            .any(|c| c.split('=').next() == Some(cap))
    }

    pub fn start_motd(&mut self) {
        self.motd_buffer.clear();
    }

    pub fn push_motd(&mut self, line: &str) {
        self.motd_buffer.push('\n');
        self.motd_buffer.push_str(line);
    }

    /// Complete the MOTD, dropping the leading separator.
    pub fn finish_motd(&mut self) -> String {
        let buffered = std::mem::take(&mut self.motd_buffer);
        let text = buffered
            .strip_prefix('\n')
            .map(str::to_string)
            .unwrap_or(buffered);
        self.motd = Some(text.clone());
        text
    }
}
