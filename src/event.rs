//! Events emitted by a session.
//!
//! Every variant carries its own payload. The stream is delivered on the
//! unbounded receiver returned by [`Session::start`](crate::Session::start);
//! the last event of every session is [`Event::Disconnected`].

use crate::outbound::OutboundMessage;
use crate::session::PinningGate;
use slirc_wire::Message;
use std::fmt;

#[derive(Clone, Debug)]
pub enum Event {
    /// Registration welcome (001) received; carries the server name.
    Connected(String),
    /// Session ended and cleanup is complete; carries the server host.
    Disconnected(String),
    /// Host name resolution failed.
    UnknownHost(String),
    /// Connecting timed out.
    Timeout(String),
    /// Any other connection failure.
    UnknownError(String),
    /// TLS validation rejected the server certificate.
    SslCertificateRefused(String),
    /// The connection is waiting for the embedder to accept or reject the
    /// certificate with this SHA-256 fingerprint.
    CertificatePinningStart {
        fingerprint: String,
        gate: PinningGate,
    },
    /// No certificate was presented to pin.
    CertificatePinningFail(String),
    /// Network name from ISUPPORT `NETWORK`.
    GotServerName(String),
    /// Complete message of the day.
    GotMotd(String),
    /// `CAP ACK` text.
    CapabilityAccepted(String),
    /// `CAP NAK` text.
    CapabilityRejected(String),
    /// End of NAMES for a channel we joined.
    JoinedChannel(String),
    /// We parted or were kicked from a channel.
    LeftChannel(String),
    /// We were kicked; carries the KICK line.
    Kicked(Message),
    /// The primary nick is taken; carries the primary nick.
    FirstNickInUse(String),
    /// The secondary nick is taken too; registration stops.
    AllNicksInUse(String),
    /// Periodic probe round trip in milliseconds.
    LagMeasured(u64),
    /// `/ping` round trip in milliseconds.
    UserLagMeasured(u64),
    /// Every received line, before dispatch.
    DataReceived(Message),
    /// A queued message was written.
    DataSent(OutboundMessage),
    /// A queued message could not be written.
    DataSendFail(OutboundMessage),
}

/// Payload-free discriminant of [`Event`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Connected,
    Disconnected,
    UnknownHost,
    Timeout,
    UnknownError,
    SslCertificateRefused,
    CertificatePinningStart,
    CertificatePinningFail,
    GotServerName,
    GotMotd,
    CapabilityAccepted,
    CapabilityRejected,
    JoinedChannel,
    LeftChannel,
    Kicked,
    FirstNickInUse,
    AllNicksInUse,
    LagMeasured,
    UserLagMeasured,
    DataReceived,
    DataSent,
    DataSendFail,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Connected(_) => EventKind::Connected,
            Self::Disconnected(_) => EventKind::Disconnected,
            Self::UnknownHost(_) => EventKind::UnknownHost,
            Self::Timeout(_) => EventKind::Timeout,
            Self::UnknownError(_) => EventKind::UnknownError,
            Self::SslCertificateRefused(_) => EventKind::SslCertificateRefused,
            Self::CertificatePinningStart { .. } => EventKind::CertificatePinningStart,
            Self::CertificatePinningFail(_) => EventKind::CertificatePinningFail,
            Self::GotServerName(_) => EventKind::GotServerName,
            Self::GotMotd(_) => EventKind::GotMotd,
            Self::CapabilityAccepted(_) => EventKind::CapabilityAccepted,
            Self::CapabilityRejected(_) => EventKind::CapabilityRejected,
            Self::JoinedChannel(_) => EventKind::JoinedChannel,
            Self::LeftChannel(_) => EventKind::LeftChannel,
            Self::Kicked(_) => EventKind::Kicked,
            Self::FirstNickInUse(_) => EventKind::FirstNickInUse,
            Self::AllNicksInUse(_) => EventKind::AllNicksInUse,
            Self::LagMeasured(_) => EventKind::LagMeasured,
            Self::UserLagMeasured(_) => EventKind::UserLagMeasured,
            Self::DataReceived(_) => EventKind::DataReceived,
            Self::DataSent(_) => EventKind::DataSent,
            Self::DataSendFail(_) => EventKind::DataSendFail,
        }
    }

    /// Whether this event ends a connection attempt before registration.
    pub fn is_connect_failure(&self) -> bool {
        matches!(
            self.kind(),
            EventKind::UnknownHost
                | EventKind::Timeout
                | EventKind::UnknownError
                | EventKind::SslCertificateRefused
                | EventKind::CertificatePinningFail
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
