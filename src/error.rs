//! Error types for the client engine.
//!
//! Connection failures are classified once, at the edge, and each class maps
//! to the terminal event the embedder sees. Handler errors never leave the
//! dispatcher; they are logged and the line is otherwise ignored.

use crate::event::Event;
use crate::outbound::OutboundMessage;
use thiserror::Error;

// ============================================================================
// Connection Errors
// ============================================================================

/// Why a connection could not be established.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("unknown host {host}: {details}")]
    UnknownHost { host: String, details: String },

    #[error("connection to {0} timed out")]
    Timeout(String),

    #[error("certificate refused: {0}")]
    CertificateRefused(String),

    #[error("server presented no certificate to pin")]
    NoCertificate,

    #[error("certificate rejected by the embedder")]
    PinningRejected,

    #[error("tls error: {0}")]
    Tls(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConnectError {
    /// The terminal event reporting this failure.
    ///
    /// A rejected pin is the embedder's own decision and is only followed
    /// by `Disconnected`.
    pub fn event(&self) -> Option<Event> {
        match self {
            Self::UnknownHost { .. } => Some(Event::UnknownHost(self.to_string())),
            Self::Timeout(_) => Some(Event::Timeout(self.to_string())),
            Self::CertificateRefused(_) => Some(Event::SslCertificateRefused(self.to_string())),
            Self::NoCertificate => Some(Event::CertificatePinningFail(self.to_string())),
            Self::PinningRejected => None,
            Self::Io(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                Some(Event::Timeout(self.to_string()))
            }
            Self::Tls(_) | Self::Io(_) => Some(Event::UnknownError(self.to_string())),
        }
    }

    /// Static error code for log fields.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownHost { .. } => "unknown_host",
            Self::Timeout(_) => "timeout",
            Self::CertificateRefused(_) => "certificate_refused",
            Self::NoCertificate => "no_certificate",
            Self::PinningRejected => "pinning_rejected",
            Self::Tls(_) => "tls",
            Self::Io(_) => "io",
        }
    }
}

// ============================================================================
// Send Errors
// ============================================================================

/// Errors returned by the handle's send methods.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("refusing to send an empty message")]
    Empty,

    /// The session is gone. The message was also reported via
    /// `DataSendFail`.
    #[error("session closed, message {} not sent", .0.id)]
    Closed(OutboundMessage),
}

// ============================================================================
// Handler Errors (line dispatch)
// ============================================================================

/// Errors raised while dispatching one received line.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("not enough parameters")]
    NeedMoreParams,

    #[error("no source nick")]
    NoSource,
}

pub type HandlerResult = Result<(), HandlerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;

    #[test]
    fn connect_errors_map_to_one_event() {
        let cases = [
            (
                ConnectError::UnknownHost {
                    host: "nowhere.invalid".into(),
                    details: "no addresses".into(),
                },
                Some(EventKind::UnknownHost),
            ),
            (ConnectError::Timeout("a:1".into()), Some(EventKind::Timeout)),
            (
                ConnectError::CertificateRefused("expired".into()),
                Some(EventKind::SslCertificateRefused),
            ),
            (
                ConnectError::NoCertificate,
                Some(EventKind::CertificatePinningFail),
            ),
            (ConnectError::PinningRejected, None),
            (ConnectError::Tls("bad name".into()), Some(EventKind::UnknownError)),
            (
                ConnectError::Io(std::io::ErrorKind::ConnectionRefused.into()),
                Some(EventKind::UnknownError),
            ),
            (
                ConnectError::Io(std::io::ErrorKind::TimedOut.into()),
                Some(EventKind::Timeout),
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.event().map(|e| e.kind()), expected, "{err}");
        }
    }

    #[test]
    fn send_error_display() {
        let err = SendError::Closed(OutboundMessage {
            id: 42,
            text: "PING :x".into(),
        });
        assert_eq!(err.to_string(), "session closed, message 42 not sent");
    }
}
