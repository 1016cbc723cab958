//! Connection setup: resolve, connect, TLS handshake, certificate pinning.

use super::Shared;
use super::pinning::{PinningGate, fingerprint, wait_for_decision};
use crate::config::ServerInfo;
use crate::error::ConnectError;
use crate::event::Event;
use crate::state::Phase;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpStream, lookup_host};
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::{self, ClientConfig, RootCertStore};
use tokio_rustls::rustls::client::danger::{
    HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
};
use tokio_rustls::rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use tracing::{debug, info, warn};

/// An established connection.
pub(crate) enum Transport {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

/// Open the connection described by the session config.
pub(crate) async fn open(shared: &Shared) -> Result<Transport, ConnectError> {
    let server = &shared.config.server;
    let timeout = shared.config.session.connect_timeout();

    shared.set_phase(Phase::Connecting);
    info!(address = %server.address(), tls = server.tls, "Connecting");

    let tcp = connect_tcp(server, timeout).await?;
    if !server.tls {
        return Ok(Transport::Plain(tcp));
    }

    shared.set_phase(Phase::TlsHandshaking);
    let tls = tokio::time::timeout(timeout, handshake(tcp, &server.host, server.tls_insecure))
        .await
        .map_err(|_| ConnectError::Timeout(server.address()))??;

    if server.tls_insecure && shared.config.session.pin_certificate {
        shared.set_phase(Phase::CertPinningWait);
        let fingerprint = peer_fingerprint(&tls).ok_or(ConnectError::NoCertificate)?;
        info!(fingerprint = %fingerprint, "Waiting for certificate decision");

        let (gate, decision) = PinningGate::new();
        shared.emit(Event::CertificatePinningStart { fingerprint, gate });
        if !wait_for_decision(decision).await {
            return Err(ConnectError::PinningRejected);
        }
        info!("Certificate accepted");
    }

    Ok(Transport::Tls(Box::new(tls)))
}

async fn connect_tcp(server: &ServerInfo, timeout: Duration) -> Result<TcpStream, ConnectError> {
    let unknown_host = |details: String| ConnectError::UnknownHost {
        host: server.host.clone(),
        details,
    };

    let addrs: Vec<SocketAddr> = lookup_host((server.host.as_str(), server.port))
        .await
        .map_err(|e| unknown_host(e.to_string()))?
        .collect();

    let mut last_err = None;
    for addr in addrs {
        match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                if let Err(e) = stream.set_nodelay(true) {
                    debug!(error = %e, "Failed to set TCP_NODELAY");
                }
                debug!(addr = %addr, "TCP connected");
                return Ok(stream);
            }
            Ok(Err(e)) => {
                debug!(addr = %addr, error = %e, "Connect failed");
                last_err = Some(ConnectError::Io(e));
            }
            Err(_) => {
                debug!(addr = %addr, "Connect timed out");
                last_err = Some(ConnectError::Timeout(addr.to_string()));
            }
        }
    }

    Err(last_err.unwrap_or_else(|| unknown_host("no addresses found".to_string())))
}

/// Upgrade a TCP stream to TLS.
async fn handshake(
    tcp: TcpStream,
    hostname: &str,
    insecure: bool,
) -> Result<TlsStream<TcpStream>, ConnectError> {
    let connector = TlsConnector::from(Arc::new(client_config(insecure)));
    let server_name =
        ServerName::try_from(hostname.to_string()).map_err(|e| ConnectError::Tls(e.to_string()))?;

    let stream = connector
        .connect(server_name, tcp)
        .await
        .map_err(classify_tls_error)?;

    info!(hostname = %hostname, insecure = insecure, "TLS handshake completed");
    Ok(stream)
}

fn client_config(insecure: bool) -> ClientConfig {
    if insecure {
        return ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate))
            .with_no_client_auth();
    }

    // Load system root certificates
    let mut roots = RootCertStore::empty();
    let certs = rustls_native_certs::load_native_certs();
    for cert in certs.certs {
        if let Err(e) = roots.add(cert) {
            warn!("Failed to add root cert: {}", e);
        }
    }
    for e in &certs.errors {
        warn!("Error loading native certs: {}", e);
    }

    ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth()
}

/// Certificate validation failures surface as an `io::Error` wrapping
/// `rustls::Error`.
fn classify_tls_error(e: std::io::Error) -> ConnectError {
    let classified = e
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<rustls::Error>())
        .map(|tls| match tls {
            rustls::Error::InvalidCertificate(_) => ConnectError::CertificateRefused(tls.to_string()),
            other => ConnectError::Tls(other.to_string()),
        });
    classified.unwrap_or_else(|| ConnectError::Io(e))
}

fn peer_fingerprint(tls: &TlsStream<TcpStream>) -> Option<String> {
    let (_, conn) = tls.get_ref();
    conn.peer_certificates()
        .and_then(|certs| certs.first())
        .map(|cert| fingerprint(cert.as_ref()))
}

/// Accepts every certificate. Only used with `tls_insecure`, where the
/// embedder decides through the pinning gate.
#[derive(Debug)]
struct AcceptAnyCertificate;

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        rustls::crypto::aws_lc_rs::default_provider()
            .signature_verification_algorithms
            .supported_schemes()
    }
}
