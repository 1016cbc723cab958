//! Self-signed TLS endpoint for certificate tests.

use rcgen::CertifiedKey;
use std::sync::Arc;
use tokio_rustls::TlsAcceptor;
use tokio_rustls::rustls::ServerConfig;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};

/// Acceptor for a fresh self-signed `localhost` certificate, plus the
/// certificate's DER bytes.
pub fn self_signed_acceptor() -> anyhow::Result<(TlsAcceptor, CertificateDer<'static>)> {
    let CertifiedKey { cert, key_pair } =
        rcgen::generate_simple_self_signed(vec!["localhost".to_string(), "127.0.0.1".to_string()])?;
    let der = cert.der().clone();
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der()));

    let config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(vec![der.clone()], key)?;
    Ok((TlsAcceptor::from(Arc::new(config)), der))
}
