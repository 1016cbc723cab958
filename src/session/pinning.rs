//! Certificate pinning gate.
//!
//! When invalid certificates are accepted, the connection pauses after the
//! TLS handshake and hands the embedder a [`PinningGate`] together with the
//! certificate fingerprint. The embedder resolves the gate once; the
//! connecting task waits until the state is no longer `Pending`.

use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::sync::watch;

/// State of a pinning decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinState {
    Pending,
    Decided(bool),
}

/// Handle the embedder uses to accept or reject a certificate.
///
/// Cloneable; the first decision wins. Dropping every clone without
/// deciding rejects the certificate.
#[derive(Clone, Debug)]
pub struct PinningGate {
    tx: Arc<watch::Sender<PinState>>,
}

impl PinningGate {
    pub(crate) fn new() -> (Self, watch::Receiver<PinState>) {
        let (tx, rx) = watch::channel(PinState::Pending);
        (Self { tx: Arc::new(tx) }, rx)
    }

    /// Trust the certificate and continue connecting.
    pub fn accept(&self) {
        self.decide(true);
    }

    /// Refuse the certificate and abort the connection.
    pub fn reject(&self) {
        self.decide(false);
    }

    pub fn state(&self) -> PinState {
        *self.tx.borrow()
    }

    fn decide(&self, accepted: bool) {
        self.tx.send_if_modified(|state| {
            if *state == PinState::Pending {
                *state = PinState::Decided(accepted);
                true
            } else {
                false
            }
        });
    }
}

/// Wait for the decision. A gate dropped undecided counts as a rejection.
pub(crate) async fn wait_for_decision(mut rx: watch::Receiver<PinState>) -> bool {
    match rx.wait_for(|state| *state != PinState::Pending).await {
        Ok(state) => *state == PinState::Decided(true),
        Err(_) => false,
    }
}

/// SHA-256 of a DER certificate as colon-separated uppercase hex.
pub fn fingerprint(der: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(der);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(":")
}
