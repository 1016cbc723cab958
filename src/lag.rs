//! Round-trip lag probes.
//!
//! A probe is a `PING` whose payload carries a tagged id. The periodic
//! prober and the user-initiated `/ping` use different tags so their
//! `PONG`s can be told apart.

use std::time::{Duration, Instant};

/// Interval between periodic probes.
pub const LAG_INTERVAL: Duration = Duration::from_secs(30);

const PERIODIC_TAG: &str = "slirc.lag.";
const USER_TAG: &str = "slirc.user.";

/// Which prober a token belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeKind {
    Periodic,
    User,
}

impl ProbeKind {
    fn tag(self) -> &'static str {
        match self {
            Self::Periodic => PERIODIC_TAG,
            Self::User => USER_TAG,
        }
    }

    /// `PING` payload for probe `id`.
    pub fn token(self, id: u64) -> String {
        format!("{}{}", self.tag(), id)
    }
}

/// One outstanding (or completed) probe.
#[derive(Clone, Debug)]
pub struct LagProbe {
    kind: ProbeKind,
    id: u64,
    started: Option<Instant>,
    finished: bool,
}

impl LagProbe {
    pub fn new(kind: ProbeKind) -> Self {
        Self {
            kind,
            id: 0,
            started: None,
            finished: true,
        }
    }

    /// Whether a probe has been sent and not yet answered.
    pub fn in_flight(&self) -> bool {
        !self.finished
    }

    /// Start a probe and return the `PING` payload to send.
    pub fn arm(&mut self, id: u64, now: Instant) -> String {
        self.id = id;
        self.started = Some(now);
        self.finished = false;
        self.token()
    }

    /// Payload of the current probe.
    pub fn token(&self) -> String {
        self.kind.token(self.id)
    }

    /// Drop probe `id` if it is still outstanding, e.g. because its `PING`
    /// never made it into the queue.
    pub fn cancel(&mut self, id: u64) {
        if self.id == id {
            self.finished = true;
        }
    }

    /// Complete the probe if `payload` answers it, returning the round trip.
    pub fn complete(&mut self, payload: &str, now: Instant) -> Option<Duration> {
        if self.finished || payload != self.token() {
            return None;
        }
        self.finished = true;
        self.started.map(|start| now.saturating_duration_since(start))
    }

    /// Time since the outstanding probe was sent.
    pub fn pending_for(&self, now: Instant) -> Option<Duration> {
        if self.finished {
            return None;
        }
        self.started.map(|start| now.saturating_duration_since(start))
    }
}
