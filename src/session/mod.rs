//! Session lifecycle and the embedder-facing handle.
//!
//! ```text
//!   Session::start ──► run task ──► connect::open ──► drive
//!                                                     ├─ writer task (queue → socket)
//!                                                     └─ reader loop (socket → dispatch)
//!                                                           └─ lag interval
//! ```
//!
//! Protocol state lives behind one `RwLock` shared by the reader and every
//! [`SessionHandle`] clone. Outbound messages go through a bounded queue
//! drained by a single writer task, so messages leave in enqueue order.
//! Events are delivered on an unbounded channel; the last one is always
//! [`Event::Disconnected`].

mod connect;
mod input;
mod pinning;
mod reader;
mod writer;

pub use pinning::{PinState, PinningGate, fingerprint};

use crate::config::Config;
use crate::error::{ConnectError, SendError};
use crate::event::Event;
use crate::lag::{LagProbe, ProbeKind};
use crate::outbound::{IdSource, OutboundMessage};
use crate::state::{Channel, Conversation, Phase, SessionState, Store, User};
use crate::telemetry::spans;
use connect::Transport;
use parking_lot::{Mutex, RwLock};
use slirc_wire::{ProtocolError, compile, privmsg};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{Instrument, debug, info, warn};

/// Capacity of the outbound queue.
pub const QUEUE_CAPACITY: usize = 32;

/// State guarded together so a handler sees a consistent picture.
pub(crate) struct View {
    pub(crate) state: SessionState,
    pub(crate) store: Store,
}

pub(crate) struct Shared {
    pub(crate) config: Config,
    pub(crate) ids: IdSource,
    pub(crate) view: RwLock<View>,
    pub(crate) user_probe: Mutex<LagProbe>,
    events: mpsc::UnboundedSender<Event>,
    queue: mpsc::Sender<OutboundMessage>,
    task: Mutex<Option<AbortHandle>>,
}

impl Shared {
    pub(crate) fn emit(&self, event: Event) {
        // The embedder may have dropped the receiver; that is not an error.
        let _ = self.events.send(event);
    }

    pub(crate) fn set_phase(&self, phase: Phase) {
        let mut view = self.view.write();
        if view.state.phase != phase {
            debug!(from = %view.state.phase, to = %phase, "Phase change");
            view.state.phase = phase;
        }
    }

    /// Queue `text` for the writer, waiting while the queue is full.
    pub(crate) async fn enqueue(&self, text: String) -> Result<u64, SendError> {
        let msg = OutboundMessage::new(&self.ids, text);
        let id = msg.id;
        match self.queue.send(msg).await {
            Ok(()) => Ok(id),
            Err(mpsc::error::SendError(msg)) => {
                self.emit(Event::DataSendFail(msg.clone()));
                Err(SendError::Closed(msg))
            }
        }
    }
}

/// Entry point for starting sessions.
pub struct Session;

impl Session {
    /// Connect to the configured server on the current Tokio runtime.
    ///
    /// Returns immediately. Progress, failures and protocol traffic are
    /// reported on the returned event receiver.
    pub fn start(config: Config) -> (SessionHandle, mpsc::UnboundedReceiver<Event>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (queue_tx, queue_rx) = mpsc::channel(QUEUE_CAPACITY);

        let state = SessionState::new(config.server.nick.clone());
        let store = Store::new(
            config.session.channel_buffer_length,
            config.session.user_buffer_length,
        );
        let span = spans::session(&config.server.host, config.server.port, &config.server.nick);

        let shared = Arc::new(Shared {
            config,
            ids: IdSource::new(),
            view: RwLock::new(View { state, store }),
            user_probe: Mutex::new(LagProbe::new(ProbeKind::User)),
            events: events_tx,
            queue: queue_tx,
            task: Mutex::new(None),
        });

        let task = tokio::spawn(run(Arc::clone(&shared), queue_rx).instrument(span));
        *shared.task.lock() = Some(task.abort_handle());

        (SessionHandle { shared }, events_rx)
    }
}

/// Emits `Disconnected` exactly once, however the session task ends
/// (connection failure, EOF, read error or abort).
struct Teardown {
    shared: Arc<Shared>,
    writer: Option<JoinHandle<()>>,
}

impl Drop for Teardown {
    fn drop(&mut self) {
        self.shared.set_phase(Phase::Closing);
        if let Some(writer) = self.writer.take() {
            writer.abort();
        }
        self.shared.set_phase(Phase::Closed);

        let host = self.shared.config.server.host.clone();
        info!(host = %host, "Disconnected");
        self.shared.emit(Event::Disconnected(host));
    }
}

async fn run(shared: Arc<Shared>, queue: mpsc::Receiver<OutboundMessage>) {
    let mut teardown = Teardown {
        shared: Arc::clone(&shared),
        writer: None,
    };

    let transport = match connect::open(&shared).await {
        Ok(transport) => transport,
        Err(e) => {
            report_connect_error(&shared, &e);
            return;
        }
    };

    let result = match transport {
        Transport::Plain(stream) => drive(stream, &shared, queue, &mut teardown).await,
        Transport::Tls(stream) => drive(*stream, &shared, queue, &mut teardown).await,
    };

    match result {
        Ok(()) => info!("Server closed the connection"),
        Err(e) => warn!(error = %e, "Read error"),
    }
}

fn report_connect_error(shared: &Shared, e: &ConnectError) {
    warn!(error = %e, code = e.error_code(), "Connection failed");
    if let Some(event) = e.event() {
        shared.emit(event);
    }
}

/// Run the writer and reader over an established stream.
async fn drive<S>(
    stream: S,
    shared: &Shared,
    queue: mpsc::Receiver<OutboundMessage>,
    teardown: &mut Teardown,
) -> Result<(), ProtocolError>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (read, write) = tokio::io::split(stream);

    let throttle = writer::throttle(&shared.config.session);
    let events = shared.events.clone();
    teardown.writer = Some(tokio::spawn(
        writer::run(write, queue, events, throttle).in_current_span(),
    ));

    shared.set_phase(Phase::Connected);
    info!("Connected, negotiating capabilities");

    // Registration continues from the CAP LS reply, or from 421 when the
    // server does not know CAP.
    shared.set_phase(Phase::Registering);
    if let Err(e) = shared.enqueue("CAP LS".to_string()).await {
        warn!(error = %e, "Failed to queue CAP LS");
    }

    reader::run(read, shared).await
}

/// Cloneable handle to a running session.
///
/// Every method is safe to call from any task. Snapshot accessors clone
/// the requested state out from under the lock.
#[derive(Clone)]
pub struct SessionHandle {
    shared: Arc<Shared>,
}

impl SessionHandle {
    // ------------------------------------------------------------------------
    // Sending
    // ------------------------------------------------------------------------

    /// Queue a raw command (or several, separated by `\n`).
    ///
    /// Waits while the queue is full. Returns the message id reported by
    /// the matching `DataSent` / `DataSendFail` event.
    pub async fn send(&self, text: impl Into<String>) -> Result<u64, SendError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(SendError::Empty);
        }
        self.shared.enqueue(text).await
    }

    /// Blocking variant of [`send`](Self::send) for synchronous callers.
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context,
    /// like [`mpsc::Sender::blocking_send`].
    pub fn blocking_send(&self, text: impl Into<String>) -> Result<u64, SendError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(SendError::Empty);
        }
        let msg = OutboundMessage::new(&self.shared.ids, text);
        let id = msg.id;
        self.shared.queue.blocking_send(msg).map_err(|e| {
            let msg = e.0;
            self.shared.emit(Event::DataSendFail(msg.clone()));
            SendError::Closed(msg)
        })?;
        Ok(id)
    }

    /// Send `text` to a channel or nick, split as needed.
    pub async fn privmsg(&self, target: &str, text: &str) -> Result<u64, SendError> {
        self.send(privmsg(target, text)).await
    }

    pub async fn join(&self, channel: &str) -> Result<u64, SendError> {
        self.send(compile("JOIN", &[channel], "")).await
    }

    pub async fn part(&self, channel: &str, reason: &str) -> Result<u64, SendError> {
        self.send(compile("PART", &[channel], reason)).await
    }

    /// Send `QUIT`. The session ends when the server closes the socket.
    pub async fn disconnect(&self, reason: &str) -> Result<u64, SendError> {
        self.shared.set_phase(Phase::Closing);
        self.send(compile::<&str>("QUIT", &[], reason)).await
    }

    /// Stop the session immediately without saying goodbye.
    ///
    /// `Disconnected` is still emitted.
    pub fn shutdown(&self) {
        if let Some(task) = self.shared.task.lock().take() {
            info!("Session shut down");
            task.abort();
        }
    }

    /// Translate chat input typed while `current` is focused into a raw
    /// command. See the `/command` table in the crate docs.
    ///
    /// Only translates: a `/ping` is timed when it goes through
    /// [`send_input`](Self::send_input).
    pub fn parse_user_input(&self, current: &str, input: &str) -> Option<String> {
        input::parse(current, input, &self.shared.user_probe, &self.shared.ids)
            .map(|parsed| parsed.line())
    }

    /// Parse and send chat input. `Ok(None)` when there was nothing to send.
    pub async fn send_input(&self, current: &str, input: &str) -> Result<Option<u64>, SendError> {
        let parsed = input::parse(current, input, &self.shared.user_probe, &self.shared.ids);
        match parsed {
            Some(input::Parsed::Line(line)) => self.send(line).await.map(Some),
            Some(input::Parsed::Probe(id)) => {
                {
                    // Must be armed before the PING can reach the server.
                    let mut probe = self.shared.user_probe.lock();
                    if probe.in_flight() {
                        return Ok(None);
                    }
                    probe.arm(id, Instant::now());
                }
                let sent = self.send(input::probe_line(id)).await;
                if sent.is_err() {
                    self.shared.user_probe.lock().cancel(id);
                }
                sent.map(Some)
            }
            None => Ok(None),
        }
    }

    // ------------------------------------------------------------------------
    // Store snapshots
    // ------------------------------------------------------------------------

    pub fn channel(&self, name: &str) -> Option<Channel> {
        self.shared.view.read().store.channel(name).cloned()
    }

    /// Every known channel, sorted by name.
    pub fn channels(&self) -> Vec<Channel> {
        let mut channels: Vec<Channel> = self.shared.view.read().store.channels().cloned().collect();
        channels.sort_by(|a, b| a.name().cmp(b.name()));
        channels
    }

    pub fn user(&self, nick: &str) -> Option<User> {
        self.shared.view.read().store.user(nick).cloned()
    }

    /// Every known user, sorted by nick.
    pub fn users(&self) -> Vec<User> {
        let mut users: Vec<User> = self.shared.view.read().store.users().cloned().collect();
        users.sort_by(|a, b| a.nick().cmp(b.nick()));
        users
    }

    pub fn has_user(&self, nick: &str) -> bool {
        self.shared.view.read().store.has_user(nick)
    }

    /// Channels followed by direct conversations.
    pub fn conversations(&self) -> Vec<Conversation> {
        let channels = self.channels().into_iter().map(Conversation::Channel);
        let users = self.users().into_iter().map(Conversation::Direct);
        channels.chain(users).collect()
    }

    // ------------------------------------------------------------------------
    // Session information
    // ------------------------------------------------------------------------

    /// Current lag estimate.
    ///
    /// While a periodic probe is unanswered for longer than the last
    /// measurement, its age is reported instead.
    pub fn lag(&self) -> Option<Duration> {
        let view = self.shared.view.read();
        let pending = view.state.lag_probe.pending_for(Instant::now());
        match (pending, view.state.lag) {
            (Some(pending), Some(last)) => Some(pending.max(last)),
            (pending, last) => last.or(pending),
        }
    }

    pub fn motd(&self) -> Option<String> {
        self.shared.view.read().state.motd.clone()
    }

    pub fn server_name(&self) -> String {
        self.shared.view.read().state.server_name.clone()
    }

    /// Nick currently in use (or being registered).
    pub fn nick(&self) -> String {
        self.shared.view.read().state.nick.clone()
    }

    pub fn phase(&self) -> Phase {
        self.shared.view.read().state.phase
    }

    pub fn is_connected(&self) -> bool {
        self.phase().is_open()
    }

    // ------------------------------------------------------------------------
    // Capabilities
    // ------------------------------------------------------------------------

    /// Whether the server answered `CAP LS`.
    pub fn supports_ircv3(&self) -> bool {
        self.shared.view.read().state.ircv3
    }

    /// Whether the server offered `cap`.
    pub fn has_capability(&self, cap: &str) -> bool {
        self.shared.view.read().state.offers(cap)
    }

    /// Capabilities offered by the server.
    pub fn capabilities(&self) -> Vec<String> {
        self.shared.view.read().state.offered_caps.clone()
    }

    /// Capabilities acknowledged with `CAP ACK`.
    pub fn enabled_capabilities(&self) -> Vec<String> {
        self.shared.view.read().state.enabled_caps.clone()
    }

    /// Raw ISUPPORT value for `key` (case-insensitive).
    pub fn isupport(&self, key: &str) -> Option<String> {
        self.shared
            .view
            .read()
            .state
            .isupport
            .get(&key.to_ascii_uppercase())
            .cloned()
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("server", &self.shared.config.server.address())
            .field("phase", &self.phase())
            .finish()
    }
}
