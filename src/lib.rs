//! # slirc-client
//!
//! An asynchronous IRC client session engine.
//!
//! A session owns one server connection. It negotiates capabilities,
//! registers (falling back to a second nick), answers `PING`, measures lag,
//! and keeps a bounded history for every channel and user it sees. The
//! embedder drives it through a [`SessionHandle`] and observes it through a
//! stream of [`Event`]s.
//!
//! ## Quick Start
//!
//! ```no_run
//! use slirc_client::{Config, Event, ServerInfo, Session};
//!
//! # async fn demo() {
//! let config = Config::new(ServerInfo::new("irc.libera.chat", 6667, "slirc"));
//! let (handle, mut events) = Session::start(config);
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         Event::Connected(_) => {
//!             let _ = handle.join("#slirc").await;
//!         }
//!         Event::Disconnected(_) => break,
//!         _ => {}
//!     }
//! }
//! # }
//! ```
//!
//! ## User input
//!
//! [`SessionHandle::send_input`] accepts chat-style input:
//!
//! | Input | Sent |
//! |-------|------|
//! | `text` | `PRIVMSG <current> :text` |
//! | `//text` | `PRIVMSG <current> :/text` |
//! | `/msg <nick> <text>`, `/privmsg` | `PRIVMSG <nick> :text` |
//! | `/ns <text>`, `/nickserv` | `PRIVMSG NickServ :text` |
//! | `/cs <text>`, `/chanserv` | `PRIVMSG ChanServ :text` |
//! | `/me <text>` | CTCP `ACTION` to `<current>` |
//! | `/part [#chan] [reason]`, `/close` | `PART` |
//! | `/quit [reason]`, `/bye`, `/disconnect`, `/discon` | `QUIT` |
//! | `/ping` | lag probe, reported as `UserLagMeasured` |
//! | `/raw <line>`, `/quote` | the line as typed |
//! | `/<cmd> <args>` | `<CMD> <args>` |

pub mod config;
pub mod error;
pub mod event;
pub mod handlers;
pub mod lag;
pub mod outbound;
pub mod session;
pub mod state;
pub mod telemetry;

pub use config::{Config, ServerInfo, SessionConfig};
pub use error::{ConnectError, SendError};
pub use event::{Event, EventKind};
pub use outbound::OutboundMessage;
pub use session::{PinState, PinningGate, Session, SessionHandle};
pub use state::{Channel, Conversation, Phase, User};
