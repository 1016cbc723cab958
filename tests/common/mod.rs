//! Integration test common infrastructure.
//!
//! A scripted IRC server the session under test connects to, plus helpers
//! for waiting on session events.

#![allow(dead_code)]

pub mod server;
pub mod tls;

pub use server::{MockConn, MockServer};

use slirc_client::{Config, Event, ServerInfo};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;

/// Default wait for anything the session is expected to do.
pub const WAIT: Duration = Duration::from_secs(5);

/// Plain-text config pointing at a local mock server, unthrottled.
pub fn config(port: u16, nick: &str) -> Config {
    let mut config = Config::new(ServerInfo::new("127.0.0.1", port, nick));
    config.session.throttle = false;
    config
}

/// Wait for the first event matching `pred`, skipping the others.
pub async fn wait_for<F>(events: &mut UnboundedReceiver<Event>, mut pred: F) -> Event
where
    F: FnMut(&Event) -> bool,
{
    let found = timeout(WAIT, async {
        while let Some(event) = events.recv().await {
            if pred(&event) {
                return Some(event);
            }
        }
        None
    })
    .await;

    match found {
        Ok(Some(event)) => event,
        Ok(None) => panic!("event stream closed"),
        Err(_) => panic!("timed out waiting for event"),
    }
}

/// Collect events up to and including `Disconnected`.
pub async fn until_disconnected(events: &mut UnboundedReceiver<Event>) -> Vec<Event> {
    let mut seen = Vec::new();
    let done = timeout(WAIT, async {
        while let Some(event) = events.recv().await {
            let last = matches!(event, Event::Disconnected(_));
            seen.push(event);
            if last {
                return;
            }
        }
    })
    .await;
    assert!(done.is_ok(), "no Disconnected event, saw {seen:?}");
    seen
}
