//! Inbound reader loop and periodic lag prober.

use super::Shared;
use crate::handlers::{Context, Registry};
use crate::lag::LAG_INTERVAL;
use futures_util::StreamExt;
use slirc_wire::{LineCodec, Message, ProtocolError, compile};
use std::time::Instant;
use tokio::io::AsyncRead;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::codec::FramedRead;
use tracing::{debug, trace, warn};

/// Read and dispatch lines until the server closes the connection.
pub(crate) async fn run<R>(read: R, shared: &Shared) -> Result<(), ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut lines = FramedRead::new(read, LineCodec::new().lossy());
    let registry = Registry::new();
    // Started by the welcome; never ticks before registration.
    let mut lag_timer: Option<Interval> = None;

    loop {
        tokio::select! {
            line = lines.next() => match line {
                Some(Ok(line)) => {
                    let arm = handle_line(&registry, shared, &line).await;
                    if arm && lag_timer.is_none() {
                        lag_timer = Some(lag_interval());
                    }
                }
                Some(Err(e)) => return Err(e),
                None => return Ok(()),
            },
            _ = next_tick(&mut lag_timer) => probe(shared).await,
        }
    }
}

/// Dispatch one line. Returns whether the lag timer should be running.
async fn handle_line(registry: &Registry, shared: &Shared, line: &str) -> bool {
    let msg = Message::parse(line);
    trace!(kind = ?msg.kind, raw = %msg.raw, "Received");
    shared.emit(crate::event::Event::DataReceived(msg.clone()));

    let (events, outbound, arm) = {
        let mut guard = shared.view.write();
        let view = &mut *guard;
        let mut ctx = Context::new(
            &mut view.state,
            &mut view.store,
            &shared.config.server,
            &shared.config.session,
            &shared.ids,
            &shared.user_probe,
        );
        registry.dispatch(&mut ctx, &msg);
        let Context {
            events, outbound, ..
        } = ctx;
        (events, outbound, view.state.lag_timer_armed)
    };

    for event in events {
        shared.emit(event);
    }
    for line in outbound {
        if let Err(e) = shared.enqueue(line).await {
            warn!(error = %e, "Failed to queue reply");
        }
    }
    arm
}

fn lag_interval() -> Interval {
    // The first tick completes immediately, so the first probe goes out
    // right after the welcome.
    let mut interval = tokio::time::interval(LAG_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Send a periodic lag probe unless the previous one is unanswered.
async fn probe(shared: &Shared) {
    let token = {
        let mut view = shared.view.write();
        let probe = &mut view.state.lag_probe;
        if probe.in_flight() {
            debug!("Previous lag probe unanswered, skipping");
            return;
        }
        probe.arm(shared.ids.next_id(), Instant::now())
    };

    if let Err(e) = shared.enqueue(compile::<&str>("PING", &[], &token)).await {
        warn!(error = %e, "Failed to queue lag probe");
    }
}
