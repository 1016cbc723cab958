//! Outbound writer task.
//!
//! Drains the bounded queue in order, frames every message into physical
//! lines and writes them, optionally throttled by a token bucket.

use crate::config::SessionConfig;
use crate::event::Event;
use crate::outbound::OutboundMessage;
use futures_util::SinkExt;
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use slirc_wire::{LineCodec, ProtocolError, frame};
use std::num::NonZeroU32;
use tokio::io::AsyncWrite;
use tokio::sync::mpsc;
use tokio_util::codec::FramedWrite;
use tracing::{debug, trace, warn};

/// Type alias for governor's direct rate limiter.
pub(crate) type Throttle = governor::DefaultDirectRateLimiter;

/// Build the writer's rate limiter, if throttling is enabled.
pub(crate) fn throttle(config: &SessionConfig) -> Option<Throttle> {
    if !config.throttle {
        return None;
    }
    let rate = NonZeroU32::new(config.throttle_rate).unwrap_or(nonzero!(2u32));
    let burst = NonZeroU32::new(config.throttle_burst).unwrap_or(nonzero!(5u32));
    Some(RateLimiter::direct(Quota::per_second(rate).allow_burst(burst)))
}

/// Write queued messages until the queue closes.
///
/// A failed write reports `DataSendFail` and moves on to the next message;
/// a dead socket ends the reader, whose teardown aborts this task.
pub(crate) async fn run<W>(
    write: W,
    mut queue: mpsc::Receiver<OutboundMessage>,
    events: mpsc::UnboundedSender<Event>,
    throttle: Option<Throttle>,
) where
    W: AsyncWrite + Unpin,
{
    let mut sink = FramedWrite::new(write, LineCodec::new());

    while let Some(msg) = queue.recv().await {
        match write_message(&mut sink, &msg, throttle.as_ref()).await {
            Ok(()) => {
                trace!(id = msg.id, "Message written");
                let _ = events.send(Event::DataSent(msg));
            }
            Err(e) => {
                warn!(id = msg.id, error = %e, "Write error");
                let _ = events.send(Event::DataSendFail(msg));
            }
        }
    }

    debug!("Outbound queue closed");
}

async fn write_message<W>(
    sink: &mut FramedWrite<W, LineCodec>,
    msg: &OutboundMessage,
    throttle: Option<&Throttle>,
) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    for line in frame(&msg.text) {
        if let Some(limiter) = throttle {
            limiter.until_ready().await;
        }
        sink.send(line).await?;
    }
    Ok(())
}
