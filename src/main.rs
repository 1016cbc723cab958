//! slirc-bot - minimal headless client built on the session engine.
//!
//! Connects with the settings from a TOML file, logs every event, and
//! quits cleanly on Ctrl-C.

use slirc_client::{Config, Event, Session};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "slirc.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    info!(
        server = %config.server.address(),
        nick = %config.server.nick,
        tls = config.server.tls,
        "Starting slirc-bot"
    );

    let (handle, mut events) = Session::start(config);

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                match event {
                    Event::CertificatePinningStart { fingerprint, gate } => {
                        warn!(fingerprint = %fingerprint, "Accepting unverified certificate");
                        gate.accept();
                    }
                    Event::Connected(server) => info!(server = %server, "Registered"),
                    Event::JoinedChannel(channel) => {
                        let users = handle.channel(&channel).map(|c| c.user_count()).unwrap_or(0);
                        info!(channel = %channel, users = users, "Joined");
                    }
                    Event::LagMeasured(ms) => info!(lag_ms = ms, "Lag"),
                    Event::DataReceived(msg) => info!(target: "slirc_bot::wire", "<< {}", msg.raw),
                    Event::DataSent(_) => {}
                    Event::Disconnected(host) => {
                        info!(host = %host, "Disconnected");
                        break;
                    }
                    other if other.is_connect_failure() => error!(event = ?other, "Connection failed"),
                    other => info!(event = %other.kind(), "Event"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, quitting");
                if handle.disconnect("slirc-bot shutting down").await.is_err() {
                    handle.shutdown();
                }
            }
        }
    }

    info!("Shutdown complete");
    Ok(())
}
