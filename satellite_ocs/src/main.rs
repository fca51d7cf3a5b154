// src/main.rs
mod config;
mod errors;
mod net;
mod sensors;
mod fsm;
mod telemetry;
mod commands;
mod faults;

use anyhow::Result;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // -------- logging ----------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("satellite_ocs=info".parse()?)
                .add_directive("shared_protocol=info".parse()?)
                .add_directive("tokio=warn".parse()?),
        )
        .compact()
        .init();

    // -------- config ----------
    let cfg = config::Cli::parse_and_build_config()?;
    info!(?cfg, "satellite simulator starting");

    // -------- sockets ----------
    // downlink sender -> ground station, uplink socket for the listener
    let (tx, rx) = net::udp::connect(&cfg).await?;

    // -------- shared mode state ----------
    let fsm = fsm::ModeFsm::shared(cfg.fsm());

    // -------- uplink command listener ----------
    let listener = commands::spawn_receiver(rx, commands::CommandDispatcher::new(fsm.clone()));
    info!(addr = %cfg.uplink_addr(), "command listener started");

    // -------- telemetry downlink ----------
    let cancel = CancellationToken::new();
    let mut downlink = tokio::spawn(
        telemetry::TelemetryLoop::from_config(&cfg, fsm, tx).run(cancel.clone()),
    );

    info!("simulator running. Press Ctrl+C to stop…");

    // -------- graceful shutdown ----------
    let why = wait_for_shutdown(tokio::signal::ctrl_c(), &mut downlink).await;
    info!(?why, "shutting down");

    cancel.cancel();
    if why == Shutdown::Signal {
        if let Err(e) = downlink.await {
            warn!(?e, "telemetry task failed");
        }
    }
    listener.stop().await;
    info!("simulator stopped");
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shutdown {
    Signal,
    DownlinkEnded,
}

/// Resolve on Ctrl+C. Without a signal handler, run until the downlink task ends.
async fn wait_for_shutdown<F>(signal: F, downlink: &mut JoinHandle<()>) -> Shutdown
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => Shutdown::Signal,
        Err(e) => {
            warn!(?e, "failed to install Ctrl+C handler, running until the downlink stops");
            if let Err(e) = downlink.await {
                warn!(?e, "telemetry task failed");
            }
            Shutdown::DownlinkEnded
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn signal_triggers_shutdown() {
        let mut downlink = tokio::spawn(std::future::pending::<()>());
        let why = wait_for_shutdown(async { Ok(()) }, &mut downlink).await;
        assert_eq!(why, Shutdown::Signal);
        assert!(!downlink.is_finished());
        downlink.abort();
    }

    #[tokio::test]
    async fn missing_signal_handler_keeps_running() {
        let mut downlink = tokio::spawn(tokio::time::sleep(Duration::from_millis(100)));
        let started = tokio::time::Instant::now();
        let why = wait_for_shutdown(
            async { Err(std::io::Error::other("no signal support")) },
            &mut downlink,
        )
        .await;
        assert_eq!(why, Shutdown::DownlinkEnded);
        assert!(started.elapsed() >= Duration::from_millis(100));
        assert!(downlink.is_finished());
    }
}
