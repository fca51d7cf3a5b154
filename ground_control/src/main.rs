// src/main.rs
mod config;
mod errors;
mod logging;
mod record;
mod station;
mod stats;
mod uplink;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shared_protocol::Receiver;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::LinkArgs;
use crate::station::Station;
use crate::uplink::{Uplink, UplinkCommand};

#[derive(Parser, Debug)]
#[command(about = "Ground station: receives CubeSat telemetry and uplinks commands")]
struct Cli {
    #[command(flatten)]
    link: LinkArgs,
    #[command(subcommand)]
    cmd: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Receive, log and account telemetry (default)
    Listen,
    /// Send a single command frame
    Send {
        #[command(subcommand)]
        command: UplinkCommand,
        /// Sequence number of the frame
        #[arg(long, global = true, default_value_t = 0)]
        seq: u16,
    },
    /// Interactive command console
    Console,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------- logging ----------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("ground_control=info".parse()?)
                .add_directive("shared_protocol=info".parse()?)
                .add_directive("tokio=warn".parse()?),
        )
        .compact()
        .init();

    // -------- config ----------

    let cli = Cli::parse();
    let cfg = cli.link.build_config().context("loading configuration")?;

    match cli.cmd.unwrap_or(Cmd::Listen) {
        Cmd::Listen => {
            let rx = Receiver::bind(&cfg.downlink_addr())
                .await
                .with_context(|| format!("binding {}", cfg.downlink_addr()))?;
            let sinks = logging::open_sinks(&cfg).await.context("opening telemetry logs")?;
            for s in &sinks {
                info!(path = %s.path().display(), "logging telemetry");
            }
            let cancel = CancellationToken::new();
            let station = tokio::spawn(Station::new(sinks, cfg.status_interval()).run(rx, cancel.clone()));

            tokio::signal::ctrl_c().await?;
            info!("shutdown requested");
            cancel.cancel();
            station.await?;
        }
        Cmd::Send { command, seq } => {
            let mut up = Uplink::to(&cfg.uplink_addr(), seq).await?;
            up.send(command).await?;
        }
        Cmd::Console => {
            let up = Uplink::to(&cfg.uplink_addr(), 0).await?;
            info!(dest = %cfg.uplink_addr(), "uplink console");
            uplink::console(up).await?;
        }
    }
    Ok(())
}
