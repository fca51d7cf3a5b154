// runtime configuration: file (optional) -> SATLINK_* env -> flags
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;
use serde::Deserialize;

use crate::errors::GroundError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub udp_host: String,
    pub udp_port: u16,
    pub uplink_host: String,
    pub uplink_port: u16,

    pub ground_log_dir: PathBuf,
    pub ground_log_csv: bool,
    pub ground_log_jsonl: bool,
    pub ground_status_interval_sec: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            udp_host: "127.0.0.1".into(),
            udp_port: shared_protocol::DEFAULT_DOWNLINK_PORT,
            uplink_host: "127.0.0.1".into(),
            uplink_port: shared_protocol::DEFAULT_UPLINK_PORT,
            ground_log_dir: PathBuf::from("ground/logs"),
            ground_log_csv: true,
            ground_log_jsonl: true,
            ground_status_interval_sec: 5,
        }
    }
}

impl Config {
    /// Where the station listens for telemetry.
    pub fn downlink_addr(&self) -> String {
        format!("{}:{}", self.udp_host, self.udp_port)
    }

    /// Where commands are sent (the satellite's listener).
    pub fn uplink_addr(&self) -> String {
        format!("{}:{}", self.uplink_host, self.uplink_port)
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.ground_status_interval_sec.max(1))
    }

    pub fn load(path: Option<&Path>) -> Result<Self, GroundError> {
        let mut builder = config::Config::builder();
        if let Some(p) = path {
            builder = builder.add_source(config::File::from(p));
        }
        let cfg = builder
            .add_source(config::Environment::with_prefix("SATLINK").try_parsing(true))
            .build()?
            .try_deserialize()?;
        Ok(cfg)
    }
}

/// Link flags shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct LinkArgs {
    /// Shared link configuration file (toml/json/yaml)
    #[arg(long, global = true)] pub config: Option<PathBuf>,
    #[arg(long, global = true)] pub udp_host: Option<String>,
    #[arg(long, global = true)] pub udp_port: Option<u16>,
    #[arg(long, global = true)] pub uplink_host: Option<String>,
    #[arg(long, global = true)] pub uplink_port: Option<u16>,
    #[arg(long, global = true)] pub log_dir: Option<PathBuf>,
    /// Do not write the CSV telemetry log
    #[arg(long, global = true)] pub no_csv: bool,
    /// Do not write the JSONL telemetry log
    #[arg(long, global = true)] pub no_jsonl: bool,
    #[arg(long, global = true)] pub status_interval_sec: Option<u64>,
}

impl LinkArgs {
    pub fn build_config(&self) -> Result<Config, GroundError> {
        let mut cfg = Config::load(self.config.as_deref())?;
        if let Some(v) = &self.udp_host { cfg.udp_host = v.clone(); }
        if let Some(v) = self.udp_port { cfg.udp_port = v; }
        if let Some(v) = &self.uplink_host { cfg.uplink_host = v.clone(); }
        if let Some(v) = self.uplink_port { cfg.uplink_port = v; }
        if let Some(v) = &self.log_dir { cfg.ground_log_dir = v.clone(); }
        if self.no_csv { cfg.ground_log_csv = false; }
        if self.no_jsonl { cfg.ground_log_jsonl = false; }
        if let Some(v) = self.status_interval_sec { cfg.ground_status_interval_sec = v; }
        Ok(cfg)
    }
}
