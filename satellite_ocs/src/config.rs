//Command line interface
// runtime configuration: file (optional) -> SATLINK_* env -> flags
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

use crate::errors::OcsError;
use crate::fsm::FsmConfig;

/// Telemetry loop never runs faster than this.
pub const MIN_TELEMETRY_RATE_MS: u64 = 50;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub udp_host: String,
    pub udp_port: u16,
    pub uplink_host: String,
    pub uplink_port: u16,
    pub telemetry_rate_ms: u64,
    pub debug_corrupt_prob: f64,

    // sensor simulator
    pub battery_start_mv: f64,
    pub battery_drain_mv_per_sec: f64,
    pub temp_base_c: f64,
    pub pressure_base_pa: f64,

    // mode FSM
    pub temp_high_centideg: i32,
    pub batt_low_mv: i32,
    pub hold_commanded_idle: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            udp_host: "127.0.0.1".into(),
            udp_port: shared_protocol::DEFAULT_DOWNLINK_PORT,
            uplink_host: "127.0.0.1".into(),
            uplink_port: shared_protocol::DEFAULT_UPLINK_PORT,
            telemetry_rate_ms: 500,
            debug_corrupt_prob: 0.0,
            battery_start_mv: 4200.0,
            battery_drain_mv_per_sec: 0.05,
            temp_base_c: 25.0,
            pressure_base_pa: 101_325.0,
            temp_high_centideg: 4000,
            batt_low_mv: 3300,
            hold_commanded_idle: false,
        }
    }
}

impl Config {
    /// Where telemetry frames go (the ground station).
    pub fn downlink_addr(&self) -> String {
        format!("{}:{}", self.udp_host, self.udp_port)
    }

    /// Local bind address of the command listener.
    pub fn uplink_addr(&self) -> String {
        format!("{}:{}", self.uplink_host, self.uplink_port)
    }

    pub fn telemetry_period(&self) -> Duration {
        Duration::from_millis(self.telemetry_rate_ms.max(MIN_TELEMETRY_RATE_MS))
    }

    pub fn fsm(&self) -> FsmConfig {
        FsmConfig {
            temp_high_centideg: self.temp_high_centideg,
            batt_low_mv: self.batt_low_mv,
            hold_commanded_idle: self.hold_commanded_idle,
        }
    }

    pub fn load(path: Option<&Path>) -> Result<Self, OcsError> {
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

#[derive(Parser, Debug, Clone)]
#[command(about = "CubeSat telemetry simulator: downlinks framed telemetry, listens for uplink commands")]
pub struct Cli {
    /// Shared link configuration file (toml/json/yaml)
    #[arg(long)] pub config: Option<PathBuf>,
    #[arg(long)] pub udp_host: Option<String>,
    #[arg(long)] pub udp_port: Option<u16>,
    #[arg(long)] pub uplink_host: Option<String>,
    #[arg(long)] pub uplink_port: Option<u16>,
    #[arg(long)] pub telemetry_rate_ms: Option<u64>,
    #[arg(long)] pub debug_corrupt_prob: Option<f64>,
    /// Keep a commanded IDLE mode across telemetry updates
    #[arg(long)] pub hold_commanded_idle: bool,
}

impl Cli {
    pub fn parse_and_build_config() -> Result<Config, OcsError> {
        <Cli as Parser>::parse().build_config()
    }

    fn build_config(self) -> Result<Config, OcsError> {
        let mut cfg = Config::load(self.config.as_deref())?;
        if let Some(v) = self.udp_host { cfg.udp_host = v; }
        if let Some(v) = self.udp_port { cfg.udp_port = v; }
        if let Some(v) = self.uplink_host { cfg.uplink_host = v; }
        if let Some(v) = self.uplink_port { cfg.uplink_port = v; }
        if let Some(v) = self.telemetry_rate_ms { cfg.telemetry_rate_ms = v; }
        if let Some(v) = self.debug_corrupt_prob { cfg.debug_corrupt_prob = v; }
        if self.hold_commanded_idle { cfg.hold_commanded_idle = true; }
        Ok(cfg)
    }
}
