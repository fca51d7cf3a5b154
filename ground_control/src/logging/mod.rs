// Telemetry record sinks (CSV, JSONL) written under the ground log dir.

pub mod csv;
pub mod jsonl;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::{
    fs::{self, File},
    io::{AsyncWriteExt, BufWriter},
};
use tracing::debug;

use crate::config::Config;
use crate::errors::GroundError;
use crate::record::TelemetryRecord;

pub use self::csv::CsvLogger;
pub use self::jsonl::JsonlLogger;

#[async_trait]
pub trait RecordSink: Send {
    async fn write(&mut self, rec: &TelemetryRecord) -> Result<(), GroundError>;
    async fn close(&mut self) -> Result<(), GroundError>;
    fn path(&self) -> &Path;
}

/// Open every sink the config asks for.
pub async fn open_sinks(cfg: &Config) -> Result<Vec<Box<dyn RecordSink>>, GroundError> {
    let mut sinks: Vec<Box<dyn RecordSink>> = Vec::new();
    if cfg.ground_log_csv {
        sinks.push(Box::new(CsvLogger::create(&cfg.ground_log_dir).await?));
    }
    if cfg.ground_log_jsonl {
        sinks.push(Box::new(JsonlLogger::create(&cfg.ground_log_dir).await?));
    }
    Ok(sinks)
}

/// One timestamped log file plus its `latest.<ext>` link.
pub(crate) struct LogFile {
    path: PathBuf,
    out: BufWriter<File>,
}

impl LogFile {
    pub(crate) async fn create(dir: &Path, ext: &str, header: Option<&str>) -> Result<Self, GroundError> {
        fs::create_dir_all(dir).await?;
        let name = format!("telemetry_{}.{ext}", Utc::now().timestamp());
        let path = dir.join(&name);
        let mut out = BufWriter::new(File::create(&path).await?);
        if let Some(h) = header {
            out.write_all(h.as_bytes()).await?;
            out.flush().await?;
        }
        refresh_latest(dir, &name, ext).await;
        Ok(Self { path, out })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) async fn append_line(&mut self, line: &str) -> Result<(), GroundError> {
        self.out.write_all(line.as_bytes()).await?;
        self.out.flush().await?;
        Ok(())
    }

    pub(crate) async fn close(&mut self) -> Result<(), GroundError> {
        self.out.shutdown().await?;
        Ok(())
    }
}

// best effort; a missing link never stops logging
#[cfg(unix)]
async fn refresh_latest(dir: &Path, name: &str, ext: &str) {
    let link = dir.join(format!("latest.{ext}"));
    let _ = fs::remove_file(&link).await;
    if let Err(e) = fs::symlink(name, &link).await {
        debug!(error = %e, link = %link.display(), "latest link not updated");
    }
}

#[cfg(not(unix))]
async fn refresh_latest(_dir: &Path, _name: &str, _ext: &str) {}
