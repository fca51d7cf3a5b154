use std::path::Path;

use async_trait::async_trait;

use super::{LogFile, RecordSink};
use crate::errors::GroundError;
use crate::record::TelemetryRecord;

/// `telemetry_<ts>.jsonl`: one JSON object per line.
pub struct JsonlLogger {
    file: LogFile,
}

impl JsonlLogger {
    pub async fn create(dir: &Path) -> Result<Self, GroundError> {
        let file = LogFile::create(dir, "jsonl", None).await?;
        Ok(Self { file })
    }
}

#[async_trait]
impl RecordSink for JsonlLogger {
    async fn write(&mut self, rec: &TelemetryRecord) -> Result<(), GroundError> {
        let mut line = serde_json::to_string(rec)?;
        line.push('\n');
        self.file.append_line(&line).await
    }

    async fn close(&mut self) -> Result<(), GroundError> {
        self.file.close().await
    }

    fn path(&self) -> &Path {
        self.file.path()
    }
}
