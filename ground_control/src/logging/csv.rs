use std::path::Path;

use async_trait::async_trait;

use super::{LogFile, RecordSink};
use crate::errors::GroundError;
use crate::record::{CSV_HEADER, TelemetryRecord};

/// `telemetry_<ts>.csv`: header row, then one flushed row per record.
pub struct CsvLogger {
    file: LogFile,
}

impl CsvLogger {
    pub async fn create(dir: &Path) -> Result<Self, GroundError> {
        let file = LogFile::create(dir, "csv", Some(CSV_HEADER)).await?;
        Ok(Self { file })
    }
}

#[async_trait]
impl RecordSink for CsvLogger {
    async fn write(&mut self, rec: &TelemetryRecord) -> Result<(), GroundError> {
        self.file.append_line(&rec.csv_row()).await
    }

    async fn close(&mut self) -> Result<(), GroundError> {
        self.file.close().await
    }

    fn path(&self) -> &Path {
        self.file.path()
    }
}
