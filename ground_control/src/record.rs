//! Flattened, log-friendly view of one decoded telemetry frame.

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared_protocol::{FrameHeader, Mode, TelemetryPayload};

/// Column order of the CSV log; matches the field order of [`TelemetryRecord`].
pub const CSV_HEADER: &str = "timestamp,version,msgtype,seq,timestamp_ms,mode,batt_mv,temp_c,press_pa,alt_cm,gyro_x,gyro_y,gyro_z,acc_x,acc_y,acc_z,light,comp_len,raw_len\n";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryRecord {
    /// ground receive time, UNIX seconds
    pub timestamp: i64,
    pub version: u8,
    pub msgtype: u8,
    pub seq: u16,
    pub timestamp_ms: u32,
    pub mode: String,
    pub batt_mv: u16,
    pub temp_c: f64,
    pub press_pa: u32,
    pub alt_cm: u32,
    pub gyro_x: i16,
    pub gyro_y: i16,
    pub gyro_z: i16,
    pub acc_x: i16,
    pub acc_y: i16,
    pub acc_z: i16,
    pub light: u16,
    pub comp_len: u8,
    pub raw_len: usize,
}

/// "OP" / "SAFE" / "IDLE", or the raw number for anything else.
pub fn mode_label(raw: u8) -> String {
    match Mode::from_u8(raw) {
        Some(m) => m.label().to_string(),
        None => raw.to_string(),
    }
}

impl TelemetryRecord {
    pub fn from_frame(
        header: &FrameHeader,
        p: &TelemetryPayload,
        raw_len: usize,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp: received_at.timestamp(),
            version: header.version,
            msgtype: header.msgtype,
            seq: header.seq,
            timestamp_ms: p.timestamp_ms,
            mode: mode_label(p.mode),
            batt_mv: p.batt_mv,
            temp_c: (p.temp_c() * 100.0).round() / 100.0,
            press_pa: p.press_pa,
            alt_cm: p.alt_cm,
            gyro_x: p.gyro[0],
            gyro_y: p.gyro[1],
            gyro_z: p.gyro[2],
            acc_x: p.acc[0],
            acc_y: p.acc[1],
            acc_z: p.acc[2],
            light: p.light,
            comp_len: p.comp_len,
            raw_len,
        }
    }

    pub fn csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{:?},{},{},{},{},{},{},{},{},{},{},{}\n",
            self.timestamp,
            self.version,
            self.msgtype,
            self.seq,
            self.timestamp_ms,
            self.mode,
            self.batt_mv,
            self.temp_c,
            self.press_pa,
            self.alt_cm,
            self.gyro_x,
            self.gyro_y,
            self.gyro_z,
            self.acc_x,
            self.acc_y,
            self.acc_z,
            self.light,
            self.comp_len,
            self.raw_len,
        )
    }
}
