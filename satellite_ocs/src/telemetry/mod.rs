use chrono::Utc;
use rand::{Rng, rngs::StdRng};
use shared_protocol::{Mode, Sender, TELEMETRY_FRAME_LEN, TelemetryPayload, encode_telemetry};
use tokio::time::{self, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::Config;
use crate::faults::Corruptor;
use crate::fsm::SharedFsm;
use crate::sensors::{SensorSimulator, SensorSnapshot};

/// Wall-clock milliseconds truncated to the 32-bit wire field.
pub fn timestamp_ms() -> u32 {
    Utc::now().timestamp_millis() as u32
}

pub fn build_frame(
    seq: u16,
    snap: &SensorSnapshot,
    mode: Mode,
    timestamp_ms: u32,
) -> [u8; TELEMETRY_FRAME_LEN] {
    let payload = TelemetryPayload {
        timestamp_ms,
        mode: mode.into(),
        batt_mv: snap.batt_mv,
        temp_centideg: snap.temp_centideg,
        press_pa: snap.press_pa,
        alt_cm: snap.alt_cm,
        gyro: snap.gyro,
        acc: snap.acc,
        light: snap.light,
        comp_len: 0,
    };
    encode_telemetry(seq, &payload)
}

/// Periodic downlink: sample sensors, advance the FSM, send one frame, sleep.
pub struct TelemetryLoop<R: Rng = StdRng> {
    sensors: SensorSimulator<R>,
    fsm: SharedFsm,
    sender: Sender,
    corruptor: Corruptor,
    period: Duration,
    seq: u16,
}

impl TelemetryLoop<StdRng> {
    pub fn from_config(cfg: &Config, fsm: SharedFsm, sender: Sender) -> Self {
        Self::new(
            SensorSimulator::from_config(cfg),
            fsm,
            sender,
            Corruptor::new(cfg.debug_corrupt_prob),
            cfg.telemetry_period(),
        )
    }
}

impl<R: Rng> TelemetryLoop<R> {
    pub fn new(
        sensors: SensorSimulator<R>,
        fsm: SharedFsm,
        sender: Sender,
        corruptor: Corruptor,
        period: Duration,
    ) -> Self {
        Self { sensors, fsm, sender, corruptor, period, seq: 0 }
    }

    /// One cycle without the sleep. Returns the seq used.
    pub async fn tick(&mut self) -> u16 {
        let snap = self.sensors.step();
        let mode = self.fsm.lock().update(&snap);

        let seq = self.seq;
        let mut frame = build_frame(seq, &snap, mode, timestamp_ms());
        let corrupted = self.corruptor.maybe_corrupt(&mut frame);

        // single best-effort attempt; the link is lossy anyway
        match self.sender.send(&frame).await {
            Ok(_) => info!(
                seq,
                mode = %mode,
                batt = snap.batt_mv,
                temp_c = format_args!("{:.2}", snap.temp_centideg as f64 / 100.0),
                corrupted,
                "sent telemetry"
            ),
            Err(e) => warn!(seq, ?e, "telemetry send failed"),
        }

        self.seq = self.seq.wrapping_add(1);
        seq
    }

    pub async fn run(mut self, cancel: CancellationToken) {
        info!(dest = %self.sender.destination(), period = ?self.period, "telemetry downlink started");
        loop {
            self.tick().await;
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = time::sleep(self.period) => {}
            }
        }
        info!(last_seq = self.seq.wrapping_sub(1), "telemetry downlink stopped");
    }
}
