// Downlink receive loop: decode, account, log, report.

use std::time::{Duration, Instant};

use chrono::Utc;
use shared_protocol::{DecodeError, Frame, Receiver, decode};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::logging::RecordSink;
use crate::record::TelemetryRecord;
use crate::stats::{LinkStatsTracker, StatsSnapshot};

pub const RECV_TIMEOUT: Duration = Duration::from_millis(500);

/// What one datagram turned into.
#[derive(Debug)]
pub enum Received {
    Telemetry(TelemetryRecord),
    Bad(DecodeError),
    /// well-formed, but not telemetry (e.g. a stray command frame)
    Other { msgtype: u8 },
}

pub struct Station {
    stats: LinkStatsTracker,
    sinks: Vec<Box<dyn RecordSink>>,
    status_every: Duration,
}

impl Station {
    pub fn new(sinks: Vec<Box<dyn RecordSink>>, status_every: Duration) -> Self {
        Self {
            stats: LinkStatsTracker::new(),
            sinks,
            status_every,
        }
    }

    pub fn stats(&self) -> &LinkStatsTracker {
        &self.stats
    }

    pub async fn handle_datagram(&mut self, bytes: &[u8]) -> Received {
        match decode(bytes) {
            Ok(Frame::Telemetry { header, payload }) => {
                self.stats.record_good(header.seq);
                let rec = TelemetryRecord::from_frame(&header, &payload, bytes.len(), Utc::now());
                for sink in self.sinks.iter_mut() {
                    if let Err(e) = sink.write(&rec).await {
                        warn!(error = %e, path = %sink.path().display(), "log write failed");
                    }
                }
                Received::Telemetry(rec)
            }
            Ok(other) => Received::Other { msgtype: other.header().msgtype },
            Err(e) => {
                self.stats.record_bad();
                Received::Bad(e)
            }
        }
    }

    /// Receive until cancelled, printing a status line every interval.
    /// Closes every sink on the way out and returns the final stats.
    pub async fn run(mut self, rx: Receiver, cancel: CancellationToken) -> StatsSnapshot {
        if let Ok(addr) = rx.local_addr() {
            info!(%addr, "ground station listening");
        }
        let mut last_status = Instant::now();
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                got = rx.recv(RECV_TIMEOUT) => {
                    if let Some((bytes, from)) = got {
                        match self.handle_datagram(&bytes).await {
                            Received::Telemetry(rec) => debug!(
                                %from,
                                seq = rec.seq,
                                mode = %rec.mode,
                                batt_mv = rec.batt_mv,
                                temp_c = rec.temp_c,
                                "telemetry"
                            ),
                            Received::Bad(e) => warn!(
                                %from,
                                error = %e,
                                len = bytes.len(),
                                raw = %hex::encode(&bytes),
                                "bad frame"
                            ),
                            Received::Other { msgtype } => {
                                debug!(%from, msgtype, "ignoring non-telemetry frame")
                            }
                        }
                    }
                }
            }
            if last_status.elapsed() >= self.status_every {
                info!("[status] {}", self.stats.snapshot());
                last_status = Instant::now();
            }
        }

        for sink in self.sinks.iter_mut() {
            if let Err(e) = sink.close().await {
                warn!(error = %e, path = %sink.path().display(), "log close failed");
            }
        }
        let last = self.stats.snapshot();
        info!(last_seq = ?self.stats().last_seq(), "[final] {last}");
        last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{CsvLogger, test_support::scratch_dir};
    use shared_protocol::{Sender, TelemetryPayload, encode_command, encode_telemetry};

    fn frame(seq: u16) -> [u8; 40] {
        encode_telemetry(seq, &TelemetryPayload::default())
    }

    #[tokio::test]
    async fn classifies_and_counts() {
        let mut st = Station::new(Vec::new(), Duration::from_secs(5));
        assert!(matches!(st.handle_datagram(&frame(0)).await, Received::Telemetry(_)));
        assert!(matches!(st.handle_datagram(&frame(3)).await, Received::Telemetry(_)));

        let mut bad = frame(4);
        bad[8] ^= 0xFF;
        assert!(matches!(
            st.handle_datagram(&bad).await,
            Received::Bad(DecodeError::ChecksumMismatch { .. })
        ));
        assert!(matches!(
            st.handle_datagram(&encode_command(1, 3, 0)).await,
            Received::Other { msgtype: 0x02 }
        ));
        assert!(matches!(st.handle_datagram(&[0xAA]).await, Received::Bad(DecodeError::TooShort { .. })));

        let s = st.stats().snapshot();
        assert_eq!((s.total_good, s.total_bad, s.seq_loss), (2, 2, 2));
    }

    #[tokio::test]
    async fn run_logs_and_stops_on_cancel() {
        let dir = scratch_dir("station");
        let csv = CsvLogger::create(&dir).await.unwrap();
        let csv_path = csv.path().to_path_buf();
        let st = Station::new(vec![Box::new(csv)], Duration::from_secs(60));

        let rx = Receiver::bind("127.0.0.1:0").await.unwrap();
        let tx = Sender::to(&rx.local_addr().unwrap().to_string()).await.unwrap();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(st.run(rx, cancel.clone()));

        for seq in [0u16, 1, 2] {
            tx.send(&frame(seq)).await.unwrap();
        }
        tx.send(b"garbage-datagram-xx").await.unwrap();

        // wait for the rows to land before stopping
        let deadline = Instant::now() + Duration::from_secs(5);
        while std::fs::read_to_string(&csv_path).unwrap().lines().count() < 4 {
            assert!(Instant::now() < deadline, "telemetry not logged");
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
        let last = tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(last.total_good, 3);
        assert_eq!(last.total_bad, 1);
        assert_eq!(last.seq_loss, 0);
        std::fs::remove_dir_all(dir).ok();
    }
}
