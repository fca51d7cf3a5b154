use std::fmt;
use std::time::Instant;

/// Ground-side loss accounting for the telemetry downlink.
///
/// Loss is inferred from gaps in `seq`. A wrap from 65535 back to 0 is not
/// special-cased: it looks like a non-increasing seq and adds no loss, while
/// a wrap that skips frames is under-counted. Known limitation.
#[derive(Debug, Clone)]
pub struct LinkStatsTracker {
    total_good: u64,
    total_bad: u64,
    last_seq: Option<u16>,
    seq_loss: u64,
    start_time: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsSnapshot {
    pub total_good: u64,
    pub total_bad: u64,
    pub seq_loss: u64,
    pub loss_pct: f64,
    /// good frames per second since start
    pub rate_est: f64,
}

impl Default for LinkStatsTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkStatsTracker {
    pub fn new() -> Self {
        Self::started_at(Instant::now())
    }

    pub fn started_at(start_time: Instant) -> Self {
        Self {
            total_good: 0,
            total_bad: 0,
            last_seq: None,
            seq_loss: 0,
            start_time,
        }
    }

    pub fn record_good(&mut self, seq: u16) {
        self.total_good += 1;
        if let Some(last) = self.last_seq {
            if seq as u32 > last as u32 + 1 {
                self.seq_loss += (seq - last - 1) as u64;
            }
        }
        self.last_seq = Some(seq);
    }

    pub fn record_bad(&mut self) {
        self.total_bad += 1;
    }

    pub fn last_seq(&self) -> Option<u16> {
        self.last_seq
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.snapshot_at(Instant::now())
    }

    pub fn snapshot_at(&self, now: Instant) -> StatsSnapshot {
        let elapsed = now.saturating_duration_since(self.start_time).as_secs_f64();
        let rate_est = if elapsed > 0.0 {
            self.total_good as f64 / elapsed
        } else {
            0.0
        };
        let total = self.total_good + self.total_bad;
        let loss_pct = if total > 0 {
            self.seq_loss as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        StatsSnapshot {
            total_good: self.total_good,
            total_bad: self.total_bad,
            seq_loss: self.seq_loss,
            loss_pct,
            rate_est,
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "good={} bad={} loss={} ({:.1}%) rate≈{:.1} pps",
            self.total_good, self.total_bad, self.seq_loss, self.loss_pct, self.rate_est
        )
    }
}
