// src/faults/mod.rs
// Debug-only link impairment: randomly corrupt outgoing telemetry so the
// ground side's CRC rejection and bad-frame accounting can be exercised.
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::debug;

/// Byte flipped in a corrupted frame (inside the timestamp field).
pub const CORRUPT_OFFSET: usize = 8;

pub struct Corruptor<R: Rng = StdRng> {
    prob: f64,
    rng: R,
}

impl Corruptor<StdRng> {
    pub fn new(prob: f64) -> Self {
        Self::with_rng(prob, StdRng::from_os_rng())
    }
}

impl<R: Rng> Corruptor<R> {
    pub fn with_rng(prob: f64, rng: R) -> Self {
        let prob = if prob.is_finite() { prob.clamp(0.0, 1.0) } else { 0.0 };
        Self { prob, rng }
    }

    pub fn enabled(&self) -> bool {
        self.prob > 0.0
    }

    /// Returns true when the frame was damaged.
    pub fn maybe_corrupt(&mut self, frame: &mut [u8]) -> bool {
        if !self.enabled() || frame.len() <= CORRUPT_OFFSET {
            return false;
        }
        if !self.rng.random_bool(self.prob) {
            return false;
        }
        frame[CORRUPT_OFFSET] ^= 0xFF;
        debug!(offset = CORRUPT_OFFSET, "injected frame corruption");
        true
    }
}
