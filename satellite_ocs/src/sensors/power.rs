/// Battery voltage drains linearly and is reported clamped to the pack range.
pub const BATT_MIN_MV: f64 = 3000.0;
pub const BATT_MAX_MV: f64 = 4200.0;

#[derive(Debug, Clone)]
pub struct Battery {
    mv: f64,
    drain_mv_per_sec: f64,
}

impl Battery {
    pub fn new(start_mv: f64, drain_mv_per_sec: f64) -> Self {
        Self { mv: start_mv, drain_mv_per_sec }
    }

    pub fn advance(&mut self, dt_secs: f64) -> u16 {
        self.mv -= self.drain_mv_per_sec * dt_secs;
        self.mv.clamp(BATT_MIN_MV, BATT_MAX_MV) as u16
    }
}
