pub mod thermal;
pub mod power;
pub mod attitude;

use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::StandardNormal;

use crate::config::Config;

/// One reading of every on-board sensor, taken once per telemetry cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorSnapshot {
    pub batt_mv: u16,
    pub temp_centideg: i16,
    pub press_pa: u32,
    /// Wraps like the wire field when pressure is above sea level.
    pub alt_cm: u32,
    pub gyro: [i16; 3],
    pub acc: [i16; 3],
    pub light: u16,
}

pub(crate) fn gauss<R: Rng>(rng: &mut R, mean: f64, sigma: f64) -> f64 {
    let z: f64 = rng.sample(StandardNormal);
    mean + sigma * z
}

/// Synthesizes plausible sensor values; nothing here is part of the link.
pub struct SensorSimulator<R: Rng = StdRng> {
    rng: R,
    started: Instant,
    last: Duration,
    battery: power::Battery,
    thermal: thermal::Thermal,
    imu: attitude::Imu,
    pressure_base_pa: f64,
}

impl SensorSimulator<StdRng> {
    pub fn from_config(cfg: &Config) -> Self {
        Self::with_rng(cfg, StdRng::from_os_rng())
    }
}

impl<R: Rng> SensorSimulator<R> {
    pub fn with_rng(cfg: &Config, rng: R) -> Self {
        Self {
            rng,
            started: Instant::now(),
            last: Duration::ZERO,
            battery: power::Battery::new(cfg.battery_start_mv, cfg.battery_drain_mv_per_sec),
            thermal: thermal::Thermal::new(cfg.temp_base_c),
            imu: attitude::Imu,
            pressure_base_pa: cfg.pressure_base_pa,
        }
    }

    pub fn step(&mut self) -> SensorSnapshot {
        let elapsed = self.started.elapsed();
        self.step_at(elapsed)
    }

    /// Advance to `elapsed` since start and sample everything.
    pub fn step_at(&mut self, elapsed: Duration) -> SensorSnapshot {
        let dt = elapsed.saturating_sub(self.last).as_secs_f64();
        self.last = elapsed;
        let t = elapsed.as_secs_f64();

        let press = self.pressure_base_pa + (t / 45.0).cos() * 5.0 + gauss(&mut self.rng, 0.0, 1.0);
        // standard-atmosphere approximation, metres
        let alt_m = 44_330.0 * (1.0 - (press / 101_325.0).powf(1.0 / 5.255));
        let light = 512.0 + (t / 10.0).sin() * 400.0 + gauss(&mut self.rng, 0.0, 40.0);

        SensorSnapshot {
            batt_mv: self.battery.advance(dt),
            temp_centideg: self.thermal.sample(t, &mut self.rng),
            press_pa: press as u32,
            alt_cm: (alt_m * 100.0) as i32 as u32,
            gyro: self.imu.gyro(&mut self.rng),
            acc: self.imu.acc(&mut self.rng),
            light: light.clamp(0.0, 1023.0) as u16,
        }
    }
}
