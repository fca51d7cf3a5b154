use rand::Rng;

use super::gauss;

/// Slow sinusoid around a base temperature plus measurement noise.
#[derive(Debug, Clone)]
pub struct Thermal {
    base_c: f64,
}

impl Thermal {
    pub fn new(base_c: f64) -> Self {
        Self { base_c }
    }

    /// Temperature at `t` seconds, in centidegrees (truncated toward zero).
    pub fn sample<R: Rng>(&self, t: f64, rng: &mut R) -> i16 {
        let temp_c = self.base_c + (t / 30.0).sin() * 1.5 + gauss(rng, 0.0, 0.2);
        (temp_c * 100.0) as i16
    }
}
