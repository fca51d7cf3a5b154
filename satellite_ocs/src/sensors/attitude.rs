use rand::Rng;

use super::gauss;

/// Gyro and accelerometer noise; accelerometer z sits near 1 g (1000).
#[derive(Debug, Clone, Copy)]
pub struct Imu;

impl Imu {
    pub fn gyro<R: Rng>(&self, rng: &mut R) -> [i16; 3] {
        [0.0; 3].map(|mean| gauss(&mut *rng, mean, 20.0) as i16)
    }

    pub fn acc<R: Rng>(&self, rng: &mut R) -> [i16; 3] {
        [0.0, 0.0, 1000.0].map(|mean| gauss(&mut *rng, mean, 50.0) as i16)
    }
}
