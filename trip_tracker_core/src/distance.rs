use chrono::{DateTime, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::DEFAULT_MAX_DISTANCE_KM;

/// Computes the distance covered by a trip. The controller only sees this trait,
/// so a GPS trace integrator can replace the random placeholder.
pub trait DistanceEstimator {
    fn estimate(&mut self, started_at: DateTime<Utc>, ended_at: DateTime<Utc>) -> f64;
}

/// Placeholder estimator drawing a uniform distance in `[0, max_km)` with one decimal.
#[derive(Debug)]
pub struct RandomDistance {
    rng: StdRng,
    tenths: u32,
}

impl RandomDistance {
    pub fn new(max_km: f64) -> Self {
        Self::with_rng(StdRng::from_os_rng(), max_km)
    }

    pub fn seeded(seed: u64, max_km: f64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), max_km)
    }

    fn with_rng(rng: StdRng, max_km: f64) -> Self {
        // Drawing whole tenths keeps the result strictly below max_km after rounding.
        let tenths = if max_km.is_finite() && max_km > 0.0 {
            ((max_km * 10.0).ceil() as u32).max(1)
        } else {
            1
        };
        Self { rng, tenths }
    }
}

impl Default for RandomDistance {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DISTANCE_KM)
    }
}

impl DistanceEstimator for RandomDistance {
    fn estimate(&mut self, _started_at: DateTime<Utc>, _ended_at: DateTime<Utc>) -> f64 {
        self.rng.random_range(0..self.tenths) as f64 / 10.0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedDistance(pub f64);

impl DistanceEstimator for FixedDistance {
    fn estimate(&mut self, _started_at: DateTime<Utc>, _ended_at: DateTime<Utc>) -> f64 {
        self.0
    }
}
