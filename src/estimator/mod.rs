//! Return estimation.
//!
//! `ReturnEstimator` is the capability the engine depends on. `RatePredictor`
//! is the default implementation: a pluggable regressor plus the heuristic
//! fallback, which is used whenever no fitted model is available or inference
//! fails. Predictions never fail outward.

use rand::Rng;
use rand::distributions::Uniform;

use crate::domain::BankRecord;

pub mod predictor;

pub use predictor::*;

/// Multiplier applied to the deposit rate by the heuristic.
pub const HEURISTIC_DEPOSIT_MULTIPLIER: f64 = 1.3;
/// Half-width (percentage points) of the heuristic's random perturbation.
pub const JITTER_HALF_WIDTH: f64 = 1.0;

pub trait ReturnEstimator {
    fn is_trained(&self) -> bool;

    /// Fit on the given records. Failures are logged, never returned.
    fn train(&mut self, records: &[BankRecord]);

    /// Predicted annualized return (percent). Always finite.
    fn predict_return(&mut self, record: &BankRecord) -> f64;

    /// Predictions for every record, in input order.
    fn predict_all(&mut self, records: &[BankRecord]) -> Vec<f64> {
        records.iter().map(|r| self.predict_return(r)).collect()
    }
}

/// Source of the heuristic's random perturbation.
pub trait Perturbation: Send {
    /// A value in `[-JITTER_HALF_WIDTH, JITTER_HALF_WIDTH]`.
    fn sample(&mut self) -> f64;
}

/// Uniform jitter drawn from any `Rng` (typically a seeded `StdRng`).
pub struct UniformJitter<R> {
    rng: R,
    dist: Uniform<f64>,
}

impl<R: Rng> UniformJitter<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            dist: Uniform::new_inclusive(-JITTER_HALF_WIDTH, JITTER_HALF_WIDTH),
        }
    }
}

impl<R: Rng + Send> Perturbation for UniformJitter<R> {
    fn sample(&mut self) -> f64 {
        self.rng.sample(self.dist)
    }
}

/// Constant jitter, clamped to the documented range.
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(pub f64);

impl Perturbation for FixedJitter {
    fn sample(&mut self) -> f64 {
        self.0.clamp(-JITTER_HALF_WIDTH, JITTER_HALF_WIDTH)
    }
}

/// `deposit_rate * 1.3 + jitter`, saturated to the finite `f64` range.
pub fn heuristic_return(deposit_rate: f64, jitter: f64) -> f64 {
    (deposit_rate * HEURISTIC_DEPOSIT_MULTIPLIER + jitter).clamp(f64::MIN, f64::MAX)
}
