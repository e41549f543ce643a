//! Recommendation engine.
//!
//! Turns a record collection plus the investor's amount and term into a ranked
//! top-N list:
//!
//! 1. train the estimator once per engine (only if it is still untrained)
//! 2. predict a return for every record and apply the requested term
//! 3. stable-sort by predicted return, descending
//! 4. keep the first `TOP_N`

use crate::domain::BankRecord;
use crate::error::AppError;
use crate::estimator::ReturnEstimator;

/// Maximum number of recommendations returned.
pub const TOP_N: usize = 5;

/// Number of banks shown by the deposit-rate fallback.
pub const FALLBACK_TOP_N: usize = 3;

pub struct RecommendationEngine<E> {
    estimator: E,
    training_attempted: bool,
}

impl<E: ReturnEstimator> RecommendationEngine<E> {
    pub fn new(estimator: E) -> Self {
        Self {
            estimator,
            training_attempted: false,
        }
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    /// Rank `records` for an investment of `amount` over `term_days`.
    ///
    /// Fails only on a non-positive (or non-finite) amount or a zero term.
    /// Input records are not modified; the result holds new records carrying
    /// the prediction and `term_days`.
    pub fn recommend(
        &mut self,
        records: &[BankRecord],
        amount: f64,
        term_days: u32,
    ) -> Result<Vec<BankRecord>, AppError> {
        validate_request(amount, term_days)?;

        tracing::info!(records = records.len(), amount, term_days, "ranking banks");

        if !self.training_attempted {
            self.training_attempted = true;
            if !self.estimator.is_trained() {
                self.estimator.train(records);
            }
        }

        let predictions = self.estimator.predict_all(records);
        let mut ranked: Vec<BankRecord> = records
            .iter()
            .zip(predictions)
            .map(|(record, predicted)| record.with_prediction(predicted, term_days))
            .collect();

        // `sort_by` is stable: equal returns keep input order.
        ranked.sort_by(|a, b| b.expected_return().total_cmp(&a.expected_return()));
        ranked.truncate(TOP_N);

        if let Some(best) = ranked.first() {
            tracing::info!(
                bank = best.bank_name(),
                predicted_return = best.expected_return(),
                "best option"
            );
        }

        Ok(ranked)
    }
}

fn validate_request(amount: f64, term_days: u32) -> Result<(), AppError> {
    if !(amount.is_finite() && amount > 0.0) {
        return Err(AppError::invalid_argument(format!(
            "Investment amount must be a positive number, got {amount}."
        )));
    }
    if term_days == 0 {
        return Err(AppError::invalid_argument("Investment term must be at least one day."));
    }
    Ok(())
}

/// Rank by raw deposit rate, descending (stable), keeping `limit` records.
///
/// Used when the engine cannot produce a recommendation; records keep their
/// observed return, which the report then shows.
pub fn rank_by_deposit_rate(records: &[BankRecord], limit: usize) -> Vec<BankRecord> {
    let mut ranked = records.to_vec();
    ranked.sort_by(|a, b| b.deposit_rate().total_cmp(&a.deposit_rate()));
    ranked.truncate(limit);
    ranked
}
