//! Shared domain types.
//!
//! `BankRecord` is the only unit of exchange between sources, stores, the
//! engine and the report formatter. It is an immutable value: the engine never
//! edits a record it was given, it derives a new one with `with_prediction`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Days per year used to turn a term into the `term_years` feature.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// One bank's published rates on a given date.
///
/// Rates are annualized percentages (`6.5` means 6.5%).
#[derive(Debug, Clone, PartialEq)]
pub struct BankRecord {
    bank_name: String,
    deposit_rate: f64,
    loan_rate: f64,
    /// Raw or previously stored return; the training label.
    observed_return: f64,
    /// Set only on records produced by the recommendation engine.
    predicted_return: Option<f64>,
    observed_date: NaiveDate,
    term_days: u32,
}

impl BankRecord {
    /// Build a validated record.
    ///
    /// Rejects an empty name, non-finite values, negative rates and a zero term.
    pub fn new(
        bank_name: impl Into<String>,
        deposit_rate: f64,
        loan_rate: f64,
        observed_return: f64,
        observed_date: NaiveDate,
        term_days: u32,
    ) -> Result<Self, AppError> {
        let bank_name = bank_name.into();
        if bank_name.trim().is_empty() {
            return Err(AppError::invalid_argument("Bank name must not be empty."));
        }
        for (label, rate) in [("deposit rate", deposit_rate), ("loan rate", loan_rate)] {
            if !(rate.is_finite() && rate >= 0.0) {
                return Err(AppError::invalid_argument(format!(
                    "Invalid {label} for '{bank_name}': {rate} (must be finite and >= 0)."
                )));
            }
        }
        if !observed_return.is_finite() {
            return Err(AppError::invalid_argument(format!(
                "Invalid investment return for '{bank_name}': {observed_return}."
            )));
        }
        if term_days == 0 {
            return Err(AppError::invalid_argument(format!(
                "Term for '{bank_name}' must be at least one day."
            )));
        }

        Ok(Self {
            bank_name,
            deposit_rate,
            loan_rate,
            observed_return,
            predicted_return: None,
            observed_date,
            term_days,
        })
    }

    pub fn bank_name(&self) -> &str {
        &self.bank_name
    }

    pub fn deposit_rate(&self) -> f64 {
        self.deposit_rate
    }

    pub fn loan_rate(&self) -> f64 {
        self.loan_rate
    }

    pub fn observed_return(&self) -> f64 {
        self.observed_return
    }

    pub fn predicted_return(&self) -> Option<f64> {
        self.predicted_return
    }

    pub fn observed_date(&self) -> NaiveDate {
        self.observed_date
    }

    pub fn term_days(&self) -> u32 {
        self.term_days
    }

    /// The return used for ranking and reporting.
    ///
    /// Falls back to the observed value for records that never went through the
    /// engine (e.g. a list ranked by deposit rate).
    pub fn expected_return(&self) -> f64 {
        self.predicted_return.unwrap_or(self.observed_return)
    }

    /// Model inputs derived from this record.
    pub fn features(&self) -> Features {
        Features {
            deposit_rate: self.deposit_rate,
            loan_rate: self.loan_rate,
            prior_return: self.observed_return,
            term_years: f64::from(self.term_days) / DAYS_PER_YEAR,
        }
    }

    /// Copy of this record carrying a prediction and the investor's term.
    ///
    /// `term_days` must be non-zero; the engine validates it before calling.
    pub fn with_prediction(&self, predicted_return: f64, term_days: u32) -> Self {
        debug_assert!(term_days > 0);
        Self {
            predicted_return: Some(predicted_return),
            term_days,
            ..self.clone()
        }
    }
}

/// The four model inputs for one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Features {
    pub deposit_rate: f64,
    pub loan_rate: f64,
    pub prior_return: f64,
    pub term_years: f64,
}

impl Features {
    pub const LEN: usize = 4;

    pub fn to_array(self) -> [f64; Self::LEN] {
        [
            self.deposit_rate,
            self.loan_rate,
            self.prior_return,
            self.term_years,
        ]
    }
}

/// Which regressor backs the return estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RegressorKind {
    /// Small feed-forward network (4-10-10-1, ReLU).
    Mlp,
    /// Ordinary least squares on the four features plus intercept.
    Linear,
    /// No model; every prediction uses the heuristic.
    Heuristic,
}

impl RegressorKind {
    pub fn display_name(self) -> &'static str {
        match self {
            RegressorKind::Mlp => "MLP 4-10-10-1",
            RegressorKind::Linear => "Linear OLS",
            RegressorKind::Heuristic => "Heuristic only",
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    pub amount: f64,
    pub term_days: u32,
    pub regressor: RegressorKind,
    /// Seed for the heuristic jitter and the synthetic source.
    pub seed: u64,
    /// Skip the network and use synthetic records only.
    pub offline: bool,
    pub history_path: PathBuf,
    pub model_path: PathBuf,
    /// Write the plain-text recommendations here when set.
    pub save_report: Option<PathBuf>,
    /// Print the detailed report for the best bank.
    pub detailed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[test]
    fn new_rejects_negative_rates_and_zero_term() {
        assert!(BankRecord::new("A", -0.1, 10.0, 0.0, date(), 365).is_err());
        assert!(BankRecord::new("A", 5.0, -1.0, 0.0, date(), 365).is_err());
        assert!(BankRecord::new("A", 5.0, 10.0, f64::NAN, date(), 365).is_err());
        assert!(BankRecord::new("A", 5.0, 10.0, 0.0, date(), 0).is_err());
        assert!(BankRecord::new("  ", 5.0, 10.0, 0.0, date(), 30).is_err());
        assert!(BankRecord::new("A", 0.0, 0.0, 0.0, date(), 1).is_ok());
    }

    #[test]
    fn with_prediction_leaves_the_original_untouched() {
        let original = BankRecord::new("A", 6.0, 12.0, 7.0, date(), 365).unwrap();
        let scored = original.with_prediction(9.5, 90);

        assert_eq!(original.predicted_return(), None);
        assert_eq!(original.term_days(), 365);
        assert_eq!(original.expected_return(), 7.0);

        assert_eq!(scored.predicted_return(), Some(9.5));
        assert_eq!(scored.expected_return(), 9.5);
        assert_eq!(scored.term_days(), 90);
        assert_eq!(scored.observed_return(), 7.0);
        assert_eq!(scored.bank_name(), "A");
    }

    #[test]
    fn features_use_term_in_years() {
        let record = BankRecord::new("A", 6.0, 12.0, 7.0, date(), 730).unwrap();
        assert_eq!(record.features().to_array(), [6.0, 12.0, 7.0, 2.0]);
    }
}
