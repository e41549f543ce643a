//! Regression models backing the return estimator.
//!
//! A `Regressor` maps the four record features to a return. Models are
//! swappable behind the trait so the estimator's fallback logic does not
//! depend on any particular algorithm:
//!
//! - `MlpRegressor`: small feed-forward network trained with Adam
//! - `LinearRegressor`: least squares with an intercept

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::domain::{Features, RegressorKind};
use crate::error::AppError;

pub mod linear;
pub mod mlp;
pub mod scaling;

pub use linear::*;
pub use mlp::*;
pub use scaling::*;

/// A trainable mapping from `Features` to an annualized return.
pub trait Regressor: Send + Sync {
    fn kind(&self) -> RegressorKind;

    /// Fit on an `n x 4` feature matrix (one row per record) and `n` labels.
    fn fit(&mut self, features: &DMatrix<f64>, labels: &DVector<f64>) -> Result<FitSummary, AppError>;

    /// Predict one return. Fails if the model is unfitted or the output is not finite.
    fn predict(&self, features: &Features) -> Result<f64, AppError>;

    /// Fitted parameters, or `None` before a successful fit.
    fn snapshot(&self) -> Option<ModelSnapshot>;
}

/// Training diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitSummary {
    pub samples: usize,
    /// Mean squared error before the first update (or of a zero model).
    pub initial_loss: f64,
    /// Mean squared error of the fitted model.
    pub final_loss: f64,
}

/// Portable representation of fitted parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub kind: RegressorKind,
    pub samples: usize,
    pub training_loss: f64,
    pub blocks: Vec<ParamBlock>,
}

impl ModelSnapshot {
    pub fn parameter_count(&self) -> usize {
        self.blocks.iter().map(|b| b.values.len()).sum()
    }
}

/// One named parameter matrix, stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamBlock {
    pub name: String,
    pub rows: usize,
    pub cols: usize,
    pub values: Vec<f64>,
}

impl ParamBlock {
    pub fn from_matrix(name: impl Into<String>, m: &DMatrix<f64>) -> Self {
        let values = (0..m.nrows())
            .flat_map(|i| (0..m.ncols()).map(move |j| m[(i, j)]))
            .collect();
        Self {
            name: name.into(),
            rows: m.nrows(),
            cols: m.ncols(),
            values,
        }
    }

    pub fn from_vector(name: impl Into<String>, v: &DVector<f64>) -> Self {
        Self {
            name: name.into(),
            rows: v.len(),
            cols: 1,
            values: v.iter().copied().collect(),
        }
    }
}

fn ensure_shapes(features: &DMatrix<f64>, labels: &DVector<f64>) -> Result<usize, AppError> {
    let n = features.nrows();
    if n == 0 {
        return Err(AppError::data("No training rows."));
    }
    if features.ncols() != Features::LEN {
        return Err(AppError::internal(format!(
            "Expected {} feature columns, got {}.",
            Features::LEN,
            features.ncols()
        )));
    }
    if labels.len() != n {
        return Err(AppError::internal(format!(
            "Feature rows ({n}) and labels ({}) differ.",
            labels.len()
        )));
    }
    if features.iter().chain(labels.iter()).any(|v| !v.is_finite()) {
        return Err(AppError::data("Training data contains non-finite values."));
    }
    Ok(n)
}
