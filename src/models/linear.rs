//! Linear regressor: `y = β0 + β · features`, solved by least squares.

use nalgebra::{DMatrix, DVector};

use crate::domain::{Features, RegressorKind};
use crate::error::AppError;
use crate::math::solve_least_squares;
use crate::models::{FitSummary, ModelSnapshot, ParamBlock, Regressor, ensure_shapes};

#[derive(Debug, Clone, Default)]
pub struct LinearRegressor {
    /// Intercept first, then one coefficient per feature.
    betas: Option<DVector<f64>>,
    samples: usize,
    loss: f64,
}

impl LinearRegressor {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Fill a design row: intercept, then the features in `Features::to_array` order.
fn design_row(features: &[f64], out: &mut [f64]) {
    out[0] = 1.0;
    out[1..].copy_from_slice(features);
}

fn predict_with(betas: &DVector<f64>, features: &[f64]) -> f64 {
    let mut row = [0.0; Features::LEN + 1];
    design_row(features, &mut row);
    row.iter().zip(betas.iter()).map(|(x, b)| x * b).sum()
}

impl Regressor for LinearRegressor {
    fn kind(&self) -> RegressorKind {
        RegressorKind::Linear
    }

    fn fit(&mut self, features: &DMatrix<f64>, labels: &DVector<f64>) -> Result<FitSummary, AppError> {
        let n = ensure_shapes(features, labels)?;
        let k = Features::LEN + 1;

        let mut x = DMatrix::zeros(n, k);
        let mut row = vec![0.0; k];
        for i in 0..n {
            let feats: Vec<f64> = features.row(i).iter().copied().collect();
            design_row(&feats, &mut row);
            for (j, v) in row.iter().enumerate() {
                x[(i, j)] = *v;
            }
        }

        let betas = solve_least_squares(&x, labels)
            .ok_or_else(|| AppError::internal("Least squares system could not be solved."))?;

        let residuals = &x * &betas - labels;
        let final_loss = residuals.norm_squared() / n as f64;
        let initial_loss = labels.norm_squared() / n as f64;
        if !final_loss.is_finite() {
            return Err(AppError::internal("Linear fit produced a non-finite loss."));
        }

        self.betas = Some(betas);
        self.samples = n;
        self.loss = final_loss;

        Ok(FitSummary {
            samples: n,
            initial_loss,
            final_loss,
        })
    }

    fn predict(&self, features: &Features) -> Result<f64, AppError> {
        let betas = self
            .betas
            .as_ref()
            .ok_or_else(|| AppError::internal("Linear regressor is not fitted."))?;
        let y = predict_with(betas, &features.to_array());
        if y.is_finite() {
            Ok(y)
        } else {
            Err(AppError::internal("Linear model produced a non-finite prediction."))
        }
    }

    fn snapshot(&self) -> Option<ModelSnapshot> {
        let betas = self.betas.as_ref()?;
        Some(ModelSnapshot {
            kind: RegressorKind::Linear,
            samples: self.samples,
            training_loss: self.loss,
            blocks: vec![ParamBlock::from_vector("betas", betas)],
        })
    }
}
