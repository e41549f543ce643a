//! Z-score standardization for features and labels.
//!
//! Rates sit around 5-15 while the term feature is around 1. Standardizing each
//! column keeps the network's fixed learning rate meaningful for all inputs.
//! Constant columns (e.g. every record has the same term) get a unit scale.

use nalgebra::{DMatrix, DVector};

const MIN_SCALE: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct Standardizer {
    pub mean: DVector<f64>,
    pub scale: DVector<f64>,
}

impl Standardizer {
    /// Column-wise mean and population standard deviation of `x` (rows are samples).
    pub fn fit(x: &DMatrix<f64>) -> Self {
        let n = x.nrows().max(1) as f64;
        let mean = DVector::from_fn(x.ncols(), |j, _| x.column(j).sum() / n);
        let scale = DVector::from_fn(x.ncols(), |j, _| {
            let var = x.column(j).iter().map(|v| (v - mean[j]).powi(2)).sum::<f64>() / n;
            let sd = var.sqrt();
            if sd > MIN_SCALE { sd } else { 1.0 }
        });
        Self { mean, scale }
    }

    /// Standardize every row of `x`.
    pub fn transform(&self, x: &DMatrix<f64>) -> DMatrix<f64> {
        DMatrix::from_fn(x.nrows(), x.ncols(), |i, j| {
            (x[(i, j)] - self.mean[j]) / self.scale[j]
        })
    }

    /// Standardize one sample.
    pub fn transform_row(&self, row: &[f64]) -> DVector<f64> {
        DVector::from_fn(row.len(), |j, _| (row[j] - self.mean[j]) / self.scale[j])
    }
}

/// Scalar standardization for the label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelScaler {
    pub mean: f64,
    pub scale: f64,
}

impl LabelScaler {
    pub fn fit(y: &DVector<f64>) -> Self {
        let n = y.len().max(1) as f64;
        let mean = y.sum() / n;
        let sd = (y.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
        Self {
            mean,
            scale: if sd > MIN_SCALE { sd } else { 1.0 },
        }
    }

    pub fn transform(&self, y: f64) -> f64 {
        (y - self.mean) / self.scale
    }

    pub fn inverse(&self, z: f64) -> f64 {
        z * self.scale + self.mean
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_columns_get_unit_scale() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 5.0, 2.0, 5.0, 3.0, 5.0]);
        let s = Standardizer::fit(&x);
        assert!((s.mean[0] - 2.0).abs() < 1e-12);
        assert_eq!(s.scale[1], 1.0);

        let z = s.transform(&x);
        assert!((z.column(0).sum()).abs() < 1e-12);
        assert!(z.column(1).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn label_scaler_inverts() {
        let y = DVector::from_row_slice(&[7.8, 10.4, 9.0]);
        let s = LabelScaler::fit(&y);
        let z = s.transform(10.4);
        assert!((s.inverse(z) - 10.4).abs() < 1e-12);
    }
}
