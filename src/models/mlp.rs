//! Feed-forward regression network (4 → 10 → 10 → 1).
//!
//! Hidden layers use ReLU, the output is linear, the loss is mean squared
//! error. Training is full-batch Adam for a fixed number of epochs starting
//! from Xavier-normal weights drawn from a seeded generator, so the same rows
//! in the same order always produce the same parameters.
//!
//! Shapes: activations are stored column-per-sample (`units x n`).

use nalgebra::{DMatrix, DVector};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::domain::{Features, RegressorKind};
use crate::error::AppError;
use crate::math::Adam;
use crate::models::{
    FitSummary, LabelScaler, ModelSnapshot, ParamBlock, Regressor, Standardizer, ensure_shapes,
};

pub const HIDDEN_UNITS: usize = 10;
pub const EPOCHS: usize = 500;
pub const LEARNING_RATE: f64 = 0.001;
pub const SEED: u64 = 12345;

/// Epoch interval for progress logging.
const LOG_EVERY: usize = 100;

#[derive(Debug, Clone)]
struct Dense {
    /// `out x in`
    weights: DMatrix<f64>,
    bias: DVector<f64>,
    relu: bool,
}

impl Dense {
    fn forward(&self, input: &DMatrix<f64>) -> DMatrix<f64> {
        let mut z = &self.weights * input;
        for j in 0..z.ncols() {
            for i in 0..z.nrows() {
                z[(i, j)] += self.bias[i];
            }
        }
        if self.relu { z.map(|v| v.max(0.0)) } else { z }
    }

    fn is_finite(&self) -> bool {
        self.weights.iter().chain(self.bias.iter()).all(|v| v.is_finite())
    }
}

#[derive(Debug, Clone)]
struct Fitted {
    layers: Vec<Dense>,
    inputs: Standardizer,
    labels: LabelScaler,
    samples: usize,
    loss: f64,
}

#[derive(Debug, Clone)]
pub struct MlpRegressor {
    epochs: usize,
    learning_rate: f64,
    seed: u64,
    fitted: Option<Fitted>,
}

impl Default for MlpRegressor {
    fn default() -> Self {
        Self::new(EPOCHS, LEARNING_RATE, SEED)
    }
}

impl MlpRegressor {
    pub fn new(epochs: usize, learning_rate: f64, seed: u64) -> Self {
        Self {
            epochs,
            learning_rate,
            seed,
            fitted: None,
        }
    }

    fn init_layers(&self) -> Result<Vec<Dense>, AppError> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let shape = [
            (Features::LEN, HIDDEN_UNITS, true),
            (HIDDEN_UNITS, HIDDEN_UNITS, true),
            (HIDDEN_UNITS, 1, false),
        ];

        let mut layers = Vec::with_capacity(shape.len());
        for (n_in, n_out, relu) in shape {
            let std = (2.0 / (n_in + n_out) as f64).sqrt();
            let normal = Normal::new(0.0, std)
                .map_err(|e| AppError::internal(format!("Weight init distribution error: {e}")))?;
            layers.push(Dense {
                weights: DMatrix::from_fn(n_out, n_in, |_, _| normal.sample(&mut rng)),
                bias: DVector::zeros(n_out),
                relu,
            });
        }
        Ok(layers)
    }
}

/// Activations for every layer; index 0 is the input.
fn forward_all(layers: &[Dense], input: DMatrix<f64>) -> Vec<DMatrix<f64>> {
    let mut acts = Vec::with_capacity(layers.len() + 1);
    acts.push(input);
    for layer in layers {
        let next = layer.forward(&acts[acts.len() - 1]);
        acts.push(next);
    }
    acts
}

fn mse(output: &DMatrix<f64>, target: &DMatrix<f64>) -> f64 {
    (output - target).norm_squared() / output.ncols().max(1) as f64
}

impl Regressor for MlpRegressor {
    fn kind(&self) -> RegressorKind {
        RegressorKind::Mlp
    }

    fn fit(&mut self, features: &DMatrix<f64>, labels: &DVector<f64>) -> Result<FitSummary, AppError> {
        let n = ensure_shapes(features, labels)?;

        let inputs = Standardizer::fit(features);
        let label_scaler = LabelScaler::fit(labels);
        let x = inputs.transform(features).transpose();
        let y = DMatrix::from_fn(1, n, |_, j| label_scaler.transform(labels[j]));

        let mut layers = self.init_layers()?;
        let mut weight_opt: Vec<Adam> = layers
            .iter()
            .map(|l| Adam::new(l.weights.len(), self.learning_rate))
            .collect();
        let mut bias_opt: Vec<Adam> = layers
            .iter()
            .map(|l| Adam::new(l.bias.len(), self.learning_rate))
            .collect();

        let mut initial_loss = f64::NAN;
        for epoch in 0..self.epochs {
            let acts = forward_all(&layers, x.clone());
            let output = &acts[layers.len()];
            let loss = mse(output, &y);
            if !loss.is_finite() {
                return Err(AppError::internal(format!("Training diverged at epoch {epoch}.")));
            }
            if epoch == 0 {
                initial_loss = loss;
            }
            if epoch % LOG_EVERY == 0 {
                tracing::debug!(epoch, loss, "training epoch");
            }

            // d(mean squared error)/d(output)
            let mut delta = (output - &y) * (2.0 / n as f64);

            for l in (0..layers.len()).rev() {
                let grad_w = &delta * acts[l].transpose();
                let grad_b = DVector::from_fn(delta.nrows(), |i, _| delta.row(i).sum());

                // Propagate through the pre-update weights.
                let upstream = if l > 0 {
                    let mut up = layers[l].weights.transpose() * &delta;
                    if layers[l - 1].relu {
                        for (d, a) in up.iter_mut().zip(acts[l].iter()) {
                            if *a <= 0.0 {
                                *d = 0.0;
                            }
                        }
                    }
                    Some(up)
                } else {
                    None
                };

                weight_opt[l].step(layers[l].weights.as_mut_slice(), grad_w.as_slice());
                bias_opt[l].step(layers[l].bias.as_mut_slice(), grad_b.as_slice());

                if let Some(up) = upstream {
                    delta = up;
                }
            }
        }

        if !layers.iter().all(Dense::is_finite) {
            return Err(AppError::internal("Training produced non-finite weights."));
        }

        let acts = forward_all(&layers, x);
        let final_loss = mse(&acts[layers.len()], &y);
        if !final_loss.is_finite() {
            return Err(AppError::internal("Training produced a non-finite loss."));
        }
        if !initial_loss.is_finite() {
            initial_loss = final_loss;
        }

        self.fitted = Some(Fitted {
            layers,
            inputs,
            labels: label_scaler,
            samples: n,
            loss: final_loss,
        });

        Ok(FitSummary {
            samples: n,
            initial_loss,
            final_loss,
        })
    }

    fn predict(&self, features: &Features) -> Result<f64, AppError> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or_else(|| AppError::internal("MLP regressor is not fitted."))?;

        let x = fitted.inputs.transform_row(&features.to_array());
        let input = DMatrix::from_column_slice(x.len(), 1, x.as_slice());
        let acts = forward_all(&fitted.layers, input);
        let z = acts[fitted.layers.len()][(0, 0)];
        let y = fitted.labels.inverse(z);

        if y.is_finite() {
            Ok(y)
        } else {
            Err(AppError::internal("MLP produced a non-finite prediction."))
        }
    }

    fn snapshot(&self) -> Option<ModelSnapshot> {
        let fitted = self.fitted.as_ref()?;

        let mut blocks = vec![
            ParamBlock::from_vector("input_mean", &fitted.inputs.mean),
            ParamBlock::from_vector("input_scale", &fitted.inputs.scale),
            ParamBlock::from_vector(
                "label",
                &DVector::from_row_slice(&[fitted.labels.mean, fitted.labels.scale]),
            ),
        ];
        for (i, layer) in fitted.layers.iter().enumerate() {
            blocks.push(ParamBlock::from_matrix(format!("dense{i}.weights"), &layer.weights));
            blocks.push(ParamBlock::from_vector(format!("dense{i}.bias"), &layer.bias));
        }

        Some(ModelSnapshot {
            kind: RegressorKind::Mlp,
            samples: fitted.samples,
            training_loss: fitted.loss,
            blocks,
        })
    }
}
