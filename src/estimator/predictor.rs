//! Default return estimator.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::domain::{BankRecord, Features, RegressorKind};
use crate::estimator::{Perturbation, ReturnEstimator, heuristic_return};
use crate::io::ModelStore;
use crate::models::{LinearRegressor, MlpRegressor, Regressor};

/// Regressor-backed estimator with heuristic fallback.
///
/// State: untrained until the first successful `train`; it never goes back.
pub struct RatePredictor {
    regressor: Option<Box<dyn Regressor>>,
    jitter: Box<dyn Perturbation>,
    model_store: Option<Box<dyn ModelStore>>,
    trained: bool,
}

impl RatePredictor {
    /// `regressor = None` runs in heuristic-only mode.
    pub fn new(regressor: Option<Box<dyn Regressor>>, jitter: Box<dyn Perturbation>) -> Self {
        Self {
            regressor,
            jitter,
            model_store: None,
            trained: false,
        }
    }

    /// Estimator for a CLI-selected regressor kind.
    pub fn for_kind(kind: RegressorKind, jitter: Box<dyn Perturbation>) -> Self {
        let regressor: Option<Box<dyn Regressor>> = match kind {
            RegressorKind::Mlp => Some(Box::new(MlpRegressor::default())),
            RegressorKind::Linear => Some(Box::new(LinearRegressor::new())),
            RegressorKind::Heuristic => None,
        };
        Self::new(regressor, jitter)
    }

    /// Persist fitted parameters here after a successful fit.
    pub fn with_model_store(mut self, store: Box<dyn ModelStore>) -> Self {
        self.model_store = Some(store);
        self
    }

    fn heuristic(&mut self, record: &BankRecord) -> f64 {
        heuristic_return(record.deposit_rate(), self.jitter.sample())
    }

    /// Model output, or `None` when untrained or inference failed.
    fn infer(&self, record: &BankRecord) -> Option<f64> {
        if !self.trained {
            return None;
        }
        infer_with(self.regressor.as_deref()?, record)
    }

    fn persist(&self, regressor: &dyn Regressor) {
        let (Some(store), Some(snapshot)) = (self.model_store.as_ref(), regressor.snapshot()) else {
            return;
        };
        match store.save(&snapshot) {
            Ok(()) => tracing::info!(location = %store.location(), "model saved"),
            Err(err) => tracing::warn!(%err, "failed to save model"),
        }
    }
}

fn infer_with(regressor: &dyn Regressor, record: &BankRecord) -> Option<f64> {
    match regressor.predict(&record.features()) {
        Ok(y) => Some(y),
        Err(err) => {
            tracing::warn!(bank = record.bank_name(), %err, "prediction failed; using heuristic");
            None
        }
    }
}

/// Feature matrix (one row per record) and label vector, in input order.
pub fn training_set(records: &[BankRecord]) -> (DMatrix<f64>, DVector<f64>) {
    let rows: Vec<[f64; Features::LEN]> = records.iter().map(|r| r.features().to_array()).collect();
    let x = DMatrix::from_fn(rows.len(), Features::LEN, |i, j| rows[i][j]);
    let y = DVector::from_fn(records.len(), |i, _| records[i].observed_return());
    (x, y)
}

impl ReturnEstimator for RatePredictor {
    fn is_trained(&self) -> bool {
        self.trained
    }

    fn train(&mut self, records: &[BankRecord]) {
        if self.trained {
            tracing::debug!("estimator already trained; skipping");
            return;
        }
        if records.is_empty() {
            tracing::info!("no training data; predictions will use the heuristic");
            return;
        }
        let Some(mut regressor) = self.regressor.take() else {
            tracing::info!("heuristic-only mode; no model to train");
            return;
        };

        let (x, y) = training_set(records);
        tracing::info!(kind = regressor.kind().display_name(), samples = records.len(), "training model");

        match regressor.fit(&x, &y) {
            Ok(summary) => {
                tracing::info!(
                    samples = summary.samples,
                    initial_loss = summary.initial_loss,
                    final_loss = summary.final_loss,
                    "model trained"
                );
                self.trained = true;
                self.persist(regressor.as_ref());
            }
            Err(err) => {
                tracing::warn!(%err, "model training failed; predictions will use the heuristic");
            }
        }

        self.regressor = Some(regressor);
    }

    fn predict_return(&mut self, record: &BankRecord) -> f64 {
        match self.infer(record) {
            Some(y) => y,
            None => self.heuristic(record),
        }
    }

    /// Model inference runs in parallel; heuristic fallbacks are then drawn
    /// sequentially in input order so jitter stays reproducible.
    fn predict_all(&mut self, records: &[BankRecord]) -> Vec<f64> {
        let inferred: Vec<Option<f64>> = match self.regressor.as_deref() {
            Some(regressor) if self.trained => records
                .par_iter()
                .map(|r| infer_with(regressor, r))
                .collect(),
            _ => vec![None; records.len()],
        };

        records
            .iter()
            .zip(inferred)
            .map(|(record, y)| match y {
                Some(y) => y,
                None => self.heuristic(record),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::NaiveDate;

    use super::*;
    use crate::error::AppError;
    use crate::estimator::FixedJitter;
    use crate::models::{FitSummary, ModelSnapshot};

    fn record(name: &str, deposit: f64, observed: f64) -> BankRecord {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        BankRecord::new(name, deposit, deposit + 6.0, observed, date, 365).unwrap()
    }

    fn sample_records() -> Vec<BankRecord> {
        vec![
            record("A", 6.0, 7.8),
            record("B", 8.0, 10.4),
            record("C", 5.5, 7.9),
            record("D", 7.2, 10.9),
        ]
    }

    /// Regressor whose fit and predict outcomes are scripted.
    struct Scripted {
        fit_ok: bool,
        output: f64,
    }

    impl Regressor for Scripted {
        fn kind(&self) -> RegressorKind {
            RegressorKind::Linear
        }

        fn fit(&mut self, _: &DMatrix<f64>, _: &DVector<f64>) -> Result<FitSummary, AppError> {
            if self.fit_ok {
                Ok(FitSummary { samples: 1, initial_loss: 1.0, final_loss: 0.5 })
            } else {
                Err(AppError::internal("scripted failure"))
            }
        }

        fn predict(&self, _: &Features) -> Result<f64, AppError> {
            if self.output.is_finite() {
                Ok(self.output)
            } else {
                Err(AppError::internal("scripted inference failure"))
            }
        }

        fn snapshot(&self) -> Option<ModelSnapshot> {
            Some(ModelSnapshot {
                kind: RegressorKind::Linear,
                samples: 1,
                training_loss: 0.5,
                blocks: Vec::new(),
            })
        }
    }

    #[derive(Clone, Default)]
    struct MemoryStore {
        saved: Arc<Mutex<Vec<ModelSnapshot>>>,
        fail: bool,
    }

    impl ModelStore for MemoryStore {
        fn location(&self) -> String {
            "memory".to_string()
        }

        fn load(&self) -> Result<Option<ModelSnapshot>, AppError> {
            Ok(self.saved.lock().unwrap().last().cloned())
        }

        fn save(&self, snapshot: &ModelSnapshot) -> Result<(), AppError> {
            if self.fail {
                return Err(AppError::io("disk full"));
            }
            self.saved.lock().unwrap().push(snapshot.clone());
            Ok(())
        }
    }

    #[test]
    fn untrained_prediction_with_zero_jitter_is_exact_heuristic() {
        let mut p = RatePredictor::new(None, Box::new(FixedJitter(0.0)));
        let r = record("A", 6.0, 0.0);
        assert!(!p.is_trained());
        assert_eq!(p.predict_return(&r), 6.0 * 1.3);
    }

    #[test]
    fn zero_deposit_rate_yields_jitter_only() {
        let mut p = RatePredictor::new(None, Box::new(FixedJitter(0.5)));
        assert_eq!(p.predict_return(&record("Z", 0.0, 0.0)), 0.5);
    }

    #[test]
    fn empty_training_set_leaves_estimator_untrained() {
        let mut p = RatePredictor::for_kind(RegressorKind::Mlp, Box::new(FixedJitter(0.0)));
        p.train(&[]);
        assert!(!p.is_trained());
    }

    #[test]
    fn heuristic_mode_never_trains() {
        let mut p = RatePredictor::for_kind(RegressorKind::Heuristic, Box::new(FixedJitter(0.0)));
        p.train(&sample_records());
        assert!(!p.is_trained());
    }

    #[test]
    fn failed_fit_keeps_heuristic_path() {
        let scripted = Scripted { fit_ok: false, output: 42.0 };
        let mut p = RatePredictor::new(Some(Box::new(scripted)), Box::new(FixedJitter(0.0)));
        p.train(&sample_records());
        assert!(!p.is_trained());
        assert_eq!(p.predict_return(&record("A", 6.0, 0.0)), 6.0 * 1.3);
    }

    #[test]
    fn failed_inference_falls_back_to_heuristic() {
        let scripted = Scripted { fit_ok: true, output: f64::NAN };
        let mut p = RatePredictor::new(Some(Box::new(scripted)), Box::new(FixedJitter(0.0)));
        p.train(&sample_records());
        assert!(p.is_trained());
        assert_eq!(p.predict_return(&record("B", 8.0, 0.0)), 8.0 * 1.3);
        assert_eq!(p.predict_all(&[record("B", 8.0, 0.0)]), vec![8.0 * 1.3]);
    }

    #[test]
    fn trained_model_output_is_used() {
        let scripted = Scripted { fit_ok: true, output: 11.25 };
        let mut p = RatePredictor::new(Some(Box::new(scripted)), Box::new(FixedJitter(0.0)));
        p.train(&sample_records());
        assert_eq!(p.predict_return(&record("A", 6.0, 0.0)), 11.25);
    }

    #[test]
    fn real_models_predict_finite_values_once_trained() {
        for kind in [RegressorKind::Mlp, RegressorKind::Linear] {
            let mut p = RatePredictor::for_kind(kind, Box::new(FixedJitter(0.0)));
            p.train(&sample_records());
            assert!(p.is_trained(), "{kind:?} should train");
            for r in sample_records() {
                assert!(p.predict_return(&r).is_finite());
            }
        }
    }

    #[test]
    fn predict_all_matches_sequential_predictions() {
        let mut a = RatePredictor::for_kind(RegressorKind::Linear, Box::new(FixedJitter(0.0)));
        a.train(&sample_records());
        let batch = a.predict_all(&sample_records());
        let single: Vec<f64> = sample_records().iter().map(|r| a.predict_return(r)).collect();
        assert_eq!(batch, single);
    }

    #[test]
    fn successful_fit_is_persisted_and_save_failure_is_ignored() {
        let store = MemoryStore::default();
        let mut p = RatePredictor::new(
            Some(Box::new(Scripted { fit_ok: true, output: 1.0 })),
            Box::new(FixedJitter(0.0)),
        )
        .with_model_store(Box::new(store.clone()));
        p.train(&sample_records());
        assert_eq!(store.saved.lock().unwrap().len(), 1);

        let failing = MemoryStore { fail: true, ..MemoryStore::default() };
        let mut p = RatePredictor::new(
            Some(Box::new(Scripted { fit_ok: true, output: 1.0 })),
            Box::new(FixedJitter(0.0)),
        )
        .with_model_store(Box::new(failing));
        p.train(&sample_records());
        assert!(p.is_trained());
    }

    #[test]
    fn training_set_preserves_input_order() {
        let (x, y) = training_set(&sample_records());
        assert_eq!(x.nrows(), 4);
        assert_eq!(x[(1, 0)], 8.0);
        assert_eq!(x[(1, 2)], 10.4);
        assert_eq!(x[(1, 3)], 1.0);
        assert_eq!(y[3], 10.9);
    }

    #[test]
    fn extreme_deposit_rate_still_gives_a_finite_heuristic() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let huge = BankRecord::new("Huge", 1.5e308, 1.0, 0.0, date, 365).unwrap();
        let mut p = RatePredictor::for_kind(RegressorKind::Heuristic, Box::new(FixedJitter(0.0)));

        let single = p.predict_return(&huge);
        assert!(single.is_finite());
        assert_eq!(single, f64::MAX);

        let all = p.predict_all(&[huge.clone(), record("A", 6.0, 7.8)]);
        assert!(all.iter().all(|y| y.is_finite()));
        assert_eq!(all[0], f64::MAX);
        assert_eq!(all[1], 6.0 * 1.3);
    }
}
