//! The recommend workflow, free of terminal output:
//! current records -> merge with history -> save history -> rank.
//!
//! Collaborators are passed in so tests can run it offline against a temp dir.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::data::RecordSource;
use crate::domain::{AdvisorConfig, BankRecord};
use crate::engine::{FALLBACK_TOP_N, RecommendationEngine, rank_by_deposit_rate};
use crate::estimator::{RatePredictor, UniformJitter};
use crate::io::{HistoryStore, JsonModelStore};

/// Everything a single `advisor recommend` run computed.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Current records followed by historical ones.
    pub records: Vec<BankRecord>,
    pub ranked: Vec<BankRecord>,
    /// True when the engine failed and `ranked` is the deposit-rate fallback.
    pub used_fallback: bool,
}

pub fn run_recommend(
    config: &AdvisorConfig,
    source: &mut dyn RecordSource,
    history: &dyn HistoryStore,
) -> RunOutput {
    let current = source.fetch_records();
    let historical = history.load();
    tracing::info!(
        current = current.len(),
        historical = historical.len(),
        "records collected"
    );

    let mut records = current;
    records.extend(historical);
    history.save(&records);

    let jitter = UniformJitter::new(StdRng::seed_from_u64(config.seed));
    let estimator = RatePredictor::for_kind(config.regressor, Box::new(jitter))
        .with_model_store(Box::new(JsonModelStore::new(&config.model_path)));
    let mut engine = RecommendationEngine::new(estimator);

    match engine.recommend(&records, config.amount, config.term_days) {
        Ok(ranked) => RunOutput {
            records,
            ranked,
            used_fallback: false,
        },
        Err(err) => {
            tracing::error!(%err, "recommendation failed; ranking by deposit rate");
            let ranked = rank_by_deposit_rate(&records, FALLBACK_TOP_N);
            RunOutput {
                records,
                ranked,
                used_fallback: true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use chrono::NaiveDate;

    use super::*;
    use crate::data::{BANK_SITES, SyntheticSource};
    use crate::domain::RegressorKind;
    use crate::engine::TOP_N;
    use crate::io::{CsvHistoryStore, ModelStore};

    fn config(dir: &Path, regressor: RegressorKind, amount: f64) -> AdvisorConfig {
        AdvisorConfig {
            amount,
            term_days: 180,
            regressor,
            seed: 42,
            offline: true,
            history_path: dir.join("bank_data.csv"),
            model_path: dir.join("models").join("rate_predictor.json"),
            save_report: None,
            detailed: true,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
    }

    #[test]
    fn offline_run_ranks_and_grows_history() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), RegressorKind::Linear, 100_000.0);
        let history = CsvHistoryStore::new(&config.history_path);

        let mut source = SyntheticSource::new(today(), config.seed);
        let first = run_recommend(&config, &mut source, &history);
        assert!(!first.used_fallback);
        assert_eq!(first.records.len(), BANK_SITES.len());
        assert_eq!(first.ranked.len(), TOP_N);
        assert!(first.ranked.iter().all(|r| r.term_days() == 180));
        assert_eq!(history.load().len(), BANK_SITES.len());

        let mut source = SyntheticSource::new(today(), config.seed + 1);
        let second = run_recommend(&config, &mut source, &history);
        assert_eq!(second.records.len(), 2 * BANK_SITES.len());
        assert_eq!(history.load().len(), 2 * BANK_SITES.len());
    }

    #[test]
    fn fitted_model_is_saved() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), RegressorKind::Linear, 50_000.0);
        let history = CsvHistoryStore::new(&config.history_path);
        let mut source = SyntheticSource::new(today(), 7);

        run_recommend(&config, &mut source, &history);

        let snapshot = JsonModelStore::new(&config.model_path).load().unwrap().unwrap();
        assert_eq!(snapshot.kind, RegressorKind::Linear);
        assert_eq!(snapshot.samples, BANK_SITES.len());
    }

    #[test]
    fn invalid_amount_falls_back_to_deposit_ranking() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), RegressorKind::Heuristic, -1.0);
        let history = CsvHistoryStore::new(&config.history_path);
        let mut source = SyntheticSource::new(today(), 3);

        let out = run_recommend(&config, &mut source, &history);

        assert!(out.used_fallback);
        assert_eq!(out.ranked.len(), FALLBACK_TOP_N);
        for pair in out.ranked.windows(2) {
            assert!(pair[0].deposit_rate() >= pair[1].deposit_rate());
        }
        assert!(out.ranked.iter().all(|r| r.predicted_return().is_none()));
    }
}
