//! Top-level application orchestration.
//!
//! `src/main.rs` only maps errors to exit codes; this module parses the CLI,
//! wires sources and stores to the pipeline, and prints the reports.

use chrono::Local;
use clap::Parser;

use crate::cli::{Cli, Command, ModelArgs, RecommendArgs};
use crate::data::{RecordSource, SyntheticSource, WebSource};
use crate::domain::AdvisorConfig;
use crate::error::AppError;
use crate::io::{CsvHistoryStore, JsonModelStore, ModelStore};

pub mod pipeline;

use pipeline::RunOutput;

/// Entry point for the `advisor` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is the normal case.
    let _ = dotenvy::dotenv();
    crate::logging::init("info");

    let cli = Cli::parse();
    match cli.command {
        Command::Recommend(args) => handle_recommend(&args),
        Command::Model(args) => handle_model(&args),
    }
}

fn handle_recommend(args: &RecommendArgs) -> Result<(), AppError> {
    let config = advisor_config_from_args(args);
    let today = Local::now().date_naive();

    let mut source: Box<dyn RecordSource> = if config.offline {
        Box::new(SyntheticSource::new(today, config.seed))
    } else {
        Box::new(WebSource::new(today, config.seed)?)
    };
    let history = CsvHistoryStore::new(&config.history_path);

    tracing::info!(
        amount = config.amount,
        term_days = config.term_days,
        model = config.regressor.display_name(),
        history = %history.path().display(),
        "starting analysis"
    );
    let run = pipeline::run_recommend(&config, source.as_mut(), &history);

    print!("{}", render_run(&run, &config));

    if let Some(path) = &config.save_report {
        let generated_at = Local::now().naive_local();
        crate::io::write_recommendations(path, &run.ranked, config.amount, generated_at)?;
        tracing::info!(path = %path.display(), "recommendations saved");
    }

    Ok(())
}

const FALLBACK_NOTICE: &str =
    "Could not compute predicted returns; showing basic recommendations ranked by deposit rate.";

/// Everything `advisor recommend` prints to stdout.
fn render_run(run: &RunOutput, config: &AdvisorConfig) -> String {
    let mut out = String::new();
    if run.used_fallback {
        out.push_str(FALLBACK_NOTICE);
        out.push_str("\n\n");
    }
    out.push_str(&crate::report::summary_report(&run.ranked, config.amount));
    out.push('\n');

    if let Some(best) = run.ranked.first().filter(|_| config.detailed) {
        out.push_str(&crate::report::detailed_report(best, config.amount));
        out.push('\n');
    }
    out
}

fn handle_model(args: &ModelArgs) -> Result<(), AppError> {
    let store = JsonModelStore::new(&args.model_path);
    match store.load()? {
        Some(snapshot) => print!("{}", crate::report::model_summary(&snapshot, &store.location())),
        None => println!(
            "No model saved at {}. Run `advisor recommend` first.",
            store.location()
        ),
    }
    Ok(())
}

pub fn advisor_config_from_args(args: &RecommendArgs) -> AdvisorConfig {
    AdvisorConfig {
        amount: args.amount,
        term_days: args.term_days,
        regressor: args.model,
        seed: args.seed,
        offline: args.offline,
        history_path: args.history.clone(),
        model_path: args.model_path.clone(),
        save_report: args.save_report.clone(),
        detailed: !args.no_detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RegressorKind;

    #[test]
    fn config_mirrors_flags() {
        let cli = Cli::parse_from([
            "advisor",
            "recommend",
            "--amount",
            "5000",
            "--term",
            "90",
            "--model",
            "linear",
            "--seed",
            "9",
            "--no-detail",
        ]);
        let Command::Recommend(args) = cli.command else {
            panic!("expected recommend");
        };
        let config = advisor_config_from_args(&args);
        assert_eq!(config.amount, 5_000.0);
        assert_eq!(config.term_days, 90);
        assert_eq!(config.regressor, RegressorKind::Linear);
        assert_eq!(config.seed, 9);
        assert!(!config.detailed);
        assert!(!config.offline);
    }

    fn run_output(used_fallback: bool) -> RunOutput {
        let date = chrono::NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let bank = crate::domain::BankRecord::new("MKB", 7.0, 13.0, 9.0, date, 365).unwrap();
        RunOutput {
            records: vec![bank.clone()],
            ranked: vec![bank],
            used_fallback,
        }
    }

    fn offline_config() -> AdvisorConfig {
        let cli = Cli::parse_from(["advisor", "recommend", "--offline", "--amount", "1000"]);
        let Command::Recommend(args) = cli.command else {
            panic!("expected recommend");
        };
        advisor_config_from_args(&args)
    }

    #[test]
    fn fallback_ranking_is_announced() {
        let config = offline_config();

        let out = render_run(&run_output(true), &config);
        assert!(out.starts_with(FALLBACK_NOTICE));
        assert!(out.contains("Best option: MKB"));
        assert!(out.contains("DETAILED ANALYSIS: MKB"));

        let out = render_run(&run_output(false), &config);
        assert!(!out.contains(FALLBACK_NOTICE));
        assert!(out.contains("Best option: MKB"));
    }

    #[test]
    fn no_detail_skips_the_analysis() {
        let mut config = offline_config();
        config.detailed = false;
        let out = render_run(&run_output(false), &config);
        assert!(!out.contains("DETAILED ANALYSIS"));
    }
}
