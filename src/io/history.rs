//! Historical record store (comma-delimited file).
//!
//! Layout, one row per record after a header:
//!
//! ```text
//! bankName,depositRate,loanRate,investmentReturn,date,termDays
//! Sberbank,5.40,13.80,8.10,2025-01-15,365
//! ```
//!
//! The format is unquoted, so commas inside bank names are replaced with `;`
//! before writing. Rates are written with two decimals. Rows that do not have
//! exactly six fields or fail validation are skipped and reported.

use std::fs::{File, create_dir_all};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::BankRecord;
use crate::error::AppError;

pub const HISTORY_HEADER: [&str; 6] = [
    "bankName",
    "depositRate",
    "loanRate",
    "investmentReturn",
    "date",
    "termDays",
];

pub const DEFAULT_HISTORY_PATH: &str = "data/bank_data.csv";

/// Best-effort persistence of past records.
///
/// Implementations log failures instead of returning them: a broken history
/// must never block a recommendation.
pub trait HistoryStore {
    /// Stored records, or an empty list when nothing is stored.
    fn load(&self) -> Vec<BankRecord>;

    /// Replace the stored records.
    fn save(&self, records: &[BankRecord]);
}

/// A row that could not be turned into a record.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Records read from the file plus the rows that were skipped.
#[derive(Debug, Clone, Default)]
pub struct HistoryLoad {
    pub records: Vec<BankRecord>,
    pub row_errors: Vec<RowError>,
}

#[derive(Debug, Clone)]
pub struct CsvHistoryStore {
    path: PathBuf,
}

impl CsvHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file. A missing file is an empty history, not an error.
    pub fn read_records(&self) -> Result<HistoryLoad, AppError> {
        if !self.path.exists() {
            return Ok(HistoryLoad::default());
        }

        let file = File::open(&self.path).map_err(|e| {
            AppError::io(format!("Failed to open history '{}': {e}", self.path.display()))
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut out = HistoryLoad::default();
        for (idx, result) in reader.records().enumerate() {
            // Line numbers are 1-based and the header is line 1.
            let line = idx + 2;
            let parsed = result
                .map_err(|e| format!("CSV parse error: {e}"))
                .and_then(|row| parse_row(&row));
            match parsed {
                Ok(record) => out.records.push(record),
                Err(message) => out.row_errors.push(RowError { line, message }),
            }
        }

        Ok(out)
    }

    /// Overwrite the file with `records`, creating parent directories.
    pub fn write_records(&self, records: &[BankRecord]) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir_all(parent).map_err(|e| {
                AppError::io(format!("Failed to create '{}': {e}", parent.display()))
            })?;
        }

        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Necessary)
            .from_path(&self.path)
            .map_err(|e| {
                AppError::io(format!("Failed to create history '{}': {e}", self.path.display()))
            })?;

        writer
            .write_record(HISTORY_HEADER)
            .map_err(|e| AppError::io(format!("Failed to write history header: {e}")))?;

        for record in records {
            writer
                .write_record(format_row(record))
                .map_err(|e| AppError::io(format!("Failed to write history row: {e}")))?;
        }

        writer
            .flush()
            .map_err(|e| AppError::io(format!("Failed to flush history: {e}")))?;
        Ok(())
    }
}

impl HistoryStore for CsvHistoryStore {
    fn load(&self) -> Vec<BankRecord> {
        match self.read_records() {
            Ok(loaded) => {
                for err in &loaded.row_errors {
                    tracing::warn!(line = err.line, message = %err.message, "skipping history row");
                }
                tracing::info!(
                    path = %self.path.display(),
                    records = loaded.records.len(),
                    skipped = loaded.row_errors.len(),
                    "history loaded"
                );
                loaded.records
            }
            Err(err) => {
                tracing::warn!(%err, "failed to load history");
                Vec::new()
            }
        }
    }

    fn save(&self, records: &[BankRecord]) {
        match self.write_records(records) {
            Ok(()) => tracing::info!(path = %self.path.display(), records = records.len(), "history saved"),
            Err(err) => tracing::warn!(%err, "failed to save history"),
        }
    }
}

fn escape_name(name: &str) -> String {
    name.replace(',', ";")
}

fn format_row(record: &BankRecord) -> [String; 6] {
    [
        escape_name(record.bank_name()),
        format!("{:.2}", record.deposit_rate()),
        format!("{:.2}", record.loan_rate()),
        format!("{:.2}", record.expected_return()),
        record.observed_date().format("%Y-%m-%d").to_string(),
        record.term_days().to_string(),
    ]
}

fn parse_row(row: &StringRecord) -> Result<BankRecord, String> {
    if row.len() != HISTORY_HEADER.len() {
        return Err(format!("expected {} fields, found {}", HISTORY_HEADER.len(), row.len()));
    }

    let number = |idx: usize| -> Result<f64, String> {
        row[idx]
            .parse::<f64>()
            .map_err(|_| format!("invalid {} '{}'", HISTORY_HEADER[idx], &row[idx]))
    };

    let date = NaiveDate::parse_from_str(&row[4], "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}'", &row[4]))?;
    let term_days = row[5]
        .parse::<u32>()
        .map_err(|_| format!("invalid termDays '{}'", &row[5]))?;

    BankRecord::new(&row[0], number(1)?, number(2)?, number(3)?, date, term_days)
        .map_err(|e| e.to_string())
}
