//! Save the recommendation list as plain text.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDateTime;

use crate::domain::BankRecord;
use crate::error::AppError;
use crate::report::recommendations_text;

/// Write `ranked` to `path`, overwriting any existing file.
pub fn write_recommendations(
    path: &Path,
    ranked: &[BankRecord],
    amount: f64,
    generated_at: NaiveDateTime,
) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::io(format!("Failed to create report '{}': {e}", path.display()))
    })?;

    file.write_all(recommendations_text(ranked, amount, generated_at).as_bytes())
        .map_err(|e| AppError::io(format!("Failed to write report: {e}")))?;

    Ok(())
}
