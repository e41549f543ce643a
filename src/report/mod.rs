//! Text reports: ranked summary, single-bank detail, and the saved export.
//!
//! Everything here is a pure function of its arguments: no I/O, no clock, no
//! randomness. The input list is rendered in the order given, so lists ranked
//! elsewhere (e.g. by deposit rate) render the same way as engine output.

use chrono::NaiveDateTime;

use crate::domain::BankRecord;
use crate::models::ModelSnapshot;

pub mod format;

pub use format::*;

/// Width of the bank column in the summary table.
pub const NAME_COLUMN_WIDTH: usize = 15;
pub const CURRENCY: &str = "RUB";

const RANK_MARKERS: [&str; 3] = ["#1 ", "#2 ", "#3 "];

const ADVICE: [&str; 4] = [
    "Spread the investment across several banks",
    "Take bank reliability into account (ratings, reviews)",
    "Check the conditions for early withdrawal",
    "Confirm current rates on the banks' official sites",
];

/// Profit over the term: `amount * return / 100`.
pub fn expected_profit(amount: f64, bank: &BankRecord) -> f64 {
    amount * bank.expected_return() / 100.0
}

fn table_row(cells: [&str; 5]) -> String {
    format!(
        "{:<15} {:>8} {:>10} {:>12} {:>7}",
        cells[0], cells[1], cells[2], cells[3], cells[4]
    )
}

fn ranked_name(rank: usize, bank_name: &str) -> String {
    let marker = RANK_MARKERS.get(rank).copied().unwrap_or("   ");
    truncate(&format!("{marker}{bank_name}"), NAME_COLUMN_WIDTH)
}

/// Boxed table of ranked banks with a best-option block and advice.
pub fn summary_report(ranked: &[BankRecord], amount: f64) -> String {
    let mut out = String::new();
    out.push_str(&box_top());
    out.push_str(&box_line_centered("INVESTMENT RECOMMENDATIONS"));
    out.push_str(&box_separator());

    let Some(best) = ranked.first() else {
        out.push_str(&box_line_centered("No data for recommendations"));
        out.push_str(&box_bottom());
        return out;
    };

    out.push_str(&box_row(&table_row(["Bank", "Return", "Profit", "Total", "Deposit"])));
    out.push_str(&box_separator());

    for (rank, bank) in ranked.iter().enumerate() {
        let profit = expected_profit(amount, bank);
        // Only the name cell is truncated; large amounts widen the row.
        out.push_str(&box_row(&table_row([
            &ranked_name(rank, bank.bank_name()),
            &fmt_percent(bank.expected_return()),
            &fmt_money(profit),
            &fmt_money(amount + profit),
            &fmt_percent(bank.deposit_rate()),
        ])));
    }

    out.push_str(&box_separator());
    let best_profit = expected_profit(amount, best);
    out.push_str(&box_line(&format!("Best option: {}", best.bank_name())));
    out.push_str(&box_line(&format!(
        "Predicted return: {}",
        fmt_percent(best.expected_return())
    )));
    out.push_str(&box_line(&format!(
        "Expected profit: {} {CURRENCY}",
        fmt_money(best_profit)
    )));
    out.push_str(&box_line(&format!(
        "Total at maturity: {} {CURRENCY}",
        fmt_money(amount + best_profit)
    )));
    out.push_str(&box_bottom());

    out.push_str("\nADDITIONAL ADVICE:\n");
    for line in ADVICE {
        out.push_str(&format!("• {line}\n"));
    }
    out.push_str("\nNote: forecasts come from a fitted model and historical data.\n");
    out.push_str("Actual results may differ. Invest responsibly!\n");

    out
}

/// Detailed figures for one bank, including profit per 30-day month.
pub fn detailed_report(bank: &BankRecord, amount: f64) -> String {
    let profit = expected_profit(amount, bank);
    let months = f64::from(bank.term_days()) / 30.0;
    let monthly = profit / months;

    let mut out = String::new();
    out.push_str(&format!("\nDETAILED ANALYSIS: {}\n", bank.bank_name()));
    out.push_str(&"─".repeat(50));
    out.push('\n');

    let rows = [
        ("Predicted return:", format!("{} per year", fmt_percent(bank.expected_return()))),
        ("Investment term:", format!("{} days", bank.term_days())),
        ("Investment amount:", format!("{} {CURRENCY}", fmt_money(amount))),
        ("Expected profit:", format!("{} {CURRENCY}", fmt_money(profit))),
        ("Monthly income:", format!("{} {CURRENCY}", fmt_money(monthly))),
        ("Total payout:", format!("{} {CURRENCY}", fmt_money(amount + profit))),
        ("Deposit rate:", fmt_percent(bank.deposit_rate())),
        ("Loan rate:", fmt_percent(bank.loan_rate())),
    ];
    for (label, value) in rows {
        out.push_str(&format!("{label:<29}{value}\n"));
    }

    out
}

/// Plain-text list written by `--save-report`.
pub fn recommendations_text(ranked: &[BankRecord], amount: f64, generated_at: NaiveDateTime) -> String {
    let mut out = String::new();
    out.push_str("Investment recommendations\n");
    out.push_str(&format!("Date: {}\n", generated_at.format("%Y-%m-%d %H:%M:%S")));
    out.push_str(&format!("Investment amount: {} {CURRENCY}\n\n", fmt_money(amount)));

    for (i, bank) in ranked.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, bank.bank_name()));
        out.push_str(&format!("   Return: {}\n", fmt_percent(bank.expected_return())));
        out.push_str(&format!(
            "   Profit: {} {CURRENCY}\n",
            fmt_money(expected_profit(amount, bank))
        ));
        out.push_str(&format!("   Deposit rate: {}\n", fmt_percent(bank.deposit_rate())));
        out.push_str(&format!("   Loan rate: {}\n\n", fmt_percent(bank.loan_rate())));
    }

    out
}

/// Overview of a stored model, printed by `advisor model`.
pub fn model_summary(snapshot: &ModelSnapshot, location: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("Model: {}\n", snapshot.kind.display_name()));
    out.push_str(&format!("Location: {location}\n"));
    out.push_str(&format!("Training samples: {}\n", snapshot.samples));
    out.push_str(&format!("Training loss (MSE): {:.4}\n", snapshot.training_loss));
    out.push_str(&format!("Parameters: {}\n", snapshot.parameter_count()));
    for block in &snapshot.blocks {
        out.push_str(&format!("  {:<20} {}x{}\n", block.name, block.rows, block.cols));
    }
    out
}
