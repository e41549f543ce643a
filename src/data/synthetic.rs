//! Synthetic bank records.
//!
//! Used for banks whose page could not be read, and for the whole catalog in
//! offline mode. Values are drawn from each bank's `SyntheticProfile` with a
//! caller-supplied generator, so a fixed seed reproduces the same records.

use chrono::NaiveDate;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::data::{BANK_SITES, BankSite, DEFAULT_TERM_DAYS, RecordSource};
use crate::domain::BankRecord;

/// Synthetic record for one bank.
pub fn synthetic_record<R: Rng>(site: &BankSite, date: NaiveDate, rng: &mut R) -> Option<BankRecord> {
    let profile = site.profile;
    let deposit = profile.deposit.at(rng.gen_range(0.0..1.0));
    let loan = profile.loan.at(rng.gen_range(0.0..1.0));
    let investment_return = profile.investment_return.at(rng.gen_range(0.0..1.0));

    match BankRecord::new(site.name, deposit, loan, investment_return, date, DEFAULT_TERM_DAYS) {
        Ok(record) => Some(record),
        Err(err) => {
            tracing::warn!(bank = site.name, %err, "invalid synthetic profile");
            None
        }
    }
}

/// Offline source: one synthetic record per catalog bank.
pub struct SyntheticSource {
    sites: Vec<BankSite>,
    date: NaiveDate,
    rng: StdRng,
}

impl SyntheticSource {
    pub fn new(date: NaiveDate, seed: u64) -> Self {
        Self::with_sites(BANK_SITES.to_vec(), date, seed)
    }

    pub fn with_sites(sites: Vec<BankSite>, date: NaiveDate, seed: u64) -> Self {
        Self {
            sites,
            date,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RecordSource for SyntheticSource {
    fn fetch_records(&mut self) -> Vec<BankRecord> {
        let records: Vec<BankRecord> = self
            .sites
            .iter()
            .filter_map(|site| synthetic_record(site, self.date, &mut self.rng))
            .collect();
        tracing::info!(records = records.len(), "generated synthetic records");
        records
    }
}
