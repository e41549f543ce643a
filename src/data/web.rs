//! Web source: read deposit and loan rates from bank home pages.
//!
//! Extraction is deliberately generic. Every text-bearing element is lowercased
//! and scanned; the first element mentioning a keyword and a `%` sign whose
//! first number lies in `(1, 30)` wins. Pages that yield neither rate, and any
//! fetch failure, fall back to a synthetic record for that bank.

use std::thread;
use std::time::Duration;

use chrono::NaiveDate;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use reqwest::blocking::Client;
use scraper::{Html, Selector};

use crate::data::{BANK_SITES, BankSite, DEFAULT_TERM_DAYS, RecordSource, synthetic_record};
use crate::domain::BankRecord;
use crate::error::AppError;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
/// Pause between banks.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

const TEXT_ELEMENTS: &str = "div, span, p, td, li, a, h1, h2, h3, h4, h5, h6";

const DEPOSIT_KEYWORDS: &[&str] = &["вклад", "депозит", "savings", "deposit"];
const LOAN_KEYWORDS: &[&str] = &["кредит", "заем", "ипотека", "loan", "credit", "mortgage"];

/// Plausible published rates, exclusive on both ends.
const MIN_PLAUSIBLE_RATE: f64 = 1.0;
const MAX_PLAUSIBLE_RATE: f64 = 30.0;

pub struct WebSource {
    client: Client,
    sites: Vec<BankSite>,
    date: NaiveDate,
    delay: Duration,
    rng: StdRng,
}

impl WebSource {
    pub fn new(date: NaiveDate, seed: u64) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            sites: BANK_SITES.to_vec(),
            date,
            delay: DEFAULT_DELAY,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn fetch_page(&self, url: &str) -> Result<String, AppError> {
        // Error statuses still carry a body worth scanning.
        self.client
            .get(url)
            .send()
            .and_then(|resp| resp.text())
            .map_err(|e| AppError::io(format!("Failed to fetch {url}: {e}")))
    }

    fn record_for(&mut self, site: &BankSite) -> Option<BankRecord> {
        tracing::info!(url = site.url, "scanning");

        let rates = match self.fetch_page(site.url) {
            Ok(html) => extract_rates(&html),
            Err(err) => {
                tracing::warn!(bank = site.name, %err, "fetch failed; using synthetic data");
                None
            }
        };

        let Some((deposit, loan)) = rates else {
            tracing::info!(bank = site.name, "no rates found; using synthetic data");
            return synthetic_record(site, self.date, &mut self.rng);
        };

        let observed = provisional_return(deposit, &mut self.rng);
        match BankRecord::new(site.name, deposit, loan, observed, self.date, DEFAULT_TERM_DAYS) {
            Ok(record) => {
                tracing::info!(bank = site.name, deposit, loan, "rates collected");
                Some(record)
            }
            Err(err) => {
                tracing::warn!(bank = site.name, %err, "invalid scraped rates; using synthetic data");
                synthetic_record(site, self.date, &mut self.rng)
            }
        }
    }
}

impl RecordSource for WebSource {
    fn fetch_records(&mut self) -> Vec<BankRecord> {
        let sites = self.sites.clone();
        let mut records = Vec::with_capacity(sites.len());
        for (i, site) in sites.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
            if let Some(record) = self.record_for(site) {
                records.push(record);
            }
        }
        records
    }
}

/// `(deposit, loan)` found on the page, or `None` when both are missing.
///
/// A missing side is reported as `0.0`.
pub fn extract_rates(html: &str) -> Option<(f64, f64)> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(TEXT_ELEMENTS).ok()?;

    let texts: Vec<String> = document
        .select(&selector)
        .map(|el| el.text().collect::<Vec<_>>().join(" ").to_lowercase())
        .collect();

    let deposit = find_rate(&texts, DEPOSIT_KEYWORDS).unwrap_or(0.0);
    let loan = find_rate(&texts, LOAN_KEYWORDS).unwrap_or(0.0);

    if deposit == 0.0 && loan == 0.0 {
        None
    } else {
        Some((deposit, loan))
    }
}

fn find_rate(texts: &[String], keywords: &[&str]) -> Option<f64> {
    texts
        .iter()
        .filter(|t| t.contains('%') && keywords.iter().any(|k| t.contains(k)))
        .filter_map(|t| first_number(t))
        .find(|rate| *rate > MIN_PLAUSIBLE_RATE && *rate < MAX_PLAUSIBLE_RATE)
}

/// First decimal number in `text`; `,` is accepted as the decimal separator.
pub fn first_number(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let rest = &text[start..];

    let mut number = String::new();
    let mut seen_separator = false;
    for ch in rest.chars() {
        match ch {
            '0'..='9' => number.push(ch),
            '.' | ',' if !seen_separator => {
                seen_separator = true;
                number.push('.');
            }
            _ => break,
        }
    }

    number.trim_end_matches('.').parse().ok()
}

/// Provisional return for scraped rates, before any model is involved.
///
/// `deposit * (1.3 + u * 0.4)`, or `8 + u * 4` when no deposit rate was found.
pub fn provisional_return<R: Rng>(deposit: f64, rng: &mut R) -> f64 {
    let u: f64 = rng.gen_range(0.0..1.0);
    if deposit == 0.0 {
        8.0 + u * 4.0
    } else {
        deposit * (1.3 + u * 0.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_number_handles_separators() {
        assert_eq!(first_number("ставка 7,5% годовых"), Some(7.5));
        assert_eq!(first_number("up to 12.25%"), Some(12.25));
        assert_eq!(first_number("18%"), Some(18.0));
        assert_eq!(first_number("5. item"), Some(5.0));
        assert_eq!(first_number("no digits"), None);
    }

    #[test]
    fn extracts_deposit_and_loan_rates() {
        let html = r#"
            <html><body>
              <div><h2>Since 2015</h2></div>
              <p>Вклад «Лучший» до <b>16,5%</b> годовых</p>
              <span>Deposit insurance 100%</span>
              <li>Кредит наличными от 19.9%</li>
            </body></html>
        "#;
        assert_eq!(extract_rates(html), Some((16.5, 19.9)));
    }

    #[test]
    fn implausible_values_are_skipped() {
        let html = "<div>deposit 2024 results: 45%</div><p>deposit rate 8%</p>";
        assert_eq!(extract_rates(html), Some((8.0, 0.0)));
    }

    #[test]
    fn page_without_rates_yields_none() {
        let html = "<html><body><p>Welcome</p><a href='/'>Home</a></body></html>";
        assert_eq!(extract_rates(html), None);
    }

    #[test]
    fn provisional_return_ranges() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let with_deposit = provisional_return(10.0, &mut rng);
            assert!((13.0..17.0).contains(&with_deposit));
            let without = provisional_return(0.0, &mut rng);
            assert!((8.0..12.0).contains(&without));
        }
    }

    #[test]
    fn source_without_sites_fetches_nothing() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let mut source = WebSource::new(date, 1).unwrap().with_delay(Duration::ZERO);
        source.sites.clear();
        assert!(source.delay.is_zero());
        assert!(source.fetch_records().is_empty());
    }
}
