//! Record sources.
//!
//! The pipeline treats every record a source returns as equally valid input.
//! Sources never fail outward: a bank whose page cannot be fetched or parsed is
//! represented by a synthetic record instead.

pub mod banks;
pub mod synthetic;
pub mod web;

pub use banks::*;
pub use synthetic::*;
pub use web::*;

use crate::domain::BankRecord;

/// Produces the current set of bank records.
pub trait RecordSource {
    fn fetch_records(&mut self) -> Vec<BankRecord>;
}
