//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the bank rate snapshot (`BankRecord`) and its model inputs (`Features`)
//! - run configuration (`AdvisorConfig`, `RegressorKind`)

pub mod types;

pub use types::*;
