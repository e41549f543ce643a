//! `rate-advisor` library crate.
//!
//! The binary (`advisor`) is a thin wrapper around this library so the
//! ranking pipeline can be tested without spawning processes.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod estimator;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod report;
