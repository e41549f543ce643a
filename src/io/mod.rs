//! Input/output collaborators.
//!
//! - flat-file history of bank records (`history`)
//! - fitted model parameters as JSON (`model_store`)
//! - plain-text recommendation export (`export`)

pub mod export;
pub mod history;
pub mod model_store;

pub use export::*;
pub use history::*;
pub use model_store::*;
