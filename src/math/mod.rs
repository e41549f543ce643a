//! Numerical building blocks: least squares and the Adam optimizer.

pub mod adam;
pub mod ols;

pub use adam::*;
pub use ols::*;
