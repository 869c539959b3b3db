//! Weighting support for survey tabulation.
//!
//! A [`WeightProfile`] screens a weight column down to its usable rows and
//! carries the diagnostics (sum, ESS, DEFF) that weighted reports display.

pub mod error;
pub mod profile;

pub use error::{Result, WeightError};
pub use profile::{WeightProfile, WeightSummary};
