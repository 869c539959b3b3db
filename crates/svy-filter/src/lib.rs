//! Filter evaluation for survey frames.
//!
//! Conditions from a tabulation plan become boolean row masks here. A
//! [`FilterEngine`] AND-combines the conditions of a named filter set and
//! returns the kept rows together with the stats and condition descriptions
//! that reports display.

pub mod engine;
pub mod error;
pub mod mask;

pub use engine::{FilterEngine, FilterOutcome, FilterStats};
pub use error::{FilterError, Result};
pub use mask::condition_mask;
