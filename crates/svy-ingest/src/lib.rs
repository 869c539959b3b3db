//! Survey data ingestion.
//!
//! Loads CSV exports into an all-numeric [`SurveyFrame`], coercing every
//! usable column to Float64 and normalizing NaN to null, and reads the
//! optional labels sidecar that carries variable and value labels.

pub mod error;
pub mod frame;
pub mod labels;
pub mod reader;

pub use error::{FrameError, IngestError, Result};
pub use frame::SurveyFrame;
pub use labels::{DatasetMeta, load_labels};
pub use reader::{ExcludedColumn, read_table, read_table_with_meta};
