//! The immutable numeric table every downstream stage works on.

use std::sync::Arc;

use polars::prelude::{BooleanChunked, DataFrame, Float64Chunked};

use crate::error::FrameError;
use crate::labels::DatasetMeta;

/// An all-numeric survey table plus shared label metadata.
///
/// Every column is Float64 with missing responses as nulls. Filtering
/// derives a new frame; the original stays intact so each variable can be
/// re-filtered from the full table.
#[derive(Debug, Clone)]
pub struct SurveyFrame {
    data: DataFrame,
    meta: Arc<DatasetMeta>,
}

impl SurveyFrame {
    /// Wraps a dataframe with empty metadata.
    pub fn new(data: DataFrame) -> Self {
        Self::with_meta(data, Arc::new(DatasetMeta::default()))
    }

    /// Wraps a dataframe with a shared labels sidecar.
    pub fn with_meta(data: DataFrame, meta: Arc<DatasetMeta>) -> Self {
        Self { data, meta }
    }

    pub fn height(&self) -> usize {
        self.data.height()
    }

    pub fn width(&self) -> usize {
        self.data.width()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.data.column(name).is_ok()
    }

    /// Column names in file order.
    pub fn column_names(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// The numeric column for a variable, or a typed error if absent.
    ///
    /// Ingestion leaves every column as Float64, so this is the only schema
    /// gate downstream code needs.
    pub fn numeric(&self, name: &str) -> Result<&Float64Chunked, FrameError> {
        let column = self
            .data
            .column(name)
            .map_err(|_| FrameError::ColumnNotFound {
                column: name.to_string(),
            })?;
        Ok(column.f64()?)
    }

    /// Keeps the rows where the mask is true, sharing this frame's metadata.
    pub fn filter(&self, mask: &BooleanChunked) -> Result<SurveyFrame, FrameError> {
        let data = self.data.filter(mask)?;
        Ok(Self::with_meta(data, Arc::clone(&self.meta)))
    }

    pub fn meta(&self) -> &DatasetMeta {
        &self.meta
    }

    /// Sidecar label for a variable, if any.
    pub fn variable_label(&self, name: &str) -> Option<&str> {
        self.meta.variable_label(name)
    }
}

#[cfg(test)]
mod tests {
    use polars::prelude::{NewChunkedArray, df};

    use super::*;

    fn test_frame() -> SurveyFrame {
        let df = df!(
            "Q1" => [Some(1.0), Some(2.0), None, Some(1.0)],
            "AGE" => [Some(25.0), Some(40.0), Some(31.0), None],
        )
        .unwrap();
        SurveyFrame::new(df)
    }

    #[test]
    fn numeric_returns_the_column() {
        let frame = test_frame();
        let values = frame.numeric("Q1").unwrap();
        assert_eq!(values.get(0), Some(1.0));
        assert_eq!(values.get(2), None);
    }

    #[test]
    fn numeric_reports_missing_columns() {
        let frame = test_frame();
        let err = frame.numeric("Q9").unwrap_err();
        assert_eq!(err.to_string(), "variable 'Q9' not found in data file");
    }

    #[test]
    fn filter_keeps_matching_rows_and_shares_metadata() {
        let mut meta = DatasetMeta::default();
        meta.variable_labels
            .insert("Q1".to_string(), "Gender".to_string());
        let frame = SurveyFrame::with_meta(test_frame().data, Arc::new(meta));

        let mask = BooleanChunked::from_slice("keep".into(), &[true, false, true, false]);
        let filtered = frame.filter(&mask).unwrap();
        assert_eq!(filtered.height(), 2);
        assert_eq!(frame.height(), 4);
        assert_eq!(filtered.variable_label("Q1"), Some("Gender"));
    }

    #[test]
    fn column_names_preserve_file_order() {
        let frame = test_frame();
        assert_eq!(frame.column_names(), vec!["Q1", "AGE"]);
        assert!(frame.has_column("AGE"));
        assert!(!frame.has_column("WEIGHT"));
    }
}
