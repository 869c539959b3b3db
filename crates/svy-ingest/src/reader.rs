//! CSV loading with numeric coercion.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use polars::prelude::{
    Column, CsvReadOptions, DataFrame, DataType, IntoColumn, NamedFrom, SerReader, Series,
};
use tracing::{debug, warn};

use crate::error::{FrameError, IngestError, Result};
use crate::frame::SurveyFrame;
use crate::labels::DatasetMeta;

/// A column dropped during ingestion, with the dtype that disqualified it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExcludedColumn {
    pub name: String,
    pub dtype: String,
}

impl fmt::Display for ExcludedColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Column '{}' excluded: non-numeric type ({})",
            self.name, self.dtype
        )
    }
}

/// Loads a survey CSV into an all-Float64 frame with empty metadata.
pub fn read_table(path: &Path) -> Result<(SurveyFrame, Vec<ExcludedColumn>)> {
    read_table_with_meta(path, Arc::new(DatasetMeta::default()))
}

/// Loads a survey CSV and attaches a labels sidecar.
///
/// Integer, float, and boolean columns are cast to Float64 with NaN
/// normalized to null. Other columns are dropped and reported so the caller
/// can surface them as warnings.
pub fn read_table_with_meta(
    path: &Path,
    meta: Arc<DatasetMeta>,
) -> Result<(SurveyFrame, Vec<ExcludedColumn>)> {
    ensure_exists(path)?;
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if df.height() == 0 {
        return Err(IngestError::EmptyTable {
            path: path.to_path_buf(),
        });
    }

    let mut kept: Vec<Column> = Vec::with_capacity(df.width());
    let mut excluded = Vec::new();
    for column in df.get_columns() {
        if is_numeric_dtype(column.dtype()) {
            kept.push(to_float_column(column)?);
        } else {
            let dropped = ExcludedColumn {
                name: column.name().to_string(),
                dtype: column.dtype().to_string(),
            };
            warn!(
                column = %dropped.name,
                dtype = %dropped.dtype,
                "column excluded from tabulation"
            );
            excluded.push(dropped);
        }
    }

    if kept.is_empty() {
        return Err(IngestError::NoNumericColumns {
            path: path.to_path_buf(),
        });
    }

    let data = DataFrame::new(kept).map_err(FrameError::from)?;
    debug!(
        rows = data.height(),
        columns = data.width(),
        excluded = excluded.len(),
        "data file loaded"
    );
    Ok((SurveyFrame::with_meta(data, meta), excluded))
}

fn ensure_exists(path: &Path) -> Result<()> {
    std::fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    Ok(())
}

fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Boolean
    )
}

/// Casts to Float64 and normalizes NaN to null.
fn to_float_column(column: &Column) -> std::result::Result<Column, FrameError> {
    let casted = column.cast(&DataType::Float64)?;
    let values = casted.f64()?;
    let mut cleaned: Vec<Option<f64>> = Vec::with_capacity(values.len());
    for idx in 0..values.len() {
        cleaned.push(values.get(idx).filter(|value| !value.is_nan()));
    }
    Ok(Series::new(column.name().clone(), cleaned).into_column())
}
