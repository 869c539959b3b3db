//! Label sidecar: variable and value labels exported with the data.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{IngestError, Result};

/// Variable and value labels exported alongside a survey data file.
///
/// Inner value-label keys are answer codes as strings; their map order is
/// the display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetMeta {
    #[serde(default)]
    pub variable_labels: IndexMap<String, String>,
    #[serde(default)]
    pub value_labels: IndexMap<String, IndexMap<String, String>>,
}

impl DatasetMeta {
    pub fn is_empty(&self) -> bool {
        self.variable_labels.is_empty() && self.value_labels.is_empty()
    }

    pub fn variable_label(&self, name: &str) -> Option<&str> {
        self.variable_labels.get(name).map(String::as_str)
    }

    /// Parsed (code, label) pairs for a variable, in sidecar order.
    pub fn value_labels_for(&self, name: &str) -> Option<Vec<(f64, String)>> {
        self.value_labels.get(name).map(|labels| {
            labels
                .iter()
                .filter_map(|(key, label)| {
                    key.trim()
                        .parse::<f64>()
                        .ok()
                        .map(|code| (code, label.clone()))
                })
                .collect()
        })
    }
}

/// Loads a labels sidecar JSON file.
///
/// Every value-label key must parse as a number; the first offender fails
/// the load and names the variable and key.
pub fn load_labels(path: &Path) -> Result<DatasetMeta> {
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => IngestError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => IngestError::FileRead {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let meta: DatasetMeta =
        serde_json::from_str(&text).map_err(|source| IngestError::LabelsParse {
            path: path.to_path_buf(),
            source,
        })?;
    for (variable, labels) in &meta.value_labels {
        if let Some(key) = labels.keys().find(|key| key.trim().parse::<f64>().is_err()) {
            return Err(IngestError::LabelKey {
                path: path.to_path_buf(),
                variable: variable.clone(),
                key: key.clone(),
            });
        }
    }
    debug!(
        variable_labels = meta.variable_labels.len(),
        value_label_maps = meta.value_labels.len(),
        "labels sidecar loaded"
    );
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_sidecar(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp file");
        file.write_all(content.as_bytes()).expect("write temp file");
        file
    }

    #[test]
    fn sidecar_parses_labels_in_order() {
        let file = write_sidecar(
            r#"{
                "variable_labels": {"Q1": "Gender", "WEIGHT": "Design weight"},
                "value_labels": {"Q1": {"2": "Female", "1": "Male"}}
            }"#,
        );
        let meta = load_labels(file.path()).unwrap();
        assert_eq!(meta.variable_label("Q1"), Some("Gender"));
        assert_eq!(
            meta.value_labels_for("Q1").unwrap(),
            vec![(2.0, "Female".to_string()), (1.0, "Male".to_string())]
        );
        assert_eq!(meta.value_labels_for("Q9"), None);
    }

    #[test]
    fn sidecar_tolerates_missing_sections() {
        let file = write_sidecar(r#"{"variable_labels": {"Q1": "Gender"}}"#);
        let meta = load_labels(file.path()).unwrap();
        assert!(meta.value_labels.is_empty());
        assert!(!meta.is_empty());
    }

    #[test]
    fn sidecar_rejects_non_numeric_label_keys() {
        let file = write_sidecar(r#"{"value_labels": {"Q1": {"male": "Male"}}}"#);
        let err = load_labels(file.path()).unwrap_err();
        assert!(matches!(
            err,
            IngestError::LabelKey { ref variable, ref key, .. }
                if variable == "Q1" && key == "male"
        ));
    }

    #[test]
    fn missing_sidecar_is_a_file_not_found_error() {
        let err = load_labels(Path::new("/nonexistent/labels.json")).unwrap_err();
        assert!(matches!(err, IngestError::FileNotFound { .. }));
    }
}
