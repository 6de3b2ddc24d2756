//! Record source backed by exported JSON files, one array per dataset

use pipeline_core::{DataSourceError, DatasetKind, Record, RecordSource};
use std::path::PathBuf;

use crate::config::{Config, DataFiles};

/// Reads `<data_dir>/<file>` for each dataset on every call
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    data_dir: PathBuf,
    files: DataFiles,
}

impl JsonFileSource {
    pub fn new(config: &Config) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            files: config.data_files.clone(),
        }
    }

    pub fn path(&self, kind: DatasetKind) -> PathBuf {
        self.data_dir.join(self.files.file_name(kind))
    }
}

impl RecordSource for JsonFileSource {
    fn records(&self, kind: DatasetKind) -> Result<Vec<Record>, DataSourceError> {
        let path = self.path(kind);
        let failure = |reason: String| DataSourceError {
            dataset: kind,
            location: path.display().to_string(),
            reason,
        };

        let content = std::fs::read_to_string(&path).map_err(|e| failure(e.to_string()))?;
        let records: Vec<Record> =
            serde_json::from_str(&content).map_err(|e| failure(e.to_string()))?;

        tracing::debug!(
            dataset = kind.name(),
            path = %path.display(),
            records = records.len(),
            "loaded records"
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileConfig;
    use pipeline_core::{CategoryField, PipelineError, assemble_response};
    use std::path::Path;

    fn source_in(dir: &Path) -> JsonFileSource {
        let config = Config::from_file(FileConfig::default(), Some(dir.to_path_buf()), None).unwrap();
        JsonFileSource::new(&config)
    }

    fn write_all_exports(dir: &Path) {
        std::fs::write(
            dir.join("Customer type.json"),
            r#"[
                {"closed_fiscal_quarter": "2024-Q1", "Cust_Type": "New Customer", "count": 5, "acv": 100000},
                {"closed_fiscal_quarter": "2024-Q1", "Cust_Type": "New Customer", "count": 3, "acv": 50000}
            ]"#,
        )
        .unwrap();
        std::fs::write(
            dir.join("Account Industry.json"),
            r#"[{"closed_fiscal_quarter": "2023-Q4", "Acct_Industry": "Retail", "count": 1}]"#,
        )
        .unwrap();
        std::fs::write(dir.join("ACV Range.json"), "[]").unwrap();
        std::fs::write(
            dir.join("Team.json"),
            r#"[{"closed_fiscal_quarter": "2024-Q2", "Team": "Asia", "count": 2, "acv": 700.5}]"#,
        )
        .unwrap();
    }

    #[test]
    fn test_reads_export_file() {
        let dir = tempfile::tempdir().unwrap();
        write_all_exports(dir.path());
        let records = source_in(dir.path()).records(DatasetKind::CustomerTypes).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(CategoryField::CustType.resolve(&records[0]), Some("New Customer"));
        assert_eq!(records[1].acv, Some(50000.0));
    }

    #[test]
    fn test_missing_file_is_data_source_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = source_in(dir.path()).records(DatasetKind::Teams).unwrap_err();

        assert_eq!(err.dataset, DatasetKind::Teams);
        assert!(err.location.ends_with("Team.json"));
    }

    #[test]
    fn test_non_array_is_data_source_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ACV Range.json"), r#"{"rows": []}"#).unwrap();
        let err = source_in(dir.path()).records(DatasetKind::AcvRanges).unwrap_err();
        assert_eq!(err.dataset, DatasetKind::AcvRanges);
    }

    #[test]
    fn test_wrong_field_type_is_data_source_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Team.json"),
            r#"[{"closed_fiscal_quarter": "2024-Q2", "Team": "Asia", "count": "two"}]"#,
        )
        .unwrap();
        assert!(source_in(dir.path()).records(DatasetKind::Teams).is_err());
    }

    #[test]
    fn test_full_response_from_files() {
        let dir = tempfile::tempdir().unwrap();
        write_all_exports(dir.path());
        let response = assemble_response(&source_in(dir.path())).unwrap();

        let customers = response.get(DatasetKind::CustomerTypes).unwrap();
        assert_eq!(customers.totals.count, 8);
        assert_eq!(customers.totals.acv, 150_000.0);
        let industries = response.get(DatasetKind::Industries).unwrap();
        assert_eq!(industries.aggregated.get("2023-Q4", "Retail").unwrap().acv_percentage, "0");
    }

    #[test]
    fn test_one_missing_export_fails_everything() {
        let dir = tempfile::tempdir().unwrap();
        write_all_exports(dir.path());
        std::fs::remove_file(dir.path().join("Account Industry.json")).unwrap();

        let err = assemble_response(&source_in(dir.path())).unwrap_err();
        assert!(matches!(err, PipelineError::DataSource(_)));
        assert_eq!(err.dataset(), DatasetKind::Industries);
    }
}
