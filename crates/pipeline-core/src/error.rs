//! Error taxonomy for reading and aggregating pipeline records

use std::fmt;
use thiserror::Error;

use crate::dataset::DatasetKind;
use crate::record::CategoryField;

/// A bucketing key a record must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKey {
    Quarter,
    Category(CategoryField),
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Quarter => f.write_str("closed_fiscal_quarter"),
            RecordKey::Category(field) => write!(f, "{}", field),
        }
    }
}

/// A record without a quarter or category value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("record #{index} is missing required field `{missing}`")]
pub struct InvalidRecordError {
    /// Position of the record in its source collection
    pub index: usize,
    pub missing: RecordKey,
}

/// A record collection that could not be read or parsed as a whole
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to read {dataset} records from {location}: {reason}")]
pub struct DataSourceError {
    pub dataset: DatasetKind,
    /// File path or other description of where the records live
    pub location: String,
    pub reason: String,
}

/// Failure to assemble a response
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error(transparent)]
    DataSource(#[from] DataSourceError),

    #[error("invalid record in {dataset} dataset")]
    InvalidRecord {
        dataset: DatasetKind,
        #[source]
        source: InvalidRecordError,
    },
}

impl PipelineError {
    /// Dataset the failure belongs to
    pub fn dataset(&self) -> DatasetKind {
        match self {
            PipelineError::DataSource(err) => err.dataset,
            PipelineError::InvalidRecord { dataset, .. } => *dataset,
        }
    }
}
