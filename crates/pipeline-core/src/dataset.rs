//! The four fixed datasets and response assembly

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::aggregate::{AggregatedTable, Totals, aggregate, apply_percentages, totalize};
use crate::error::{DataSourceError, PipelineError};
use crate::record::{CategoryField, Record};

/// One of the four datasets served per response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DatasetKind {
    CustomerTypes,
    Industries,
    AcvRanges,
    Teams,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 4] = [
        DatasetKind::CustomerTypes,
        DatasetKind::Industries,
        DatasetKind::AcvRanges,
        DatasetKind::Teams,
    ];

    /// Key of the dataset in the response
    pub fn name(self) -> &'static str {
        match self {
            DatasetKind::CustomerTypes => "customerTypes",
            DatasetKind::Industries => "industries",
            DatasetKind::AcvRanges => "acvRanges",
            DatasetKind::Teams => "teams",
        }
    }

    /// Record column holding this dataset's category
    pub fn category_field(self) -> CategoryField {
        match self {
            DatasetKind::CustomerTypes => CategoryField::CustType,
            DatasetKind::Industries => CategoryField::AcctIndustry,
            DatasetKind::AcvRanges => CategoryField::AcvRange,
            DatasetKind::Teams => CategoryField::Team,
        }
    }

    /// Human readable heading for reports
    pub fn title(self) -> &'static str {
        match self {
            DatasetKind::CustomerTypes => "Customer Type",
            DatasetKind::Industries => "Account Industry",
            DatasetKind::AcvRanges => "ACV Range",
            DatasetKind::Teams => "Team",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DatasetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DatasetKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "unknown dataset '{}'. Use: customerTypes, industries, acvRanges, teams",
                    s
                )
            })
    }
}

impl Serialize for DatasetKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Aggregated groups of one dataset plus their totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub aggregated: AggregatedTable,
    pub totals: Totals,
}

/// All four datasets, keyed by dataset name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Response(BTreeMap<DatasetKind, Dataset>);

impl Response {
    pub fn get(&self, kind: DatasetKind) -> Option<&Dataset> {
        self.0.get(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DatasetKind, &Dataset)> {
        self.0.iter().map(|(kind, dataset)| (*kind, dataset))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Supplier of raw records for each dataset.
///
/// Implementations list the full collection on every call.
pub trait RecordSource {
    fn records(&self, kind: DatasetKind) -> Result<Vec<Record>, DataSourceError>;
}

/// Records held in memory, one collection per dataset
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    collections: BTreeMap<DatasetKind, Vec<Record>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: DatasetKind, records: Vec<Record>) -> Self {
        self.collections.insert(kind, records);
        self
    }
}

impl RecordSource for InMemorySource {
    fn records(&self, kind: DatasetKind) -> Result<Vec<Record>, DataSourceError> {
        self.collections
            .get(&kind)
            .cloned()
            .ok_or_else(|| DataSourceError {
                dataset: kind,
                location: "memory".to_string(),
                reason: "no record collection declared".to_string(),
            })
    }
}

/// Aggregate, totalize and apply percentages for a single dataset
pub fn assemble_dataset(kind: DatasetKind, records: &[Record]) -> Result<Dataset, PipelineError> {
    let table = aggregate(records, kind.category_field())
        .map_err(|source| PipelineError::InvalidRecord {
            dataset: kind,
            source,
        })?;
    let totals = totalize(&table);
    let aggregated = apply_percentages(table, &totals);

    tracing::debug!(
        dataset = kind.name(),
        records = records.len(),
        groups = aggregated.group_count(),
        total_count = totals.count,
        total_acv = totals.acv,
        "assembled dataset"
    );

    Ok(Dataset { aggregated, totals })
}

/// Build the full response from `source`.
///
/// Every dataset is read and computed independently; the first failure aborts
/// the whole response.
pub fn assemble_response<S: RecordSource + ?Sized>(source: &S) -> Result<Response, PipelineError> {
    let mut datasets = BTreeMap::new();
    for kind in DatasetKind::ALL {
        let records = source.records(kind)?;
        datasets.insert(kind, assemble_dataset(kind, &records)?);
    }
    Ok(Response(datasets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{InvalidRecordError, RecordKey};

    fn full_source() -> InMemorySource {
        InMemorySource::new()
            .with(
                DatasetKind::CustomerTypes,
                vec![
                    Record::new("2024-Q1", CategoryField::CustType, "New Customer")
                        .with_count(5)
                        .with_acv(100_000.0),
                    Record::new("2024-Q1", CategoryField::CustType, "New Customer")
                        .with_count(3)
                        .with_acv(50_000.0),
                ],
            )
            .with(
                DatasetKind::Industries,
                vec![
                    Record::new("2023-Q3", CategoryField::AcctIndustry, "Retail")
                        .with_count(1)
                        .with_acv(300.0),
                    Record::new("2023-Q3", CategoryField::AcctIndustry, "Finance")
                        .with_count(2)
                        .with_acv(700.0),
                ],
            )
            .with(DatasetKind::AcvRanges, Vec::new())
            .with(
                DatasetKind::Teams,
                vec![Record::new("2024-Q2", CategoryField::Team, "Asia").with_count(1)],
            )
    }

    #[test]
    fn test_assemble_all_four_datasets() {
        let response = assemble_response(&full_source()).unwrap();
        assert_eq!(response.len(), 4);

        let customers = response.get(DatasetKind::CustomerTypes).unwrap();
        let group = customers.aggregated.get("2024-Q1", "New Customer").unwrap();
        assert_eq!((group.count, group.acv), (8, 150_000.0));
        assert_eq!(group.acv_percentage, "100.00");

        let industries = response.get(DatasetKind::Industries).unwrap();
        assert_eq!(industries.aggregated.get("2023-Q3", "Retail").unwrap().acv_percentage, "30.00");
        assert_eq!(industries.aggregated.get("2023-Q3", "Finance").unwrap().acv_percentage, "70.00");

        let ranges = response.get(DatasetKind::AcvRanges).unwrap();
        assert!(ranges.aggregated.is_empty());
        assert_eq!(ranges.totals, Totals { count: 0, acv: 0.0 });

        let teams = response.get(DatasetKind::Teams).unwrap();
        assert_eq!(teams.aggregated.get("2024-Q2", "Asia").unwrap().acv_percentage, "0");
    }

    #[test]
    fn test_response_serializes_by_dataset_name() {
        let response = assemble_response(&full_source()).unwrap();
        let value = serde_json::to_value(&response).unwrap();

        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 4);
        for kind in DatasetKind::ALL {
            assert!(keys.contains(&kind.name().to_string()));
        }
        assert_eq!(value["acvRanges"], serde_json::json!({ "aggregated": {}, "totals": { "count": 0, "acv": 0 } }));
        assert_eq!(value["customerTypes"]["totals"], serde_json::json!({ "count": 8, "acv": 150000 }));
    }

    #[test]
    fn test_invalid_record_is_attributed_to_its_dataset() {
        let mut bad = Record::new("2024-Q1", CategoryField::Team, "Asia");
        bad.team = None;
        let source = full_source().with(DatasetKind::Teams, vec![bad]);

        let err = assemble_response(&source).unwrap_err();
        assert_eq!(
            err,
            PipelineError::InvalidRecord {
                dataset: DatasetKind::Teams,
                source: InvalidRecordError {
                    index: 0,
                    missing: RecordKey::Category(CategoryField::Team),
                },
            }
        );
    }

    #[test]
    fn test_missing_source_fails_whole_response() {
        let source = InMemorySource::new().with(DatasetKind::CustomerTypes, Vec::new());
        let err = assemble_response(&source).unwrap_err();
        assert!(matches!(err, PipelineError::DataSource(_)));
        assert_eq!(err.dataset(), DatasetKind::Industries);
    }

    #[test]
    fn test_dataset_kind_names_round_trip() {
        for kind in DatasetKind::ALL {
            assert_eq!(kind.name().parse::<DatasetKind>().unwrap(), kind);
        }
        assert_eq!("TEAMS".parse::<DatasetKind>().unwrap(), DatasetKind::Teams);
        assert!("pipeline".parse::<DatasetKind>().is_err());
    }

    #[test]
    fn test_category_fields_per_dataset() {
        assert_eq!(DatasetKind::CustomerTypes.category_field().column(), "Cust_Type");
        assert_eq!(DatasetKind::Industries.category_field().column(), "Acct_Industry");
        assert_eq!(DatasetKind::AcvRanges.category_field().column(), "ACV_Range");
        assert_eq!(DatasetKind::Teams.category_field().column(), "Team");
    }
}
