//! Exported pipeline rows and the category column selector

use serde::{Deserialize, Serialize};
use std::fmt;

/// One exported pipeline row.
///
/// Each export carries a single category column (customer type, industry,
/// ACV range or team); the other category fields are absent for that file.
/// `count` and `acv` are optional in the export and contribute zero when missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "closed_fiscal_quarter", default, skip_serializing_if = "Option::is_none")]
    pub fiscal_quarter: Option<String>,
    #[serde(rename = "Cust_Type", default, skip_serializing_if = "Option::is_none")]
    pub cust_type: Option<String>,
    #[serde(rename = "Acct_Industry", default, skip_serializing_if = "Option::is_none")]
    pub acct_industry: Option<String>,
    #[serde(rename = "ACV_Range", default, skip_serializing_if = "Option::is_none")]
    pub acv_range: Option<String>,
    #[serde(rename = "Team", default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acv: Option<f64>,
}

impl Record {
    /// Build a record with the given quarter and a value in one category column
    pub fn new(quarter: &str, field: CategoryField, category: &str) -> Self {
        let mut record = Record {
            fiscal_quarter: Some(quarter.to_string()),
            ..Default::default()
        };
        *field.slot_mut(&mut record) = Some(category.to_string());
        record
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_acv(mut self, acv: f64) -> Self {
        self.acv = Some(acv);
        self
    }
}

/// Which record column holds the category for a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryField {
    CustType,
    AcctIndustry,
    AcvRange,
    Team,
}

impl CategoryField {
    /// Column name as it appears in the export
    pub fn column(self) -> &'static str {
        match self {
            CategoryField::CustType => "Cust_Type",
            CategoryField::AcctIndustry => "Acct_Industry",
            CategoryField::AcvRange => "ACV_Range",
            CategoryField::Team => "Team",
        }
    }

    /// Category value of `record` for this column, if present
    pub fn resolve(self, record: &Record) -> Option<&str> {
        let value = match self {
            CategoryField::CustType => &record.cust_type,
            CategoryField::AcctIndustry => &record.acct_industry,
            CategoryField::AcvRange => &record.acv_range,
            CategoryField::Team => &record.team,
        };
        value.as_deref()
    }

    fn slot_mut(self, record: &mut Record) -> &mut Option<String> {
        match self {
            CategoryField::CustType => &mut record.cust_type,
            CategoryField::AcctIndustry => &mut record.acct_industry,
            CategoryField::AcvRange => &mut record.acv_range,
            CategoryField::Team => &mut record.team,
        }
    }
}

impl fmt::Display for CategoryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}
