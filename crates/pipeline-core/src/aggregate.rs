//! Quarter-by-category aggregation, totals and ACV percentages

use serde::{Serialize, Serializer};

use crate::error::{InvalidRecordError, RecordKey};
use crate::ordered::OrderedMap;
use crate::record::{CategoryField, Record};

/// Percentage rendered for every group when the dataset total ACV is zero
pub const ZERO_TOTAL_PERCENTAGE: &str = "0";

/// Decimal places of rendered percentages
const PERCENTAGE_DECIMALS: i32 = 2;

/// One (quarter, category) bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub count: u64,
    #[serde(serialize_with = "serialize_amount")]
    pub acv: f64,
    /// Share of the dataset's total ACV, filled in by [`apply_percentages`]
    pub acv_percentage: String,
}

impl Default for Group {
    fn default() -> Self {
        Self {
            count: 0,
            acv: 0.0,
            acv_percentage: ZERO_TOTAL_PERCENTAGE.to_string(),
        }
    }
}

/// Groups of one quarter, keyed by category
pub type CategoryGroups = OrderedMap<Group>;

/// Groups keyed by quarter, then category, both in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AggregatedTable(OrderedMap<CategoryGroups>);

impl AggregatedTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one observation into the table.
    ///
    /// Creates the group on first sight of `(quarter, category)` and adds the
    /// measures on every call.
    pub fn merge(mut self, quarter: &str, category: &str, count: u64, acv: f64) -> Self {
        let group = self.0.entry_or_default(quarter).entry_or_default(category);
        group.count += count;
        group.acv += acv;
        self
    }

    pub fn get(&self, quarter: &str, category: &str) -> Option<&Group> {
        self.0.get(quarter).and_then(|groups| groups.get(category))
    }

    pub fn quarter(&self, quarter: &str) -> Option<&CategoryGroups> {
        self.0.get(quarter)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Quarter labels in first-seen order
    pub fn quarter_labels(&self) -> impl Iterator<Item = &str> {
        self.0.keys()
    }

    pub fn quarters(&self) -> impl Iterator<Item = (&str, &CategoryGroups)> {
        self.0.iter()
    }

    /// Every group as `(quarter, category, group)`
    pub fn groups(&self) -> impl Iterator<Item = (&str, &str, &Group)> {
        self.0.iter().flat_map(|(quarter, groups)| {
            groups
                .iter()
                .map(move |(category, group)| (quarter, category, group))
        })
    }

    pub fn group_count(&self) -> usize {
        self.0.values().map(OrderedMap::len).sum()
    }

    fn groups_mut(&mut self) -> impl Iterator<Item = &mut Group> {
        self.0.values_mut().flat_map(|groups| groups.values_mut())
    }
}

/// Dataset-wide sums
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub count: u64,
    #[serde(serialize_with = "serialize_amount")]
    pub acv: f64,
}

/// Group `records` by fiscal quarter and the category held in `field`.
///
/// Missing `count`/`acv` contribute zero. A record without a quarter or
/// category value aborts the whole aggregation.
pub fn aggregate(
    records: &[Record],
    field: CategoryField,
) -> Result<AggregatedTable, InvalidRecordError> {
    records
        .iter()
        .enumerate()
        .try_fold(AggregatedTable::new(), |table, (index, record)| {
            let quarter = record
                .fiscal_quarter
                .as_deref()
                .ok_or(InvalidRecordError {
                    index,
                    missing: RecordKey::Quarter,
                })?;
            let category = field.resolve(record).ok_or(InvalidRecordError {
                index,
                missing: RecordKey::Category(field),
            })?;

            Ok(table.merge(
                quarter,
                category,
                record.count.unwrap_or(0),
                record.acv.unwrap_or(0.0),
            ))
        })
}

/// Sum count and ACV over every group of `table`
pub fn totalize(table: &AggregatedTable) -> Totals {
    table
        .groups()
        .fold(Totals::default(), |totals, (_, _, group)| Totals {
            count: totals.count + group.count,
            acv: totals.acv + group.acv,
        })
}

/// Set every group's `acv_percentage` to its share of `totals.acv`
pub fn apply_percentages(mut table: AggregatedTable, totals: &Totals) -> AggregatedTable {
    for group in table.groups_mut() {
        group.acv_percentage = format_percentage(group.acv, totals.acv);
    }
    table
}

/// `part` as a percentage of `whole`, two decimals.
///
/// A zero `whole` renders as `"0"` without dividing.
pub fn format_percentage(part: f64, whole: f64) -> String {
    if whole == 0.0 {
        return ZERO_TOTAL_PERCENTAGE.to_string();
    }
    let pct = round_half_away_from_zero(part / whole * 100.0, PERCENTAGE_DECIMALS);
    // avoid rendering "-0.00"
    let pct = if pct == 0.0 { 0.0 } else { pct };
    format!("{:.*}", PERCENTAGE_DECIMALS as usize, pct)
}

pub fn round_half_away_from_zero(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Whole amounts serialize as JSON integers, fractional ones as floats
fn serialize_amount<S: Serializer>(amount: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if amount.fract() == 0.0 && amount.abs() <= MAX_SAFE_INTEGER {
        serializer.serialize_i64(*amount as i64)
    } else {
        serializer.serialize_f64(*amount)
    }
}
