//! Rollups for charts and summary tables, derived from an assembled [`Dataset`]
//!
//! Everything here reads the dataset's groups and totals; nothing goes back to
//! raw records, so every rendering reconciles with the served response.

use crate::aggregate::{format_percentage, round_half_away_from_zero};
use crate::dataset::Dataset;
use crate::ordered::OrderedMap;

/// Column label of the all-quarters cell in a summary row
pub const TOTAL_LABEL: &str = "Total";

/// Count, ACV and a rendered percentage for one slice
#[derive(Debug, Clone, PartialEq)]
pub struct Share {
    pub label: String,
    pub count: u64,
    pub acv: f64,
    pub acv_percentage: String,
}

/// One quarter's totals and its per-category segments
#[derive(Debug, Clone, PartialEq)]
pub struct QuarterSummary {
    pub quarter: String,
    pub count: u64,
    pub acv: f64,
    /// Segment percentages are relative to this quarter's ACV
    pub segments: Vec<Share>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryCell {
    pub count: u64,
    pub acv: f64,
    /// Share of the dataset total ACV
    pub acv_percentage: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub label: String,
    /// One cell per quarter column, then the all-quarters cell
    pub cells: Vec<SummaryCell>,
}

/// Category-by-quarter grid with a trailing Total column and Total row
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    /// Quarter labels in ascending order, then [`TOTAL_LABEL`]
    pub columns: Vec<String>,
    pub rows: Vec<SummaryRow>,
}

/// Quarter labels sorted ascending; `YYYY-Qn` labels sort chronologically
pub fn sorted_quarters(dataset: &Dataset) -> Vec<String> {
    let mut quarters: Vec<String> = dataset
        .aggregated
        .quarter_labels()
        .map(str::to_string)
        .collect();
    quarters.sort();
    quarters
}

/// Each category summed across all quarters, as a share of the dataset total
pub fn category_rollup(dataset: &Dataset) -> Vec<Share> {
    let mut sums: OrderedMap<(u64, f64)> = OrderedMap::new();
    for (_, category, group) in dataset.aggregated.groups() {
        let entry = sums.entry_or_default(category);
        entry.0 += group.count;
        entry.1 += group.acv;
    }

    sums.iter()
        .map(|(category, &(count, acv))| Share {
            label: category.to_string(),
            count,
            acv,
            acv_percentage: format_percentage(acv, dataset.totals.acv),
        })
        .collect()
}

/// Per-quarter totals with each category's share of its quarter
pub fn quarter_rollup(dataset: &Dataset) -> Vec<QuarterSummary> {
    dataset
        .aggregated
        .quarters()
        .map(|(quarter, groups)| {
            let count: u64 = groups.values().map(|g| g.count).sum();
            let acv: f64 = groups.values().map(|g| g.acv).sum();
            let segments = groups
                .iter()
                .map(|(category, group)| Share {
                    label: category.to_string(),
                    count: group.count,
                    acv: group.acv,
                    acv_percentage: format_percentage(group.acv, acv),
                })
                .collect();

            QuarterSummary {
                quarter: quarter.to_string(),
                count,
                acv,
                segments,
            }
        })
        .collect()
}

/// Category rows across sorted quarters, closed by a Total row
pub fn summary_table(dataset: &Dataset) -> SummaryTable {
    let quarters = sorted_quarters(dataset);
    let total_acv = dataset.totals.acv;

    let cell = |count: u64, acv: f64| SummaryCell {
        count,
        acv,
        acv_percentage: format_percentage(acv, total_acv),
    };

    let mut rows: Vec<SummaryRow> = category_rollup(dataset)
        .into_iter()
        .map(|share| {
            let mut cells: Vec<SummaryCell> = quarters
                .iter()
                .map(|quarter| match dataset.aggregated.get(quarter, &share.label) {
                    Some(group) => cell(group.count, group.acv),
                    None => cell(0, 0.0),
                })
                .collect();
            cells.push(cell(share.count, share.acv));
            SummaryRow {
                label: share.label,
                cells,
            }
        })
        .collect();

    let by_quarter = quarter_rollup(dataset);
    let mut total_cells: Vec<SummaryCell> = quarters
        .iter()
        .map(|quarter| {
            by_quarter
                .iter()
                .find(|summary| &summary.quarter == quarter)
                .map_or_else(|| cell(0, 0.0), |summary| cell(summary.count, summary.acv))
        })
        .collect();
    total_cells.push(cell(dataset.totals.count, total_acv));
    rows.push(SummaryRow {
        label: TOTAL_LABEL.to_string(),
        cells: total_cells,
    });

    let mut columns = quarters;
    columns.push(TOTAL_LABEL.to_string());
    SummaryTable { columns, rows }
}

/// ACV in thousands, e.g. `$150K`
pub fn format_acv_thousands(acv: f64) -> String {
    let thousands = round_half_away_from_zero(acv / 1000.0, 0);
    // avoid rendering "$-0K"
    let thousands = if thousands == 0.0 { 0.0 } else { thousands };
    format!("${}K", thousands)
}
