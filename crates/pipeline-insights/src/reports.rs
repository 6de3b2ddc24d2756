//! Report generation (console tables, CSV summaries and JSON export)

use anyhow::{Context, Result};
use csv::Writer;
use pipeline_core::views::{self, SummaryTable};
use pipeline_core::{Dataset, DatasetKind, Response};
use std::path::{Path, PathBuf};
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::constants;

/// Print and write summaries for every dataset (or just `only`)
pub fn generate_all_reports(
    output_dir: &Path,
    response: &Response,
    only: Option<DatasetKind>,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for (kind, dataset) in response.iter() {
        if only.is_some_and(|wanted| wanted != kind) {
            continue;
        }

        println!("{} ({})", kind.title(), kind.name());
        println!("{}\n", render_summary(dataset));

        let path = output_dir.join(summary_file_name(kind));
        write_summary_csv(&path, &views::summary_table(dataset))?;
        println!("  Generated: {}\n", path.display());
        written.push(path);
    }

    Ok(written)
}

/// `<dataset>_summary.csv`
pub fn summary_file_name(kind: DatasetKind) -> String {
    format!("{}{}", kind.name(), constants::SUMMARY_SUFFIX)
}

/// Category-by-quarter table; each cell shows count, ACV and share of total
pub fn render_summary(dataset: &Dataset) -> String {
    let summary = views::summary_table(dataset);

    let mut builder = Builder::default();
    let mut header = vec!["Closed Fiscal Quarter".to_string()];
    header.extend(summary.columns.iter().cloned());
    builder.push_record(header);

    for row in &summary.rows {
        let mut record = vec![row.label.clone()];
        record.extend(row.cells.iter().map(|cell| {
            format!(
                "{}\n{}\n{}%",
                cell.count,
                views::format_acv_thousands(cell.acv),
                cell.acv_percentage
            )
        }));
        builder.push_record(record);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// Write a summary table in long form: one line per (category, quarter) cell
pub fn write_summary_csv(path: &Path, summary: &SummaryTable) -> Result<()> {
    let mut wtr = Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    wtr.write_record(["Category", "Quarter", "Count", "ACV", "ACV_Percentage"])?;

    for row in &summary.rows {
        for (column, cell) in summary.columns.iter().zip(&row.cells) {
            wtr.write_record([
                row.label.as_str(),
                column.as_str(),
                &cell.count.to_string(),
                &format!("{:.2}", cell.acv),
                &cell.acv_percentage,
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Write the response as pretty JSON, same shape the API serves
pub fn export_json(path: &Path, response: &Response) -> Result<()> {
    let json = serde_json::to_string_pretty(response)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
