//! Sales Pipeline Insights
//!
//! Aggregates exported pipeline records by fiscal quarter and category and
//! either prints summary reports, exports the aggregated JSON, or serves it
//! over HTTP to the charting frontend.

mod config;
mod constants;
mod reports;
mod server;
mod source;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pipeline_core::{DatasetKind, assemble_response};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use config::{Config, FileConfig};
use source::JsonFileSource;

#[derive(Parser, Debug)]
#[command(name = "pipeline-insights")]
#[command(about = "Quarter-by-category sales pipeline aggregates")]
struct Args {
    /// Config file (defaults apply when it does not exist)
    #[arg(short, long, default_value = constants::CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Directory holding the exported record files (overrides config)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output directory for generated CSV reports
    #[arg(short, long, default_value = "./output", global = true)]
    output_dir: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print summary tables and write CSV summaries
    Report {
        /// Only report one dataset (customerTypes, industries, acvRanges, teams)
        #[arg(long)]
        dataset: Option<DatasetKind>,
    },

    /// Write the aggregated response as JSON
    Export {
        /// Path to output JSON file
        file: PathBuf,
    },

    /// Serve the aggregated response over HTTP
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let file_config = FileConfig::load_or_default(&args.config)?;
    let port = match &args.command {
        Some(Command::Serve { port }) => *port,
        _ => None,
    };
    let config = Config::from_file(file_config, args.data_dir.clone(), port)?;
    let source = JsonFileSource::new(&config);

    match args.command {
        Some(Command::Serve { .. }) => server::serve(&config, server::AppState::new(source)).await,
        Some(Command::Export { file }) => run_export(&source, &file),
        Some(Command::Report { dataset }) => run_report(&source, &config, &args.output_dir, dataset),
        // No subcommand - print every report
        None => run_report(&source, &config, &args.output_dir, None),
    }
}

/// Run the report workflow
fn run_report(
    source: &JsonFileSource,
    config: &Config,
    output_dir: &std::path::Path,
    only: Option<DatasetKind>,
) -> Result<()> {
    println!("Sales Pipeline Insights");
    println!("=======================\n");
    println!("Data directory: {}", config.data_dir.display());
    println!(
        "Generated at: {}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    println!("Aggregating datasets...");
    let response = assemble_response(source)?;
    for (kind, dataset) in response.iter() {
        println!(
            "  {}: {} groups across {} quarters, {} deals, {} ACV",
            kind.name(),
            dataset.aggregated.group_count(),
            dataset.aggregated.quarter_labels().count(),
            dataset.totals.count,
            pipeline_core::views::format_acv_thousands(dataset.totals.acv)
        );
    }
    println!();

    let written = reports::generate_all_reports(output_dir, &response, only)?;
    println!("Wrote {} report(s) to {}", written.len(), output_dir.display());
    Ok(())
}

/// Write the full response to `file`
fn run_export(source: &JsonFileSource, file: &std::path::Path) -> Result<()> {
    let response = assemble_response(source)?;
    reports::export_json(file, &response)?;
    println!("Exported {} datasets to {}", response.len(), file.display());
    Ok(())
}
