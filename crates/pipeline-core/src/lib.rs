//! Sales pipeline aggregation core
//!
//! Groups exported pipeline records by fiscal quarter and category, sums
//! deal counts and ACV per group, and derives each group's share of the
//! dataset's total ACV. Four fixed datasets are assembled into a single
//! [`Response`]; the views in [`views`] derive everything a chart or summary
//! table needs from that response so totals reconcile across every rendering.
//!
//! The crate does no I/O. Records are supplied through [`RecordSource`].

mod aggregate;
mod dataset;
mod error;
mod ordered;
mod record;
pub mod views;

pub use aggregate::{
    AggregatedTable, CategoryGroups, Group, Totals, aggregate, apply_percentages,
    format_percentage, round_half_away_from_zero, totalize,
};
pub use dataset::{
    Dataset, DatasetKind, InMemorySource, RecordSource, Response, assemble_dataset,
    assemble_response,
};
pub use error::{DataSourceError, InvalidRecordError, PipelineError, RecordKey};
pub use ordered::OrderedMap;
pub use record::{CategoryField, Record};
