//! Runs the whole pipeline and collects every aggregate into one [`Report`].

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::analyzers::affinity::{DEFAULT_TOP_PAIRS, basket_affinity};
use crate::analyzers::items::{item_summary, movers};
use crate::analyzers::metrics::basic_metrics;
use crate::analyzers::peak_hour::{busiest_hour, peak_hours, weekday_distribution};
use crate::analyzers::terminals::pos_performance;
use crate::analyzers::trend::daily_trend;
use crate::analyzers::types::{
    AffinityPair, BasicMetrics, BillValidation, DailySales, HourBucket, ItemMovers, ItemSummary,
    TerminalPerformance, WeekdayBucket,
};
use crate::analyzers::validation::{ValidationOptions, validate_bills};
use crate::bills::{BillSummary, Dataset};
use crate::errors::PipelineError;
use crate::loader::{LoadOptions, load_file};
use crate::normalize::normalize;

/// Default size of the fast and slow mover lists.
pub const DEFAULT_MOVERS: usize = 10;

/// Tunables for report generation.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub top_pairs: usize,
    pub movers: usize,
    pub validation: ValidationOptions,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_pairs: DEFAULT_TOP_PAIRS,
            movers: DEFAULT_MOVERS,
            validation: ValidationOptions::default(),
        }
    }
}

/// Every aggregate computed for one export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub metrics: BasicMetrics,
    pub peak_hours: Vec<HourBucket>,
    pub busiest_hour: Option<u32>,
    pub weekdays: Vec<WeekdayBucket>,
    pub items: Vec<ItemSummary>,
    pub movers: ItemMovers,
    pub affinity: Vec<AffinityPair>,
    pub terminals: Vec<TerminalPerformance>,
    pub daily_trend: Vec<DailySales>,
    pub bills: Vec<BillSummary>,
    pub validation: BillValidation,
}

impl Report {
    /// Computes every section from an already-normalized dataset.
    #[tracing::instrument(
        skip_all,
        fields(lines = dataset.lines.len(), bills = dataset.bills.len())
    )]
    pub fn build(dataset: &Dataset, options: &ReportOptions) -> Result<Self, PipelineError> {
        let metrics = basic_metrics(dataset)?;
        let peak_hours = peak_hours(dataset);
        let busiest_hour = busiest_hour(&peak_hours).map(|b| b.hour);
        let items = item_summary(dataset);
        let movers = movers(&items, options.movers);

        Ok(Report {
            metrics,
            busiest_hour,
            peak_hours,
            weekdays: weekday_distribution(dataset),
            movers,
            items,
            affinity: basket_affinity(&dataset.bills, options.top_pairs),
            terminals: pos_performance(&dataset.bills),
            daily_trend: daily_trend(dataset),
            bills: dataset.bills.summaries(),
            validation: validate_bills(&dataset.bills, &options.validation),
        })
    }
}

/// Loads and normalizes an export, then indexes its bills.
///
/// # Errors
///
/// Fails with the load or normalization error; no partial dataset is
/// returned.
pub fn load_dataset(
    path: &Path,
    load_options: &LoadOptions,
    timestamp_format: Option<&str>,
) -> Result<Dataset, PipelineError> {
    let lines = load_file(path, load_options)?;
    let normalized = normalize(lines, timestamp_format)?;
    let dataset = Dataset::new(normalized);

    info!(
        lines = dataset.lines.len(),
        bills = dataset.bills.len(),
        "Dataset ready"
    );
    Ok(dataset)
}

/// Load -> normalize -> aggregate in one call.
pub fn run_pipeline(
    path: &Path,
    load_options: &LoadOptions,
    timestamp_format: Option<&str>,
    options: &ReportOptions,
) -> Result<Report, PipelineError> {
    let dataset = load_dataset(path, load_options, timestamp_format)?;
    Report::build(&dataset, options)
}
