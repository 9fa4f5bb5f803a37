//! Presentation of a [`Report`].
//!
//! Supports structured log output, pretty JSON export, and one CSV file per
//! report section (optionally gzip-compressed).

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analyzers::types::BillValidation;
use crate::report::Report;

/// JSON document written by [`write_json`].
#[derive(Serialize)]
struct ReportEnvelope<'a> {
    generated_at: DateTime<Utc>,
    source: &'a str,
    report: &'a Report,
}

#[derive(Serialize)]
struct ConflictRow<'a> {
    bill_no: &'a str,
    terminals: String,
}

#[derive(Serialize)]
struct GapRow<'a> {
    terminal: &'a str,
    observed: usize,
    missing_count: usize,
    missing: String,
    non_integer: String,
    span_exceeded: bool,
}

#[derive(Serialize)]
struct MismatchRow<'a> {
    terminal: &'a str,
    bill_no: &'a str,
    timestamps: String,
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(";")
}

/// Formats an optional metric, showing `n/a` for the no-bills sentinel.
pub fn display_metric(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "n/a".to_string(),
    }
}

/// Logs the report using Rust's debug pretty-print format.
pub fn print_pretty(report: &Report) {
    debug!("{:#?}", report);
}

/// Logs every report section as structured events.
pub fn log_report(report: &Report) {
    let m = &report.metrics;
    info!(
        total_sales = m.total_sales,
        total_bills = m.total_bills,
        total_quantity = m.total_quantity,
        unique_items = m.unique_items,
        avg_basket_value = %display_metric(m.avg_basket_value),
        avg_basket_size = %display_metric(m.avg_basket_size),
        "Basic metrics"
    );

    for b in &report.peak_hours {
        info!(hour = b.hour, bills = b.bills, "Bills by hour");
    }
    if let Some(hour) = report.busiest_hour {
        info!(hour, "Busiest hour");
    }
    for d in &report.weekdays {
        info!(weekday = %d.weekday, bills = d.bills, "Bills by weekday");
    }

    for item in &report.movers.fast {
        let (qty, sales) = (item.total_qty, item.total_sales);
        info!(item = %item.item_name, qty, sales, "Fast mover");
    }
    for item in &report.movers.slow {
        let (qty, sales) = (item.total_qty, item.total_sales);
        info!(item = %item.item_name, qty, sales, "Slow mover");
    }

    if report.affinity.is_empty() {
        info!("No items bought together");
    }
    for p in &report.affinity {
        info!(item_a = %p.item_a, item_b = %p.item_b, count = p.count, "Bought together");
    }

    for t in &report.terminals {
        info!(
            terminal = %t.terminal,
            bills = t.bills,
            qty = t.total_qty,
            sales = t.total_sales,
            "Terminal performance"
        );
    }

    for d in &report.daily_trend {
        info!(date = %d.date, sales = d.total_sales, "Daily sales");
    }

    log_validation(&report.validation);
}

/// Logs the bill-numbering checks; problems are logged at `warn`.
pub fn log_validation(validation: &BillValidation) {
    if validation.conflicts.is_empty() {
        info!("No conflicting bill numbers found");
    }
    for c in &validation.conflicts {
        warn!(
            bill_no = %c.bill_no,
            terminals = %c.terminals.join(", "),
            "Bill number used by multiple terminals"
        );
    }

    for g in &validation.gaps {
        if g.span_exceeded {
            warn!(terminal = %g.terminal, observed = g.observed, "Bill range not checked for gaps");
        } else if g.missing.is_empty() {
            debug!(terminal = %g.terminal, observed = g.observed, "No missing bill numbers");
        } else {
            warn!(
                terminal = %g.terminal,
                missing_count = g.missing.len(),
                missing = %join(&g.missing),
                "Missing bill numbers"
            );
        }
    }

    for m in &validation.timestamp_mismatches {
        warn!(
            terminal = %m.terminal,
            bill_no = %m.bill_no,
            timestamps = %join(&m.timestamps),
            "Bill lines carry different timestamps"
        );
    }
}

/// Writes the report as pretty JSON wrapped with its source and generation
/// time.
pub fn write_json(path: &Path, source: &str, report: &Report) -> Result<()> {
    let envelope = ReportEnvelope {
        generated_at: Utc::now(),
        source,
        report,
    };
    fs::write(path, serde_json::to_vec_pretty(&envelope)?)?;
    info!(path = %path.display(), "JSON report written");
    Ok(())
}

fn serialize_rows<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<W> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| anyhow!("failed to flush CSV writer: {}", e.error()))
}

/// Writes `rows` as a CSV file, replacing any existing file.
///
/// With `gzip` set the output is compressed and `.gz` is appended to the
/// path. Returns the path actually written.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T], gzip: bool) -> Result<PathBuf> {
    let path = if gzip {
        let mut name = path.as_os_str().to_owned();
        name.push(".gz");
        PathBuf::from(name)
    } else {
        path.to_path_buf()
    };

    let file = File::create(&path)?;
    if gzip {
        let encoder = serialize_rows(GzEncoder::new(file, Compression::default()), rows)?;
        encoder.finish()?;
    } else {
        serialize_rows(file, rows)?;
    }

    debug!(path = %path.display(), rows = rows.len(), "CSV section written");
    Ok(path)
}

/// Writes one CSV file per report section into `dir`, creating it if needed.
pub fn write_csv_sections(dir: &Path, report: &Report, gzip: bool) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let v = &report.validation;

    let conflicts: Vec<_> = v
        .conflicts
        .iter()
        .map(|c| ConflictRow {
            bill_no: &c.bill_no,
            terminals: c.terminals.join(";"),
        })
        .collect();
    let gaps: Vec<_> = v
        .gaps
        .iter()
        .map(|g| GapRow {
            terminal: &g.terminal,
            observed: g.observed,
            missing_count: g.missing.len(),
            missing: join(&g.missing),
            non_integer: g.non_integer.join(";"),
            span_exceeded: g.span_exceeded,
        })
        .collect();
    let mismatches: Vec<_> = v
        .timestamp_mismatches
        .iter()
        .map(|m| MismatchRow {
            terminal: &m.terminal,
            bill_no: &m.bill_no,
            timestamps: join(&m.timestamps),
        })
        .collect();

    let written = vec![
        write_csv(&dir.join("metrics.csv"), std::slice::from_ref(&report.metrics), gzip)?,
        write_csv(&dir.join("peak_hours.csv"), &report.peak_hours, gzip)?,
        write_csv(&dir.join("weekdays.csv"), &report.weekdays, gzip)?,
        write_csv(&dir.join("items.csv"), &report.items, gzip)?,
        write_csv(&dir.join("fast_movers.csv"), &report.movers.fast, gzip)?,
        write_csv(&dir.join("slow_movers.csv"), &report.movers.slow, gzip)?,
        write_csv(&dir.join("affinity.csv"), &report.affinity, gzip)?,
        write_csv(&dir.join("terminals.csv"), &report.terminals, gzip)?,
        write_csv(&dir.join("daily_trend.csv"), &report.daily_trend, gzip)?,
        write_csv(&dir.join("bills.csv"), &report.bills, gzip)?,
        write_csv(&dir.join("bill_conflicts.csv"), &conflicts, gzip)?,
        write_csv(&dir.join("missing_bills.csv"), &gaps, gzip)?,
        write_csv(&dir.join("timestamp_mismatches.csv"), &mismatches, gzip)?,
    ];

    info!(dir = %dir.display(), files = written.len(), gzip, "CSV sections written");
    Ok(written)
}
