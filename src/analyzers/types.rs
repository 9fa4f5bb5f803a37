//! Output tables produced by the aggregators.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Headline totals for the whole export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicMetrics {
    pub total_sales: f64,
    pub total_quantity: f64,
    pub total_bills: usize,
    pub total_lines: usize,
    pub unique_items: usize,
    /// `None` when there are no bills.
    pub avg_basket_value: Option<f64>,
    /// Mean quantity per bill; `None` when there are no bills.
    pub avg_basket_size: Option<f64>,
}

/// Distinct bills started in one hour of the day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourBucket {
    pub hour: u32,
    pub bills: usize,
}

/// Distinct bills per day of the week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayBucket {
    pub weekday: String,
    pub bills: usize,
}

/// Item-level totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSummary {
    pub item_name: String,
    pub total_qty: f64,
    pub total_sales: f64,
    pub mean_rate: f64,
    pub bills: usize,
}

/// Head and tail of the quantity-sorted item table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemMovers {
    pub fast: Vec<ItemSummary>,
    pub slow: Vec<ItemSummary>,
}

/// Number of baskets containing both items; `item_a < item_b`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AffinityPair {
    pub item_a: String,
    pub item_b: String,
    pub count: usize,
}

/// Per-terminal totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerminalPerformance {
    pub terminal: String,
    pub bills: usize,
    pub total_qty: f64,
    pub total_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySales {
    pub date: NaiveDate,
    pub total_sales: f64,
}

/// A bill number issued by more than one terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillConflict {
    pub bill_no: String,
    pub terminals: Vec<String>,
}

/// Gaps in one terminal's bill numbering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerminalGaps {
    pub terminal: String,
    /// Distinct bill numbers seen, integer or not.
    pub observed: usize,
    pub missing: Vec<i64>,
    /// Bill numbers that are not integers and were left out of the range.
    pub non_integer: Vec<String>,
    /// Set when `max - min` exceeded the configured span limit.
    pub span_exceeded: bool,
}

/// A bill whose lines disagree on the transaction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimestampMismatch {
    pub terminal: String,
    pub bill_no: String,
    pub timestamps: Vec<NaiveDateTime>,
}

/// Results of every bill-numbering integrity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillValidation {
    pub conflicts: Vec<BillConflict>,
    pub gaps: Vec<TerminalGaps>,
    pub timestamp_mismatches: Vec<TimestampMismatch>,
}

impl BillValidation {
    pub fn missing_count(&self) -> usize {
        self.gaps.iter().map(|g| g.missing.len()).sum()
    }

    /// Terminals whose bill range was too wide to list its gaps.
    pub fn span_exceeded_count(&self) -> usize {
        self.gaps.iter().filter(|g| g.span_exceeded).count()
    }

    /// True when no bill number is shared across terminals and every terminal
    /// was checked and found without a numbering gap. A terminal whose range
    /// was too wide to check is not clean.
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty() && self.missing_count() == 0 && self.span_exceeded_count() == 0
    }
}
