//! Row types flowing through the pipeline.

use chrono::{NaiveDate, NaiveDateTime, Weekday};
use serde::Serialize;

/// One row of the POS export, typed but not yet normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionLine {
    /// 1-based data row number in the source file (header excluded).
    pub row: usize,
    pub terminal: String,
    pub bill_no: String,
    pub item_name: String,
    pub barcode: Option<String>,
    pub qty: f64,
    pub rate: f64,
    pub line_total: f64,
    pub timestamp: String,
}

/// A [`TransactionLine`] with its time buckets derived.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedLine {
    pub line: TransactionLine,
    pub timestamp: NaiveDateTime,
    pub hour: u32,
    pub weekday: Weekday,
    pub date: NaiveDate,
}

impl NormalizedLine {
    pub fn terminal(&self) -> &str {
        &self.line.terminal
    }

    pub fn bill_no(&self) -> &str {
        &self.line.bill_no
    }

    pub fn item_name(&self) -> &str {
        &self.line.item_name
    }

    /// Composite key identifying the bill this line belongs to.
    pub fn bill_key(&self) -> (&str, &str) {
        (&self.line.terminal, &self.line.bill_no)
    }
}

/// Full English day name, as shown in weekday reports.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
