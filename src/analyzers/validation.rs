//! Bill-numbering integrity checks.
//!
//! All checks are read-only over the [`BillIndex`], whose bill numbers are
//! already canonical, so `"100"` and `"100.0"` name the same bill. The gap
//! check assumes each terminal issues contiguous integer bill numbers;
//! identifiers that are not integers are reported separately rather than
//! coerced.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::analyzers::types::{BillConflict, BillValidation, TerminalGaps, TimestampMismatch};
use crate::bills::BillIndex;
use crate::normalize::parse_bill_number;

/// Default upper bound on `max - min` before a terminal's gap listing is
/// skipped.
pub const DEFAULT_MAX_GAP_SPAN: u64 = 1_000_000;

#[derive(Debug, Clone)]
pub struct ValidationOptions {
    pub max_gap_span: u64,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            max_gap_span: DEFAULT_MAX_GAP_SPAN,
        }
    }
}

/// Runs the conflict, gap and timestamp-consistency checks.
#[tracing::instrument(skip_all, fields(bills = bills.len()))]
pub fn validate_bills(bills: &BillIndex, options: &ValidationOptions) -> BillValidation {
    let validation = BillValidation {
        conflicts: bill_conflicts(bills),
        gaps: missing_bills(bills, options.max_gap_span),
        timestamp_mismatches: timestamp_mismatches(bills),
    };

    debug!(
        conflicts = validation.conflicts.len(),
        missing = validation.missing_count(),
        timestamp_mismatches = validation.timestamp_mismatches.len(),
        "Bill validation complete"
    );
    validation
}

/// Bill numbers used by more than one terminal, in order of first use.
pub fn bill_conflicts(bills: &BillIndex) -> Vec<BillConflict> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut usage: Vec<(&str, BTreeSet<&str>)> = Vec::new();

    for bill in bills.iter() {
        let slot = *slots.entry(bill.bill_no.as_str()).or_insert_with(|| {
            usage.push((bill.bill_no.as_str(), BTreeSet::new()));
            usage.len() - 1
        });
        usage[slot].1.insert(bill.terminal.as_str());
    }

    usage
        .into_iter()
        .filter(|(_, terminals)| terminals.len() > 1)
        .map(|(bill_no, terminals)| BillConflict {
            bill_no: bill_no.to_string(),
            terminals: terminals.into_iter().map(str::to_string).collect(),
        })
        .collect()
}

/// Missing bill numbers per terminal, ordered by terminal name.
pub fn missing_bills(bills: &BillIndex, max_span: u64) -> Vec<TerminalGaps> {
    let mut by_terminal: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for bill in bills.iter() {
        by_terminal
            .entry(bill.terminal.as_str())
            .or_default()
            .push(bill.bill_no.as_str());
    }

    by_terminal
        .into_iter()
        .map(|(terminal, bill_nos)| terminal_gaps(terminal, &bill_nos, max_span))
        .collect()
}

fn terminal_gaps(terminal: &str, bill_nos: &[&str], max_span: u64) -> TerminalGaps {
    let mut observed = BTreeSet::new();
    let mut non_integer = Vec::new();
    for bill_no in bill_nos {
        match parse_bill_number(bill_no) {
            Some(n) => {
                observed.insert(n);
            }
            None => non_integer.push(bill_no.to_string()),
        }
    }

    if !non_integer.is_empty() {
        warn!(
            terminal,
            count = non_integer.len(),
            "Non-integer bill numbers; excluded from gap check"
        );
    }

    let distinct = observed.len() + non_integer.len();
    let mut gaps = TerminalGaps {
        terminal: terminal.to_string(),
        observed: distinct,
        missing: Vec::new(),
        non_integer,
        span_exceeded: false,
    };

    let (Some(&min), Some(&max)) = (observed.first(), observed.last()) else {
        return gaps;
    };

    let span = max.abs_diff(min);
    if span > max_span {
        warn!(terminal, min, max, span, "Bill number range too wide; gaps not listed");
        gaps.span_exceeded = true;
        return gaps;
    }

    gaps.missing = (min..=max).filter(|n| !observed.contains(n)).collect();
    gaps
}

/// Bills whose lines carry more than one distinct timestamp.
pub fn timestamp_mismatches(bills: &BillIndex) -> Vec<TimestampMismatch> {
    bills
        .iter()
        .filter(|bill| bill.timestamps.len() > 1)
        .map(|bill| TimestampMismatch {
            terminal: bill.terminal.clone(),
            bill_no: bill.bill_no.clone(),
            timestamps: bill.timestamps.clone(),
        })
        .collect()
}
