//! Bill grouping shared by every basket-level report.
//!
//! A bill is all lines sharing `(terminal, bill_no)`. The index is built once
//! per [`Dataset`] so affinity, validation and basket metrics never regroup
//! the raw lines themselves.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::debug;

use crate::transaction::NormalizedLine;

/// One bill and its basket.
#[derive(Debug, Clone, PartialEq)]
pub struct Bill {
    pub terminal: String,
    pub bill_no: String,
    /// Distinct item names, in order of first appearance.
    pub basket: Vec<String>,
    pub total: f64,
    pub quantity: f64,
    /// Distinct timestamps seen on this bill's lines, in input order.
    pub timestamps: Vec<NaiveDateTime>,
}

/// Flat per-bill row for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillSummary {
    pub terminal: String,
    pub bill_no: String,
    pub bill_total: f64,
    pub items_in_bill: f64,
    pub distinct_items: usize,
}

impl From<&Bill> for BillSummary {
    fn from(bill: &Bill) -> Self {
        Self {
            terminal: bill.terminal.clone(),
            bill_no: bill.bill_no.clone(),
            bill_total: bill.total,
            items_in_bill: bill.quantity,
            distinct_items: bill.basket.len(),
        }
    }
}

/// Bills in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillIndex {
    bills: Vec<Bill>,
    by_key: HashMap<(String, String), usize>,
}

impl BillIndex {
    pub fn build(lines: &[NormalizedLine]) -> Self {
        let mut index = BillIndex::default();

        for line in lines {
            let key = (line.terminal().to_string(), line.bill_no().to_string());
            let slot = match index.by_key.get(&key) {
                Some(&slot) => slot,
                None => {
                    index.bills.push(Bill {
                        terminal: key.0.clone(),
                        bill_no: key.1.clone(),
                        basket: Vec::new(),
                        total: 0.0,
                        quantity: 0.0,
                        timestamps: Vec::new(),
                    });
                    index.by_key.insert(key, index.bills.len() - 1);
                    index.bills.len() - 1
                }
            };

            let bill = &mut index.bills[slot];
            bill.total += line.line.line_total;
            bill.quantity += line.line.qty;
            if !bill.basket.iter().any(|item| item == line.item_name()) {
                bill.basket.push(line.item_name().to_string());
            }
            if !bill.timestamps.contains(&line.timestamp) {
                bill.timestamps.push(line.timestamp);
            }
        }

        debug!(bills = index.bills.len(), "Bill index built");
        index
    }

    pub fn len(&self) -> usize {
        self.bills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bills.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bill> {
        self.bills.iter()
    }

    pub fn summaries(&self) -> Vec<BillSummary> {
        self.bills.iter().map(BillSummary::from).collect()
    }
}

/// Normalized lines plus their bill index, shared read-only by all
/// aggregators.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub lines: Vec<NormalizedLine>,
    pub bills: BillIndex,
}

impl Dataset {
    pub fn new(lines: Vec<NormalizedLine>) -> Self {
        let bills = BillIndex::build(&lines);
        Self { lines, bills }
    }
}
