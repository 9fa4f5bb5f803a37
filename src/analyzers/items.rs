use std::collections::{HashMap, HashSet};

use crate::analyzers::types::{ItemMovers, ItemSummary};
use crate::analyzers::utility::mean;
use crate::bills::Dataset;

#[derive(Default)]
struct ItemAccumulator<'a> {
    qty: f64,
    sales: f64,
    rates: Vec<f64>,
    bills: HashSet<(&'a str, &'a str)>,
}

/// Per-item quantity, sales, mean rate and distinct bills, sorted by total
/// quantity descending.
///
/// The sort is stable, so items with equal quantity keep the order in which
/// they first appear in the export.
pub fn item_summary(dataset: &Dataset) -> Vec<ItemSummary> {
    let mut order: Vec<&str> = Vec::new();
    let mut acc: HashMap<&str, ItemAccumulator> = HashMap::new();

    for line in &dataset.lines {
        let name = line.item_name();
        let entry = acc.entry(name).or_insert_with(|| {
            order.push(name);
            ItemAccumulator::default()
        });
        entry.qty += line.line.qty;
        entry.sales += line.line.line_total;
        entry.rates.push(line.line.rate);
        entry.bills.insert(line.bill_key());
    }

    let mut rows: Vec<ItemSummary> = order
        .into_iter()
        .filter_map(|name| {
            acc.remove(name).map(|a| ItemSummary {
                item_name: name.to_string(),
                total_qty: a.qty,
                total_sales: a.sales,
                mean_rate: mean(&a.rates),
                bills: a.bills.len(),
            })
        })
        .collect();

    rows.sort_by(|a, b| b.total_qty.total_cmp(&a.total_qty));
    rows
}

/// Takes the top and bottom `n` rows of a quantity-sorted item table.
pub fn movers(summary: &[ItemSummary], n: usize) -> ItemMovers {
    let fast = summary.iter().take(n).cloned().collect();
    let slow = summary[summary.len().saturating_sub(n)..].to_vec();
    ItemMovers { fast, slow }
}
