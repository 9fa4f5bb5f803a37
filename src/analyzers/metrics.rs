use std::collections::HashSet;

use crate::analyzers::types::BasicMetrics;
use crate::analyzers::utility::{ensure_finite, per_unit};
use crate::bills::Dataset;
use crate::errors::AggregationError;

/// Computes total sales, quantity, bill count and basket averages.
///
/// Average basket value and size are `None` for an export with no bills.
pub fn basic_metrics(dataset: &Dataset) -> Result<BasicMetrics, AggregationError> {
    let total_sales = ensure_finite(
        "total_sales",
        dataset.lines.iter().map(|l| l.line.line_total).sum(),
    )?;
    let total_quantity = ensure_finite(
        "total_quantity",
        dataset.lines.iter().map(|l| l.line.qty).sum(),
    )?;
    let total_bills = dataset.bills.len();
    let unique_items = dataset
        .lines
        .iter()
        .map(|l| l.item_name())
        .collect::<HashSet<_>>()
        .len();

    Ok(BasicMetrics {
        total_sales,
        total_quantity,
        total_bills,
        total_lines: dataset.lines.len(),
        unique_items,
        avg_basket_value: per_unit(total_sales, total_bills),
        avg_basket_size: per_unit(total_quantity, total_bills),
    })
}
