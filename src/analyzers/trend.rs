use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::analyzers::types::DailySales;
use crate::bills::Dataset;

/// Total sales per calendar day, oldest first.
pub fn daily_trend(dataset: &Dataset) -> Vec<DailySales> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for line in &dataset.lines {
        *by_date.entry(line.date).or_default() += line.line.line_total;
    }

    by_date
        .into_iter()
        .map(|(date, total_sales)| DailySales { date, total_sales })
        .collect()
}
