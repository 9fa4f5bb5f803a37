use std::collections::BTreeMap;

use crate::analyzers::types::TerminalPerformance;
use crate::bills::BillIndex;

/// Bills, quantity and sales per terminal, ordered by terminal name.
pub fn pos_performance(bills: &BillIndex) -> Vec<TerminalPerformance> {
    let mut by_terminal: BTreeMap<&str, TerminalPerformance> = BTreeMap::new();

    for bill in bills.iter() {
        let row = by_terminal
            .entry(bill.terminal.as_str())
            .or_insert_with(|| TerminalPerformance {
                terminal: bill.terminal.clone(),
                bills: 0,
                total_qty: 0.0,
                total_sales: 0.0,
            });
        row.bills += 1;
        row.total_qty += bill.quantity;
        row.total_sales += bill.total;
    }

    by_terminal.into_values().collect()
}
