//! Frequently-bought-together pairs.
//!
//! Each basket of `k` distinct items contributes `k * (k - 1) / 2` unordered
//! pairs. Pairs are canonicalized by sorting the basket, so `(A, B)` and
//! `(B, A)` share one counter.

use std::collections::HashMap;

use crate::analyzers::types::AffinityPair;
use crate::bills::BillIndex;

/// Default number of pairs kept in the report.
pub const DEFAULT_TOP_PAIRS: usize = 20;

/// Counts every co-occurring pair across all baskets, in first-encountered
/// order.
pub fn pair_counts(bills: &BillIndex) -> Vec<AffinityPair> {
    let mut slots: HashMap<(&str, &str), usize> = HashMap::new();
    let mut counts: Vec<((&str, &str), usize)> = Vec::new();

    for bill in bills.iter() {
        if bill.basket.len() < 2 {
            continue;
        }

        let mut items: Vec<&str> = bill.basket.iter().map(String::as_str).collect();
        items.sort_unstable();

        for (i, a) in items.iter().enumerate() {
            for b in &items[i + 1..] {
                let key = (*a, *b);
                match slots.get(&key) {
                    Some(&slot) => counts[slot].1 += 1,
                    None => {
                        slots.insert(key, counts.len());
                        counts.push((key, 1));
                    }
                }
            }
        }
    }

    counts
        .into_iter()
        .map(|((a, b), count)| AffinityPair {
            item_a: a.to_string(),
            item_b: b.to_string(),
            count,
        })
        .collect()
}

/// The `top` most frequent pairs, descending by count. Ties keep
/// first-encountered order.
pub fn basket_affinity(bills: &BillIndex, top: usize) -> Vec<AffinityPair> {
    let mut pairs = pair_counts(bills);
    pairs.sort_by(|a, b| b.count.cmp(&a.count));
    pairs.truncate(top);
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bills::Dataset;
    use crate::transaction::fixtures::line;

    const TS: &str = "2024-03-04 10:00:00";

    fn pair(a: &str, b: &str, count: usize) -> AffinityPair {
        AffinityPair {
            item_a: a.into(),
            item_b: b.into(),
            count,
        }
    }

    #[test]
    fn test_three_item_basket_counts_each_pair_once() {
        let dataset = Dataset::new(vec![
            line("T1", "1", "C", 1.0, 1.0, TS),
            line("T1", "1", "A", 1.0, 1.0, TS),
            line("T1", "1", "B", 4.0, 1.0, TS),
            line("T1", "1", "A", 2.0, 1.0, TS),
        ]);
        assert_eq!(
            pair_counts(&dataset.bills),
            vec![pair("A", "B", 1), pair("A", "C", 1), pair("B", "C", 1)]
        );
    }

    #[test]
    fn test_pairs_are_symmetric() {
        let dataset = Dataset::new(vec![
            line("T1", "1", "Bread", 1.0, 1.0, TS),
            line("T1", "1", "Apple", 1.0, 1.0, TS),
            line("T1", "2", "Apple", 1.0, 1.0, TS),
            line("T1", "2", "Bread", 1.0, 1.0, TS),
        ]);
        assert_eq!(pair_counts(&dataset.bills), vec![pair("Apple", "Bread", 2)]);
    }

    #[test]
    fn test_single_item_baskets_contribute_nothing() {
        let dataset = Dataset::new(vec![
            line("T1", "1", "Apple", 3.0, 1.0, TS),
            line("T1", "2", "Apple", 1.0, 1.0, TS),
        ]);
        assert!(pair_counts(&dataset.bills).is_empty());
    }

    #[test]
    fn test_two_bill_scenario() {
        let dataset = Dataset::new(vec![
            line("T1", "1", "Apple", 2.0, 1.0, TS),
            line("T1", "1", "Bread", 1.0, 1.0, TS),
            line("T1", "2", "Apple", 1.0, 1.0, TS),
            line("T1", "2", "Milk", 1.0, 1.0, TS),
        ]);
        assert_eq!(
            basket_affinity(&dataset.bills, DEFAULT_TOP_PAIRS),
            vec![pair("Apple", "Bread", 1), pair("Apple", "Milk", 1)]
        );
    }

    #[test]
    fn test_top_n_sorted_with_stable_ties() {
        let dataset = Dataset::new(vec![
            line("T1", "1", "X", 1.0, 1.0, TS),
            line("T1", "1", "Y", 1.0, 1.0, TS),
            line("T1", "2", "P", 1.0, 1.0, TS),
            line("T1", "2", "Q", 1.0, 1.0, TS),
            line("T1", "3", "P", 1.0, 1.0, TS),
            line("T1", "3", "Q", 1.0, 1.0, TS),
            line("T1", "4", "M", 1.0, 1.0, TS),
            line("T1", "4", "N", 1.0, 1.0, TS),
        ]);
        assert_eq!(
            basket_affinity(&dataset.bills, 2),
            vec![pair("P", "Q", 2), pair("X", "Y", 1)]
        );
    }
}
