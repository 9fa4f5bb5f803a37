use std::collections::{BTreeMap, HashSet};

use crate::analyzers::types::{HourBucket, WeekdayBucket};
use crate::bills::Dataset;
use crate::transaction::weekday_name;

/// Distinct bills per hour of day, ordered by hour. Only observed hours appear.
pub fn peak_hours(dataset: &Dataset) -> Vec<HourBucket> {
    let mut by_hour: BTreeMap<u32, HashSet<(&str, &str)>> = BTreeMap::new();
    for line in &dataset.lines {
        by_hour.entry(line.hour).or_default().insert(line.bill_key());
    }

    by_hour
        .into_iter()
        .map(|(hour, bills)| HourBucket {
            hour,
            bills: bills.len(),
        })
        .collect()
}

/// The hour with the most bills; the earliest hour wins a tie.
pub fn busiest_hour(buckets: &[HourBucket]) -> Option<&HourBucket> {
    buckets
        .iter()
        .fold(None, |best: Option<&HourBucket>, b| match best {
            Some(cur) if cur.bills >= b.bills => Some(cur),
            _ => Some(b),
        })
}

/// Distinct bills per weekday, Monday first. Only observed days appear.
pub fn weekday_distribution(dataset: &Dataset) -> Vec<WeekdayBucket> {
    let mut by_day: BTreeMap<u32, (chrono::Weekday, HashSet<(&str, &str)>)> = BTreeMap::new();
    for line in &dataset.lines {
        by_day
            .entry(line.weekday.num_days_from_monday())
            .or_insert_with(|| (line.weekday, HashSet::new()))
            .1
            .insert(line.bill_key());
    }

    by_day
        .into_values()
        .map(|(day, bills)| WeekdayBucket {
            weekday: weekday_name(day).to_string(),
            bills: bills.len(),
        })
        .collect()
}
