//! Aggregations over a normalized [`Dataset`](crate::bills::Dataset).
//!
//! Every aggregator is a pure function of the dataset (or its bill index) and
//! produces its own table; none of them share mutable state, so they can run
//! in any order.

pub mod affinity;
pub mod items;
pub mod metrics;
pub mod peak_hour;
pub mod terminals;
pub mod trend;
pub mod types;
pub mod utility;
pub mod validation;
