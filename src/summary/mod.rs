//! Sales dataset aggregation.
//!
//! This module consumes decoded sales rows in a single pass and reduces them
//! to a [`SalesSummary`]: median unit cost, most common region, order date
//! range and total revenue. The median is computed either by a streaming
//! dual-heap estimator or by buffering and quickselect; both give identical
//! results.

pub mod engine;
pub mod median;
pub mod select;
pub mod tally;
pub mod types;

pub use engine::{MedianStrategy, summarize, summarize_reader, summarize_with};
pub use median::{DualHeapMedian, MedianEstimator};
pub use select::SelectMedian;
pub use types::SalesSummary;
