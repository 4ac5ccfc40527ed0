//! Single-pass aggregation of a row sequence into a [`SalesSummary`].

use std::fmt;
use std::io::Read;

use crate::cancel::CancelFlag;
use crate::error::SummaryError;
use crate::parser::{RowSource, SalesRecord};

use super::median::{DualHeapMedian, MedianEstimator};
use super::select::SelectMedian;
use super::tally::{DateRange, RegionTally, RevenueTotal};
use super::types::{SalesSummary, round_currency};

/// Which median computation a run uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MedianStrategy {
    /// Streaming dual-heap estimator.
    #[default]
    DualHeap,
    /// Buffer every value, then quickselect.
    QuickSelect,
}

impl fmt::Display for MedianStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MedianStrategy::DualHeap => write!(f, "dual-heap"),
            MedianStrategy::QuickSelect => write!(f, "quickselect"),
        }
    }
}

/// Summarizes `rows` with the chosen median strategy.
///
/// # Errors
///
/// * [`SummaryError::EmptyInput`] if `rows` yields nothing.
/// * Any error yielded by `rows`, unchanged; the run stops at the first one.
/// * [`SummaryError::Cancelled`] once `cancel` is set.
/// * [`SummaryError::Internal`] on arithmetic overflow.
pub fn summarize<I>(
    rows: I,
    strategy: MedianStrategy,
    cancel: &CancelFlag,
) -> Result<SalesSummary, SummaryError>
where
    I: IntoIterator<Item = Result<SalesRecord, SummaryError>>,
{
    match strategy {
        MedianStrategy::DualHeap => summarize_with(rows, DualHeapMedian::new(), cancel),
        MedianStrategy::QuickSelect => summarize_with(rows, SelectMedian::new(), cancel),
    }
}

/// Decodes CSV from `reader` and summarizes it.
pub fn summarize_reader<R: Read>(
    reader: R,
    strategy: MedianStrategy,
    cancel: &CancelFlag,
) -> Result<SalesSummary, SummaryError> {
    summarize(RowSource::from_reader(reader)?, strategy, cancel)
}

/// Summarizes `rows` using a caller-supplied median estimator.
pub fn summarize_with<I, M>(
    rows: I,
    mut median: M,
    cancel: &CancelFlag,
) -> Result<SalesSummary, SummaryError>
where
    I: IntoIterator<Item = Result<SalesRecord, SummaryError>>,
    M: MedianEstimator,
{
    let mut regions = RegionTally::default();
    let mut dates = DateRange::default();
    let mut revenue = RevenueTotal::default();

    for row in rows {
        cancel.check()?;
        let row = row?;

        median.insert(row.unit_cost);
        regions.record(&row.region);
        dates.observe(row.order_date);
        revenue.add(row.total_revenue)?;
    }

    if median.is_empty() {
        return Err(SummaryError::EmptyInput);
    }

    let (Some(first_order_date), Some(last_order_date), Some(days_between)) =
        (dates.first(), dates.last(), dates.days_between())
    else {
        return Err(SummaryError::internal("date range empty after non-empty input"));
    };
    let most_common_region = regions
        .most_common()
        .ok_or_else(|| SummaryError::internal("region tally empty after non-empty input"))?
        .to_string();
    let median_unit_cost = median
        .finish()
        .ok_or_else(|| SummaryError::internal("median estimator empty after non-empty input"))?;

    Ok(SalesSummary {
        median_unit_cost: round_currency(median_unit_cost),
        most_common_region,
        first_order_date,
        last_order_date,
        days_between,
        total_revenue: round_currency(revenue.total()),
    })
}
