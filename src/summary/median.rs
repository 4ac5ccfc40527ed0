//! Streaming median over two heaps.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rust_decimal::Decimal;

/// A median computation fed one value at a time.
pub trait MedianEstimator {
    fn insert(&mut self, value: Decimal);

    /// Number of values inserted so far.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consumes the estimator and returns the exact median, or `None` if no
    /// value was inserted.
    fn finish(self) -> Option<Decimal>;
}

/// Average of the two middle values of an even-sized collection.
///
/// `low` must not exceed `high`. The sum only overflows when both share a
/// sign, in which case the gap between them cannot overflow.
pub fn midpoint(low: Decimal, high: Decimal) -> Decimal {
    match low.checked_add(high) {
        Some(sum) => sum / Decimal::TWO,
        None => low + (high - low) / Decimal::TWO,
    }
}

/// Exact running median in O(log n) per insert.
///
/// `lower` holds the smaller half as a max-heap and `upper` the larger half
/// as a min-heap. After every insert `lower` has either the same number of
/// elements as `upper` or exactly one more, and every element of `lower` is
/// `<=` every element of `upper`.
#[derive(Debug, Default, Clone)]
pub struct DualHeapMedian {
    lower: BinaryHeap<Decimal>,
    upper: BinaryHeap<Reverse<Decimal>>,
}

impl DualHeapMedian {
    pub fn new() -> Self {
        Self::default()
    }

    /// Median of everything inserted so far, in O(1).
    pub fn current(&self) -> Option<Decimal> {
        let low = *self.lower.peek()?;
        if self.lower.len() > self.upper.len() {
            return Some(low);
        }
        let Reverse(high) = *self.upper.peek()?;
        Some(midpoint(low, high))
    }

    fn rebalance(&mut self) {
        if self.lower.len() > self.upper.len() + 1 {
            if let Some(moved) = self.lower.pop() {
                self.upper.push(Reverse(moved));
            }
        } else if self.upper.len() > self.lower.len() {
            if let Some(Reverse(moved)) = self.upper.pop() {
                self.lower.push(moved);
            }
        }
    }
}

impl MedianEstimator for DualHeapMedian {
    fn insert(&mut self, value: Decimal) {
        // values equal to the boundary stay in `lower`
        match self.lower.peek() {
            Some(&boundary) if value > boundary => self.upper.push(Reverse(value)),
            _ => self.lower.push(value),
        }
        self.rebalance();
    }

    fn len(&self) -> usize {
        self.lower.len() + self.upper.len()
    }

    fn finish(self) -> Option<Decimal> {
        self.current()
    }
}
