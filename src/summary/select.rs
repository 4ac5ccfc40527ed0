//! Batch median by randomized quickselect.
//!
//! Buffers every value, then selects the middle order statistic(s) with a
//! Lomuto partition around a uniformly random pivot. Average O(n), worst
//! case O(n²). Output is identical to [`DualHeapMedian`](super::median::DualHeapMedian).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use super::median::{MedianEstimator, midpoint};

#[derive(Debug, Clone)]
pub struct SelectMedian {
    values: Vec<Decimal>,
    rng: StdRng,
}

impl Default for SelectMedian {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectMedian {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic pivot sequence, for reproducible runs.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            values: Vec::new(),
            rng,
        }
    }
}

impl MedianEstimator for SelectMedian {
    fn insert(&mut self, value: Decimal) {
        self.values.push(value);
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn finish(mut self) -> Option<Decimal> {
        let n = self.values.len();
        if n == 0 {
            return None;
        }
        if n % 2 == 1 {
            return Some(select_nth(&mut self.values, n / 2, &mut self.rng));
        }
        let low = select_nth(&mut self.values, n / 2 - 1, &mut self.rng);
        let high = select_nth(&mut self.values, n / 2, &mut self.rng);
        Some(midpoint(low, high))
    }
}

/// Returns the `k`-th smallest element (0-based), reordering `values` in place.
///
/// # Panics
///
/// Panics if `k >= values.len()`.
pub fn select_nth<R: Rng>(values: &mut [Decimal], k: usize, rng: &mut R) -> Decimal {
    let mut left = 0;
    let mut right = values.len() - 1;

    loop {
        if left == right {
            return values[left];
        }
        let pivot = partition(values, left, right, rng);
        if k == pivot {
            return values[k];
        } else if k < pivot {
            right = pivot - 1;
        } else {
            left = pivot + 1;
        }
    }
}

fn partition<R: Rng>(values: &mut [Decimal], left: usize, right: usize, rng: &mut R) -> usize {
    let pivot_index = rng.gen_range(left..=right);
    let pivot = values[pivot_index];
    values.swap(pivot_index, right);

    let mut store = left;
    for i in left..right {
        if values[i] < pivot {
            values.swap(store, i);
            store += 1;
        }
    }
    values.swap(store, right);
    store
}
