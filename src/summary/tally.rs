//! Region, date-range and revenue accumulators.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::error::SummaryError;

#[derive(Debug, Clone)]
struct RegionCount {
    label: String,
    count: usize,
}

/// Case-insensitive region frequency table.
///
/// Each region is reported under the smallest spelling seen (byte order), so
/// the label does not depend on row order.
#[derive(Debug, Default, Clone)]
pub struct RegionTally {
    counts: HashMap<String, RegionCount>,
}

impl RegionTally {
    pub fn record(&mut self, region: &str) {
        let entry = self
            .counts
            .entry(region.to_lowercase())
            .or_insert_with(|| RegionCount {
                label: region.to_string(),
                count: 0,
            });
        entry.count += 1;
        if region < entry.label.as_str() {
            entry.label = region.to_string();
        }
    }

    pub fn count(&self, region: &str) -> usize {
        self.counts
            .get(&region.to_lowercase())
            .map_or(0, |entry| entry.count)
    }

    /// Highest count wins; equal counts go to the alphabetically first region,
    /// comparing names folded to uppercase.
    pub fn most_common(&self) -> Option<&str> {
        self.counts
            .iter()
            .map(|(key, entry)| (key.to_uppercase(), entry))
            .max_by(|(key_a, a), (key_b, b)| a.count.cmp(&b.count).then_with(|| key_b.cmp(key_a)))
            .map(|(_, entry)| entry.label.as_str())
    }
}

/// Earliest and latest order dates seen.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    bounds: Option<(NaiveDateTime, NaiveDateTime)>,
}

impl DateRange {
    pub fn observe(&mut self, at: NaiveDateTime) {
        self.bounds = match self.bounds {
            None => Some((at, at)),
            Some((first, last)) => Some((first.min(at), last.max(at))),
        };
    }

    pub fn first(&self) -> Option<NaiveDateTime> {
        self.bounds.map(|(first, _)| first)
    }

    pub fn last(&self) -> Option<NaiveDateTime> {
        self.bounds.map(|(_, last)| last)
    }

    /// Whole days between first and last, truncating any partial day.
    pub fn days_between(&self) -> Option<i64> {
        self.bounds.map(|(first, last)| (last - first).num_days())
    }
}

/// Exact running revenue sum.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RevenueTotal {
    total: Decimal,
}

impl RevenueTotal {
    pub fn add(&mut self, amount: Decimal) -> Result<(), SummaryError> {
        self.total = self
            .total
            .checked_add(amount)
            .ok_or_else(|| SummaryError::internal(format!("revenue total overflowed adding {amount}")))?;
        Ok(())
    }

    pub fn total(&self) -> Decimal {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_most_common_empty() {
        assert_eq!(RegionTally::default().most_common(), None);
    }

    #[test]
    fn test_most_common_by_count() {
        let mut tally = RegionTally::default();
        for r in ["Asia", "Europe", "Asia", "Africa", "Asia"] {
            tally.record(r);
        }
        assert_eq!(tally.most_common(), Some("Asia"));
        assert_eq!(tally.count("asia"), 3);
        assert_eq!(tally.count("Oceania"), 0);
    }

    #[test]
    fn test_tie_goes_to_alphabetically_first() {
        let mut tally = RegionTally::default();
        for r in ["South", "South", "North", "North"] {
            tally.record(r);
        }
        assert_eq!(tally.most_common(), Some("North"));
    }

    #[test]
    fn test_tie_break_ignores_case() {
        let mut tally = RegionTally::default();
        for r in ["east", "West", "west", "East"] {
            tally.record(r);
        }
        assert_eq!(tally.most_common(), Some("East"));
    }

    #[test]
    fn test_tie_break_folds_to_uppercase() {
        // `_` sorts after uppercase letters but before lowercase ones.
        let mut tally = RegionTally::default();
        for r in ["North_East", "NorthEast", "North_East", "NorthEast"] {
            tally.record(r);
        }
        assert_eq!(tally.most_common(), Some("NorthEast"));
    }

    #[test]
    fn test_case_variants_share_a_count() {
        let mut tally = RegionTally::default();
        for r in ["north", "South", "North", "South", "NORTH"] {
            tally.record(r);
        }
        assert_eq!(tally.count("North"), 3);
        assert_eq!(tally.most_common(), Some("NORTH"));
    }

    #[test]
    fn test_date_range_narrows() {
        let mut range = DateRange::default();
        assert_eq!(range.days_between(), None);

        range.observe(at(2020, 1, 3, 0));
        assert_eq!(range.days_between(), Some(0));

        range.observe(at(2020, 1, 1, 0));
        range.observe(at(2020, 1, 5, 0));
        range.observe(at(2020, 1, 2, 0));
        assert_eq!(range.first(), Some(at(2020, 1, 1, 0)));
        assert_eq!(range.last(), Some(at(2020, 1, 5, 0)));
        assert_eq!(range.days_between(), Some(4));
    }

    #[test]
    fn test_days_between_truncates_partial_days() {
        let mut range = DateRange::default();
        range.observe(at(2020, 1, 1, 18));
        range.observe(at(2020, 1, 3, 6));
        assert_eq!(range.days_between(), Some(1));
    }

    #[test]
    fn test_revenue_is_exact() {
        let mut revenue = RevenueTotal::default();
        for _ in 0..10 {
            revenue.add(Decimal::new(1, 1)).unwrap();
        }
        assert_eq!(revenue.total(), Decimal::ONE);
    }

    #[test]
    fn test_revenue_overflow_is_internal() {
        let mut revenue = RevenueTotal::default();
        revenue.add(Decimal::MAX).unwrap();
        let err = revenue.add(Decimal::MAX).unwrap_err();
        assert!(matches!(err, SummaryError::Internal(_)));
        assert_eq!(revenue.total(), Decimal::MAX);
    }
}
