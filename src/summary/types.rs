//! Output types of the summary pipeline.

use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Finished statistics for one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub median_unit_cost: Decimal,
    pub most_common_region: String,
    pub first_order_date: NaiveDateTime,
    pub last_order_date: NaiveDateTime,
    pub days_between: i64,
    pub total_revenue: Decimal,
}

/// Rounds to cents, half away from zero, always keeping two decimal places.
pub fn round_currency(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_round_currency_half_away_from_zero() {
        assert_eq!(round_currency(d("301.325")).to_string(), "301.33");
        assert_eq!(round_currency(d("0.005")).to_string(), "0.01");
        assert_eq!(round_currency(d("-0.005")).to_string(), "-0.01");
        assert_eq!(round_currency(d("2.675")).to_string(), "2.68");
        assert_eq!(round_currency(d("2.674999")).to_string(), "2.67");
    }

    #[test]
    fn test_round_currency_pads_scale() {
        assert_eq!(round_currency(d("20")).to_string(), "20.00");
        assert_eq!(round_currency(d("600.0")).to_string(), "600.00");
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = SalesSummary {
            median_unit_cost: d("20.00"),
            most_common_region: "North".to_string(),
            first_order_date: "2020-01-01T00:00:00".parse().unwrap(),
            last_order_date: "2020-01-05T00:00:00".parse().unwrap(),
            days_between: 4,
            total_revenue: d("600.00"),
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["medianUnitCost"], "20.00");
        assert_eq!(json["mostCommonRegion"], "North");
        assert_eq!(json["firstOrderDate"], "2020-01-01T00:00:00");
        assert_eq!(json["daysBetween"], 4);
        assert_eq!(json["totalRevenue"], "600.00");
    }
}
