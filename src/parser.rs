//! CSV row source for sales datasets.
//!
//! Headers are matched by name, ignoring case and whitespace, so
//! `Order Date`, `orderdate` and ` ORDER DATE ` all bind to the same field.
//! Columns other than the four required ones are ignored, whatever their
//! position.

use std::io::Read;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{DeserializeRecordsIntoIter, ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, de};

use crate::error::SummaryError;

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// One decoded sales row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SalesRecord {
    #[serde(rename = "orderdate", deserialize_with = "de_order_date")]
    pub order_date: NaiveDateTime,
    #[serde(rename = "region", deserialize_with = "de_region")]
    pub region: String,
    #[serde(rename = "unitcost", deserialize_with = "de_decimal")]
    pub unit_cost: Decimal,
    #[serde(rename = "totalrevenue", deserialize_with = "de_decimal")]
    pub total_revenue: Decimal,
}

/// Lazy, forward-only sequence of [`SalesRecord`]s decoded from a reader.
pub struct RowSource<R: Read> {
    rows: DeserializeRecordsIntoIter<R, SalesRecord>,
}

impl<R: Read> RowSource<R> {
    /// Reads the header row and prepares the record iterator.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::MalformedInput`] if the header row cannot be
    /// decoded, or [`SummaryError::Internal`] if the reader fails.
    pub fn from_reader(reader: R) -> Result<Self, SummaryError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers: StringRecord = rdr.headers()?.iter().map(normalize_header).collect();
        rdr.set_headers(headers);

        Ok(Self {
            rows: rdr.into_deserialize(),
        })
    }
}

impl<R: Read> Iterator for RowSource<R> {
    type Item = Result<SalesRecord, SummaryError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows
            .next()
            .map(|row| row.map_err(SummaryError::from))
    }
}

/// Canonical header form: whitespace and BOM removed, lowercased.
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{feff}')
        .collect::<String>()
        .to_lowercase()
}

/// Parses an order date literal. Offsets in RFC 3339 input are dropped and
/// the wall-clock time is kept; date-only input maps to midnight.
pub fn parse_order_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn de_order_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_order_date(&raw)
        .ok_or_else(|| de::Error::custom(format!("invalid order date `{raw}`")))
}

fn de_region<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let raw = String::deserialize(deserializer)?;
    let region = raw.trim();
    if region.is_empty() {
        return Err(de::Error::custom("region must not be empty"));
    }
    Ok(region.to_string())
}

fn de_decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    let raw = String::deserialize(deserializer)?;
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|e| {
            if trimmed.contains(['e', 'E']) {
                Decimal::from_scientific(trimmed)
            } else {
                Err(e)
            }
        })
        .map_err(|e| de::Error::custom(format!("invalid decimal `{raw}`: {e}")))
}
