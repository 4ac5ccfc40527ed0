//! Output formatting and persistence for sales summaries.
//!
//! Supports pretty-printing, a JSON result envelope, and CSV append.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::summary::SalesSummary;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Uniform response shape: either `data` on success or a list of `errors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub errors: Vec<String>,
}

impl<T> ResultEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            errors: Vec::new(),
        }
    }

    pub fn failure<I, S>(errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Self {
            success: false,
            data: None,
            errors: errors.into_iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Logs a summary using Rust's debug pretty-print format.
pub fn print_pretty(summary: &SalesSummary) {
    debug!("{:#?}", summary);
}

/// Logs any serializable value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Appends a [`SalesSummary`] as a row to a CSV report file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, summary: &SalesSummary) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    writer.serialize(summary)?;
    writer.flush()?;

    Ok(())
}
