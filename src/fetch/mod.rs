//! Loading datasets from local paths or HTTP URLs.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// A dataset as received, before validation.
#[derive(Debug, Clone)]
pub struct Upload {
    /// File name, or the last path segment of the URL.
    pub name: String,
    /// Declared media type; `None` for local files.
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Downloads `url` with `client`. Non-success statuses are errors.
pub async fn fetch_upload<C: HttpClient>(client: &C, url: &str) -> Result<Upload> {
    let url: reqwest::Url = url
        .parse()
        .with_context(|| format!("invalid source URL `{url}`"))?;
    let name = url
        .path_segments()
        .and_then(|segments| segments.last())
        .unwrap_or_default()
        .to_string();

    let req = reqwest::Request::new(reqwest::Method::GET, url);
    let resp = client.execute(req).await?.error_for_status()?;

    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let bytes = resp.bytes().await?;
    debug!(bytes = bytes.len(), ?content_type, "Remote source downloaded");

    Ok(Upload {
        name,
        content_type,
        bytes,
    })
}

/// Reads `source` from disk, or fetches it when it is an `http(s)` URL.
#[tracing::instrument(skip(timeout))]
pub async fn load_source(source: &str, timeout: Duration) -> Result<Upload> {
    if is_remote(source) {
        let client = BasicClient::new(timeout)?;
        return fetch_upload(&client, source).await;
    }

    let bytes = tokio::fs::read(source)
        .await
        .with_context(|| format!("failed to read `{source}`"))?;
    let name = Path::new(source)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(source)
        .to_string();
    debug!(bytes = bytes.len(), "Local source read");

    Ok(Upload {
        name,
        content_type: None,
        bytes: Bytes::from(bytes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.com/sales.csv"));
        assert!(is_remote("http://localhost:8080/sales.csv"));
        assert!(!is_remote("data/sales.csv"));
        assert!(!is_remote("httpdocs/sales.csv"));
    }

    #[tokio::test]
    async fn test_load_local_source() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "OrderDate,Region,UnitCost,TotalRevenue").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let upload = load_source(&path, Duration::from_secs(1)).await.unwrap();

        assert!(upload.name.ends_with(".csv"));
        assert_eq!(upload.content_type, None);
        assert_eq!(&upload.bytes[..], b"OrderDate,Region,UnitCost,TotalRevenue\n");
    }

    #[tokio::test]
    async fn test_load_missing_source_fails() {
        let result = load_source("definitely/not/here.csv", Duration::from_secs(1)).await;
        assert!(result.is_err());
    }
}
