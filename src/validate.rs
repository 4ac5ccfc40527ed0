//! Upload checks applied before a dataset reaches the summary engine.

use thiserror::Error;

use crate::fetch::Upload;

const ALLOWED_CONTENT_TYPES: &[&str] = &["text/csv", "application/csv", "application/vnd.ms-excel"];

/// Default cap on dataset size: 15 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 15 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_bytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("file is empty")]
    Empty,
    #[error("file is {size} bytes; maximum allowed size is {max} bytes")]
    TooLarge { size: u64, max: u64 },
    #[error("content type `{0}` is not allowed for CSV files")]
    ContentType(String),
    #[error("file extension not allowed, please upload a \".csv\" file")]
    Extension,
}

/// Returns every problem found with `upload`; empty when it is acceptable.
pub fn validate_upload(upload: &Upload, limits: &UploadLimits) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let size = upload.bytes.len() as u64;

    if size == 0 {
        issues.push(ValidationIssue::Empty);
    }
    if size > limits.max_bytes {
        issues.push(ValidationIssue::TooLarge {
            size,
            max: limits.max_bytes,
        });
    }
    if let Some(content_type) = &upload.content_type {
        if !content_type_allowed(content_type) {
            issues.push(ValidationIssue::ContentType(content_type.clone()));
        }
    }
    if !upload.name.to_ascii_lowercase().ends_with(".csv") {
        issues.push(ValidationIssue::Extension);
    }

    issues
}

fn content_type_allowed(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    essence.is_empty()
        || ALLOWED_CONTENT_TYPES
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(essence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn upload(name: &str, content_type: Option<&str>, body: &'static [u8]) -> Upload {
        Upload {
            name: name.to_string(),
            content_type: content_type.map(str::to_string),
            bytes: Bytes::from_static(body),
        }
    }

    #[test]
    fn test_valid_upload() {
        let u = upload("Sales.CSV", Some("text/csv; charset=utf-8"), b"a,b\n1,2\n");
        assert!(validate_upload(&u, &UploadLimits::default()).is_empty());

        let local = upload("sales.csv", None, b"a,b\n1,2\n");
        assert!(validate_upload(&local, &UploadLimits::default()).is_empty());
    }

    #[test]
    fn test_empty_upload() {
        let u = upload("sales.csv", None, b"");
        assert_eq!(
            validate_upload(&u, &UploadLimits::default()),
            vec![ValidationIssue::Empty]
        );
    }

    #[test]
    fn test_too_large() {
        let u = upload("sales.csv", None, b"0123456789");
        let issues = validate_upload(&u, &UploadLimits { max_bytes: 4 });
        assert_eq!(issues, vec![ValidationIssue::TooLarge { size: 10, max: 4 }]);
    }

    #[test]
    fn test_collects_all_issues() {
        let u = upload("sales.json", Some("application/json"), b"{}");
        let issues = validate_upload(&u, &UploadLimits::default());
        assert_eq!(
            issues,
            vec![
                ValidationIssue::ContentType("application/json".to_string()),
                ValidationIssue::Extension,
            ]
        );
    }

    #[test]
    fn test_excel_content_type_is_accepted() {
        let u = upload("sales.csv", Some("Application/VND.MS-Excel"), b"x");
        assert!(validate_upload(&u, &UploadLimits::default()).is_empty());
    }
}
