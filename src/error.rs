//! Error taxonomy for a single summary run.

use thiserror::Error;

/// Failure of one aggregation run. Every variant aborts the run; no partial
/// summary is ever produced alongside an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummaryError {
    /// The row sequence yielded no records.
    #[error("no records to process")]
    EmptyInput,

    /// A row could not be decoded (missing column, unparseable value).
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Unexpected fault during aggregation. The detail is for logs only.
    #[error("internal failure while summarizing sales data")]
    Internal(String),

    /// The run observed its cancellation signal.
    #[error("summary run was cancelled")]
    Cancelled,
}

impl SummaryError {
    pub fn internal(detail: impl Into<String>) -> Self {
        SummaryError::Internal(detail.into())
    }

    /// Diagnostic detail suitable for logging, never for end users.
    pub fn detail(&self) -> Option<&str> {
        match self {
            SummaryError::Internal(detail) | SummaryError::MalformedInput(detail) => Some(detail),
            _ => None,
        }
    }

    /// Whether supplying a different dataset can fix the failure.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            SummaryError::EmptyInput | SummaryError::MalformedInput(_)
        )
    }

    /// Whether re-running the whole aggregation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SummaryError::Internal(_))
    }
}

impl From<csv::Error> for SummaryError {
    fn from(err: csv::Error) -> Self {
        match err.kind() {
            csv::ErrorKind::Io(_) => SummaryError::Internal(err.to_string()),
            _ => SummaryError::MalformedInput(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_display_hides_detail() {
        let err = SummaryError::internal("decimal overflow at row 42");
        assert_eq!(
            err.to_string(),
            "internal failure while summarizing sales data"
        );
        assert_eq!(err.detail(), Some("decimal overflow at row 42"));
    }

    #[test]
    fn test_classification() {
        assert!(SummaryError::EmptyInput.is_user_correctable());
        assert!(SummaryError::MalformedInput("x".into()).is_user_correctable());
        assert!(!SummaryError::internal("x").is_user_correctable());

        assert!(SummaryError::internal("x").is_retryable());
        assert!(!SummaryError::EmptyInput.is_retryable());
        assert!(!SummaryError::Cancelled.is_retryable());
    }

    #[test]
    fn test_io_errors_map_to_internal() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = SummaryError::from(csv::Error::from(io));
        assert!(matches!(err, SummaryError::Internal(_)));
    }
}
