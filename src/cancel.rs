//! Cooperative cancellation for summary runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::error::SummaryError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A cloneable cancellation signal.
///
/// Clones share the same flag. A [`child`](CancelFlag::child) flag can be
/// cancelled on its own, and also reports cancelled once any ancestor is.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    flag: Arc<AtomicBool>,
    parent: Option<Arc<CancelFlag>>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(&self) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            parent: Some(Arc::new(self.clone())),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
            || self
                .parent
                .as_ref()
                .is_some_and(|parent| parent.is_cancelled())
    }

    /// Resolves once this flag or any ancestor is cancelled.
    pub async fn cancelled(&self) {
        while !self.is_cancelled() {
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Returns [`SummaryError::Cancelled`] once the flag is set.
    pub fn check(&self) -> Result<(), SummaryError> {
        if self.is_cancelled() {
            Err(SummaryError::Cancelled)
        } else {
            Ok(())
        }
    }
}
