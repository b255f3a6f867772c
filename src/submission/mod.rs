//! Dismiss-then-submit pipeline with a non-cancelling timeout notice.

mod pipeline;
mod report;
mod timeout;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::oneshot;

pub use report::{Report, ReportAttachment};
pub(crate) use timeout::TimeoutGuard;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    /// Collector-assigned identifier of the created report.
    pub id: String,
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("no submission endpoint configured")]
    Misconfigured,
    #[error("a submission is already in flight")]
    AlreadySubmitting,
    #[error("submission failed: {0}")]
    Collector(#[source] anyhow::Error),
    #[error("submission worker stopped: {0}")]
    Worker(String),
}

/// Delivers a report to the remote collector. May take arbitrarily long.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, report: Report) -> anyhow::Result<SubmissionReceipt>;
}

/// Resolves once with the final result of one submission.
#[derive(Debug)]
pub struct SubmissionHandle {
    rx: oneshot::Receiver<Result<SubmissionReceipt, SubmissionError>>,
}

impl SubmissionHandle {
    pub(crate) fn channel() -> (
        oneshot::Sender<Result<SubmissionReceipt, SubmissionError>>,
        Self,
    ) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    pub async fn outcome(self) -> Result<SubmissionReceipt, SubmissionError> {
        self.rx.await.unwrap_or_else(|_| {
            Err(SubmissionError::Worker(
                "coordinator dropped before submission completed".to_string(),
            ))
        })
    }
}
