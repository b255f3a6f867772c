use std::sync::Arc;

use tokio::sync::oneshot;

use super::{Report, SubmissionError, SubmissionHandle, SubmissionReceipt, TimeoutGuard};
use crate::coordinator::Coordinator;
use crate::session::SessionSnapshot;
use crate::state::SubmissionEvent;
use crate::storage::MediaStore;

impl Coordinator {
    /// Snapshots the session, dismisses the form and uploads in the background.
    ///
    /// Fails before touching the UI when no endpoint is configured or a
    /// submission is already in flight.
    pub fn submit(&self) -> Result<SubmissionHandle, SubmissionError> {
        let (snapshot, endpoint) = {
            let session = self.inner.session.borrow();
            let endpoint = session
                .effective_webhook(self.inner.config.default_webhook.as_deref())
                .ok_or(SubmissionError::Misconfigured)?;
            (session.snapshot(), endpoint)
        };

        self.inner
            .submission
            .borrow_mut()
            .transition(SubmissionEvent::Submit)
            .map_err(|_| SubmissionError::AlreadySubmitting)?;

        let submitted = snapshot.clone();
        let report = Report::from_snapshot(snapshot, endpoint);
        self.inner
            .pinned
            .borrow_mut()
            .extend(report.attachments.iter().map(|attachment| attachment.id));
        tracing::info!(
            attachments = report.attachments.len(),
            labels = ?report.labels,
            "submitting report"
        );

        self.dismiss_report_form();
        self.notify(|delegate| delegate.on_submission_progress(true));

        let timeout = self.inner.config.submission_timeout();
        let on_elapsed = {
            let coordinator = self.clone();
            move || coordinator.submission_timed_out()
        };
        let guard = TimeoutGuard::arm(timeout, on_elapsed);

        let submitter = Arc::clone(&self.inner.services.submitter);
        let upload = tokio::spawn(async move { submitter.submit(report).await });

        let (tx, handle) = SubmissionHandle::channel();
        let coordinator = self.clone();
        tokio::task::spawn_local(async move {
            let result = match upload.await {
                Ok(Ok(receipt)) => Ok(receipt),
                Ok(Err(err)) => Err(SubmissionError::Collector(err)),
                Err(err) => Err(SubmissionError::Worker(err.to_string())),
            };
            coordinator
                .finish_submission(guard, submitted, result, tx)
                .await;
        });

        Ok(handle)
    }

    fn submission_timed_out(&self) {
        if let Err(err) = self
            .inner
            .submission
            .borrow_mut()
            .transition(SubmissionEvent::TimeoutElapsed)
        {
            tracing::debug!(%err, "timeout elapsed after submission settled");
            return;
        }
        tracing::warn!("submission is taking longer than expected");
        if self.has_delegate() {
            self.notify(|delegate| delegate.on_submission_slow());
        } else {
            crate::notification::send(
                "Bug report still sending",
                "Sending the bug report is taking longer than expected. It will finish in the background.",
            );
        }
    }

    async fn finish_submission(
        &self,
        guard: TimeoutGuard,
        submitted: SessionSnapshot,
        result: Result<SubmissionReceipt, SubmissionError>,
        tx: oneshot::Sender<Result<SubmissionReceipt, SubmissionError>>,
    ) {
        guard.cancel();

        let event = if result.is_ok() {
            SubmissionEvent::Succeed
        } else {
            SubmissionEvent::Fail
        };
        if let Err(err) = self.inner.submission.borrow_mut().transition(event) {
            tracing::error!(%err, "submission completed from an unexpected phase");
        }
        self.notify(|delegate| delegate.on_submission_progress(false));

        match &result {
            Ok(receipt) => {
                tracing::info!(id = %receipt.id, "report submitted");
                self.notify(|delegate| delegate.on_submitted(receipt));
            }
            Err(err) => {
                tracing::warn!(%err, "report submission failed; session kept for retry");
                self.notify(|delegate| delegate.on_submit_failed(err));
            }
        }

        self.inner.pinned.borrow_mut().clear();
        let deferred = std::mem::take(&mut *self.inner.deferred_release.borrow_mut());
        MediaStore::release_all_in_background(deferred, "upload settled").await;
        if result.is_ok() {
            self.settle_submitted_session(&submitted).await;
        }

        if tx.send(result).is_err() {
            tracing::debug!("submission handle dropped before completion");
        }
    }

    /// Removes what was sent. Captures and edits made during the upload stay.
    async fn settle_submitted_session(&self, submitted: &SessionSnapshot) {
        let sent = self.inner.session.borrow_mut().settle_submitted(submitted);
        let ids = sent.iter().map(|attachment| attachment.id()).collect::<Vec<_>>();
        self.release_attachments(sent, "submitted").await;

        if self.snapshot() == SessionSnapshot::default() {
            tracing::info!(count = ids.len(), "session cleared after submission");
            self.notify(|delegate| delegate.on_session_cleared());
        } else {
            tracing::info!(
                count = ids.len(),
                "submitted content removed; later edits kept in session"
            );
            for id in ids {
                self.notify(|delegate| delegate.on_attachment_removed(id));
            }
        }
    }
}
