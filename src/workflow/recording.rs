use std::sync::Arc;

use super::{CaptureOutcome, WorkflowError};
use crate::capture;
use crate::coordinator::{Coordinator, RecordingStatus};
use crate::overlay::SuspendReason;
use crate::presentation::{
    confirmation_channel, dismiss_channel, ConfirmationChoice, PresentationError, SurfaceKind,
};
use crate::session::{AttachmentId, MediaKind};
use crate::storage::{BackingFile, MediaStore};

impl Coordinator {
    /// `present_form_after` asks for the report form once the recording is added.
    pub async fn start_recording(&self, present_form_after: bool) -> Result<(), WorkflowError> {
        if self.inner.recording.get() != RecordingStatus::Idle {
            return Err(WorkflowError::RecordingInProgress);
        }
        self.inner.recording.set(RecordingStatus::Starting);

        match capture::start_recording_with(Arc::clone(&self.inner.services.recording)).await {
            Ok(()) => {
                self.inner.recording.set(RecordingStatus::Active);
                self.inner.auto_present_form.set(present_form_after);
                Ok(())
            }
            Err(err) => {
                self.inner.recording.set(RecordingStatus::Idle);
                Err(err.into())
            }
        }
    }

    /// Stop, preview, confirm, then attach or discard.
    pub async fn stop_recording_and_review(&self) -> Result<CaptureOutcome, WorkflowError> {
        if self.inner.recording.get() != RecordingStatus::Active {
            return Err(WorkflowError::NoActiveRecording);
        }
        self.inner.recording.set(RecordingStatus::Idle);

        let recording = match capture::stop_recording_with(Arc::clone(
            &self.inner.services.recording,
        ))
        .await
        {
            Ok(file) => file,
            Err(err) => {
                self.inner.auto_present_form.set(false);
                return Err(err.into());
            }
        };

        let previewed = self.present_recording_preview(&recording).await;

        // The confirmation must not be scheduled until the preview is fully gone.
        tokio::time::sleep(self.inner.config.confirmation_settle()).await;

        let Some((presenter, source)) = self.resolve_presenter() else {
            tracing::warn!("no presenter for recording confirmation; attaching without asking");
            if previewed {
                self.inner.arbiter.resume(SuspendReason::RecordingPreview);
            }
            let id = self.add_recording(recording).await?;
            return Ok(CaptureOutcome::AutoAttached {
                id,
                reason: PresentationError::NoSurface,
            });
        };
        tracing::debug!(%presenter, ?source, "presenting recording confirmation");

        self.inner
            .arbiter
            .suspend(SuspendReason::RecordingConfirmation);
        if previewed {
            self.inner.arbiter.resume(SuspendReason::RecordingPreview);
        }
        self.inner
            .presentations
            .borrow_mut()
            .open(SurfaceKind::ConfirmationDialog);

        let (responder, reply) = confirmation_channel();
        let choice = match self.inner.services.confirmation.present(
            presenter,
            recording.path(),
            responder,
        ) {
            Ok(()) => Ok(reply.wait().await),
            Err(err) => Err(err),
        };

        self.inner
            .presentations
            .borrow_mut()
            .close(SurfaceKind::ConfirmationDialog);
        self.inner
            .arbiter
            .resume(SuspendReason::RecordingConfirmation);

        match choice {
            Err(err) => {
                tracing::warn!(%err, "confirmation dialog unavailable; attaching recording");
                let id = self.add_recording(recording).await?;
                Ok(CaptureOutcome::AutoAttached { id, reason: err })
            }
            Ok(ConfirmationChoice::Add) => {
                let id = self.add_recording(recording).await?;
                Ok(CaptureOutcome::Attached(id))
            }
            Ok(ConfirmationChoice::Discard) => {
                MediaStore::release_in_background(recording, "recording discarded").await;
                self.inner.auto_present_form.set(false);
                tracing::info!("screen recording discarded");
                Err(WorkflowError::Cancelled(MediaKind::ScreenRecording))
            }
        }
    }

    /// Returns `true` when a preview was shown and still holds its suspension.
    async fn present_recording_preview(&self, recording: &BackingFile) -> bool {
        let Some((presenter, source)) = self.resolve_presenter() else {
            tracing::warn!("no surface for recording preview; skipping to confirmation");
            return false;
        };
        tracing::debug!(%presenter, ?source, "presenting recording preview");

        self.inner.arbiter.suspend(SuspendReason::RecordingPreview);
        self.inner
            .presentations
            .borrow_mut()
            .open(SurfaceKind::RecordingPreview);

        let (signal, dismissal) = dismiss_channel();
        let presented = self.inner.services.preview.present(
            presenter,
            recording.path(),
            MediaKind::ScreenRecording,
            signal,
        );
        let shown = match presented {
            Ok(()) => {
                let cause = dismissal.wait().await;
                tracing::debug!(?cause, "recording preview dismissed");
                self.note_presenter(presenter);
                true
            }
            Err(err) => {
                tracing::warn!(%err, "recording preview failed; skipping to confirmation");
                false
            }
        };

        self.inner
            .presentations
            .borrow_mut()
            .close(SurfaceKind::RecordingPreview);
        if !shown {
            self.inner.arbiter.resume(SuspendReason::RecordingPreview);
        }
        shown
    }

    /// Attaches, then consumes the auto-present request.
    async fn add_recording(&self, recording: BackingFile) -> Result<AttachmentId, WorkflowError> {
        let attached = self.attach(recording, MediaKind::ScreenRecording).await;
        if attached.is_ok() && self.inner.auto_present_form.get() {
            self.schedule_form_presentation();
        }
        self.inner.auto_present_form.set(false);
        attached
    }
}
