use std::sync::Arc;

use super::{CaptureOutcome, WorkflowError};
use crate::capture;
use crate::coordinator::Coordinator;
use crate::overlay::SuspendReason;
use crate::presentation::{editor_channel, EditorResult, PresentationError, SurfaceKind};
use crate::session::MediaKind;
use crate::storage::{BackingFile, MediaStore};

impl Coordinator {
    /// Capture, annotate, then attach or discard.
    ///
    /// A second call while an annotation is outstanding fails with
    /// [`WorkflowError::AnnotationInProgress`] after deleting its own capture.
    pub async fn capture_screenshot(&self) -> Result<CaptureOutcome, WorkflowError> {
        let original =
            capture::capture_screen_with(Arc::clone(&self.inner.services.capture)).await?;

        let Some(pending) = self.inner.pending_annotation.begin(original.path()) else {
            tracing::warn!(
                path = %original.path().display(),
                "annotation already in progress; dropping new screenshot"
            );
            MediaStore::release_in_background(original, "annotation already in progress").await;
            return Err(WorkflowError::AnnotationInProgress);
        };

        let Some((presenter, source)) = self.resolve_presenter() else {
            drop(pending);
            tracing::warn!("no surface to host the annotation editor; attaching screenshot as captured");
            let id = self.attach(original, MediaKind::Screenshot).await?;
            return Ok(CaptureOutcome::AutoAttached {
                id,
                reason: PresentationError::NoSurface,
            });
        };
        tracing::debug!(%presenter, ?source, "presenting annotation editor");

        self.inner
            .arbiter
            .suspend(SuspendReason::ScreenshotAnnotation);
        self.inner
            .presentations
            .borrow_mut()
            .open(SurfaceKind::AnnotationEditor);

        let (responder, reply) = editor_channel();
        let result = match self
            .inner
            .services
            .editor
            .present(presenter, original.path(), responder)
        {
            Ok(()) => Ok(reply.wait().await),
            Err(err) => Err(err),
        };

        self.inner
            .presentations
            .borrow_mut()
            .close(SurfaceKind::AnnotationEditor);
        self.inner
            .arbiter
            .resume(SuspendReason::ScreenshotAnnotation);
        drop(pending);

        match result {
            Err(err) => {
                tracing::warn!(%err, "annotation editor unavailable; attaching screenshot as captured");
                let id = self.attach(original, MediaKind::Screenshot).await?;
                Ok(CaptureOutcome::AutoAttached { id, reason: err })
            }
            Ok(EditorResult::Confirmed { copy }) => {
                let file = match copy {
                    Some(copy) if copy != original.path() => {
                        MediaStore::release_in_background(original, "replaced by annotated copy")
                            .await;
                        BackingFile::new(copy)
                    }
                    _ => original,
                };
                let id = self.attach(file, MediaKind::Screenshot).await?;
                self.schedule_form_presentation();
                Ok(CaptureOutcome::Attached(id))
            }
            Ok(EditorResult::Discarded { copy }) => {
                let copy = copy.filter(|copy| copy != original.path());
                let mut files = vec![original];
                files.extend(copy.map(BackingFile::new));
                MediaStore::release_all_in_background(files, "annotation discarded").await;
                tracing::info!("screenshot discarded in editor");
                Err(WorkflowError::Cancelled(MediaKind::Screenshot))
            }
        }
    }
}
