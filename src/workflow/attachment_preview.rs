use super::WorkflowError;
use crate::coordinator::Coordinator;
use crate::overlay::SuspendReason;
use crate::presentation::{dismiss_channel, PresentationError, SurfaceKind};
use crate::session::AttachmentId;

impl Coordinator {
    /// Shows an attachment that is already in the session; resolves on dismissal.
    pub async fn preview_attachment(&self, id: AttachmentId) -> Result<(), WorkflowError> {
        let (path, kind) = {
            let session = self.inner.session.borrow();
            let attachment = session
                .attachment(id)
                .ok_or(WorkflowError::UnknownAttachment(id))?;
            (attachment.file().path().to_path_buf(), attachment.kind())
        };
        let (presenter, _) = self
            .resolve_presenter()
            .ok_or(PresentationError::NoSurface)?;

        self.inner.arbiter.suspend(SuspendReason::AttachmentPreview);
        self.inner
            .presentations
            .borrow_mut()
            .open(SurfaceKind::AttachmentPreview);

        let (signal, dismissal) = dismiss_channel();
        let result = match self
            .inner
            .services
            .preview
            .present(presenter, &path, kind, signal)
        {
            Ok(()) => {
                let cause = dismissal.wait().await;
                tracing::debug!(%id, ?cause, "attachment preview dismissed");
                Ok(())
            }
            Err(err) => Err(err),
        };

        self.inner
            .presentations
            .borrow_mut()
            .close(SurfaceKind::AttachmentPreview);
        self.inner.arbiter.resume(SuspendReason::AttachmentPreview);
        result.map_err(WorkflowError::from)
    }
}
