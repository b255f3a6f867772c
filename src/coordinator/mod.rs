//! The single coordination context that owns the session, the overlay
//! arbiter and every capture and submission workflow.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;

use crate::capture::{CaptureService, RecordingService};
use crate::config::CoordinatorConfig;
use crate::delegate::HostDelegate;
use crate::overlay::{OverlayArbiter, OverlaySurface, RetryPolicy, VisibilityState};
use crate::presentation::{
    dismiss_channel, resolve_presenter, AnnotationEditor, ConfirmationPresenter,
    ForegroundPredicate, PresentationError, PresentationHost, PresentationTracker,
    PresenterId, PresenterSource, PreviewPresenter, ReportFormPresenter, SurfaceKind,
};
use crate::session::{
    AttachmentId, MediaAttachment, MediaKind, SessionField, SessionSnapshot, SessionStore,
};
use crate::state::{SubmissionMachine, SubmissionPhase};
use crate::storage::{BackingFile, MediaStore, PruneReport, StorageResult};
use crate::workflow::{PendingCapture, PendingCaptureSlot, WorkflowError};


/// External collaborators the coordinator drives.
///
/// Capture, recording and submission run off the coordination context and so
/// must be `Send + Sync`; presenters stay on it.
pub struct Services {
    pub capture: Arc<dyn CaptureService>,
    pub recording: Arc<dyn RecordingService>,
    pub submitter: Arc<dyn crate::submission::Submitter>,
    pub editor: Rc<dyn AnnotationEditor>,
    pub preview: Rc<dyn PreviewPresenter>,
    pub confirmation: Rc<dyn ConfirmationPresenter>,
    pub form: Rc<dyn ReportFormPresenter>,
    pub host: Rc<dyn PresentationHost>,
    pub overlay: Rc<dyn OverlaySurface>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum RecordingStatus {
    #[default]
    Idle,
    Starting,
    Active,
}

/// Cheap to clone; all clones share one session.
///
/// Must live on a `tokio::task::LocalSet`: deferred work (settle delays,
/// overlay retries, the submission timeout guard) is spawned with
/// `spawn_local`.
#[derive(Clone)]
pub struct Coordinator {
    pub(crate) inner: Rc<CoordinatorInner>,
}

pub(crate) struct CoordinatorInner {
    pub(crate) config: CoordinatorConfig,
    pub(crate) services: Services,
    pub(crate) media: MediaStore,
    pub(crate) session: RefCell<SessionStore>,
    pub(crate) presentations: Rc<RefCell<PresentationTracker>>,
    pub(crate) arbiter: OverlayArbiter,
    pub(crate) pending_annotation: PendingCaptureSlot,
    pub(crate) recording: Cell<RecordingStatus>,
    pub(crate) auto_present_form: Cell<bool>,
    pub(crate) form_generation: Cell<u64>,
    pub(crate) submission: RefCell<SubmissionMachine>,
    /// Attachments referenced by the in-flight report.
    pub(crate) pinned: RefCell<HashSet<AttachmentId>>,
    /// Files removed from the session while pinned; deleted once the upload settles.
    pub(crate) deferred_release: RefCell<Vec<BackingFile>>,
    pub(crate) delegate: RefCell<Option<Rc<dyn HostDelegate>>>,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig, media: MediaStore, services: Services) -> Self {
        let presentations = Rc::new(RefCell::new(PresentationTracker::default()));
        let predicate = Rc::new(ForegroundPredicate::new(
            Rc::clone(&presentations),
            Rc::clone(&services.host),
        ));
        let arbiter = OverlayArbiter::new(
            RetryPolicy::from_config(&config),
            predicate,
            Rc::clone(&services.overlay),
        );

        Self {
            inner: Rc::new(CoordinatorInner {
                config,
                services,
                media,
                session: RefCell::new(SessionStore::new()),
                presentations,
                arbiter,
                pending_annotation: PendingCaptureSlot::default(),
                recording: Cell::new(RecordingStatus::Idle),
                auto_present_form: Cell::new(false),
                form_generation: Cell::new(0),
                submission: RefCell::new(SubmissionMachine::new()),
                pinned: RefCell::new(HashSet::new()),
                deferred_release: RefCell::new(Vec::new()),
                delegate: RefCell::new(None),
            }),
        }
    }

    /// Uses `config.temp_dir` when set, else the runtime temp dir.
    pub fn from_config(config: CoordinatorConfig, services: Services) -> StorageResult<Self> {
        let media = match &config.temp_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                MediaStore::with_temp_dir(dir.clone())
            }
            None => MediaStore::with_default_paths()?,
        };
        Ok(Self::new(config, media, services))
    }

    pub fn set_delegate(&self, delegate: Option<Rc<dyn HostDelegate>>) {
        *self.inner.delegate.borrow_mut() = delegate;
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.session.borrow().snapshot()
    }

    pub fn set_field(&self, field: SessionField) {
        self.inner.session.borrow_mut().set_field(field);
    }

    pub fn visibility(&self) -> VisibilityState {
        self.inner.arbiter.state()
    }

    pub fn submission_phase(&self) -> SubmissionPhase {
        self.inner.submission.borrow().phase()
    }

    pub fn pending_annotation(&self) -> Option<PendingCapture> {
        self.inner.pending_annotation.current()
    }

    pub fn is_recording(&self) -> bool {
        self.inner.recording.get() != RecordingStatus::Idle
    }

    pub fn is_form_presented(&self) -> bool {
        self.inner.presentations.borrow().is_form_presented()
    }

    /// First evaluation once the host has attached the overlay.
    pub fn start_overlay(&self) {
        self.inner.arbiter.reevaluate();
    }

    /// Host notification: key window changed, a modal appeared or went away.
    pub fn foreground_changed(&self) {
        self.inner.arbiter.foreground_changed();
    }

    /// Host notification: `presenter` is a stable, on-screen surface.
    pub fn note_presenter(&self, presenter: PresenterId) {
        self.inner
            .presentations
            .borrow_mut()
            .remember_presenter(presenter);
    }

    /// Host notification: a coordinator-owned surface the host presented itself,
    /// such as an error alert, is now on screen.
    pub fn surface_opened(&self, kind: SurfaceKind) {
        self.inner.presentations.borrow_mut().open(kind);
        self.inner.arbiter.foreground_changed();
    }

    pub fn surface_closed(&self, kind: SurfaceKind) {
        self.inner.presentations.borrow_mut().close(kind);
        self.inner.arbiter.foreground_changed();
    }

    /// Un-suspends the overlay regardless of which workflow suspended it.
    pub fn force_overlay_resume(&self) {
        self.inner.arbiter.force_resume();
    }

    /// Presents the report form unless it is already up.
    pub fn present_report_form(&self) -> Result<(), WorkflowError> {
        if self.is_form_presented() {
            return Ok(());
        }
        let (presenter, source) = self
            .resolve_presenter()
            .ok_or(PresentationError::NoSurface)?;
        tracing::debug!(%presenter, ?source, "presenting report form");

        let (signal, dismissal) = dismiss_channel();
        let form_presenter = self
            .inner
            .services
            .form
            .present(presenter, self.snapshot(), signal)?;

        let generation = self.bump_form_generation();
        self.inner
            .presentations
            .borrow_mut()
            .form_presented(form_presenter);
        self.inner.arbiter.foreground_changed();

        let coordinator = self.clone();
        tokio::task::spawn_local(async move {
            let cause = dismissal.wait().await;
            if coordinator.inner.form_generation.get() != generation {
                return;
            }
            tracing::debug!(?cause, "report form dismissed");
            coordinator.inner.presentations.borrow_mut().form_dismissed();
            coordinator.inner.arbiter.foreground_changed();
        });
        Ok(())
    }

    pub fn dismiss_report_form(&self) {
        if !self.is_form_presented() {
            return;
        }
        self.bump_form_generation();
        self.inner.services.form.dismiss();
        self.inner.presentations.borrow_mut().form_dismissed();
        self.inner.arbiter.foreground_changed();
    }

    /// Removes one attachment and deletes its file. `false` if it was not present.
    pub async fn remove_attachment(&self, id: AttachmentId) -> bool {
        let Some(attachment) = self.inner.session.borrow_mut().remove_attachment(id) else {
            tracing::debug!(%id, "remove requested for attachment not in session");
            return false;
        };
        self.release_attachments(vec![attachment], "remove attachment").await;
        self.notify(|delegate| delegate.on_attachment_removed(id));
        true
    }

    /// Resets every field and deletes every attachment file.
    pub async fn clear_session(&self) -> usize {
        let released = self.inner.session.borrow_mut().clear();
        let count = released.len();
        self.release_attachments(released, "clear session").await;
        tracing::info!(count, "session cleared");
        self.notify(|delegate| delegate.on_session_cleared());
        count
    }

    /// Deletes capture files orphaned by a previous process.
    pub async fn prune_orphaned_media(&self) -> StorageResult<PruneReport> {
        let media = self.inner.media.clone();
        let max_age = self.inner.config.stale_temp_max_age();
        crate::worker::run_worker_action(move || media.prune_stale_temp_files(max_age))
            .await
            .map_err(|err| crate::storage::StorageError::Worker(err.to_string()))?
    }

    /// Deletes backing files, holding back any the in-flight report still reads.
    pub(crate) async fn release_attachments(
        &self,
        attachments: Vec<MediaAttachment>,
        stage: &'static str,
    ) {
        let mut files = Vec::with_capacity(attachments.len());
        {
            let pinned = self.inner.pinned.borrow();
            let mut deferred = self.inner.deferred_release.borrow_mut();
            for attachment in attachments {
                if pinned.contains(&attachment.id()) {
                    tracing::debug!(id = %attachment.id(), stage, "file in use by upload; deferring delete");
                    deferred.push(attachment.into_file());
                } else {
                    files.push(attachment.into_file());
                }
            }
        }
        MediaStore::release_all_in_background(files, stage).await;
    }

    pub(crate) fn resolve_presenter(&self) -> Option<(PresenterId, PresenterSource)> {
        let tracker = self.inner.presentations.borrow();
        resolve_presenter(&tracker, self.inner.services.host.as_ref())
    }

    pub(crate) async fn attach(
        &self,
        file: BackingFile,
        kind: MediaKind,
    ) -> Result<AttachmentId, WorkflowError> {
        let attachment = MediaStore::describe_in_background(file, kind).await?;
        let summary = attachment.summary();
        let id = self
            .inner
            .session
            .borrow_mut()
            .append_attachment(attachment)?;
        tracing::info!(%id, ?kind, file = %summary.file_name, "attachment added");
        self.notify(|delegate| delegate.on_attachment_added(&summary));
        Ok(id)
    }

    /// Auto-presents the form after the settle delay unless it is already up.
    pub(crate) fn schedule_form_presentation(&self) {
        if self.is_form_presented() {
            return;
        }
        let coordinator = self.clone();
        let settle = self.inner.config.auto_present_settle();
        tokio::task::spawn_local(async move {
            tokio::time::sleep(settle).await;
            if let Err(err) = coordinator.present_report_form() {
                tracing::warn!(%err, "auto-present of report form failed");
            }
        });
    }

    pub(crate) fn notify(&self, f: impl FnOnce(&dyn HostDelegate)) {
        let delegate = self.inner.delegate.borrow().clone();
        if let Some(delegate) = delegate {
            f(delegate.as_ref());
        }
    }

    pub(crate) fn has_delegate(&self) -> bool {
        self.inner.delegate.borrow().is_some()
    }

    fn bump_form_generation(&self) -> u64 {
        let next = self.inner.form_generation.get().wrapping_add(1);
        self.inner.form_generation.set(next);
        next
    }
}
