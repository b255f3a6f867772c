use std::cell::RefCell;
use std::rc::Rc;

use super::{HostSurface, PresentationHost, PresenterId, SurfaceOwner};
use crate::overlay::{BlockingProbe, BlockingReason};

/// Coordinator-owned surfaces that can sit in the foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    AnnotationEditor,
    RecordingPreview,
    AttachmentPreview,
    ConfirmationDialog,
    ErrorAlert,
}

/// Which internal surfaces are on screen right now.
#[derive(Debug, Default)]
pub struct PresentationTracker {
    form: Option<PresenterId>,
    modals: Vec<SurfaceKind>,
    last_presenter: Option<PresenterId>,
}

impl PresentationTracker {
    pub fn open(&mut self, kind: SurfaceKind) {
        tracing::debug!(?kind, "internal surface presented");
        self.modals.push(kind);
    }

    pub fn close(&mut self, kind: SurfaceKind) {
        if let Some(index) = self.modals.iter().rposition(|open| *open == kind) {
            self.modals.remove(index);
            tracing::debug!(?kind, "internal surface dismissed");
        } else {
            tracing::warn!(?kind, "dismissal reported for a surface that was not open");
        }
    }

    pub fn top_modal(&self) -> Option<SurfaceKind> {
        self.modals.last().copied()
    }

    pub fn form_presented(&mut self, presenter: PresenterId) {
        self.form = Some(presenter);
    }

    pub fn form_dismissed(&mut self) {
        self.form = None;
    }

    pub fn is_form_presented(&self) -> bool {
        self.form.is_some()
    }

    pub fn form_presenter(&self) -> Option<PresenterId> {
        self.form
    }

    pub fn remember_presenter(&mut self, presenter: PresenterId) {
        self.last_presenter = Some(presenter);
    }

    pub fn last_presenter(&self) -> Option<PresenterId> {
        self.last_presenter
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenterSource {
    LastKnown,
    ReportForm,
    Topmost,
}

/// Picks the surface to present on: last known live presenter, then the
/// report form, then whatever the host reports on top.
pub fn resolve_presenter(
    tracker: &PresentationTracker,
    host: &dyn PresentationHost,
) -> Option<(PresenterId, PresenterSource)> {
    if let Some(last) = tracker.last_presenter().filter(|id| host.is_live(*id)) {
        return Some((last, PresenterSource::LastKnown));
    }
    if let Some(form) = tracker.form_presenter().filter(|id| host.is_live(*id)) {
        return Some((form, PresenterSource::ReportForm));
    }
    host.topmost()
        .map(|surface| (surface.presenter, PresenterSource::Topmost))
}

/// Best-effort answer to "is anything of ours in front right now".
pub struct ForegroundPredicate {
    tracker: Rc<RefCell<PresentationTracker>>,
    host: Rc<dyn PresentationHost>,
}

impl ForegroundPredicate {
    pub fn new(tracker: Rc<RefCell<PresentationTracker>>, host: Rc<dyn PresentationHost>) -> Self {
        Self { tracker, host }
    }
}

impl BlockingProbe for ForegroundPredicate {
    fn current_blocking_reason(&self) -> Option<BlockingReason> {
        {
            let tracker = self.tracker.borrow();
            if let Some(kind) = tracker.top_modal() {
                return Some(BlockingReason::InternalModal(kind));
            }
            if tracker.is_form_presented() {
                return Some(BlockingReason::ReportForm);
            }
        }
        match self.host.topmost() {
            Some(HostSurface {
                owner: SurfaceOwner::Coordinator | SurfaceOwner::PresentedByCoordinator,
                ..
            }) => Some(BlockingReason::CoordinatorSurfaceOnTop),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashSet;

    #[derive(Default)]
    struct FakeHost {
        topmost: Cell<Option<HostSurface>>,
        live: RefCell<HashSet<PresenterId>>,
    }

    impl PresentationHost for FakeHost {
        fn topmost(&self) -> Option<HostSurface> {
            self.topmost.get()
        }

        fn is_live(&self, presenter: PresenterId) -> bool {
            self.live.borrow().contains(&presenter)
        }
    }

    fn surface(raw: u64, owner: SurfaceOwner) -> HostSurface {
        HostSurface {
            presenter: PresenterId::new(raw),
            owner,
        }
    }

    #[test]
    fn resolve_presenter_walks_last_known_then_form_then_topmost() {
        let host = FakeHost::default();
        let mut tracker = PresentationTracker::default();
        assert_eq!(resolve_presenter(&tracker, &host), None);

        host.topmost.set(Some(surface(9, SurfaceOwner::Host)));
        assert_eq!(
            resolve_presenter(&tracker, &host),
            Some((PresenterId::new(9), PresenterSource::Topmost))
        );

        tracker.form_presented(PresenterId::new(2));
        tracker.remember_presenter(PresenterId::new(1));
        host.live.borrow_mut().insert(PresenterId::new(2));
        assert_eq!(
            resolve_presenter(&tracker, &host),
            Some((PresenterId::new(2), PresenterSource::ReportForm))
        );

        host.live.borrow_mut().insert(PresenterId::new(1));
        assert_eq!(
            resolve_presenter(&tracker, &host),
            Some((PresenterId::new(1), PresenterSource::LastKnown))
        );
    }

    #[test]
    fn close_removes_most_recent_matching_surface() {
        let mut tracker = PresentationTracker::default();
        tracker.open(SurfaceKind::RecordingPreview);
        tracker.open(SurfaceKind::ConfirmationDialog);
        tracker.close(SurfaceKind::RecordingPreview);
        assert_eq!(tracker.top_modal(), Some(SurfaceKind::ConfirmationDialog));
        tracker.close(SurfaceKind::ConfirmationDialog);
        assert_eq!(tracker.top_modal(), None);
        tracker.close(SurfaceKind::ConfirmationDialog);
        assert_eq!(tracker.top_modal(), None);
    }

    #[test]
    fn foreground_predicate_reports_internal_surfaces_first() {
        let tracker = Rc::new(RefCell::new(PresentationTracker::default()));
        let host = Rc::new(FakeHost::default());
        let predicate = ForegroundPredicate::new(Rc::clone(&tracker), host.clone());
        assert_eq!(predicate.current_blocking_reason(), None);

        host.topmost
            .set(Some(surface(4, SurfaceOwner::PresentedByCoordinator)));
        assert_eq!(
            predicate.current_blocking_reason(),
            Some(BlockingReason::CoordinatorSurfaceOnTop)
        );

        tracker.borrow_mut().form_presented(PresenterId::new(5));
        assert_eq!(
            predicate.current_blocking_reason(),
            Some(BlockingReason::ReportForm)
        );

        tracker.borrow_mut().open(SurfaceKind::ErrorAlert);
        assert_eq!(
            predicate.current_blocking_reason(),
            Some(BlockingReason::InternalModal(SurfaceKind::ErrorAlert))
        );

        tracker.borrow_mut().close(SurfaceKind::ErrorAlert);
        tracker.borrow_mut().form_dismissed();
        host.topmost.set(Some(surface(4, SurfaceOwner::Host)));
        assert_eq!(predicate.current_blocking_reason(), None);
    }
}
