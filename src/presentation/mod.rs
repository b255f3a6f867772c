//! Contracts with the host's stack of modally presented surfaces.
//!
//! Every presenter receives a single-use responder. Consuming it reports the
//! outcome; dropping it is read as the implicit outcome (cancel, swipe-away).

mod responder;
mod tracker;

use std::fmt;
use std::path::Path;

use thiserror::Error;

use crate::session::{MediaKind, SessionSnapshot};

pub use responder::{
    ConfirmationChoice, ConfirmationResponder, DismissCause, DismissSignal, EditorResponder,
    EditorResult,
};
pub(crate) use responder::{confirmation_channel, dismiss_channel, editor_channel};
pub use tracker::{
    resolve_presenter, ForegroundPredicate, PresentationTracker, PresenterSource, SurfaceKind,
};

/// Host-assigned handle for a surface that can present other surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PresenterId(u64);

impl PresenterId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PresenterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "presenter#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceOwner {
    /// One of the coordinator's own surfaces.
    Coordinator,
    /// Something one of the coordinator's surfaces presented (share sheet, picker).
    PresentedByCoordinator,
    Host,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostSurface {
    pub presenter: PresenterId,
    pub owner: SurfaceOwner,
}

#[derive(Debug, Error)]
pub enum PresentationError {
    #[error("no presentation surface is available")]
    NoSurface,
    #[error("{0} is no longer on screen")]
    PresenterGone(PresenterId),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Read-only view of what the host currently shows.
pub trait PresentationHost {
    fn topmost(&self) -> Option<HostSurface>;
    fn is_live(&self, presenter: PresenterId) -> bool;
}

pub trait AnnotationEditor {
    fn present(
        &self,
        presenter: PresenterId,
        image: &Path,
        responder: EditorResponder,
    ) -> Result<(), PresentationError>;
}

pub trait PreviewPresenter {
    /// `on_dismiss` must be consumed or dropped once the preview leaves the screen,
    /// however it was dismissed.
    fn present(
        &self,
        presenter: PresenterId,
        media: &Path,
        kind: MediaKind,
        on_dismiss: DismissSignal,
    ) -> Result<(), PresentationError>;
}

pub trait ConfirmationPresenter {
    fn present(
        &self,
        presenter: PresenterId,
        media: &Path,
        responder: ConfirmationResponder,
    ) -> Result<(), PresentationError>;
}

pub trait ReportFormPresenter {
    /// Returns the presenter id of the form itself.
    fn present(
        &self,
        presenter: PresenterId,
        snapshot: SessionSnapshot,
        on_dismiss: DismissSignal,
    ) -> Result<PresenterId, PresentationError>;

    fn dismiss(&self);
}
