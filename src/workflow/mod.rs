//! Screenshot and recording capture flows.
//!
//! Every flow ends in exactly one of: the artifact attached to the session,
//! or the artifact deleted and an error returned.

mod attachment_preview;
mod pending;
mod recording;
mod screenshot;

use thiserror::Error;

use crate::capture::CaptureError;
use crate::presentation::PresentationError;
use crate::session::{AttachmentId, MediaKind, SessionError};
use crate::storage::StorageError;

pub use pending::PendingCapture;
pub(crate) use pending::PendingCaptureSlot;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error("a screenshot annotation is already in progress")]
    AnnotationInProgress,
    #[error("a screen recording is already running")]
    RecordingInProgress,
    #[error("no screen recording is running")]
    NoActiveRecording,
    #[error("{0:?} capture discarded by the user")]
    Cancelled(MediaKind),
    #[error("attachment {0} is not part of the session")]
    UnknownAttachment(AttachmentId),
    #[error(transparent)]
    Presentation(#[from] PresentationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl WorkflowError {
    pub const fn is_user_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

#[derive(Debug)]
pub enum CaptureOutcome {
    Attached(AttachmentId),
    /// Nothing could host the editor or dialog, so the artifact was kept as-is.
    AutoAttached {
        id: AttachmentId,
        reason: PresentationError,
    },
}

impl CaptureOutcome {
    pub fn attachment_id(&self) -> AttachmentId {
        match self {
            Self::Attached(id) | Self::AutoAttached { id, .. } => *id,
        }
    }
}
