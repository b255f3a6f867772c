use crate::capture::CaptureError;
use crate::presentation::PresentationError;
use crate::session::SessionError;
use crate::state::StateError;
use crate::storage::StorageError;
use crate::submission::SubmissionError;
use crate::workflow::WorkflowError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Presentation(#[from] PresentationError),
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}
