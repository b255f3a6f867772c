use super::event::SubmissionEvent;
use super::model::SubmissionPhase;
use thiserror::Error;

pub type StateResult<T> = std::result::Result<T, StateError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("invalid submission transition: from {from:?} using event {event:?}")]
    InvalidTransition {
        from: SubmissionPhase,
        event: SubmissionEvent,
    },
}
