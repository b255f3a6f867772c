pub mod error;
pub mod event;
pub mod machine;
pub mod model;

pub use error::{StateError, StateResult};
pub use event::SubmissionEvent;
pub use machine::SubmissionMachine;
pub use model::SubmissionPhase;
