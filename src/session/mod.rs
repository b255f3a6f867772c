mod model;
mod store;

pub use model::{
    AttachmentId, AttachmentSummary, MediaAttachment, MediaKind, SessionField, SessionSnapshot,
    Stage,
};
pub use store::{SessionError, SessionStore};
