use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::BackingFile;

/// Opaque handle naming one attachment for its whole life in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttachmentId(Uuid);

impl AttachmentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AttachmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attachment-{}", self.0.simple())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Screenshot,
    ScreenRecording,
    Other,
}

impl MediaKind {
    pub const fn file_extension(self) -> &'static str {
        match self {
            Self::Screenshot => "png",
            Self::ScreenRecording => "mp4",
            Self::Other => "bin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Triage,
    Backlog,
    Todo,
    InProgress,
}

impl Stage {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Triage => "stage::triage",
            Self::Backlog => "stage::backlog",
            Self::Todo => "stage::todo",
            Self::InProgress => "stage::in-progress",
        }
    }
}

/// A captured file owned by the session.
///
/// Not `Clone`: the backing file leaves the session exactly once, either by
/// [`MediaAttachment::into_file`] on removal or when the session is cleared.
#[derive(Debug)]
pub struct MediaAttachment {
    id: AttachmentId,
    kind: MediaKind,
    file: BackingFile,
    file_name: String,
    captured_at: SystemTime,
    size_bytes: Option<u64>,
    dimensions: Option<(u32, u32)>,
}

impl MediaAttachment {
    pub fn new(kind: MediaKind, file: BackingFile, captured_at: SystemTime) -> Self {
        let file_name = file.display_name();
        Self {
            id: AttachmentId::new(),
            kind,
            file,
            file_name,
            captured_at,
            size_bytes: None,
            dimensions: None,
        }
    }

    pub fn with_size_bytes(mut self, size_bytes: Option<u64>) -> Self {
        self.size_bytes = size_bytes;
        self
    }

    pub fn with_dimensions(mut self, dimensions: Option<(u32, u32)>) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn id(&self) -> AttachmentId {
        self.id
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn file(&self) -> &BackingFile {
        &self.file
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn summary(&self) -> AttachmentSummary {
        AttachmentSummary {
            id: self.id,
            kind: self.kind,
            path: self.file.path().to_path_buf(),
            file_name: self.file_name.clone(),
            captured_at: self.captured_at,
            size_bytes: self.size_bytes,
            dimensions: self.dimensions,
        }
    }

    pub fn into_file(self) -> BackingFile {
        self.file
    }

    #[cfg(test)]
    pub(crate) fn with_id(mut self, id: AttachmentId) -> Self {
        self.id = id;
        self
    }
}

/// Read-only view of an attachment for forms, previews and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentSummary {
    pub id: AttachmentId,
    pub kind: MediaKind,
    pub path: PathBuf,
    pub file_name: String,
    pub captured_at: SystemTime,
    pub size_bytes: Option<u64>,
    pub dimensions: Option<(u32, u32)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionField {
    Description(String),
    /// Free-form label key such as `priority::critical`; empty means unset.
    Priority(String),
    Stage(Stage),
    WebhookOverride(Option<String>),
    Assignee(Option<String>),
    IssueNumber(Option<u64>),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SessionSnapshot {
    pub description: String,
    pub priority: String,
    pub stage: Stage,
    pub webhook_override: Option<String>,
    pub assignee: Option<String>,
    pub issue_number: Option<u64>,
    pub attachments: Vec<AttachmentSummary>,
}
