use thiserror::Error;

use super::model::{AttachmentId, MediaAttachment, SessionField, SessionSnapshot, Stage};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("attachment {0} is already part of the session")]
    DuplicateAttachment(AttachmentId),
}

/// In-memory state of the report being composed.
///
/// Performs no I/O. Removal hands the attachment back to the caller, who owns
/// deleting its backing file.
#[derive(Debug, Default)]
pub struct SessionStore {
    description: String,
    priority: String,
    stage: Stage,
    webhook_override: Option<String>,
    assignee: Option<String>,
    issue_number: Option<u64>,
    attachments: Vec<MediaAttachment>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_field(&mut self, field: SessionField) {
        tracing::debug!(?field, "update session field");
        match field {
            SessionField::Description(value) => self.description = value,
            SessionField::Priority(value) => self.priority = value,
            SessionField::Stage(value) => self.stage = value,
            SessionField::WebhookOverride(value) => self.webhook_override = value,
            SessionField::Assignee(value) => self.assignee = value,
            SessionField::IssueNumber(value) => self.issue_number = value,
        }
    }

    pub fn append_attachment(
        &mut self,
        attachment: MediaAttachment,
    ) -> Result<AttachmentId, SessionError> {
        let id = attachment.id();
        if self.contains(id) {
            return Err(SessionError::DuplicateAttachment(id));
        }
        tracing::debug!(%id, kind = ?attachment.kind(), "append attachment");
        self.attachments.push(attachment);
        Ok(id)
    }

    /// Returns `None` when the id is not (or no longer) in the session.
    pub fn remove_attachment(&mut self, id: AttachmentId) -> Option<MediaAttachment> {
        let index = self
            .attachments
            .iter()
            .position(|attachment| attachment.id() == id)?;
        Some(self.attachments.remove(index))
    }

    /// Resets every field and returns the attachments whose files must be deleted.
    pub fn clear(&mut self) -> Vec<MediaAttachment> {
        std::mem::take(self).attachments
    }

    /// Drops what a successful submission carried: its attachments, and every
    /// field still holding the submitted value. Later captures and edits stay.
    pub fn settle_submitted(&mut self, submitted: &SessionSnapshot) -> Vec<MediaAttachment> {
        if self.description == submitted.description {
            self.description.clear();
        }
        if self.priority == submitted.priority {
            self.priority.clear();
        }
        if self.stage == submitted.stage {
            self.stage = Stage::default();
        }
        if self.webhook_override == submitted.webhook_override {
            self.webhook_override = None;
        }
        if self.assignee == submitted.assignee {
            self.assignee = None;
        }
        if self.issue_number == submitted.issue_number {
            self.issue_number = None;
        }

        let (sent, kept) = std::mem::take(&mut self.attachments)
            .into_iter()
            .partition(|attachment| {
                submitted
                    .attachments
                    .iter()
                    .any(|summary| summary.id == attachment.id())
            });
        self.attachments = kept;
        sent
    }

    pub fn contains(&self, id: AttachmentId) -> bool {
        self.attachments.iter().any(|attachment| attachment.id() == id)
    }

    pub fn attachment(&self, id: AttachmentId) -> Option<&MediaAttachment> {
        self.attachments.iter().find(|attachment| attachment.id() == id)
    }

    pub fn attachment_count(&self) -> usize {
        self.attachments.len()
    }

    /// The user override when present and non-blank, else the configured default.
    pub fn effective_webhook(&self, default: Option<&str>) -> Option<String> {
        self.webhook_override
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .or_else(|| default.map(str::trim).filter(|value| !value.is_empty()))
            .map(str::to_string)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            description: self.description.clone(),
            priority: self.priority.clone(),
            stage: self.stage,
            webhook_override: self.webhook_override.clone(),
            assignee: self.assignee.clone(),
            issue_number: self.issue_number,
            attachments: self
                .attachments
                .iter()
                .map(MediaAttachment::summary)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MediaKind;
    use crate::storage::BackingFile;
    use std::path::PathBuf;
    use std::time::SystemTime;

    fn attachment(name: &str) -> MediaAttachment {
        MediaAttachment::new(
            MediaKind::Screenshot,
            BackingFile::new(PathBuf::from(format!("/tmp/snapreport-test/{name}.png"))),
            SystemTime::now(),
        )
    }

    fn names(store: &SessionStore) -> Vec<String> {
        store
            .snapshot()
            .attachments
            .into_iter()
            .map(|summary| summary.file_name)
            .collect()
    }

    #[test]
    fn attachments_keep_capture_order_across_removals() {
        let mut store = SessionStore::new();
        let first = store.append_attachment(attachment("a")).unwrap();
        let second = store.append_attachment(attachment("b")).unwrap();
        let third = store.append_attachment(attachment("c")).unwrap();

        let removed = store.remove_attachment(second).expect("b is present");
        assert_eq!(removed.file_name(), "b.png");
        let fourth = store.append_attachment(attachment("d")).unwrap();

        assert_eq!(names(&store), vec!["a.png", "c.png", "d.png"]);
        assert!(store.contains(first));
        assert!(store.contains(third));
        assert!(store.contains(fourth));
        assert!(!store.contains(second));
    }

    #[test]
    fn removing_an_unknown_attachment_reports_not_found() {
        let mut store = SessionStore::new();
        let id = store.append_attachment(attachment("a")).unwrap();

        assert!(store.remove_attachment(id).is_some());
        assert!(store.remove_attachment(id).is_none());
        assert!(store.remove_attachment(AttachmentId::new()).is_none());
        assert_eq!(store.attachment_count(), 0);
    }

    #[test]
    fn clear_resets_fields_and_hands_back_every_attachment() {
        let mut store = SessionStore::new();
        store.set_field(SessionField::Description("crash on save".to_string()));
        store.set_field(SessionField::Priority("priority::critical".to_string()));
        store.set_field(SessionField::Stage(Stage::Todo));
        store.set_field(SessionField::Assignee(Some("sam".to_string())));
        store.set_field(SessionField::IssueNumber(Some(42)));
        store.append_attachment(attachment("a")).unwrap();
        store.append_attachment(attachment("b")).unwrap();

        let released = store.clear();
        assert_eq!(released.len(), 2);
        assert_eq!(store.snapshot(), SessionSnapshot::default());

        assert!(store.clear().is_empty());
    }

    #[test]
    fn settling_a_submission_keeps_later_captures_and_edits() {
        let mut store = SessionStore::new();
        store.set_field(SessionField::Description("crash on save".to_string()));
        store.set_field(SessionField::Stage(Stage::Todo));
        store.append_attachment(attachment("a")).unwrap();
        let submitted = store.snapshot();

        store.set_field(SessionField::Description("also slow to open".to_string()));
        let late = store.append_attachment(attachment("b")).unwrap();

        let sent = store.settle_submitted(&submitted);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].file_name(), "a.png");

        let snapshot = store.snapshot();
        assert_eq!(snapshot.description, "also slow to open");
        assert_eq!(snapshot.stage, Stage::Triage);
        assert_eq!(names(&store), vec!["b.png"]);
        assert!(store.contains(late));
    }

    #[test]
    fn effective_webhook_prefers_non_blank_override() {
        let mut store = SessionStore::new();
        assert_eq!(store.effective_webhook(None), None);
        assert_eq!(
            store.effective_webhook(Some("https://default.example")),
            Some("https://default.example".to_string())
        );

        store.set_field(SessionField::WebhookOverride(Some("  ".to_string())));
        assert_eq!(store.effective_webhook(Some("")), None);

        store.set_field(SessionField::WebhookOverride(Some(
            "https://override.example".to_string(),
        )));
        assert_eq!(
            store.effective_webhook(Some("https://default.example")),
            Some("https://override.example".to_string())
        );
    }

    #[test]
    fn duplicate_append_is_rejected() {
        let mut store = SessionStore::new();
        let first = attachment("a");
        let id = first.id();
        store.append_attachment(first).unwrap();

        let again = attachment("a").with_id(id);
        assert_eq!(
            store.append_attachment(again).unwrap_err(),
            SessionError::DuplicateAttachment(id)
        );
        assert_eq!(store.attachment_count(), 1);
    }
}
