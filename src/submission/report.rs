use std::path::PathBuf;

use serde::Serialize;

use crate::session::{AttachmentId, MediaKind, SessionSnapshot, Stage};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportAttachment {
    pub id: AttachmentId,
    pub kind: MediaKind,
    pub path: PathBuf,
    pub file_name: String,
    pub size_bytes: Option<u64>,
}

/// Immutable copy of the session taken at submit time; later edits do not
/// reach an in-flight submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub endpoint: String,
    pub description: String,
    pub labels: Vec<String>,
    pub stage: Stage,
    pub assignee: Option<String>,
    pub issue_number: Option<u64>,
    pub attachments: Vec<ReportAttachment>,
}

impl Report {
    pub fn from_snapshot(snapshot: SessionSnapshot, endpoint: String) -> Self {
        let mut labels = Vec::with_capacity(2);
        if !snapshot.priority.trim().is_empty() {
            labels.push(snapshot.priority.trim().to_string());
        }
        labels.push(snapshot.stage.label().to_string());

        Self {
            endpoint,
            description: snapshot.description,
            labels,
            stage: snapshot.stage,
            assignee: snapshot.assignee.filter(|value| !value.trim().is_empty()),
            issue_number: snapshot.issue_number,
            attachments: snapshot
                .attachments
                .into_iter()
                .map(|attachment| ReportAttachment {
                    id: attachment.id,
                    kind: attachment.kind,
                    path: attachment.path,
                    file_name: attachment.file_name,
                    size_bytes: attachment.size_bytes,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_skip_blank_priority_and_always_carry_stage() {
        let snapshot = SessionSnapshot {
            description: "tap does nothing".to_string(),
            priority: "  ".to_string(),
            assignee: Some(String::new()),
            ..SessionSnapshot::default()
        };
        let report = Report::from_snapshot(snapshot, "https://collector.example".to_string());
        assert_eq!(report.labels, vec!["stage::triage"]);
        assert_eq!(report.assignee, None);

        let snapshot = SessionSnapshot {
            priority: "priority::critical".to_string(),
            stage: Stage::InProgress,
            issue_number: Some(7),
            ..SessionSnapshot::default()
        };
        let report = Report::from_snapshot(snapshot, "https://collector.example".to_string());
        assert_eq!(
            report.labels,
            vec!["priority::critical", "stage::in-progress"]
        );
        assert_eq!(report.issue_number, Some(7));
    }

    #[test]
    fn report_serializes_with_snake_case_kinds() {
        let snapshot = SessionSnapshot::default();
        let mut report = Report::from_snapshot(snapshot, "https://collector.example".to_string());
        report.attachments.push(ReportAttachment {
            id: AttachmentId::new(),
            kind: MediaKind::ScreenRecording,
            path: PathBuf::from("/tmp/capture_a.mp4"),
            file_name: "capture_a.mp4".to_string(),
            size_bytes: Some(12),
        });

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["stage"], "triage");
        assert_eq!(value["attachments"][0]["kind"], "screen_recording");
        assert_eq!(value["endpoint"], "https://collector.example");
    }
}
