use crate::session::{AttachmentId, AttachmentSummary};
use crate::submission::{SubmissionError, SubmissionReceipt};

/// Fire-and-forget notifications to the embedding application.
///
/// Every method has a no-op default so hosts only implement what they show.
pub trait HostDelegate {
    fn on_attachment_added(&self, _attachment: &AttachmentSummary) {}

    fn on_attachment_removed(&self, _id: AttachmentId) {}

    fn on_session_cleared(&self) {}

    /// Show or clear the "submitting" affordance.
    fn on_submission_progress(&self, _active: bool) {}

    /// The upload outlived the timeout window but has not been cancelled.
    fn on_submission_slow(&self) {}

    fn on_submitted(&self, _receipt: &SubmissionReceipt) {}

    fn on_submit_failed(&self, _error: &SubmissionError) {}
}
