/// Lifecycle of the most recent report submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Submitting,
    /// The timeout guard fired; the upload is still in flight.
    TimedOut,
    Succeeded,
    Failed,
}

