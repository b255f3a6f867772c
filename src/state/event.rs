#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionEvent {
    Submit,
    TimeoutElapsed,
    Succeed,
    Fail,
}
