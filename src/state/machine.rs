use super::error::{StateError, StateResult};
use super::{SubmissionEvent, SubmissionPhase};

#[derive(Debug, Default)]
pub struct SubmissionMachine {
    phase: SubmissionPhase,
}

impl SubmissionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    fn next_phase(&self, event: SubmissionEvent) -> Option<SubmissionPhase> {
        use SubmissionEvent::*;
        use SubmissionPhase::*;
        match (self.phase, event) {
            (Idle | Succeeded | Failed, Submit) => Some(Submitting),
            (Submitting, TimeoutElapsed) => Some(TimedOut),
            (Submitting | TimedOut, Succeed) => Some(Succeeded),
            (Submitting | TimedOut, Fail) => Some(Failed),
            _ => None,
        }
    }

    pub fn transition(&mut self, event: SubmissionEvent) -> StateResult<SubmissionPhase> {
        let from = self.phase;
        let next = self.next_phase(event).ok_or_else(|| {
            tracing::warn!(from = ?from, event = ?event, "invalid submission transition requested");
            StateError::InvalidTransition { from, event }
        })?;

        tracing::debug!(from = ?from, event = ?event, to = ?next, "submission transition");
        self.phase = next;
        Ok(next)
    }
}
