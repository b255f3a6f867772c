use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tokio::time::Instant;

/// A captured screenshot waiting on the annotation editor.
#[derive(Debug, Clone)]
pub struct PendingCapture {
    pub candidate: PathBuf,
    pub started_at: Instant,
}

/// Holds at most one pending annotation. The slot frees itself when the
/// guard returned by [`PendingCaptureSlot::begin`] is dropped.
#[derive(Debug, Default, Clone)]
pub(crate) struct PendingCaptureSlot {
    slot: Rc<RefCell<Option<PendingCapture>>>,
}

impl PendingCaptureSlot {
    /// `None` when another annotation already holds the slot.
    pub(crate) fn begin(&self, candidate: &Path) -> Option<PendingCaptureGuard> {
        let mut slot = self.slot.borrow_mut();
        if slot.is_some() {
            return None;
        }
        *slot = Some(PendingCapture {
            candidate: candidate.to_path_buf(),
            started_at: Instant::now(),
        });
        Some(PendingCaptureGuard {
            slot: Rc::clone(&self.slot),
        })
    }

    pub(crate) fn current(&self) -> Option<PendingCapture> {
        self.slot.borrow().clone()
    }
}

pub(crate) struct PendingCaptureGuard {
    slot: Rc<RefCell<Option<PendingCapture>>>,
}

impl Drop for PendingCaptureGuard {
    fn drop(&mut self) {
        if let Some(pending) = self.slot.borrow_mut().take() {
            tracing::debug!(
                candidate = %pending.candidate.display(),
                elapsed_ms = pending.started_at.elapsed().as_millis() as u64,
                "pending annotation settled"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_fails_until_guard_drops() {
        let slot = PendingCaptureSlot::default();
        let guard = slot.begin(Path::new("/tmp/capture_a.png")).expect("slot is free");
        assert!(slot.begin(Path::new("/tmp/capture_b.png")).is_none());
        assert_eq!(
            slot.current().map(|pending| pending.candidate),
            Some(PathBuf::from("/tmp/capture_a.png"))
        );

        drop(guard);
        assert!(slot.current().is_none());
        assert!(slot.begin(Path::new("/tmp/capture_b.png")).is_some());
    }
}
