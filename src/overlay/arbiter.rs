use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use super::model::{BlockingReason, SuspendReason, VisibilityState};
use crate::config::CoordinatorConfig;

/// Pure query, called on every retry attempt.
pub trait BlockingProbe {
    fn current_blocking_reason(&self) -> Option<BlockingReason>;
}

/// The floating control surface. `show` also brings it to the front.
pub trait OverlaySurface {
    fn show(&self);
    fn hide(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &CoordinatorConfig) -> Self {
        Self {
            max_attempts: config.overlay_max_attempts.max(1),
            delay: config.overlay_retry_delay(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&CoordinatorConfig::default())
    }
}

/// Decides whether the overlay may be shown, re-asking the probe on a bounded
/// retry schedule while something else holds the foreground.
///
/// Must be driven from inside a `tokio::task::LocalSet`; retries are spawned
/// with `spawn_local`.
#[derive(Clone)]
pub struct OverlayArbiter {
    inner: Rc<ArbiterInner>,
}

struct ArbiterInner {
    policy: RetryPolicy,
    probe: Rc<dyn BlockingProbe>,
    surface: Rc<dyn OverlaySurface>,
    state: Cell<VisibilityState>,
    suspensions: RefCell<Vec<SuspendReason>>,
    shown: Cell<bool>,
    generation: Cell<u64>,
}

impl OverlayArbiter {
    pub fn new(
        policy: RetryPolicy,
        probe: Rc<dyn BlockingProbe>,
        surface: Rc<dyn OverlaySurface>,
    ) -> Self {
        Self {
            inner: Rc::new(ArbiterInner {
                policy: RetryPolicy {
                    max_attempts: policy.max_attempts.max(1),
                    delay: policy.delay,
                },
                probe,
                surface,
                state: Cell::new(VisibilityState::default()),
                suspensions: RefCell::new(Vec::new()),
                shown: Cell::new(false),
                generation: Cell::new(0),
            }),
        }
    }

    pub fn state(&self) -> VisibilityState {
        self.inner.state.get()
    }

    pub fn is_suspended(&self) -> bool {
        !self.inner.suspensions.borrow().is_empty()
    }

    /// Hides the overlay until `resume(reason)` or `force_resume`.
    pub fn suspend(&self, reason: SuspendReason) {
        {
            let mut suspensions = self.inner.suspensions.borrow_mut();
            if !suspensions.contains(&reason) {
                suspensions.push(reason);
            }
        }
        self.inner.cancel_retries();
        self.inner.set_shown(false);
        self.inner.set_state(VisibilityState::Suspended(reason));
    }

    /// Lifts one suspension. Returns `false` if `reason` was not active.
    pub fn resume(&self, reason: SuspendReason) -> bool {
        let remaining = {
            let mut suspensions = self.inner.suspensions.borrow_mut();
            let Some(index) = suspensions.iter().position(|active| *active == reason) else {
                tracing::warn!(?reason, "resume requested for an inactive suspension");
                return false;
            };
            suspensions.remove(index);
            suspensions.last().copied()
        };

        match remaining {
            Some(still_active) => self
                .inner
                .set_state(VisibilityState::Suspended(still_active)),
            None => self.reevaluate(),
        }
        true
    }

    pub fn force_resume(&self) {
        self.inner.suspensions.borrow_mut().clear();
        self.reevaluate();
    }

    /// Entry point for foreground-change notifications from the host.
    pub fn foreground_changed(&self) {
        self.reevaluate();
    }

    /// Starts a fresh evaluation, superseding any retry loop in flight.
    pub fn reevaluate(&self) {
        if let Some(reason) = self.inner.active_suspension() {
            self.inner.set_state(VisibilityState::Suspended(reason));
            return;
        }

        let generation = self.inner.cancel_retries();
        if self.inner.attempt(1) {
            return;
        }

        let inner = Rc::clone(&self.inner);
        tokio::task::spawn_local(async move {
            for attempt in 2..=inner.policy.max_attempts {
                tokio::time::sleep(inner.policy.delay).await;
                if inner.generation.get() != generation {
                    return;
                }
                if inner.attempt(attempt) {
                    return;
                }
            }
        });
    }
}

impl ArbiterInner {
    fn active_suspension(&self) -> Option<SuspendReason> {
        self.suspensions.borrow().last().copied()
    }

    fn cancel_retries(&self) -> u64 {
        let next = self.generation.get().wrapping_add(1);
        self.generation.set(next);
        next
    }

    /// Returns `true` once the evaluation has settled.
    fn attempt(&self, attempt: u32) -> bool {
        if let Some(reason) = self.active_suspension() {
            self.set_state(VisibilityState::Suspended(reason));
            return true;
        }

        match self.probe.current_blocking_reason() {
            None => {
                self.set_shown(true);
                self.set_state(VisibilityState::Visible);
                true
            }
            Some(reason) => {
                self.set_shown(false);
                if attempt >= self.policy.max_attempts {
                    tracing::debug!(
                        attempt,
                        ?reason,
                        "overlay still blocked after final attempt; leaving it hidden"
                    );
                    self.set_state(VisibilityState::Hidden {
                        reason: Some(reason),
                    });
                    true
                } else {
                    self.set_state(VisibilityState::HiddenPendingRetry { attempt, reason });
                    false
                }
            }
        }
    }

    fn set_shown(&self, shown: bool) {
        if self.shown.replace(shown) == shown {
            return;
        }
        if shown {
            self.surface.show();
        } else {
            self.surface.hide();
        }
    }

    fn set_state(&self, next: VisibilityState) {
        let previous = self.state.replace(next);
        if previous != next {
            tracing::debug!(from = ?previous, to = ?next, "overlay visibility transition");
        }
    }
}
