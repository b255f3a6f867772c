mod arbiter;
mod model;

pub use arbiter::{BlockingProbe, OverlayArbiter, OverlaySurface, RetryPolicy};
pub use model::{BlockingReason, SuspendReason, VisibilityState};
