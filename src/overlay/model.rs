use crate::presentation::SurfaceKind;

/// Internal operations that take foreground priority over the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuspendReason {
    ScreenshotAnnotation,
    RecordingPreview,
    RecordingConfirmation,
    AttachmentPreview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockingReason {
    ReportForm,
    InternalModal(SurfaceKind),
    CoordinatorSurfaceOnTop,
    Suspended(SuspendReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityState {
    Visible,
    Suspended(SuspendReason),
    HiddenPendingRetry {
        attempt: u32,
        reason: BlockingReason,
    },
    /// Not evaluated yet (`None`) or retries exhausted while still blocked.
    Hidden { reason: Option<BlockingReason> },
}

impl Default for VisibilityState {
    fn default() -> Self {
        Self::Hidden { reason: None }
    }
}

impl VisibilityState {
    pub const fn is_visible(self) -> bool {
        matches!(self, Self::Visible)
    }
}
