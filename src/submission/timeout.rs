use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// A deferred callback that fires once after `duration` unless cancelled first.
pub(crate) struct TimeoutGuard {
    token: CancellationToken,
}

impl TimeoutGuard {
    pub(crate) fn arm<F>(duration: Duration, on_elapsed: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        tokio::task::spawn_local(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(duration) => on_elapsed(),
            }
        });
        Self { token }
    }

    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }
}
