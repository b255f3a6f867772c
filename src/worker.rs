use tokio::task::JoinError;

/// Runs blocking work (file system, capture tooling) off the coordination context.
pub(crate) async fn run_worker_action<T, W>(work: W) -> Result<T, JoinError>
where
    T: Send + 'static,
    W: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(work).await
}
