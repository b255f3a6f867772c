use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::storage::BackingFile;
use crate::worker::run_worker_action;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture failed: {message}")]
    Failed { message: String },
    #[error("capture reported success but {path} does not exist")]
    MissingFile { path: PathBuf },
    #[error("capture io error")]
    Io(#[from] std::io::Error),
    #[error("capture worker stopped: {0}")]
    Worker(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Takes a screenshot into a fresh temp file. The caller owns deleting it.
pub trait CaptureService: Send + Sync {
    fn capture_screen(&self) -> Result<PathBuf, CaptureError>;
}

pub trait RecordingService: Send + Sync {
    fn start_recording(&self) -> Result<(), CaptureError>;

    /// The returned file must exist when this succeeds.
    fn stop_recording(&self) -> Result<PathBuf, CaptureError>;
}

pub(crate) async fn capture_screen_with(
    service: Arc<dyn CaptureService>,
) -> Result<BackingFile, CaptureError> {
    let path = run_capture_action(move || ensure_exists(service.capture_screen()?)).await?;
    tracing::info!(path = %path.display(), "screenshot captured");
    Ok(BackingFile::new(path))
}

pub(crate) async fn start_recording_with(
    service: Arc<dyn RecordingService>,
) -> Result<(), CaptureError> {
    run_capture_action(move || service.start_recording()).await?;
    tracing::info!("screen recording started");
    Ok(())
}

pub(crate) async fn stop_recording_with(
    service: Arc<dyn RecordingService>,
) -> Result<BackingFile, CaptureError> {
    let path = run_capture_action(move || ensure_exists(service.stop_recording()?)).await?;
    tracing::info!(path = %path.display(), "screen recording stopped");
    Ok(BackingFile::new(path))
}

fn ensure_exists(path: PathBuf) -> Result<PathBuf, CaptureError> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(CaptureError::MissingFile { path })
    }
}

async fn run_capture_action<T, W>(work: W) -> Result<T, CaptureError>
where
    T: Send + 'static,
    W: FnOnce() -> Result<T, CaptureError> + Send + 'static,
{
    run_worker_action(work).await.map_err(|err| {
        tracing::error!(?err, "capture worker did not complete");
        CaptureError::Worker(err.to_string())
    })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FakeRecorder {
        calls: Mutex<Vec<&'static str>>,
        output: PathBuf,
        fail_stop: bool,
    }

    impl RecordingService for FakeRecorder {
        fn start_recording(&self) -> Result<(), CaptureError> {
            self.calls.lock().unwrap().push("start");
            Ok(())
        }

        fn stop_recording(&self) -> Result<PathBuf, CaptureError> {
            self.calls.lock().unwrap().push("stop");
            if self.fail_stop {
                return Err(CaptureError::Failed {
                    message: "encoder crashed".to_string(),
                });
            }
            Ok(self.output.clone())
        }
    }

    struct PanickingCapture;

    impl CaptureService for PanickingCapture {
        fn capture_screen(&self) -> Result<PathBuf, CaptureError> {
            panic!("display server went away");
        }
    }

    #[tokio::test]
    async fn recording_round_trip_runs_on_worker() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("capture_rec.mp4");
        std::fs::write(&output, b"mp4").unwrap();
        let recorder = Arc::new(FakeRecorder {
            calls: Mutex::new(Vec::new()),
            output: output.clone(),
            fail_stop: false,
        });

        start_recording_with(recorder.clone()).await.unwrap();
        let file = stop_recording_with(recorder.clone()).await.unwrap();

        assert_eq!(file.path(), output);
        assert_eq!(*recorder.calls.lock().unwrap(), vec!["start", "stop"]);
    }

    #[tokio::test]
    async fn reported_file_that_does_not_exist_is_a_capture_error() {
        let recorder = Arc::new(FakeRecorder {
            calls: Mutex::new(Vec::new()),
            output: PathBuf::from("/nonexistent/capture_rec.mp4"),
            fail_stop: false,
        });
        let err = stop_recording_with(recorder).await.unwrap_err();
        assert!(matches!(err, CaptureError::MissingFile { .. }));
    }

    #[tokio::test]
    async fn service_errors_are_reported_not_raised() {
        let recorder = Arc::new(FakeRecorder {
            calls: Mutex::new(Vec::new()),
            output: PathBuf::new(),
            fail_stop: true,
        });
        let err = stop_recording_with(recorder).await.unwrap_err();
        assert!(matches!(err, CaptureError::Failed { .. }));
    }

    #[tokio::test]
    async fn panicking_service_degrades_to_worker_error() {
        let err = capture_screen_with(Arc::new(PanickingCapture))
            .await
            .unwrap_err();
        assert!(matches!(err, CaptureError::Worker(_)));
    }
}
