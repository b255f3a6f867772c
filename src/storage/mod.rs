use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use thiserror::Error;

use crate::session::{MediaAttachment, MediaKind};
use crate::worker::run_worker_action;

const DEFAULT_TEMP_PREFIX: &str = "capture_";
const DEFAULT_FALLBACK_TEMP_DIR: &str = "/tmp/snapreport";
const RUNTIME_SUBDIR: &str = "snapreport";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("captured file is missing: {}", path.display())]
    MissingFile { path: PathBuf },
    #[error("background file task failed: {0}")]
    Worker(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// A file on local disk whose deletion is owned by exactly one holder.
///
/// The path is an opaque location; identity lives in
/// [`crate::session::AttachmentId`].
#[derive(Debug, PartialEq, Eq)]
pub struct BackingFile {
    path: PathBuf,
}

impl BackingFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Removed,
    NotFound,
    Failed,
}

#[derive(Debug, Default, Clone)]
pub struct PruneReport {
    pub removed_files: usize,
}

/// Owns the temp directory that capture files live in while they belong to a session.
#[derive(Debug, Clone)]
pub struct MediaStore {
    temp_dir: PathBuf,
}

impl MediaStore {
    pub fn with_temp_dir(temp_dir: PathBuf) -> Self {
        Self { temp_dir }
    }

    pub fn with_default_paths() -> StorageResult<Self> {
        let temp_dir = default_runtime_temp_dir();
        fs::create_dir_all(&temp_dir)?;
        Ok(Self::with_temp_dir(temp_dir))
    }

    /// Builds an attachment for a file that must already exist.
    ///
    /// On error the file is handed back so the caller can still release it.
    pub fn describe(
        file: BackingFile,
        kind: MediaKind,
    ) -> Result<MediaAttachment, (StorageError, BackingFile)> {
        let metadata = match fs::metadata(file.path()) {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => {
                let path = file.path().to_path_buf();
                return Err((StorageError::MissingFile { path }, file));
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let path = file.path().to_path_buf();
                return Err((StorageError::MissingFile { path }, file));
            }
            Err(err) => return Err((StorageError::Io(err), file)),
        };

        let dimensions = match kind {
            MediaKind::Screenshot => image::image_dimensions(file.path())
                .inspect_err(|err| {
                    tracing::debug!(path = %file.path().display(), ?err, "screenshot dimensions unavailable");
                })
                .ok(),
            MediaKind::ScreenRecording | MediaKind::Other => None,
        };

        Ok(MediaAttachment::new(kind, file, SystemTime::now())
            .with_size_bytes(Some(metadata.len()))
            .with_dimensions(dimensions))
    }

    /// Deletes the file; a file that is already gone counts as released.
    pub fn release(file: BackingFile, stage: &str) -> ReleaseOutcome {
        release_with(file, stage, |path| fs::remove_file(path))
    }

    pub async fn describe_in_background(
        file: BackingFile,
        kind: MediaKind,
    ) -> StorageResult<MediaAttachment> {
        let path = file.path().to_path_buf();
        match run_worker_action(move || Self::describe(file, kind)).await {
            Ok(Ok(attachment)) => Ok(attachment),
            Ok(Err((err, file))) => {
                Self::release_in_background(file, "describe failure").await;
                Err(err)
            }
            Err(err) => {
                tracing::error!(path = %path.display(), ?err, "describe task did not complete");
                Err(StorageError::Worker(err.to_string()))
            }
        }
    }

    pub async fn release_in_background(file: BackingFile, stage: &'static str) -> ReleaseOutcome {
        let path = file.path().to_path_buf();
        match run_worker_action(move || Self::release(file, stage)).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(path = %path.display(), ?err, "release task did not complete");
                ReleaseOutcome::Failed
            }
        }
    }

    pub async fn release_all_in_background(
        files: Vec<BackingFile>,
        stage: &'static str,
    ) -> Vec<ReleaseOutcome> {
        if files.is_empty() {
            return Vec::new();
        }
        let count = files.len();
        match run_worker_action(move || {
            files
                .into_iter()
                .map(|file| Self::release(file, stage))
                .collect::<Vec<_>>()
        })
        .await
        {
            Ok(outcomes) => outcomes,
            Err(err) => {
                tracing::error!(count, ?err, "bulk release task did not complete");
                vec![ReleaseOutcome::Failed; count]
            }
        }
    }

    /// Removes capture files left behind by earlier processes.
    pub fn prune_stale_temp_files(&self, max_age: Duration) -> StorageResult<PruneReport> {
        let now = SystemTime::now();
        let mut report = PruneReport::default();

        if !self.temp_dir.exists() {
            return Ok(report);
        }

        for entry in fs::read_dir(&self.temp_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            if path
                .file_name()
                .and_then(|name| name.to_str())
                .is_none_or(|name| !name.starts_with(DEFAULT_TEMP_PREFIX))
            {
                continue;
            }

            let modified = fs::metadata(&path)?.modified()?;
            let age = now.duration_since(modified).unwrap_or(Duration::ZERO);

            if age > max_age {
                match fs::remove_file(&path) {
                    Ok(()) => {
                        report.removed_files += 1;
                    }
                    Err(err) => {
                        tracing::warn!(
                            path = %path.display(),
                            ?err,
                            "failed to remove stale temp capture file"
                        );
                    }
                }
            }
        }

        Ok(report)
    }
}

fn release_with<F>(file: BackingFile, stage: &str, remove_file: F) -> ReleaseOutcome
where
    F: FnOnce(&Path) -> io::Result<()>,
{
    match remove_file(file.path()) {
        Ok(()) => {
            tracing::debug!(stage, path = %file.path().display(), "released capture file");
            ReleaseOutcome::Removed
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(
                stage,
                path = %file.path().display(),
                ?err,
                "capture file was already missing during cleanup"
            );
            ReleaseOutcome::NotFound
        }
        Err(err) => {
            tracing::warn!(
                stage,
                path = %file.path().display(),
                ?err,
                "failed to cleanup capture file"
            );
            ReleaseOutcome::Failed
        }
    }
}

fn default_runtime_temp_dir() -> PathBuf {
    std::env::var("XDG_RUNTIME_DIR")
        .map(|dir| PathBuf::from(dir).join(RUNTIME_SUBDIR))
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_FALLBACK_TEMP_DIR))
}
