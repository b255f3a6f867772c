use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigPathError {
    MissingHomeDirectory,
}

const APP_DIR: &str = "snapreport";
const APP_CONFIG_FILE: &str = "config.json";

/// Coordinator settings from `config.json`. Missing keys take the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Collector endpoint used when the session carries no override.
    pub default_webhook: Option<String>,
    pub overlay_max_attempts: u32,
    pub overlay_retry_delay_ms: u64,
    /// Pause between a preview dismissing and the confirmation dialog appearing.
    pub confirmation_settle_ms: u64,
    /// Pause before the report form auto-presents after a capture is attached.
    pub auto_present_settle_ms: u64,
    pub submission_timeout_secs: u64,
    pub temp_dir: Option<PathBuf>,
    pub stale_temp_max_age_hours: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            default_webhook: None,
            overlay_max_attempts: 10,
            overlay_retry_delay_ms: 350,
            confirmation_settle_ms: 300,
            auto_present_settle_ms: 500,
            submission_timeout_secs: 300,
            temp_dir: None,
            stale_temp_max_age_hours: 24,
        }
    }
}

impl CoordinatorConfig {
    pub fn overlay_retry_delay(&self) -> Duration {
        Duration::from_millis(self.overlay_retry_delay_ms)
    }

    pub fn confirmation_settle(&self) -> Duration {
        Duration::from_millis(self.confirmation_settle_ms)
    }

    pub fn auto_present_settle(&self) -> Duration {
        Duration::from_millis(self.auto_present_settle_ms)
    }

    pub fn submission_timeout(&self) -> Duration {
        Duration::from_secs(self.submission_timeout_secs)
    }

    pub fn stale_temp_max_age(&self) -> Duration {
        Duration::from_secs(self.stale_temp_max_age_hours.saturating_mul(60 * 60))
    }
}

pub fn load_config() -> CoordinatorConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> CoordinatorConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return CoordinatorConfig::default(),
    };
    if !path.exists() {
        return CoordinatorConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            CoordinatorConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            CoordinatorConfig::default()
        }
    }
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}
