pub mod capture;
pub mod config;
pub mod coordinator;
pub mod delegate;
pub mod error;
pub mod logging;
pub mod notification;
pub mod overlay;
pub mod presentation;
pub mod session;
pub mod state;
pub mod storage;
pub mod submission;
pub mod workflow;
mod worker;

pub use config::{load_config, CoordinatorConfig};
pub use coordinator::{Coordinator, Services};
pub use delegate::HostDelegate;
pub use error::{AppError, AppResult};
pub use workflow::{CaptureOutcome, WorkflowError};

/// Loads config, installs logging and builds a coordinator with the runtime temp dir.
pub fn init(services: Services) -> AppResult<Coordinator> {
    logging::init();
    let config = load_config();
    tracing::info!(
        webhook_configured = config.default_webhook.is_some(),
        "starting snapreport coordinator"
    );
    Ok(Coordinator::from_config(config, services)?)
}
