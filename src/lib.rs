pub mod config;
pub mod core_state;
pub mod dashboard;
pub mod db;
pub mod eligibility;
pub mod emotion;
pub mod flow;
pub mod insights;
pub mod models;
pub mod navigation;
pub mod signals;
pub mod store;

use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber. `RUST_LOG` wins over the
/// build's default filter. Calling it twice is harmless.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    }
}
