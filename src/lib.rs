//! Carelog: a local-first medication schedule and adherence core.
//!
//! The host application owns the screens and the platform notification
//! plumbing; this crate owns the logic between them — materializing
//! daily dose logs from medication schedules, tracking taken/skipped
//! state, keeping reminder triggers in sync with schedule edits, and
//! aggregating adherence for the home screen and care reports.

pub mod adherence;
pub mod appointments;
pub mod care_circle;
pub mod config;
pub mod daily_log;
pub mod home;
pub mod medications;
pub mod models;
pub mod notify;
pub mod report;
pub mod store;

use tracing_subscriber::EnvFilter;

/// Initialize tracing. Call once at host startup; `RUST_LOG` overrides
/// the default filter.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("Carelog core v{}", config::APP_VERSION);
}
