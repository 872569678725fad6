use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Carelog";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Minutes between a dose reminder and its follow-up nudge.
pub const FOLLOW_UP_DELAY_MINUTES: u32 = 45;

/// Minutes before an appointment that the main reminder fires.
pub const APPOINTMENT_LEAD_MINUTES: u32 = 60;

/// Default reporting window for care reports, in days.
pub const DEFAULT_REPORT_DAYS: i64 = 30;

/// Get the application data directory
/// ~/Carelog/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Carelog")
}

/// Default location of the SQLite database file
pub fn database_path() -> PathBuf {
    app_data_dir().join("carelog.db")
}

/// Default tracing filter when RUST_LOG is not set
pub fn default_log_filter() -> &'static str {
    "info"
}
