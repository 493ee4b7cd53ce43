use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure the standard `~/.vessel-report/` directory hierarchy exists.
///
/// Creates the following directories if absent (including any missing parents):
/// - `~/.vessel-report/`
/// - `~/.vessel-report/logs/`
/// - `~/.vessel-report/exports/`
pub fn ensure_directories() -> anyhow::Result<()> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let report_dir = home.join(".vessel-report");
    std::fs::create_dir_all(&report_dir)?;
    std::fs::create_dir_all(report_dir.join("logs"))?;
    std::fs::create_dir_all(report_dir.join("exports"))?;
    Ok(())
}

/// Default directory for exported reports: `~/.vessel-report/exports/`.
pub fn default_export_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".vessel-report").join("exports")
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber.
///
/// `log_level` is mapped to a [`tracing_subscriber::EnvFilter`] directive.
/// Falls back to `"info"` if the level string is not recognised.
///
/// The `log_file` parameter is accepted for forward-compatibility but file
/// logging is not yet wired – all output currently goes to stderr.
pub fn setup_logging(log_level: &str, _log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    // Map conventional log-level names to tracing directives (lowercase).
    let upper = log_level.to_uppercase();
    let normalised = match upper.as_str() {
        "DEBUG" | "CRITICAL" => "debug",
        "INFO" => "info",
        "WARNING" => "warn",
        "ERROR" => "error",
        other => other,
    };

    let filter = EnvFilter::try_new(normalised).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer().with_target(false).with_thread_ids(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .init();

    Ok(())
}

// ── Data-path discovery ────────────────────────────────────────────────────────

/// Attempt to locate a CSV data directory relative to the working directory.
///
/// Checks the following paths in order and returns the first that exists:
/// 1. `./data/`
/// 2. `./csv/`
///
/// Returns `None` when neither path exists.
pub fn discover_data_path() -> Option<PathBuf> {
    discover_data_path_in(&std::env::current_dir().ok()?)
}

/// Same as [`discover_data_path`], rooted at `base_dir` (used for testing).
pub fn discover_data_path_in(base_dir: &std::path::Path) -> Option<PathBuf> {
    let candidates = [base_dir.join("data"), base_dir.join("csv")];
    candidates.into_iter().find(|p| p.exists())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
