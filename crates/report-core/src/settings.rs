use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::dates;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Vessel job-status analysis and reporting
#[derive(Parser, Debug, Clone)]
#[command(
    name = "vessel-report",
    about = "Analyze vessel job-status CSV files and export formatted reports",
    version
)]
pub struct Settings {
    /// Directory containing the CSV files to analyze
    #[arg(value_name = "DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// View mode
    #[arg(long, default_value = "dashboard", value_parser = ["dashboard", "table", "export"])]
    pub view: String,

    /// Only include records for this vessel (repeatable)
    #[arg(long = "vessel", value_name = "NAME")]
    pub vessels: Vec<String>,

    /// Inclusive date-range start (DD-MM-YYYY)
    #[arg(long, value_name = "DD-MM-YYYY")]
    pub from: Option<String>,

    /// Inclusive date-range end (DD-MM-YYYY)
    #[arg(long, value_name = "DD-MM-YYYY")]
    pub to: Option<String>,

    /// Directory where exported reports are written
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Directory re-scan interval in seconds (1-300)
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..=300))]
    pub refresh_rate: u32,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "auto"])]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.vessel-report/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    /// Uses `~/.vessel-report/last_used.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".vessel-report").join("last_used.json")
    }

    /// Load persisted params from the default path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load persisted params from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to the default path, creating parent directories
    /// if needed.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&Self::config_path())
    }

    /// Atomically write params to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the default config file if it exists.
    pub fn clear() -> Result<(), std::io::Error> {
        Self::clear_at(&Self::config_path())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

impl From<&Settings> for LastUsedParams {
    fn from(settings: &Settings) -> Self {
        Self {
            theme: Some(settings.theme.clone()),
            view: Some(settings.view.clone()),
            refresh_rate: Some(settings.refresh_rate),
            output_dir: settings.output_dir.clone(),
        }
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`Settings::load_with_last_used`] but accepts an explicit
    /// argument list, enabling unit-testing without spawning subprocesses.
    pub fn load_with_last_used_from_args(args: Vec<std::ffi::OsString>) -> Self {
        Self::load_with_last_used_impl(args, &LastUsedParams::config_path())
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        // Build raw ArgMatches so we can query ValueSource.
        let matches = Settings::command().get_matches_from(args.clone());

        // Parse into the typed struct using the same args.
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::apply_debug_flag(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // Merge last-used values for fields that were NOT explicitly set on
        // the command line (CLI always wins). Filters are never persisted –
        // they describe one analysis, not a preference.
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "refresh_rate") {
            if let Some(v) = last.refresh_rate {
                settings.refresh_rate = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "output_dir") && settings.output_dir.is_none() {
            settings.output_dir = last.output_dir;
        }

        settings = Self::apply_debug_flag(settings);

        // Persist current settings for next run.
        let params = LastUsedParams::from(&settings);
        let _ = params.save_to(config_path);

        settings
    }

    /// `--debug` overrides whatever log level was configured.
    fn apply_debug_flag(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Build the inclusive date-range filter from `--from` / `--to`.
    ///
    /// The range is applied only when BOTH endpoints parse as `DD-MM-YYYY`;
    /// a half-specified or unparseable range means no date filtering at all.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let from = dates::coerce_display_date(self.from.as_deref()?)?;
        let to = dates::coerce_display_date(self.to.as_deref()?)?;
        Some((from, to))
    }
}

/// Whether the user supplied `id` on the command line (as opposed to a
/// default or merged value).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use tempfile::TempDir;

    fn args(list: &[&str]) -> Vec<OsString> {
        std::iter::once("vessel-report")
            .chain(list.iter().copied())
            .map(OsString::from)
            .collect()
    }

    // ── Parsing ───────────────────────────────────────────────────────────

    #[test]
    fn test_defaults() {
        let settings = Settings::parse_from(args(&[]));
        assert_eq!(settings.view, "dashboard");
        assert_eq!(settings.theme, "auto");
        assert_eq!(settings.refresh_rate, 10);
        assert!(settings.data_dir.is_none());
        assert!(settings.vessels.is_empty());
        assert!(!settings.debug);
    }

    #[test]
    fn test_positional_data_dir() {
        let settings = Settings::parse_from(args(&["/tmp/csvs"]));
        assert_eq!(settings.data_dir, Some(PathBuf::from("/tmp/csvs")));
    }

    #[test]
    fn test_repeatable_vessel_filter() {
        let settings = Settings::parse_from(args(&["--vessel", "Titan", "--vessel", "Aurora"]));
        assert_eq!(settings.vessels, vec!["Titan", "Aurora"]);
    }

    #[test]
    fn test_debug_forces_debug_level() {
        let dir = TempDir::new().unwrap();
        let config = LastUsedParams::config_path_in(dir.path());
        let settings = Settings::load_with_last_used_impl(args(&["--debug"]), &config);
        assert_eq!(settings.log_level, "DEBUG");
    }

    // ── date_range ────────────────────────────────────────────────────────

    #[test]
    fn test_date_range_both_endpoints() {
        let settings =
            Settings::parse_from(args(&["--from", "01-01-2024", "--to", "31-01-2024"]));
        let (from, to) = settings.date_range().unwrap();
        assert_eq!(from, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    }

    #[test]
    fn test_date_range_half_specified_is_none() {
        let settings = Settings::parse_from(args(&["--from", "01-01-2024"]));
        assert!(settings.date_range().is_none());
    }

    #[test]
    fn test_date_range_unparseable_is_none() {
        let settings =
            Settings::parse_from(args(&["--from", "99-99-9999", "--to", "31-01-2024"]));
        assert!(settings.date_range().is_none());
    }

    // ── Last-used merge ───────────────────────────────────────────────────

    #[test]
    fn test_last_used_round_trip() {
        let dir = TempDir::new().unwrap();
        let config = LastUsedParams::config_path_in(dir.path());

        // First run persists the explicit theme.
        let first = Settings::load_with_last_used_impl(args(&["--theme", "light"]), &config);
        assert_eq!(first.theme, "light");
        assert!(config.exists());

        // Second run without a theme picks the persisted one up.
        let second = Settings::load_with_last_used_impl(args(&[]), &config);
        assert_eq!(second.theme, "light");
    }

    #[test]
    fn test_cli_wins_over_last_used() {
        let dir = TempDir::new().unwrap();
        let config = LastUsedParams::config_path_in(dir.path());

        LastUsedParams {
            theme: Some("light".to_string()),
            view: Some("table".to_string()),
            refresh_rate: Some(30),
            output_dir: None,
        }
        .save_to(&config)
        .unwrap();

        let settings =
            Settings::load_with_last_used_impl(args(&["--theme", "dark", "--view", "export"]), &config);
        assert_eq!(settings.theme, "dark");
        assert_eq!(settings.view, "export");
        // Non-CLI field still merged from last-used.
        assert_eq!(settings.refresh_rate, 30);
    }

    #[test]
    fn test_clear_removes_config() {
        let dir = TempDir::new().unwrap();
        let config = LastUsedParams::config_path_in(dir.path());

        LastUsedParams::default().save_to(&config).unwrap();
        assert!(config.exists());

        let _ = Settings::load_with_last_used_impl(args(&["--clear"]), &config);
        assert!(!config.exists());
    }

    #[test]
    fn test_load_from_missing_file_is_default() {
        let params = LastUsedParams::load_from(std::path::Path::new("/does/not/exist.json"));
        assert!(params.theme.is_none());
        assert!(params.view.is_none());
    }
}
