use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the vessel reporter.
#[derive(Error, Debug)]
pub enum ReportError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV table could not be parsed.
    #[error("Failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// A date string did not match the expected `DD-MM-YYYY` format.
    #[error("Invalid date format: {0}")]
    DateParse(String),

    /// The expected data directory does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// No CSV files were found under the given directory.
    #[error("No CSV files found in {0}")]
    NoCsvFiles(PathBuf),

    /// The spreadsheet report could not be assembled.
    #[error("Failed to build workbook: {0}")]
    Workbook(String),

    /// An error originating from the terminal / TUI layer.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the report crates.
pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ReportError::FileRead {
            path: PathBuf::from("/some/jobs.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/some/jobs.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_csv_parse() {
        let err = ReportError::CsvParse {
            path: PathBuf::from("bad.csv"),
            message: "unequal lengths".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("bad.csv"));
        assert!(msg.contains("unequal lengths"));
    }

    #[test]
    fn test_error_display_date_parse() {
        let err = ReportError::DateParse("31-31-2024".to_string());
        assert_eq!(err.to_string(), "Invalid date format: 31-31-2024");
    }

    #[test]
    fn test_error_display_data_path_not_found() {
        let err = ReportError::DataPathNotFound(PathBuf::from("/missing/dir"));
        assert_eq!(err.to_string(), "Data path not found: /missing/dir");
    }

    #[test]
    fn test_error_display_no_csv_files() {
        let err = ReportError::NoCsvFiles(PathBuf::from("/empty/dir"));
        assert_eq!(err.to_string(), "No CSV files found in /empty/dir");
    }

    #[test]
    fn test_error_display_workbook() {
        let err = ReportError::Workbook("row out of range".to_string());
        assert_eq!(err.to_string(), "Failed to build workbook: row out of range");
    }

    #[test]
    fn test_error_display_terminal() {
        let err = ReportError::Terminal("crossterm failure".to_string());
        assert_eq!(err.to_string(), "Terminal error: crossterm failure");
    }

    #[test]
    fn test_error_display_config() {
        let err = ReportError::Config("bad refresh rate".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad refresh rate");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ReportError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }
}
