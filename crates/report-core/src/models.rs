use serde::{Deserialize, Serialize};

/// Sentinel shown for fields that could not be derived because the source
/// file failed to parse.
pub const ERROR_SENTINEL: &str = "Error";

/// Sentinel vessel name used when no header contains "vessel".
pub const VESSEL_COLUMN_NOT_FOUND: &str = "Vessel column not found";

/// Sentinel date used when the file name carries no 8-digit date run.
pub const UNKNOWN_DATE: &str = "Unknown";

/// Status value that marks a job as new, compared after trimming.
pub const NEW_STATUS: &str = "New";

/// Fixed display/export column order for the summary table.
pub const REPORT_COLUMNS: [&str; 5] = [
    "File Name",
    "Vessel Name",
    "Date Extracted from File Name",
    "Total Count of Jobs",
    "New Job Count",
];

/// One summary record per ingested CSV file.
///
/// A record is always produced, even when the source file cannot be parsed:
/// the extractor substitutes sentinel values instead of failing, so one bad
/// file never aborts a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Original file name of the source CSV.
    pub file_name: String,
    /// First data row's value of the sniffed vessel column, or a sentinel.
    pub vessel_name: String,
    /// Number of data rows in the source table; `None` on processing failure.
    #[serde(default)]
    pub total_jobs: Option<u32>,
    /// Rows whose trimmed status equals [`NEW_STATUS`]; `None` on failure.
    #[serde(default)]
    pub new_jobs: Option<u32>,
    /// `DD-MM-YYYY` date parsed from the file name, or [`UNKNOWN_DATE`].
    pub extracted_date: String,
}

impl JobRecord {
    /// Build the sentinel record for a file whose table could not be parsed.
    ///
    /// The file name and extracted date are preserved because both are
    /// derived before the table is touched.
    pub fn failed(file_name: impl Into<String>, extracted_date: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            vessel_name: ERROR_SENTINEL.to_string(),
            total_jobs: None,
            new_jobs: None,
            extracted_date: extracted_date.into(),
        }
    }

    /// Whether this record came out of the failure path.
    pub fn is_failed(&self) -> bool {
        self.total_jobs.is_none()
    }

    /// Jobs that are not new: `total - new`, or `None` for failed records.
    pub fn existing_jobs(&self) -> Option<u32> {
        match (self.total_jobs, self.new_jobs) {
            (Some(total), Some(new)) => Some(total.saturating_sub(new)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_record_preserves_name_and_date() {
        let record = JobRecord::failed("fleet_01022024.csv", "01-02-2024");
        assert_eq!(record.file_name, "fleet_01022024.csv");
        assert_eq!(record.extracted_date, "01-02-2024");
        assert_eq!(record.vessel_name, ERROR_SENTINEL);
        assert!(record.total_jobs.is_none());
        assert!(record.new_jobs.is_none());
        assert!(record.is_failed());
    }

    #[test]
    fn test_existing_jobs() {
        let record = JobRecord {
            file_name: "titan.csv".to_string(),
            vessel_name: "Titan".to_string(),
            total_jobs: Some(10),
            new_jobs: Some(3),
            extracted_date: UNKNOWN_DATE.to_string(),
        };
        assert_eq!(record.existing_jobs(), Some(7));
        assert!(!record.is_failed());
    }

    #[test]
    fn test_existing_jobs_failed_record() {
        let record = JobRecord::failed("broken.csv", UNKNOWN_DATE);
        assert_eq!(record.existing_jobs(), None);
    }

    #[test]
    fn test_existing_jobs_never_underflows() {
        // A new-count above the total is bad input, not a panic.
        let record = JobRecord {
            file_name: "odd.csv".to_string(),
            vessel_name: "Odd".to_string(),
            total_jobs: Some(2),
            new_jobs: Some(5),
            extracted_date: UNKNOWN_DATE.to_string(),
        };
        assert_eq!(record.existing_jobs(), Some(0));
    }

    #[test]
    fn test_job_record_serde_roundtrip() {
        let record = JobRecord {
            file_name: "fleet_15032024.csv".to_string(),
            vessel_name: "Aurora".to_string(),
            total_jobs: Some(12),
            new_jobs: Some(4),
            extracted_date: "15-03-2024".to_string(),
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: JobRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_report_columns_order() {
        assert_eq!(REPORT_COLUMNS[0], "File Name");
        assert_eq!(REPORT_COLUMNS[1], "Vessel Name");
        assert_eq!(REPORT_COLUMNS[2], "Date Extracted from File Name");
        assert_eq!(REPORT_COLUMNS[3], "Total Count of Jobs");
        assert_eq!(REPORT_COLUMNS[4], "New Job Count");
    }
}
