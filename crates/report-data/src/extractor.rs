//! CSV discovery and per-file record extraction.
//!
//! Each CSV file describes one vessel's job table. The extractor derives a
//! single [`JobRecord`] per file: vessel name sniffed from the header row,
//! row counts, and the date embedded in the file name. Any parse failure
//! collapses into a sentinel record so a batch never stops at a bad file.

use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use report_core::dates;
use report_core::error::{ReportError, Result};
use report_core::models::{JobRecord, NEW_STATUS, VESSEL_COLUMN_NOT_FOUND};
use tracing::{debug, warn};

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.csv` files recursively under `data_path`, sorted by path.
pub fn find_csv_files(data_path: &Path) -> Vec<PathBuf> {
    if !data_path.exists() {
        warn!("Data path does not exist: {}", data_path.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(data_path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Process a single CSV buffer into a [`JobRecord`].
///
/// This never fails: file name and extracted date are derived up front and
/// preserved, and any error while parsing the table (undecodable bytes,
/// malformed rows, an empty buffer, a vessel column with no data row)
/// produces the sentinel record instead.
pub fn process_csv_file(file_name: &str, bytes: &[u8]) -> JobRecord {
    let extracted_date = dates::extracted_date_or_unknown(file_name);

    match summarize_table(file_name, bytes) {
        Ok(summary) => JobRecord {
            file_name: file_name.to_string(),
            vessel_name: summary.vessel_name,
            total_jobs: Some(summary.total_jobs),
            new_jobs: Some(summary.new_jobs),
            extracted_date,
        },
        Err(e) => {
            warn!("Failed to process {}: {}", file_name, e);
            JobRecord::failed(file_name, extracted_date)
        }
    }
}

/// Load every CSV under `data_path` into job records, in sorted path order.
pub fn load_job_records(data_path: &Path) -> Vec<JobRecord> {
    load_job_records_with_progress(data_path, |_, _, _| {})
}

/// Same as [`load_job_records`], invoking `progress(index, total, record)`
/// after each file so callers can report incremental batch progress.
pub fn load_job_records_with_progress(
    data_path: &Path,
    mut progress: impl FnMut(usize, usize, &JobRecord),
) -> Vec<JobRecord> {
    let files = find_csv_files(data_path);
    let total = files.len();
    let mut records = Vec::with_capacity(total);

    for (index, path) in files.iter().enumerate() {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let record = match std::fs::read(path) {
            Ok(bytes) => process_csv_file(&file_name, &bytes),
            Err(e) => {
                // Unreadable files take the same sentinel path as unparseable
                // content; the batch keeps going.
                warn!("Failed to read file {}: {}", path.display(), e);
                JobRecord::failed(&file_name, dates::extracted_date_or_unknown(&file_name))
            }
        };

        progress(index, total, &record);
        records.push(record);
    }

    debug!("Processed {} CSV files from {}", total, data_path.display());
    records
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Raw counts sniffed out of one CSV table.
struct TableSummary {
    vessel_name: String,
    total_jobs: u32,
    new_jobs: u32,
}

/// Index of the first header whose lowercased name contains `needle`.
///
/// Headers are scanned in declared order, so the leftmost match wins and
/// the sniff is deterministic.
fn find_column(headers: &csv::StringRecord, needle: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.to_lowercase().contains(needle))
}

/// Parse the CSV buffer and derive vessel name plus job counts.
fn summarize_table(file_name: &str, bytes: &[u8]) -> Result<TableSummary> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ReportError::CsvParse {
            path: PathBuf::from(file_name),
            message: "no columns to parse from empty input".to_string(),
        });
    }

    let mut reader = ReaderBuilder::new().flexible(true).from_reader(bytes);
    let headers = reader
        .headers()
        .map_err(|e| ReportError::CsvParse {
            path: PathBuf::from(file_name),
            message: e.to_string(),
        })?
        .clone();

    let vessel_col = find_column(&headers, "vessel");
    let status_col = find_column(&headers, "status");

    let mut total_jobs = 0u32;
    let mut new_jobs = 0u32;
    let mut first_vessel: Option<String> = None;

    for result in reader.records() {
        let record = result.map_err(|e| ReportError::CsvParse {
            path: PathBuf::from(file_name),
            message: e.to_string(),
        })?;

        if total_jobs == 0 {
            if let Some(col) = vessel_col {
                first_vessel = Some(record.get(col).unwrap_or_default().to_string());
            }
        }

        total_jobs += 1;

        if let Some(col) = status_col {
            // Status values are trimmed before the exact, case-sensitive
            // comparison against "New".
            if record.get(col).map(str::trim) == Some(NEW_STATUS) {
                new_jobs += 1;
            }
        }
    }

    let vessel_name = match vessel_col {
        Some(_) => first_vessel.ok_or_else(|| ReportError::CsvParse {
            path: PathBuf::from(file_name),
            message: "vessel column has no data rows".to_string(),
        })?,
        None => VESSEL_COLUMN_NOT_FOUND.to_string(),
    };

    Ok(TableSummary {
        vessel_name,
        total_jobs,
        new_jobs,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use report_core::models::{ERROR_SENTINEL, UNKNOWN_DATE};
    use std::io::Write;
    use tempfile::TempDir;

    fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", content).unwrap();
        path
    }

    // ── process_csv_file: happy paths ─────────────────────────────────────

    #[test]
    fn test_vessel_name_from_first_row() {
        let csv = "Vessel_Name,Job,Job Status\nTitan,Engine check,New\nTitan,Hull scrape,Open\n";
        let record = process_csv_file("titan_15032024.csv", csv.as_bytes());
        assert_eq!(record.vessel_name, "Titan");
        assert_eq!(record.total_jobs, Some(2));
        assert_eq!(record.new_jobs, Some(1));
        assert_eq!(record.extracted_date, "15-03-2024");
    }

    #[test]
    fn test_vessel_sniff_is_case_insensitive_substring() {
        let csv = "ID,VESSEL ID,Status\n1,Aurora,New\n";
        let record = process_csv_file("jobs.csv", csv.as_bytes());
        assert_eq!(record.vessel_name, "Aurora");
    }

    #[test]
    fn test_leftmost_vessel_column_wins() {
        let csv = "Vessel A,Vessel B\nFirst,Second\n";
        let record = process_csv_file("jobs.csv", csv.as_bytes());
        assert_eq!(record.vessel_name, "First");
    }

    #[test]
    fn test_missing_vessel_column_sentinel() {
        let csv = "Ship,Status\nTitan,New\n";
        let record = process_csv_file("jobs.csv", csv.as_bytes());
        assert_eq!(record.vessel_name, VESSEL_COLUMN_NOT_FOUND);
        assert_eq!(record.total_jobs, Some(1));
        assert_eq!(record.new_jobs, Some(1));
    }

    #[test]
    fn test_new_count_trims_whitespace() {
        let csv = "Vessel,Status\nTitan,  New \nTitan,New\nTitan,Closed\n";
        let record = process_csv_file("jobs.csv", csv.as_bytes());
        assert_eq!(record.total_jobs, Some(3));
        assert_eq!(record.new_jobs, Some(2));
    }

    #[test]
    fn test_new_count_is_case_sensitive() {
        let csv = "Vessel,Status\nTitan,new\nTitan,NEW\nTitan,New\n";
        let record = process_csv_file("jobs.csv", csv.as_bytes());
        assert_eq!(record.new_jobs, Some(1));
    }

    #[test]
    fn test_missing_status_column_counts_zero() {
        let csv = "Vessel,Job\nTitan,Engine check\nTitan,Hull scrape\n";
        let record = process_csv_file("jobs.csv", csv.as_bytes());
        assert_eq!(record.total_jobs, Some(2));
        assert_eq!(record.new_jobs, Some(0));
    }

    #[test]
    fn test_ten_rows_three_new() {
        let mut csv = String::from("Vessel,Job Status\n");
        for i in 0..10 {
            let status = if i < 3 { "New" } else { "In Progress" };
            csv.push_str(&format!("Titan,{}\n", status));
        }
        let record = process_csv_file("titan.csv", csv.as_bytes());
        assert_eq!(record.total_jobs, Some(10));
        assert_eq!(record.new_jobs, Some(3));
    }

    #[test]
    fn test_no_date_in_file_name() {
        let csv = "Vessel,Status\nTitan,New\n";
        let record = process_csv_file("titan.csv", csv.as_bytes());
        assert_eq!(record.extracted_date, UNKNOWN_DATE);
    }

    // ── process_csv_file: failure paths ───────────────────────────────────

    #[test]
    fn test_empty_buffer_is_failure() {
        let record = process_csv_file("empty_01022024.csv", b"");
        assert_eq!(record.vessel_name, ERROR_SENTINEL);
        assert!(record.total_jobs.is_none());
        assert!(record.new_jobs.is_none());
        // Date was derived before parsing and survives the failure.
        assert_eq!(record.extracted_date, "01-02-2024");
    }

    #[test]
    fn test_vessel_column_without_rows_is_failure() {
        // A vessel header exists but there is no first row to take the
        // name from.
        let record = process_csv_file("header_only.csv", b"Vessel,Status\n");
        assert_eq!(record.vessel_name, ERROR_SENTINEL);
        assert!(record.is_failed());
    }

    #[test]
    fn test_no_vessel_column_without_rows_is_not_failure() {
        let record = process_csv_file("header_only.csv", b"Ship,Status\n");
        assert_eq!(record.vessel_name, VESSEL_COLUMN_NOT_FOUND);
        assert_eq!(record.total_jobs, Some(0));
        assert_eq!(record.new_jobs, Some(0));
    }

    #[test]
    fn test_undecodable_bytes_are_failure() {
        let bytes = b"Vessel,Status\n\xff\xfe\x00,New\n";
        let record = process_csv_file("binary_05062024.csv", bytes);
        assert_eq!(record.vessel_name, ERROR_SENTINEL);
        assert_eq!(record.extracted_date, "05-06-2024");
    }

    // ── find_csv_files ────────────────────────────────────────────────────

    #[test]
    fn test_find_csv_files_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        write_csv(dir.path(), "b.csv", "Vessel\nX\n");
        write_csv(dir.path(), "a.csv", "Vessel\nY\n");
        write_csv(dir.path(), "notes.txt", "not a csv");

        let files = find_csv_files(dir.path());
        let names: Vec<&str> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
    }

    #[test]
    fn test_find_csv_files_recursive() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("fleet-a");
        std::fs::create_dir_all(&sub).unwrap();
        write_csv(dir.path(), "root.csv", "Vessel\nX\n");
        write_csv(&sub, "nested.CSV", "Vessel\nY\n");

        let files = find_csv_files(dir.path());
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_find_csv_files_nonexistent_path() {
        let files = find_csv_files(Path::new("/tmp/does-not-exist-vessel-report-xyz"));
        assert!(files.is_empty());
    }

    // ── load_job_records ──────────────────────────────────────────────────

    #[test]
    fn test_load_job_records_batch_survives_bad_file() {
        let dir = TempDir::new().unwrap();
        write_csv(dir.path(), "bad_01012024.csv", "");
        write_csv(dir.path(), "good_02012024.csv", "Vessel,Status\nTitan,New\n");

        let records = load_job_records(dir.path());
        assert_eq!(records.len(), 2);
        assert!(records[0].is_failed());
        assert_eq!(records[0].extracted_date, "01-01-2024");
        assert_eq!(records[1].vessel_name, "Titan");
    }

    #[test]
    fn test_load_job_records_progress_callback() {
        let dir = TempDir::new().unwrap();
        write_csv(dir.path(), "a.csv", "Vessel\nX\n");
        write_csv(dir.path(), "b.csv", "Vessel\nY\n");

        let mut seen = Vec::new();
        let records = load_job_records_with_progress(dir.path(), |index, total, record| {
            seen.push((index, total, record.file_name.clone()));
        });

        assert_eq!(records.len(), 2);
        assert_eq!(
            seen,
            vec![
                (0, 2, "a.csv".to_string()),
                (1, 2, "b.csv".to_string()),
            ]
        );
    }

    #[test]
    fn test_load_job_records_empty_directory() {
        let dir = TempDir::new().unwrap();
        assert!(load_job_records(dir.path()).is_empty());
    }
}
