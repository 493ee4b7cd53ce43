//! Top-level analysis pipeline.
//!
//! Orchestrates CSV discovery, per-file extraction and table construction,
//! returning an [`AnalysisResult`] ready for the UI layer or the Excel
//! renderer.

use std::path::Path;

use chrono::Utc;
use report_core::models::JobRecord;

use crate::dataset::JobTable;
use crate::extractor::load_job_records_with_progress;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the analysis result.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AnalysisMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// Number of CSV files processed.
    pub files_processed: usize,
    /// How many of those collapsed into sentinel records.
    pub failed_files: usize,
    /// Wall-clock seconds spent reading and extracting the files.
    pub load_time_seconds: f64,
}

/// The complete output of [`analyze_directory`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// One record per processed file, in sorted path order.
    pub records: Vec<JobRecord>,
    /// The unfiltered summary table built from `records`.
    pub table: JobTable,
    /// Metadata about this analysis run.
    pub metadata: AnalysisMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run the full analysis pipeline over `data_path`.
///
/// 1. Discover CSV files (recursive, sorted).
/// 2. Extract one [`JobRecord`] per file; failures become sentinel records.
/// 3. Stack the records into a [`JobTable`] with coerced dates.
///
/// A missing directory or an empty file set yields an empty result with a
/// warning, never an error.
pub fn analyze_directory(data_path: &Path) -> AnalysisResult {
    analyze_directory_with_progress(data_path, |_, _, _| {})
}

/// Same as [`analyze_directory`], reporting per-file progress to `progress`
/// as `(index, total, record)` after each file.
pub fn analyze_directory_with_progress(
    data_path: &Path,
    progress: impl FnMut(usize, usize, &JobRecord),
) -> AnalysisResult {
    let load_start = std::time::Instant::now();
    let records = load_job_records_with_progress(data_path, progress);
    let load_time = load_start.elapsed().as_secs_f64();

    let failed_files = records.iter().filter(|r| r.is_failed()).count();
    let table = JobTable::from_records(records.clone());

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        files_processed: records.len(),
        failed_files,
        load_time_seconds: load_time,
    };

    tracing::debug!(
        files = metadata.files_processed,
        failed = metadata.failed_files,
        "analysis complete"
    );

    AnalysisResult {
        records,
        table,
        metadata,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
