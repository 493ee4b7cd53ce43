//! TTL-cached data manager for the reporting runtime.
//!
//! Wraps [`analyze_directory`] with a configurable time-to-live cache and
//! transparent retry logic. Callers use [`DataManager::get_data`] to obtain
//! a fresh-or-cached [`AnalysisResult`]; the manager handles staleness
//! checks, up to three fetch attempts with back-off, and graceful fallback
//! to the previous cache on transient failure.

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use report_data::analysis::{analyze_directory, AnalysisResult};

// ── Defaults ──────────────────────────────────────────────────────────────────

/// Default cache TTL in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 30;

/// Maximum number of fetch attempts before giving up and returning stale data.
const MAX_RETRY_ATTEMPTS: u32 = 3;

// ── DataManager ───────────────────────────────────────────────────────────────

/// TTL-cached wrapper around the analysis pipeline.
///
/// # Example
/// ```no_run
/// use std::path::PathBuf;
/// use report_runtime::data_manager::DataManager;
///
/// let mut mgr = DataManager::new(30, PathBuf::from("./data"));
/// if let Some(result) = mgr.get_data(false) {
///     println!("files processed: {}", result.metadata.files_processed);
/// }
/// ```
pub struct DataManager {
    /// Maximum age of cached data before it is considered stale.
    cache_ttl: Duration,
    /// Directory scanned on each fresh fetch.
    data_path: PathBuf,
    /// Most recently fetched analysis result.
    cache: Option<AnalysisResult>,
    /// When the cache was last populated.
    cache_timestamp: Option<Instant>,
    /// Human-readable description of the last error encountered.
    last_error: Option<String>,
}

impl DataManager {
    /// Create a new manager.
    ///
    /// # Parameters
    /// - `cache_ttl_secs` – seconds before cached data is considered stale.
    /// - `data_path`      – CSV directory forwarded to `analyze_directory`.
    pub fn new(cache_ttl_secs: u64, data_path: PathBuf) -> Self {
        Self {
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            data_path,
            cache: None,
            cache_timestamp: None,
            last_error: None,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return analysis data, using the cache when it is still valid.
    ///
    /// When `force_refresh` is `true` the cache is bypassed and a fresh
    /// fetch is always attempted. On fetch failure the previous cache (if
    /// any) is returned as a best-effort fallback.
    pub fn get_data(&mut self, force_refresh: bool) -> Option<&AnalysisResult> {
        if !force_refresh && self.is_cache_valid() {
            tracing::debug!("returning cached analysis result");
            return self.cache.as_ref();
        }

        match self.fetch_with_retry() {
            Ok(result) => {
                tracing::debug!(
                    files = result.metadata.files_processed,
                    failed = result.metadata.failed_files,
                    "analysis cache updated"
                );
                self.cache = Some(result);
                self.cache_timestamp = Some(Instant::now());
                self.last_error = None;
                self.cache.as_ref()
            }
            Err(e) => {
                tracing::warn!(error = %e, "fetch failed; falling back to cached data");
                self.last_error = Some(e);
                // Return whatever we have, even if stale.
                self.cache.as_ref()
            }
        }
    }

    /// Discard the current cache, forcing the next [`DataManager::get_data`]
    /// call to fetch.
    pub fn invalidate_cache(&mut self) {
        self.cache = None;
        self.cache_timestamp = None;
        tracing::debug!("cache invalidated");
    }

    /// Age of the current cache entry, or `None` if no data has been fetched.
    pub fn cache_age(&self) -> Option<Duration> {
        self.cache_timestamp.map(|ts| ts.elapsed())
    }

    /// Human-readable description of the last fetch error, or `None`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ── Private helpers ───────────────────────────────────────────────────

    /// `true` when the cache holds data that is still within its TTL.
    fn is_cache_valid(&self) -> bool {
        match (self.cache.as_ref(), self.cache_timestamp) {
            (Some(_), Some(ts)) => ts.elapsed() < self.cache_ttl,
            _ => false,
        }
    }

    /// Attempt up to [`MAX_RETRY_ATTEMPTS`] fetches with back-off.
    ///
    /// Back-off schedule: attempt 1 → 0 ms, attempt 2 → 100 ms, attempt 3 → 200 ms.
    fn fetch_with_retry(&mut self) -> Result<AnalysisResult, String> {
        let mut last_err = String::new();

        for attempt in 0..MAX_RETRY_ATTEMPTS {
            if attempt > 0 {
                let sleep_ms = u64::from(attempt) * 100;
                tracing::debug!(attempt, sleep_ms, "retrying fetch after back-off");
                thread::sleep(Duration::from_millis(sleep_ms));
            }

            match self.fetch_fresh() {
                Ok(result) => return Ok(result),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "fetch attempt failed");
                    last_err = e;
                }
            }
        }

        Err(last_err)
    }

    /// Call the analysis pipeline with this manager's configuration.
    fn fetch_fresh(&self) -> Result<AnalysisResult, String> {
        // analyze_directory is infallible by contract; a missing directory
        // surfaces as an empty result. Catch panics so a bug in a parser
        // cannot take the scan loop down.
        let path = self.data_path.clone();
        std::panic::catch_unwind(move || analyze_directory(&path)).map_err(|e| {
            format!(
                "analyze_directory panicked: {:?}",
                e.downcast_ref::<&str>().unwrap_or(&"unknown panic")
            )
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
