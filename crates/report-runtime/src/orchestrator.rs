//! Async scan orchestrator.
//!
//! Re-runs the analysis pipeline on an interval inside a tokio task,
//! sending [`DashboardData`] snapshots through an `mpsc` channel so the TUI
//! event loop can consume them without any shared mutable state.

use std::path::PathBuf;
use std::time::Duration;

use report_data::analysis::AnalysisResult;
use tokio::sync::mpsc;
use tokio::time;

use crate::data_manager::DataManager;

// ── Public types ──────────────────────────────────────────────────────────────

/// A single scan snapshot forwarded to the TUI layer.
///
/// This is the primary data contract between the background runtime and the
/// presentation layer.
#[derive(Debug, Clone)]
pub struct DashboardData {
    /// Full analysis result from the data pipeline.
    pub analysis: AnalysisResult,
}

// ── ReportOrchestrator ────────────────────────────────────────────────────────

/// Background scan coordinator.
///
/// Call [`ReportOrchestrator::start`] to spin up the scan loop in a
/// dedicated tokio task and receive a channel endpoint for [`DashboardData`]
/// updates.
pub struct ReportOrchestrator {
    /// How often to re-scan the data directory.
    update_interval: Duration,
    /// Directory containing the CSV files.
    data_path: PathBuf,
}

impl ReportOrchestrator {
    /// Create a new orchestrator.
    ///
    /// # Parameters
    /// - `update_interval_secs` – seconds between directory re-scans.
    /// - `data_path`            – CSV directory to scan.
    pub fn new(update_interval_secs: u64, data_path: PathBuf) -> Self {
        Self {
            update_interval: Duration::from_secs(update_interval_secs),
            data_path,
        }
    }

    /// Start the scan loop.
    ///
    /// Spawns a tokio task that runs the loop. Returns:
    /// - An `mpsc::Receiver<DashboardData>` for the caller to poll.
    /// - A [`ScanHandle`] that can be used to abort the loop.
    pub fn start(self) -> (mpsc::Receiver<DashboardData>, ScanHandle) {
        // Buffer a modest number of snapshots so slow consumers don't stall the loop.
        let (tx, rx) = mpsc::channel(16);

        let handle = tokio::spawn(async move {
            self.scan_loop(tx).await;
        });

        (rx, ScanHandle { handle })
    }

    // ── Private implementation ────────────────────────────────────────────

    /// The main scan loop.
    ///
    /// Performs an immediate fetch on startup, then repeats on
    /// `update_interval`. The loop exits when the receiver side of the
    /// channel is closed.
    async fn scan_loop(self, tx: mpsc::Sender<DashboardData>) {
        let mut data_manager =
            DataManager::new(self.update_interval.as_secs(), self.data_path.clone());

        // Initial fetch (force refresh to populate immediately).
        Self::fetch_and_send(&mut data_manager, &tx, true).await;

        let mut interval = time::interval(self.update_interval);
        // Consume the first tick which fires immediately; we already fetched above.
        interval.tick().await;

        loop {
            interval.tick().await;

            if tx.is_closed() {
                tracing::debug!("dashboard channel closed; exiting scan loop");
                break;
            }

            Self::fetch_and_send(&mut data_manager, &tx, false).await;
        }
    }

    /// Fetch fresh data and send a [`DashboardData`] snapshot to the channel.
    async fn fetch_and_send(
        data_manager: &mut DataManager,
        tx: &mpsc::Sender<DashboardData>,
        force: bool,
    ) {
        let analysis = match data_manager.get_data(force) {
            Some(r) => r.clone(),
            None => {
                tracing::warn!("no analysis data available; skipping send");
                return;
            }
        };

        let snapshot = DashboardData { analysis };

        if let Err(e) = tx.send(snapshot).await {
            tracing::warn!(error = %e, "failed to send dashboard snapshot; receiver dropped");
        }
    }
}

// ── ScanHandle ────────────────────────────────────────────────────────────────

/// A handle to the background scan task.
///
/// Drop the receiver or call [`ScanHandle::abort`] to stop the loop.
pub struct ScanHandle {
    handle: tokio::task::JoinHandle<()>,
}

impl ScanHandle {
    /// Immediately abort the scan loop.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // ── orchestrator creation ─────────────────────────────────────────────

    #[test]
    fn test_orchestrator_creation() {
        let orch = ReportOrchestrator::new(5, PathBuf::from("/tmp/test-data"));
        assert_eq!(orch.update_interval, Duration::from_secs(5));
        assert_eq!(orch.data_path, PathBuf::from("/tmp/test-data"));
    }

    // ── async: start / abort ──────────────────────────────────────────────

    #[tokio::test]
    async fn test_orchestrator_start_and_abort() {
        let dir = tempfile::TempDir::new().unwrap();

        let orch = ReportOrchestrator::new(60, dir.path().to_path_buf());
        let (_rx, handle) = orch.start();

        // Give the task a moment to start, then abort it.
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();
    }

    // ── async: receives initial snapshot ──────────────────────────────────

    #[tokio::test]
    async fn test_orchestrator_sends_initial_snapshot() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut file = std::fs::File::create(dir.path().join("titan_01012024.csv")).unwrap();
        write!(file, "Vessel,Status\nTitan,New\n").unwrap();

        let orch = ReportOrchestrator::new(60, dir.path().to_path_buf());
        let (mut rx, handle) = orch.start();

        // The first snapshot should arrive quickly.
        let snapshot = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for snapshot")
            .expect("channel closed before receiving snapshot");

        assert_eq!(snapshot.analysis.metadata.files_processed, 1);
        assert_eq!(snapshot.analysis.table.rows[0].vessel_name, "Titan");

        handle.abort();
    }

    #[tokio::test]
    async fn test_orchestrator_empty_directory_snapshot() {
        let dir = tempfile::TempDir::new().unwrap();

        let orch = ReportOrchestrator::new(60, dir.path().to_path_buf());
        let (mut rx, handle) = orch.start();

        let snapshot = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for snapshot")
            .expect("channel closed before receiving snapshot");

        assert!(snapshot.analysis.table.is_empty());

        handle.abort();
    }
}
