//! Runtime orchestration layer for the vessel job-status reporter.
//!
//! Coordinates periodic re-scans of the CSV data directory and hands
//! snapshots to the UI layer over a channel.

pub mod data_manager;
pub mod orchestrator;

pub use report_core as core;
pub use report_data as data;
