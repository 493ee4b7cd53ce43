//! Terminal UI layer for the vessel job-status reporter.
//!
//! Provides themes, chart widgets (distribution, timeline, breakdown), the
//! results table, the per-vessel browser, and the main application event
//! loop built on top of [`ratatui`].

pub mod app;
pub mod charts;
pub mod table_view;
pub mod themes;
pub mod vessel_view;

pub use report_core as core;
