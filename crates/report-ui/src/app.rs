//! Main application state and TUI event loop for the vessel reporter.
//!
//! [`App`] owns the theme, the active chart tab, the runtime vessel filter
//! and the last received scan snapshot. It drives both the live dashboard
//! loop and the static one-shot table view.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use report_data::analysis::AnalysisResult;
use report_data::dataset::FilterSpec;
use report_data::excel::{export_file_name, ExcelReport};
use report_runtime::orchestrator::DashboardData;

use crate::charts;
use crate::table_view;
use crate::themes::Theme;
use crate::vessel_view;

// ── ChartTab ──────────────────────────────────────────────────────────────────

/// Which chart the dashboard is currently rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartTab {
    /// Grouped bars: total vs new jobs per file.
    Distribution,
    /// Line chart: per-date sums.
    Timeline,
    /// New-vs-existing breakdown.
    Breakdown,
}

impl ChartTab {
    /// Cycle to the next tab.
    pub fn next(self) -> Self {
        match self {
            ChartTab::Distribution => ChartTab::Timeline,
            ChartTab::Timeline => ChartTab::Breakdown,
            ChartTab::Breakdown => ChartTab::Distribution,
        }
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the report TUI.
pub struct App {
    /// Active colour theme.
    pub theme: Theme,
    /// Chart tab currently shown.
    pub chart_tab: ChartTab,
    /// Active filters; the vessel part can be changed at runtime, the date
    /// range comes from the CLI and is fixed for the session.
    pub filter: FilterSpec,
    /// Index into the filtered table's vessel list.
    pub selected_vessel: usize,
    /// Directory where exports are written.
    pub output_dir: PathBuf,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    /// Most recent scan snapshot, `None` until the first data arrives.
    pub last_data: Option<DashboardData>,
    /// Transient status line (export confirmations, errors).
    pub status: Option<String>,
}

impl App {
    /// Construct a new application with the given configuration.
    pub fn new(theme_name: &str, filter: FilterSpec, output_dir: PathBuf) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            chart_tab: ChartTab::Distribution,
            filter,
            selected_vessel: 0,
            output_dir,
            should_quit: false,
            last_data: None,
            status: None,
        }
    }

    // ── Public event loops ────────────────────────────────────────────────────

    /// Run the live dashboard, receiving scan snapshots from `rx`.
    ///
    /// Uses `crossterm::event::poll` (synchronous, with a 250 ms timeout) so
    /// that the terminal event loop stays on the current thread while data
    /// updates arrive on the async channel via `try_recv`.
    ///
    /// The loop exits on `q`, `Q`, or `Ctrl+C`.
    pub async fn run_dashboard(
        mut self,
        mut rx: mpsc::Receiver<DashboardData>,
    ) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard events with a short timeout so we don't block.
            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }

            // Drain any pending data updates (non-blocking).
            loop {
                match rx.try_recv() {
                    Ok(data) => self.update_from_snapshot(data),
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        self.should_quit = true;
                        break;
                    }
                }
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    /// Run a static view over a one-shot analysis, then wait for `q` /
    /// `Ctrl+C`. Filtering, tab switching and export stay available.
    pub async fn run_static(mut self, analysis: AnalysisResult) -> io::Result<()> {
        self.last_data = Some(DashboardData { analysis });

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            terminal.draw(|frame| self.render(frame))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }

            if self.should_quit {
                break Ok(());
            }
        };

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    // ── State updates ─────────────────────────────────────────────────────────

    /// Replace the current snapshot and keep the vessel selection in range.
    fn update_from_snapshot(&mut self, data: DashboardData) {
        let vessel_count = data
            .analysis
            .table
            .filter(&self.filter)
            .vessel_names()
            .len();
        if vessel_count > 0 {
            self.selected_vessel = self.selected_vessel.min(vessel_count - 1);
        } else {
            self.selected_vessel = 0;
        }
        self.last_data = Some(data);
    }

    /// Apply one key press to the application state.
    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Tab => self.chart_tab = self.chart_tab.next(),
            KeyCode::Char('1') => self.chart_tab = ChartTab::Distribution,
            KeyCode::Char('2') => self.chart_tab = ChartTab::Timeline,
            KeyCode::Char('3') => self.chart_tab = ChartTab::Breakdown,
            KeyCode::Up => self.selected_vessel = self.selected_vessel.saturating_sub(1),
            KeyCode::Down => self.selected_vessel = self.selected_vessel.saturating_add(1),
            KeyCode::Char('v') => self.toggle_vessel_filter(),
            KeyCode::Char('c') => {
                self.filter.vessels.clear();
                self.status = Some("Vessel filter cleared".to_string());
            }
            KeyCode::Char('e') => self.export_filtered(),
            _ => {}
        }
    }

    /// Filter down to the currently selected vessel, or clear the filter
    /// when it is already the only selected one.
    fn toggle_vessel_filter(&mut self) {
        let Some(data) = &self.last_data else {
            return;
        };

        // Selection indexes the filtered view, the same list the vessel
        // browser shows.
        let names = data.analysis.table.filter(&self.filter).vessel_names();
        let Some(name) = names.get(self.selected_vessel.min(names.len().saturating_sub(1)))
        else {
            return;
        };

        if self.filter.vessels.len() == 1 && self.filter.vessels[0] == *name {
            self.filter.vessels.clear();
            self.status = Some("Vessel filter cleared".to_string());
        } else {
            self.filter.vessels = vec![name.clone()];
            self.selected_vessel = 0;
            self.status = Some(format!("Filtering by {}", name));
        }
    }

    /// Export the filtered table to the output directory.
    fn export_filtered(&mut self) {
        let Some(data) = &self.last_data else {
            self.status = Some("Nothing to export yet".to_string());
            return;
        };

        let filtered = data.analysis.table.filter(&self.filter);
        let file_name = export_file_name(chrono::Local::now().naive_local());
        let path = self.output_dir.join(&file_name);

        let outcome = ExcelReport::new()
            .render(&filtered)
            .and_then(|bytes| std::fs::write(&path, bytes).map_err(Into::into));

        match outcome {
            Ok(()) => {
                tracing::info!(path = %path.display(), rows = filtered.len(), "report exported");
                self.status = Some(format!("Exported {}", path.display()));
            }
            Err(e) => {
                tracing::warn!(error = %e, "report export failed");
                self.status = Some(format!("Export failed: {}", e));
            }
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the whole dashboard frame.
    fn render(&self, frame: &mut Frame) {
        let Some(data) = &self.last_data else {
            table_view::render_no_data(frame, frame.area(), &self.theme);
            return;
        };

        let filtered = data.analysis.table.filter(&self.filter);
        if data.analysis.table.is_empty() {
            table_view::render_no_data(frame, frame.area(), &self.theme);
            return;
        }
        let rollup = filtered.rollup();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // header
                Constraint::Length(1), // metrics + tabs
                Constraint::Percentage(40),
                Constraint::Min(8),
                Constraint::Length(1), // footer
            ])
            .split(frame.area());

        // Header.
        frame.render_widget(
            ratatui::widgets::Paragraph::new(Line::styled(
                " Vessel Job Status Report ",
                self.theme.header,
            )),
            chunks[0],
        );

        // Metrics and chart tabs.
        frame.render_widget(
            ratatui::widgets::Paragraph::new(self.metrics_line(&rollup)),
            chunks[1],
        );

        // Active chart.
        match self.chart_tab {
            ChartTab::Distribution => {
                charts::render_distribution_chart(frame, chunks[2], &filtered, &self.theme)
            }
            ChartTab::Timeline => {
                charts::render_timeline_chart(frame, chunks[2], &rollup, &self.theme)
            }
            ChartTab::Breakdown => {
                charts::render_breakdown_chart(frame, chunks[2], &rollup, &self.theme)
            }
        }

        // Vessel browser and detailed results side by side.
        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[3]);
        vessel_view::render_vessel_browser(
            frame,
            bottom[0],
            &filtered,
            self.selected_vessel,
            &self.theme,
        );
        table_view::render_results_table(
            frame,
            bottom[1],
            "Detailed Results",
            &filtered,
            &rollup,
            &self.theme,
        );

        // Footer: key help plus the transient status.
        frame.render_widget(
            ratatui::widgets::Paragraph::new(self.footer_line()),
            chunks[4],
        );
    }

    /// Summary counts, active filters and the chart tab bar.
    fn metrics_line(&self, rollup: &report_data::dataset::SummaryRollup) -> Line<'_> {
        let tab = |label: &'static str, active: bool| {
            Span::styled(
                label,
                if active {
                    self.theme.tab_active
                } else {
                    self.theme.tab_inactive
                },
            )
        };

        let filter_desc = if self.filter.vessels.is_empty() {
            "all vessels".to_string()
        } else {
            self.filter.vessels.join(", ")
        };

        Line::from(vec![
            Span::styled(" Files: ", self.theme.label),
            Span::styled(rollup.file_count.to_string(), self.theme.value),
            Span::styled("  Vessels: ", self.theme.label),
            Span::styled(rollup.vessel_count.to_string(), self.theme.value),
            Span::styled("  Filter: ", self.theme.label),
            Span::styled(filter_desc, self.theme.value),
            Span::styled("   ", self.theme.separator),
            tab("[1] Distribution ", self.chart_tab == ChartTab::Distribution),
            tab("[2] Timeline ", self.chart_tab == ChartTab::Timeline),
            tab("[3] Breakdown", self.chart_tab == ChartTab::Breakdown),
        ])
    }

    /// Key bindings and the latest status message.
    fn footer_line(&self) -> Line<'_> {
        let mut spans = vec![Span::styled(
            " q quit | Tab charts | ↑/↓ vessel | v filter | c clear | e export ",
            self.theme.dim,
        )];
        if let Some(status) = &self.status {
            spans.push(Span::styled(format!("  {}", status), self.theme.info));
        }
        Line::from(spans)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use report_core::models::JobRecord;
    use report_data::dataset::JobTable;

    fn record(file: &str, vessel: &str, total: u32, new: u32, date: &str) -> JobRecord {
        JobRecord {
            file_name: file.to_string(),
            vessel_name: vessel.to_string(),
            total_jobs: Some(total),
            new_jobs: Some(new),
            extracted_date: date.to_string(),
        }
    }

    fn snapshot() -> DashboardData {
        let records = vec![
            record("titan_a_15012024.csv", "Titan", 10, 3, "15-01-2024"),
            record("aurora_16012024.csv", "Aurora", 4, 4, "16-01-2024"),
        ];
        DashboardData {
            analysis: report_data::analysis::AnalysisResult {
                table: JobTable::from_records(records.clone()),
                records,
                metadata: report_data::analysis::AnalysisMetadata {
                    generated_at: "2024-01-16T00:00:00Z".to_string(),
                    files_processed: 2,
                    failed_files: 0,
                    load_time_seconds: 0.0,
                },
            },
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn make_app() -> App {
        App::new("dark", FilterSpec::default(), PathBuf::from("/tmp"))
    }

    // ── ChartTab ──────────────────────────────────────────────────────────

    #[test]
    fn test_chart_tab_cycles() {
        assert_eq!(ChartTab::Distribution.next(), ChartTab::Timeline);
        assert_eq!(ChartTab::Timeline.next(), ChartTab::Breakdown);
        assert_eq!(ChartTab::Breakdown.next(), ChartTab::Distribution);
    }

    // ── Key handling ──────────────────────────────────────────────────────

    #[test]
    fn test_quit_keys() {
        let mut app = make_app();
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);

        let mut app = make_app();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_tab_switching() {
        let mut app = make_app();
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.chart_tab, ChartTab::Timeline);
        app.handle_key(key(KeyCode::Char('3')));
        assert_eq!(app.chart_tab, ChartTab::Breakdown);
        app.handle_key(key(KeyCode::Char('1')));
        assert_eq!(app.chart_tab, ChartTab::Distribution);
    }

    #[test]
    fn test_vessel_selection_keys() {
        let mut app = make_app();
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.selected_vessel, 1);
        app.handle_key(key(KeyCode::Up));
        app.handle_key(key(KeyCode::Up));
        // Saturates at zero.
        assert_eq!(app.selected_vessel, 0);
    }

    #[test]
    fn test_toggle_vessel_filter() {
        let mut app = make_app();
        app.update_from_snapshot(snapshot());

        // Vessel names sort ascending: Aurora first.
        app.handle_key(key(KeyCode::Char('v')));
        assert_eq!(app.filter.vessels, vec!["Aurora".to_string()]);

        // Toggling the same vessel again clears the filter.
        app.handle_key(key(KeyCode::Char('v')));
        assert!(app.filter.vessels.is_empty());
    }

    #[test]
    fn test_clear_filter_key() {
        let mut app = make_app();
        app.update_from_snapshot(snapshot());
        app.filter.vessels = vec!["Titan".to_string()];

        app.handle_key(key(KeyCode::Char('c')));
        assert!(app.filter.vessels.is_empty());
    }

    #[test]
    fn test_update_from_snapshot_clamps_selection() {
        let mut app = make_app();
        app.selected_vessel = 99;
        app.update_from_snapshot(snapshot());
        assert_eq!(app.selected_vessel, 1); // two vessels → max index 1
    }

    // ── Export ────────────────────────────────────────────────────────────

    #[test]
    fn test_export_without_data_sets_status() {
        let mut app = make_app();
        app.export_filtered();
        assert_eq!(app.status.as_deref(), Some("Nothing to export yet"));
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut app = App::new("dark", FilterSpec::default(), dir.path().to_path_buf());
        app.update_from_snapshot(snapshot());

        app.export_filtered();

        let exported: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(exported.len(), 1);
        assert!(exported[0].starts_with("Job_Status_Report_"));
        assert!(exported[0].ends_with(".xlsx"));
        assert!(app.status.as_deref().unwrap().starts_with("Exported"));
    }

    // ── Rendering ─────────────────────────────────────────────────────────

    #[test]
    fn test_render_without_data_does_not_panic() {
        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        let app = make_app();

        terminal.draw(|frame| app.render(frame)).unwrap();
    }

    #[test]
    fn test_render_with_data_does_not_panic() {
        let backend = TestBackend::new(140, 45);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut app = make_app();
        app.update_from_snapshot(snapshot());

        terminal.draw(|frame| app.render(frame)).unwrap();
    }

    #[test]
    fn test_render_each_chart_tab_does_not_panic() {
        let backend = TestBackend::new(140, 45);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut app = make_app();
        app.update_from_snapshot(snapshot());

        for tab in [ChartTab::Distribution, ChartTab::Timeline, ChartTab::Breakdown] {
            app.chart_tab = tab;
            terminal.draw(|frame| app.render(frame)).unwrap();
        }
    }
}
