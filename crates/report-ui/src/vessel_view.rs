//! Per-vessel browser: a selectable vessel list with that vessel's files.
//!
//! The terminal rendition of the report's per-vessel expanders: the left
//! pane lists vessels (sorted ascending) with their file counts, the right
//! pane shows the selected vessel's totals and its files sorted by date
//! descending.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table},
    Frame,
};

use report_core::formatting::format_count;
use report_data::dataset::JobTable;

use crate::themes::Theme;

/// Render the vessel browser into `area`.
///
/// `selected` indexes into [`JobTable::vessel_names`] order and is clamped
/// to the available range.
pub fn render_vessel_browser(
    frame: &mut Frame,
    area: Rect,
    table: &JobTable,
    selected: usize,
    theme: &Theme,
) {
    let vessels = table.vessel_names();
    if vessels.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled("No vessels", theme.dim))).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.table_border)
                    .title(" Per Vessel Breakdown "),
            ),
            area,
        );
        return;
    }

    let selected = selected.min(vessels.len() - 1);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(40)])
        .split(area);

    render_vessel_list(frame, chunks[0], table, &vessels, selected, theme);
    render_vessel_files(frame, chunks[1], table, &vessels[selected], theme);
}

/// Left pane: vessel names with per-vessel file counts.
fn render_vessel_list(
    frame: &mut Frame,
    area: Rect,
    table: &JobTable,
    vessels: &[String],
    selected: usize,
    theme: &Theme,
) {
    let items: Vec<ListItem> = vessels
        .iter()
        .enumerate()
        .map(|(i, vessel)| {
            let files = table.rows_for_vessel(vessel).len();
            let label = format!("{} ({} files)", vessel, files);
            let style = if i == selected {
                theme.selected
            } else {
                theme.text
            };
            ListItem::new(Line::styled(label, style))
        })
        .collect();

    frame.render_widget(
        List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Vessels "),
        ),
        area,
    );
}

/// Right pane: the selected vessel's totals plus its files, newest first.
fn render_vessel_files(
    frame: &mut Frame,
    area: Rect,
    table: &JobTable,
    vessel: &str,
    theme: &Theme,
) {
    let rows = table.rows_for_vessel(vessel);
    let total: u64 = rows.iter().map(|r| u64::from(r.total_jobs.unwrap_or(0))).sum();
    let new: u64 = rows.iter().map(|r| u64::from(r.new_jobs.unwrap_or(0))).sum();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area.inner(ratatui::layout::Margin {
            horizontal: 1,
            vertical: 1,
        }));

    let summary = Line::from(vec![
        Span::styled("Total Jobs: ", theme.label),
        Span::styled(total.to_string(), theme.value),
        Span::styled("  |  New Jobs: ", theme.label),
        Span::styled(new.to_string(), theme.value),
    ]);

    let header = Row::new(vec![
        Cell::from("File Name").style(theme.table_header),
        Cell::from("Date").style(theme.table_header),
        Cell::from("Total").style(theme.table_header),
        Cell::from("New").style(theme.table_header),
    ]);

    let file_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if i % 2 == 0 {
                theme.table_row_alt
            } else {
                theme.table_row
            };
            Row::new(vec![
                Cell::from(row.file_name.clone()),
                Cell::from(row.date_display.clone()),
                Cell::from(format_count(row.total_jobs)),
                Cell::from(format_count(row.new_jobs)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Min(24),
        Constraint::Length(12),
        Constraint::Length(7),
        Constraint::Length(7),
    ];

    // Outer border drawn separately so the summary line sits inside it.
    frame.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.table_border)
            .title(format!(" {} ", vessel)),
        area,
    );
    frame.render_widget(Paragraph::new(summary), chunks[0]);
    frame.render_widget(Table::new(file_rows, widths).header(header), chunks[1]);
}

// ── Tests ──────────────────────────────────────────────────────────────────────
