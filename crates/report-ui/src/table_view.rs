//! Detailed results table for the report TUI.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per
//! processed file plus a highlighted totals row at the bottom.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use report_core::formatting::{format_count, format_number};
use report_core::models::REPORT_COLUMNS;
use report_data::dataset::{JobTable, SummaryRollup};

use crate::themes::Theme;

/// Render the detailed results table into `area`.
///
/// The table has one data row per file in the (filtered) table, followed by
/// a totals row derived from `rollup`, all within a bordered block titled
/// `title`. Failed records show the `"Error"` sentinel in their count
/// columns.
pub fn render_results_table(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    table: &JobTable,
    rollup: &SummaryRollup,
    theme: &Theme,
) {
    let header_cells = REPORT_COLUMNS
        .iter()
        .map(|h| Cell::from(*h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let data_rows: Vec<Row> = table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            // Stripe parity matches the exported spreadsheet: first data
            // row striped, then every second one.
            let style = if i % 2 == 0 {
                theme.table_row_alt
            } else {
                theme.table_row
            };
            Row::new(vec![
                Cell::from(row.file_name.clone()),
                Cell::from(row.vessel_name.clone()),
                Cell::from(row.date_display.clone()),
                Cell::from(format_count(row.total_jobs)),
                Cell::from(format_count(row.new_jobs)),
            ])
            .style(style)
        })
        .collect();

    // Totals row – styled separately to stand out.
    let total_row = Row::new(vec![
        Cell::from("TOTAL").style(theme.table_total),
        Cell::from(format!("{} vessels", rollup.vessel_count)),
        Cell::from(format!("{} files", rollup.file_count)),
        Cell::from(format_number(rollup.total_jobs as f64, 0)),
        Cell::from(format_number(rollup.new_jobs as f64, 0)),
    ])
    .style(theme.table_total);

    let mut all_rows = data_rows;
    all_rows.push(total_row);

    let widths = [
        Constraint::Min(24),
        Constraint::Length(20),
        Constraint::Length(14),
        Constraint::Length(10),
        Constraint::Length(10),
    ];

    let widget = Table::new(all_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(format!(" {} ", title)),
        )
        .style(theme.text);

    frame.render_widget(widget, area);
}

/// Render a "no data" placeholder when there are no files to show.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No CSV files found", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Point the tool at a directory containing job-status CSV files.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Vessel Report "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
