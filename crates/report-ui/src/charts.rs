//! Chart widgets for the dashboard: per-file distribution bars, the
//! per-date timeline, and the new-vs-existing breakdown.
//!
//! These mirror the three visualizations of the report: a grouped bar chart
//! (total vs new jobs per file, ordered by date), a line chart of per-date
//! sums, and a donut-equivalent proportional breakdown bar (a terminal has
//! no pie widget; the two-segment bar carries the same two numbers).

use ratatui::{
    layout::Rect,
    symbols,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use report_core::dates::format_display_date;
use report_core::formatting::{format_number, percentage};
use report_data::dataset::{JobTable, SummaryRollup};

use crate::themes::Theme;

// ── Distribution ──────────────────────────────────────────────────────────────

/// Render the grouped bar chart: one group per file (ordered by extracted
/// date, undated files last), with a total-jobs bar and a new-jobs bar.
pub fn render_distribution_chart(frame: &mut Frame, area: Rect, table: &JobTable, theme: &Theme) {
    if table.is_empty() {
        render_empty(frame, area, " Job Distribution by Vessel and File ", theme);
        return;
    }

    let rows = table.rows_by_date();

    let groups: Vec<BarGroup> = rows
        .iter()
        .map(|row| {
            let total = u64::from(row.total_jobs.unwrap_or(0));
            let new = u64::from(row.new_jobs.unwrap_or(0));
            BarGroup::default()
                .label(Line::styled(row.vessel_name.clone(), theme.label))
                .bars(&[
                    Bar::default()
                        .value(total)
                        .text_value(total.to_string())
                        .style(theme.chart_total),
                    Bar::default()
                        .value(new)
                        .text_value(new.to_string())
                        .style(theme.chart_new),
                ])
        })
        .collect();

    let mut chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Job Distribution by Vessel and File "),
        )
        .bar_width(5)
        .bar_gap(1)
        .group_gap(3);
    for group in groups {
        chart = chart.data(group);
    }

    frame.render_widget(chart, area);
}

// ── Timeline ──────────────────────────────────────────────────────────────────

/// Render the job-trends line chart: total and new jobs summed per date
/// bucket, in ascending date order.
pub fn render_timeline_chart(frame: &mut Frame, area: Rect, rollup: &SummaryRollup, theme: &Theme) {
    if rollup.timeline.is_empty() {
        render_empty(frame, area, " Job Trends Over Time ", theme);
        return;
    }

    let totals: Vec<(f64, f64)> = rollup
        .timeline
        .iter()
        .enumerate()
        .map(|(i, bucket)| (i as f64, bucket.total_jobs as f64))
        .collect();
    let news: Vec<(f64, f64)> = rollup
        .timeline
        .iter()
        .enumerate()
        .map(|(i, bucket)| (i as f64, bucket.new_jobs as f64))
        .collect();

    let datasets = vec![
        Dataset::default()
            .name("Total Jobs")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(theme.chart_total)
            .data(&totals),
        Dataset::default()
            .name("New Jobs")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(theme.chart_new)
            .data(&news),
    ];

    let x_max = (rollup.timeline.len().saturating_sub(1)).max(1) as f64;
    let y_max = rollup
        .timeline
        .iter()
        .map(|b| b.total_jobs)
        .max()
        .unwrap_or(1)
        .max(1) as f64;

    let first = format_display_date(rollup.timeline[0].date);
    let last = format_display_date(rollup.timeline[rollup.timeline.len() - 1].date);

    let x_axis = Axis::default()
        .title("Date")
        .style(theme.chart_axis)
        .bounds([0.0, x_max])
        .labels([
            Span::styled(first, theme.label),
            Span::styled(last, theme.label),
        ]);

    let y_axis = Axis::default()
        .title("Jobs")
        .style(theme.chart_axis)
        .bounds([0.0, y_max])
        .labels([
            Span::styled("0", theme.label),
            Span::styled(format!("{}", y_max as u64), theme.label),
        ]);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Job Trends Over Time "),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

// ── Breakdown ─────────────────────────────────────────────────────────────────

/// Render the new-vs-existing breakdown: a proportional two-segment bar
/// plus a legend with counts and percentages.
pub fn render_breakdown_chart(frame: &mut Frame, area: Rect, rollup: &SummaryRollup, theme: &Theme) {
    if rollup.total_jobs == 0 {
        render_empty(frame, area, " New vs. Existing Jobs ", theme);
        return;
    }

    let new_pct = percentage(rollup.new_jobs as f64, rollup.total_jobs as f64, 1);
    let existing_pct = percentage(rollup.existing_jobs as f64, rollup.total_jobs as f64, 1);

    let bar_width = area.width.saturating_sub(4).max(10) as usize;
    let new_cells = ((new_pct / 100.0) * bar_width as f64).round() as usize;
    let existing_cells = bar_width.saturating_sub(new_cells);

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("█".repeat(new_cells), theme.chart_new),
            Span::styled("█".repeat(existing_cells), theme.chart_total),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("■ ", theme.chart_new),
            Span::styled("New Jobs: ", theme.label),
            Span::styled(
                format!("{} ({:.1}%)", format_number(rollup.new_jobs as f64, 0), new_pct),
                theme.value,
            ),
        ]),
        Line::from(vec![
            Span::styled("■ ", theme.chart_total),
            Span::styled("Existing Jobs: ", theme.label),
            Span::styled(
                format!(
                    "{} ({:.1}%)",
                    format_number(rollup.existing_jobs as f64, 0),
                    existing_pct
                ),
                theme.value,
            ),
        ]),
    ];

    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" New vs. Existing Jobs "),
        ),
        area,
    );
}

// ── Shared ────────────────────────────────────────────────────────────────────

/// Placeholder drawn when a chart has nothing to show.
fn render_empty(frame: &mut Frame, area: Rect, title: &str, theme: &Theme) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("No data to chart", theme.warning)),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(title.to_string()),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
