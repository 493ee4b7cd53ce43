//! Formatted Excel report renderer.
//!
//! Turns a [`JobTable`] into a complete `.xlsx` workbook byte buffer:
//! styled header row, centered and bordered data cells, zebra striping,
//! duplicate-vessel highlighting and a named banded table, with column
//! widths sized to the content.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use rust_xlsxwriter::{
    ConditionalFormatDuplicate, Format, FormatAlign, FormatBorder, Table, TableColumn, TableStyle,
    Workbook, XlsxError,
};

use report_core::error::{ReportError, Result};
use report_core::formatting::format_count;
use report_core::models::REPORT_COLUMNS;

use crate::dataset::{JobTable, TableRow};

/// Content type of the exported report.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Build the export file name for a given local timestamp:
/// `Job_Status_Report_<YYYYMMDD_HHMMSS>.xlsx`.
pub fn export_file_name(timestamp: NaiveDateTime) -> String {
    format!(
        "Job_Status_Report_{}.xlsx",
        timestamp.format("%Y%m%d_%H%M%S")
    )
}

// ── ExcelReport ───────────────────────────────────────────────────────────────

/// Excel report renderer.
///
/// Carries every color role as explicit configuration instead of a
/// process-wide palette; the defaults match the dashboard colors.
#[derive(Clone, Debug)]
pub struct ExcelReport {
    /// Header row fill.
    pub header_fill: u32,
    /// Header row font color.
    pub header_font_color: u32,
    /// Fill for alternating data rows.
    pub zebra_fill: u32,
    /// Fill that marks duplicated vessel names.
    pub duplicate_fill: u32,
    /// Name of the registered worksheet table.
    pub table_name: String,
    /// Paint duplicate vessels at render time instead of attaching the
    /// spreadsheet-native `duplicateValues` rule. For consumers that strip
    /// conditional formats when re-saving the file.
    pub static_highlight: bool,
}

impl Default for ExcelReport {
    fn default() -> Self {
        Self {
            header_fill: 0x1F4E78,
            header_font_color: 0xFFFFFF,
            zebra_fill: 0xF0F0F0,
            duplicate_fill: 0xFFB266,
            table_name: "JobSummaryTable".to_string(),
            static_highlight: false,
        }
    }
}

impl ExcelReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the header row fill color.
    pub fn header_fill(mut self, color: u32) -> Self {
        self.header_fill = color;
        self
    }

    /// Set the alternating-row fill color.
    pub fn zebra_fill(mut self, color: u32) -> Self {
        self.zebra_fill = color;
        self
    }

    /// Set the duplicate-vessel highlight color.
    pub fn duplicate_fill(mut self, color: u32) -> Self {
        self.duplicate_fill = color;
        self
    }

    /// Use a static render-time paint for duplicate vessels instead of the
    /// native conditional-format rule.
    pub fn static_highlight(mut self) -> Self {
        self.static_highlight = true;
        self
    }

    /// Render `table` into a complete, independently-openable `.xlsx` byte
    /// buffer.
    ///
    /// Rows are written in the table's own order; the five columns follow
    /// [`REPORT_COLUMNS`]. Failed records export their counts as the
    /// `"Error"` sentinel string.
    pub fn render(&self, table: &JobTable) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        let header_format = Format::new()
            .set_bold()
            .set_font_color(self.header_font_color)
            .set_background_color(self.header_fill)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap()
            .set_border(FormatBorder::Thin);

        let cell_format = Format::new()
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin);

        let zebra_format = cell_format.clone().set_background_color(self.zebra_fill);
        let duplicate_format = cell_format.clone().set_background_color(self.duplicate_fill);

        // Vessel names appearing more than once, for the static fallback.
        let duplicates = if self.static_highlight {
            duplicated_vessels(table)
        } else {
            HashSet::new()
        };

        // Data rows. The first data row is striped, then every second one,
        // and the stripe is part of the cell format so it cannot clobber
        // values or borders.
        for (i, row) in table.rows.iter().enumerate() {
            let sheet_row = (i + 1) as u32;
            let base = if i % 2 == 0 {
                &zebra_format
            } else {
                &cell_format
            };
            let vessel_format = if duplicates.contains(row.vessel_name.as_str()) {
                &duplicate_format
            } else {
                base
            };

            worksheet
                .write_with_format(sheet_row, 0, row.file_name.as_str(), base)
                .map_err(workbook_error)?;
            worksheet
                .write_with_format(sheet_row, 1, row.vessel_name.as_str(), vessel_format)
                .map_err(workbook_error)?;
            worksheet
                .write_with_format(sheet_row, 2, row.date_display.as_str(), base)
                .map_err(workbook_error)?;
            write_count(worksheet, sheet_row, 3, row.total_jobs, base)?;
            write_count(worksheet, sheet_row, 4, row.new_jobs, base)?;
        }

        // Standing duplicate-values rule over the vessel column.
        if !self.static_highlight && !table.is_empty() {
            let rule = ConditionalFormatDuplicate::new()
                .set_format(Format::new().set_background_color(self.duplicate_fill));
            worksheet
                .add_conditional_format(1, 1, table.len() as u32, 1, &rule)
                .map_err(workbook_error)?;
        }

        // Named table spanning every row and the five fixed columns. The
        // header row (text and styling) is owned by the table so it cannot
        // conflict with the cell writes; the range always includes at least
        // one data row because a worksheet table requires a body.
        let columns: Vec<TableColumn> = REPORT_COLUMNS
            .iter()
            .map(|header| {
                TableColumn::new()
                    .set_header(*header)
                    .set_header_format(header_format.clone())
            })
            .collect();
        let banded_table = Table::new()
            .set_name(self.table_name.as_str())
            .set_style(TableStyle::Medium2)
            .set_banded_rows(true)
            .set_banded_columns(false)
            .set_first_column(false)
            .set_last_column(false)
            .set_columns(&columns);
        let last_row = table.len().max(1) as u32;
        worksheet
            .add_table(0, 0, last_row, 4, &banded_table)
            .map_err(workbook_error)?;

        // Column widths: widest cell (header included) plus two characters.
        for (col, width) in column_widths(table).iter().enumerate() {
            worksheet
                .set_column_width(col as u16, *width as f64)
                .map_err(workbook_error)?;
        }

        workbook.save_to_buffer().map_err(workbook_error)
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn workbook_error(e: XlsxError) -> ReportError {
    ReportError::Workbook(e.to_string())
}

/// Write an optional count as a number, or the sentinel string on failure.
fn write_count(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    row: u32,
    col: u16,
    count: Option<u32>,
    format: &Format,
) -> Result<()> {
    match count {
        Some(n) => worksheet
            .write_with_format(row, col, n, format)
            .map_err(workbook_error)?,
        None => worksheet
            .write_with_format(row, col, format_count(None).as_str(), format)
            .map_err(workbook_error)?,
    };
    Ok(())
}

/// Vessel names that appear on more than one row.
fn duplicated_vessels(table: &JobTable) -> HashSet<&str> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut duplicated: HashSet<&str> = HashSet::new();
    for row in &table.rows {
        if !seen.insert(row.vessel_name.as_str()) {
            duplicated.insert(row.vessel_name.as_str());
        }
    }
    duplicated
}

/// Character length of each display value in a row, in column order.
fn row_cell_lengths(row: &TableRow) -> [usize; 5] {
    [
        row.file_name.chars().count(),
        row.vessel_name.chars().count(),
        row.date_display.chars().count(),
        format_count(row.total_jobs).chars().count(),
        format_count(row.new_jobs).chars().count(),
    ]
}

/// Per-column width: the longest cell value including the header, plus 2.
fn column_widths(table: &JobTable) -> [usize; 5] {
    let mut widths = [0usize; 5];
    for (col, header) in REPORT_COLUMNS.iter().enumerate() {
        widths[col] = header.chars().count();
    }
    for row in &table.rows {
        for (col, len) in row_cell_lengths(row).iter().enumerate() {
            widths[col] = widths[col].max(*len);
        }
    }
    for width in &mut widths {
        *width += 2;
    }
    widths
}

// ── Tests ─────────────────────────────────────────────────────────────────────
