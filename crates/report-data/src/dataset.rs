//! Filterable summary table and rollups over extracted job records.
//!
//! One [`TableRow`] per source file, with the display date coerced to a
//! real date for filtering and grouping. The table is ephemeral: it is
//! rebuilt from records on every scan and re-filtered on every filter
//! change, never persisted.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use report_core::dates;
use report_core::models::JobRecord;

// ── TableRow ──────────────────────────────────────────────────────────────────

/// One row of the summary table: a [`JobRecord`] plus its coerced date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// Source file name.
    pub file_name: String,
    /// Sniffed vessel name or a sentinel.
    pub vessel_name: String,
    /// Data row count; `None` for failed records.
    pub total_jobs: Option<u32>,
    /// New-status row count; `None` for failed records.
    pub new_jobs: Option<u32>,
    /// Display form of the extracted date (`DD-MM-YYYY` or `"Unknown"`).
    pub date_display: String,
    /// Coerced date; `None` whenever the display string does not parse.
    ///
    /// Rows with a `None` date fail every date-range filter and are
    /// excluded from timeline buckets. This mirrors the coerce-to-null
    /// policy of the display layer and is deliberate.
    pub date: Option<NaiveDate>,
}

impl From<JobRecord> for TableRow {
    fn from(record: JobRecord) -> Self {
        let date = dates::coerce_display_date(&record.extracted_date);
        Self {
            file_name: record.file_name,
            vessel_name: record.vessel_name,
            total_jobs: record.total_jobs,
            new_jobs: record.new_jobs,
            date_display: record.extracted_date,
            date,
        }
    }
}

// ── FilterSpec ────────────────────────────────────────────────────────────────

/// User-selected filters: vessel membership AND an inclusive date range.
///
/// An empty vessel list means "no vessel filtering"; a missing range means
/// "no date filtering".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    /// Vessel names to keep; empty keeps every vessel.
    pub vessels: Vec<String>,
    /// Inclusive `(from, to)` range; `None` keeps every date.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl FilterSpec {
    /// Whether this spec filters nothing at all.
    pub fn is_empty(&self) -> bool {
        self.vessels.is_empty() && self.date_range.is_none()
    }

    /// Conjunction of the vessel test and the date test.
    pub fn matches(&self, row: &TableRow) -> bool {
        if !self.vessels.is_empty() && !self.vessels.iter().any(|v| v == &row.vessel_name) {
            return false;
        }
        if let Some((from, to)) = self.date_range {
            // Rows without a coerced date fail whenever a range is set.
            match row.date {
                Some(date) => from <= date && date <= to,
                None => return false,
            }
        } else {
            true
        }
    }
}

// ── SummaryRollup ─────────────────────────────────────────────────────────────

/// Per-vessel aggregate: file count plus summed job counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VesselSummary {
    pub vessel_name: String,
    pub file_count: u32,
    pub total_jobs: u64,
    pub new_jobs: u64,
}

/// Per-date aggregate over rows sharing the same coerced date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateBucket {
    pub date: NaiveDate,
    pub total_jobs: u64,
    pub new_jobs: u64,
}

/// All aggregates derived from one (filtered) table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryRollup {
    /// Per-vessel sums, sorted by vessel name ascending.
    pub vessels: Vec<VesselSummary>,
    /// Per-date sums, sorted by date ascending. Undated rows are excluded.
    pub timeline: Vec<DateBucket>,
    /// Sum of all total-job counts (failed records contribute 0).
    pub total_jobs: u64,
    /// Sum of all new-job counts.
    pub new_jobs: u64,
    /// `total_jobs - new_jobs`.
    pub existing_jobs: u64,
    /// Number of rows (files) in the table.
    pub file_count: usize,
    /// Number of distinct vessel names, sentinels included.
    pub vessel_count: usize,
}

// ── JobTable ──────────────────────────────────────────────────────────────────

/// The summary table: one row per processed file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobTable {
    pub rows: Vec<TableRow>,
}

impl JobTable {
    /// Stack records into a table, coercing display dates as described on
    /// [`TableRow::date`].
    pub fn from_records(records: impl IntoIterator<Item = JobRecord>) -> Self {
        Self {
            rows: records.into_iter().map(TableRow::from).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Apply `spec` and return the surviving subset as a new table.
    pub fn filter(&self, spec: &FilterSpec) -> JobTable {
        JobTable {
            rows: self
                .rows
                .iter()
                .filter(|row| spec.matches(row))
                .cloned()
                .collect(),
        }
    }

    /// Distinct vessel names sorted ascending.
    pub fn vessel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rows.iter().map(|r| r.vessel_name.clone()).collect();
        names.sort();
        names.dedup();
        names
    }

    /// Rows for one vessel, sorted by date descending with undated rows last.
    pub fn rows_for_vessel(&self, vessel_name: &str) -> Vec<&TableRow> {
        let mut rows: Vec<&TableRow> = self
            .rows
            .iter()
            .filter(|r| r.vessel_name == vessel_name)
            .collect();
        rows.sort_by(|a, b| match (b.date, a.date) {
            (Some(db), Some(da)) => db.cmp(&da),
            (Some(_), None) => std::cmp::Ordering::Greater,
            (None, Some(_)) => std::cmp::Ordering::Less,
            (None, None) => std::cmp::Ordering::Equal,
        });
        rows
    }

    /// All rows sorted by date ascending, undated rows last (chart order).
    pub fn rows_by_date(&self) -> Vec<&TableRow> {
        let mut rows: Vec<&TableRow> = self.rows.iter().collect();
        rows.sort_by_key(|r| (r.date.is_none(), r.date));
        rows
    }

    /// Derive all aggregates for this table.
    ///
    /// Grouping keys: vessel name for the per-vessel sums, the coerced date
    /// value (never the display string) for the timeline. `BTreeMap`s keep
    /// both orderings deterministic.
    pub fn rollup(&self) -> SummaryRollup {
        let mut by_vessel: BTreeMap<String, VesselSummary> = BTreeMap::new();
        let mut by_date: BTreeMap<NaiveDate, DateBucket> = BTreeMap::new();

        let mut total_jobs = 0u64;
        let mut new_jobs = 0u64;

        for row in &self.rows {
            let row_total = u64::from(row.total_jobs.unwrap_or(0));
            let row_new = u64::from(row.new_jobs.unwrap_or(0));

            total_jobs += row_total;
            new_jobs += row_new;

            let vessel = by_vessel
                .entry(row.vessel_name.clone())
                .or_insert_with(|| VesselSummary {
                    vessel_name: row.vessel_name.clone(),
                    file_count: 0,
                    total_jobs: 0,
                    new_jobs: 0,
                });
            vessel.file_count += 1;
            vessel.total_jobs += row_total;
            vessel.new_jobs += row_new;

            if let Some(date) = row.date {
                let bucket = by_date.entry(date).or_insert_with(|| DateBucket {
                    date,
                    total_jobs: 0,
                    new_jobs: 0,
                });
                bucket.total_jobs += row_total;
                bucket.new_jobs += row_new;
            }
        }

        let vessel_count = by_vessel.len();

        SummaryRollup {
            vessels: by_vessel.into_values().collect(),
            timeline: by_date.into_values().collect(),
            total_jobs,
            new_jobs,
            existing_jobs: total_jobs.saturating_sub(new_jobs),
            file_count: self.rows.len(),
            vessel_count,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
