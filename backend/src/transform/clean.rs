//! Cleaning step: raw string table → typed, deduplicated [`SalesTable`].
//!
//! Steps run in a fixed order, each on the output of the previous one:
//!
//! ```text
//! RawTable ──▶ null scan ──▶ duplicates ──▶ date parse ──▶ sales parse ──▶ SalesTable
//!              (drop rows      (keep first    (DD/MM/YYYY,   (finite, ≥ 0)
//!               w/o date or     occurrence)    drop failures)
//!               sales)
//! ```
//!
//! Row-level failures are dropped and counted in the [`CleaningReport`].
//! Only a missing required column is fatal.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::CleaningResult;
use crate::models::{
    DatasetNotice, KnownColumns, SalesRecord, SalesTable, DATE_FORMAT, PROFIT, PROFIT_COLUMNS,
};
use crate::parser::RawTable;

/// Cell values read as missing, on top of empty/blank cells.
pub const NA_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Nulls found in one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnNulls {
    pub column: String,
    pub nulls: usize,
}

/// Counts of everything the cleaner dropped, by cause.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningReport {
    /// Rows in the raw table
    pub rows_in: usize,
    /// Columns with at least one null, in header order
    pub null_counts: Vec<ColumnNulls>,
    /// Rows dropped for a missing order date or sales amount
    pub dropped_missing_required: usize,
    /// Exact duplicate rows removed
    pub duplicates_removed: usize,
    /// Rows whose order date failed to parse
    pub invalid_dates: usize,
    /// Rows whose sales amount was not a finite, non-negative number
    pub invalid_sales: usize,
    /// Rows in the cleaned table
    pub rows_out: usize,
}

impl CleaningReport {
    /// Total rows dropped across all steps.
    pub fn rows_dropped(&self) -> usize {
        self.dropped_missing_required + self.duplicates_removed + self.invalid_dates + self.invalid_sales
    }

    pub fn has_nulls(&self) -> bool {
        !self.null_counts.is_empty()
    }
}

/// True when a cell counts as missing.
pub fn is_null(cell: &str) -> bool {
    let trimmed = cell.trim();
    trimmed.is_empty() || NA_MARKERS.contains(&trimmed)
}

/// Parse an order date in `DD/MM/YYYY` form.
pub fn parse_order_date(cell: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(cell.trim(), DATE_FORMAT).ok()
}

/// Parse a sales amount. Rejects non-finite and negative values.
pub fn parse_sales(cell: &str) -> Option<f64> {
    cell.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Clean a raw table.
///
/// # Errors
/// [`crate::error::CleaningError::MissingColumns`] when any of the known
/// columns is absent from the header.
pub fn clean(raw: &RawTable) -> CleaningResult<(SalesTable, CleaningReport)> {
    let columns = KnownColumns::locate(&raw.headers)?;

    let mut report = CleaningReport {
        rows_in: raw.rows.len(),
        null_counts: null_counts(raw),
        ..Default::default()
    };

    // 1. Required values
    let rows: Vec<Vec<String>> = raw
        .rows
        .iter()
        .filter(|row| !is_null(cell(row, columns.order_date)) && !is_null(cell(row, columns.sales)))
        .map(|row| canonical_cells(row, &columns))
        .collect();
    report.dropped_missing_required = raw.rows.len() - rows.len();

    // 2. Exact duplicates, on canonical cells
    let before = rows.len();
    let rows = drop_duplicates(rows);
    report.duplicates_removed = before - rows.len();

    // 3. Dates
    let mut dated = Vec::with_capacity(rows.len());
    for row in rows {
        match parse_order_date(cell(&row, columns.order_date)) {
            Some(date) => dated.push((row, date)),
            None => report.invalid_dates += 1,
        }
    }

    // 4. Sales
    let mut records = Vec::with_capacity(dated.len());
    for (row, date) in dated {
        match parse_sales(cell(&row, columns.sales)) {
            Some(sales) => records.push(build_record(row, &columns, date, sales)),
            None => report.invalid_sales += 1,
        }
    }

    report.rows_out = records.len();
    Ok((SalesTable::new(raw.headers.clone(), columns, records), report))
}

/// Notices about analyses this dataset cannot support.
///
/// Profit analysis is switched off as a whole when there is no `Profit`
/// column, whatever else is present.
pub fn detect_notices(headers: &[String]) -> Vec<DatasetNotice> {
    let has = |name: &str| headers.iter().any(|h| h == name);

    if has(PROFIT) {
        return Vec::new();
    }

    let missing = PROFIT_COLUMNS
        .iter()
        .filter(|name| !has(name))
        .map(|name| name.to_string())
        .collect();
    vec![DatasetNotice::ProfitColumnsMissing { missing }]
}

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

fn null_counts(raw: &RawTable) -> Vec<ColumnNulls> {
    raw.headers
        .iter()
        .enumerate()
        .filter_map(|(i, header)| {
            let nulls = raw.rows.iter().filter(|row| is_null(cell(row, i))).count();
            (nulls > 0).then(|| ColumnNulls {
                column: header.clone(),
                nulls,
            })
        })
        .collect()
}

/// Rewrite a row to its canonical text: null markers become `""`, parseable
/// dates become `DD/MM/YYYY` and parseable sales amounts their shortest
/// decimal form. Unparseable cells are kept verbatim for the later steps.
fn canonical_cells(row: &[String], columns: &KnownColumns) -> Vec<String> {
    row.iter()
        .enumerate()
        .map(|(i, c)| {
            if is_null(c) {
                return String::new();
            }
            let canonical = if i == columns.order_date {
                parse_order_date(c).map(|date| date.format(DATE_FORMAT).to_string())
            } else if i == columns.sales {
                parse_sales(c).map(|sales| sales.to_string())
            } else {
                None
            };
            canonical.unwrap_or_else(|| c.clone())
        })
        .collect()
}

/// Keep the first occurrence of each row.
fn drop_duplicates(rows: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(rows.len());
    rows.into_iter().filter(|row| seen.insert(row.clone())).collect()
}

fn build_record(cells: Vec<String>, columns: &KnownColumns, date: NaiveDate, sales: f64) -> SalesRecord {
    let text = |index: usize| cell(&cells, index).to_string();

    SalesRecord {
        order_id: text(columns.order_id),
        order_date: date,
        region: text(columns.region),
        category: text(columns.category),
        sub_category: text(columns.sub_category),
        product_name: text(columns.product_name),
        customer_name: text(columns.customer_name),
        segment: text(columns.segment),
        sales,
        cells,
    }
}
