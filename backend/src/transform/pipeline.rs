//! High-level pipeline API: load → clean once, then filter → aggregate per
//! selection.
//!
//! # Example
//!
//! ```rust,ignore
//! use salesdash::{load_dataset, build_dashboard, DashboardOptions, FilterSelection};
//!
//! let dataset = load_dataset("train.csv")?;
//! let selection = FilterSelection::all(&dataset.table);
//! let dashboard = build_dashboard(&dataset, &selection, &DashboardOptions::default());
//! println!("Total revenue: {:.2}", dashboard.metrics.total_sales);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::clean::{clean, detect_notices, CleaningReport};
use super::filter::{apply, FilterOptions, FilterSelection};
use super::grouper::{
    key_metrics, monthly_sales, sales_by_category, sales_by_customer, sales_by_product,
    sales_by_region, sales_by_sub_category, sales_by_year, AggregationResult, GroupTotal,
    KeyMetrics,
};
use crate::api::logs::{log_info, log_success, log_warning};
use crate::error::PipelineResult;
use crate::export::export;
use crate::models::{
    CustomerKey, DatasetNotice, ProductKey, SalesTable, SubCategoryKey, YearMonth,
};
use crate::parser::{load, load_bytes, RawTable};

/// Shape of the source before and after cleaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetOverview {
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    pub cleaned_rows: usize,
    pub encoding: String,
    pub delimiter: char,
}

/// A cleaned dataset plus everything learned while cleaning it.
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    pub table: SalesTable,
    pub report: CleaningReport,
    pub overview: DatasetOverview,
    pub notices: Vec<DatasetNotice>,
}

/// Ranking sizes for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOptions {
    pub top_products: usize,
    pub top_sub_categories: usize,
    pub top_customers: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            top_products: 15,
            top_sub_categories: 20,
            top_customers: 15,
        }
    }
}

/// Everything a UI renders for one selection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub overview: DatasetOverview,
    pub report: CleaningReport,
    pub notices: Vec<DatasetNotice>,
    pub options: FilterOptions,
    pub selection: FilterSelection,
    pub filtered_rows: usize,
    pub metrics: KeyMetrics,
    pub top_products: AggregationResult<ProductKey>,
    pub region_sales: AggregationResult<String>,
    pub top_region: Option<GroupTotal<String>>,
    pub category_sales: AggregationResult<String>,
    pub top_sub_categories: AggregationResult<SubCategoryKey>,
    pub monthly_sales: AggregationResult<YearMonth>,
    pub yearly_sales: AggregationResult<i32>,
    pub top_customers: AggregationResult<CustomerKey>,
}

/// Load and clean a CSV file.
pub fn load_dataset<P: AsRef<Path>>(path: P) -> PipelineResult<PreparedDataset> {
    log_info(format!("📖 Reading {}", path.as_ref().display()));
    let raw = load(path)?;
    prepare(raw)
}

/// Load and clean CSV bytes.
pub fn load_dataset_bytes(bytes: &[u8]) -> PipelineResult<PreparedDataset> {
    let raw = load_bytes(bytes)?;
    prepare(raw)
}

/// Clean a raw table and collect overview and notices.
pub fn prepare(raw: RawTable) -> PipelineResult<PreparedDataset> {
    let (rows, columns) = raw.shape();
    log_success(format!("Dataset loaded: {} rows × {} columns", rows, columns));
    log_info(format!(
        "Encoding: {}, delimiter: '{}'",
        raw.encoding,
        format_delimiter(raw.delimiter)
    ));

    let (table, report) = clean(&raw)?;
    print_cleaning_report(&report);
    log_success(format!(
        "Cleaned dataset: {} rows × {} columns",
        table.len(),
        table.headers().len()
    ));

    let notices = detect_notices(&raw.headers);
    for notice in &notices {
        log_warning(notice.message());
    }

    let overview = DatasetOverview {
        rows,
        columns,
        column_names: raw.headers.clone(),
        cleaned_rows: table.len(),
        encoding: raw.encoding,
        delimiter: raw.delimiter,
    };

    Ok(PreparedDataset {
        table,
        report,
        overview,
        notices,
    })
}

/// Filter, then run every aggregation.
pub fn build_dashboard(
    dataset: &PreparedDataset,
    selection: &FilterSelection,
    options: &DashboardOptions,
) -> Dashboard {
    let view = apply(&dataset.table, selection);
    log_info(format!(
        "Filtered {} of {} rows ({} region(s), {} category(ies))",
        view.len(),
        dataset.table.len(),
        selection.regions.len(),
        selection.categories.len()
    ));

    let region_sales = sales_by_region(&view);
    let top_region = region_sales.first().cloned();

    Dashboard {
        overview: dataset.overview.clone(),
        report: dataset.report.clone(),
        notices: dataset.notices.clone(),
        options: FilterOptions::from_table(&dataset.table),
        selection: selection.clone(),
        filtered_rows: view.len(),
        metrics: key_metrics(&view),
        top_products: sales_by_product(&view).top(options.top_products),
        region_sales,
        top_region,
        category_sales: sales_by_category(&view),
        top_sub_categories: sales_by_sub_category(&view).top(options.top_sub_categories),
        monthly_sales: monthly_sales(&view),
        yearly_sales: sales_by_year(&view),
        top_customers: sales_by_customer(&view).top(options.top_customers),
    }
}

/// CSV bytes of the rows matching `selection`.
pub fn export_selection(
    dataset: &PreparedDataset,
    selection: &FilterSelection,
) -> PipelineResult<Vec<u8>> {
    let view = apply(&dataset.table, selection);
    let bytes = export(&view)?;
    log_success(format!("Exported {} rows ({} bytes)", view.len(), bytes.len()));
    Ok(bytes)
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> &'static str {
    match d {
        ';' => ";",
        ',' => ",",
        '\t' => "TAB",
        '|' => "|",
        _ => "?",
    }
}

/// One summary line per cause, never one per row.
fn print_cleaning_report(report: &CleaningReport) {
    if report.has_nulls() {
        let columns: Vec<String> = report
            .null_counts
            .iter()
            .map(|c| format!("{} ({})", c.column, c.nulls))
            .collect();
        log_warning(format!("Missing values: {}", columns.join(", ")));
        log_warning(format!(
            "Dropped {} rows without order date or sales",
            report.dropped_missing_required
        ));
    } else {
        log_success("No missing values detected");
    }

    log_info(format!("Duplicate rows found: {}", report.duplicates_removed));
    if report.duplicates_removed > 0 {
        let left = report.rows_in - report.dropped_missing_required - report.duplicates_removed;
        log_success(format!("Duplicates removed: {} rows left", left));
    }
    if report.invalid_dates > 0 {
        log_warning(format!("Dropped {} rows with invalid dates", report.invalid_dates));
    }
    if report.invalid_sales > 0 {
        log_warning(format!("Dropped {} rows with invalid sales amounts", report.invalid_sales));
    }
}
