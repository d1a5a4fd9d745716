//! # SalesDash - retail sales analytics
//!
//! SalesDash loads a retail order export (CSV), cleans it once, and answers
//! filtered dashboard queries over it: key metrics, grouped revenue, top-N
//! rankings and chronological trends, plus CSV export of the filtered rows.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Loader    │────▶│   Cleaner   │────▶│   Filter    │────▶│ Aggregator  │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (report)    │     │ (per query) │     │ (dashboard) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘     └─────────────┘
//!                                                                    │
//!                                                                    ▼
//!                                                             ┌─────────────┐
//!                                                             │  Exporter   │
//!                                                             │   (CSV)     │
//!                                                             └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use salesdash::{build_dashboard, load_dataset, DashboardOptions, FilterSelection};
//!
//! let dataset = load_dataset("train.csv")?;
//! let selection = FilterSelection::all(&dataset.table);
//! let dashboard = build_dashboard(&dataset, &selection, &DashboardOptions::default());
//! println!("Top region: {:?}", dashboard.top_region);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (SalesRecord, SalesTable, grouping keys)
//! - [`parser`] - CSV loading with encoding/delimiter detection
//! - [`transform`] - Cleaning, filtering, aggregation and pipeline
//! - [`export`] - Filtered CSV export
//! - [`cache`] - Process-wide dataset cache
//! - [`api`] - HTTP API server and log broadcasting

// Core modules
pub mod error;
pub mod models;

// Loading
pub mod parser;

// Transformation
pub mod transform;

// Export
pub mod export;

// Caching
pub mod cache;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    CleaningError,
    ExportError,
    LoadError,
    PipelineError,
    PipelineResult,
    ServerError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    CustomerKey,
    DatasetNotice,
    Month,
    ProductKey,
    SalesRecord,
    SalesTable,
    SalesView,
    SubCategoryKey,
    YearMonth,
};

// =============================================================================
// Re-exports - Loading
// =============================================================================

pub use parser::{
    decode_content,
    detect_delimiter,
    detect_encoding,
    load,
    load_bytes,
    RawTable,
};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::clean::{clean, CleaningReport};
pub use transform::filter::{apply, FilterOptions, FilterSelection};
pub use transform::grouper::{
    key_metrics,
    monthly_sales,
    sales_by_category,
    sales_by_customer,
    sales_by_product,
    sales_by_region,
    sales_by_sub_category,
    sales_by_year,
    top_n,
    AggregationResult,
    GroupTotal,
    KeyMetrics,
};
pub use transform::pipeline::{
    build_dashboard,
    export_selection,
    load_dataset,
    load_dataset_bytes,
    prepare,
    Dashboard,
    DashboardOptions,
    DatasetOverview,
    PreparedDataset,
};

// =============================================================================
// Re-exports - Export and cache
// =============================================================================

pub use export::{export, EXPORT_FILE_NAME, EXPORT_MIME_TYPE};
pub use cache::{CachedDataset, DatasetCache, DATASET_CACHE};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{
    DashboardResponse,
    FilterQuery,
    OptionsResponse,
    error_response,
};

// Server
pub mod server {
    pub use crate::api::server::{resolve_data_path, start_server, ServerConfig};
}
