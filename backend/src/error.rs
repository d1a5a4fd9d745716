//! Error types for the sales analytics pipeline.
//!
//! - [`LoadError`] - source file unreadable, undecodable or empty
//! - [`CleaningError`] - required column absent (fatal, before aggregation)
//! - [`ExportError`] - CSV serialization failures
//! - [`PipelineError`] - Top-level orchestration errors
//! - [`ServerError`] - HTTP layer errors
//!
//! Row-level defects (nulls, duplicates, bad dates) are never errors: they are
//! counted in [`crate::transform::clean::CleaningReport`].

use thiserror::Error;

// =============================================================================
// Loader Errors
// =============================================================================

/// Errors while reading the source file into a raw table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read file.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Content could not be decoded.
    #[error("Failed to decode content: {0}")]
    Encoding(String),

    /// Malformed CSV record.
    #[error("Invalid CSV format: {0}")]
    Csv(#[from] csv::Error),

    /// No header line.
    #[error("No headers found in CSV")]
    NoHeaders,

    /// Header present but zero data rows.
    #[error("CSV file has no data rows")]
    EmptyFile,
}

// =============================================================================
// Cleaning Errors
// =============================================================================

/// Structural errors found while cleaning.
#[derive(Debug, Error)]
pub enum CleaningError {
    /// One or more of the known columns is absent from the header.
    #[error("Required column(s) missing: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while serializing a view back to CSV.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV writer error.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// Writer could not be flushed into the output buffer.
    #[error("Failed to flush export buffer: {0}")]
    Flush(String),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// Wraps every fatal condition; each one aborts the pipeline with a single
/// user-facing message.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Loading failed.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Cleaning failed.
    #[error("Cleaning error: {0}")]
    Cleaning(#[from] CleaningError),

    /// Export failed.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for loader operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for cleaning operations.
pub type CleaningResult<T> = Result<T, CleaningError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
