//! Error types for the wealth engine and its callers.

use thiserror::Error;

/// Result type alias for dashboard, repository and CLI operations
pub type Result<T> = std::result::Result<T, WealthError>;

/// Errors raised at the caller boundary.
///
/// The engine routines themselves (recalculation, projection, aggregation)
/// never fail; everything here comes from validation, lookups, storage or I/O.
#[derive(Error, Debug)]
pub enum WealthError {
    /// Failed to open or read an input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid ledger record in an imported file
    #[error("Invalid record at row {row}: {message}")]
    InvalidRecord { row: usize, message: String },

    /// Amount was not strictly positive
    #[error("Amount must be greater than zero, got {0}")]
    InvalidAmount(String),

    /// Month index outside 0..=11
    #[error("Month index must be between 0 and 11, got {0}")]
    InvalidMonth(i64),

    /// Investment plan or other input rejected before reaching the engine
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Category name was empty after trimming
    #[error("Category name cannot be empty")]
    EmptyName,

    /// A category with the same name (case-insensitive) already exists
    #[error("Category already exists: {0}")]
    DuplicateCategory(String),

    /// Default categories are permanent
    #[error("Default category cannot be removed: {0}")]
    DefaultCategory(String),

    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Month not found: {0}")]
    MonthNotFound(String),

    #[error("Expense not found: {0}")]
    ExpenseNotFound(String),

    /// The ledger already holds an entry for this calendar month
    #[error("Month {month}/{year} already exists")]
    DuplicateMonth { month: u8, year: i32 },

    /// The document store collaborator failed
    #[error("Storage error: {0}")]
    Store(String),

    /// Bad command line invocation
    #[error("{0}")]
    Usage(String),
}
