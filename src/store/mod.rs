/// Customer Store Module
///
/// Owns the single `customers` table. Everything that reads or mutates
/// customer rows goes through [`CustomerStore`]; no other module touches
/// SQLite directly.
///
/// - model.rs: record, status, and partial-update types
/// - customers.rs: SQLite-backed store operations

pub mod customers;
pub mod model;

pub use customers::CustomerStore;
pub use model::{Customer, CustomerStatus, CustomerUpdate, Patch, StoreStats};

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by the customer store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced customer id does not exist
    #[error("Customer with ID {id} not found")]
    NotFound { id: i64 },

    /// Input violated a data constraint (empty name, nothing to update)
    #[error("{0}")]
    Validation(String),

    /// SQLite failure
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Filesystem failure while preparing the database location
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
