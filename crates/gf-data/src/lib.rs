//! Grid data access for the filter panel
//!
//! The grid itself is an external collaborator; this crate defines the
//! surface the panel consumes ([`GridApi`]), a bundled in-memory grid, the
//! value domain scanner and the text projections of cell values.

pub mod config;
pub mod grid;
pub mod memory;
pub mod scanner;
pub mod value;

use thiserror::Error;

// Re-exports
pub use config::{ColumnConfig, ColumnFormatter, DashboardConfig, InitialSetFilter, TableConfig};
pub use grid::{GridApi, GridColumn, RowNode};
pub use memory::InMemoryGrid;
pub use scanner::ValueDomainScanner;

/// Errors that can occur while loading table data
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
