//! Core functionality for the grid filter panel
//!
//! This crate provides the column model, the filter-model wire shapes shared
//! with the grid, the event bus, the per-table filter registry and the
//! persistence layer for view state.

pub mod column;
pub mod domain;
pub mod events;
pub mod model;
pub mod persist;
pub mod registry;

use thiserror::Error;

// Re-export commonly used types
pub use column::{ColumnKind, DateGranularity, FilterableColumn, NumberFormat};
pub use domain::{RangeDomain, SetDomain, SetDomainItem, ValueDomain};
pub use events::{EventBus, Event, EventHandler, handler_from_fn};
pub use model::{
    ConditionType, FilterModel, GridViewState, RangeCondition, RangeFilterModel,
    SetFilterModel, SortDirection, SortEntry,
};
pub use persist::{
    KeyValueStore, MemoryStore, PersistenceLayer, PersistedViewState, ViewStatePatch,
    DEFAULT_PANEL_WIDTH,
};
pub use registry::{FilterRegistry, FilterSyncSettings};

/// Errors reported by a grid when it cannot take a request
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Filter model does not fit column '{column}': {reason}")]
    IncompatibleModel {
        column: String,
        reason: String,
    },

    #[error("Grid rejected the request: {0}")]
    Rejected(String),
}
