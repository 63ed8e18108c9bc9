//! Filter controllers for the grid filter panel
//!
//! One controller per filterable column holds the live widget state; the
//! [`FilterModelBridge`] pushes committed models into the grid and the
//! [`PanelOrchestrator`] ties both together for one table.

pub mod bridge;
pub mod columns;
pub mod panel;
pub mod range;
pub mod set;

use gf_core::GridError;
use thiserror::Error;

// Re-exports
pub use bridge::{CommitOutcome, FilterModelBridge};
pub use columns::ColumnVisibilityController;
pub use panel::{
    Dashboard, DragGesture, DragKind, FilterController, FilterSlot, PanelLayout, PanelOrchestrator,
};
pub use range::{Bound, RangeSliderController, RangeSliderState, SliderMode};
pub use set::{CheckItem, SetFilterController};

/// Errors raised by panel operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PanelError {
    #[error("No filter on column '{0}'")]
    UnknownFilter(String),

    #[error("Column '{column}' does not have a {expected} filter")]
    WrongFilterKind {
        column: String,
        expected: &'static str,
    },

    #[error("A drag on '{0}' is already in progress")]
    DragInProgress(String),

    #[error("No drag in progress")]
    NoActiveDrag,

    #[error("Panel has no column filter")]
    NoColumnFilter,

    #[error("Tab index {0} out of range")]
    TabOutOfRange(usize),

    #[error(transparent)]
    Grid(#[from] GridError),
}
