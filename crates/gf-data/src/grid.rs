//! The grid surface consumed by the filter panel

use std::collections::BTreeMap;

use gf_core::{FilterModel, GridError, GridViewState};
use serde_json::{Map, Value};

/// One row as seen by the panel
#[derive(Debug, Clone, PartialEq)]
pub struct RowNode {
    /// Position in the grid's row data
    pub index: usize,

    /// Whether the row passes the active filters
    pub displayed: bool,

    /// Field values
    pub data: Map<String, Value>,
}

impl RowNode {
    pub fn new(index: usize, displayed: bool, data: Map<String, Value>) -> Self {
        Self { index, displayed, data }
    }

    /// Read a field; missing fields read as `None`
    pub fn value(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }
}

/// A grid column and its current visibility
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridColumn {
    pub id: String,
    pub header: String,
    pub visible: bool,
}

impl GridColumn {
    pub fn new(id: impl Into<String>, header: impl Into<String>, visible: bool) -> Self {
        Self {
            id: id.into(),
            header: header.into(),
            visible,
        }
    }
}

/// Row/column query and filter-model surface of the wrapped grid
#[async_trait::async_trait]
pub trait GridApi: Send + Sync {
    /// Every row with its displayed flag
    fn rows(&self) -> Vec<RowNode>;

    /// Every row, with `displayed` evaluated against all filters except the
    /// one on `column_id`. Grids that cannot do this report plain `rows()`.
    fn rows_without_filter(&self, _column_id: &str) -> Vec<RowNode> {
        self.rows()
    }

    /// Column definitions in display order
    fn columns(&self) -> Vec<GridColumn>;

    /// Apply (or clear, with `None`) the filter model of one column.
    ///
    /// Re-evaluation may take a while; the new displayed set is only
    /// guaranteed to be visible once the future resolves.
    async fn set_column_filter_model(
        &self,
        column_id: &str,
        model: Option<FilterModel>,
    ) -> Result<(), GridError>;

    /// Currently applied filter model of one column
    fn column_filter_model(&self, column_id: &str) -> Option<FilterModel>;

    /// Ask the grid to re-run its filter pipeline
    fn on_filter_changed(&self);

    /// Show/hide columns; columns not mentioned keep their visibility
    fn set_column_visibility(&self, visibility: &BTreeMap<String, bool>) -> Result<(), GridError>;

    /// Snapshot of sort, column visibility and filter model
    fn view_state(&self) -> GridViewState;

    /// Restore a snapshot taken by [`GridApi::view_state`]
    fn apply_view_state(&self, state: &GridViewState) -> Result<(), GridError>;
}
