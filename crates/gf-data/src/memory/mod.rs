//! In-memory grid
//!
//! A small row store that implements [`GridApi`] over JSON rows. It keeps
//! the filter model, column visibility and sort order behind a lock so the
//! panel and the table view can share it through an `Arc`.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use ahash::AHashMap;
use gf_core::{
    ColumnKind, FilterModel, FilterableColumn, GridError, GridViewState, SortDirection, SortEntry,
};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::TableConfig;
use crate::grid::{GridApi, GridColumn, RowNode};
use crate::value::{cell_text, linear_value};

#[derive(Debug, Default)]
struct GridState {
    filter_model: BTreeMap<String, FilterModel>,
    visibility: BTreeMap<String, bool>,
    sort: Vec<SortEntry>,
}

/// Grid over rows held in memory
pub struct InMemoryGrid {
    columns: Vec<GridColumn>,
    filterable: AHashMap<String, FilterableColumn>,
    rows: Vec<Map<String, Value>>,
    state: RwLock<GridState>,
    rejected: RwLock<HashSet<String>>,
    filter_changed: AtomicU64,
}

impl InMemoryGrid {
    pub fn new(
        columns: Vec<GridColumn>,
        filterable: Vec<FilterableColumn>,
        rows: Vec<Map<String, Value>>,
    ) -> Self {
        let visibility = columns.iter().map(|c| (c.id.clone(), c.visible)).collect();

        Self {
            columns,
            filterable: filterable.into_iter().map(|c| (c.id.clone(), c)).collect(),
            rows,
            state: RwLock::new(GridState {
                visibility,
                ..GridState::default()
            }),
            rejected: RwLock::new(HashSet::new()),
            filter_changed: AtomicU64::new(0),
        }
    }

    /// Build a grid from a table configuration
    pub fn from_table(table: &TableConfig) -> Self {
        Self::new(table.grid_columns(), table.filterable_columns(), table.rows.clone())
    }

    /// Make every later filter change on `column_id` fail
    pub fn reject_column(&self, column_id: &str) {
        self.rejected.write().insert(column_id.to_string());
    }

    /// Accept filter changes on `column_id` again
    pub fn accept_column(&self, column_id: &str) {
        self.rejected.write().remove(column_id);
    }

    /// How often the filter pipeline was asked to re-run
    pub fn filter_changed_count(&self) -> u64 {
        self.filter_changed.load(AtomicOrdering::Relaxed)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Replace the sort order
    pub fn set_sort(&self, sort: Vec<SortEntry>) {
        self.state.write().sort = sort;
    }

    pub fn sort(&self) -> Vec<SortEntry> {
        self.state.read().sort.clone()
    }

    /// Toggle sorting on a column: none, ascending, descending, none
    pub fn cycle_sort(&self, column_id: &str) {
        let mut state = self.state.write();
        let next = match state.sort.iter().find(|s| s.col_id == column_id).map(|s| s.sort) {
            None => Some(SortDirection::Asc),
            Some(SortDirection::Asc) => Some(SortDirection::Desc),
            Some(SortDirection::Desc) => None,
        };
        state.sort.clear();
        if let Some(sort) = next {
            state.sort.push(SortEntry {
                col_id: column_id.to_string(),
                sort,
            });
        }
    }

    /// Visible columns in display order
    pub fn visible_columns(&self) -> Vec<GridColumn> {
        self.columns()
            .into_iter()
            .filter(|column| column.visible)
            .collect()
    }

    /// Rows that pass every filter, in sort order
    pub fn displayed_rows(&self) -> Vec<RowNode> {
        let state = self.state.read();
        let mut rows: Vec<RowNode> = self
            .evaluate(&state.filter_model, None)
            .into_iter()
            .filter(|row| row.displayed)
            .collect();

        for entry in state.sort.iter().rev() {
            rows.sort_by(|a, b| {
                let ordering = compare_cells(a.value(&entry.col_id), b.value(&entry.col_id));
                match entry.sort {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        rows
    }

    fn evaluate(&self, filters: &BTreeMap<String, FilterModel>, skip: Option<&str>) -> Vec<RowNode> {
        let active: Vec<(&FilterableColumn, &FilterModel)> = filters
            .iter()
            .filter(|(column_id, _)| Some(column_id.as_str()) != skip)
            .filter_map(|(column_id, model)| Some((self.filterable.get(column_id)?, model)))
            .collect();

        self.rows
            .iter()
            .enumerate()
            .map(|(index, data)| {
                let displayed = active.iter().all(|(column, model)| passes(data, column, model));
                RowNode::new(index, displayed, data.clone())
            })
            .collect()
    }

    fn validate(&self, column_id: &str, model: Option<&FilterModel>) -> Result<(), GridError> {
        if !self.columns.iter().any(|c| c.id == column_id) {
            return Err(GridError::UnknownColumn(column_id.to_string()));
        }

        let Some(model) = model else {
            return Ok(());
        };

        let column = self.filterable.get(column_id).ok_or_else(|| GridError::IncompatibleModel {
            column: column_id.to_string(),
            reason: "column has no filter".to_string(),
        })?;

        let fits = match column.kind {
            ColumnKind::Text => model.as_set().is_some(),
            ColumnKind::Number | ColumnKind::Date => model.as_range().is_some(),
        };
        if !fits {
            return Err(GridError::IncompatibleModel {
                column: column_id.to_string(),
                reason: format!("{:?} column cannot take this model", column.kind),
            });
        }

        Ok(())
    }
}

fn passes(data: &Map<String, Value>, column: &FilterableColumn, model: &FilterModel) -> bool {
    let cell = data.get(&column.id);
    match model {
        FilterModel::Set(set) => set.contains(&cell.map(cell_text).unwrap_or_default()),
        FilterModel::Range(range) => cell
            .and_then(|cell| linear_value(cell, column))
            .is_some_and(|value| range.matches(value)),
    }
}

fn compare_cells(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a.and_then(Value::as_f64), b.and_then(Value::as_f64)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => {
            let x = a.map(cell_text).unwrap_or_default();
            let y = b.map(cell_text).unwrap_or_default();
            x.cmp(&y)
        }
    }
}

#[async_trait::async_trait]
impl GridApi for InMemoryGrid {
    fn rows(&self) -> Vec<RowNode> {
        let state = self.state.read();
        self.evaluate(&state.filter_model, None)
    }

    fn rows_without_filter(&self, column_id: &str) -> Vec<RowNode> {
        let state = self.state.read();
        self.evaluate(&state.filter_model, Some(column_id))
    }

    fn columns(&self) -> Vec<GridColumn> {
        let state = self.state.read();
        self.columns
            .iter()
            .map(|column| GridColumn {
                visible: state.visibility.get(&column.id).copied().unwrap_or(column.visible),
                ..column.clone()
            })
            .collect()
    }

    async fn set_column_filter_model(
        &self,
        column_id: &str,
        model: Option<FilterModel>,
    ) -> Result<(), GridError> {
        self.validate(column_id, model.as_ref())?;

        // Re-evaluation happens off the caller's turn
        tokio::task::yield_now().await;

        if self.rejected.read().contains(column_id) {
            return Err(GridError::Rejected(format!(
                "filter changes on '{}' are not accepted",
                column_id
            )));
        }

        let mut state = self.state.write();
        match model {
            Some(model) => {
                debug!("Applying filter on column '{}'", column_id);
                state.filter_model.insert(column_id.to_string(), model);
            }
            None => {
                debug!("Clearing filter on column '{}'", column_id);
                state.filter_model.remove(column_id);
            }
        }
        Ok(())
    }

    fn column_filter_model(&self, column_id: &str) -> Option<FilterModel> {
        self.state.read().filter_model.get(column_id).cloned()
    }

    fn on_filter_changed(&self) {
        self.filter_changed.fetch_add(1, AtomicOrdering::Relaxed);
    }

    fn set_column_visibility(&self, visibility: &BTreeMap<String, bool>) -> Result<(), GridError> {
        if let Some(unknown) = visibility.keys().find(|id| !self.columns.iter().any(|c| &c.id == *id)) {
            return Err(GridError::UnknownColumn(unknown.clone()));
        }

        let mut state = self.state.write();
        for (column_id, visible) in visibility {
            state.visibility.insert(column_id.clone(), *visible);
        }
        Ok(())
    }

    fn view_state(&self) -> GridViewState {
        let state = self.state.read();
        GridViewState {
            filter_model: state.filter_model.clone(),
            column_visibility: state.visibility.clone(),
            sort: state.sort.clone(),
        }
    }

    fn apply_view_state(&self, view: &GridViewState) -> Result<(), GridError> {
        for (column_id, model) in &view.filter_model {
            self.validate(column_id, Some(model))?;
        }

        let mut state = self.state.write();
        for (column_id, visible) in &view.column_visibility {
            if self.columns.iter().any(|c| &c.id == column_id) {
                state.visibility.insert(column_id.clone(), *visible);
            } else {
                warn!("Ignoring visibility of unknown column '{}'", column_id);
            }
        }
        state.filter_model = view.filter_model.clone();
        state.sort = view
            .sort
            .iter()
            .filter(|entry| self.columns.iter().any(|c| c.id == entry.col_id))
            .cloned()
            .collect();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gf_core::DateGranularity;
    use serde_json::json;

    fn grid() -> InMemoryGrid {
        let rows = [
            json!({ "city": "Oslo", "pop": 700, "founded": "1040-01-01" }),
            json!({ "city": "Bergen", "pop": 285, "founded": "1070-01-01" }),
            json!({ "city": "Tromso", "pop": 77 }),
            json!({ "city": "Oslo", "pop": 12 }),
        ];

        InMemoryGrid::new(
            vec![
                GridColumn::new("city", "City", true),
                GridColumn::new("pop", "Population", true),
                GridColumn::new("founded", "Founded", false),
            ],
            vec![
                FilterableColumn::text("city"),
                FilterableColumn::number("pop"),
                FilterableColumn::date("founded", DateGranularity::Date),
            ],
            rows.into_iter()
                .filter_map(|row| row.as_object().cloned())
                .collect(),
        )
    }

    fn displayed(rows: &[RowNode]) -> Vec<usize> {
        rows.iter().filter(|r| r.displayed).map(|r| r.index).collect()
    }

    #[tokio::test]
    async fn test_set_and_range_filters_combine() {
        let grid = grid();
        grid.set_column_filter_model("city", Some(FilterModel::set(["Oslo", "Bergen"])))
            .await
            .unwrap();
        assert_eq!(displayed(&grid.rows()), vec![0, 1, 3]);

        grid.set_column_filter_model("pop", Some(FilterModel::range(100.0, 700.0)))
            .await
            .unwrap();
        assert_eq!(displayed(&grid.rows()), vec![0, 1]);

        // Only the city filter applies when the population filter is skipped
        assert_eq!(displayed(&grid.rows_without_filter("pop")), vec![0, 1, 3]);

        grid.set_column_filter_model("city", None).await.unwrap();
        assert_eq!(displayed(&grid.rows()), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_filter_validation() {
        let grid = grid();

        let unknown = grid.set_column_filter_model("nope", None).await;
        assert_eq!(unknown, Err(GridError::UnknownColumn("nope".to_string())));

        let wrong_kind = grid
            .set_column_filter_model("pop", Some(FilterModel::set(["1"])))
            .await;
        assert!(matches!(wrong_kind, Err(GridError::IncompatibleModel { .. })));

        grid.reject_column("city");
        let rejected = grid
            .set_column_filter_model("city", Some(FilterModel::set(["Oslo"])))
            .await;
        assert!(matches!(rejected, Err(GridError::Rejected(_))));
        assert_eq!(grid.column_filter_model("city"), None);
    }

    #[tokio::test]
    async fn test_date_range_skips_missing_cells() {
        let grid = grid();
        grid.set_column_filter_model("founded", Some(FilterModel::range(f64::MIN, f64::MAX)))
            .await
            .unwrap();
        assert_eq!(displayed(&grid.rows()), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_view_state_round_trip() {
        let source = grid();
        source
            .set_column_filter_model("city", Some(FilterModel::set(["Oslo"])))
            .await
            .unwrap();
        source
            .set_column_visibility(&BTreeMap::from([("founded".to_string(), true)]))
            .unwrap();
        source.cycle_sort("pop");

        let view = source.view_state();
        let restored = grid();
        restored.apply_view_state(&view).unwrap();

        assert_eq!(restored.view_state(), view);
        assert_eq!(
            restored.displayed_rows().iter().map(|r| r.index).collect::<Vec<_>>(),
            vec![3, 0]
        );
        assert!(restored.columns().iter().all(|c| c.visible));
    }

    #[test]
    fn test_apply_incompatible_view_state_leaves_grid_untouched() {
        let grid = grid();
        let mut view = GridViewState::default();
        view.filter_model.insert("pop".to_string(), FilterModel::set(["12"]));
        view.sort.push(SortEntry {
            col_id: "pop".to_string(),
            sort: SortDirection::Desc,
        });

        assert!(grid.apply_view_state(&view).is_err());
        assert!(grid.sort().is_empty());
    }

    #[test]
    fn test_cycle_sort() {
        let grid = grid();
        grid.cycle_sort("city");
        assert_eq!(grid.sort()[0].sort, SortDirection::Asc);
        grid.cycle_sort("city");
        assert_eq!(grid.sort()[0].sort, SortDirection::Desc);
        grid.cycle_sort("city");
        assert!(grid.sort().is_empty());

        grid.on_filter_changed();
        assert_eq!(grid.filter_changed_count(), 1);
    }
}
