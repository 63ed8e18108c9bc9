//! Filter panel of one table
//!
//! The orchestrator owns one controller per filterable column, addressed by
//! column id in configuration order. Every commit goes through the
//! [`FilterModelBridge`]; when the grid has applied it, the other filters of
//! the table re-scan their domain from the rows the grid now reports.

mod dashboard;

pub use dashboard::{Dashboard, DashboardTab};

use std::sync::Arc;

use gf_core::{
    ColumnKind, EventBus, FilterModel, FilterRegistry, FilterSyncSettings, FilterableColumn,
    GridViewState, ValueDomain,
};
use gf_data::{GridApi, InitialSetFilter, TableConfig, ValueDomainScanner};
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::bridge::{CommitOutcome, FilterModelBridge};
use crate::columns::ColumnVisibilityController;
use crate::range::{Bound, RangeSliderController};
use crate::set::SetFilterController;
use crate::PanelError;

/// Height of a range filter widget
pub const RANGE_SLOT_HEIGHT: f32 = 74.0;

/// Vertical space reserved per range filter
pub const RANGE_RESERVED_HEIGHT: f32 = 75.0;

/// Controller of one filterable column
#[derive(Debug, Clone)]
pub enum FilterController {
    Set(SetFilterController),
    Range(RangeSliderController),
}

impl FilterController {
    pub fn as_set(&self) -> Option<&SetFilterController> {
        match self {
            FilterController::Set(controller) => Some(controller),
            FilterController::Range(_) => None,
        }
    }

    pub fn as_range(&self) -> Option<&RangeSliderController> {
        match self {
            FilterController::Range(controller) => Some(controller),
            FilterController::Set(_) => None,
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            FilterController::Set(controller) => controller.is_active(),
            FilterController::Range(controller) => controller.is_active(),
        }
    }

    fn refresh(&mut self, domain: ValueDomain) {
        match (self, domain) {
            (FilterController::Set(controller), ValueDomain::Set(domain)) => controller.refresh(&domain),
            (FilterController::Range(controller), ValueDomain::Range(domain)) => controller.refresh(domain),
            _ => {}
        }
    }

    fn apply_model(&mut self, model: Option<&FilterModel>) {
        match self {
            FilterController::Set(controller) => controller.apply_model(model.and_then(FilterModel::as_set)),
            FilterController::Range(controller) => {
                controller.apply_model(model.and_then(FilterModel::as_range))
            }
        }
    }
}

/// What a drag gesture grabs
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragKind {
    Handle(Bound),
    Track { width_px: f32 },
}

/// A widget slot in the panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterSlot {
    Filter(String),
    Columns,
}

/// Vertical arrangement of the panel's widgets, top to bottom
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelLayout {
    pub slots: Vec<(FilterSlot, f32)>,
}

impl PanelLayout {
    pub fn height_of(&self, slot: &FilterSlot) -> Option<f32> {
        self.slots.iter().find(|(s, _)| s == slot).map(|(_, h)| *h)
    }
}

/// Filter state of one table
pub struct PanelOrchestrator {
    table_key: String,
    bridge: FilterModelBridge,
    columns: Vec<FilterableColumn>,
    controllers: IndexMap<String, FilterController>,
    column_filter: Option<ColumnVisibilityController>,
    active_drag: Option<String>,
}

impl PanelOrchestrator {
    /// Build the panel of a table.
    ///
    /// A restored view state is handed to the grid and the controllers are
    /// reconciled from it. Without one (or when the grid refuses it) the
    /// configured initial set filters are applied instead.
    pub async fn mount(
        table_key: impl Into<String>,
        table: &TableConfig,
        grid: Arc<dyn GridApi>,
        registry: FilterRegistry,
        events: EventBus,
        restored: Option<GridViewState>,
    ) -> Self {
        let table_key = table_key.into();
        let columns = table.filterable_columns();
        let bridge = FilterModelBridge::new(table_key.clone(), grid.clone(), registry, events);

        let controllers = columns
            .iter()
            .map(|column| {
                let domain = ValueDomainScanner::scan(&grid.rows_without_filter(&column.id), column);
                let controller = match domain {
                    ValueDomain::Set(domain) => {
                        FilterController::Set(SetFilterController::with_domain(&column.id, &domain))
                    }
                    ValueDomain::Range(domain) => {
                        FilterController::Range(RangeSliderController::with_domain(column.clone(), domain))
                    }
                };
                (column.id.clone(), controller)
            })
            .collect();

        let column_filter = table
            .column_filter
            .then(|| ColumnVisibilityController::new(&grid.columns()));

        let mut panel = Self {
            table_key,
            bridge,
            columns,
            controllers,
            column_filter,
            active_drag: None,
        };

        for column in &panel.columns {
            panel.bridge.register(&column.id, FilterSyncSettings::default());
        }

        let restored = match restored {
            Some(state) => match grid.apply_view_state(&state) {
                Ok(()) => true,
                Err(e) => {
                    warn!("Discarding stored view state of '{}': {}", panel.table_key, e);
                    false
                }
            },
            None => false,
        };

        if restored {
            grid.on_filter_changed();
            panel.reconcile_from_grid();
        } else {
            panel.apply_initial_filters(&table.initial_filters()).await;
        }

        info!(
            "Mounted filter panel '{}' with {} filters",
            panel.table_key,
            panel.controllers.len()
        );
        panel
    }

    pub fn table_key(&self) -> &str {
        &self.table_key
    }

    pub fn grid(&self) -> &Arc<dyn GridApi> {
        self.bridge.grid()
    }

    pub fn bridge(&self) -> &FilterModelBridge {
        &self.bridge
    }

    pub fn columns(&self) -> &[FilterableColumn] {
        &self.columns
    }

    /// Controllers in configuration order
    pub fn controllers(&self) -> impl Iterator<Item = (&str, &FilterController)> {
        self.controllers.iter().map(|(id, controller)| (id.as_str(), controller))
    }

    pub fn controller(&self, column_id: &str) -> Option<&FilterController> {
        self.controllers.get(column_id)
    }

    pub fn set_filter(&self, column_id: &str) -> Result<&SetFilterController, PanelError> {
        match self.controllers.get(column_id) {
            Some(FilterController::Set(controller)) => Ok(controller),
            Some(FilterController::Range(_)) => Err(wrong_kind(column_id, "set")),
            None => Err(PanelError::UnknownFilter(column_id.to_string())),
        }
    }

    pub fn range_filter(&self, column_id: &str) -> Result<&RangeSliderController, PanelError> {
        match self.controllers.get(column_id) {
            Some(FilterController::Range(controller)) => Ok(controller),
            Some(FilterController::Set(_)) => Err(wrong_kind(column_id, "range")),
            None => Err(PanelError::UnknownFilter(column_id.to_string())),
        }
    }

    pub fn column_filter(&self) -> Option<&ColumnVisibilityController> {
        self.column_filter.as_ref()
    }

    // Set filters

    pub fn toggle(&mut self, column_id: &str, value: &str) -> Result<bool, PanelError> {
        Ok(self.set_filter_mut(column_id)?.toggle(value))
    }

    pub fn toggle_all(&mut self, column_id: &str, checked: bool) -> Result<(), PanelError> {
        self.set_filter_mut(column_id)?.toggle_all(checked);
        Ok(())
    }

    pub fn search(&mut self, column_id: &str, term: &str) -> Result<(), PanelError> {
        self.set_filter_mut(column_id)?.search(term);
        Ok(())
    }

    /// Submit the checked values of a set filter.
    ///
    /// The search is cleared once the grid accepts the model; a refused model
    /// leaves the filter as it was, checked values included.
    pub async fn commit_set(&mut self, column_id: &str) -> Result<CommitOutcome, PanelError> {
        let model = self.set_filter(column_id)?.commit();
        let outcome = self.submit(column_id, Some(model)).await;
        if !matches!(outcome, CommitOutcome::Failed(_)) {
            self.set_filter_mut(column_id)?.mark_applied();
        }
        Ok(outcome)
    }

    /// Clear the filter of any column; restored if the grid refuses
    pub async fn reset(&mut self, column_id: &str) -> Result<CommitOutcome, PanelError> {
        if self.active_drag.as_deref() == Some(column_id) {
            self.cancel_drag()?;
        }

        let controller = self
            .controllers
            .get_mut(column_id)
            .ok_or_else(|| PanelError::UnknownFilter(column_id.to_string()))?;
        let before = controller.clone();
        match controller {
            FilterController::Set(controller) => controller.reset(),
            FilterController::Range(controller) => controller.reset(),
        }

        let outcome = self.submit(column_id, None).await;
        if matches!(outcome, CommitOutcome::Failed(_)) {
            if let Some(controller) = self.controllers.get_mut(column_id) {
                *controller = before;
            }
        }
        Ok(outcome)
    }

    // Range filters

    /// Start a drag on a slider; only one drag per panel at a time
    pub fn begin_drag(&mut self, column_id: &str, kind: DragKind) -> Result<(), PanelError> {
        if let Some(active) = &self.active_drag {
            return Err(PanelError::DragInProgress(active.clone()));
        }

        let slider = self.range_filter_mut(column_id)?;
        match kind {
            DragKind::Handle(which) => slider.begin_handle_drag(which),
            DragKind::Track { width_px } => slider.begin_track_drag(width_px),
        }
        self.active_drag = Some(column_id.to_string());
        debug!("Drag started on '{}'", column_id);
        Ok(())
    }

    /// Column of the drag in progress
    pub fn active_drag(&self) -> Option<&str> {
        self.active_drag.as_deref()
    }

    pub fn drag_handle(&mut self, which: Bound, raw: f64) -> Result<(), PanelError> {
        self.dragged_slider()?.drag_handle(which, raw);
        Ok(())
    }

    pub fn drag_track(&mut self, delta_px: f32) -> Result<(), PanelError> {
        self.dragged_slider()?.drag_track(delta_px);
        Ok(())
    }

    /// Release the drag and commit the new window
    pub async fn end_drag(&mut self) -> Result<Option<CommitOutcome>, PanelError> {
        let column_id = self.active_drag.take().ok_or(PanelError::NoActiveDrag)?;
        let Some(model) = self.range_filter_mut(&column_id)?.end_drag() else {
            return Ok(None);
        };
        self.submit_window(&column_id, model).await.map(Some)
    }

    /// Abort the drag; nothing is committed
    pub fn cancel_drag(&mut self) -> Result<(), PanelError> {
        let column_id = self.active_drag.take().ok_or(PanelError::NoActiveDrag)?;
        self.range_filter_mut(&column_id)?.cancel_drag();
        debug!("Drag on '{}' cancelled", column_id);
        Ok(())
    }

    /// Begin a drag bound to a guard; dropping the guard without releasing
    /// it cancels the drag
    pub fn drag(&mut self, column_id: &str, kind: DragKind) -> Result<DragGesture<'_>, PanelError> {
        self.begin_drag(column_id, kind)?;
        Ok(DragGesture { panel: self })
    }

    pub fn begin_edit(&mut self, column_id: &str, which: Bound) -> Result<(), PanelError> {
        if self.active_drag.as_deref() == Some(column_id) {
            self.active_drag = None;
        }
        self.range_filter_mut(column_id)?.begin_edit(which);
        Ok(())
    }

    pub fn type_text(&mut self, column_id: &str, which: Bound, text: &str) -> Result<(), PanelError> {
        self.range_filter_mut(column_id)?.type_text(which, text);
        Ok(())
    }

    /// Apply typed text; valid text commits right away
    pub async fn edit_text(
        &mut self,
        column_id: &str,
        which: Bound,
        raw: &str,
    ) -> Result<Option<CommitOutcome>, PanelError> {
        let Some(model) = self.range_filter_mut(column_id)?.edit_text(which, raw) else {
            return Ok(None);
        };
        self.submit_window(column_id, model).await.map(Some)
    }

    pub fn end_edit(&mut self, column_id: &str, which: Bound) -> Result<(), PanelError> {
        self.range_filter_mut(column_id)?.end_edit(which);
        Ok(())
    }

    // Column filter

    pub fn toggle_column(&mut self, column_id: &str) -> Result<bool, PanelError> {
        Ok(self.column_filter_mut()?.toggle(column_id))
    }

    pub fn toggle_all_columns(&mut self, checked: bool) -> Result<(), PanelError> {
        self.column_filter_mut()?.toggle_all(checked);
        Ok(())
    }

    pub fn search_columns(&mut self, term: &str) -> Result<(), PanelError> {
        self.column_filter_mut()?.search(term);
        Ok(())
    }

    /// Show and hide columns according to the checked items
    pub fn apply_columns(&mut self) -> Result<(), PanelError> {
        let visibility = self.column_filter_mut()?.commit();
        self.bridge.set_column_visibility(&visibility)?;
        Ok(())
    }

    /// Show every column
    pub fn reset_columns(&mut self) -> Result<(), PanelError> {
        let visibility = self.column_filter_mut()?.reset();
        self.bridge.set_column_visibility(&visibility)?;
        Ok(())
    }

    // Layout and state

    /// Split `available_height` between the widgets.
    ///
    /// Range filters get a fixed slot and reserve a little more than that;
    /// set filters and the column filter share what is left equally.
    pub fn layout(&self, available_height: f32) -> PanelLayout {
        let ranges = self.controllers.values().filter(|c| c.as_range().is_some()).count();
        let shared = self.controllers.values().filter(|c| c.as_set().is_some()).count()
            + usize::from(self.column_filter.is_some());

        let remainder = (available_height - RANGE_RESERVED_HEIGHT * ranges as f32).max(0.0);
        let share = if shared > 0 { remainder / shared as f32 } else { 0.0 };

        let mut slots = Vec::with_capacity(self.controllers.len() + 1);
        for (id, controller) in &self.controllers {
            if controller.as_set().is_some() {
                slots.push((FilterSlot::Filter(id.clone()), share));
            }
        }
        if self.column_filter.is_some() {
            slots.push((FilterSlot::Columns, share));
        }
        for kind in [ColumnKind::Number, ColumnKind::Date] {
            for column in self.columns.iter().filter(|c| c.kind == kind) {
                slots.push((FilterSlot::Filter(column.id.clone()), RANGE_SLOT_HEIGHT));
            }
        }

        PanelLayout { slots }
    }

    /// Current view state of the grid, for persistence
    pub fn view_state(&self) -> GridViewState {
        self.grid().view_state()
    }

    /// Re-scan the domain of one filter
    pub fn refresh_column(&mut self, column_id: &str) {
        let Some(column) = self.columns.iter().find(|c| c.id == column_id) else {
            return;
        };
        let domain = ValueDomainScanner::scan(&self.bridge.grid().rows_without_filter(column_id), column);
        if let Some(controller) = self.controllers.get_mut(column_id) {
            controller.refresh(domain);
        }
    }

    /// Re-scan every filter
    pub fn refresh_all(&mut self) {
        let ids: Vec<String> = self.controllers.keys().cloned().collect();
        for id in ids {
            self.refresh_column(&id);
        }
        if let Some(column_filter) = &mut self.column_filter {
            column_filter.initialize(&self.bridge.grid().columns());
        }
    }

    async fn submit(&mut self, column_id: &str, model: Option<FilterModel>) -> CommitOutcome {
        let outcome = self.bridge.submit(column_id, model).await;
        for target in outcome.refresh_targets() {
            self.refresh_column(target);
        }
        outcome
    }

    /// Submit a slider window, rolling the slider back if the grid refuses it
    async fn submit_window(&mut self, column_id: &str, model: FilterModel) -> Result<CommitOutcome, PanelError> {
        let outcome = self.submit(column_id, Some(model)).await;
        let slider = self.range_filter_mut(column_id)?;
        match outcome {
            CommitOutcome::Failed(_) => slider.rollback(),
            _ => slider.mark_applied(),
        }
        Ok(outcome)
    }

    fn reconcile_from_grid(&mut self) {
        let grid = self.bridge.grid().clone();
        for (id, controller) in self.controllers.iter_mut() {
            controller.apply_model(grid.column_filter_model(id).as_ref());
        }
        self.refresh_all();
    }

    async fn apply_initial_filters(&mut self, filters: &[InitialSetFilter]) {
        for filter in filters {
            let Ok(controller) = self.set_filter_mut(&filter.column_id) else {
                warn!("Initial filter on '{}' ignored: no set filter", filter.column_id);
                continue;
            };

            let keep = |value: &str| !filter.exclude.iter().any(|e| e == value);
            let values: Vec<String> = if filter.include.is_empty() {
                controller
                    .items()
                    .iter()
                    .filter(|item| item.displayed && keep(item.value.as_str()))
                    .map(|item| item.value.clone())
                    .collect()
            } else {
                filter.include.iter().filter(|v| keep(v.as_str())).cloned().collect()
            };

            let model = FilterModel::set(values);
            debug!("Applying initial filter on '{}'", filter.column_id);
            let outcome = self.submit(&filter.column_id, Some(model.clone())).await;
            if matches!(outcome, CommitOutcome::Failed(_)) {
                continue;
            }
            if let Ok(controller) = self.set_filter_mut(&filter.column_id) {
                controller.apply_model(model.as_set());
            }
        }
    }

    fn set_filter_mut(&mut self, column_id: &str) -> Result<&mut SetFilterController, PanelError> {
        match self.controllers.get_mut(column_id) {
            Some(FilterController::Set(controller)) => Ok(controller),
            Some(FilterController::Range(_)) => Err(wrong_kind(column_id, "set")),
            None => Err(PanelError::UnknownFilter(column_id.to_string())),
        }
    }

    fn range_filter_mut(&mut self, column_id: &str) -> Result<&mut RangeSliderController, PanelError> {
        match self.controllers.get_mut(column_id) {
            Some(FilterController::Range(controller)) => Ok(controller),
            Some(FilterController::Set(_)) => Err(wrong_kind(column_id, "range")),
            None => Err(PanelError::UnknownFilter(column_id.to_string())),
        }
    }

    fn dragged_slider(&mut self) -> Result<&mut RangeSliderController, PanelError> {
        let column_id = self.active_drag.clone().ok_or(PanelError::NoActiveDrag)?;
        self.range_filter_mut(&column_id)
    }

    fn column_filter_mut(&mut self) -> Result<&mut ColumnVisibilityController, PanelError> {
        self.column_filter.as_mut().ok_or(PanelError::NoColumnFilter)
    }
}

fn wrong_kind(column_id: &str, expected: &'static str) -> PanelError {
    PanelError::WrongFilterKind {
        column: column_id.to_string(),
        expected,
    }
}

/// Drag in progress on one slider
pub struct DragGesture<'a> {
    panel: &'a mut PanelOrchestrator,
}

impl DragGesture<'_> {
    pub fn column_id(&self) -> Option<&str> {
        self.panel.active_drag()
    }

    pub fn handle(&mut self, which: Bound, raw: f64) -> Result<(), PanelError> {
        self.panel.drag_handle(which, raw)
    }

    pub fn track(&mut self, delta_px: f32) -> Result<(), PanelError> {
        self.panel.drag_track(delta_px)
    }

    /// End the gesture and commit
    pub async fn release(self) -> Result<Option<CommitOutcome>, PanelError> {
        self.panel.end_drag().await
    }
}

impl Drop for DragGesture<'_> {
    fn drop(&mut self) {
        if self.panel.active_drag.is_some() {
            let _ = self.panel.cancel_drag();
        }
    }
}
