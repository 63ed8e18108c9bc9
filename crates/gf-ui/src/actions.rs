//! User intents reported by the filter widgets

use gf_filters::{Bound, CommitOutcome, DragKind, PanelError, PanelOrchestrator};
use tokio::runtime::Handle;
use tracing::warn;

/// Something the user did in the filter panel
#[derive(Debug, Clone, PartialEq)]
pub enum FilterAction {
    Toggle { column: String, value: String },
    ToggleAll { column: String, checked: bool },
    Search { column: String, term: String },
    Apply { column: String },
    Reset { column: String },

    BeginDrag { column: String, kind: DragKind },
    DragHandle { which: Bound, raw: f64 },
    DragTrack { delta_px: f32 },
    EndDrag,
    CancelDrag,

    BeginEdit { column: String, which: Bound },
    TypeText { column: String, which: Bound, text: String },
    CommitText { column: String, which: Bound, text: String },
    EndEdit { column: String, which: Bound },

    ToggleColumn { column: String },
    ToggleAllColumns { checked: bool },
    SearchColumns { term: String },
    ApplyColumns,
    ResetColumns,
}

/// Run one action against the panel, blocking on commits
pub fn apply_action(
    panel: &mut PanelOrchestrator,
    action: FilterAction,
    runtime: &Handle,
) -> Result<Option<CommitOutcome>, PanelError> {
    let outcome = match action {
        FilterAction::Toggle { column, value } => {
            panel.toggle(&column, &value)?;
            None
        }
        FilterAction::ToggleAll { column, checked } => {
            panel.toggle_all(&column, checked)?;
            None
        }
        FilterAction::Search { column, term } => {
            panel.search(&column, &term)?;
            None
        }
        FilterAction::Apply { column } => Some(runtime.block_on(panel.commit_set(&column))?),
        FilterAction::Reset { column } => Some(runtime.block_on(panel.reset(&column))?),

        FilterAction::BeginDrag { column, kind } => {
            panel.begin_drag(&column, kind)?;
            None
        }
        FilterAction::DragHandle { which, raw } => {
            panel.drag_handle(which, raw)?;
            None
        }
        FilterAction::DragTrack { delta_px } => {
            panel.drag_track(delta_px)?;
            None
        }
        FilterAction::EndDrag => runtime.block_on(panel.end_drag())?,
        FilterAction::CancelDrag => {
            panel.cancel_drag()?;
            None
        }

        FilterAction::BeginEdit { column, which } => {
            panel.begin_edit(&column, which)?;
            None
        }
        FilterAction::TypeText { column, which, text } => {
            panel.type_text(&column, which, &text)?;
            None
        }
        FilterAction::CommitText { column, which, text } => {
            runtime.block_on(panel.edit_text(&column, which, &text))?
        }
        FilterAction::EndEdit { column, which } => {
            panel.end_edit(&column, which)?;
            None
        }

        FilterAction::ToggleColumn { column } => {
            panel.toggle_column(&column)?;
            None
        }
        FilterAction::ToggleAllColumns { checked } => {
            panel.toggle_all_columns(checked)?;
            None
        }
        FilterAction::SearchColumns { term } => {
            panel.search_columns(&term)?;
            None
        }
        FilterAction::ApplyColumns => {
            panel.apply_columns()?;
            None
        }
        FilterAction::ResetColumns => {
            panel.reset_columns()?;
            None
        }
    };

    if let Some(CommitOutcome::Failed(error)) = &outcome {
        warn!("Filter change on '{}' was not applied: {}", panel.table_key(), error);
    }
    Ok(outcome)
}

/// Run the actions of one frame in order; errors are logged and skipped
pub fn apply_actions(panel: &mut PanelOrchestrator, actions: Vec<FilterAction>, runtime: &Handle) {
    for action in actions {
        if let Err(e) = apply_action(panel, action, runtime) {
            warn!("Filter action on '{}' failed: {}", panel.table_key(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use gf_core::{EventBus, FilterModel, FilterRegistry};
    use gf_data::{DashboardConfig, GridApi, InMemoryGrid};

    const CONFIG: &str = r#"{
        "uuidKey": "k",
        "tables": [ { "name": "t", "columnDefs": [
            { "fieldName": "kind", "filter": "text" },
            { "fieldName": "size", "filter": "number" }
        ], "rowData": [
            { "kind": "a", "size": 1 }, { "kind": "b", "size": 2 }, { "kind": "c", "size": 3 }
        ] } ]
    }"#;

    #[test]
    fn test_actions_drive_the_panel() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let table = DashboardConfig::from_json_str(CONFIG).unwrap().tables.remove(0);
        let grid = Arc::new(InMemoryGrid::from_table(&table));
        let mut panel = runtime.block_on(PanelOrchestrator::mount(
            "k-0",
            &table,
            grid.clone(),
            FilterRegistry::new(),
            EventBus::new(),
            None,
        ));
        let handle = runtime.handle();

        let toggle = FilterAction::Toggle {
            column: "kind".to_string(),
            value: "b".to_string(),
        };
        assert_eq!(apply_action(&mut panel, toggle, handle), Ok(None));

        let outcome = apply_action(&mut panel, FilterAction::Apply { column: "kind".to_string() }, handle)
            .unwrap()
            .unwrap();
        assert!(outcome.is_applied());
        assert_eq!(grid.column_filter_model("kind"), Some(FilterModel::set(["a", "c"])));

        let begin = FilterAction::BeginDrag {
            column: "size".to_string(),
            kind: DragKind::Handle(Bound::Hi),
        };
        apply_action(&mut panel, begin, handle).unwrap();
        apply_action(&mut panel, FilterAction::DragHandle { which: Bound::Hi, raw: 1.5 }, handle).unwrap();
        apply_action(&mut panel, FilterAction::EndDrag, handle).unwrap();
        assert_eq!(grid.displayed_rows().len(), 1);

        let stray = apply_action(&mut panel, FilterAction::EndDrag, handle);
        assert_eq!(stray, Err(PanelError::NoActiveDrag));
    }

    #[test]
    fn test_every_typed_value_commits() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let table = DashboardConfig::from_json_str(CONFIG).unwrap().tables.remove(0);
        let grid = Arc::new(InMemoryGrid::from_table(&table));
        let mut panel = runtime.block_on(PanelOrchestrator::mount(
            "k-0",
            &table,
            grid.clone(),
            FilterRegistry::new(),
            EventBus::new(),
            None,
        ));
        let handle = runtime.handle();
        let size = || "size".to_string();

        apply_action(&mut panel, FilterAction::BeginEdit { column: size(), which: Bound::Hi }, handle).unwrap();
        for (typed, hi) in [("2", 2.0), ("2.5", 2.5), ("1.5", 1.5)] {
            let type_text = FilterAction::TypeText {
                column: size(),
                which: Bound::Hi,
                text: typed.to_string(),
            };
            apply_action(&mut panel, type_text, handle).unwrap();

            let commit = FilterAction::CommitText {
                column: size(),
                which: Bound::Hi,
                text: typed.to_string(),
            };
            let outcome = apply_action(&mut panel, commit, handle).unwrap();
            assert!(outcome.is_some_and(|o| o.is_applied()));
            assert_eq!(grid.column_filter_model("size"), Some(FilterModel::range(1.0, hi)));
        }

        apply_action(&mut panel, FilterAction::EndEdit { column: size(), which: Bound::Hi }, handle).unwrap();
        assert_eq!(grid.displayed_rows().len(), 1);
        assert_eq!(panel.bridge().generation(), 3);
    }
}
