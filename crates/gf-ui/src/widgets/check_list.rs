//! Checkbox list widgets: set filters and the column filter

use egui::{Checkbox, RichText, ScrollArea, TextEdit, Ui};
use gf_filters::{CheckItem, ColumnVisibilityController, SetFilterController};

use crate::actions::FilterAction;
use crate::theme;
use crate::widget_utils::WidgetId;

/// Height taken by the search box, the "(All)" row and the buttons
const CHROME_HEIGHT: f32 = 96.0;

#[derive(Debug, Default)]
struct CheckListResponse {
    toggled: Option<String>,
    toggle_all: Option<bool>,
    search: Option<String>,
    apply: bool,
    reset: bool,
}

struct CheckListView<'a> {
    id: WidgetId,
    hint: String,
    items: Vec<&'a CheckItem>,
    search_term: &'a str,
    all_checked: bool,
}

fn check_list(ui: &mut Ui, view: CheckListView<'_>, height: f32) -> CheckListResponse {
    let mut response = CheckListResponse::default();

    let mut term = view.search_term.to_string();
    let search = ui.add(
        TextEdit::singleline(&mut term)
            .id(view.id.clone().with("search").id())
            .hint_text(view.hint)
            .desired_width(f32::INFINITY),
    );
    if search.changed() {
        response.search = Some(term);
    }

    let mut all = view.all_checked;
    if ui.checkbox(&mut all, "(All)").changed() {
        response.toggle_all = Some(all);
    }

    ScrollArea::vertical()
        .id_source(view.id.clone().with("items").build())
        .max_height((height - CHROME_HEIGHT).max(40.0))
        .auto_shrink([false, true])
        .show(ui, |ui| {
            for item in &view.items {
                let mut checked = item.checked;
                let label = if item.displayed {
                    RichText::new(&item.label)
                } else {
                    RichText::new(&item.label).color(theme::muted_text(ui.visuals()))
                };
                if ui.add(Checkbox::new(&mut checked, label)).changed() {
                    response.toggled = Some(item.value.clone());
                }
            }
        });

    ui.horizontal(|ui| {
        response.reset = ui.button("Reset").clicked();
        response.apply = ui.button("Apply").clicked();
    });

    response
}

/// Draw a set filter and collect what the user did with it
pub fn set_filter(
    ui: &mut Ui,
    table_key: &str,
    header: &str,
    filter: &SetFilterController,
    height: f32,
    actions: &mut Vec<FilterAction>,
) {
    let column = filter.column_id().to_string();
    ui.label(RichText::new(header).strong());

    let view = CheckListView {
        id: WidgetId::new("set").with(table_key).with(&column),
        hint: format!("Search for {}...", header),
        items: filter.visible_items(),
        search_term: filter.search_term(),
        all_checked: filter.all_checked(),
    };
    let response = check_list(ui, view, height);

    if let Some(term) = response.search {
        actions.push(FilterAction::Search {
            column: column.clone(),
            term,
        });
    }
    if let Some(checked) = response.toggle_all {
        actions.push(FilterAction::ToggleAll {
            column: column.clone(),
            checked,
        });
    }
    if let Some(value) = response.toggled {
        actions.push(FilterAction::Toggle {
            column: column.clone(),
            value,
        });
    }
    if response.reset {
        actions.push(FilterAction::Reset { column });
    } else if response.apply {
        actions.push(FilterAction::Apply { column });
    }
}

/// Draw the column visibility filter
pub fn column_filter(
    ui: &mut Ui,
    table_key: &str,
    filter: &ColumnVisibilityController,
    height: f32,
    actions: &mut Vec<FilterAction>,
) {
    ui.label(RichText::new("Columns").strong());

    let view = CheckListView {
        id: WidgetId::new("columns").with(table_key),
        hint: "Search for columns...".to_string(),
        items: filter.visible_items(),
        search_term: filter.search_term(),
        all_checked: filter.all_checked(),
    };
    let response = check_list(ui, view, height);

    if let Some(term) = response.search {
        actions.push(FilterAction::SearchColumns { term });
    }
    if let Some(checked) = response.toggle_all {
        actions.push(FilterAction::ToggleAllColumns { checked });
    }
    if let Some(column) = response.toggled {
        actions.push(FilterAction::ToggleColumn { column });
    }
    if response.reset {
        actions.push(FilterAction::ResetColumns);
    } else if response.apply {
        actions.push(FilterAction::ApplyColumns);
    }
}
