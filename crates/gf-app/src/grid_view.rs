//! Read-only table of the rows that pass the current filters

use egui::{Align, Layout, Ui};
use egui_extras::{Column, TableBuilder};
use gf_core::SortDirection;
use gf_data::value::cell_text;
use gf_data::InMemoryGrid;

/// Draw the displayed rows of `grid`; returns the column whose header was clicked
pub fn grid_table(ui: &mut Ui, grid: &InMemoryGrid) -> Option<String> {
    let columns = grid.visible_columns();
    let rows = grid.displayed_rows();
    let sort = grid.sort();
    let text_height = egui::TextStyle::Body.resolve(ui.style()).size * 1.5;

    ui.label(format!("{} of {} rows", rows.len(), grid.row_count()));
    ui.separator();

    if columns.is_empty() {
        ui.weak("All columns are hidden");
        return None;
    }

    let mut clicked = None;
    let mut builder = TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .min_scrolled_height(0.0)
        .vscroll(true);

    for _ in 0..columns.len() {
        builder = builder.column(Column::initial(140.0).at_least(60.0).clip(true));
    }

    builder
        .header(20.0, |mut header| {
            for column in &columns {
                header.col(|ui| {
                    let marker = match sort.iter().find(|s| s.col_id == column.id).map(|s| s.sort) {
                        Some(SortDirection::Asc) => " ^",
                        Some(SortDirection::Desc) => " v",
                        None => "",
                    };
                    let title = egui::RichText::new(format!("{}{}", column.header, marker)).strong();
                    if ui.add(egui::Label::new(title).sense(egui::Sense::click())).clicked() {
                        clicked = Some(column.id.clone());
                    }
                });
            }
        })
        .body(|body| {
            body.rows(text_height, rows.len(), |row_index, mut row| {
                let node = &rows[row_index];
                for column in &columns {
                    row.col(|ui| {
                        ui.label(node.value(&column.id).map(cell_text).unwrap_or_default());
                    });
                }
            });
        });

    clicked
}
