//! Tab strip of a dashboard

use egui::Ui;

/// Draw one selectable label per table; returns the clicked index
pub fn tab_strip(ui: &mut Ui, names: &[&str], active: usize) -> Option<usize> {
    // A single table needs no tabs
    if names.len() < 2 {
        return None;
    }

    let mut clicked = None;
    ui.horizontal(|ui| {
        for (index, name) in names.iter().enumerate() {
            if ui.selectable_label(index == active, *name).clicked() && index != active {
                clicked = Some(index);
            }
        }
    });
    clicked
}
