//! Resizable side panel holding the filters of one table

use egui::{vec2, Context, SidePanel};
use gf_core::events::PanelResized;
use gf_core::{EventBus, DEFAULT_PANEL_WIDTH};
use gf_filters::{FilterController, FilterSlot, PanelOrchestrator};

use crate::actions::FilterAction;
use crate::widget_utils::WidgetId;
use crate::widgets::{column_filter, range_slider, set_filter};

/// Side panel of one table; reports width changes on the event bus
pub struct FilterSidePanel {
    table_key: String,
    width: f32,
}

impl FilterSidePanel {
    pub fn new(table_key: impl Into<String>, width: f32) -> Self {
        Self {
            table_key: table_key.into(),
            width: if width.is_finite() && width > 0.0 { width } else { DEFAULT_PANEL_WIDTH },
        }
    }

    pub fn table_key(&self) -> &str {
        &self.table_key
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// Draw the panel; returns what the user did this frame
    pub fn show(&mut self, ctx: &Context, panel: &PanelOrchestrator, events: &EventBus) -> Vec<FilterAction> {
        let mut actions = Vec::new();
        let key = self.table_key.as_str();

        let response = SidePanel::right(WidgetId::new("filter_panel").with(key).id())
            .resizable(true)
            .default_width(self.width)
            .width_range(160.0..=640.0)
            .show(ctx, |ui| {
                let layout = panel.layout(ui.available_height());

                for (slot, height) in &layout.slots {
                    let height = *height;
                    ui.allocate_ui(vec2(ui.available_width(), height), |ui| match slot {
                        FilterSlot::Columns => {
                            if let Some(filter) = panel.column_filter() {
                                column_filter(ui, key, filter, height, &mut actions);
                            }
                        }
                        FilterSlot::Filter(column_id) => match panel.controller(column_id) {
                            Some(FilterController::Set(filter)) => {
                                let header = panel
                                    .columns()
                                    .iter()
                                    .find(|c| &c.id == column_id)
                                    .map(|c| c.header.as_str())
                                    .unwrap_or(column_id.as_str());
                                set_filter(ui, key, header, filter, height, &mut actions);
                            }
                            Some(FilterController::Range(slider)) => {
                                range_slider(ui, key, slider, &mut actions);
                            }
                            None => {}
                        },
                    });
                    ui.separator();
                }
            });

        let width = response.response.rect.width();
        if (width - self.width).abs() >= 1.0 {
            self.width = width;
            events.publish(PanelResized {
                table_key: self.table_key.clone(),
                width,
            });
        }

        actions
    }
}
