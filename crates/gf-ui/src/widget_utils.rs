//! Widget ID helpers
//!
//! Every table gets its own filter panel, so widget IDs are built from the
//! table key and the column id to keep them apart across tabs.

use egui::Id;
use std::fmt::Display;

/// Widget ID builder joining its components with `_`
#[derive(Debug, Clone)]
pub struct WidgetId {
    components: Vec<String>,
}

impl WidgetId {
    pub fn new(base: impl Display) -> Self {
        Self {
            components: vec![base.to_string()],
        }
    }

    /// Append a component
    pub fn with(mut self, component: impl Display) -> Self {
        self.components.push(component.to_string());
        self
    }

    pub fn build(&self) -> String {
        self.components.join("_")
    }

    /// egui ID of this widget
    pub fn id(&self) -> Id {
        Id::new(self.build())
    }
}
