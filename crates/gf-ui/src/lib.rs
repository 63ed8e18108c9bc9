//! egui front end of the grid filter panel
//!
//! Widgets render controller state and report what the user did as
//! [`FilterAction`]s; the side panel runs those against the orchestrator.

pub mod actions;
pub mod side_panel;
pub mod storage;
pub mod tabs;
pub mod theme;
pub mod widget_utils;
pub mod widgets;

/// Re-export commonly used types
pub use actions::{apply_action, apply_actions, FilterAction};
pub use side_panel::FilterSidePanel;
pub use storage::{EframeStore, PendingWrites};
pub use tabs::tab_strip;
pub use theme::{apply_theme, Theme};
pub use widget_utils::WidgetId;
