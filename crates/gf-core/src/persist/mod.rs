//! Per-table view state persistence
//!
//! State lives in a flat string key → string value store (eframe storage in
//! the app, [`MemoryStore`] in tests). Every table owns three keys derived
//! from its stable table key:
//!
//! - `"<key>"`: grid view state as JSON (sort, column visibility, filter model)
//! - `"<key>width"`: side panel width in pixels
//! - `"<key>tab"`: active tab index
//!
//! Nothing here ever fails: unreadable values are logged and replaced by
//! defaults.

use ahash::AHashMap;
use tracing::{debug, warn};

use crate::model::GridViewState;

/// Side panel width used when nothing (valid) was persisted
pub const DEFAULT_PANEL_WIDTH: f32 = 223.0;

const WIDTH_SUFFIX: &str = "width";
const TAB_SUFFIX: &str = "tab";

/// Flat string storage, shaped like `eframe::Storage`
pub trait KeyValueStore {
    fn get_string(&self, key: &str) -> Option<String>;

    fn set_string(&mut self, key: &str, value: String);

    fn flush(&mut self) {}
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get_string(&self, key: &str) -> Option<String> {
        (**self).get_string(key)
    }

    fn set_string(&mut self, key: &str, value: String) {
        (**self).set_string(key, value)
    }

    fn flush(&mut self) {
        (**self).flush()
    }
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: AHashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_string(&self, key: &str) -> Option<String> {
        self.data.get(key).cloned()
    }

    fn set_string(&mut self, key: &str, value: String) {
        self.data.insert(key.to_string(), value);
    }
}

/// View state of one table.
///
/// Also used as a patch for [`PersistenceLayer::save`]: only the fields that
/// are `Some` get written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedViewState {
    pub active_tab_index: Option<usize>,
    pub panel_width_px: Option<f32>,
    pub grid_view_state: Option<GridViewState>,
}

/// Partial state written by [`PersistenceLayer::save`]
pub type ViewStatePatch = PersistedViewState;

impl PersistedViewState {
    pub fn with_active_tab(mut self, index: usize) -> Self {
        self.active_tab_index = Some(index);
        self
    }

    pub fn with_panel_width(mut self, width: f32) -> Self {
        self.panel_width_px = Some(width);
        self
    }

    pub fn with_grid_view_state(mut self, state: GridViewState) -> Self {
        self.grid_view_state = Some(state);
        self
    }

    /// Panel width or the default
    pub fn panel_width(&self) -> f32 {
        self.panel_width_px.unwrap_or(DEFAULT_PANEL_WIDTH)
    }

    /// Active tab, or 0 when absent or out of range
    pub fn active_tab(&self, tab_count: usize) -> usize {
        match self.active_tab_index {
            Some(index) if index < tab_count => index,
            _ => 0,
        }
    }

    fn is_empty(&self) -> bool {
        self.active_tab_index.is_none()
            && self.panel_width_px.is_none()
            && self.grid_view_state.is_none()
    }
}

/// Reads and writes [`PersistedViewState`] in a key/value store
pub struct PersistenceLayer<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> PersistenceLayer<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Write the fields present in `patch`, leaving the others untouched
    pub fn save(&mut self, table_key: &str, patch: &ViewStatePatch) {
        if let Some(index) = patch.active_tab_index {
            self.store.set_string(&tab_key(table_key), index.to_string());
        }

        if let Some(width) = patch.panel_width_px {
            if width.is_finite() && width > 0.0 {
                self.store.set_string(&width_key(table_key), format!("{}", width.round() as i64));
            } else {
                warn!("Ignoring invalid panel width {} for '{}'", width, table_key);
            }
        }

        if let Some(state) = &patch.grid_view_state {
            match serde_json::to_string(state) {
                Ok(json) => self.store.set_string(table_key, json),
                Err(e) => warn!("Failed to serialize view state for '{}': {}", table_key, e),
            }
        }

        self.store.flush();
        debug!("Persisted view state for '{}'", table_key);
    }

    /// Read everything stored for a table; `None` if nothing usable exists
    pub fn load(&self, table_key: &str) -> Option<PersistedViewState> {
        let state = PersistedViewState {
            active_tab_index: self.read_tab(table_key),
            panel_width_px: self.read_width(table_key),
            grid_view_state: self.read_grid_view_state(table_key),
        };

        if state.is_empty() {
            None
        } else {
            Some(state)
        }
    }

    /// Persisted panel width, or [`DEFAULT_PANEL_WIDTH`]
    pub fn panel_width(&self, table_key: &str) -> f32 {
        self.read_width(table_key).unwrap_or(DEFAULT_PANEL_WIDTH)
    }

    /// Persisted active tab, or 0 when absent, corrupt or out of range
    pub fn active_tab(&self, table_key: &str, tab_count: usize) -> usize {
        PersistedViewState {
            active_tab_index: self.read_tab(table_key),
            ..Default::default()
        }
        .active_tab(tab_count)
    }

    /// Persisted grid view state, if present and well-formed
    pub fn grid_view_state(&self, table_key: &str) -> Option<GridViewState> {
        self.read_grid_view_state(table_key)
    }

    fn read_width(&self, table_key: &str) -> Option<f32> {
        let raw = self.store.get_string(&width_key(table_key))?;
        match raw.trim().parse::<f32>() {
            Ok(width) if width.is_finite() && width > 0.0 => Some(width),
            _ => {
                warn!("Corrupt panel width '{}' for '{}', using default", raw, table_key);
                None
            }
        }
    }

    fn read_tab(&self, table_key: &str) -> Option<usize> {
        let raw = self.store.get_string(&tab_key(table_key))?;
        match raw.trim().parse::<usize>() {
            Ok(index) => Some(index),
            Err(_) => {
                warn!("Corrupt tab index '{}' for '{}', using first tab", raw, table_key);
                None
            }
        }
    }

    fn read_grid_view_state(&self, table_key: &str) -> Option<GridViewState> {
        let raw = self.store.get_string(table_key)?;
        match serde_json::from_str::<GridViewState>(&raw) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!("Discarding unreadable view state for '{}': {}", table_key, e);
                None
            }
        }
    }
}

fn width_key(table_key: &str) -> String {
    format!("{}{}", table_key, WIDTH_SUFFIX)
}

fn tab_key(table_key: &str) -> String {
    format!("{}{}", table_key, TAB_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FilterModel;

    #[test]
    fn test_width_round_trip_and_corruption() {
        let mut layer = PersistenceLayer::new(MemoryStore::new());
        layer.save("orders", &ViewStatePatch::default().with_panel_width(312.0));
        assert_eq!(layer.store().get_string("orderswidth").as_deref(), Some("312"));
        assert_eq!(layer.panel_width("orders"), 312.0);

        let mut store = MemoryStore::new();
        store.set_string("orderswidth", "abc".to_string());
        let layer = PersistenceLayer::new(store);
        assert_eq!(layer.panel_width("orders"), DEFAULT_PANEL_WIDTH);
    }

    #[test]
    fn test_absent_state_loads_as_none() {
        let layer = PersistenceLayer::new(MemoryStore::new());
        assert!(layer.load("missing").is_none());
        assert_eq!(layer.active_tab("missing", 3), 0);
    }

    #[test]
    fn test_save_merges_fields() {
        let mut layer = PersistenceLayer::new(MemoryStore::new());
        layer.save("t", &ViewStatePatch::default().with_active_tab(2));
        layer.save("t", &ViewStatePatch::default().with_panel_width(400.0));

        let state = layer.load("t").unwrap();
        assert_eq!(state.active_tab_index, Some(2));
        assert_eq!(state.panel_width_px, Some(400.0));
        assert!(state.grid_view_state.is_none());
    }

    #[test]
    fn test_grid_view_state_round_trip() {
        let mut view = GridViewState::default();
        view.filter_model.insert("status".to_string(), FilterModel::set(["A"]));
        view.column_visibility.insert("price".to_string(), false);

        let mut layer = PersistenceLayer::new(MemoryStore::new());
        layer.save("t", &ViewStatePatch::default().with_grid_view_state(view.clone()));
        assert_eq!(layer.grid_view_state("t"), Some(view));
    }

    #[test]
    fn test_incompatible_blob_is_treated_as_absent() {
        let mut store = MemoryStore::new();
        store.set_string("t", "{\"filterModel\": [1, 2, 3]}".to_string());
        store.set_string("ttab", "seven".to_string());
        let layer = PersistenceLayer::new(store);

        assert!(layer.grid_view_state("t").is_none());
        assert!(layer.load("t").is_none());
    }

    #[test]
    fn test_out_of_range_tab_falls_back() {
        let mut layer = PersistenceLayer::new(MemoryStore::new());
        layer.save("d", &ViewStatePatch::default().with_active_tab(5));
        assert_eq!(layer.active_tab("d", 2), 0);
        assert_eq!(layer.active_tab("d", 6), 5);
    }
}
