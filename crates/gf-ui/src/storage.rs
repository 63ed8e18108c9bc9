//! Persisting view state through eframe
//!
//! eframe's storage is only reachable from inside a frame, while view state
//! changes are published on the event bus whenever they happen. Events are
//! recorded in [`PendingWrites`] and written out on the next frame.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use gf_core::events::{PanelResized, TabChanged, ViewStateChanged};
use gf_core::{handler_from_fn, EventBus, GridViewState, KeyValueStore, PersistenceLayer, ViewStatePatch};
use parking_lot::Mutex;

/// [`KeyValueStore`] over eframe's app storage
pub struct EframeStore<'a> {
    storage: &'a mut dyn eframe::Storage,
}

impl<'a> EframeStore<'a> {
    pub fn new(storage: &'a mut dyn eframe::Storage) -> Self {
        Self { storage }
    }
}

impl KeyValueStore for EframeStore<'_> {
    fn get_string(&self, key: &str) -> Option<String> {
        self.storage.get_string(key)
    }

    fn set_string(&mut self, key: &str, value: String) {
        self.storage.set_string(key, value);
    }

    fn flush(&mut self) {
        self.storage.flush();
    }
}

#[derive(Debug, Default)]
struct Pending {
    view_states: BTreeSet<String>,
    widths: BTreeMap<String, f32>,
    tabs: BTreeMap<String, usize>,
}

/// View state changes waiting to be persisted
#[derive(Clone, Default)]
pub struct PendingWrites {
    pending: Arc<Mutex<Pending>>,
}

impl PendingWrites {
    /// Record view state, panel width and tab changes published on `events`
    pub fn subscribe(events: &EventBus) -> Self {
        let writes = Self::default();

        let pending = writes.pending.clone();
        events.subscribe::<ViewStateChanged>(handler_from_fn(move |event| {
            if let Some(changed) = event.downcast_ref::<ViewStateChanged>() {
                pending.lock().view_states.insert(changed.table_key.clone());
            }
        }));

        let pending = writes.pending.clone();
        events.subscribe::<PanelResized>(handler_from_fn(move |event| {
            if let Some(resized) = event.downcast_ref::<PanelResized>() {
                pending.lock().widths.insert(resized.table_key.clone(), resized.width);
            }
        }));

        let pending = writes.pending.clone();
        events.subscribe::<TabChanged>(handler_from_fn(move |event| {
            if let Some(changed) = event.downcast_ref::<TabChanged>() {
                pending.lock().tabs.insert(changed.dashboard_key.clone(), changed.index);
            }
        }));

        writes
    }

    pub fn is_empty(&self) -> bool {
        let pending = self.pending.lock();
        pending.view_states.is_empty() && pending.widths.is_empty() && pending.tabs.is_empty()
    }

    /// Write everything recorded so far. `view_state` looks up the current
    /// grid view state of a table key.
    pub fn flush<S: KeyValueStore>(
        &self,
        persistence: &mut PersistenceLayer<S>,
        view_state: impl Fn(&str) -> Option<GridViewState>,
    ) {
        let pending = std::mem::take(&mut *self.pending.lock());

        for (key, index) in pending.tabs {
            persistence.save(&key, &ViewStatePatch::default().with_active_tab(index));
        }
        for (key, width) in pending.widths {
            persistence.save(&key, &ViewStatePatch::default().with_panel_width(width));
        }
        for key in pending.view_states {
            if let Some(state) = view_state(&key) {
                persistence.save(&key, &ViewStatePatch::default().with_grid_view_state(state));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gf_core::{FilterModel, MemoryStore};

    #[test]
    fn test_events_are_written_on_flush() {
        let events = EventBus::new();
        let writes = PendingWrites::subscribe(&events);
        assert!(writes.is_empty());

        events.publish(PanelResized {
            table_key: "t".to_string(),
            width: 311.6,
        });
        events.publish(TabChanged {
            dashboard_key: "d".to_string(),
            index: 2,
        });
        events.publish(ViewStateChanged {
            table_key: "t".to_string(),
        });
        assert!(!writes.is_empty());

        let mut state = GridViewState::default();
        state.filter_model.insert("c".to_string(), FilterModel::set(["x"]));

        let mut persistence = PersistenceLayer::new(MemoryStore::new());
        writes.flush(&mut persistence, |key| (key == "t").then(|| state.clone()));

        assert!(writes.is_empty());
        assert_eq!(persistence.store().get_string("twidth"), Some("312".to_string()));
        assert_eq!(persistence.store().get_string("dtab"), Some("2".to_string()));
        assert_eq!(persistence.grid_view_state("t"), Some(state));
    }
}
