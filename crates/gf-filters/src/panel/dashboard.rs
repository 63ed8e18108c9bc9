//! Several tables under tabs

use std::sync::Arc;

use gf_core::events::TabChanged;
use gf_core::{EventBus, FilterRegistry, KeyValueStore, PersistenceLayer};
use gf_data::{DashboardConfig, InMemoryGrid, TableConfig};
use tracing::debug;

use super::PanelOrchestrator;
use crate::PanelError;

/// One table of a dashboard
pub struct DashboardTab {
    pub key: String,
    pub name: String,
    pub grid: Arc<InMemoryGrid>,
    panel: Option<PanelOrchestrator>,
}

impl DashboardTab {
    pub fn panel(&self) -> Option<&PanelOrchestrator> {
        self.panel.as_ref()
    }

    pub fn panel_mut(&mut self) -> Option<&mut PanelOrchestrator> {
        self.panel.as_mut()
    }
}

/// Tables of one dashboard; each panel is mounted on first display
pub struct Dashboard {
    config: DashboardConfig,
    registry: FilterRegistry,
    events: EventBus,
    tabs: Vec<DashboardTab>,
    active: usize,
}

impl Dashboard {
    pub fn new(config: DashboardConfig, events: EventBus) -> Self {
        let tabs = config
            .tables
            .iter()
            .enumerate()
            .map(|(index, table)| DashboardTab {
                key: config.table_key(index),
                name: table.name.clone(),
                grid: Arc::new(InMemoryGrid::from_table(table)),
                panel: None,
            })
            .collect();

        Self {
            config,
            registry: FilterRegistry::new(),
            events,
            tabs,
            active: 0,
        }
    }

    /// Dashboard with the persisted active tab selected
    pub fn open<S: KeyValueStore>(
        config: DashboardConfig,
        events: EventBus,
        persistence: &PersistenceLayer<S>,
    ) -> Self {
        let mut dashboard = Self::new(config, events);
        dashboard.active = persistence.active_tab(&dashboard.config.key, dashboard.tabs.len());
        dashboard
    }

    /// Persistence key of the dashboard (holds the active tab)
    pub fn key(&self) -> &str {
        &self.config.key
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn tab_names(&self) -> Vec<&str> {
        self.tabs.iter().map(|tab| tab.name.as_str()).collect()
    }

    pub fn tabs(&self) -> &[DashboardTab] {
        &self.tabs
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_tab(&self) -> &DashboardTab {
        &self.tabs[self.active]
    }

    pub fn active_tab_mut(&mut self) -> &mut DashboardTab {
        &mut self.tabs[self.active]
    }

    pub fn table(&self, index: usize) -> Option<&TableConfig> {
        self.config.tables.get(index)
    }

    /// Switch tabs; the change is published for persistence
    pub fn select_tab(&mut self, index: usize) -> Result<(), PanelError> {
        if index >= self.tabs.len() {
            return Err(PanelError::TabOutOfRange(index));
        }
        if index != self.active {
            self.active = index;
            debug!("Dashboard '{}' switched to tab {}", self.config.key, index);
            self.events.publish(TabChanged {
                dashboard_key: self.config.key.clone(),
                index,
            });
        }
        Ok(())
    }

    /// Panel of the active tab, mounting it with its persisted view state
    /// the first time
    pub async fn ensure_mounted<S: KeyValueStore>(
        &mut self,
        persistence: &PersistenceLayer<S>,
    ) -> &mut PanelOrchestrator {
        let index = self.active;
        let tab = &mut self.tabs[index];

        let panel = match tab.panel.take() {
            Some(panel) => panel,
            None => {
                let restored = persistence.grid_view_state(&tab.key);
                PanelOrchestrator::mount(
                    tab.key.clone(),
                    &self.config.tables[index],
                    tab.grid.clone(),
                    self.registry.clone(),
                    self.events.clone(),
                    restored,
                )
                .await
            }
        };

        tab.panel.insert(panel)
    }
}
