//! Main application entry point

use std::collections::HashMap;

use anyhow::{Context as _, Result};
use eframe::egui::{self, Context};
use gf_core::events::ViewStateChanged;
use gf_core::{EventBus, KeyValueStore, MemoryStore, PersistenceLayer};
use gf_data::{DashboardConfig, GridApi};
use gf_filters::Dashboard;
use gf_ui::{apply_actions, apply_theme, tab_strip, EframeStore, FilterSidePanel, PendingWrites, Theme};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod demo;
mod grid_view;

/// Main application state
struct GridFilterApp {
    /// Configuration waiting for the first frame, when storage is reachable
    config: Option<DashboardConfig>,

    dashboard: Option<Dashboard>,

    /// Event bus shared with every panel
    events: EventBus,

    /// View state changes not yet written to storage
    pending: PendingWrites,

    /// Side panel per table key
    side_panels: HashMap<String, FilterSidePanel>,

    /// Used when eframe has no storage
    fallback_store: MemoryStore,

    /// Tokio runtime
    runtime: tokio::runtime::Runtime,
}

impl GridFilterApp {
    fn new(cc: &eframe::CreationContext<'_>, config: DashboardConfig, runtime: tokio::runtime::Runtime) -> Self {
        apply_theme(&cc.egui_ctx, &Theme::default());

        let events = EventBus::new();
        let pending = PendingWrites::subscribe(&events);

        Self {
            config: Some(config),
            dashboard: None,
            events,
            pending,
            side_panels: HashMap::new(),
            fallback_store: MemoryStore::new(),
            runtime,
        }
    }

    fn show<S: KeyValueStore>(&mut self, ctx: &Context, persistence: &mut PersistenceLayer<S>) {
        if self.dashboard.is_none() {
            if let Some(config) = self.config.take() {
                let dashboard = Dashboard::open(config, self.events.clone(), persistence);
                info!("Opened dashboard '{}' with {} tables", dashboard.key(), dashboard.tabs().len());
                self.dashboard = Some(dashboard);
            }
        }
        let Some(dashboard) = self.dashboard.as_mut() else {
            return;
        };

        let mut selected = None;
        egui::TopBottomPanel::top("tabs").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(dashboard.name());
                ui.separator();
                selected = tab_strip(ui, &dashboard.tab_names(), dashboard.active_index());
            });
        });
        if let Some(index) = selected {
            if let Err(e) = dashboard.select_tab(index) {
                warn!("Could not switch tab: {}", e);
            }
        }

        let runtime = self.runtime.handle().clone();
        let panel = runtime.block_on(dashboard.ensure_mounted(&*persistence));
        let key = panel.table_key().to_string();

        let side_panel = self
            .side_panels
            .entry(key.clone())
            .or_insert_with(|| FilterSidePanel::new(&key, persistence.panel_width(&key)));
        let actions = side_panel.show(ctx, panel, &self.events);
        apply_actions(panel, actions, &runtime);

        let grid = dashboard.active_tab().grid.clone();
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(column_id) = grid_view::grid_table(ui, &grid) {
                grid.cycle_sort(&column_id);
                self.events.publish(ViewStateChanged { table_key: key.clone() });
            }
        });

        if !self.pending.is_empty() {
            let tabs = dashboard.tabs();
            self.pending.flush(persistence, |table_key| {
                tabs.iter()
                    .find(|tab| tab.key == table_key)
                    .map(|tab| tab.grid.view_state())
            });
        }
    }
}

impl eframe::App for GridFilterApp {
    fn update(&mut self, ctx: &Context, frame: &mut eframe::Frame) {
        match frame.storage_mut() {
            Some(storage) => {
                let mut persistence = PersistenceLayer::new(EframeStore::new(storage));
                self.show(ctx, &mut persistence);
            }
            None => {
                let mut store = std::mem::take(&mut self.fallback_store);
                self.show(ctx, &mut PersistenceLayer::new(&mut store));
                self.fallback_store = store;
            }
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Some(dashboard) = &self.dashboard {
            let tabs = dashboard.tabs();
            let mut persistence = PersistenceLayer::new(EframeStore::new(storage));
            self.pending.flush(&mut persistence, |table_key| {
                tabs.iter()
                    .find(|tab| tab.key == table_key)
                    .map(|tab| tab.grid.view_state())
            });
        }
    }
}

fn load_config() -> Result<DashboardConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading dashboard from {}", path);
            DashboardConfig::from_path(&path).with_context(|| format!("Failed to load dashboard config {}", path))
        }
        None => {
            info!("No config given, starting the demo dashboard");
            Ok(demo::demo_config())
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config()?;
    let runtime = tokio::runtime::Runtime::new().context("Failed to start the async runtime")?;
    let title = if config.name.is_empty() {
        "Grid Filter".to_string()
    } else {
        config.name.clone()
    };

    info!("Starting {}", title);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Box::new(GridFilterApp::new(cc, config, runtime))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))?;

    Ok(())
}
