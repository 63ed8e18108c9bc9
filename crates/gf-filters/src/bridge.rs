//! Filter model bridge
//!
//! Pushes committed filter models into the grid. Commits are sequenced per
//! column: while one is in flight, newer requests wait in a single slot and
//! only the newest of them is submitted once the grid is done. A stale model
//! is never applied after a newer one.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ahash::AHashMap;
use gf_core::events::{CommitFailed, FilterCommitted, FilterReset, ViewStateChanged};
use gf_core::{EventBus, FilterModel, FilterRegistry, FilterSyncSettings, GridError};
use gf_data::GridApi;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

/// Result of a [`FilterModelBridge::submit`] call
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// The grid applied the newest model; `refresh` names the other filters
    /// of the table that must re-scan their domain
    Applied { generation: u64, refresh: Vec<String> },
    /// Another commit on the column is in flight and will submit this model
    Queued,
    /// The grid refused the model; its previous state stays authoritative
    Failed(GridError),
}

impl CommitOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CommitOutcome::Applied { .. })
    }

    /// Columns to refresh; empty unless applied
    pub fn refresh_targets(&self) -> &[String] {
        match self {
            CommitOutcome::Applied { refresh, .. } => refresh,
            _ => &[],
        }
    }
}

#[derive(Debug, Default)]
struct CommitSlot {
    in_flight: bool,
    queued: Option<Option<FilterModel>>,
}

/// Holds a column's in-flight mark for the lifetime of one submit
struct InFlight<'a> {
    slots: &'a Mutex<AHashMap<String, CommitSlot>>,
    column_id: &'a str,
    released: bool,
}

impl InFlight<'_> {
    /// Take the queued model, releasing the column when there is none
    fn take_queued(&mut self) -> Option<Option<FilterModel>> {
        let mut slots = self.slots.lock();
        let slot = slots.entry(self.column_id.to_string()).or_default();
        let queued = slot.queued.take();
        if queued.is_none() {
            slot.in_flight = false;
            self.released = true;
        }
        queued
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        debug!("Commit on '{}' dropped before the grid answered", self.column_id);
        if let Some(slot) = self.slots.lock().get_mut(self.column_id) {
            slot.in_flight = false;
        }
    }
}

/// Submits filter models of one table to its grid
pub struct FilterModelBridge {
    table_key: String,
    grid: Arc<dyn GridApi>,
    registry: FilterRegistry,
    events: EventBus,
    slots: Mutex<AHashMap<String, CommitSlot>>,
    generation: AtomicU64,
}

impl FilterModelBridge {
    pub fn new(
        table_key: impl Into<String>,
        grid: Arc<dyn GridApi>,
        registry: FilterRegistry,
        events: EventBus,
    ) -> Self {
        Self {
            table_key: table_key.into(),
            grid,
            registry,
            events,
            slots: Mutex::new(AHashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn table_key(&self) -> &str {
        &self.table_key
    }

    pub fn grid(&self) -> &Arc<dyn GridApi> {
        &self.grid
    }

    /// Number of models applied so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Register a filter so it is refreshed after commits on other columns
    pub fn register(&self, column_id: &str, settings: FilterSyncSettings) {
        self.registry.register(&self.table_key, column_id, settings);
    }

    pub fn unregister(&self, column_id: &str) {
        self.registry.unregister(&self.table_key, column_id);
    }

    /// Apply (or clear, with `None`) the filter model of a column
    ///
    /// Dropping the returned future mid-commit releases the column, so the
    /// next submit drives the grid again.
    pub async fn submit(&self, column_id: &str, model: Option<FilterModel>) -> CommitOutcome {
        {
            let mut slots = self.slots.lock();
            let slot = slots.entry(column_id.to_string()).or_default();
            if slot.in_flight {
                debug!("Queueing commit on '{}' behind the one in flight", column_id);
                slot.queued = Some(model);
                return CommitOutcome::Queued;
            }
            slot.in_flight = true;
            // Left behind by a cancelled commit; older than `model`
            slot.queued = None;
        }
        let mut in_flight = InFlight {
            slots: &self.slots,
            column_id,
            released: false,
        };

        let mut next = model;
        loop {
            let cleared = next.is_none();
            let result = self.grid.set_column_filter_model(column_id, next).await;

            let queued = in_flight.take_queued();
            let outcome = self.settle(column_id, cleared, result);

            match queued {
                Some(model) => next = model,
                None => return outcome,
            }
        }
    }

    fn settle(&self, column_id: &str, cleared: bool, result: Result<(), GridError>) -> CommitOutcome {
        match result {
            Ok(()) => {
                let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
                self.grid.on_filter_changed();

                if cleared {
                    info!("Filter on '{}' cleared", column_id);
                    self.events.publish(FilterReset {
                        table_key: self.table_key.clone(),
                        column_id: column_id.to_string(),
                    });
                } else {
                    info!("Filter on '{}' applied (generation {})", column_id, generation);
                    self.events.publish(FilterCommitted {
                        table_key: self.table_key.clone(),
                        column_id: column_id.to_string(),
                        generation,
                    });
                }
                self.events.publish(ViewStateChanged {
                    table_key: self.table_key.clone(),
                });

                CommitOutcome::Applied {
                    generation,
                    refresh: self.registry.refresh_targets(&self.table_key, column_id),
                }
            }
            Err(error) => {
                warn!("Grid refused filter on '{}': {}", column_id, error);
                self.events.publish(CommitFailed {
                    table_key: self.table_key.clone(),
                    column_id: column_id.to_string(),
                    error: error.to_string(),
                });
                CommitOutcome::Failed(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gf_core::{handler_from_fn, FilterableColumn};
    use gf_data::{GridColumn, InMemoryGrid};
    use serde_json::json;

    fn setup() -> (Arc<InMemoryGrid>, FilterModelBridge, EventBus) {
        let rows = [
            json!({ "status": "A", "price": 1 }),
            json!({ "status": "B", "price": 2 }),
            json!({ "status": "C", "price": 3 }),
        ];
        let grid = Arc::new(InMemoryGrid::new(
            vec![GridColumn::new("status", "Status", true), GridColumn::new("price", "Price", true)],
            vec![FilterableColumn::text("status"), FilterableColumn::number("price")],
            rows.into_iter().filter_map(|r| r.as_object().cloned()).collect(),
        ));
        let events = EventBus::new();
        let bridge = FilterModelBridge::new("t", grid.clone(), FilterRegistry::new(), events.clone());
        bridge.register("status", FilterSyncSettings::default());
        bridge.register("price", FilterSyncSettings::default());
        (grid, bridge, events)
    }

    #[tokio::test]
    async fn test_applied_commit_reads_back_wire_shape() {
        let (grid, bridge, _) = setup();

        let outcome = bridge.submit("status", Some(FilterModel::set(["A", "B"]))).await;
        assert_eq!(
            outcome,
            CommitOutcome::Applied {
                generation: 1,
                refresh: vec!["price".to_string()],
            }
        );

        let applied = grid.column_filter_model("status").unwrap();
        assert_eq!(
            serde_json::to_value(&applied).unwrap(),
            json!({ "filterType": "text", "type": "set", "values": ["A", "B"] })
        );
        assert_eq!(grid.filter_changed_count(), 1);
    }

    #[tokio::test]
    async fn test_newest_queued_model_wins() {
        let (grid, bridge, _) = setup();

        let (first, second, third) = tokio::join!(
            bridge.submit("status", Some(FilterModel::set(["A"]))),
            bridge.submit("status", Some(FilterModel::set(["B"]))),
            bridge.submit("status", Some(FilterModel::set(["C"]))),
        );

        assert_eq!(second, CommitOutcome::Queued);
        assert_eq!(third, CommitOutcome::Queued);
        assert!(matches!(first, CommitOutcome::Applied { generation: 2, .. }));
        assert_eq!(grid.column_filter_model("status"), Some(FilterModel::set(["C"])));
        assert_eq!(bridge.generation(), 2);
    }

    #[tokio::test]
    async fn test_failed_commit_keeps_previous_model() {
        let (grid, bridge, events) = setup();
        let failures = Arc::new(Mutex::new(Vec::new()));
        let sink = failures.clone();
        events.subscribe::<CommitFailed>(handler_from_fn(move |event| {
            if let Some(failed) = event.downcast_ref::<CommitFailed>() {
                sink.lock().push(failed.column_id.clone());
            }
        }));

        bridge.submit("status", Some(FilterModel::set(["A"]))).await;
        grid.reject_column("status");

        let outcome = bridge.submit("status", Some(FilterModel::set(["B"]))).await;
        assert!(matches!(outcome, CommitOutcome::Failed(GridError::Rejected(_))));
        assert!(outcome.refresh_targets().is_empty());
        assert_eq!(grid.column_filter_model("status"), Some(FilterModel::set(["A"])));
        assert_eq!(*failures.lock(), vec!["status".to_string()]);
    }

    #[tokio::test]
    async fn test_dropped_commit_releases_column() {
        let (grid, bridge, _) = setup();

        // The grid yields before applying, so the first poll stays pending
        tokio::select! {
            biased;
            _ = bridge.submit("status", Some(FilterModel::set(["A"]))) => panic!("commit finished on first poll"),
            _ = std::future::ready(()) => {}
        }
        assert_eq!(grid.column_filter_model("status"), None);

        let outcome = bridge.submit("status", Some(FilterModel::set(["B"]))).await;
        assert!(outcome.is_applied());
        assert_eq!(grid.column_filter_model("status"), Some(FilterModel::set(["B"])));
    }

    #[tokio::test]
    async fn test_dropped_commit_discards_its_queue() {
        let (grid, bridge, _) = setup();

        tokio::select! {
            biased;
            _ = async {
                tokio::join!(
                    bridge.submit("status", Some(FilterModel::set(["A"]))),
                    bridge.submit("status", Some(FilterModel::set(["C"]))),
                )
            } => panic!("commit finished on first poll"),
            _ = std::future::ready(()) => {}
        }

        let outcome = bridge.submit("status", Some(FilterModel::set(["B"]))).await;
        assert!(matches!(outcome, CommitOutcome::Applied { generation: 1, .. }));
        assert_eq!(grid.column_filter_model("status"), Some(FilterModel::set(["B"])));
    }

    #[tokio::test]
    async fn test_null_model_clears_filter() {
        let (grid, bridge, _) = setup();
        bridge.submit("price", Some(FilterModel::range(2.0, 3.0))).await;
        let outcome = bridge.submit("price", None).await;
        assert_eq!(outcome.refresh_targets(), ["status".to_string()]);
        assert_eq!(grid.column_filter_model("price"), None);
    }
}
