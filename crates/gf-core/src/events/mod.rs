use std::sync::Arc;
use parking_lot::Mutex;
use ahash::AHashMap;

/// Panel-wide event bus; clones share their subscribers
#[derive(Clone)]
pub struct EventBus {
    handlers: Arc<Mutex<AHashMap<std::any::TypeId, Vec<Box<dyn EventHandler>>>>>,
}

/// Event trait that all events must implement
pub trait Event: Send + Sync + 'static {
    fn as_any(&self) -> &dyn std::any::Any;
}

impl dyn Event {
    /// Downcast to a concrete event type
    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        self.as_any().downcast_ref::<E>()
    }
}

/// Handler trait for event handlers
pub trait EventHandler: Send + Sync {
    fn handle(&mut self, event: &dyn Event);
}

/// Events published by the filter panel
pub mod events {
    use super::Event;

    /// A filter model was applied by the grid
    #[derive(Debug, Clone)]
    pub struct FilterCommitted {
        pub table_key: String,
        pub column_id: String,
        pub generation: u64,
    }

    /// A column filter was cleared
    #[derive(Debug, Clone)]
    pub struct FilterReset {
        pub table_key: String,
        pub column_id: String,
    }

    /// The grid refused a filter model; the previous one stays active
    #[derive(Debug, Clone)]
    pub struct CommitFailed {
        pub table_key: String,
        pub column_id: String,
        pub error: String,
    }

    /// Sort, filter or column layout changed and should be snapshotted
    #[derive(Debug, Clone)]
    pub struct ViewStateChanged {
        pub table_key: String,
    }

    /// The side panel was resized
    #[derive(Debug, Clone)]
    pub struct PanelResized {
        pub table_key: String,
        pub width: f32,
    }

    /// Another table tab was selected
    #[derive(Debug, Clone)]
    pub struct TabChanged {
        pub dashboard_key: String,
        pub index: usize,
    }

    // Implement Event trait for all event types
    macro_rules! impl_event {
        ($($t:ty),*) => {
            $(
                impl Event for $t {
                    fn as_any(&self) -> &dyn std::any::Any {
                        self
                    }
                }
            )*
        }
    }

    impl_event!(
        FilterCommitted,
        FilterReset,
        CommitFailed,
        ViewStateChanged,
        PanelResized,
        TabChanged
    );
}

pub use self::events::{
    CommitFailed, FilterCommitted, FilterReset, PanelResized, TabChanged, ViewStateChanged,
};

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(AHashMap::new())),
        }
    }

    /// Subscribe to events of a specific type
    pub fn subscribe<E: Event>(&self, handler: Box<dyn EventHandler>) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();
        handlers.entry(type_id).or_insert_with(Vec::new).push(handler);
    }

    /// Publish an event
    pub fn publish<E: Event>(&self, event: E) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();

        if let Some(event_handlers) = handlers.get_mut(&type_id) {
            for handler in event_handlers.iter_mut() {
                handler.handle(&event);
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper struct for creating event handlers from closures
pub struct ClosureEventHandler<F> {
    handler: F,
}

impl<F> EventHandler for ClosureEventHandler<F>
where
    F: FnMut(&dyn Event) + Send + Sync,
{
    fn handle(&mut self, event: &dyn Event) {
        (self.handler)(event);
    }
}

/// Create an event handler from a closure
pub fn handler_from_fn<F>(f: F) -> Box<dyn EventHandler>
where
    F: FnMut(&dyn Event) + Send + Sync + 'static,
{
    Box::new(ClosureEventHandler { handler: f })
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::events::{FilterCommitted, PanelResized};

    #[test]
    fn test_publish_reaches_typed_subscribers_only() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        bus.subscribe::<FilterCommitted>(handler_from_fn(move |event| {
            if let Some(committed) = event.downcast_ref::<FilterCommitted>() {
                sink.lock().push(committed.column_id.clone());
            }
        }));

        bus.publish(FilterCommitted {
            table_key: "t".to_string(),
            column_id: "status".to_string(),
            generation: 1,
        });
        bus.publish(PanelResized { table_key: "t".to_string(), width: 300.0 });

        assert_eq!(*seen.lock(), vec!["status".to_string()]);
    }
}
