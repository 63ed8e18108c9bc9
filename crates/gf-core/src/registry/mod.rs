use std::sync::Arc;
use parking_lot::RwLock;
use ahash::AHashMap;

/// Registry of the filters living on each table.
///
/// A commit on one column must refresh every *other* filter of the same
/// table; this is where the bridge looks those up.
#[derive(Clone)]
pub struct FilterRegistry {
    tables: Arc<RwLock<AHashMap<String, Vec<RegisteredFilter>>>>,
}

/// A filter registered on a table
#[derive(Debug, Clone)]
pub struct RegisteredFilter {
    pub column_id: String,
    pub settings: FilterSyncSettings,
}

/// Synchronization settings for a specific filter
#[derive(Debug, Clone)]
pub struct FilterSyncSettings {
    /// Whether this filter re-scans its domain after other filters commit
    pub receive_refresh: bool,
}

impl Default for FilterSyncSettings {
    fn default() -> Self {
        Self {
            receive_refresh: true,
        }
    }
}

impl FilterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(AHashMap::new())),
        }
    }

    /// Register a filter; re-registering replaces its settings
    pub fn register(&self, table_key: &str, column_id: &str, settings: FilterSyncSettings) {
        let mut tables = self.tables.write();
        let filters = tables.entry(table_key.to_string()).or_default();

        if let Some(existing) = filters.iter_mut().find(|f| f.column_id == column_id) {
            existing.settings = settings;
        } else {
            filters.push(RegisteredFilter {
                column_id: column_id.to_string(),
                settings,
            });
        }
    }

    /// Unregister a filter
    pub fn unregister(&self, table_key: &str, column_id: &str) {
        let mut tables = self.tables.write();
        if let Some(filters) = tables.get_mut(table_key) {
            filters.retain(|f| f.column_id != column_id);
            if filters.is_empty() {
                tables.remove(table_key);
            }
        }
    }

    /// Drop every filter of a table
    pub fn unregister_table(&self, table_key: &str) {
        self.tables.write().remove(table_key);
    }

    /// Check whether a filter is registered
    pub fn is_registered(&self, table_key: &str, column_id: &str) -> bool {
        self.tables
            .read()
            .get(table_key)
            .map(|filters| filters.iter().any(|f| f.column_id == column_id))
            .unwrap_or(false)
    }

    /// Filters that must refresh after `column_id` commits, in registration order
    pub fn refresh_targets(&self, table_key: &str, column_id: &str) -> Vec<String> {
        self.tables
            .read()
            .get(table_key)
            .map(|filters| {
                filters
                    .iter()
                    .filter(|f| f.column_id != column_id && f.settings.receive_refresh)
                    .map(|f| f.column_id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_targets_exclude_source() {
        let registry = FilterRegistry::new();
        registry.register("t", "status", FilterSyncSettings::default());
        registry.register("t", "price", FilterSyncSettings::default());
        registry.register("t", "date", FilterSyncSettings::default());
        registry.register("other", "status", FilterSyncSettings::default());

        assert_eq!(registry.refresh_targets("t", "price"), vec!["status", "date"]);
        assert_eq!(registry.refresh_targets("other", "status"), Vec::<String>::new());
    }

    #[test]
    fn test_opted_out_filters_are_skipped() {
        let registry = FilterRegistry::new();
        registry.register("t", "a", FilterSyncSettings::default());
        registry.register("t", "b", FilterSyncSettings { receive_refresh: false });

        assert_eq!(registry.refresh_targets("t", "a"), Vec::<String>::new());
        assert_eq!(registry.refresh_targets("t", "b"), vec!["a"]);
    }

    #[test]
    fn test_unregister() {
        let registry = FilterRegistry::new();
        registry.register("t", "a", FilterSyncSettings::default());
        registry.unregister("t", "a");
        assert!(!registry.is_registered("t", "a"));
    }
}
