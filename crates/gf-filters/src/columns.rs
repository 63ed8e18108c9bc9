//! Column visibility filter
//!
//! Same checkbox list as the set filter, but over the grid's columns, and
//! applying it shows or hides columns instead of filtering rows.

use std::collections::BTreeMap;

use gf_data::GridColumn;

use crate::set::{CheckItem, CheckList};

/// Checkbox list over the grid's columns
#[derive(Debug, Clone, Default)]
pub struct ColumnVisibilityController {
    list: CheckList,
}

impl ColumnVisibilityController {
    pub fn new(columns: &[GridColumn]) -> Self {
        let mut controller = Self::default();
        controller.initialize(columns);
        controller
    }

    /// One item per column, checked when the column is visible
    pub fn initialize(&mut self, columns: &[GridColumn]) {
        self.list = CheckList::new(
            columns
                .iter()
                .map(|column| CheckItem {
                    value: column.id.clone(),
                    label: column.header.clone(),
                    checked: column.visible,
                    displayed: true,
                })
                .collect(),
        );
    }

    pub fn items(&self) -> &[CheckItem] {
        &self.list.items
    }

    pub fn visible_items(&self) -> Vec<&CheckItem> {
        self.list.visible()
    }

    pub fn search_term(&self) -> &str {
        &self.list.search_term
    }

    pub fn all_checked(&self) -> bool {
        self.list.all_checked
    }

    pub fn toggle(&mut self, column_id: &str) -> bool {
        self.list.toggle(column_id)
    }

    pub fn toggle_all(&mut self, checked: bool) {
        self.list.toggle_all(checked);
    }

    pub fn search(&mut self, term: &str) {
        self.list.search_term = term.to_string();
    }

    /// Visibility of every column; clears the search
    pub fn commit(&mut self) -> BTreeMap<String, bool> {
        self.list.search_term.clear();
        self.visibility()
    }

    /// Show every column again
    pub fn reset(&mut self) -> BTreeMap<String, bool> {
        self.list.toggle_all(true);
        self.list.search_term.clear();
        self.visibility()
    }

    fn visibility(&self) -> BTreeMap<String, bool> {
        self.list
            .items
            .iter()
            .map(|item| (item.value.clone(), item.checked))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<GridColumn> {
        vec![
            GridColumn::new("id", "ID", true),
            GridColumn::new("name", "Name", true),
            GridColumn::new("notes", "Notes", false),
        ]
    }

    #[test]
    fn test_initial_state_follows_grid() {
        let c = ColumnVisibilityController::new(&columns());
        assert!(!c.all_checked());
        assert!(!c.items()[2].checked);
    }

    #[test]
    fn test_commit_and_reset() {
        let mut c = ColumnVisibilityController::new(&columns());
        c.toggle("name");
        c.search("no");
        assert_eq!(c.visible_items().len(), 1);

        let visibility = c.commit();
        assert_eq!(visibility.get("name"), Some(&false));
        assert_eq!(visibility.get("notes"), Some(&false));
        assert_eq!(c.search_term(), "");

        let visibility = c.reset();
        assert!(visibility.values().all(|v| *v));
        assert!(c.all_checked());
    }
}
