//! Checkbox set filter
//!
//! A list of distinct values with a checked flag each, an aggregate
//! "select all" box and a live search. The search only narrows what is
//! shown; checked state and the commit always cover the full list.

use gf_core::{FilterModel, SetDomain, SetFilterModel};
use tracing::debug;

/// Label shown for the empty value
pub const BLANK_LABEL: &str = "(Blanks)";

/// One row of a checkbox list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckItem {
    pub value: String,
    pub label: String,
    pub checked: bool,
    /// Whether rows with this value pass the other filters
    pub displayed: bool,
}

/// Checked items plus search, shared by the set and column filters
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct CheckList {
    pub(crate) items: Vec<CheckItem>,
    pub(crate) search_term: String,
    pub(crate) all_checked: bool,
}

impl CheckList {
    pub(crate) fn new(items: Vec<CheckItem>) -> Self {
        let mut list = Self {
            items,
            search_term: String::new(),
            all_checked: true,
        };
        list.recompute_all();
        list
    }

    pub(crate) fn toggle(&mut self, value: &str) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.value == value) else {
            return false;
        };
        item.checked = !item.checked;
        self.recompute_all();
        true
    }

    pub(crate) fn toggle_all(&mut self, checked: bool) {
        for item in &mut self.items {
            item.checked = checked;
        }
        self.all_checked = checked;
    }

    pub(crate) fn set_checked(&mut self, predicate: impl Fn(&CheckItem) -> bool) {
        for item in &mut self.items {
            item.checked = predicate(item);
        }
        self.recompute_all();
    }

    pub(crate) fn visible(&self) -> Vec<&CheckItem> {
        if self.search_term.is_empty() {
            return self.items.iter().collect();
        }
        let needle = self.search_term.to_lowercase();
        self.items
            .iter()
            .filter(|item| {
                item.label.to_lowercase().contains(&needle) || item.value.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub(crate) fn checked_values(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|item| item.checked)
            .map(|item| item.value.clone())
            .collect()
    }

    fn recompute_all(&mut self) {
        self.all_checked = self.items.iter().all(|item| item.checked);
    }
}

/// State machine behind a text column's set filter
#[derive(Debug, Clone)]
pub struct SetFilterController {
    column_id: String,
    list: CheckList,
    /// Whether a set model is applied to the grid
    active: bool,
}

impl SetFilterController {
    pub fn new(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            list: CheckList::new(Vec::new()),
            active: false,
        }
    }

    /// Controller seeded from a scanned domain
    pub fn with_domain(column_id: impl Into<String>, domain: &SetDomain) -> Self {
        let mut controller = Self::new(column_id);
        controller.initialize(domain);
        controller
    }

    pub fn column_id(&self) -> &str {
        &self.column_id
    }

    pub fn items(&self) -> &[CheckItem] {
        &self.list.items
    }

    /// Items matching the current search
    pub fn visible_items(&self) -> Vec<&CheckItem> {
        self.list.visible()
    }

    pub fn search_term(&self) -> &str {
        &self.list.search_term
    }

    pub fn all_checked(&self) -> bool {
        self.list.all_checked
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn checked_values(&self) -> Vec<String> {
        self.list.checked_values()
    }

    /// Every value checked, search cleared
    pub fn initialize(&mut self, domain: &SetDomain) {
        let items = domain
            .items
            .iter()
            .map(|item| check_item(&item.value, true, item.displayed))
            .collect();
        self.list = CheckList::new(items);
        self.active = false;
    }

    /// Replace the items after the grid re-filtered.
    ///
    /// Values still present keep their checked flag. New values are checked
    /// unless a filter is applied, since the applied model excludes them.
    pub fn refresh(&mut self, domain: &SetDomain) {
        let previous = std::mem::take(&mut self.list.items);
        let items = domain
            .items
            .iter()
            .map(|item| {
                let checked = previous
                    .iter()
                    .find(|old| old.value == item.value)
                    .map(|old| old.checked)
                    .unwrap_or(!self.active);
                check_item(&item.value, checked, item.displayed)
            })
            .collect();

        let search_term = std::mem::take(&mut self.list.search_term);
        self.list = CheckList::new(items);
        self.list.search_term = search_term;
    }

    /// Check exactly the values of a model known to be applied
    pub fn apply_model(&mut self, model: Option<&SetFilterModel>) {
        match model {
            Some(model) => {
                self.list.set_checked(|item| model.contains(&item.value));
                self.active = true;
            }
            None => {
                self.list.toggle_all(true);
                self.active = false;
            }
        }
    }

    /// Flip one value; returns false for an unknown value
    pub fn toggle(&mut self, value: &str) -> bool {
        self.list.toggle(value)
    }

    /// Check or uncheck every value, including those hidden by the search
    pub fn toggle_all(&mut self, checked: bool) {
        self.list.toggle_all(checked);
    }

    /// Case-insensitive substring search over the labels
    pub fn search(&mut self, term: &str) {
        self.list.search_term = term.to_string();
    }

    /// Model of every checked value, in item order; the search is ignored
    pub fn commit(&self) -> FilterModel {
        let values = self.list.checked_values();
        debug!(column = %self.column_id, count = values.len(), "Set filter commit");
        FilterModel::set(values)
    }

    /// The grid accepted the committed model: clear the search
    pub fn mark_applied(&mut self) {
        self.list.search_term.clear();
        self.active = true;
    }

    /// Check everything and clear the search; the caller submits a null model
    pub fn reset(&mut self) {
        self.list.toggle_all(true);
        self.list.search_term.clear();
        self.active = false;
    }
}

fn check_item(value: &str, checked: bool, displayed: bool) -> CheckItem {
    CheckItem {
        value: value.to_string(),
        label: if value.is_empty() { BLANK_LABEL.to_string() } else { value.to_string() },
        checked,
        displayed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gf_core::SetDomainItem;

    fn domain(values: &[&str]) -> SetDomain {
        SetDomain::new(
            values
                .iter()
                .map(|v| SetDomainItem {
                    value: v.to_string(),
                    displayed: true,
                })
                .collect(),
        )
    }

    fn filter() -> SetFilterController {
        SetFilterController::with_domain("status", &domain(&["Active", "Closed", "Pending", ""]))
    }

    #[test]
    fn test_initialize_checks_everything() {
        let f = filter();
        assert!(f.all_checked());
        assert_eq!(f.search_term(), "");
        assert_eq!(f.items().len(), 4);
        assert_eq!(f.items()[3].label, BLANK_LABEL);
    }

    #[test]
    fn test_uncheck_one_after_check_all() {
        let mut f = filter();
        f.toggle_all(true);
        assert!(f.toggle("Closed"));
        assert!(!f.all_checked());
        assert_eq!(f.checked_values(), vec!["Active", "Pending", ""]);

        f.toggle("Closed");
        assert!(f.all_checked());
    }

    #[test]
    fn test_search_without_match() {
        let mut f = filter();
        f.toggle("Active");
        let before = f.checked_values();

        f.search("zzz");
        assert!(f.visible_items().is_empty());
        assert_eq!(f.checked_values(), before);
        assert!(!f.all_checked());
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let mut f = filter();
        f.search("END");
        let labels: Vec<&str> = f.visible_items().iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["Pending"]);

        f.search("");
        assert_eq!(f.visible_items().len(), 4);
    }

    #[test]
    fn test_toggle_all_ignores_search() {
        let mut f = filter();
        f.search("act");
        f.toggle_all(false);
        assert!(f.checked_values().is_empty());
        assert!(!f.all_checked());
    }

    #[test]
    fn test_commit_ignores_search_and_clears_it() {
        let mut f = filter();
        f.toggle("Pending");
        f.toggle("");
        f.search("closed");

        let model = f.commit();
        assert_eq!(model, FilterModel::set(["Active", "Closed"]));
        assert_eq!(f.search_term(), "closed");
        assert!(!f.is_active());

        f.mark_applied();
        assert_eq!(f.search_term(), "");
        assert!(f.is_active());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut f = filter();
        f.toggle("Active");
        f.search("x");
        f.mark_applied();

        f.reset();
        let once = (f.items().to_vec(), f.search_term().to_string(), f.all_checked(), f.is_active());
        f.reset();
        let twice = (f.items().to_vec(), f.search_term().to_string(), f.all_checked(), f.is_active());
        assert_eq!(once, twice);
        assert!(once.2);
    }

    #[test]
    fn test_refresh_preserves_checked_values() {
        let mut f = filter();
        f.toggle("Closed");
        f.mark_applied();

        f.refresh(&domain(&["Closed", "New"]));
        let checked: Vec<(&str, bool)> = f.items().iter().map(|i| (i.value.as_str(), i.checked)).collect();
        assert_eq!(checked, vec![("Closed", false), ("New", false)]);

        f.reset();
        f.refresh(&domain(&["Closed", "Newer"]));
        assert!(f.all_checked());
    }

    #[test]
    fn test_apply_model() {
        let mut f = filter();
        f.apply_model(FilterModel::set(["Pending"]).as_set());
        assert_eq!(f.checked_values(), vec!["Pending"]);
        assert!(f.is_active());

        f.apply_model(None);
        assert!(f.all_checked());
        assert!(!f.is_active());
    }
}
