//! Filter model wire shapes shared with the grid
//!
//! These are the structures submitted to the grid's column-filter API and
//! stored inside the persisted view state. Field names follow the grid's JSON
//! format (`filterType`, `type`, `operator`, `conditions`).

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

/// Filter model for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterModel {
    /// `{ filterType: "text", type: "set", values: [...] }`
    Set(SetFilterModel),
    /// `{ operator: "AND", conditions: [>=, <=] }`
    Range(RangeFilterModel),
}

impl FilterModel {
    /// Set-membership model over the given values
    pub fn set<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterModel::Set(SetFilterModel::new(values))
    }

    /// Inclusive range model
    pub fn range(lo: f64, hi: f64) -> Self {
        FilterModel::Range(RangeFilterModel::between(lo, hi))
    }

    pub fn as_set(&self) -> Option<&SetFilterModel> {
        match self {
            FilterModel::Set(model) => Some(model),
            FilterModel::Range(_) => None,
        }
    }

    pub fn as_range(&self) -> Option<&RangeFilterModel> {
        match self {
            FilterModel::Range(model) => Some(model),
            FilterModel::Set(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
enum TextFilterType {
    #[default]
    #[serde(rename = "text")]
    Text,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
enum SetType {
    #[default]
    #[serde(rename = "set")]
    Set,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
enum NumberFilterType {
    #[default]
    #[serde(rename = "number")]
    Number,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
enum Operator {
    #[default]
    #[serde(rename = "AND")]
    And,
}

/// Permitted discrete values of a text column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetFilterModel {
    #[serde(rename = "filterType")]
    filter_type: TextFilterType,
    #[serde(rename = "type")]
    kind: SetType,
    pub values: Vec<String>,
}

impl SetFilterModel {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            filter_type: TextFilterType::Text,
            kind: SetType::Set,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// Order-insensitive comparison of the permitted values
    pub fn same_values(&self, other: &SetFilterModel) -> bool {
        let mut left: Vec<&str> = self.values.iter().map(String::as_str).collect();
        let mut right: Vec<&str> = other.values.iter().map(String::as_str).collect();
        left.sort_unstable();
        left.dedup();
        right.sort_unstable();
        right.dedup();
        left == right
    }
}

/// Comparison used inside a range model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionType {
    GreaterThanOrEqual,
    LessThanOrEqual,
}

/// One side of a range model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeCondition {
    #[serde(rename = "filterType", default)]
    filter_type: NumberFilterType,
    #[serde(rename = "type")]
    pub condition: ConditionType,
    pub filter: f64,
}

impl RangeCondition {
    pub fn new(condition: ConditionType, filter: f64) -> Self {
        Self {
            filter_type: NumberFilterType::Number,
            condition,
            filter,
        }
    }

    pub fn matches(&self, value: f64) -> bool {
        match self.condition {
            ConditionType::GreaterThanOrEqual => value >= self.filter,
            ConditionType::LessThanOrEqual => value <= self.filter,
        }
    }
}

/// Conjunction of comparisons over a numeric (or date-as-millis) column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeFilterModel {
    operator: Operator,
    pub conditions: Vec<RangeCondition>,
}

impl RangeFilterModel {
    /// `lo <= value <= hi`
    pub fn between(lo: f64, hi: f64) -> Self {
        Self {
            operator: Operator::And,
            conditions: vec![
                RangeCondition::new(ConditionType::GreaterThanOrEqual, lo),
                RangeCondition::new(ConditionType::LessThanOrEqual, hi),
            ],
        }
    }

    pub fn matches(&self, value: f64) -> bool {
        self.conditions.iter().all(|c| c.matches(value))
    }

    /// Tightest `(lower, upper)` pair described by the conditions
    pub fn bounds(&self) -> (Option<f64>, Option<f64>) {
        let mut lower: Option<f64> = None;
        let mut upper: Option<f64> = None;

        for condition in &self.conditions {
            match condition.condition {
                ConditionType::GreaterThanOrEqual => {
                    lower = Some(lower.map_or(condition.filter, |l| l.max(condition.filter)));
                }
                ConditionType::LessThanOrEqual => {
                    upper = Some(upper.map_or(condition.filter, |u| u.min(condition.filter)));
                }
            }
        }

        (lower, upper)
    }
}

/// Sort direction of one column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One entry of the grid's sort model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortEntry {
    pub col_id: String,
    pub sort: SortDirection,
}

/// Grid view state persisted per table.
///
/// Only the grid interprets it; the panel stores it as a JSON blob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridViewState {
    pub filter_model: BTreeMap<String, FilterModel>,
    pub column_visibility: BTreeMap<String, bool>,
    pub sort: Vec<SortEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_model_wire_shape() {
        let model = FilterModel::set(["A", "B"]);
        let value = serde_json::to_value(&model).unwrap();
        assert_eq!(value, json!({ "filterType": "text", "type": "set", "values": ["A", "B"] }));
    }

    #[test]
    fn test_range_model_wire_shape() {
        let model = FilterModel::range(1.5, 9.0);
        let value = serde_json::to_value(&model).unwrap();
        assert_eq!(
            value,
            json!({
                "operator": "AND",
                "conditions": [
                    { "filterType": "number", "type": "greaterThanOrEqual", "filter": 1.5 },
                    { "filterType": "number", "type": "lessThanOrEqual", "filter": 9.0 }
                ]
            })
        );
    }

    #[test]
    fn test_untagged_parse_picks_variant() {
        let set: FilterModel = serde_json::from_value(json!({
            "filterType": "text", "type": "set", "values": ["x"]
        }))
        .unwrap();
        assert!(set.as_set().is_some());

        let range: FilterModel = serde_json::from_value(json!({
            "operator": "AND",
            "conditions": [{ "filterType": "number", "type": "lessThanOrEqual", "filter": 3 }]
        }))
        .unwrap();
        assert_eq!(range.as_range().unwrap().bounds(), (None, Some(3.0)));
    }

    #[test]
    fn test_unknown_shape_is_rejected() {
        let parsed: Result<FilterModel, _> =
            serde_json::from_value(json!({ "filterType": "text", "type": "contains", "filter": "a" }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_range_matches_inclusive() {
        let model = RangeFilterModel::between(10.0, 20.0);
        assert!(model.matches(10.0));
        assert!(model.matches(20.0));
        assert!(!model.matches(20.5));
    }

    #[test]
    fn test_set_values_order_insensitive() {
        let a = SetFilterModel::new(["B", "A"]);
        let b = SetFilterModel::new(["A", "B"]);
        assert!(a.same_values(&b));
        assert!(!a.same_values(&SetFilterModel::new(["A"])));
    }
}
