//! Value domain scanning
//!
//! Filter widgets are seeded from the rows the grid currently holds: set
//! filters need the distinct values (and whether each one still has a
//! displayed row), range sliders need the overall and displayed bounds.

use std::collections::BTreeMap;

use gf_core::{ColumnKind, FilterableColumn, RangeDomain, SetDomain, SetDomainItem, ValueDomain};

use crate::grid::RowNode;
use crate::value::{cell_text, linear_value};

/// Derives [`ValueDomain`]s from grid rows
pub struct ValueDomainScanner;

impl ValueDomainScanner {
    /// Scan one column, picking the domain shape from the column kind
    pub fn scan(rows: &[RowNode], column: &FilterableColumn) -> ValueDomain {
        match column.kind {
            ColumnKind::Text => ValueDomain::Set(Self::scan_set(rows, &column.id)),
            ColumnKind::Number | ColumnKind::Date => ValueDomain::Range(Self::scan_range(rows, column)),
        }
    }

    /// Distinct values of a field, sorted lexicographically.
    ///
    /// A value is displayed as soon as one displayed row carries it. Missing
    /// fields count as the empty string.
    pub fn scan_set(rows: &[RowNode], field: &str) -> SetDomain {
        let mut distinct: BTreeMap<String, bool> = BTreeMap::new();

        for row in rows {
            let text = row.value(field).map(cell_text).unwrap_or_default();
            let displayed = distinct.entry(text).or_insert(false);
            *displayed |= row.displayed;
        }

        SetDomain::new(
            distinct
                .into_iter()
                .map(|(value, displayed)| SetDomainItem { value, displayed })
                .collect(),
        )
    }

    /// Overall and displayed bounds of a numeric or date column.
    ///
    /// Cells that do not map onto the linear scale are skipped. Without any
    /// value the domain is `0..0`; without a displayed value the displayed
    /// bounds collapse onto the domain minimum.
    pub fn scan_range(rows: &[RowNode], column: &FilterableColumn) -> RangeDomain {
        let mut all: Option<(f64, f64)> = None;
        let mut displayed: Option<(f64, f64)> = None;

        for row in rows {
            let Some(value) = row.value(&column.id).and_then(|cell| linear_value(cell, column)) else {
                continue;
            };

            all = Some(extend(all, value));
            if row.displayed {
                displayed = Some(extend(displayed, value));
            }
        }

        match (all, displayed) {
            (None, _) => RangeDomain::default(),
            (Some((min, max)), None) => RangeDomain::new(min, max, min, min),
            (Some((min, max)), Some((min_displayed, max_displayed))) => {
                RangeDomain::new(min, max, min_displayed, max_displayed)
            }
        }
    }
}

fn extend(bounds: Option<(f64, f64)>, value: f64) -> (f64, f64) {
    match bounds {
        Some((lo, hi)) => (lo.min(value), hi.max(value)),
        None => (value, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    fn row(index: usize, displayed: bool, field: &str, value: Value) -> RowNode {
        let mut data = Map::new();
        data.insert(field.to_string(), value);
        RowNode::new(index, displayed, data)
    }

    #[test]
    fn test_range_with_hidden_rows() {
        let rows = vec![
            row(0, true, "n", json!(10)),
            row(1, false, "n", json!(20)),
            row(2, true, "n", json!(30)),
            row(3, false, "n", json!(40)),
        ];

        let domain = ValueDomainScanner::scan_range(&rows, &FilterableColumn::number("n"));
        assert_eq!(domain, RangeDomain::new(10.0, 40.0, 10.0, 30.0));
    }

    #[test]
    fn test_range_without_displayed_rows_collapses_to_min() {
        let rows = vec![row(0, false, "n", json!(5)), row(1, false, "n", json!(9))];

        let domain = ValueDomainScanner::scan_range(&rows, &FilterableColumn::number("n"));
        assert_eq!(domain, RangeDomain::new(5.0, 9.0, 5.0, 5.0));
    }

    #[test]
    fn test_range_of_empty_column() {
        let domain = ValueDomainScanner::scan_range(&[], &FilterableColumn::number("n"));
        assert_eq!(domain, RangeDomain::default());
    }

    #[test]
    fn test_range_skips_unmappable_cells() {
        let rows = vec![
            row(0, true, "n", json!("n/a")),
            row(1, true, "n", json!(7)),
            row(2, true, "other", json!(100)),
        ];

        let domain = ValueDomainScanner::scan_range(&rows, &FilterableColumn::number("n"));
        assert_eq!(domain, RangeDomain::full(7.0, 7.0));
    }

    #[test]
    fn test_set_values_sorted_and_flagged() {
        let rows = vec![
            row(0, false, "s", json!("b")),
            row(1, true, "s", json!("a")),
            row(2, true, "s", json!("b")),
            row(3, false, "s", json!("c")),
        ];

        let domain = ValueDomainScanner::scan_set(&rows, "s");
        let items: Vec<(&str, bool)> = domain
            .items
            .iter()
            .map(|item| (item.value.as_str(), item.displayed))
            .collect();
        assert_eq!(items, vec![("a", true), ("b", true), ("c", false)]);
    }
}
