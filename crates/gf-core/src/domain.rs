//! Value domains derived from the grid rows

use serde::{Deserialize, Serialize};

/// One distinct value of a set domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetDomainItem {
    pub value: String,
    /// True if at least one row carrying the value passes the other filters
    pub displayed: bool,
}

/// Distinct values of a text column, lexicographically sorted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetDomain {
    pub items: Vec<SetDomainItem>,
}

impl SetDomain {
    pub fn new(items: Vec<SetDomainItem>) -> Self {
        Self { items }
    }

    /// Values that currently have at least one displayed row
    pub fn displayed_values(&self) -> impl Iterator<Item = &str> {
        self.items
            .iter()
            .filter(|item| item.displayed)
            .map(|item| item.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Bounds of a numeric or date column on a linear scale.
///
/// `min`/`max` are taken over every row, the `*_displayed` pair only over rows
/// passing the other filters. When no row is displayed both displayed bounds
/// equal `min`, so a slider collapses to a zero-width window instead of
/// pretending everything matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeDomain {
    pub min: f64,
    pub max: f64,
    pub min_displayed: f64,
    pub max_displayed: f64,
}

impl RangeDomain {
    pub fn new(min: f64, max: f64, min_displayed: f64, max_displayed: f64) -> Self {
        Self { min, max, min_displayed, max_displayed }
    }

    /// A domain where every row is displayed
    pub fn full(min: f64, max: f64) -> Self {
        Self::new(min, max, min, max)
    }

    /// Single-point domain (also the shape of an empty column)
    pub fn is_degenerate(&self) -> bool {
        self.max <= self.min
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Clamp a value into `[min, max]`
    pub fn clamp(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            self.min
        } else {
            value.clamp(self.min, self.max)
        }
    }
}

/// Result of scanning one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueDomain {
    Set(SetDomain),
    Range(RangeDomain),
}

impl ValueDomain {
    pub fn as_set(&self) -> Option<&SetDomain> {
        match self {
            ValueDomain::Set(domain) => Some(domain),
            ValueDomain::Range(_) => None,
        }
    }

    pub fn as_range(&self) -> Option<&RangeDomain> {
        match self {
            ValueDomain::Range(domain) => Some(domain),
            ValueDomain::Set(_) => None,
        }
    }
}
