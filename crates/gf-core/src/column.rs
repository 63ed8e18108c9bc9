//! Filterable column definitions

use serde::{Deserialize, Serialize};

/// What kind of filter widget a column gets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Distinct values, rendered as a checkbox set filter
    Text,
    /// Numeric range slider
    Number,
    /// Date/time range slider over a linear millisecond scale
    Date,
}

/// How date values are projected onto the slider scale and its text boxes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateGranularity {
    /// `DD.MM.YYYY`, epoch millis
    #[default]
    Date,
    /// `DD.MM.YYYYTHH:MM:SS.mmm`, epoch millis
    Datetime,
    /// `HH:MM:SS.mmm`, millis since midnight UTC
    Time,
}

/// Number display settings used for the slider text boxes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NumberFormat {
    pub min_fraction_digits: usize,
    pub max_fraction_digits: usize,
    /// Thousands separator on/off
    pub grouping: bool,
    /// Compact notation (1.2K, 3.4M)
    pub compact: bool,
    /// Text placed before the number, e.g. a currency symbol
    pub prefix: String,
    /// Text placed after the number, e.g. `%`
    pub suffix: String,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            min_fraction_digits: 0,
            max_fraction_digits: 2,
            grouping: false,
            compact: false,
            prefix: String::new(),
            suffix: String::new(),
        }
    }
}

/// A column that has a filter widget in the side panel.
///
/// Immutable once the grid is constructed; the panel builds exactly one
/// controller per filterable column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterableColumn {
    /// Field key, unique per table
    pub id: String,

    /// Header shown above the widget
    pub header: String,

    /// Filter kind
    pub kind: ColumnKind,

    /// Only meaningful when `kind` is `Date`
    #[serde(default)]
    pub granularity: DateGranularity,

    /// Only meaningful when `kind` is `Number`
    #[serde(default)]
    pub number_format: NumberFormat,
}

impl FilterableColumn {
    /// Create a text (set filter) column
    pub fn text(id: impl Into<String>) -> Self {
        Self::new(id, ColumnKind::Text)
    }

    /// Create a numeric range column
    pub fn number(id: impl Into<String>) -> Self {
        Self::new(id, ColumnKind::Number)
    }

    /// Create a date range column with the given granularity
    pub fn date(id: impl Into<String>, granularity: DateGranularity) -> Self {
        let mut column = Self::new(id, ColumnKind::Date);
        column.granularity = granularity;
        column
    }

    fn new(id: impl Into<String>, kind: ColumnKind) -> Self {
        let id = id.into();
        Self {
            header: id.clone(),
            id,
            kind,
            granularity: DateGranularity::default(),
            number_format: NumberFormat::default(),
        }
    }

    /// Set the header text
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    /// Set the number format
    pub fn with_number_format(mut self, format: NumberFormat) -> Self {
        self.number_format = format;
        self
    }

    /// Whether this column is driven by a range slider
    pub fn is_range(&self) -> bool {
        matches!(self.kind, ColumnKind::Number | ColumnKind::Date)
    }
}
