//! Dashboard configuration for the table panel
//!
//! The dashboard is described by a JSON document: a stable key used for
//! persistence, and one or more tables shown under tabs. Each table carries
//! its row data and column definitions, including which filter widget a
//! column gets and optional initial set filters.

use std::collections::HashSet;
use std::path::Path;

use gf_core::{ColumnKind, DateGranularity, FilterableColumn, NumberFormat};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::grid::GridColumn;
use crate::DataError;

/// Display setting attached to a column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnFormatter {
    /// `"date"`, `"datetime"` or `"time"`
    Granularity(DateGranularity),
    /// Number display settings
    Number(NumberFormat),
}

/// Configuration of a single column
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConfig {
    /// Field key in the row data
    pub field_name: String,

    /// Header text; defaults to the field name
    #[serde(default)]
    pub header_name: Option<String>,

    /// Initial visibility
    #[serde(default = "default_true")]
    pub visible: bool,

    /// Filter widget kind; no filter when absent
    #[serde(default)]
    pub filter: Option<ColumnKind>,

    /// Date granularity or number format
    #[serde(default)]
    pub formatter: Option<ColumnFormatter>,

    /// Values to keep on first render
    #[serde(default)]
    pub filter_include: Vec<String>,

    /// Values to drop on first render
    #[serde(default)]
    pub filter_exclude: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl ColumnConfig {
    /// Header text
    pub fn header(&self) -> &str {
        self.header_name.as_deref().unwrap_or(&self.field_name)
    }

    /// The filterable column described by this config, if it has a filter
    pub fn filterable(&self) -> Option<FilterableColumn> {
        let kind = self.filter?;

        let mut column = match kind {
            ColumnKind::Text => FilterableColumn::text(&self.field_name),
            ColumnKind::Number => FilterableColumn::number(&self.field_name),
            ColumnKind::Date => {
                let granularity = match &self.formatter {
                    Some(ColumnFormatter::Granularity(granularity)) => *granularity,
                    _ => DateGranularity::default(),
                };
                FilterableColumn::date(&self.field_name, granularity)
            }
        }
        .with_header(self.header());

        if let Some(ColumnFormatter::Number(format)) = &self.formatter {
            column = column.with_number_format(format.clone());
        }

        Some(column)
    }
}

/// Set filter applied on first render when nothing was persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialSetFilter {
    pub column_id: String,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

/// Configuration of one table (one tab)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    /// Tab label
    pub name: String,

    /// Stable persistence key; derived from the dashboard key when absent
    #[serde(default)]
    pub key: Option<String>,

    /// Column definitions in display order
    #[serde(rename = "columnDefs")]
    pub columns: Vec<ColumnConfig>,

    /// Row data
    #[serde(default, rename = "rowData")]
    pub rows: Vec<Map<String, Value>>,

    /// Whether the panel gets a column visibility filter
    #[serde(default)]
    pub column_filter: bool,
}

impl TableConfig {
    /// Columns that get a filter widget, in display order
    pub fn filterable_columns(&self) -> Vec<FilterableColumn> {
        self.columns.iter().filter_map(ColumnConfig::filterable).collect()
    }

    /// Grid column definitions with their initial visibility
    pub fn grid_columns(&self) -> Vec<GridColumn> {
        self.columns
            .iter()
            .map(|c| GridColumn::new(&c.field_name, c.header(), c.visible))
            .collect()
    }

    /// Configured initial set filters
    pub fn initial_filters(&self) -> Vec<InitialSetFilter> {
        self.columns
            .iter()
            .filter(|c| c.filter == Some(ColumnKind::Text))
            .filter(|c| !c.filter_include.is_empty() || !c.filter_exclude.is_empty())
            .map(|c| InitialSetFilter {
                column_id: c.field_name.clone(),
                include: c.filter_include.clone(),
                exclude: c.filter_exclude.clone(),
            })
            .collect()
    }

    /// Whether any filter widget is shown for this table
    pub fn has_filters(&self) -> bool {
        self.column_filter || self.columns.iter().any(|c| c.filter.is_some())
    }

    fn validate(&self) -> Result<(), DataError> {
        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.field_name.as_str()) {
                return Err(DataError::Config(format!(
                    "table '{}' defines column '{}' twice",
                    self.name, column.field_name
                )));
            }
        }
        Ok(())
    }
}

/// Top-level dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardConfig {
    /// Stable key for persisted state
    #[serde(rename = "uuidKey")]
    pub key: String,

    /// Window title
    #[serde(default)]
    pub name: String,

    /// Tables shown under tabs
    pub tables: Vec<TableConfig>,
}

impl DashboardConfig {
    /// Parse and validate a configuration document
    pub fn from_json_str(json: &str) -> Result<Self, DataError> {
        let config: DashboardConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Persistence key of the table at `index`
    pub fn table_key(&self, index: usize) -> String {
        self.tables
            .get(index)
            .and_then(|t| t.key.clone())
            .unwrap_or_else(|| format!("{}-{}", self.key, index))
    }

    fn validate(&self) -> Result<(), DataError> {
        if self.key.trim().is_empty() {
            return Err(DataError::Config("dashboard key is empty".to_string()));
        }
        if self.tables.is_empty() {
            return Err(DataError::Config("dashboard has no tables".to_string()));
        }
        for table in &self.tables {
            table.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{
        "uuidKey": "sales",
        "name": "Sales",
        "tables": [
            {
                "name": "Orders",
                "columnFilter": true,
                "columnDefs": [
                    { "fieldName": "status", "headerName": "Status", "filter": "text",
                      "filterExclude": ["cancelled"] },
                    { "fieldName": "amount", "filter": "number",
                      "formatter": { "maxFractionDigits": 0, "grouping": true } },
                    { "fieldName": "placed", "filter": "date", "formatter": "datetime" },
                    { "fieldName": "note", "visible": false }
                ],
                "rowData": [ { "status": "open", "amount": 10, "placed": 0, "note": "x" } ]
            },
            { "name": "Returns", "key": "returns", "columnDefs": [] }
        ]
    }"#;

    #[test]
    fn test_parse_dashboard() {
        let config = DashboardConfig::from_json_str(CONFIG).unwrap();
        assert_eq!(config.tables.len(), 2);
        assert_eq!(config.table_key(0), "sales-0");
        assert_eq!(config.table_key(1), "returns");

        let orders = &config.tables[0];
        let filterable = orders.filterable_columns();
        assert_eq!(filterable.len(), 3);
        assert_eq!(filterable[0].header, "Status");
        assert_eq!(filterable[1].number_format.max_fraction_digits, 0);
        assert!(filterable[1].number_format.grouping);
        assert_eq!(filterable[2].granularity, DateGranularity::Datetime);

        let grid_columns = orders.grid_columns();
        assert!(!grid_columns[3].visible);
        assert!(orders.has_filters());
    }

    #[test]
    fn test_initial_filters() {
        let config = DashboardConfig::from_json_str(CONFIG).unwrap();
        let initial = config.tables[0].initial_filters();
        assert_eq!(
            initial,
            vec![InitialSetFilter {
                column_id: "status".to_string(),
                include: Vec::new(),
                exclude: vec!["cancelled".to_string()],
            }]
        );
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let json = r#"{ "uuidKey": "k", "tables": [ { "name": "t", "columnDefs": [
            { "fieldName": "a" }, { "fieldName": "a" } ] } ] }"#;
        assert!(matches!(DashboardConfig::from_json_str(json), Err(DataError::Config(_))));
    }

    #[test]
    fn test_empty_dashboard_rejected() {
        let json = r#"{ "uuidKey": "k", "tables": [] }"#;
        assert!(DashboardConfig::from_json_str(json).is_err());
    }
}
