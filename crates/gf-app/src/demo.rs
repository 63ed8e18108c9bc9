//! Demo dashboard
//! Synthetic order and shipment tables used when no config file is given

use chrono::{Duration, NaiveDate};
use gf_data::{ColumnConfig, ColumnFormatter, DashboardConfig, TableConfig};
use gf_core::{ColumnKind, DateGranularity, NumberFormat};
use serde_json::{json, Map, Value};

const REGIONS: [&str; 5] = ["North", "South", "East", "West", "Central"];
const STATUSES: [&str; 4] = ["open", "shipped", "delivered", "returned"];
const CARRIERS: [&str; 3] = ["Parcelline", "RoadRunner", "SkyFreight"];

fn column(field: &str, header: &str, filter: Option<ColumnKind>) -> ColumnConfig {
    ColumnConfig {
        field_name: field.to_string(),
        header_name: Some(header.to_string()),
        visible: true,
        filter,
        formatter: None,
        filter_include: Vec::new(),
        filter_exclude: Vec::new(),
    }
}

fn row(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn orders(count: usize) -> TableConfig {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default();

    let rows = (0..count)
        .map(|i| {
            let ordered = start + Duration::days((i * 7 % 365) as i64);
            // Every 23rd order has no region recorded
            let region = if i % 23 == 0 { "" } else { REGIONS[i % REGIONS.len()] };
            let amount = ((i * 37 % 500) as f64 * 4.25 + 10.0 * (i % 3) as f64).round() / 2.0;

            row(json!({
                "id": i + 1,
                "region": region,
                "status": STATUSES[(i / 3) % STATUSES.len()],
                "amount": amount,
                "quantity": 1 + i * 13 % 40,
                "ordered": ordered.format("%Y-%m-%d").to_string(),
                "pickup": format!("{:02}:{:02}:00", 6 + i % 14, i * 5 % 60),
            }))
        })
        .collect();

    let mut amount = column("amount", "Amount", Some(ColumnKind::Number));
    amount.formatter = Some(ColumnFormatter::Number(NumberFormat {
        min_fraction_digits: 2,
        max_fraction_digits: 2,
        grouping: true,
        prefix: "$".to_string(),
        ..NumberFormat::default()
    }));

    let mut ordered = column("ordered", "Ordered", Some(ColumnKind::Date));
    ordered.formatter = Some(ColumnFormatter::Granularity(DateGranularity::Date));

    let mut pickup = column("pickup", "Pickup", Some(ColumnKind::Date));
    pickup.formatter = Some(ColumnFormatter::Granularity(DateGranularity::Time));

    let mut status = column("status", "Status", Some(ColumnKind::Text));
    status.filter_exclude = vec!["returned".to_string()];

    TableConfig {
        name: "Orders".to_string(),
        key: None,
        columns: vec![
            column("id", "Order", None),
            column("region", "Region", Some(ColumnKind::Text)),
            status,
            amount,
            column("quantity", "Quantity", Some(ColumnKind::Number)),
            ordered,
            pickup,
        ],
        rows,
        column_filter: true,
    }
}

fn shipments(count: usize) -> TableConfig {
    let start = NaiveDate::from_ymd_opt(2023, 3, 1)
        .and_then(|date| date.and_hms_opt(8, 0, 0))
        .unwrap_or_default();

    let rows = (0..count)
        .map(|i| {
            let departed = start + Duration::minutes((i * 311) as i64);
            row(json!({
                "carrier": CARRIERS[i % CARRIERS.len()],
                "weight": (i * 17 % 90) as f64 / 4.0 + 0.5,
                "departed": departed.format("%Y-%m-%dT%H:%M:%S").to_string(),
            }))
        })
        .collect();

    let mut weight = column("weight", "Weight", Some(ColumnKind::Number));
    weight.formatter = Some(ColumnFormatter::Number(NumberFormat {
        max_fraction_digits: 1,
        suffix: " kg".to_string(),
        ..NumberFormat::default()
    }));

    let mut departed = column("departed", "Departed", Some(ColumnKind::Date));
    departed.formatter = Some(ColumnFormatter::Granularity(DateGranularity::Datetime));

    TableConfig {
        name: "Shipments".to_string(),
        key: Some("demo-shipments".to_string()),
        columns: vec![column("carrier", "Carrier", Some(ColumnKind::Text)), weight, departed],
        rows,
        column_filter: false,
    }
}

/// Two tables under tabs
pub fn demo_config() -> DashboardConfig {
    DashboardConfig {
        key: "gridfilter-demo".to_string(),
        name: "Grid Filter Demo".to_string(),
        tables: vec![orders(240), shipments(120)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_config_is_valid() {
        let config = demo_config();
        let json = serde_json::to_string(&config).unwrap();
        let parsed = DashboardConfig::from_json_str(&json).unwrap();

        assert_eq!(parsed.tables.len(), 2);
        assert_eq!(parsed.tables[0].filterable_columns().len(), 6);
        assert_eq!(parsed.tables[0].initial_filters().len(), 1);
        assert_eq!(parsed.table_key(1), "demo-shipments");
    }
}
