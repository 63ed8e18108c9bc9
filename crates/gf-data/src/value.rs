//! Cell value projections
//!
//! Range sliders work on a linear `f64` scale: numbers as-is, dates as epoch
//! milliseconds and time-only columns as milliseconds since midnight UTC.
//! The text boxes next to a slider use the fixed patterns below (all UTC):
//!
//! | granularity | text                      |
//! |-------------|---------------------------|
//! | date        | `DD.MM.YYYY`              |
//! | datetime    | `DD.MM.YYYYTHH:MM:SS.mmm` |
//! | time        | `HH:MM:SS.mmm`            |

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use gf_core::{ColumnKind, DateGranularity, FilterableColumn, NumberFormat};
use serde_json::Value;

pub const MILLIS_PER_DAY: i64 = 86_400_000;

const DATE_FORMAT: &str = "%d.%m.%Y";
const DATETIME_FORMATS: [&str; 3] = ["%d.%m.%YT%H:%M:%S%.f", "%d.%m.%YT%H:%M:%S", "%d.%m.%YT%H:%M"];
const TIME_FORMATS: [&str; 3] = ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

/// Text key of a cell, as used by set filters
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Position of a cell on the column's linear scale
pub fn linear_value(cell: &Value, column: &FilterableColumn) -> Option<f64> {
    match column.kind {
        ColumnKind::Text | ColumnKind::Number => number_cell(cell),
        ColumnKind::Date => {
            if column.granularity == DateGranularity::Time {
                if let Some(millis) = cell.as_str().and_then(|s| parse_time_of_day(s.trim())) {
                    return Some(millis as f64);
                }
                let millis = date_cell(cell)?;
                Some(millis.rem_euclid(MILLIS_PER_DAY) as f64)
            } else {
                date_cell(cell).map(|millis| millis as f64)
            }
        }
    }
}

fn number_cell(cell: &Value) -> Option<f64> {
    let value = match cell {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

fn date_cell(cell: &Value) -> Option<i64> {
    match cell {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        Value::String(s) => parse_date_cell(s.trim()),
        _ => None,
    }
}

fn parse_date_cell(s: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive).timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive).timestamp_millis())
}

fn parse_time_of_day(s: &str) -> Option<i64> {
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(s, format).ok())
        .map(time_millis)
}

fn time_millis(time: NaiveTime) -> i64 {
    time.num_seconds_from_midnight() as i64 * 1000 + (time.nanosecond() / 1_000_000) as i64
}

/// Display text of a slider value
pub fn format_value(value: f64, column: &FilterableColumn) -> String {
    match column.kind {
        ColumnKind::Number => format_number(value, &column.number_format),
        ColumnKind::Date => format_date(value, column.granularity),
        ColumnKind::Text => plain_number(value),
    }
}

/// Text shown while the user edits a slider value
pub fn edit_text(value: f64, column: &FilterableColumn) -> String {
    match column.kind {
        ColumnKind::Date => format_date(value, column.granularity),
        ColumnKind::Number | ColumnKind::Text => plain_number(value),
    }
}

/// Parse typed slider text; `None` for anything malformed
pub fn parse_value(text: &str, column: &FilterableColumn) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    match column.kind {
        ColumnKind::Number | ColumnKind::Text => parse_number(text, &column.number_format),
        ColumnKind::Date => parse_date(text, column.granularity),
    }
}

fn parse_date(text: &str, granularity: DateGranularity) -> Option<f64> {
    let millis = match granularity {
        DateGranularity::Date => NaiveDate::parse_from_str(text, DATE_FORMAT)
            .ok()?
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive).timestamp_millis())?,
        DateGranularity::Datetime => DATETIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
            .map(|naive| Utc.from_utc_datetime(&naive).timestamp_millis())?,
        DateGranularity::Time => parse_time_of_day(text)?,
    };
    Some(millis as f64)
}

fn format_date(value: f64, granularity: DateGranularity) -> String {
    if !value.is_finite() {
        return String::new();
    }

    let millis = value.round() as i64;
    let Some(dt) = Utc.timestamp_millis_opt(millis).single() else {
        return plain_number(value);
    };

    match granularity {
        DateGranularity::Date => dt.format(DATE_FORMAT).to_string(),
        DateGranularity::Datetime => dt.format("%d.%m.%YT%H:%M:%S%.3f").to_string(),
        DateGranularity::Time => dt.format("%H:%M:%S%.3f").to_string(),
    }
}

fn plain_number(value: f64) -> String {
    format!("{}", value)
}

/// Format a number according to the column's display settings
pub fn format_number(value: f64, format: &NumberFormat) -> String {
    if !value.is_finite() {
        return String::new();
    }

    let negative = value < 0.0;
    let magnitude = value.abs();

    let body = if format.compact && magnitude >= 1_000.0 {
        let (scaled, unit) = if magnitude >= 1e12 {
            (magnitude / 1e12, "T")
        } else if magnitude >= 1e9 {
            (magnitude / 1e9, "B")
        } else if magnitude >= 1e6 {
            (magnitude / 1e6, "M")
        } else {
            (magnitude / 1e3, "K")
        };
        format!("{}{}", fixed_digits(scaled, 0, 1, false), unit)
    } else {
        fixed_digits(
            magnitude,
            format.min_fraction_digits,
            format.max_fraction_digits.max(format.min_fraction_digits),
            format.grouping,
        )
    };

    let sign = if negative && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    format!("{}{}{}{}", sign, format.prefix, body, format.suffix)
}

fn fixed_digits(value: f64, min_fraction: usize, max_fraction: usize, grouping: bool) -> String {
    let rendered = format!("{:.*}", max_fraction, value);
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (rendered, String::new()),
    };

    let mut frac = frac_part;
    while frac.len() > min_fraction && frac.ends_with('0') {
        frac.pop();
    }

    let int_part = if grouping { group_thousands(&int_part) } else { int_part };

    if frac.is_empty() {
        int_part
    } else {
        format!("{}.{}", int_part, frac)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Parse number text, tolerating the format's prefix/suffix, grouping
/// separators and compact units
pub fn parse_number(text: &str, format: &NumberFormat) -> Option<f64> {
    let mut s = text.trim();

    let negative = s.starts_with('-');
    if negative {
        s = s[1..].trim_start();
    }
    if !format.prefix.is_empty() {
        s = s.strip_prefix(format.prefix.as_str()).unwrap_or(s);
    }
    if !format.suffix.is_empty() {
        s = s.strip_suffix(format.suffix.as_str()).unwrap_or(s);
    }

    let cleaned: String = s.chars().filter(|c| !matches!(c, ',' | '_' | ' ')).collect();

    let (digits, multiplier) = match cleaned.chars().last() {
        Some('K') | Some('k') => (&cleaned[..cleaned.len() - 1], 1e3),
        Some('M') | Some('m') => (&cleaned[..cleaned.len() - 1], 1e6),
        Some('B') | Some('b') => (&cleaned[..cleaned.len() - 1], 1e9),
        Some('T') | Some('t') => (&cleaned[..cleaned.len() - 1], 1e12),
        _ => (cleaned.as_str(), 1.0),
    };

    // Reject things f64::from_str would accept but a user never means
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-')) {
        return None;
    }

    let value = digits.parse::<f64>().ok()? * multiplier;
    if !value.is_finite() {
        return None;
    }
    Some(if negative { -value } else { value })
}
