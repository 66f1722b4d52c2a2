// Record ordering by price and by table column

use crate::filter::calendar_day;
use crate::record::{Record, RecordLayout};
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::str::FromStr;

/// Direction of the price sort
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Keep input order
    #[default]
    #[serde(rename = "")]
    None,
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(SortOrder::None),
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order: {}", other)),
        }
    }
}

/// Sort records by the layout's price accessor
///
/// Records without a price rank above every number, so they go last when
/// ascending and first when descending. The sort is stable, so equal prices
/// keep their input order.
pub fn sort_records(records: &mut [&Value], order: SortOrder, layout: &RecordLayout) {
    if order == SortOrder::None {
        return;
    }
    records.sort_by(|a, b| {
        let pa = layout.price(a).unwrap_or(f64::INFINITY);
        let pb = layout.price(b).unwrap_or(f64::INFINITY);
        let ordering = pa.total_cmp(&pb);
        if order == SortOrder::Desc { ordering.reverse() } else { ordering }
    });
}

/// Comparator for a sortable table column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSort {
    /// Numeric field; missing values sort before any number
    Numeric(String),
    /// Object field compared by its case-insensitive `name`
    NestedName(String),
    /// Date or date-time string; unparseable values sort earliest
    DateTime(String),
}

impl ColumnSort {
    /// Compare two records in ascending column order
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        match self {
            ColumnSort::Numeric(path) => match (a.number_at(path), b.number_at(path)) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(x), Some(y)) => x.total_cmp(&y),
            },
            ColumnSort::NestedName(path) => {
                let name = |r: &Value| {
                    r.lookup(path)
                        .and_then(|v| v.str_at("name"))
                        .map(str::to_lowercase)
                        .unwrap_or_default()
                };
                name(a).cmp(&name(b))
            }
            ColumnSort::DateTime(path) => {
                let time = |r: &Value| r.str_at(path).and_then(timestamp_ms).unwrap_or(i64::MIN);
                time(a).cmp(&time(b))
            }
        }
    }
}

/// Sort records by a column, ascending unless `descending`
pub fn sort_by_column(records: &mut [&Value], column: &ColumnSort, descending: bool) {
    records.sort_by(|a, b| {
        let ordering = column.compare(a, b);
        if descending { ordering.reverse() } else { ordering }
    });
}

/// Milliseconds since the epoch for RFC 3339, naive date-time or plain date strings
fn timestamp_ms(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    calendar_day(s)
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn totals(records: &[&Value]) -> Vec<Option<f64>> {
        records.iter().map(|r| r.number_at("total")).collect()
    }

    #[test]
    fn test_ascending_puts_missing_last() {
        let records = vec![json!({"total": null}), json!({"total": 5}), json!({"total": 1})];
        let mut refs: Vec<&Value> = records.iter().collect();

        sort_records(&mut refs, SortOrder::Asc, &RecordLayout::orders());
        assert_eq!(totals(&refs), vec![Some(1.0), Some(5.0), None]);
    }

    #[test]
    fn test_descending_puts_missing_first() {
        let records = vec![json!({"total": 1}), json!({"total": "n/a"}), json!({"total": 5})];
        let mut refs: Vec<&Value> = records.iter().collect();

        sort_records(&mut refs, SortOrder::Desc, &RecordLayout::orders());
        assert_eq!(totals(&refs), vec![None, Some(5.0), Some(1.0)]);
    }

    #[test]
    fn test_descending_keeps_missing_in_input_order() {
        let records = vec![
            json!({"id": "a", "total": 3}),
            json!({"id": "b"}),
            json!({"id": "c", "total": 9}),
            json!({"id": "d", "total": null}),
        ];
        let mut refs: Vec<&Value> = records.iter().collect();

        sort_records(&mut refs, SortOrder::Desc, &RecordLayout::orders());
        let ids: Vec<&str> = refs.iter().filter_map(|r| r.id()).collect();
        assert_eq!(ids, vec!["b", "d", "c", "a"]);
    }

    #[test]
    fn test_none_keeps_input_order() {
        let records = vec![json!({"total": 3}), json!({"total": 1}), json!({"total": 2})];
        let mut refs: Vec<&Value> = records.iter().collect();

        sort_records(&mut refs, SortOrder::None, &RecordLayout::orders());
        assert_eq!(totals(&refs), vec![Some(3.0), Some(1.0), Some(2.0)]);
    }

    #[test]
    fn test_sort_is_stable() {
        let records = vec![
            json!({"id": "a", "total": 2}),
            json!({"id": "b", "total": 1}),
            json!({"id": "c", "total": 2}),
            json!({"id": "d", "total": 1}),
        ];
        let mut refs: Vec<&Value> = records.iter().collect();

        sort_records(&mut refs, SortOrder::Desc, &RecordLayout::orders());
        let ids: Vec<&str> = refs.iter().filter_map(|r| r.id()).collect();
        assert_eq!(ids, vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn test_sort_order_parsing() {
        assert_eq!("".parse::<SortOrder>().unwrap(), SortOrder::None);
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("sideways".parse::<SortOrder>().is_err());

        let parsed: SortOrder = serde_json::from_str("\"\"").unwrap();
        assert_eq!(parsed, SortOrder::None);
        assert_eq!(serde_json::to_string(&SortOrder::Asc).unwrap(), "\"asc\"");
    }

    #[test]
    fn test_numeric_column_puts_missing_first() {
        let records = vec![json!({"stock": 4}), json!({}), json!({"stock": 2})];
        let mut refs: Vec<&Value> = records.iter().collect();

        sort_by_column(&mut refs, &ColumnSort::Numeric("stock".to_string()), false);
        let stock: Vec<Option<f64>> = refs.iter().map(|r| r.number_at("stock")).collect();
        assert_eq!(stock, vec![None, Some(2.0), Some(4.0)]);
    }

    #[test]
    fn test_nested_name_column() {
        let records = vec![
            json!({"product": {"name": "watch"}}),
            json!({"product": {"name": "Bag"}}),
            json!({"product": null}),
        ];
        let mut refs: Vec<&Value> = records.iter().collect();

        sort_by_column(&mut refs, &ColumnSort::NestedName("product".to_string()), false);
        let names: Vec<Option<&str>> = refs.iter().map(|r| r.str_at("product.name")).collect();
        assert_eq!(names, vec![None, Some("Bag"), Some("watch")]);
    }

    #[test]
    fn test_datetime_column() {
        let records = vec![
            json!({"addedDate": "2024-05-01T08:00:00Z"}),
            json!({"addedDate": "garbage"}),
            json!({"addedDate": "2023-12-24"}),
            json!({"addedDate": "2024-05-01 07:00:00"}),
        ];
        let mut refs: Vec<&Value> = records.iter().collect();

        sort_by_column(&mut refs, &ColumnSort::DateTime("addedDate".to_string()), true);
        let dates: Vec<&str> = refs.iter().filter_map(|r| r.str_at("addedDate")).collect();
        assert_eq!(
            dates,
            vec!["2024-05-01T08:00:00Z", "2024-05-01 07:00:00", "2023-12-24", "garbage"]
        );
    }
}
