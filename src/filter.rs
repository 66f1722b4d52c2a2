// Record filtering: free text, calendar date and price range

use crate::record::{Record, RecordLayout};
use crate::sort::SortOrder;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use tracing::debug;

/// Price limit used when a collection has no positive price
pub const DEFAULT_PRICE_LIMIT: f64 = 1000.0;

/// User-chosen predicates applied before display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterState {
    /// Case-insensitive substring matched against the layout's search fields
    pub search_term: String,
    /// Calendar day the layout's date field must fall on
    pub selected_date: Option<NaiveDate>,
    /// Bounds used by `price_condition`
    pub price_range: PriceRange,
    /// How a record's price is compared against `price_range`
    pub price_condition: PriceCondition,
    /// Ordering applied after filtering
    pub sort_order: SortOrder,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            selected_date: None,
            price_range: PriceRange::new(0.0, DEFAULT_PRICE_LIMIT),
            price_condition: PriceCondition::Eq,
            sort_order: SortOrder::None,
        }
    }
}

impl FilterState {
    /// Default state with the price range opened up to `limit`
    pub fn with_price_limit(limit: f64) -> Self {
        Self {
            price_range: PriceRange::new(0.0, limit),
            ..Self::default()
        }
    }
}

/// Comparison modes for the price filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceCondition {
    /// min <= price <= max
    #[default]
    Eq,
    /// price < max
    Lt,
    /// price > min
    Gt,
    /// price <= max
    Lte,
    /// price >= min
    Gte,
    /// Any mode this build does not know; every priced record passes
    #[serde(other)]
    Unrecognized,
}

impl PriceCondition {
    /// Whether `price` satisfies this condition under `range`
    ///
    /// A mode that needs a bound the range does not have rejects the price.
    pub fn matches(self, price: f64, range: &PriceRange) -> bool {
        match (self, range.min, range.max) {
            (PriceCondition::Eq, Some(min), Some(max)) => min <= price && price <= max,
            (PriceCondition::Lt, _, Some(max)) => price < max,
            (PriceCondition::Gt, Some(min), _) => price > min,
            (PriceCondition::Lte, _, Some(max)) => price <= max,
            (PriceCondition::Gte, Some(min), _) => price >= min,
            (PriceCondition::Unrecognized, _, _) => true,
            _ => false,
        }
    }
}

impl FromStr for PriceCondition {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "eq" => PriceCondition::Eq,
            "lt" => PriceCondition::Lt,
            "gt" => PriceCondition::Gt,
            "lte" => PriceCondition::Lte,
            "gte" => PriceCondition::Gte,
            _ => PriceCondition::Unrecognized,
        })
    }
}

impl std::fmt::Display for PriceCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceCondition::Eq => write!(f, "between"),
            PriceCondition::Lt => write!(f, "<"),
            PriceCondition::Gt => write!(f, ">"),
            PriceCondition::Lte => write!(f, "<="),
            PriceCondition::Gte => write!(f, ">="),
            PriceCondition::Unrecognized => write!(f, "any"),
        }
    }
}

/// Lower and upper price bounds
///
/// Values built through [`PriceRange::new`], [`PriceRange::set_min`] and
/// [`PriceRange::set_max`] always satisfy `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Apply a manually entered lower bound
    ///
    /// Missing or invalid input resets to 0, negatives clamp to 0 and a bound
    /// above the current max is pulled down to it.
    pub fn set_min(&mut self, value: Option<f64>, limit: f64) {
        let max = self.max.filter(|m| m.is_finite()).unwrap_or(limit);
        let min = value.filter(|v| v.is_finite()).map_or(0.0, |v| v.max(0.0));
        self.min = Some(min.min(max));
        self.max = Some(max);
    }

    /// Apply a manually entered upper bound
    ///
    /// Missing or invalid input resets to `limit`; the bound never drops below
    /// the current min nor rises above `limit`.
    pub fn set_max(&mut self, value: Option<f64>, limit: f64) {
        let min = self.min.filter(|m| m.is_finite()).unwrap_or(0.0);
        let max = value.filter(|v| v.is_finite()).map_or(limit, |v| v.max(0.0));
        let max = max.max(min).min(limit);
        self.min = Some(min.min(max));
        self.max = Some(max);
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self::new(0.0, DEFAULT_PRICE_LIMIT)
    }
}

/// Upper price limit for a collection: the highest price rounded up to the next 100
///
/// Falls back to [`DEFAULT_PRICE_LIMIT`] when nothing has a positive price.
pub fn price_ceiling(records: &[Value], layout: &RecordLayout) -> f64 {
    let max = records
        .iter()
        .filter_map(|r| layout.price(r))
        .fold(0.0_f64, f64::max);
    let ceiling = (max / 100.0).ceil() * 100.0;
    if ceiling > 0.0 { ceiling } else { DEFAULT_PRICE_LIMIT }
}

/// Apply text, date and price predicates, in that order, keeping input order
///
/// The price predicate always runs: a record without a finite price never passes.
pub fn filter_records<'a, I>(records: I, state: &FilterState, layout: &RecordLayout) -> Vec<&'a Value>
where
    I: IntoIterator<Item = &'a Value>,
{
    let needle = state.search_term.to_lowercase();

    let result: Vec<&Value> = records
        .into_iter()
        .filter(|r| needle.is_empty() || matches_text(r, &needle, layout))
        .filter(|r| state.selected_date.is_none_or(|day| matches_date(r, day, layout)))
        .filter(|r| {
            layout
                .price(r)
                .is_some_and(|price| state.price_condition.matches(price, &state.price_range))
        })
        .collect();

    debug!(
        kept = result.len(),
        search = %state.search_term,
        condition = %state.price_condition,
        "filter_records: applied"
    );
    result
}

fn matches_text(record: &Value, needle: &str, layout: &RecordLayout) -> bool {
    layout
        .search_fields
        .iter()
        .filter_map(|field| record.str_at(field))
        .any(|s| s.to_lowercase().contains(needle))
}

fn matches_date(record: &Value, day: NaiveDate, layout: &RecordLayout) -> bool {
    record.str_at(&layout.date_field).and_then(calendar_day) == Some(day)
}

/// Calendar day of a date or date-time string, ignoring time of day and offset
pub fn calendar_day(s: &str) -> Option<NaiveDate> {
    let day = s.trim().split(['T', ' ']).next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Product status tabs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusTab {
    #[default]
    All,
    Published,
    Draft,
    LowStock,
    OutOfStock,
}

impl StatusTab {
    /// Status value this tab selects, or `None` for all records
    pub fn status(self) -> Option<&'static str> {
        match self {
            StatusTab::All => None,
            StatusTab::Published => Some("published"),
            StatusTab::Draft => Some("draft"),
            StatusTab::LowStock => Some("low stock"),
            StatusTab::OutOfStock => Some("out of stock"),
        }
    }
}

/// Keep records whose status field matches the tab, case-insensitively
///
/// Layouts without a status field pass everything through.
pub fn filter_by_status<'a>(records: &'a [Value], tab: StatusTab, layout: &RecordLayout) -> Vec<&'a Value> {
    match (tab.status(), layout.status_field.as_deref()) {
        (Some(wanted), Some(field)) => records
            .iter()
            .filter(|r| r.str_at(field).is_some_and(|s| s.to_lowercase() == wanted))
            .collect(),
        _ => records.iter().collect(),
    }
}
