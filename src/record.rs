// Open-schema record accessors and per-view field layout

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Read access to an open-schema record
///
/// Records are plain JSON values; nothing about their shape is enforced beyond
/// what each accessor checks at lookup time.
pub trait Record {
    /// Look up a value by dot path, walking objects only
    fn lookup(&self, path: &str) -> Option<&Value>;

    /// Identifier of this record, if it has a string `id`
    fn id(&self) -> Option<&str> {
        self.lookup("id").and_then(Value::as_str)
    }

    /// String at `path`, if present and a string
    fn str_at(&self, path: &str) -> Option<&str> {
        self.lookup(path).and_then(Value::as_str)
    }

    /// Finite number at `path`; strings, null, NaN and infinities count as absent
    fn number_at(&self, path: &str) -> Option<f64> {
        self.lookup(path).and_then(Value::as_f64).filter(|n| n.is_finite())
    }
}

impl Record for Value {
    fn lookup(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return None;
        }
        path.split('.')
            .try_fold(self, |current, key| current.as_object()?.get(key))
            .filter(|v| !v.is_null())
    }
}

/// Which fields of a record the grid engine reads
///
/// The same filter/sort/paginate pipeline serves products and orders; the layout
/// is the only thing that differs between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordLayout {
    /// Fields matched by the free-text filter
    pub search_fields: Vec<String>,
    /// Field compared by the date filter
    pub date_field: String,
    /// Numeric accessor fallbacks; the first finite number wins
    pub price_fields: Vec<String>,
    /// Field read by status tabs, if the view has them
    pub status_field: Option<String>,
}

impl RecordLayout {
    /// Layout of the product catalog
    pub fn products() -> Self {
        Self {
            search_fields: vec![
                "product.name".to_string(),
                "inventory.sku".to_string(),
                "sidebar.category".to_string(),
            ],
            date_field: "addedDate".to_string(),
            price_fields: vec!["total".to_string(), "pricing.price".to_string()],
            status_field: Some("sidebar.status".to_string()),
        }
    }

    /// Layout of the recent orders table
    pub fn orders() -> Self {
        Self {
            search_fields: vec![
                "product.name".to_string(),
                "customer.name".to_string(),
                "id".to_string(),
            ],
            date_field: "date".to_string(),
            price_fields: vec!["total".to_string()],
            status_field: None,
        }
    }

    /// Price of a record under this layout
    ///
    /// The first price field that is present and not null decides; if it
    /// holds anything but a finite number the record has no price.
    pub fn price(&self, record: &Value) -> Option<f64> {
        self.price_fields
            .iter()
            .find_map(|field| record.lookup(field))
            .and_then(Value::as_f64)
            .filter(|n| n.is_finite())
    }
}
