// Read-only dashboard datasets

use crate::catalog::{normalize_order, now_ms};
use crate::error::StoreError;
use crate::store::DocumentStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Document holding the recent orders table
pub const RECENT_ORDERS_FILE: &str = "recentOrders.json";

/// Datasets the dashboard widgets read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dataset {
    RecentOrders,
    Chart,
    Revenue,
    TopProducts,
}

impl Dataset {
    pub const ALL: [Dataset; 4] = [Dataset::RecentOrders, Dataset::Chart, Dataset::Revenue, Dataset::TopProducts];

    /// Document backing this dataset
    pub fn file_name(self) -> &'static str {
        match self {
            Dataset::RecentOrders => RECENT_ORDERS_FILE,
            Dataset::Chart => "chartData.json",
            Dataset::Revenue => "targetRevenueData.json",
            Dataset::TopProducts => "topProduct.json",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Dataset::RecentOrders => "recent-orders",
            Dataset::Chart => "chart",
            Dataset::Revenue => "revenue",
            Dataset::TopProducts => "top-products",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Dataset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dataset::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| format!("unknown dataset: {}", s))
    }
}

/// Dashboard reader over a document store
pub struct Dashboard<S> {
    store: S,
    orders_file: String,
}

impl<S: DocumentStore> Dashboard<S> {
    pub fn new(store: S) -> Self {
        Self::with_orders_file(store, RECENT_ORDERS_FILE)
    }

    /// Read recent orders from `orders_file` instead of the default document
    pub fn with_orders_file(store: S, orders_file: impl Into<String>) -> Self {
        Self {
            store,
            orders_file: orders_file.into(),
        }
    }

    /// Document this dashboard reads for `dataset`
    pub fn file_for(&self, dataset: Dataset) -> &str {
        match dataset {
            Dataset::RecentOrders => &self.orders_file,
            other => other.file_name(),
        }
    }

    /// Dataset document; `Ok(None)` when the file is missing
    ///
    /// Recent orders come back normalized like [`Dashboard::recent_orders`];
    /// the other datasets are returned as stored.
    pub fn dataset(&self, dataset: Dataset) -> Result<Option<Value>, StoreError> {
        let file = self.file_for(dataset);
        let Some(value) = self.store.read(file)? else {
            warn!(%dataset, file, "Dashboard dataset not found");
            return Ok(None);
        };
        match (dataset, value) {
            (Dataset::RecentOrders, Value::Array(orders)) => {
                let ts = now_ms();
                Ok(Some(Value::Array(
                    orders
                        .into_iter()
                        .enumerate()
                        .map(|(i, order)| normalize_order(order, i, ts))
                        .collect(),
                )))
            }
            (_, value) => Ok(Some(value)),
        }
    }

    /// Recent orders with ids and numeric totals filled in
    ///
    /// A missing document yields an empty table rather than an error.
    pub fn recent_orders(&self) -> Result<Vec<Value>, StoreError> {
        let ts = now_ms();
        Ok(self
            .store
            .read_collection(&self.orders_file)?
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, order)| normalize_order(order, i, ts))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[test]
    fn test_missing_recent_orders_is_empty() {
        let dashboard = Dashboard::new(MemoryStore::new());
        assert!(dashboard.recent_orders().unwrap().is_empty());
    }

    #[test]
    fn test_recent_orders_are_normalized() {
        let store = MemoryStore::new().with_document(
            RECENT_ORDERS_FILE,
            json!([{"id": "#302012", "total": 121}, {"total": "oops"}]),
        );
        let orders = Dashboard::new(store).recent_orders().unwrap();

        assert_eq!(orders[0].id(), Some("#302012"));
        assert!(orders[1].id().unwrap().starts_with("order-"));
        assert_eq!(orders[1].number_at("total"), Some(0.0));
    }

    #[test]
    fn test_custom_orders_file() {
        let store = MemoryStore::new().with_document("orders-2024.json", json!([{"id": "a", "total": 1}]));
        let orders = Dashboard::with_orders_file(store, "orders-2024.json").recent_orders().unwrap();

        assert_eq!(orders.len(), 1);
    }

    #[test]
    fn test_recent_orders_dataset_uses_orders_file() {
        let store = MemoryStore::new()
            .with_document(RECENT_ORDERS_FILE, json!([{"id": "stale", "total": 1}]))
            .with_document("orders-2024.json", json!([{"total": "12"}]));
        let dashboard = Dashboard::with_orders_file(store, "orders-2024.json");

        assert_eq!(dashboard.file_for(Dataset::RecentOrders), "orders-2024.json");
        assert_eq!(dashboard.file_for(Dataset::Chart), "chartData.json");

        let orders = dashboard.dataset(Dataset::RecentOrders).unwrap().unwrap();
        let orders = orders.as_array().unwrap();
        assert_eq!(orders.len(), 1);
        assert!(orders[0].id().unwrap().starts_with("order-"));
        assert_eq!(orders[0].number_at("total"), Some(0.0));
    }

    #[test]
    fn test_missing_dataset_is_none() {
        let dashboard = Dashboard::new(MemoryStore::new());
        assert!(dashboard.dataset(Dataset::Chart).unwrap().is_none());
    }

    #[test]
    fn test_dataset_is_returned_verbatim() {
        let revenue = json!({"target": 20000, "revenue": 16000});
        let store = MemoryStore::new().with_document("targetRevenueData.json", revenue.clone());

        assert_eq!(Dashboard::new(store).dataset(Dataset::Revenue).unwrap(), Some(revenue));
    }

    #[test]
    fn test_dataset_names() {
        for dataset in Dataset::ALL {
            assert_eq!(dataset.to_string().parse::<Dataset>().unwrap(), dataset);
        }
        assert!("sales".parse::<Dataset>().is_err());
    }
}
