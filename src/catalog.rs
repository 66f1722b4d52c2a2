// Product catalog operations over a document store

use crate::error::CatalogError;
use crate::path::{Intermediate, set_nested_value_with};
use crate::record::Record;
use crate::store::DocumentStore;
use serde_json::{Map, Value, json};
use tracing::{debug, info};

/// Document holding the product catalog
pub const PRODUCTS_FILE: &str = "Products.json";

/// Product collection backed by a single JSON document
///
/// Every mutation reads the whole collection, changes it and writes it back.
pub struct Catalog<S> {
    store: S,
    file: String,
}

impl<S: DocumentStore> Catalog<S> {
    pub fn new(store: S) -> Self {
        Self::with_file(store, PRODUCTS_FILE)
    }

    pub fn with_file(store: S, file: impl Into<String>) -> Self {
        Self {
            store,
            file: file.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// All products, or an empty list when the document does not exist yet
    pub fn list(&self) -> Result<Vec<Value>, CatalogError> {
        Ok(self.store.read_collection(&self.file)?.unwrap_or_default())
    }

    /// All products with legacy flat fields lifted into their nested sections
    pub fn load(&self) -> Result<Vec<Value>, CatalogError> {
        let ts = now_ms();
        Ok(self
            .list()?
            .into_iter()
            .enumerate()
            .map(|(i, item)| normalize_product(item, i, ts))
            .collect())
    }

    /// One product, normalized the same way [`Catalog::load`] shows it
    ///
    /// Accepts any id `load` reports: a stored `id`, a legacy `_id`, or the
    /// generated `prod-<ts>-<index>` of a record that has neither.
    pub fn get(&self, id: &str) -> Result<Option<Value>, CatalogError> {
        let products = self.list()?;
        let Some(index) = position(&products, id) else {
            return Ok(None);
        };
        let product = products.into_iter().nth(index).map(|p| {
            let mut product = normalize_product(p, index, now_ms());
            if let Value::Object(map) = &mut product {
                map.insert("id".to_string(), Value::String(id.to_string()));
            }
            product
        });
        Ok(product)
    }

    /// Add a product under a freshly generated id, ignoring any id in `data`
    pub fn create(&self, data: Value) -> Result<Value, CatalogError> {
        let mut product = validate_product(data)?;
        let id = generate_id();
        if let Value::Object(map) = &mut product {
            map.insert("id".to_string(), Value::String(id.clone()));
        }

        let mut products = self.list()?;
        products.push(product.clone());
        self.store.write_collection(&self.file, &products)?;

        info!(id = %id, file = %self.file, "Added product");
        Ok(product)
    }

    /// Shallow-merge `data` over the stored product
    ///
    /// Top-level keys in `data` replace the stored ones; the id never changes.
    /// Returns `Ok(None)` when no product has this id.
    pub fn update(&self, id: &str, data: Value) -> Result<Option<Value>, CatalogError> {
        let data = validate_product(data)?;
        let mut products = self.list()?;

        let Some(existing) = position(&products, id).and_then(|i| products.get_mut(i)) else {
            debug!(id, "update: product not found");
            return Ok(None);
        };

        let mut merged = existing.as_object().cloned().unwrap_or_default();
        if let Value::Object(fields) = data {
            merged.extend(fields);
        }
        merged.insert("id".to_string(), Value::String(id.to_string()));
        *existing = Value::Object(merged);
        let updated = existing.clone();

        self.store.write_collection(&self.file, &products)?;
        info!(id, file = %self.file, "Updated product");
        Ok(Some(updated))
    }

    /// Remove a product; `Ok(false)` when no product has this id
    pub fn delete(&self, id: &str) -> Result<bool, CatalogError> {
        let mut products = self.list()?;
        let Some(index) = position(&products, id) else {
            debug!(id, "delete: product not found");
            return Ok(false);
        };
        products.remove(index);

        self.store.write_collection(&self.file, &products)?;
        info!(id, file = %self.file, "Deleted product");
        Ok(true)
    }

    /// Set one nested field of a stored product and save it
    pub fn set_field(
        &self,
        id: &str,
        path: &str,
        value: Value,
        policy: Intermediate,
    ) -> Result<Option<Value>, CatalogError> {
        let Some(product) = self.get(id)? else {
            return Ok(None);
        };
        let changed = set_nested_value_with(&product, path, value, policy)?;
        self.update(id, changed)
    }
}

/// Id a stored record answers to: `id`, else a legacy `_id`
fn stored_id(product: &Value) -> Option<&str> {
    let Value::Object(map) = product else {
        return None;
    };
    ["id", "_id"]
        .into_iter()
        .find_map(|key| map.get(key).and_then(Value::as_str).filter(|s| !s.is_empty()))
}

/// Index of the record `id` names, including generated `prod-<ts>-<index>` ids
fn position(products: &[Value], id: &str) -> Option<usize> {
    products.iter().position(|p| stored_id(p) == Some(id)).or_else(|| {
        let index = generated_index(id)?;
        products
            .get(index)
            .filter(|p| p.is_object() && stored_id(p).is_none())
            .map(|_| index)
    })
}

fn generated_index(id: &str) -> Option<usize> {
    let (ts, index) = id.strip_prefix("prod-")?.split_once('-')?;
    ts.parse::<i64>().ok()?;
    index.parse().ok()
}

/// Presence checks for submitted product data
fn validate_product(data: Value) -> Result<Value, CatalogError> {
    if !data.is_object() {
        return Err(CatalogError::Invalid("product data must be a JSON object".to_string()));
    }
    match data.str_at("product.name") {
        Some(name) if !name.trim().is_empty() => Ok(data),
        _ => Err(CatalogError::Invalid("product name is required".to_string())),
    }
}

/// Server-side product id: `prod_<ms>_<7 random chars>`
fn generate_id() -> String {
    let random = uuid::Uuid::now_v7().simple().to_string();
    format!("prod_{}_{}", now_ms(), &random[random.len() - 7..])
}

/// Fill the nested sections the product grid reads from legacy flat fields
///
/// Existing sections are left alone. Records without an id get
/// `prod-<ts>-<index>`. Non-object items are returned unchanged.
pub fn normalize_product(item: Value, index: usize, ts: i64) -> Value {
    let Value::Object(mut map) = item else {
        return item;
    };

    if !has_text(&map, "id") {
        let id = map
            .get("_id")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .unwrap_or_else(|| format!("prod-{}-{}", ts, index));
        map.insert("id".to_string(), Value::String(id));
    }

    let sections: [(&str, &[(&str, &str)]); 4] = [
        ("product", &[("name", "name"), ("image", "image"), ("variants", "variantsCount")]),
        ("inventory", &[("sku", "sku"), ("quantity", "stock")]),
        ("sidebar", &[("category", "category"), ("status", "status")]),
        ("pricing", &[("price", "price")]),
    ];
    for (section, fields) in sections {
        if is_present(&map, section) {
            continue;
        }
        let lifted: Map<String, Value> = fields
            .iter()
            .filter_map(|(to, from)| {
                map.get(*from)
                    .filter(|v| !v.is_null())
                    .map(|v| (to.to_string(), v.clone()))
            })
            .collect();
        map.insert(section.to_string(), Value::Object(lifted));
    }

    if !is_present(&map, "addedDate") {
        if let Some(created) = map.get("createdAt").filter(|v| !v.is_null()).cloned() {
            map.insert("addedDate".to_string(), created);
        }
    }

    Value::Object(map)
}

/// Give an order an id and a numeric total
///
/// Records without an id get `order-<ts>-<index>`; a missing or non-numeric
/// total becomes 0.
pub fn normalize_order(item: Value, index: usize, ts: i64) -> Value {
    let Value::Object(mut map) = item else {
        return item;
    };

    if !has_text(&map, "id") {
        map.insert("id".to_string(), Value::String(format!("order-{}-{}", ts, index)));
    }
    if !map.get("total").is_some_and(Value::is_number) {
        map.insert("total".to_string(), json!(0));
    }

    Value::Object(map)
}

fn is_present(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key).is_some_and(|v| !v.is_null())
}

fn has_text(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key).and_then(Value::as_str).is_some_and(|s| !s.is_empty())
}

/// Current time in milliseconds since the Unix epoch
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
