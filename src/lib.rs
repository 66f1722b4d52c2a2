// CatalogStore - Product catalog and order grid engine over flat JSON documents

pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod pagination;
pub mod path;
pub mod record;
pub mod sort;
pub mod store;
pub mod view;

// Re-export main types for convenience
pub use catalog::{Catalog, PRODUCTS_FILE, now_ms};
pub use config::Config;
pub use dashboard::{Dashboard, Dataset, RECENT_ORDERS_FILE};
pub use error::{CatalogError, PathError, StoreError};
pub use filter::{FilterState, PriceCondition, PriceRange, StatusTab, filter_records};
pub use pagination::{PageItem, pagination_range};
pub use path::{Intermediate, set_nested_value};
pub use record::{Record, RecordLayout};
pub use sort::{ColumnSort, SortOrder, sort_by_column, sort_records};
pub use store::{DocumentStore, FileStore, MemoryStore};
pub use view::{PageView, PaginationState, select};
