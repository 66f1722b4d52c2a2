//! Demo 01: Product Grid
//!
//! This demo seeds an in-memory catalog, then runs the filter, sort and
//! paginate pipeline the products table uses.
//!
//! Run with: cargo run --example 01_product_grid

use catalogstore::filter::price_ceiling;
use catalogstore::{
    Catalog, FilterState, MemoryStore, PaginationState, PriceCondition, Record, RecordLayout, SortOrder, select,
    set_nested_value,
};
use eyre::Result;
use serde_json::json;

fn main() -> Result<()> {
    println!("CatalogStore Product Grid Demo");
    println!("==============================\n");

    let catalog = Catalog::new(MemoryStore::new());

    for (i, (name, price, status)) in [
        ("Handmade Pouch", 121.0, "Published"),
        ("Smartwatch E2", 590.0, "Draft"),
        ("Smartwatch E1", 125.0, "Low Stock"),
        ("Headphone G1 Pro", 348.0, "Published"),
        ("Iphone X", 607.0, "Out of Stock"),
        ("Puma Shoes", 234.0, "Published"),
        ("Imac 2021", 760.0, "Published"),
    ]
    .into_iter()
    .enumerate()
    {
        let product = json!({
            "product": {"name": name},
            "inventory": {"sku": format!("SKU-{:03}", i), "quantity": 10 * i},
            "pricing": {"price": price},
            "sidebar": {"category": "Gadgets", "status": status},
            "addedDate": "2024-03-01T09:00:00Z",
        });
        catalog.create(product)?;
    }

    // Form edits go through the path mutator before being saved
    let first = catalog.list()?.remove(0);
    let edited = set_nested_value(&first, "pricing.discountType", json!("percent"))?;
    let id = first.id().unwrap_or_default().to_string();
    catalog.update(&id, edited)?;

    let layout = RecordLayout::products();
    let products = catalog.load()?;
    let limit = price_ceiling(&products, &layout);

    let mut filter = FilterState::with_price_limit(limit);
    filter.search_term = "smart".to_string();
    filter.sort_order = SortOrder::Desc;
    print_page("Search \"smart\", price descending", &products, &filter, &layout);

    let mut filter = FilterState::with_price_limit(limit);
    filter.price_condition = PriceCondition::Gte;
    filter.price_range.set_min(Some(300.0), limit);
    filter.sort_order = SortOrder::Asc;
    print_page("Price >= 300, ascending", &products, &filter, &layout);

    Ok(())
}

fn print_page(title: &str, products: &[serde_json::Value], filter: &FilterState, layout: &RecordLayout) {
    let view = select(products, filter, PaginationState::new(0, 3), layout);

    println!("{}", title);
    for product in &view.page_items {
        println!(
            "  {:<20} {:>8}",
            product.str_at("product.name").unwrap_or("N/A"),
            layout.price(product).map_or("N/A".to_string(), |p| format!("${:.2}", p))
        );
    }
    let pager: Vec<String> = view.page_numbers(1).iter().map(ToString::to_string).collect();
    println!(
        "  Showing {} to {} of {}  [{}]\n",
        view.start_index,
        view.end_index,
        view.total,
        pager.join(" ")
    );
}
