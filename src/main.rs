use catalogstore::filter::price_ceiling;
use catalogstore::path::{InputKind, coerce_input};
use catalogstore::{
    Catalog, ColumnSort, Config, Dashboard, Dataset, FileStore, FilterState, Intermediate, PageItem, PageView,
    PaginationState, PriceCondition, Record, RecordLayout, SortOrder, StatusTab, filter::filter_by_status, select,
    sort_by_column,
};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use eyre::{Context, Result, eyre};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "catalogstore")]
#[command(about = "CatalogStore CLI - Product catalog and order grid over flat JSON documents")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Config file (default: <config dir>/catalogstore/config.yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the JSON documents (overrides config)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the product catalog
    Products {
        #[command(subcommand)]
        command: ProductCommands,
    },

    /// Browse recent orders
    Orders {
        #[command(subcommand)]
        command: OrderCommands,
    },

    /// Print a dashboard dataset as JSON
    Dashboard {
        /// recent-orders, chart, revenue or top-products
        dataset: Dataset,
    },
}

#[derive(Subcommand)]
enum ProductCommands {
    /// List products through the filter/sort/paginate pipeline
    List {
        /// Status tab
        #[arg(long, value_enum, default_value_t = TabArg::All)]
        tab: TabArg,

        #[command(flatten)]
        grid: GridArgs,
    },

    /// Show one product
    Get { id: String },

    /// Add a product from a JSON file
    Add { file: PathBuf },

    /// Merge a JSON file over an existing product
    Update { id: String, file: PathBuf },

    /// Delete a product
    Delete { id: String },

    /// Set one field by dot path, e.g. pricing.discountType
    Set {
        id: String,
        path: String,
        value: String,

        /// How to interpret the value
        #[arg(long, value_enum, default_value_t = KindArg::Text)]
        kind: KindArg,

        /// Fail instead of replacing a non-object value along the path
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Subcommand)]
enum OrderCommands {
    /// List recent orders through the filter/sort/paginate pipeline
    List {
        #[command(flatten)]
        grid: GridArgs,
    },
}

#[derive(Args)]
struct GridArgs {
    /// Case-insensitive text search
    #[arg(short, long, default_value = "")]
    search: String,

    /// Only records from this day (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Lower price bound
    #[arg(long)]
    min: Option<f64>,

    /// Upper price bound
    #[arg(long)]
    max: Option<f64>,

    /// Price comparison: eq, lt, gt, lte or gte
    #[arg(long, default_value = "eq")]
    condition: PriceCondition,

    /// Price sort: asc or desc
    #[arg(long, default_value = "")]
    sort: SortOrder,

    /// Column sort applied before the price sort, e.g. added:desc
    #[arg(long, value_name = "COLUMN[:desc]")]
    sort_by: Option<ColumnArg>,

    /// Page to show (1-based)
    #[arg(short, long, default_value_t = 1)]
    page: usize,

    /// Rows per page (overrides config)
    #[arg(long)]
    page_size: Option<usize>,

    /// Print the page as JSON
    #[arg(long)]
    json: bool,
}

/// `<column>[:asc|:desc]`
#[derive(Clone)]
struct ColumnArg {
    column: String,
    descending: bool,
}

impl FromStr for ColumnArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, direction) = s.split_once(':').unwrap_or((s, "asc"));
        let descending = match direction.to_ascii_lowercase().as_str() {
            "asc" => false,
            "desc" => true,
            other => return Err(format!("unknown sort direction: {}", other)),
        };
        Ok(Self {
            column: column.trim().to_ascii_lowercase(),
            descending,
        })
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum TabArg {
    All,
    Published,
    Draft,
    LowStock,
    OutOfStock,
}

impl From<TabArg> for StatusTab {
    fn from(tab: TabArg) -> Self {
        match tab {
            TabArg::All => StatusTab::All,
            TabArg::Published => StatusTab::Published,
            TabArg::Draft => StatusTab::Draft,
            TabArg::LowStock => StatusTab::LowStock,
            TabArg::OutOfStock => StatusTab::OutOfStock,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Text,
    Number,
    Checkbox,
}

impl From<KindArg> for InputKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Text => InputKind::Text,
            KindArg::Number => InputKind::Number,
            KindArg::Checkbox => InputKind::Checkbox,
        }
    }
}

const PRODUCT_COLUMNS: &[(&str, &str)] = &[
    ("ID", "id"),
    ("PRODUCT", "product.name"),
    ("SKU", "inventory.sku"),
    ("CATEGORY", "sidebar.category"),
    ("STOCK", "inventory.quantity"),
    ("PRICE", "pricing.price"),
    ("STATUS", "sidebar.status"),
    ("ADDED", "addedDate"),
];

fn product_sort(column: &str) -> Option<ColumnSort> {
    match column {
        "name" | "product" => Some(ColumnSort::NestedName("product".to_string())),
        "stock" => Some(ColumnSort::Numeric("inventory.quantity".to_string())),
        "price" => Some(ColumnSort::Numeric("pricing.price".to_string())),
        "added" => Some(ColumnSort::DateTime("addedDate".to_string())),
        _ => None,
    }
}

fn order_sort(column: &str) -> Option<ColumnSort> {
    match column {
        "product" => Some(ColumnSort::NestedName("product".to_string())),
        "customer" => Some(ColumnSort::NestedName("customer".to_string())),
        "total" => Some(ColumnSort::Numeric("total".to_string())),
        "date" => Some(ColumnSort::DateTime("date".to_string())),
        _ => None,
    }
}

const ORDER_COLUMNS: &[(&str, &str)] = &[
    ("ID", "id"),
    ("PRODUCT", "product.name"),
    ("CUSTOMER", "customer.name"),
    ("TOTAL", "total"),
    ("STATUS", "status"),
    ("DATE", "date"),
];

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    let store = FileStore::open(&config.data_dir)
        .wrap_err_with(|| format!("Failed to open data directory {}", config.data_dir.display()))?;

    match cli.command {
        Commands::Products { command } => run_products(command, Catalog::with_file(store, &config.products_file), &config),
        Commands::Orders {
            command: OrderCommands::List { grid },
        } => {
            let orders = Dashboard::with_orders_file(store, &config.orders_file)
                .recent_orders()
                .wrap_err("Failed to load recent orders")?;
            let table = Table {
                layout: RecordLayout::orders(),
                columns: ORDER_COLUMNS,
                sorts: order_sort,
            };
            print_grid(&orders, &orders, &grid, &table, &config)
        }
        Commands::Dashboard { dataset } => {
            let dashboard = Dashboard::with_orders_file(store, &config.orders_file);
            let value = dashboard
                .dataset(dataset)
                .wrap_err_with(|| format!("Failed to load {} data", dataset))?
                .ok_or_else(|| eyre!("{} not found", dashboard.file_for(dataset)))?;
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
    }
}

fn run_products(command: ProductCommands, catalog: Catalog<FileStore>, config: &Config) -> Result<()> {
    match command {
        ProductCommands::List { tab, grid } => {
            let layout = RecordLayout::products();
            let products = catalog.load().wrap_err("Failed to load products")?;
            let in_tab: Vec<Value> = filter_by_status(&products, tab.into(), &layout)
                .into_iter()
                .cloned()
                .collect();
            let table = Table {
                layout,
                columns: PRODUCT_COLUMNS,
                sorts: product_sort,
            };
            print_grid(&products, &in_tab, &grid, &table, config)?;
        }
        ProductCommands::Get { id } => {
            let product = catalog
                .get(&id)
                .wrap_err("Failed to load products")?
                .ok_or_else(|| eyre!("Product with ID {} not found", id))?;
            println!("{}", serde_json::to_string_pretty(&product)?);
        }
        ProductCommands::Add { file } => {
            let data = read_json_file(&file)?;
            let product = catalog.create(data).wrap_err("Failed to add product")?;
            println!("{} {}", "Added".green(), product.id().unwrap_or_default());
        }
        ProductCommands::Update { id, file } => {
            let data = read_json_file(&file)?;
            catalog
                .update(&id, data)
                .wrap_err("Failed to update product")?
                .ok_or_else(|| eyre!("Product with ID {} not found", id))?;
            println!("{} {}", "Updated".green(), id);
        }
        ProductCommands::Delete { id } => {
            if !catalog.delete(&id).wrap_err("Failed to delete product")? {
                return Err(eyre!("Product with ID {} not found", id));
            }
            println!("{} {}", "Deleted".green(), id);
        }
        ProductCommands::Set {
            id,
            path,
            value,
            kind,
            strict,
        } => {
            let policy = if strict { Intermediate::Reject } else { Intermediate::Overwrite };
            let value = coerce_input(kind.into(), &value);
            catalog
                .set_field(&id, &path, value, policy)
                .wrap_err_with(|| format!("Failed to set {}", path))?
                .ok_or_else(|| eyre!("Product with ID {} not found", id))?;
            println!("{} {} {}", "Set".green(), id, path);
        }
    }
    Ok(())
}

fn read_json_file(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).wrap_err_with(|| format!("Invalid JSON in {}", path.display()))
}

/// Build the filter state from CLI flags, seeding the price range from the full collection
fn filter_state(all: &[Value], grid: &GridArgs, layout: &RecordLayout) -> FilterState {
    let limit = price_ceiling(all, layout);
    let mut state = FilterState::with_price_limit(limit);
    state.search_term = grid.search.clone();
    state.selected_date = grid.date;
    state.price_condition = grid.condition;
    state.sort_order = grid.sort;
    if grid.min.is_some() {
        state.price_range.set_min(grid.min, limit);
    }
    if grid.max.is_some() {
        state.price_range.set_max(grid.max, limit);
    }
    state
}

/// How one grid reads and shows its records
struct Table {
    layout: RecordLayout,
    columns: &'static [(&'static str, &'static str)],
    sorts: fn(&str) -> Option<ColumnSort>,
}

fn print_grid(all: &[Value], records: &[Value], grid: &GridArgs, table: &Table, config: &Config) -> Result<()> {
    let layout = &table.layout;
    let mut ordered: Vec<&Value> = records.iter().collect();
    if let Some(arg) = &grid.sort_by {
        let column = (table.sorts)(&arg.column).ok_or_else(|| eyre!("cannot sort by column {}", arg.column))?;
        sort_by_column(&mut ordered, &column, arg.descending);
    }

    let state = filter_state(all, grid, layout);
    let page_size = grid.page_size.unwrap_or(config.page_size);
    let pagination = PaginationState::new(grid.page.saturating_sub(1), page_size);
    let view = select(ordered, &state, pagination, layout);

    if grid.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    print_table(&view, table.columns);
    print_footer(&view, config.sibling_count);
    Ok(())
}

fn print_table(view: &PageView<'_>, columns: &[(&str, &str)]) {
    let rows: Vec<Vec<String>> = view
        .page_items
        .iter()
        .map(|record| columns.iter().map(|(_, path)| cell(record, path)).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, (header, _))| rows.iter().map(|r| r[i].chars().count()).fold(header.len(), usize::max))
        .collect();

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|((h, _), w)| format!("{:<w$}", h, w = *w))
        .collect();
    println!("{}", header.join("  ").bold());

    for row in rows {
        let line: Vec<String> = row.iter().zip(&widths).map(|(c, w)| format!("{:<w$}", c, w = *w)).collect();
        println!("{}", line.join("  "));
    }
}

fn print_footer(view: &PageView<'_>, sibling_count: usize) {
    if view.total == 0 {
        println!("{}", "No matching records".dimmed());
        return;
    }
    println!(
        "\nShowing {} to {} of {}",
        view.start_index, view.end_index, view.total
    );
    if view.page_count > 1 {
        let pager: Vec<String> = view
            .page_numbers(sibling_count)
            .into_iter()
            .map(|item| match item {
                PageItem::Page(n) if n == view.page_index + 1 => format!("[{}]", n).cyan().bold().to_string(),
                PageItem::Page(n) => n.to_string(),
                PageItem::Ellipsis => "...".dimmed().to_string(),
            })
            .collect();
        println!("{}", pager.join(" "));
    }
}

fn cell(record: &Value, path: &str) -> String {
    match record.lookup(path) {
        None => "N/A".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_column_arg_parsing() {
        let arg: ColumnArg = "Added:DESC".parse().unwrap();
        assert_eq!(arg.column, "added");
        assert!(arg.descending);

        let arg: ColumnArg = "stock".parse().unwrap();
        assert!(!arg.descending);

        assert!("stock:sideways".parse::<ColumnArg>().is_err());
    }

    #[test]
    fn test_column_sort_feeds_the_grid() {
        let products = vec![
            json!({"id": "a", "inventory": {"quantity": 2}, "pricing": {"price": 5}}),
            json!({"id": "b", "inventory": {"quantity": 9}, "pricing": {"price": 5}}),
            json!({"id": "c", "inventory": {"quantity": 4}, "pricing": {"price": 5}}),
        ];
        let layout = RecordLayout::products();
        let mut ordered: Vec<&Value> = products.iter().collect();
        let column = product_sort("stock").unwrap();
        sort_by_column(&mut ordered, &column, true);

        let state = FilterState {
            price_condition: PriceCondition::Gte,
            ..FilterState::with_price_limit(10.0)
        };
        let view = select(ordered, &state, PaginationState::new(0, 10), &layout);
        let ids: Vec<&str> = view.page_items.iter().filter_map(|r| r.id()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);

        assert!(product_sort("colour").is_none());
        assert!(order_sort("customer").is_some());
    }
}
