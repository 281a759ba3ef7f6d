use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveDate};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use produce_inventory::{
    config,
    events::{process_events, EventSender},
    logging::init_tracing,
    models::{Catalog, Category, DailyInventory, Unit},
    services::{
        analytics::{AnalyticsRange, AnalyticsReport},
        archive::{german_long_date, german_month_label, group_by_month, ArchiveFilter},
        catalog::{MoveDirection, NewProduct, ProductChanges},
    },
    AppState,
};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut app_config = config::load_config().context("failed to load configuration")?;
    if let Some(data_file) = cli.data_file.clone() {
        app_config.data_file = data_file;
    }
    init_tracing(&app_config.log_level, app_config.log_json);

    let (event_sender, receiver) = EventSender::channel(app_config.event_channel_capacity);
    let events = tokio::spawn(process_events(receiver));

    let state = AppState::from_config(app_config, Some(event_sender))
        .context("failed to initialise services")?;
    debug!(data_file = %state.config.data_file.display(), "services ready");

    let today = Local::now().date_naive();
    let result = match cli.command {
        Commands::Inventory(command) => {
            handle_inventory_command(&state, command, today, cli.json).await
        }
        Commands::Products(command) => handle_products_command(&state, command, cli.json).await,
        Commands::Analytics(args) => {
            handle_analytics_command(&state, args, today, cli.json).await
        }
    };

    drop(state);
    let _ = events.await;
    result
}

#[derive(Parser)]
#[command(name = "produce-inventory", about = "Daily produce stock and demand tracking", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[arg(long, global = true, help = "Data file to use instead of the configured one")]
    data_file: Option<std::path::PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(subcommand)]
    Inventory(InventoryCommands),
    #[command(subcommand)]
    Products(ProductsCommands),
    Analytics(AnalyticsArgs),
}

#[derive(Subcommand)]
enum InventoryCommands {
    /// Show the inventory of a day
    Show(DateArgs),
    /// Open a day for editing, syncing its products with the catalog
    Open(DateArgs),
    /// Set the stock of a product
    SetQuantity(SetValueArgs),
    /// Set the demand of a product
    SetDemand(SetValueArgs),
    /// List stored days in a date range
    History(HistoryArgs),
    /// Browse past days grouped by month
    Archive(ArchiveArgs),
    /// List days in the trash
    Trash,
    /// Move a day to the trash
    Delete(RequiredDateArgs),
    /// Restore a day from the trash
    Restore(RequiredDateArgs),
    /// Delete a day permanently
    Purge(RequiredDateArgs),
}

#[derive(Args)]
struct DateArgs {
    #[arg(long, value_parser = parse_date, help = "Day in YYYY-MM-DD format (defaults to today)")]
    date: Option<NaiveDate>,
}

#[derive(Args)]
struct RequiredDateArgs {
    #[arg(long, value_parser = parse_date, help = "Day in YYYY-MM-DD format")]
    date: NaiveDate,
}

#[derive(Args)]
struct SetValueArgs {
    #[arg(long, help = "Product id")]
    product: String,
    #[arg(
        long,
        value_parser = parse_decimal,
        allow_negative_numbers = true,
        help = "New value in the product's unit"
    )]
    value: Decimal,
    #[arg(long, value_parser = parse_date, help = "Day in YYYY-MM-DD format (defaults to today)")]
    date: Option<NaiveDate>,
}

#[derive(Args)]
struct HistoryArgs {
    #[arg(long, value_parser = parse_date, help = "First day of the range")]
    start: NaiveDate,
    #[arg(long, value_parser = parse_date, help = "Last day of the range (defaults to today)")]
    end: Option<NaiveDate>,
    #[arg(long, action = ArgAction::SetTrue, help = "Include days in the trash")]
    include_deleted: bool,
}

#[derive(Args)]
struct ArchiveArgs {
    #[arg(long, value_parser = parse_date, help = "First day (defaults to 90 days ago)")]
    start: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date, help = "Last day (defaults to today)")]
    end: Option<NaiveDate>,
    #[arg(long, help = "Text matched against the German long date")]
    search: Option<String>,
    #[arg(long, help = "Only days where this product had stock or demand")]
    product: Option<String>,
}

#[derive(Subcommand)]
enum ProductsCommands {
    /// List the catalog in display order
    List,
    /// Add a product to the end of the catalog
    Add(AddProductArgs),
    /// Change fields of a product
    Edit(EditProductArgs),
    /// Remove a product from the catalog
    Remove(ProductIdArgs),
    /// Move a product up or down in the display order
    Move(MoveProductArgs),
}

#[derive(Args)]
struct AddProductArgs {
    #[arg(long, help = "Display name; the id is derived from it")]
    name: String,
    #[arg(
        long,
        value_parser = parse_category,
        default_value = "vegetables",
        help = "fruits, vegetables or salads"
    )]
    category: Category,
    #[arg(long, default_value = "Stück", help = "Counting unit, e.g. kg, Stück, Bund")]
    unit: String,
    #[arg(long, value_parser = parse_decimal, default_value = "1", help = "Kilograms per unit")]
    kg_factor: Decimal,
}

#[derive(Args)]
struct EditProductArgs {
    id: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long, value_parser = parse_category)]
    category: Option<Category>,
    #[arg(long)]
    unit: Option<String>,
    #[arg(long, value_parser = parse_decimal)]
    kg_factor: Option<Decimal>,
}

#[derive(Args)]
struct ProductIdArgs {
    id: String,
}

#[derive(Args)]
struct MoveProductArgs {
    id: String,
    #[arg(value_enum)]
    direction: DirectionArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum DirectionArg {
    Up,
    Down,
}

impl From<DirectionArg> for MoveDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Up => MoveDirection::Up,
            DirectionArg::Down => MoveDirection::Down,
        }
    }
}

#[derive(Args)]
struct AnalyticsArgs {
    #[arg(long, value_enum, default_value = "week")]
    range: RangeArg,
    #[arg(long, value_parser = parse_date, required_if_eq("range", "custom"))]
    start: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date)]
    end: Option<NaiveDate>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RangeArg {
    Week,
    Month,
    Custom,
}

async fn handle_inventory_command(
    state: &AppState,
    command: InventoryCommands,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let service = &state.inventory_service;
    match command {
        InventoryCommands::Show(args) => {
            let record = service
                .load_inventory(args.date.unwrap_or(today))
                .await
                .context("failed to load inventory")?;
            render_record(state, &record, json).await
        }
        InventoryCommands::Open(args) => {
            let record = service
                .open_workday(args.date.unwrap_or(today))
                .await
                .context("failed to open inventory")?;
            render_record(state, &record, json).await
        }
        InventoryCommands::SetQuantity(args) => {
            let record = service
                .update_quantity(args.date.unwrap_or(today), &args.product, args.value)
                .await
                .context("failed to update quantity")?;
            render_record(state, &record, json).await
        }
        InventoryCommands::SetDemand(args) => {
            let record = service
                .update_demand(args.date.unwrap_or(today), &args.product, args.value)
                .await
                .context("failed to update demand")?;
            render_record(state, &record, json).await
        }
        InventoryCommands::History(args) => {
            let records = service
                .history(args.start, args.end.unwrap_or(today), args.include_deleted)
                .await
                .context("failed to load history")?;
            if json {
                return print_json(&records);
            }
            for record in &records {
                render_summary(record);
            }
            Ok(())
        }
        InventoryCommands::Archive(args) => {
            let end = args.end.unwrap_or(today);
            let start = args.start.unwrap_or_else(|| days_before(end, 90));
            let records = service
                .history(start, end, false)
                .await
                .context("failed to load archive")?;
            let filter = ArchiveFilter::new(args.search, args.product);
            let groups = group_by_month(filter.apply(&records));
            if json {
                return print_json(&groups);
            }
            for records in groups.values().rev() {
                if let Some(first) = records.first() {
                    println!("{}", german_month_label(first.date));
                }
                for record in records {
                    render_summary(record);
                }
            }
            Ok(())
        }
        InventoryCommands::Trash => {
            let records = service.trash(today).await.context("failed to load trash")?;
            if json {
                return print_json(&records);
            }
            if records.is_empty() {
                println!("Trash is empty");
            }
            for record in &records {
                let deleted_at = record
                    .deleted_at
                    .map(|at| at.to_rfc3339())
                    .unwrap_or_default();
                println!("- {} (deleted {})", german_long_date(record.date), deleted_at);
            }
            Ok(())
        }
        InventoryCommands::Delete(args) => {
            let deleted_at = service
                .move_to_trash(args.date)
                .await
                .context("failed to move inventory to trash")?;
            println!("Moved {} to trash at {}", args.date, deleted_at.to_rfc3339());
            Ok(())
        }
        InventoryCommands::Restore(args) => {
            service.restore(args.date).await.context("failed to restore inventory")?;
            println!("Restored {}", args.date);
            Ok(())
        }
        InventoryCommands::Purge(args) => {
            service.purge(args.date).await.context("failed to delete inventory")?;
            println!("Deleted {} permanently", args.date);
            Ok(())
        }
    }
}

async fn handle_products_command(
    state: &AppState,
    command: ProductsCommands,
    json: bool,
) -> Result<()> {
    let service = &state.catalog_service;
    match command {
        ProductsCommands::List => {
            let catalog = service.load_catalog().await.context("failed to load catalog")?;
            render_catalog(&catalog, json)
        }
        ProductsCommands::Add(args) => {
            let draft =
                NewProduct::new(args.name, args.category, Unit::from(args.unit), args.kg_factor);
            let product = service.add_product(draft).await.context("failed to add product")?;
            if json {
                return print_json(&product);
            }
            println!("Added {} ({}) at position {}", product.name, product.id, product.order);
            Ok(())
        }
        ProductsCommands::Edit(args) => {
            let changes = ProductChanges {
                name: args.name,
                category: args.category,
                unit: args.unit.map(Unit::from),
                kg_factor: args.kg_factor,
                order: None,
            };
            let product = service
                .update_product(&args.id, changes)
                .await
                .context("failed to update product")?;
            if json {
                return print_json(&product);
            }
            println!(
                "Updated {}: {} {} ({} kg per unit)",
                product.id, product.name, product.unit, product.kg_factor
            );
            Ok(())
        }
        ProductsCommands::Remove(args) => {
            service.remove_product(&args.id).await.context("failed to remove product")?;
            println!("Removed {}", args.id);
            Ok(())
        }
        ProductsCommands::Move(args) => {
            let catalog = service
                .move_product(&args.id, args.direction.into())
                .await
                .context("failed to move product")?;
            render_catalog(&catalog, json)
        }
    }
}

async fn handle_analytics_command(
    state: &AppState,
    args: AnalyticsArgs,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let range = match args.range {
        RangeArg::Week => AnalyticsRange::Week,
        RangeArg::Month => AnalyticsRange::Month,
        RangeArg::Custom => AnalyticsRange::Custom {
            start: args.start.unwrap_or_else(|| days_before(today, 7)),
            end: args.end.unwrap_or(today),
        },
    };
    let report = state
        .analytics_service
        .report(range, today)
        .await
        .context("failed to build analytics")?;
    if json {
        return print_json(&report);
    }
    render_report(&report);
    Ok(())
}

async fn render_record(state: &AppState, record: &DailyInventory, json: bool) -> Result<()> {
    if json {
        return print_json(record);
    }
    let catalog = state.catalog_service.load_catalog().await?;
    println!("{}", german_long_date(record.date));
    for entry in &record.entries {
        let (name, unit) = catalog
            .get(&entry.product_id)
            .map(|p| (p.name.as_str(), p.unit.label()))
            .unwrap_or((entry.product_id.as_str(), ""));
        println!(
            "  {:<28} stock {:>8} {:<6} demand {:>8} {}",
            name, entry.quantity, unit, entry.demand, unit
        );
    }
    Ok(())
}

fn render_summary(record: &DailyInventory) {
    let active = record.entries.iter().filter(|e| e.has_activity()).count();
    println!(
        "- {} • {} products with stock or demand{}",
        german_long_date(record.date),
        active,
        if record.deleted { " • in trash" } else { "" }
    );
}

fn render_catalog(catalog: &Catalog, json: bool) -> Result<()> {
    if json {
        return print_json(catalog);
    }
    for product in catalog {
        println!(
            "{:>3}. {:<28} {:<24} {:<10} {:<6} {} kg/unit",
            product.order,
            product.name,
            product.id,
            product.category.display_name(),
            product.unit,
            product.kg_factor
        );
    }
    Ok(())
}

fn render_report(report: &AnalyticsReport) {
    println!("Analytics {} to {}", report.start, report.end);
    println!("Stock trend (kg):");
    for point in &report.trend {
        println!("  {}  {}", point.date, point.total_kg.round_dp(2));
    }
    println!("Top products (kg):");
    for product in &report.top_products {
        println!("  {:<28} {}", product.name, product.kg.round_dp(2));
    }
    println!("Categories (kg):");
    for total in &report.categories {
        println!("  {:<10} {}", total.category.display_name(), total.kg.round_dp(2));
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn days_before(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_sub_signed(Duration::days(days)).unwrap_or(NaiveDate::MIN)
}

fn parse_decimal(raw: &str) -> Result<Decimal, String> {
    Decimal::from_str(raw).map_err(|_| format!("invalid decimal '{raw}'"))
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{raw}', expected YYYY-MM-DD"))
}

fn parse_category(raw: &str) -> Result<Category, String> {
    Category::from_str(raw)
}
