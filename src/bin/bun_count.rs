use anyhow::{anyhow, Context, Result};
use bun_count::{
    calendar::{day_name, parse_calendar_key, short_day_name, to_calendar_key, week_start},
    config::{self, AppConfig},
    errors::FormatError,
    models::{FieldUpdate, InventoryUpdate, OrderRecord, ProductId},
    services::{
        orders::OrderResult,
        sheets::{ForecastRow, ProductSheet, WeeklyRow, FORECAST_SHEET_DAYS, WEEKLY_SHEET_DAYS},
        OrderOutcome,
    },
    AppState,
};
use chrono::{Datelike, Local, NaiveDate};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use strum::IntoEnumIterator;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config().context("failed to load application config")?;
    config::init_tracing(config.log_level(), config.log_json);
    let mut state = open_state(&config)?;

    match cli.command {
        Commands::Products => handle_products(&state, cli.json),
        Commands::Record(args) => handle_record(&mut state, args, cli.json),
        Commands::Sheet(args) => handle_weekly_sheet(&state, args, cli.json),
        Commands::ForecastSheet(args) => handle_forecast_sheet(&state, args, cli.json),
        Commands::Forecast(args) => handle_forecast(&state, args, cli.json),
        Commands::Order(args) => handle_order(&mut state, args, cli.json),
        Commands::History => handle_history(&state, cli.json),
    }
}

#[derive(Parser)]
#[command(
    name = "bun-count",
    about = "Daily bun counts, forecasts and replenishment orders",
    version
)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the product catalog
    Products,
    /// Record receipts, an end-of-day count or a forecast override
    Record(RecordArgs),
    /// Weekly count sheet
    Sheet(SheetArgs),
    /// Receipts and forecasts for the coming weeks
    ForecastSheet(SheetArgs),
    /// Forecast for one product and day
    Forecast(ForecastArgs),
    /// Calculate and place an order
    Order(OrderArgs),
    /// Previously placed orders
    History,
}

#[derive(Args)]
struct RecordArgs {
    #[arg(long, help = "Product id from the catalog")]
    product: ProductId,
    #[arg(long, value_parser = parse_date, help = "Calendar day (YYYY-MM-DD), defaults to today")]
    date: Option<NaiveDate>,
    #[arg(long, conflicts_with = "clear_received", help = "Bags received")]
    received: Option<u32>,
    #[arg(long, action = ArgAction::SetTrue)]
    clear_received: bool,
    #[arg(long, conflicts_with = "clear_eodc", help = "End-of-day bag count")]
    eodc: Option<u32>,
    #[arg(long, action = ArgAction::SetTrue)]
    clear_eodc: bool,
    #[arg(long, conflicts_with = "clear_forecast", help = "Forecast override in bags")]
    forecast: Option<u32>,
    #[arg(long, action = ArgAction::SetTrue)]
    clear_forecast: bool,
}

impl RecordArgs {
    fn update(&self) -> InventoryUpdate {
        InventoryUpdate {
            rp_bags: field_update(self.received, self.clear_received),
            pdc_bags: field_update(self.eodc, self.clear_eodc),
            fc_bags: field_update(self.forecast, self.clear_forecast),
        }
    }
}

#[derive(Args)]
struct SheetArgs {
    #[arg(long, value_parser = parse_date, help = "First day, defaults to this week's Monday")]
    start: Option<NaiveDate>,
    #[arg(long, help = "Number of days to show")]
    days: Option<usize>,
}

#[derive(Args)]
struct ForecastArgs {
    #[arg(long)]
    product: ProductId,
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
}

#[derive(Args)]
struct OrderArgs {
    #[arg(long, help = "Order day (YYYY-MM-DD), defaults to today")]
    date: Option<String>,
    #[arg(
        long,
        action = ArgAction::SetTrue,
        help = "Show the calculation without adding it to the order log"
    )]
    preview: bool,
}

fn parse_date(raw: &str) -> Result<NaiveDate, FormatError> {
    parse_calendar_key(raw)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn field_update(value: Option<u32>, clear: bool) -> FieldUpdate<u32> {
    match (value, clear) {
        (Some(v), _) => FieldUpdate::Set(v),
        (None, true) => FieldUpdate::Clear,
        (None, false) => FieldUpdate::Keep,
    }
}

fn open_state(config: &AppConfig) -> Result<AppState> {
    let storage = config
        .storage
        .open()
        .context("failed to open inventory storage")?;
    AppState::load(config.products.clone(), storage).context("failed to load inventory data")
}

fn handle_products(state: &AppState, json: bool) -> Result<()> {
    if json {
        return print_json(&state.catalog());
    }
    for product in state.catalog() {
        println!(
            "- {} • {} • {} buns/bag • order in multiples of {}",
            product.id, product.name, product.buns_per_bag, product.order_increment
        );
    }
    Ok(())
}

fn handle_record(state: &mut AppState, args: RecordArgs, json: bool) -> Result<()> {
    let update = args.update();
    if update.is_empty() {
        return Err(anyhow!(
            "nothing to record; pass --received, --eodc, --forecast or a --clear-* flag"
        ));
    }
    let date = args.date.unwrap_or_else(today);
    let record = state
        .upsert(args.product, date, update)
        .with_context(|| format!("failed to record counts for product {}", args.product))?;

    if json {
        return print_json(&record);
    }
    println!(
        "Recorded {} for product {}: MC {} • RP {} • EODC {} • used {} • FC {}",
        to_calendar_key(date),
        args.product,
        state.yesterday_eodc(args.product, date),
        display(record.rp_bags),
        display(record.pdc_bags),
        display(record.used_bags),
        display(record.fc_bags),
    );
    if let Some(used) = record.used_bags.filter(|used| *used < 0) {
        println!("  ! used is {used}: the night count is higher than the bags available");
    }
    Ok(())
}

fn handle_weekly_sheet(state: &AppState, args: SheetArgs, json: bool) -> Result<()> {
    let start = args.start.unwrap_or_else(|| week_start(today()));
    let sheets = state.weekly_sheet(start, args.days.unwrap_or(WEEKLY_SHEET_DAYS));
    if json {
        return print_json(&sheets);
    }
    for sheet in &sheets {
        render_sheet(sheet, WeeklyRow::iter(), |day, row| day.cell(row), |day| day.date);
    }
    Ok(())
}

fn handle_forecast_sheet(state: &AppState, args: SheetArgs, json: bool) -> Result<()> {
    let start = args.start.unwrap_or_else(|| week_start(today()));
    let sheets = state.forecast_sheet(start, args.days.unwrap_or(FORECAST_SHEET_DAYS));
    if json {
        return print_json(&sheets);
    }
    for sheet in &sheets {
        render_sheet(sheet, ForecastRow::iter(), |day, row| day.cell(row), |day| day.date);
    }
    Ok(())
}

fn handle_forecast(state: &AppState, args: ForecastArgs, json: bool) -> Result<()> {
    let product = state.product(args.product)?;
    let date = args.date.unwrap_or_else(today);

    #[derive(Serialize)]
    struct ForecastView<'a> {
        product: &'a str,
        date: NaiveDate,
        estimate: i64,
        forecast: i64,
        overridden: bool,
    }

    let view = ForecastView {
        product: &product.name,
        date,
        estimate: state.estimate(product.id, date),
        forecast: state.forecast(product.id, date),
        overridden: state
            .get(product.id, date)
            .and_then(|r| r.fc_bags)
            .is_some(),
    };
    if json {
        return print_json(&view);
    }
    println!(
        "{} on {} ({}): forecast {} bags{}",
        view.product,
        to_calendar_key(date),
        day_name(date.weekday()),
        view.forecast,
        if view.overridden {
            format!(" (override; history says {})", view.estimate)
        } else {
            String::new()
        }
    );
    Ok(())
}

fn handle_order(state: &mut AppState, args: OrderArgs, json: bool) -> Result<()> {
    let key = args.date.unwrap_or_else(|| to_calendar_key(today()));

    if args.preview {
        let date = parse_calendar_key(&key)?;
        let results = state.preview_order(date);
        if json {
            return print_json(&results);
        }
        if results.is_empty() {
            println!("No delivery is scheduled for orders placed on {}.", day_name(date.weekday()));
        }
        results.iter().for_each(render_order_result);
        return Ok(());
    }

    match state.place_order(&key).context("failed to place order")? {
        OrderOutcome::Placed(record) => {
            if json {
                print_json(&record)?;
            } else {
                render_order_record(&record);
            }
        }
        OrderOutcome::Rejected(reason) => {
            if json {
                print_json(&serde_json::json!({ "rejected": reason, "message": reason.message() }))?;
            } else {
                println!("{reason}");
            }
        }
    }
    Ok(())
}

fn handle_history(state: &AppState, json: bool) -> Result<()> {
    if json {
        return print_json(&state.order_log());
    }
    if state.order_log().is_empty() {
        println!("No orders placed yet.");
    }
    state.order_log().iter().for_each(render_order_record);
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn display<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn render_sheet<D, R: std::fmt::Display + Copy>(
    sheet: &ProductSheet<D>,
    rows: impl Iterator<Item = R>,
    cell: impl Fn(&D, R) -> Option<i64>,
    date: impl Fn(&D) -> NaiveDate,
) {
    print!("{:<20}", sheet.product_name);
    for day in &sheet.days {
        let d = date(day);
        print!(" {:>3} {:>2}/{:<2}", short_day_name(d.weekday()), d.month(), d.day());
    }
    println!();
    for row in rows {
        print!("{:<20}", row.to_string());
        for day in &sheet.days {
            print!(" {:>9}", display(cell(day, row)));
        }
        println!();
    }
    println!();
}

fn render_order_result(result: &OrderResult) {
    println!(
        "- {}: on hand {} + in transit {} vs forecast {} → need {} → order {} (increment {}, delivery {} {})",
        result.product_name,
        result.starting_on_hand,
        result.in_transit,
        result.total_forecast,
        result.needed,
        result.ordered,
        result.increment,
        day_name(result.delivery_weekday),
        to_calendar_key(result.delivery_date),
    );
}

fn render_order_record(record: &OrderRecord) {
    println!(
        "Order {} • delivery {} ({})",
        to_calendar_key(record.order_date),
        to_calendar_key(record.delivery_date),
        day_name(record.delivery_date.weekday()),
    );
    for item in &record.items {
        println!(
            "  • {}: need {} bags → order {} (increment {})",
            item.product_name, item.needed, item.ordered, item.increment
        );
    }
}
