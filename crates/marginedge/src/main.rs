//! Crawl, browse, and query MarginEdge purchasing data.
//!
//! Reads `MARGINEDGE_API_KEY`, `RESTAURANT_UNIT_ID`, and optionally
//! `MARGINEDGE_BASE_URL` from the environment (or a `.env` file).
//!
//! # Examples
//!
//! ```sh
//! # Save products, vendors, and the last 30 days of orders
//! marginedge crawl --line-items --structure data_structure.json
//!
//! # Walk through the saved snapshot
//! marginedge explore
//!
//! # Run one analytics tool against the snapshot
//! marginedge query get_top_vendors_by_spend --args '{"limit": 3}'
//!
//! # Ask the API directly
//! marginedge live price-changes --days 14
//! ```

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use marginedge::browse::Browser;
use marginedge::prelude::*;
use marginedge::snapshot::structure_outline;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Crawl, browse, and query MarginEdge purchasing data.
#[derive(Parser)]
#[command(name = "marginedge", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch every resource and write a snapshot file.
    Crawl {
        /// Snapshot file to write
        #[arg(long, default_value = DEFAULT_SNAPSHOT_FILE)]
        output: PathBuf,

        /// Trailing window of orders to fetch, in days
        #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(i64).range(0..))]
        days: i64,

        /// Fetch each order's detail to include line items
        #[arg(long)]
        line_items: bool,

        /// Also write a type outline of the snapshot to this file
        #[arg(long)]
        structure: Option<PathBuf>,
    },

    /// Browse a snapshot file interactively.
    Explore {
        /// Snapshot file to read
        #[arg(long, default_value = DEFAULT_SNAPSHOT_FILE)]
        file: PathBuf,

        /// Crawl a fresh snapshot first, even if the file exists
        #[arg(long)]
        refresh: bool,
    },

    /// Run one analytics tool against a snapshot and print its JSON result.
    Query {
        /// Tool name, e.g. `search_products`
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,

        /// Snapshot file to read
        #[arg(long, default_value = DEFAULT_SNAPSHOT_FILE)]
        file: PathBuf,
    },

    /// Answer a question straight from the API.
    Live {
        /// Days of orders to consider for order-based questions
        #[arg(long, default_value_t = marginedge::live::DEFAULT_LOOKBACK_DAYS, value_parser = clap::value_parser!(i64).range(0..))]
        lookback: i64,

        #[command(subcommand)]
        question: LiveQuestion,
    },
}

#[derive(Subcommand)]
enum LiveQuestion {
    /// Products whose name or category contains the query.
    Search { query: String },
    /// Product-detail record for the first match.
    Product { query: String },
    /// Price history for the first match.
    PriceHistory { query: String },
    /// Purchases of the first matching product, by vendor.
    VendorPurchases { query: String },
    /// Vendors ranked by order total.
    TopVendors {
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Products whose price moved over the window.
    PriceChanges {
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(i64).range(0..))]
        days: i64,
    },
    /// Price trend for the first match.
    Trends {
        query: String,
        #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(i64).range(0..))]
        days: i64,
    },
    /// Order count, spend, and closed-order rate for one vendor.
    VendorPerformance { vendor: String },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text =
        serde_json::to_string_pretty(value).map_err(|e| format!("failed to format result: {e}"))?;
    println!("{text}");
    Ok(())
}

fn connect() -> Result<(MarginEdgeClient, MarginEdgeEnv), String> {
    let env = MarginEdgeEnv::from_env().map_err(|e| e.to_string())?;
    let client = MarginEdgeClient::new(env.client_config()).map_err(|e| e.to_string())?;
    Ok((client, env))
}

async fn crawl(
    output: &Path,
    days: i64,
    line_items: bool,
    structure: Option<&Path>,
) -> Result<Snapshot, String> {
    let (client, env) = connect()?;
    let options = SnapshotOptions::default()
        .with_order_window_days(days)
        .with_line_items(line_items);

    let snapshot = client
        .fetch_snapshot(&env.restaurant_unit_id, &options, today())
        .await
        .map_err(|e| e.to_string())?;
    snapshot.save(output).map_err(|e| e.to_string())?;

    if let Some(path) = structure {
        let outline = serde_json::to_string_pretty(&structure_outline(&snapshot.to_value()))
            .map_err(|e| format!("failed to format outline: {e}"))?;
        std::fs::write(path, outline)
            .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
        info!("Structure outline written to {}", path.display());
    }

    let (hits, misses) = client.cache_stats();
    info!("Crawl finished ({hits} cache hits, {misses} misses)");
    Ok(snapshot)
}

async fn explore(file: &Path, refresh: bool) -> Result<(), String> {
    let doc = if refresh {
        crawl(file, 30, false, None).await?.to_value()
    } else {
        match Snapshot::load_value(file) {
            Ok(doc) => doc,
            Err(SnapshotError::NotFound(_)) => {
                eprintln!("No snapshot at {}; crawling first.", file.display());
                crawl(file, 30, false, None).await?.to_value()
            }
            Err(e) => return Err(e.to_string()),
        }
    };

    let stdin = io::stdin();
    let mut browser = Browser::new(stdin.lock(), io::stdout());
    browser.run(&doc).map_err(|e| format!("browser I/O failed: {e}"))?;
    println!("Exiting data explorer.");
    Ok(())
}

async fn query(tool: &str, args: &str, file: &Path) -> Result<(), String> {
    let snapshot = Snapshot::load(file).map_err(|e| e.to_string())?;
    let tools = ToolSet::new()
        .with_arg_validation(true)
        .with_analytics_tools(Arc::new(Dataset::from_snapshot(&snapshot)), today());

    let result = tools.execute(tool, args).await;
    if result.starts_with("Error:") {
        return Err(result.trim_start_matches("Error:").trim().to_string());
    }
    // Results are JSON; re-indent them when they parse.
    match serde_json::from_str::<serde_json::Value>(&result) {
        Ok(value) => print_json(&value),
        Err(_) => {
            println!("{result}");
            Ok(())
        }
    }
}

async fn live(lookback: i64, question: &LiveQuestion) -> Result<(), String> {
    let (client, env) = connect()?;
    let live =
        LiveAnalytics::new(&client, env.restaurant_unit_id.clone()).with_lookback_days(lookback);
    let err = |e: ApiError| e.to_string();

    match question {
        LiveQuestion::Search { query } => {
            print_json(&live.search_products(query).await.map_err(err)?)
        }
        LiveQuestion::Product { query } => {
            print_json(&live.product_details(query).await.map_err(err)?)
        }
        LiveQuestion::PriceHistory { query } => {
            print_json(&live.price_history(query).await.map_err(err)?)
        }
        LiveQuestion::VendorPurchases { query } => {
            print_json(&live.vendor_purchases(query).await.map_err(err)?)
        }
        LiveQuestion::TopVendors { limit } => {
            print_json(&live.top_vendors_by_spend(*limit).await.map_err(err)?)
        }
        LiveQuestion::PriceChanges { days } => {
            print_json(&live.price_changes(*days).await.map_err(err)?)
        }
        LiveQuestion::Trends { query, days } => {
            print_json(&live.analyze_price_trends(query, *days).await.map_err(err)?)
        }
        LiveQuestion::VendorPerformance { vendor } => {
            print_json(&live.evaluate_vendor_performance(vendor).await.map_err(err)?)
        }
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Crawl {
            output,
            days,
            line_items,
            structure,
        } => crawl(&output, days, line_items, structure.as_deref())
            .await
            .map(|_| ()),
        Command::Explore { file, refresh } => explore(&file, refresh).await,
        Command::Query { tool, args, file } => query(&tool, &args, &file).await,
        Command::Live { lookback, question } => live(lookback, &question).await,
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_flags_reject_negative_values() {
        assert!(Cli::try_parse_from(["marginedge", "crawl", "--days", "-1"]).is_err());
        assert!(Cli::try_parse_from(["marginedge", "live", "--lookback", "-3", "search", "lime"]).is_err());
        assert!(Cli::try_parse_from(["marginedge", "live", "price-changes", "--days", "-5"]).is_err());
        assert!(Cli::try_parse_from(["marginedge", "live", "trends", "lime", "--days", "-30"]).is_err());
    }

    #[test]
    fn day_flags_accept_large_windows() {
        let cli = Cli::try_parse_from(["marginedge", "live", "price-changes", "--days", "1000000000"]).unwrap();
        match cli.command {
            Command::Live {
                question: LiveQuestion::PriceChanges { days },
                ..
            } => assert_eq!(days, 1_000_000_000),
            _ => panic!("expected live price-changes"),
        }
    }
}
