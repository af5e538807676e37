//! Bookstore Pricer Binary
//!
//! Quotes suggested resale prices for books in a target currency.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookstore_common::BookId;
use bookstore_pricer::{Pricer, PricerConfig};

/// Bookstore pricing CLI
#[derive(Parser, Debug)]
#[command(name = "pricer")]
#[command(about = "Suggested resale pricing for the bookstore inventory")]
struct Args {
    /// JSON file with the book catalog (overrides BOOK_CATALOG_PATH)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Exchange rate API URL (overrides EXCHANGE_RATE_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Quote a suggested price for a book
    Quote {
        /// Book ID
        book_id: BookId,

        /// Target currency code (ISO 4217)
        currency: String,

        /// Profit margin percentage (default: 30)
        #[arg(short, long)]
        margin: Option<Decimal>,
    },

    /// Print the current exchange rate table
    Rates,

    /// List the books in the catalog
    Books {
        /// Only show books with stock at or below this quantity
        #[arg(long)]
        low_stock: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging();

    let mut config = PricerConfig::from_env();
    if let Some(path) = args.catalog {
        config.catalog_path = Some(path);
    }
    if let Some(url) = args.api_url {
        config.rates.api_url = url;
    }

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    let pricer = Pricer::from_config(&config).context("failed to start pricer")?;

    match args.command {
        Command::Quote {
            book_id,
            currency,
            margin,
        } => {
            let quote = pricer
                .quote(book_id, &currency, margin)
                .await
                .with_context(|| format!("failed to price book {}", book_id))?;
            print_json(&quote)?;
        }
        Command::Rates => {
            let snapshot = pricer
                .rates()
                .await
                .context("failed to load exchange rates")?;
            print_json(snapshot.as_ref())?;
        }
        Command::Books { low_stock } => {
            let books = match low_stock {
                Some(threshold) => pricer.catalog().low_stock(threshold),
                None => pricer.books(),
            };
            print_json(&books)?;
        }
    }

    info!(stats = ?pricer.rate_cache().stats(), "Done");
    Ok(())
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .or_else(|_| std::env::var("LOG_LEVEL"))
            .unwrap_or_else(|_| "info".into()),
    );
    let json = std::env::var("LOG_FORMAT").map_or(false, |f| f.eq_ignore_ascii_case("json"));

    // Logs go to stderr so stdout stays valid JSON.
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
