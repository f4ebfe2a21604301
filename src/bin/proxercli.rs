//! Maintenance commands for the page cache and profile retrieval.

use clap::{Parser, Subcommand};
use proxerscrape::config::AppConfig;
use proxerscrape::logging;
use proxerscrape::scraper::{DiskCache, ProfileTabType, parse_profile_media_tab};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Parser)]
#[command(name = "proxercli", about = "Scrape proxer.me watchlists")]
struct Cli {
    /// Print additional, potentially unnecessary information
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Inspect or clear the page cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Retrieve a profile tab and print its watchlist as JSON
    FetchProfile {
        profile_id: String,
        /// anime, manga or novel
        #[arg(default_value = "anime")]
        tab: ProfileTabType,
        /// Also load detail pages for every entry
        #[arg(long)]
        enrich: bool,
    },
}

#[derive(Debug, Subcommand)]
enum CacheAction {
    /// Show location, number and size of cached pages
    Info,
    /// Delete every cached page
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = AppConfig::from_env()?;
    let cache = Arc::new(DiskCache::from_config(&config).await?);

    match cli.command {
        Command::Cache {
            action: CacheAction::Info,
        } => {
            let stats = cache.stats().await?;
            println!("Cache directory: {}", cache.root().display());
            println!("Cached pages: {}", stats.files);
            println!("Total size: {} bytes", stats.bytes);
        }
        Command::Cache {
            action: CacheAction::Clear,
        } => {
            cache.clear().await?;
            println!("Cache cleared.");
        }
        Command::FetchProfile {
            profile_id,
            tab,
            enrich,
        } => {
            let page = cache.retrieve_profile_tab_raw_data(&profile_id, tab).await?;
            let (html, invalidator) = page.into_body().await?;
            let mut watchlist = match parse_profile_media_tab(&html) {
                Ok(watchlist) => watchlist,
                Err(e) => {
                    warn!("Discarding cached profile tab: {}", e);
                    invalidator.invalidate().await?;
                    return Err(e.into());
                }
            };

            if enrich {
                for category in watchlist.categories_mut() {
                    category.load_extra_data(cache.clone()).await?;
                }
            }

            println!("{}", serde_json::to_string_pretty(&watchlist)?);
        }
    }

    Ok(())
}
