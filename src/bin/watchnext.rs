//! Suggests the highest-rated, already released entry of the "to watch" list.
//!
//! Reads a profile anime tab from stdin.

use proxerscrape::config::AppConfig;
use proxerscrape::logging;
use proxerscrape::scraper::{DiskCache, Status, read_profile_media_tab};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init(false);

    let config = AppConfig::from_env()?;
    let mut watchlist = read_profile_media_tab(tokio::io::stdin()).await?;

    let cache = Arc::new(DiskCache::from_config(&config).await?);
    watchlist.to_watch.load_extra_data(cache).await?;

    let next = watchlist
        .to_watch
        .entries
        .iter()
        .filter(|media| media.status != Status::PreAiring)
        .max_by(|a, b| a.rating.total_cmp(&b.rating));

    match next {
        Some(media) => println!("Next, you should watch: {}", media.title),
        None => println!("It seems like there's nothing available on your watchlist right now."),
    }

    Ok(())
}
