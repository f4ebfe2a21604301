//! Prints how much viewing time is left on the "currently watching" and
//! "to watch" lists of a profile anime tab read from stdin.

use proxerscrape::logging;
use proxerscrape::scraper::{Media, MediaType, WatchlistCategory, read_profile_media_tab};
use std::time::Duration;

const MINUTE: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init(false);

    let watchlist = read_profile_media_tab(tokio::io::stdin()).await?;

    let currently_watching = print_category("Currently Watching", &watchlist.currently_watching);
    println!();
    let to_watch = print_category("To Watch", &watchlist.to_watch);

    println!();
    println!("{} on to watch list.", format_hours(to_watch));
    println!("{} on currently watching list.", format_hours(currently_watching));

    Ok(())
}

fn print_category(name: &str, category: &WatchlistCategory) -> Duration {
    println!("{name} ({})", category.len());
    category
        .entries
        .iter()
        .map(|media| {
            println!("{}", media.title);
            watch_time_left(media)
        })
        .sum()
}

fn watch_time_left(media: &Media) -> Duration {
    let episodes_left = u32::from(media.episodes_left());
    match media.media_type {
        MediaType::Series => MINUTE * 20 * episodes_left,
        MediaType::Special => MINUTE * 7 * episodes_left,
        MediaType::Movie => MINUTE * 90,
        _ => Duration::ZERO,
    }
}

fn format_hours(duration: Duration) -> String {
    format!("{:.1} hours", duration.as_secs_f64() / 3600.0)
}
