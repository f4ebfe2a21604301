//! Scraper for proxer.me profile watchlists.
//!
//! The profile parser turns a profile media tab into a [`scraper::Watchlist`];
//! each [`scraper::WatchlistCategory`] can then be enriched with data from the
//! per-entry detail pages, which are fetched through a rate-limited disk cache.

pub mod config;
pub mod logging;
pub mod scraper;
