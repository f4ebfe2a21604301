mod cache;
mod enricher;
mod parser;
mod provider;
mod ratelimit;
mod types;


pub use cache::{
    CacheInvalidator, CacheStats, DiskCache, ProfileTabType, RawDataRetriever, RawPage,
    cache_identifier,
};
pub use parser::{
    DetailOutcome, UnusablePage, enrich_media, normalize_title, parse_detail_document,
    parse_profile_media_tab, read_profile_media_tab,
};
pub use provider::{HttpClient, PROXER_BASE_URL, PageFetcher, detail_url, profile_tab_url};
pub use ratelimit::{RateLimiter, RateLimiters};
pub use types::{
    Media, MediaType, ReleasePeriod, Season, Status, Watchlist, WatchlistCategory,
};

/// Scraper result type
pub type Result<T> = std::result::Result<T, ScraperError>;

/// Scraper error types
#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limit exceeded: captcha required")]
    CaptchaRequired,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Worker failed: {0}")]
    Worker(String),
}
