mod http;

pub use http::{HttpClient, PageFetcher};

use crate::scraper::cache::ProfileTabType;
use crate::scraper::types::Media;

/// Base URL all site-relative paths are resolved against
pub const PROXER_BASE_URL: &str = "https://proxer.me";

/// Absolute URL of an entry's detail page
#[must_use]
pub fn detail_url(media: &Media) -> String {
    format!("{PROXER_BASE_URL}{}", media.proxer_url)
}

/// Absolute URL of one tab of a user profile
#[must_use]
pub fn profile_tab_url(profile_id: &str, tab: ProfileTabType) -> String {
    format!("{PROXER_BASE_URL}/user/{profile_id}/{tab}")
}
