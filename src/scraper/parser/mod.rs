mod detail;
pub(crate) mod patterns;
mod profile;

pub use detail::{DetailOutcome, UnusablePage, enrich_media, parse_detail_document};
pub use profile::{normalize_title, parse_profile_media_tab, read_profile_media_tab};
