use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;

/// Pre-compiled regex patterns shared by the parsers and the cache
pub struct Patterns {
    /// `/info/<id>...`, capturing the numeric id
    pub info_path: Regex,
    /// Runs of two or more whitespace characters inside a title
    pub whitespace_run: Regex,
    /// `<watched> / <count>` episode progress
    pub episode_counts: Regex,
    /// `<season word> <year>`
    pub season_year: Regex,
}

impl Patterns {
    fn new() -> Self {
        Self {
            info_path: Regex::new(r"^/info/(\d+)").expect("Invalid regex"),
            whitespace_run: Regex::new(r"\s{2,}").expect("Invalid regex"),
            episode_counts: Regex::new(r"^\s*(\d+)\s*/\s*(\d+)").expect("Invalid regex"),
            season_year: Regex::new(r"^\s*(\S+)\s+(-?\d+)").expect("Invalid regex"),
        }
    }
}

pub static PATTERNS: LazyLock<Patterns> = LazyLock::new(Patterns::new);

/// Compile a static CSS selector
pub(super) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("Invalid selector")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_path() {
        let caps = PATTERNS.info_path.captures("/info/296#top").unwrap();
        assert_eq!(&caps[1], "296");
        assert!(PATTERNS.info_path.captures("/info/abc").is_none());
    }

    #[test]
    fn test_episode_counts() {
        let caps = PATTERNS.episode_counts.captures("3 / 12").unwrap();
        assert_eq!((&caps[1], &caps[2]), ("3", "12"));
        assert!(PATTERNS.episode_counts.captures("? / 12").is_none());
    }

    #[test]
    fn test_season_year() {
        let caps = PATTERNS.season_year.captures("Frühling 2019").unwrap();
        assert_eq!((&caps[1], &caps[2]), ("Frühling", "2019"));
        assert!(PATTERNS.season_year.captures("Winter").is_none());
    }
}
