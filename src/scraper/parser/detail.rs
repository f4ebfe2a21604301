use super::patterns::{PATTERNS, selector};
use crate::scraper::{
    Result, ScraperError,
    cache::RawPage,
    types::{Media, Season},
};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, warn};

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static H3: LazyLock<Selector> = LazyLock::new(|| selector("h3"));
static CAPTCHA: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"script[src="//www.google.com/recaptcha/api.js"]"#));
static DETAILS_TABLE: LazyLock<Selector> = LazyLock::new(|| selector("table.details"));
static BOLD: LazyLock<Selector> = LazyLock::new(|| selector("b"));
static LINK: LazyLock<Selector> = LazyLock::new(|| selector("a"));
static GENRE_TAG: LazyLock<Selector> = LazyLock::new(|| selector("a.genreTag"));
static AVERAGE: LazyLock<Selector> = LazyLock::new(|| selector(".average"));

const LOGIN_BANNER: &str = "Bitte logge dich ein";

/// Why a fetched detail page carries no usable data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusablePage {
    /// The entry no longer exists
    NotFound,
    /// The entry is age-restricted and needs a logged-in session
    LoginRequired,
}

/// Result of parsing one detail page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailOutcome {
    Enriched,
    Unusable(UnusablePage),
}

/// Read `page` and fill the detail fields of `media`.
///
/// Unusable pages are dropped from the cache and leave `media` untouched.
/// A captcha page is an error, and stays cached.
pub async fn enrich_media(media: &mut Media, page: RawPage) -> Result<DetailOutcome> {
    let (html, invalidator) = page.into_body().await?;
    let outcome = parse_detail_document(&html, media)?;

    if let DetailOutcome::Unusable(reason) = outcome {
        match reason {
            UnusablePage::NotFound => {
                warn!("{} ({}) no longer exists, skipping", media.title, media.proxer_url);
            }
            UnusablePage::LoginRequired => {
                warn!(
                    "{} ({}) requires a login; set LOGIN_COOKIE_KEY and LOGIN_COOKIE_VALUE to include it",
                    media.title, media.proxer_url
                );
            }
        }
        invalidator.invalidate().await?;
    }

    Ok(outcome)
}

/// Classify a detail page and, if usable, extract its data into `media`
pub fn parse_detail_document(html: &str, media: &mut Media) -> Result<DetailOutcome> {
    let document = Html::parse_document(html);

    if let Some(reason) = classify(&document)? {
        return Ok(DetailOutcome::Unusable(reason));
    }

    if let Some(table) = document.select(&DETAILS_TABLE).next() {
        parse_details_table(table, media);
    } else {
        debug!("No details table for {}", media.proxer_url);
    }

    let rating = document
        .select(&AVERAGE)
        .next()
        .map(|element| element.text().collect::<String>())
        .ok_or_else(|| ScraperError::Parse(format!("no rating on {}", media.proxer_url)))?;
    media.rating = rating
        .trim()
        .parse()
        .map_err(|e| ScraperError::Parse(format!("invalid rating {rating:?}: {e}")))?;

    Ok(DetailOutcome::Enriched)
}

fn classify(document: &Html) -> Result<Option<UnusablePage>> {
    let not_found = document
        .select(&TITLE)
        .next()
        .is_some_and(|title| title.text().collect::<String>().contains("404"));
    if not_found {
        return Ok(Some(UnusablePage::NotFound));
    }

    let login_required = document.select(&H3).next().is_some_and(|heading| {
        heading
            .text()
            .collect::<String>()
            .trim()
            .starts_with(LOGIN_BANNER)
    });
    if login_required {
        return Ok(Some(UnusablePage::LoginRequired));
    }

    if document.select(&CAPTCHA).next().is_some() {
        return Err(ScraperError::CaptchaRequired);
    }

    Ok(None)
}

fn parse_details_table(table: ElementRef<'_>, media: &mut Media) {
    let rows = table
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|section| section.value().name() == "tbody")
        .flat_map(|section| section.children().filter_map(ElementRef::wrap))
        .filter(|row| row.value().name() == "tr");

    for row in rows {
        let mut cells = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|cell| cell.value().name() == "td");
        let (Some(key_cell), Some(value)) = (cells.next(), cells.next()) else {
            continue;
        };
        let Some(key) = key_cell.select(&BOLD).next() else {
            continue;
        };

        match key.text().collect::<String>().trim() {
            "Englischer Titel" => media.english_title = text_of(value),
            "Deutscher Titel" => media.german_title = text_of(value),
            "Japanischer Titel" => media.japanese_title = text_of(value),
            "Synonym" => media.synonyms.push(text_of(value)),
            "Genres" => media
                .genres
                .extend(value.select(&GENRE_TAG).map(text_of)),
            "Season" => parse_release_period(value, media),
            _ => {}
        }
    }
}

/// First link is the start season, an optional second one the end season.
/// Unparseable seasons leave the period as it was.
fn parse_release_period(value: ElementRef<'_>, media: &mut Media) {
    let mut links = value.select(&LINK);

    if let Some((season, year)) = links.next().and_then(|a| parse_season(&text_of(a))) {
        media.release_period.from_season = Some(season);
        media.release_period.from_year = Some(year);
    }
    if let Some((season, year)) = links.next().and_then(|a| parse_season(&text_of(a))) {
        media.release_period.to_season = Some(season);
        media.release_period.to_year = Some(year);
    }
}

fn parse_season(text: &str) -> Option<(Season, i32)> {
    let caps = PATTERNS.season_year.captures(text)?;
    let season = Season::from_german(&caps[1])?;
    let year = caps[2].parse().ok()?;
    Some((season, year))
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::types::ReleasePeriod;

    fn details_page(rows: &str, rating: &str) -> String {
        format!(
            r#"<html><head><title>My Show - Proxer.Me</title></head><body>
            <h3>Details</h3>
            <table class="details"><tbody>{rows}</tbody></table>
            <div><span class="average">{rating}</span></div>
            </body></html>"#
        )
    }

    fn detail_row(key: &str, value: &str) -> String {
        format!("<tr><td><b>{key}</b></td><td>{value}</td></tr>")
    }

    fn media() -> Media {
        Media {
            title: "My Show".to_string(),
            proxer_url: "/info/12345#top".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_extracts_titles_synonyms_and_genres() {
        let rows = [
            detail_row("Englischer Titel", " My Show "),
            detail_row("Deutscher Titel", "Meine Serie"),
            detail_row("Japanischer Titel", "マイショー"),
            detail_row("Synonym", "MS"),
            detail_row("Synonym", "MS"),
            detail_row(
                "Genres",
                r#"<a class="genreTag" href="/g/1">Action</a> <a class="genreTag" href="/g/2">Drama</a>"#,
            ),
        ]
        .concat();
        let mut media = media();

        let outcome = parse_detail_document(&details_page(&rows, "4.3"), &mut media).unwrap();

        assert_eq!(outcome, DetailOutcome::Enriched);
        assert_eq!(media.english_title, "My Show");
        assert_eq!(media.german_title, "Meine Serie");
        assert_eq!(media.japanese_title, "マイショー");
        assert_eq!(media.synonyms, vec!["MS".to_string(), "MS".to_string()]);
        assert_eq!(media.genres, vec!["Action".to_string(), "Drama".to_string()]);
        assert_eq!(media.rating, 4.3);
    }

    #[test]
    fn test_season_range() {
        let rows = detail_row("Season", "<a>Winter 2020</a><a>Sommer 2021</a>");
        let mut media = media();

        parse_detail_document(&details_page(&rows, "3.0"), &mut media).unwrap();

        assert_eq!(
            media.release_period,
            ReleasePeriod {
                from_season: Some(Season::Q1),
                from_year: Some(2020),
                to_season: Some(Season::Q3),
                to_year: Some(2021),
            }
        );
    }

    #[test]
    fn test_single_season() {
        let rows = detail_row("Season", "<a>Herbst 2015</a>");
        let mut media = media();

        parse_detail_document(&details_page(&rows, "3.0"), &mut media).unwrap();

        assert_eq!(media.release_period.from_season, Some(Season::Q4));
        assert_eq!(media.release_period.from_year, Some(2015));
        assert_eq!(media.release_period.to_season, None);
        assert_eq!(media.release_period.to_year, None);
    }

    #[test]
    fn test_unparseable_season_is_ignored() {
        let rows = detail_row("Season", "<a>Unbekannt</a>");
        let mut media = media();

        let outcome = parse_detail_document(&details_page(&rows, "3.0"), &mut media).unwrap();

        assert_eq!(outcome, DetailOutcome::Enriched);
        assert_eq!(media.release_period, ReleasePeriod::default());
    }

    #[test]
    fn test_not_found_page() {
        let html = "<html><head><title>404 — not found</title></head><body></body></html>";
        let mut media = media();

        let outcome = parse_detail_document(html, &mut media).unwrap();

        assert_eq!(outcome, DetailOutcome::Unusable(UnusablePage::NotFound));
        assert_eq!(media.rating, 0.0);
    }

    #[test]
    fn test_login_required_page() {
        let html = "<html><head><title>Proxer</title></head><body><h3> Bitte logge dich ein, um diesen Inhalt zu sehen.</h3></body></html>";
        let mut media = media();

        let outcome = parse_detail_document(html, &mut media).unwrap();

        assert_eq!(outcome, DetailOutcome::Unusable(UnusablePage::LoginRequired));
    }

    #[test]
    fn test_captcha_page_is_fatal() {
        let html = r#"<html><head><title>Proxer</title><script src="//www.google.com/recaptcha/api.js"></script></head><body></body></html>"#;
        let mut media = media();

        let result = parse_detail_document(html, &mut media);

        assert!(matches!(result, Err(ScraperError::CaptchaRequired)));
    }

    #[test]
    fn test_bad_rating_is_fatal() {
        let mut media = media();

        let result = parse_detail_document(&details_page("", "n/a"), &mut media);

        assert!(matches!(result, Err(ScraperError::Parse(_))));
    }

    #[test]
    fn test_unknown_keys_are_skipped() {
        let rows = [
            detail_row("Studio", "Madhouse"),
            detail_row("Englischer Titel", "Known"),
        ]
        .concat();
        let mut media = media();

        parse_detail_document(&details_page(&rows, "2.5"), &mut media).unwrap();

        assert_eq!(media.english_title, "Known");
        assert!(media.synonyms.is_empty());
    }
}
