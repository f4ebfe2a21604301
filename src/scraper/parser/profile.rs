use super::patterns::{PATTERNS, selector};
use crate::scraper::{
    Result, ScraperError,
    types::{Media, MediaType, Status, Watchlist, WatchlistCategory},
};
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

static IMG: LazyLock<Selector> = LazyLock::new(|| selector("img"));
static LINK: LazyLock<Selector> = LazyLock::new(|| selector("a"));
static SPAN: LazyLock<Selector> = LazyLock::new(|| selector("span"));

/// Rows preceding the entries of each table: header and column labels
const HEADER_ROWS: usize = 2;

/// Labels the anime tab shows directly in the type cell
const DIRECT_TYPE_LABELS: [&str; 3] = ["Animeserie", "Special", "Movie"];

/// Read a profile media tab from `reader` and parse it
pub async fn read_profile_media_tab<R>(mut reader: R) -> Result<Watchlist>
where
    R: AsyncRead + Unpin,
{
    let mut body = Vec::new();
    reader.read_to_end(&mut body).await?;
    parse_profile_media_tab(&String::from_utf8_lossy(&body))
}

/// Parse a profile media tab into its four watchlist categories.
///
/// Each category is the table directly following the `a[name=stateN]`
/// anchor. A missing anchor yields an empty category.
pub fn parse_profile_media_tab(html: &str) -> Result<Watchlist> {
    let document = Html::parse_document(html);

    let [watched, currently_watching, to_watch, stopped_watching] =
        Watchlist::STATE_ANCHORS.map(|state| parse_category(&document, state));

    Ok(Watchlist {
        watched: watched?,
        currently_watching: currently_watching?,
        to_watch: to_watch?,
        stopped_watching: stopped_watching?,
    })
}

fn parse_category(document: &Html, state: &str) -> Result<WatchlistCategory> {
    let anchor_selector = selector(&format!("a[name=\"{state}\"]"));
    let Some(table) = document
        .select(&anchor_selector)
        .next()
        .and_then(|anchor| anchor.next_siblings().find_map(ElementRef::wrap))
    else {
        debug!("No table for {state}");
        return Ok(WatchlistCategory::default());
    };

    let entries = table_rows(table)
        .skip(HEADER_ROWS)
        .enumerate()
        .map(|(index, row)| {
            parse_row(row).map_err(|e| {
                ScraperError::Parse(format!("{state}, entry {}: {e}", index + 1))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!("Parsed {} entries for {state}", entries.len());
    Ok(WatchlistCategory::new(entries))
}

/// `tr` children of the table's sections (`thead`/`tbody`), in order
fn table_rows(table: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    table
        .children()
        .filter_map(ElementRef::wrap)
        .flat_map(|section| section.children().filter_map(ElementRef::wrap))
        .filter(|row| row.value().name() == "tr")
}

fn parse_row(row: ElementRef<'_>) -> Result<Media> {
    let cells: Vec<ElementRef<'_>> = row.children().filter_map(ElementRef::wrap).collect();
    let cell = |index: usize| {
        cells.get(index).copied().ok_or_else(|| {
            ScraperError::Parse(format!("expected at least {} cells, got {}", index + 1, cells.len()))
        })
    };

    let status = cell(0)?
        .select(&IMG)
        .next()
        .and_then(|img| img.value().attr("title"))
        .ok_or_else(|| ScraperError::Parse("status image without title".to_string()))?;

    let link = cell(1)?
        .select(&LINK)
        .next()
        .ok_or_else(|| ScraperError::Parse("missing title link".to_string()))?;
    let proxer_url = link
        .value()
        .attr("href")
        .ok_or_else(|| ScraperError::Parse("title link without href".to_string()))?;
    if !PATTERNS.info_path.is_match(proxer_url) {
        return Err(ScraperError::Parse(format!(
            "not an /info/<id> path: {proxer_url:?}"
        )));
    }
    let title = normalize_title(&link.text().collect::<String>());

    let media_type = parse_media_type(cell(2)?);

    // cell 3 is the review column
    let counts = cell(4)?
        .select(&SPAN)
        .next()
        .map(|span| span.text().collect::<String>())
        .ok_or_else(|| ScraperError::Parse("missing episode counts".to_string()))?;
    let (episodes_watched, episode_count) = parse_episode_counts(&counts)?;

    Ok(Media {
        episodes_watched,
        episode_count,
        title,
        media_type,
        proxer_url: proxer_url.to_string(),
        status: Status::from_label(status),
        ..Default::default()
    })
}

/// Collapse whitespace runs to a single space and trim the ends
pub fn normalize_title(raw: &str) -> String {
    PATTERNS.whitespace_run.replace_all(raw, " ").trim().to_string()
}

/// The leaf label, unless it is a generic one followed by a more specific
/// label after the first `<br>` (e.g. "Mangaserie<br>Manhwa").
fn parse_media_type(cell: ElementRef<'_>) -> MediaType {
    let mut leaf = None;
    let mut after_br = None;
    let mut seen_br = false;

    for node in cell.children() {
        match node.value() {
            Node::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                if seen_br {
                    after_br.get_or_insert(text);
                } else {
                    leaf.get_or_insert(text);
                }
            }
            Node::Element(element) if element.name() == "br" => seen_br = true,
            _ => {}
        }
    }

    let leaf = leaf.unwrap_or_default();
    if DIRECT_TYPE_LABELS.contains(&leaf) {
        return MediaType::from_label(leaf);
    }
    MediaType::from_label(after_br.unwrap_or(leaf))
}

fn parse_episode_counts(text: &str) -> Result<(u16, u16)> {
    let invalid = || ScraperError::Parse(format!("invalid episode counts: {text:?}"));

    let caps = PATTERNS.episode_counts.captures(text).ok_or_else(invalid)?;
    let watched = caps[1].parse().map_err(|_| invalid())?;
    let count = caps[2].parse().map_err(|_| invalid())?;
    Ok((watched, count))
}
