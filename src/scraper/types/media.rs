use serde::{Deserialize, Serialize};

/// Media type classification, as labelled on the profile tab.
///
/// Serialised as the site's label string; unknown labels are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MediaType {
    Series,
    Special,
    Movie,
    Manga,
    Webtoon,
    Manhwa,
    Doujinshi,
    Other(String),
}

impl MediaType {
    /// Map a site label onto a media type
    pub fn from_label(label: &str) -> Self {
        match label {
            "Animeserie" => Self::Series,
            "Special" => Self::Special,
            "Movie" => Self::Movie,
            "Mangaserie" => Self::Manga,
            "Webtoon" => Self::Webtoon,
            "Manhwa" => Self::Manhwa,
            "Doujinshi" => Self::Doujinshi,
            other => Self::Other(other.to_string()),
        }
    }

    /// The site label for this type
    pub fn as_label(&self) -> &str {
        match self {
            Self::Series => "Animeserie",
            Self::Special => "Special",
            Self::Movie => "Movie",
            Self::Manga => "Mangaserie",
            Self::Webtoon => "Webtoon",
            Self::Manhwa => "Manhwa",
            Self::Doujinshi => "Doujinshi",
            Self::Other(label) => label,
        }
    }

    /// Whether this is one of the labels the anime tab uses directly
    pub fn is_anime(&self) -> bool {
        matches!(self, Self::Series | Self::Special | Self::Movie)
    }
}

impl Default for MediaType {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for MediaType {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<MediaType> for String {
    fn from(media_type: MediaType) -> Self {
        media_type.as_label().to_string()
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Airing/publishing status, taken from the status icon's `title` attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Finished,
    PreAiring,
    Airing,
    Other(String),
}

impl Status {
    pub fn from_label(label: &str) -> Self {
        match label {
            "Abgeschlossen" => Self::Finished,
            "Nicht erschienen (Pre-Airing)" => Self::PreAiring,
            "Airing" => Self::Airing,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_label(&self) -> &str {
        match self {
            Self::Finished => "Abgeschlossen",
            Self::PreAiring => "Nicht erschienen (Pre-Airing)",
            Self::Airing => "Airing",
            Self::Other(label) => label,
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for Status {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.as_label().to_string()
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Quarter of the year a release started or ended in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    /// Winter
    Q1,
    /// Frühling
    Q2,
    /// Sommer
    Q3,
    /// Herbst
    Q4,
}

impl Season {
    /// Map the German season word used on detail pages
    pub fn from_german(word: &str) -> Option<Self> {
        match word {
            "Winter" => Some(Self::Q1),
            "Frühling" => Some(Self::Q2),
            "Sommer" => Some(Self::Q3),
            "Herbst" => Some(Self::Q4),
            _ => None,
        }
    }
}

/// Release period; the end is absent when only one season is listed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleasePeriod {
    pub from_season: Option<Season>,
    pub from_year: Option<i32>,
    pub to_season: Option<Season>,
    pub to_year: Option<i32>,
}

/// One watchlist entry.
///
/// The profile-derived fields are set by the profile parser and never
/// reassigned. The detail-derived fields stay at their defaults until the
/// entry is enriched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub episodes_watched: u16,
    pub episode_count: u16,
    pub title: String,
    pub media_type: MediaType,
    /// Site-relative path, `/info/<id>...`
    pub proxer_url: String,
    pub status: Status,

    pub english_title: String,
    pub german_title: String,
    pub japanese_title: String,
    pub synonyms: Vec<String>,
    pub rating: f64,
    pub release_period: ReleasePeriod,
    pub genres: Vec<String>,
}

impl Media {
    /// Copy the detail-derived fields of `other` onto this entry
    pub fn apply_details(&mut self, other: Media) {
        self.english_title = other.english_title;
        self.german_title = other.german_title;
        self.japanese_title = other.japanese_title;
        self.synonyms = other.synonyms;
        self.rating = other.rating;
        self.release_period = other.release_period;
        self.genres = other.genres;
    }

    /// A copy carrying only the profile-derived fields
    pub fn without_details(&self) -> Media {
        Media {
            episodes_watched: self.episodes_watched,
            episode_count: self.episode_count,
            title: self.title.clone(),
            media_type: self.media_type.clone(),
            proxer_url: self.proxer_url.clone(),
            status: self.status.clone(),
            ..Default::default()
        }
    }

    /// Episodes still left to watch, zero if the counts are inconsistent
    pub fn episodes_left(&self) -> u16 {
        self.episode_count.saturating_sub(self.episodes_watched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_labels() {
        assert_eq!(MediaType::from_label("Animeserie"), MediaType::Series);
        assert_eq!(MediaType::from_label("Mangaserie"), MediaType::Manga);
        assert_eq!(
            MediaType::from_label("Lightnovel"),
            MediaType::Other("Lightnovel".to_string())
        );
        assert_eq!(MediaType::Other("OVA".to_string()).as_label(), "OVA");
        assert!(MediaType::Movie.is_anime());
        assert!(!MediaType::Manhwa.is_anime());
    }

    #[test]
    fn test_media_type_serializes_as_label() {
        let json = serde_json::to_string(&MediaType::Series).unwrap();
        assert_eq!(json, "\"Animeserie\"");

        let parsed: Status = serde_json::from_str("\"Nicht erschienen (Pre-Airing)\"").unwrap();
        assert_eq!(parsed, Status::PreAiring);
    }

    #[test]
    fn test_season_from_german() {
        assert_eq!(Season::from_german("Winter"), Some(Season::Q1));
        assert_eq!(Season::from_german("Frühling"), Some(Season::Q2));
        assert_eq!(Season::from_german("Sommer"), Some(Season::Q3));
        assert_eq!(Season::from_german("Herbst"), Some(Season::Q4));
        assert_eq!(Season::from_german("Spring"), None);
    }

    #[test]
    fn test_apply_details_keeps_profile_fields() {
        let mut media = Media {
            title: "My Show".to_string(),
            proxer_url: "/info/1".to_string(),
            episodes_watched: 3,
            ..Default::default()
        };
        let details = Media {
            title: "ignored".to_string(),
            rating: 4.5,
            genres: vec!["Action".to_string()],
            ..Default::default()
        };

        media.apply_details(details);

        assert_eq!(media.title, "My Show");
        assert_eq!(media.episodes_watched, 3);
        assert_eq!(media.rating, 4.5);
        assert_eq!(media.genres, vec!["Action".to_string()]);
    }

    #[test]
    fn test_episodes_left_tolerates_overshoot() {
        let media = Media {
            episodes_watched: 14,
            episode_count: 12,
            ..Default::default()
        };
        assert_eq!(media.episodes_left(), 0);
    }
}
