use super::Media;
use serde::{Deserialize, Serialize};

/// One of the four state groupings on a profile tab
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WatchlistCategory {
    pub entries: Vec<Media>,
    /// Set once every entry has been enriched; further enrichment is a no-op
    pub extra_data_loaded: bool,
}

impl WatchlistCategory {
    pub fn new(entries: Vec<Media>) -> Self {
        Self {
            entries,
            extra_data_loaded: false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A parsed profile tab, in `state0..state3` order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Watchlist {
    pub watched: WatchlistCategory,
    pub currently_watching: WatchlistCategory,
    pub to_watch: WatchlistCategory,
    pub stopped_watching: WatchlistCategory,
}

impl Watchlist {
    /// Anchor names of the four categories, in document order
    pub const STATE_ANCHORS: [&'static str; 4] = ["state0", "state1", "state2", "state3"];

    pub fn categories(&self) -> [&WatchlistCategory; 4] {
        [
            &self.watched,
            &self.currently_watching,
            &self.to_watch,
            &self.stopped_watching,
        ]
    }

    pub fn categories_mut(&mut self) -> [&mut WatchlistCategory; 4] {
        [
            &mut self.watched,
            &mut self.currently_watching,
            &mut self.to_watch,
            &mut self.stopped_watching,
        ]
    }
}
