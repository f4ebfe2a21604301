mod media;
mod watchlist;

pub use media::{Media, MediaType, ReleasePeriod, Season, Status};
pub use watchlist::{Watchlist, WatchlistCategory};
