use crate::scraper::types::Media;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Token bucket admitting at most `max_permits` acquisitions per rolling `window`.
///
/// Waiters are served first-come-first-served: the grant log sits behind a
/// fair mutex and the waiter at the head keeps the lock while it sleeps.
/// Dropping an `acquire` future before it resolves consumes no permit.
#[derive(Debug)]
pub struct RateLimiter {
    name: &'static str,
    max_permits: usize,
    window: Duration,
    grants: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(name: &'static str, max_permits: usize, window: Duration) -> Self {
        let max_permits = max_permits.max(1);
        Self {
            name,
            max_permits,
            window,
            grants: Mutex::new(VecDeque::with_capacity(max_permits)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn max_permits(&self) -> usize {
        self.max_permits
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Wait until a permit is available and consume it
    pub async fn acquire(&self) {
        let mut grants = self.grants.lock().await;
        loop {
            let now = Instant::now();
            self.expire(&mut grants, now);

            if grants.len() < self.max_permits {
                grants.push_back(now);
                return;
            }

            let Some(&oldest) = grants.front() else {
                continue;
            };
            let ready_at = oldest + self.window;
            debug!(
                "Rate limiter {} exhausted, waiting {:?}",
                self.name,
                ready_at.saturating_duration_since(now)
            );
            tokio::time::sleep_until(ready_at).await;
        }
    }

    /// Permits that could be acquired right now without waiting
    pub async fn available_permits(&self) -> usize {
        let mut grants = self.grants.lock().await;
        self.expire(&mut grants, Instant::now());
        self.max_permits - grants.len()
    }

    fn expire(&self, grants: &mut VecDeque<Instant>, now: Instant) {
        while let Some(&oldest) = grants.front()
            && now.duration_since(oldest) >= self.window
        {
            grants.pop_front();
        }
    }
}

/// The limiters for each proxer.me endpoint class.
///
/// Each stays slightly below the site's published ceiling: 20 per 6 minutes
/// for anime pages, 10 per 5 minutes for manga pages and 40 per 6 minutes
/// for profile tabs.
#[derive(Debug, Clone)]
pub struct RateLimiters {
    pub anime: Arc<RateLimiter>,
    pub manga: Arc<RateLimiter>,
    pub profile_tab: Arc<RateLimiter>,
}

impl RateLimiters {
    pub fn proxer() -> Self {
        Self {
            anime: Arc::new(RateLimiter::new("anime", 18, Duration::from_secs(6 * 60))),
            manga: Arc::new(RateLimiter::new("manga", 8, Duration::from_secs(5 * 60))),
            profile_tab: Arc::new(RateLimiter::new(
                "profile_tab",
                38,
                Duration::from_secs(6 * 60),
            )),
        }
    }

    /// Limiter guarding the detail page of `media`
    pub fn for_media(&self, media: &Media) -> &Arc<RateLimiter> {
        if media.media_type.is_anime() {
            &self.anime
        } else {
            &self.manga
        }
    }
}

impl Default for RateLimiters {
    fn default() -> Self {
        Self::proxer()
    }
}
