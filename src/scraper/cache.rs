use crate::config::AppConfig;
use crate::scraper::{
    Result, ScraperError,
    parser::patterns::PATTERNS,
    provider::{HttpClient, PageFetcher, detail_url, profile_tab_url},
    ratelimit::RateLimiters,
    types::Media,
};
use async_trait::async_trait;
use std::future::Future;
use std::io::{Cursor, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Cache key of a detail page: the numeric id from `/info/<id>...`
pub fn cache_identifier(media: &Media) -> Result<&str> {
    PATTERNS
        .info_path
        .captures(&media.proxer_url)
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str())
        .ok_or_else(|| {
            ScraperError::Parse(format!(
                "not an /info/<id> path: {:?}",
                media.proxer_url
            ))
        })
}

/// Profile tabs that can be fetched and cached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileTabType {
    Anime,
    Manga,
    Novel,
}

impl ProfileTabType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Anime => "anime",
            Self::Manga => "manga",
            Self::Novel => "novel",
        }
    }
}

impl std::fmt::Display for ProfileTabType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProfileTabType {
    type Err = ScraperError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "anime" => Ok(Self::Anime),
            "manga" => Ok(Self::Manga),
            "novel" => Ok(Self::Novel),
            other => Err(ScraperError::Config(format!("unknown profile tab: {other}"))),
        }
    }
}

/// Removes one cached page, so that a consumer can disown a page it
/// recognised as unusable.
#[derive(Debug, Clone)]
pub struct CacheInvalidator {
    path: PathBuf,
}

impl CacheInvalidator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the cached file. A file that is already gone is not an error.
    pub async fn invalidate(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!("Invalidated cache entry {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ScraperError::Io(e)),
        }
    }
}

/// A retrieved page: its body plus the hook to drop it from the cache
pub struct RawPage {
    pub reader: Box<dyn AsyncRead + Send + Unpin>,
    pub invalidator: CacheInvalidator,
}

impl RawPage {
    /// Page backed by an in-memory body
    pub fn from_bytes(body: Vec<u8>, invalidator: CacheInvalidator) -> Self {
        Self {
            reader: Box::new(Cursor::new(body)),
            invalidator,
        }
    }

    /// Read the whole body. Invalid UTF-8 is replaced rather than rejected.
    pub async fn read_to_string(&mut self) -> Result<String> {
        let mut body = Vec::new();
        self.reader.read_to_end(&mut body).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Read the whole body and close the reader, keeping only the invalidator.
    ///
    /// The cached file is no longer held open afterwards, so it can be
    /// removed on every platform.
    pub async fn into_body(mut self) -> Result<(String, CacheInvalidator)> {
        let body = self.read_to_string().await?;
        Ok((body, self.invalidator))
    }
}

impl std::fmt::Debug for RawPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawPage")
            .field("invalidator", &self.invalidator)
            .finish_non_exhaustive()
    }
}

/// Source of detail pages for the enrichment workers
#[async_trait]
pub trait RawDataRetriever: Send + Sync {
    async fn retrieve(&self, media: &Media) -> Result<RawPage>;
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub files: u64,
    pub bytes: u64,
}

/// On-disk page cache.
///
/// Layout: `<root>/<id>.html` for detail pages and
/// `<root>/profile/<tab>.html` for profile tabs. There is no internal lock;
/// each enrichment worker works on its own id, so paths never contend.
#[derive(Clone)]
pub struct DiskCache {
    root: PathBuf,
    fetcher: Arc<dyn PageFetcher>,
    limiters: RateLimiters,
}

impl DiskCache {
    /// Create the cache, creating the directory tree if needed
    pub async fn new(
        root: impl Into<PathBuf>,
        fetcher: Arc<dyn PageFetcher>,
        limiters: RateLimiters,
    ) -> Result<Self> {
        let cache = Self {
            root: root.into(),
            fetcher,
            limiters,
        };
        tokio::fs::create_dir_all(cache.profile_dir()).await?;
        Ok(cache)
    }

    /// Production cache: proxer.me over HTTP with the site's rate limits
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let client = HttpClient::new(config.login_cookie.clone())?;
        Self::new(&config.cache_root, Arc::new(client), RateLimiters::proxer()).await
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn profile_dir(&self) -> PathBuf {
        self.root.join("profile")
    }

    /// Cache file of a detail page
    pub fn detail_path(&self, identifier: &str) -> PathBuf {
        self.root.join(format!("{identifier}.html"))
    }

    /// Cache file of a profile tab
    pub fn profile_tab_path(&self, tab: ProfileTabType) -> PathBuf {
        self.profile_dir().join(format!("{tab}.html"))
    }

    /// Detail page of `media`, from disk or fetched under the matching limiter
    pub async fn retrieve_detail_raw_data(&self, media: &Media) -> Result<RawPage> {
        let path = self.detail_path(cache_identifier(media)?);
        let limiter = self.limiters.for_media(media);

        retrieve(path, move || async move {
            limiter.acquire().await;
            self.fetcher.fetch(&detail_url(media)).await
        })
        .await
    }

    /// One tab of a user profile, from disk or fetched under the profile limiter
    pub async fn retrieve_profile_tab_raw_data(
        &self,
        profile_id: &str,
        tab: ProfileTabType,
    ) -> Result<RawPage> {
        let path = self.profile_tab_path(tab);

        retrieve(path, move || async move {
            self.limiters.profile_tab.acquire().await;
            self.fetcher.fetch(&profile_tab_url(profile_id, tab)).await
        })
        .await
    }

    /// Number and total size of cached pages, walked on the blocking pool
    pub async fn stats(&self) -> Result<CacheStats> {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || walk_stats(&root))
            .await
            .map_err(|e| ScraperError::Worker(e.to_string()))?
    }

    /// Remove every cached page and recreate the empty tree
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(ScraperError::Io(e)),
        }
        tokio::fs::create_dir_all(self.profile_dir()).await?;
        info!("Cleared cache at {}", self.root.display());
        Ok(())
    }
}

#[async_trait]
impl RawDataRetriever for DiskCache {
    async fn retrieve(&self, media: &Media) -> Result<RawPage> {
        self.retrieve_detail_raw_data(media).await
    }
}

fn walk_stats(root: &Path) -> Result<CacheStats> {
    let mut stats = CacheStats::default();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| ScraperError::Cache(e.to_string()))?;
        let is_page = entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == "html");
        if is_page {
            stats.files += 1;
            stats.bytes += entry
                .metadata()
                .map_err(|e| ScraperError::Cache(e.to_string()))?
                .len();
        }
    }
    Ok(stats)
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Serve `path` from disk, or fetch, persist and serve the fresh body
async fn retrieve<F, Fut>(path: PathBuf, fetch: F) -> Result<RawPage>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<u8>>>,
{
    let invalidator = CacheInvalidator::new(&path);

    match tokio::fs::File::open(&path).await {
        Ok(file) => {
            debug!("Cache hit: {}", path.display());
            return Ok(RawPage {
                reader: Box::new(file),
                invalidator,
            });
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Cache miss: {}", path.display());
        }
        Err(e) => return Err(ScraperError::Io(e)),
    }

    let body = fetch().await?;
    persist(&path, &body).await?;

    Ok(RawPage::from_bytes(body, invalidator))
}

/// Write to a sibling temp file and rename, so readers never see a partial page
async fn persist(path: &Path, body: &[u8]) -> Result<()> {
    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(format!(
        ".{}.{}.tmp",
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    let temp_path = PathBuf::from(temp_name);

    tokio::fs::write(&temp_path, body).await?;
    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(ScraperError::Io(e));
    }
    Ok(())
}
