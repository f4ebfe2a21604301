use super::PROXER_BASE_URL;
use crate::config::LoginCookie;
use crate::scraper::{Result, ScraperError};
use async_trait::async_trait;
use reqwest::{Client, Url, cookie::Jar};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Source of raw page bodies.
///
/// Status codes are not interpreted: whatever body the server sends is
/// returned, so that the parsers can classify it.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// HTTP client wrapper for proxer.me
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client, with the login cookie in its jar if given
    pub fn new(login_cookie: Option<LoginCookie>) -> Result<Self> {
        let jar = cookie_jar(login_cookie.as_ref())?;
        let client = Client::builder()
            .user_agent(concat!("proxerscrape/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .cookie_provider(jar)
            .build()
            .map_err(ScraperError::Network)?;

        Ok(Self { client })
    }
}

/// Cookie jar holding the login cookie, scoped to https proxer.me
fn cookie_jar(login_cookie: Option<&LoginCookie>) -> Result<Arc<Jar>> {
    let jar = Arc::new(Jar::default());
    if let Some(cookie) = login_cookie {
        let base: Url = PROXER_BASE_URL
            .parse()
            .map_err(|e| ScraperError::Config(format!("{PROXER_BASE_URL}: {e}")))?;
        jar.add_cookie_str(&cookie.set_cookie_value(), &base);
    }
    Ok(jar)
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ScraperError::Network)?;
        debug!("GET {} -> {}", url, response.status());

        let body = response.bytes().await.map_err(ScraperError::Network)?;
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::cookie::CookieStore;

    fn jar_with_cookie() -> Arc<Jar> {
        cookie_jar(Some(&LoginCookie {
            name: "session".to_string(),
            value: "secret".to_string(),
        }))
        .unwrap()
    }

    fn cookie_header(jar: &Jar, url: &str) -> Option<String> {
        jar.cookies(&Url::parse(url).unwrap())
            .map(|value| value.to_str().unwrap().to_string())
    }

    #[test]
    fn test_cookie_sent_to_proxer() {
        let jar = jar_with_cookie();

        assert_eq!(
            cookie_header(&jar, "https://proxer.me/info/296"),
            Some("session=secret".to_string())
        );
        assert_eq!(
            cookie_header(&jar, "https://www.proxer.me/user/1/anime"),
            Some("session=secret".to_string())
        );
    }

    #[test]
    fn test_cookie_withheld_outside_scope() {
        let jar = jar_with_cookie();

        assert!(cookie_header(&jar, "http://proxer.me/info/296").is_none());
        assert!(cookie_header(&jar, "https://notproxer.me/info/296").is_none());
        assert!(cookie_header(&jar, "https://example.com/").is_none());
    }

    #[test]
    fn test_no_cookie_configured() {
        let jar = cookie_jar(None).unwrap();
        assert!(cookie_header(&jar, "https://proxer.me/info/296").is_none());
        assert!(HttpClient::new(None).is_ok());
    }
}
