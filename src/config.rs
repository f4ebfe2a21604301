use crate::scraper::{Result, ScraperError};
use config::{Config, Environment};
use serde::Deserialize;
use std::path::PathBuf;

/// Name of the cache directory below the OS user-cache location
pub const CACHE_DIR_NAME: &str = "proxerscrape";

/// Login cookie attached to outbound requests.
///
/// The cookie is scoped to `proxer.me` with `Path=/`, `HttpOnly`, `Secure`
/// and `SameSite=Strict`, so it is only ever sent over https to that domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCookie {
    pub name: String,
    pub value: String,
}

impl LoginCookie {
    pub const DOMAIN: &'static str = "proxer.me";

    /// `Set-Cookie` form of the cookie, carrying its scope attributes
    #[must_use]
    pub fn set_cookie_value(&self) -> String {
        format!(
            "{}={}; Domain={}; Path=/; HttpOnly; Secure; SameSite=Strict",
            self.name,
            self.value,
            Self::DOMAIN
        )
    }
}

/// Process-wide settings, resolved once at startup and read-only afterwards
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root of the page cache, `<user cache dir>/proxerscrape` by default
    pub cache_root: PathBuf,
    /// Optional login cookie, present only if both name and value are set
    pub login_cookie: Option<LoginCookie>,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    login_cookie_key: Option<String>,
    login_cookie_value: Option<String>,
    proxerscrape_cache_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Resolve configuration from the process environment.
    ///
    /// Reads `LOGIN_COOKIE_KEY`, `LOGIN_COOKIE_VALUE` and the optional
    /// `PROXERSCRAPE_CACHE_DIR` override.
    pub fn from_env() -> Result<Self> {
        let config = Config::builder()
            .add_source(Environment::default())
            .build()
            .map_err(|e| ScraperError::Config(e.to_string()))?;

        Self::from_config(&config)
    }

    /// Resolve configuration from an already built [`Config`]
    pub fn from_config(config: &Config) -> Result<Self> {
        let raw: RawConfig = config
            .clone()
            .try_deserialize()
            .map_err(|e| ScraperError::Config(e.to_string()))?;

        let cache_root = match raw.proxerscrape_cache_dir {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => dirs::cache_dir()
                .ok_or_else(|| {
                    ScraperError::Config("no user cache directory available".to_string())
                })?
                .join(CACHE_DIR_NAME),
        };

        let login_cookie = match (raw.login_cookie_key, raw.login_cookie_value) {
            (Some(name), Some(value)) if !name.is_empty() && !value.is_empty() => {
                Some(LoginCookie { name, value })
            }
            _ => None,
        };

        Ok(Self {
            cache_root,
            login_cookie,
        })
    }

    /// Configuration rooted at an explicit directory, without a login cookie
    pub fn with_cache_root(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
            login_cookie: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(pairs: &[(&str, &str)]) -> Config {
        pairs
            .iter()
            .fold(Config::builder(), |builder, (key, value)| {
                builder.set_override(*key, *value).unwrap()
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_login_cookie_requires_both_parts() {
        let config = build(&[
            ("login_cookie_key", "joomla_user_state"),
            ("proxerscrape_cache_dir", "/tmp/proxer"),
        ]);
        let app = AppConfig::from_config(&config).unwrap();
        assert!(app.login_cookie.is_none());

        let config = build(&[
            ("login_cookie_key", "joomla_user_state"),
            ("login_cookie_value", ""),
            ("proxerscrape_cache_dir", "/tmp/proxer"),
        ]);
        let app = AppConfig::from_config(&config).unwrap();
        assert!(app.login_cookie.is_none());
    }

    #[test]
    fn test_login_cookie_attributes() {
        let config = build(&[
            ("login_cookie_key", "session"),
            ("login_cookie_value", "abc123"),
            ("proxerscrape_cache_dir", "/tmp/proxer"),
        ]);
        let app = AppConfig::from_config(&config).unwrap();

        let cookie = app.login_cookie.unwrap();
        assert_eq!(
            cookie.set_cookie_value(),
            "session=abc123; Domain=proxer.me; Path=/; HttpOnly; Secure; SameSite=Strict"
        );
    }

    #[test]
    fn test_cache_dir_override() {
        let config = build(&[("proxerscrape_cache_dir", "/tmp/proxer")]);
        let app = AppConfig::from_config(&config).unwrap();
        assert_eq!(app.cache_root, PathBuf::from("/tmp/proxer"));
    }
}
