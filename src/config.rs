use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_PER_PAGE: u32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backend root URL (optional)
    pub base_url: Option<String>,

    /// Value of the backend's `session` cookie, obtained by logging in with
    /// a browser.
    pub session_cookie: Option<String>,

    /// Fail a stream when it stays silent this long.
    pub idle_timeout_secs: Option<u64>,

    pub connect_timeout_secs: Option<u64>,

    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdminConfig {
    /// Rows per page for admin listings.
    pub per_page: Option<u32>,
}

impl Config {
    /// Load config if the file exists, otherwise return Ok(None).
    pub fn load_optional(path: impl AsRef<Path>) -> anyhow::Result<Option<Self>> {
        let path = path.as_ref();
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(anyhow::Error::new(e))
                    .with_context(|| format!("failed to read config: {}", path.display()))
            }
        };

        let s = String::from_utf8(bytes).context("config is not valid UTF-8")?;
        let cfg: Config = toml::from_str(&s)
            .with_context(|| format!("failed to parse TOML: {}", path.display()))?;
        Ok(Some(cfg))
    }
}

/// Settings after merging flags, environment and the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub session_cookie: Option<String>,
    pub idle_timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub per_page: u32,
}

impl Settings {
    /// Flag beats environment beats config file beats default.
    pub fn resolve(
        cfg: Option<&Config>,
        base_url_flag: Option<String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let base_url = base_url_flag
            .or_else(|| env("TRIPSTREAM_BASE_URL"))
            .or_else(|| cfg.and_then(|c| c.base_url.clone()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let session_cookie = env("TRIPSTREAM_SESSION")
            .or_else(|| cfg.and_then(|c| c.session_cookie.clone()))
            .filter(|s| !s.trim().is_empty());

        Self {
            base_url,
            session_cookie,
            idle_timeout: cfg
                .and_then(|c| c.idle_timeout_secs)
                .filter(|s| *s > 0)
                .map(Duration::from_secs),
            connect_timeout: cfg
                .and_then(|c| c.connect_timeout_secs)
                .filter(|s| *s > 0)
                .map(Duration::from_secs),
            per_page: cfg
                .and_then(|c| c.admin.per_page)
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_PER_PAGE),
        }
    }
}
