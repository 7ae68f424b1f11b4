use std::time::Duration;

use crate::errors::{FeedError, FeedResult};

pub const DEFAULT_API_BASE: &str = "https://api.shandian.io/front/index";
pub const DEFAULT_SITE_ORIGIN: &str = "https://rumenbao.com";
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub site_origin: String,
    pub page_size: u32,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            site_origin: DEFAULT_SITE_ORIGIN.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<std::path::PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    pub fn from_env() -> FeedResult<Self> {
        // Try to load .env from executable's directory first
        if let Some(dir) = Self::exe_dir() {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> FeedResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base = lookup("RUMENBAO_API_BASE")
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        url::Url::parse(&api_base)
            .map_err(|e| FeedError::Config(format!("RUMENBAO_API_BASE: {}", e)))?;

        let site_origin = lookup("RUMENBAO_SITE_ORIGIN")
            .unwrap_or_else(|| DEFAULT_SITE_ORIGIN.to_string())
            .trim_end_matches('/')
            .to_string();

        let page_size = match lookup("RUMENBAO_PAGE_SIZE") {
            Some(raw) => parse_positive(&raw, "RUMENBAO_PAGE_SIZE")? as u32,
            None => DEFAULT_PAGE_SIZE,
        };

        let timeout_secs = match lookup("RUMENBAO_TIMEOUT_SECS") {
            Some(raw) => parse_positive(&raw, "RUMENBAO_TIMEOUT_SECS")?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_base,
            site_origin,
            page_size,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_positive(raw: &str, name: &str) -> FeedResult<u64> {
    match raw.trim().parse::<u32>() {
        Ok(0) | Err(_) => Err(FeedError::Config(format!(
            "{} must be a positive integer, got '{}'",
            name, raw
        ))),
        Ok(value) => Ok(u64::from(value)),
    }
}
