use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::core::error::AppError;

/// Sentinels used when the source info dict is missing a field
pub mod sentinel {
    pub const UNKNOWN_TITLE: &str = "Unknown Title";
    pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
    pub const UNKNOWN_ALBUM: &str = "Unknown Album";
}

/// Download / extraction configuration
pub mod download {
    use super::Duration;

    /// yt-dlp format selector: m4a audio-only first, then any best audio stream
    pub const FORMAT_SELECTOR: &str = "bestaudio[ext=m4a]/bestaudio";

    /// Container extension every scratch file ends up with
    pub const TARGET_EXTENSION: &str = "m4a";

    /// Containers yt-dlp may leave behind with a foreign extension after repackaging
    pub const FOREIGN_EXTENSIONS: &[&str] = &["webm", "opus"];

    /// Output template relative to the scratch directory
    pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

    /// Socket timeout passed to yt-dlp (in seconds)
    pub const SOCKET_TIMEOUT_SECS: u64 = 600;

    /// Default upper bound for a whole extraction run (in seconds)
    pub const EXTRACT_TIMEOUT_SECS: u64 = 600;

    /// Default extraction timeout duration
    pub fn extract_timeout() -> Duration {
        Duration::from_secs(EXTRACT_TIMEOUT_SECS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Timeout for cover art HTTP requests (in seconds)
    pub const COVER_TIMEOUT_SECS: u64 = 30;

    /// Request timeout for the Telegram client (in seconds).
    /// Large audio uploads through the Bot API can take a while.
    pub const REQUEST_TIMEOUT_SECS: u64 = 300;

    pub fn cover_timeout() -> Duration {
        Duration::from_secs(COVER_TIMEOUT_SECS)
    }

    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Request scheduling limits
pub mod limits {
    /// Requests processed at the same time; further requests wait for a permit
    pub const MAX_CONCURRENT_REQUESTS: usize = 4;
}

/// Immutable runtime configuration.
///
/// Built once at process start (see [`Config::from_env`]) and shared as `Arc<Config>`.
/// Nothing else in the crate reads the environment.
#[derive(Clone)]
pub struct Config {
    /// Telegram bot token (`BOT_TOKEN`, `TELOXIDE_TOKEN` or `TELEGRAM_TOKEN`)
    pub bot_token: Option<String>,
    /// Custom Bot API server (`BOT_API_URL`)
    pub bot_api_url: Option<String>,
    /// Base64-encoded Netscape cookies file for yt-dlp (`YTDL_COOKIES_B64`)
    pub cookies_b64: Option<String>,
    /// yt-dlp binary (`YTDL_BIN`)
    pub ytdl_bin: String,
    /// Scratch directory for downloaded audio (`DOWNLOAD_FOLDER`), tilde-expanded
    pub download_dir: PathBuf,
    /// Log file (`LOG_FILE_PATH`)
    pub log_file: PathBuf,
    /// Upper bound for one extraction run (`EXTRACT_TIMEOUT_SECS`)
    pub extract_timeout: Duration,
    /// Concurrent request cap (`MAX_CONCURRENT_REQUESTS`)
    pub max_concurrent_requests: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot_token: None,
            bot_api_url: None,
            cookies_b64: None,
            ytdl_bin: "yt-dlp".to_string(),
            download_dir: PathBuf::from("downloads"),
            log_file: PathBuf::from("tubetag.log"),
            extract_timeout: download::extract_timeout(),
            max_concurrent_requests: limits::MAX_CONCURRENT_REQUESTS,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("bot_api_url", &self.bot_api_url)
            .field("cookies_b64", &self.cookies_b64.as_ref().map(|b| format!("<{} bytes>", b.len())))
            .field("ytdl_bin", &self.ytdl_bin)
            .field("download_dir", &self.download_dir)
            .field("log_file", &self.log_file)
            .field("extract_timeout", &self.extract_timeout)
            .field("max_concurrent_requests", &self.max_concurrent_requests)
            .finish()
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let bot_token = get("BOT_TOKEN")
            .or_else(|| get("TELOXIDE_TOKEN"))
            .or_else(|| get("TELEGRAM_TOKEN"));

        let download_dir = get("DOWNLOAD_FOLDER")
            .map(|dir| PathBuf::from(shellexpand::tilde(&dir).to_string()))
            .unwrap_or(defaults.download_dir);

        let extract_timeout = match get("EXTRACT_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_number::<u64>("EXTRACT_TIMEOUT_SECS", &raw)?),
            None => defaults.extract_timeout,
        };

        let max_concurrent_requests = match get("MAX_CONCURRENT_REQUESTS") {
            Some(raw) => parse_number::<usize>("MAX_CONCURRENT_REQUESTS", &raw)?,
            None => defaults.max_concurrent_requests,
        };
        if max_concurrent_requests == 0 {
            return Err(AppError::Config("MAX_CONCURRENT_REQUESTS must be at least 1".to_string()));
        }

        Ok(Self {
            bot_token,
            bot_api_url: get("BOT_API_URL"),
            cookies_b64: get("YTDL_COOKIES_B64"),
            ytdl_bin: get("YTDL_BIN").unwrap_or(defaults.ytdl_bin),
            download_dir,
            log_file: get("LOG_FILE_PATH").map(PathBuf::from).unwrap_or(defaults.log_file),
            extract_timeout,
            max_concurrent_requests,
        })
    }

    /// Returns the bot token or a configuration error if it is missing.
    pub fn require_bot_token(&self) -> Result<&str, AppError> {
        self.bot_token
            .as_deref()
            .ok_or_else(|| AppError::Config("BOT_TOKEN environment variable not set".to_string()))
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T, AppError> {
    raw.parse::<T>()
        .map_err(|_| AppError::Config(format!("{} must be a positive integer, got '{}'", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert!(config.bot_token.is_none());
        assert!(config.cookies_b64.is_none());
        assert_eq!(config.ytdl_bin, "yt-dlp");
        assert_eq!(config.download_dir, PathBuf::from("downloads"));
        assert_eq!(config.extract_timeout, Duration::from_secs(600));
        assert_eq!(config.max_concurrent_requests, limits::MAX_CONCURRENT_REQUESTS);
    }

    #[test]
    fn test_token_fallback_chain() {
        let config = Config::from_lookup(lookup_from(&[("TELEGRAM_TOKEN", "123:abc")])).unwrap();
        assert_eq!(config.require_bot_token().unwrap(), "123:abc");

        let config = Config::from_lookup(lookup_from(&[("BOT_TOKEN", "1:a"), ("TELEGRAM_TOKEN", "2:b")])).unwrap();
        assert_eq!(config.bot_token.as_deref(), Some("1:a"));
    }

    #[test]
    fn test_missing_token_is_config_error() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert!(matches!(config.require_bot_token(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = Config::from_lookup(lookup_from(&[("YTDL_COOKIES_B64", "   "), ("YTDL_BIN", "")])).unwrap();
        assert!(config.cookies_b64.is_none());
        assert_eq!(config.ytdl_bin, "yt-dlp");
    }

    #[test]
    fn test_numeric_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("EXTRACT_TIMEOUT_SECS", "30"),
            ("MAX_CONCURRENT_REQUESTS", "2"),
        ]))
        .unwrap();
        assert_eq!(config.extract_timeout, Duration::from_secs(30));
        assert_eq!(config.max_concurrent_requests, 2);
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        assert!(Config::from_lookup(lookup_from(&[("EXTRACT_TIMEOUT_SECS", "soon")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("MAX_CONCURRENT_REQUESTS", "0")])).is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::from_lookup(lookup_from(&[("BOT_TOKEN", "secret-token"), ("YTDL_COOKIES_B64", "abcd")]))
            .unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("<4 bytes>"));
    }
}
