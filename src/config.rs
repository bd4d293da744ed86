//! Configuration file parser for ~/.config/ridewait/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are silently ignored by serde (with `deny_unknown_fields` off),
//! though we log a warning when the file contains potential typos.
use crate::feed::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_FEED_URL, DEFAULT_READ_TIMEOUT};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid URL for {key}: {reason}")]
    InvalidUrl { key: &'static str, reason: String },

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Park name shown in headers and messages.
    pub park_name: String,

    /// Queue-times JSON endpoint for the park.
    pub feed_url: String,

    /// Value of the `User-Agent` header sent with feed requests.
    pub user_agent: String,

    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,

    /// Managed backend for sign-in and favorites.
    pub firebase: FirebaseConfig,
}

/// Firebase settings. Without an API key the app runs in guest mode;
/// without a database URL favorites are stored locally.
///
/// Custom Debug impl masks `api_key`.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct FirebaseConfig {
    /// Web API key (alternative to FIREBASE_API_KEY env var).
    /// Env var takes precedence over config file.
    pub api_key: Option<String>,

    /// Realtime Database root, e.g. `https://my-app-default-rtdb.firebaseio.com`.
    pub database_url: Option<String>,

    /// Identity Toolkit base URL override.
    pub auth_base_url: Option<String>,
}

impl std::fmt::Debug for FirebaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("database_url", &self.database_url)
            .field("auth_base_url", &self.auth_base_url)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            park_name: "Universal Studios Orlando".to_string(),
            feed_url: DEFAULT_FEED_URL.to_string(),
            user_agent: format!(
                "ridewait/{} (terminal ride-wait viewer)",
                env!("CARGO_PKG_VERSION")
            ),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT.as_millis() as u64,
            read_timeout_ms: DEFAULT_READ_TIMEOUT.as_millis() as u64,
            firebase: FirebaseConfig::default(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 6] = [
        "park_name",
        "feed_url",
        "user_agent",
        "connect_timeout_ms",
        "read_timeout_ms",
        "firebase",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted (serde default behavior), logged as warning
    /// - `feed_url` that is not http(s) → `Err(ConfigError::InvalidUrl)`
    /// - Zero connect or read timeout → `Err(ConfigError::ZeroTimeout)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check file size before reading to avoid slurping a huge file
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        config.feed_endpoint()?;
        config.check_timeouts()?;
        tracing::info!(path = %path.display(), park = %config.park_name, "Loaded configuration");
        Ok(config)
    }

    /// Parsed and scheme-checked `feed_url`.
    pub fn feed_endpoint(&self) -> Result<Url, ConfigError> {
        parse_http_url("feed_url", &self.feed_url)
    }

    /// Realtime Database root, if configured.
    pub fn database_endpoint(&self) -> Result<Option<Url>, ConfigError> {
        self.firebase
            .database_url
            .as_deref()
            .map(|url| parse_http_url("firebase.database_url", url))
            .transpose()
    }

    /// True when favorites go to the local SQLite store rather than Firebase.
    pub fn favorites_are_local(&self) -> bool {
        self.firebase.database_url.is_none()
    }

    /// A zero timeout would fail every fetch before it starts.
    fn check_timeouts(&self) -> Result<(), ConfigError> {
        if self.connect_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout("connect_timeout_ms"));
        }
        if self.read_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout("read_timeout_ms"));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Firebase API key: `FIREBASE_API_KEY` wins over the config file.
    pub fn firebase_api_key(&self) -> Option<SecretString> {
        resolve_api_key(
            std::env::var("FIREBASE_API_KEY").ok(),
            self.firebase.api_key.as_deref(),
        )
    }
}

fn resolve_api_key(env: Option<String>, file: Option<&str>) -> Option<SecretString> {
    env.filter(|k| !k.trim().is_empty())
        .or_else(|| file.filter(|k| !k.trim().is_empty()).map(str::to_string))
        .map(SecretString::from)
}

fn parse_http_url(key: &'static str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        key,
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ConfigError::InvalidUrl {
            key,
            reason: format!("unsupported scheme {scheme} (only http/https allowed)"),
        }),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn write_config(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("ridewait_config_test_{name}"));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.park_name, "Universal Studios Orlando");
        assert_eq!(
            config.feed_url,
            "https://queue-times.com/parks/65/queue_times.json"
        );
        assert_eq!(config.connect_timeout(), Duration::from_millis(7000));
        assert_eq!(config.read_timeout(), Duration::from_millis(7000));
        assert!(config.user_agent.starts_with("ridewait/"));
        assert!(config.firebase.api_key.is_none());
        assert!(config.database_endpoint().unwrap().is_none());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/ridewait_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.park_name, "Universal Studios Orlando");
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let path = write_config("whitespace", "   \n  \n  ");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.read_timeout_ms, 7000);
        cleanup(&path);
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let path = write_config("partial", "park_name = \"Islands of Adventure\"\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.park_name, "Islands of Adventure");
        assert_eq!(config.connect_timeout_ms, 7000);
        assert_eq!(config.feed_url, DEFAULT_FEED_URL);
        cleanup(&path);
    }

    #[test]
    fn test_full_config() {
        let content = r#"
park_name = "Islands of Adventure"
feed_url = "https://queue-times.com/parks/64/queue_times.json"
user_agent = "custom-agent"
connect_timeout_ms = 3000
read_timeout_ms = 4000

[firebase]
api_key = "test-key-123"
database_url = "https://demo-default-rtdb.firebaseio.com"
"#;
        let path = write_config("full", content);
        let config = Config::load(&path).unwrap();
        assert_eq!(config.user_agent, "custom-agent");
        assert_eq!(config.connect_timeout(), Duration::from_millis(3000));
        assert_eq!(config.read_timeout(), Duration::from_millis(4000));
        assert_eq!(
            config.feed_endpoint().unwrap().path(),
            "/parks/64/queue_times.json"
        );
        assert_eq!(config.firebase.api_key.as_deref(), Some("test-key-123"));
        assert_eq!(
            config.database_endpoint().unwrap().unwrap().host_str(),
            Some("demo-default-rtdb.firebaseio.com")
        );
        cleanup(&path);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let path = write_config("invalid", "this is not [valid toml");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
        cleanup(&path);
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let path = write_config("unknown", "park_name = \"X\"\ntotally_fake_key = 1\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.park_name, "X");
        cleanup(&path);
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let path = write_config("wrongtype", "read_timeout_ms = \"soon\"\n");
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
        cleanup(&path);
    }

    #[test]
    fn test_non_http_feed_url_rejected() {
        let path = write_config("badurl", "feed_url = \"file:///etc/passwd\"\n");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { key: "feed_url", .. }));
        cleanup(&path);
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        let path = write_config("zero_connect", "connect_timeout_ms = 0\n");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroTimeout("connect_timeout_ms")));
        cleanup(&path);

        let path = write_config("zero_read", "read_timeout_ms = 0\n");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroTimeout("read_timeout_ms")));
        assert_eq!(err.to_string(), "read_timeout_ms must be greater than zero");
        cleanup(&path);
    }

    #[test]
    fn test_favorites_local_unless_database_url_set() {
        let mut config = Config::default();
        assert!(config.favorites_are_local());
        config.firebase.database_url = Some("https://demo-default-rtdb.firebaseio.com".into());
        assert!(!config.favorites_are_local());
    }

    #[test]
    fn test_unparseable_database_url_rejected() {
        let mut config = Config::default();
        config.firebase.database_url = Some("not a url".to_string());
        assert!(config.database_endpoint().is_err());
    }

    #[test]
    fn test_too_large_file_rejected() {
        let path = write_config("too_large", &"a".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));
        cleanup(&path);
    }

    #[test]
    fn test_env_api_key_takes_precedence() {
        let key = resolve_api_key(Some("from-env".into()), Some("from-file")).unwrap();
        assert_eq!(key.expose_secret(), "from-env");

        let key = resolve_api_key(None, Some("from-file")).unwrap();
        assert_eq!(key.expose_secret(), "from-file");

        assert!(resolve_api_key(Some("  ".into()), Some("")).is_none());
    }

    #[test]
    fn test_debug_masks_api_key() {
        let mut config = Config::default();
        config.firebase.api_key = Some("super-secret-key-12345".to_string());

        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("super-secret-key-12345"));
        assert!(debug_output.contains("[REDACTED]"));
    }
}
