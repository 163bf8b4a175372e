//! Configuration management
//!
//! Two configuration surfaces are loaded here:
//! 1. Daemon settings: how the daemon runs (document paths, publish
//!    interval, API endpoint, ops listener, logging). Layered defaults,
//!    TOML files and environment variables.
//! 2. Presence document: what presence to publish. A single JSON file owned
//!    by the user, deliberately loose — fields may be absent, wrongly typed,
//!    or spelled with alternate key names. It is parsed permissively and
//!    each field is coerced or discarded individually during normalization;
//!    a bad field value never rejects the document as a whole.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, Result};

/// Environment variable that overrides the document token.
pub const TOKEN_ENV_VAR: &str = "DISCORD_TOKEN";

/// Daemon settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub presence: PresenceSettings,
    pub platform: PlatformSettings,
    pub ops: OpsSettings,
    pub logging: LoggingSettings,
}

/// Presence document location and publish schedule
#[derive(Debug, Clone, Deserialize)]
pub struct PresenceSettings {
    /// Path to the user presence document (JSON)
    pub document_path: PathBuf,
    /// Shipped fallback used when `document_path` does not exist
    pub example_path: PathBuf,
    /// Seconds between presence publishes
    pub refresh_interval_seconds: u64,
}

impl PresenceSettings {
    /// Publish interval as a `Duration`.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_seconds)
    }
}

/// Platform REST API settings
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformSettings {
    /// Base URL of the platform API (e.g., "https://discord.com/api/v9")
    pub api_base_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_seconds: u64,
}

impl PlatformSettings {
    /// Request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Ops listener (health and metrics) settings
#[derive(Debug, Clone, Deserialize)]
pub struct OpsSettings {
    /// Serve /health and /metrics over HTTP
    pub enabled: bool,
    /// Bind address (e.g., "127.0.0.1")
    pub host: String,
    /// Port number (e.g., 9090)
    pub port: u16,
}

impl OpsSettings {
    /// Socket address string for the ops listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Settings {
    /// Load settings from files and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (RUSTPRESENCE_*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            // Start with default values
            .set_default("presence.document_path", "config.json")?
            .set_default("presence.example_path", "config.example.json")?
            .set_default("presence.refresh_interval_seconds", 900)?
            .set_default("platform.api_base_url", "https://discord.com/api/v9")?
            .set_default("platform.request_timeout_seconds", 30)?
            .set_default("ops.enabled", false)?
            .set_default("ops.host", "127.0.0.1")?
            .set_default("ops.port", 9090)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // Load from config/default.toml if it exists
            .add_source(File::with_name("config/default").required(false))
            // Load from config/local.toml if it exists (overrides default)
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables (RUSTPRESENCE_*)
            .add_source(
                Environment::with_prefix("RUSTPRESENCE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        let settings: Self = config
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.presence.refresh_interval_seconds == 0 {
            return Err(AppError::Config(
                "presence.refresh_interval_seconds must be greater than 0".to_string(),
            ));
        }

        if self.platform.request_timeout_seconds == 0 {
            return Err(AppError::Config(
                "platform.request_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        match url::Url::parse(&self.platform.api_base_url) {
            Ok(parsed) if parsed.scheme() == "https" => {}
            Ok(parsed) if parsed.scheme() == "http" => {
                tracing::warn!(
                    url = %self.platform.api_base_url,
                    "Using plain http for the platform API; fine for local testing only"
                );
            }
            _ => {
                return Err(AppError::Config(format!(
                    "platform.api_base_url must be an http(s) URL, got '{}'",
                    self.platform.api_base_url
                )));
            }
        }

        let level = self.logging.level.to_ascii_lowercase();
        if !["trace", "debug", "info", "warn", "error"].contains(&level.as_str()) {
            return Err(AppError::Config(format!(
                "logging.level must be one of trace/debug/info/warn/error, got '{}'",
                self.logging.level
            )));
        }

        if !["pretty", "json"].contains(&self.logging.format.as_str()) {
            return Err(AppError::Config(format!(
                "logging.format must be 'pretty' or 'json', got '{}'",
                self.logging.format
            )));
        }

        Ok(())
    }
}

/// The user-authored presence document
///
/// Mirrors the on-disk `config.json`: an optional token plus an `rpc`
/// object describing the presence. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PresenceDocument {
    pub token: Option<String>,
    pub rpc: RawPresenceConfig,
}

/// The raw `rpc` object, exactly as the user wrote it
///
/// Every field is a loose JSON value. Image keys and tooltips come in three
/// accepted spellings each; priority order is exposed through the
/// `*_candidates` accessors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPresenceConfig {
    #[serde(rename = "applicationId")]
    pub application_id: Option<Value>,
    #[serde(rename = "type")]
    pub activity_type: Option<Value>,
    pub name: Option<Value>,
    pub details: Option<Value>,
    pub state: Option<Value>,
    pub status: Option<Value>,
    // Timestamps keep explicit `null` distinct from a missing key: null
    // pins the field to "absent", missing lets the built-in fallback apply.
    #[serde(rename = "startTimestamp", deserialize_with = "some_value")]
    pub start_timestamp: Option<Value>,
    #[serde(rename = "endTimestamp", deserialize_with = "some_value")]
    pub end_timestamp: Option<Value>,
    #[serde(rename = "largeImage")]
    pub large_image: Option<Value>,
    #[serde(rename = "large_image")]
    pub large_image_alt: Option<Value>,
    #[serde(rename = "imageBig")]
    pub image_big: Option<Value>,
    #[serde(rename = "largeImageText")]
    pub large_image_text: Option<Value>,
    #[serde(rename = "large_text")]
    pub large_text: Option<Value>,
    #[serde(rename = "imageBigText")]
    pub image_big_text: Option<Value>,
    #[serde(rename = "smallImage")]
    pub small_image: Option<Value>,
    #[serde(rename = "small_image")]
    pub small_image_alt: Option<Value>,
    #[serde(rename = "imageSmall")]
    pub image_small: Option<Value>,
    #[serde(rename = "smallImageText")]
    pub small_image_text: Option<Value>,
    #[serde(rename = "small_text")]
    pub small_text: Option<Value>,
    #[serde(rename = "imageSmallText")]
    pub image_small_text: Option<Value>,
}

impl RawPresenceConfig {
    /// Large image key candidates, highest priority first.
    pub fn large_image_candidates(&self) -> [Option<&Value>; 3] {
        [
            self.large_image.as_ref(),
            self.large_image_alt.as_ref(),
            self.image_big.as_ref(),
        ]
    }

    /// Large image tooltip candidates, highest priority first.
    pub fn large_text_candidates(&self) -> [Option<&Value>; 3] {
        [
            self.large_image_text.as_ref(),
            self.large_text.as_ref(),
            self.image_big_text.as_ref(),
        ]
    }

    /// Small image key candidates, highest priority first.
    pub fn small_image_candidates(&self) -> [Option<&Value>; 3] {
        [
            self.small_image.as_ref(),
            self.small_image_alt.as_ref(),
            self.image_small.as_ref(),
        ]
    }

    /// Small image tooltip candidates, highest priority first.
    pub fn small_text_candidates(&self) -> [Option<&Value>; 3] {
        [
            self.small_image_text.as_ref(),
            self.small_text.as_ref(),
            self.image_small_text.as_ref(),
        ]
    }
}

/// Deserialize any JSON value as `Some(value)`, keeping explicit `null`
/// as `Some(Value::Null)`.
///
/// A bare `Option<Value>` folds `null` into `None`, which would make an
/// explicit null indistinguishable from a missing key.
fn some_value<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl PresenceDocument {
    /// Load the presence document from disk
    ///
    /// # Resolution Order
    /// 1. The configured document path
    /// 2. The shipped example document
    /// 3. An empty document (the token must then come from the environment)
    ///
    /// # Errors
    /// A file that exists but cannot be read or parsed is a fatal
    /// configuration error; publishing a default presence over a typo would
    /// be worse than refusing to start.
    pub fn load(settings: &PresenceSettings) -> Result<Self> {
        if settings.document_path.exists() {
            return Self::from_path(&settings.document_path);
        }

        if settings.example_path.exists() {
            tracing::warn!(
                document = %settings.document_path.display(),
                example = %settings.example_path.display(),
                "Presence document not found, falling back to the example document"
            );
            return Self::from_path(&settings.example_path);
        }

        tracing::warn!(
            document = %settings.document_path.display(),
            "No presence document found, starting with built-in defaults"
        );
        Ok(Self::default())
    }

    /// Parse a presence document from a specific file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        serde_json::from_str(&raw)
            .map_err(|e| AppError::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Resolve the authentication token
    ///
    /// An environment override (read by the caller from [`TOKEN_ENV_VAR`])
    /// wins over the document value; both are trimmed and blank values are
    /// ignored.
    ///
    /// # Errors
    /// Returns `AppError::MissingToken` when neither source provides one.
    pub fn resolve_token(&self, env_override: Option<&str>) -> Result<String> {
        if let Some(token) = env_override {
            let token = token.trim();
            if !token.is_empty() {
                return Ok(token.to_string());
            }
        }

        self.token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .ok_or(AppError::MissingToken)
    }
}
