//! # Configuration
//!
//! Layered service settings.
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. built-in defaults
//! 2. `config/default.toml`, if present
//! 3. the file named by `CANNX_CONFIG`, if set
//! 4. environment variables prefixed `CANNX__`, with `__` between path
//!    segments (`CANNX__WEBHOOK__SECRET`, `CANNX__STORE__BACKEND`)
//!
//! A `.env` file in the working directory is loaded into the environment
//! first.
//!
//! # Examples
//!
//! ```toml
//! [server]
//! bind_addr = "127.0.0.1:8080"
//!
//! [store]
//! backend = "source_file"
//! path = "app/api/marketplace/route.ts"
//!
//! [remote]
//! base_url = "https://origin.example.com"
//! secondary_path = "/api/admin/listings"
//!
//! [webhook]
//! secret = "change-me"
//! mode = "merge"
//! ```

use crate::application::services::WebhookMode;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an extra configuration file.
pub const CONFIG_FILE_ENV: &str = "CANNX_CONFIG";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "CANNX";

/// Environment source for `CANNX__SECTION__KEY` variables.
///
/// Values stay strings; typed fields are converted during deserialization,
/// so secrets such as `0123` or `TRUE` reach the settings unchanged.
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
}

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Listen address.
    pub bind_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Which [`crate::infrastructure::persistence::ListingStore`] to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// JSON document.
    #[default]
    Json,
    /// Array literal inside a source file.
    SourceFile,
    /// Process memory only.
    Memory,
}

/// Listing store settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Backend kind.
    pub backend: StoreBackend,
    /// Backing file, unused by the memory backend.
    pub path: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Json,
            path: PathBuf::from("data/listings.json"),
        }
    }
}

/// Remote origin settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// Origin base URL; no remote tiers without it.
    pub base_url: Option<String>,
    /// Path of the primary tier.
    pub primary_path: String,
    /// Path of the secondary tier.
    pub secondary_path: Option<String>,
    /// Bearer token sent to the origin.
    pub bearer_token: Option<String>,
    /// Per-request timeout.
    pub timeout_ms: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            primary_path: "/api/marketplace".to_string(),
            secondary_path: None,
            bearer_token: None,
            timeout_ms: 5000,
        }
    }
}

/// Webhook settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WebhookSettings {
    /// Shared secret; every request is rejected without one.
    pub secret: Option<String>,
    /// How batches are applied.
    pub mode: WebhookMode,
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete service settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP server.
    pub server: ServerSettings,
    /// Listing store.
    pub store: StoreSettings,
    /// Remote origin.
    pub remote: RemoteSettings,
    /// Webhook receiver.
    pub webhook: WebhookSettings,
    /// Logging.
    pub logging: LoggingSettings,
}

impl Settings {
    /// Loads settings from every source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` if a source is malformed and
    /// `ConfigError::Invalid` if a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let extra = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));
        if let Some(path) = extra.as_deref() {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(environment());

        Self::from_config(builder.build()?)
    }

    /// Loads settings from defaults plus one file, ignoring the
    /// environment.
    ///
    /// # Errors
    ///
    /// As [`Settings::load`]; the file must exist.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path).required(true))
            .build()?;
        Self::from_config(config)
    }

    fn from_config(config: config::Config) -> Result<Self, ConfigError> {
        let settings: Self = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        if self.remote.timeout_ms == 0 {
            return Err(ConfigError::invalid("remote.timeout_ms must be positive"));
        }
        if let Some(url) = self.remote.base_url.as_deref()
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(ConfigError::invalid(format!(
                "remote.base_url must be an http(s) URL, got {}",
                url
            )));
        }
        if self.store.backend != StoreBackend::Memory && self.store.path.as_os_str().is_empty() {
            return Err(ConfigError::invalid("store.path must not be empty"));
        }
        Ok(())
    }

    /// Returns the parsed listen address.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `server.bind_addr` is not a socket
    /// address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.bind_addr.parse().map_err(|_| {
            ConfigError::invalid(format!(
                "server.bind_addr is not a socket address: {}",
                self.server.bind_addr
            ))
        })
    }
}
