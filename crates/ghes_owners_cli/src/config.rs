//! Configuration file support for ghes-owners.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `GHES_OWNERS_`, sections separated by
//!    `__`, e.g. `GHES_OWNERS_ENTERPRISE__TOKEN`)
//! 3. Config file (./ghes-owners.toml, then ~/.config/ghes-owners/config.toml)
//! 4. Built-in defaults
//!
//! Example config file:
//! ```toml
//! [enterprise]
//! host = "github.example.com"
//! token = "ghp_..."  # or use GHES_OWNERS_ENTERPRISE__TOKEN
//! slug = "github"    # optional, this is the default
//!
//! [report]
//! output = "dist/ghes-owners.csv"
//! min_version = "2.19.0"
//!
//! [http]
//! timeout_secs = 30
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use ghes_owners::{DEFAULT_ENTERPRISE_SLUG, MIN_SUPPORTED_VERSION, normalize_host};
use semver::Version;
use serde::Deserialize;
use thiserror::Error;

const APP_NAME: &str = "ghes-owners";
const ENV_PREFIX: &str = "GHES_OWNERS";

/// Settings that cannot be turned into a runnable report.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("hostname missing (use --hostname or set [enterprise] host)")]
    MissingHost,

    #[error("token missing (use --token or set GHES_OWNERS_ENTERPRISE__TOKEN)")]
    MissingToken,

    #[error("{host} is not supported, point --hostname at a GitHub Enterprise Server instance")]
    UnsupportedHost { host: String },

    #[error("invalid minimum version {raw:?}: {source}")]
    InvalidMinVersion {
        raw: String,
        #[source]
        source: semver::Error,
    },

    #[error("enterprise slug must not be empty")]
    EmptySlug,

    #[error("HTTP timeout must be at least one second")]
    ZeroTimeout,
}

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub enterprise: EnterpriseConfig,
    pub report: ReportConfig,
    pub http: HttpConfig,
}

/// Instance to query.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EnterpriseConfig {
    /// Host name, with or without `https://`.
    pub host: Option<String>,
    /// Personal access token with `admin:enterprise` and `read:org`.
    pub token: Option<String>,
    /// Enterprise account slug.
    pub slug: String,
}

impl Default for EnterpriseConfig {
    fn default() -> Self {
        Self {
            host: None,
            token: None,
            slug: DEFAULT_ENTERPRISE_SLUG.to_string(),
        }
    }
}

/// Report output options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// CSV file to write. Any existing file is replaced.
    pub output: PathBuf,
    /// Oldest instance version to accept.
    pub min_version: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("dist").join("ghes-owners.csv"),
            min_version: MIN_SUPPORTED_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

/// Values given on the command line. `None` keeps the configured value.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub host: Option<String>,
    pub token: Option<String>,
    pub output: Option<PathBuf>,
    pub min_version: Option<String>,
    pub timeout_secs: Option<u64>,
    pub enterprise_slug: Option<String>,
}

/// Settings checked and converted for a report run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSettings {
    /// Normalized host, no scheme.
    pub host: String,
    pub token: String,
    pub enterprise_slug: String,
    pub output: PathBuf,
    pub minimum_version: Version,
    pub timeout: Duration,
}

impl Settings {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/ghes-owners/config.toml)
    /// 3. Local config file (./ghes-owners.toml)
    /// 4. Environment variables with the GHES_OWNERS_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = Self::default_config_path()
            && path.exists()
        {
            tracing::debug!("Loading config from {:?}", path);
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        let local_config = PathBuf::from(format!("{APP_NAME}.toml"));
        if local_config.exists() {
            tracing::debug!("Loading config from ./{APP_NAME}.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // e.g. GHES_OWNERS_REPORT__MIN_VERSION -> report.min_version
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Settings>() {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Settings::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Settings::default()
            }
        }
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply command-line values on top of the loaded configuration.
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(host) = overrides.host {
            self.enterprise.host = Some(host);
        }
        if let Some(token) = overrides.token {
            self.enterprise.token = Some(token);
        }
        if let Some(slug) = overrides.enterprise_slug {
            self.enterprise.slug = slug;
        }
        if let Some(output) = overrides.output {
            self.report.output = output;
        }
        if let Some(min_version) = overrides.min_version {
            self.report.min_version = min_version;
        }
        if let Some(timeout_secs) = overrides.timeout_secs {
            self.http.timeout_secs = timeout_secs;
        }
    }

    /// Check the settings and convert them for a report run.
    pub fn validate(&self) -> Result<ValidatedSettings, ConfigError> {
        let host = self
            .enterprise
            .host
            .as_deref()
            .map(normalize_host)
            .filter(|h| !h.is_empty())
            .ok_or(ConfigError::MissingHost)?;

        if host.eq_ignore_ascii_case("github.com") {
            return Err(ConfigError::UnsupportedHost { host });
        }

        let token = self
            .enterprise
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingToken)?
            .to_string();

        let enterprise_slug = self.enterprise.slug.trim();
        if enterprise_slug.is_empty() {
            return Err(ConfigError::EmptySlug);
        }

        let raw = self.report.min_version.trim();
        let minimum_version =
            Version::parse(raw).map_err(|source| ConfigError::InvalidMinVersion {
                raw: raw.to_string(),
                source,
            })?;

        if self.http.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(ValidatedSettings {
            host,
            token,
            enterprise_slug: enterprise_slug.to_string(),
            output: self.report.output.clone(),
            minimum_version,
            timeout: Duration::from_secs(self.http.timeout_secs),
        })
    }
}
