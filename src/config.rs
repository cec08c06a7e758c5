use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::SortSpec;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub service: ServiceSettings,
    pub search: SearchSettings,
    pub storage: StorageSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSettings {
    pub base_url: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_sort")]
    pub default_sort: String,
}

impl SearchSettings {
    /// The configured default sort, falling back to `breed:asc` if it does not parse
    pub fn sort(&self) -> SortSpec {
        self.default_sort.parse().unwrap_or_else(|e| {
            tracing::warn!("Invalid search.default_sort {:?}, using breed:asc: {}", self.default_sort, e);
            SortSpec::default()
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

pub const DEFAULT_SERVICE_URL: &str = "https://frontend-take-home-service.fetch.com";

fn default_page_size() -> u32 { 20 }
fn default_sort() -> String { "breed:asc".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from defaults, files and environment variables
    ///
    /// Later sources override earlier ones:
    /// 1. Built-in defaults
    /// 2. Configuration files (config/default.toml, config/local.toml)
    /// 3. Environment variables (prefixed with PAWMATCH__)
    /// 4. ADOPTION_SERVICE_URL for the service base URL
    pub fn load() -> Result<Self, ConfigError> {
        let settings = with_defaults(Config::builder())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., PAWMATCH__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = with_defaults(Config::builder())?
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.service.timeout_secs.unwrap_or(30))
    }
}

fn environment() -> Environment {
    Environment::with_prefix("PAWMATCH")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

fn with_defaults(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
    builder
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8080)?
        .set_default("service.base_url", DEFAULT_SERVICE_URL)?
        .set_default("service.timeout_secs", 30)?
        .set_default("search.page_size", 20)?
        .set_default("search.default_sort", "breed:asc")?
        .set_default("storage.path", "pawmatch-state.json")?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "json")
}

/// Apply the conventional ADOPTION_SERVICE_URL override
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    let mut builder = Config::builder().add_source(settings);

    if let Ok(url) = std::env::var("ADOPTION_SERVICE_URL") {
        builder = builder.set_override("service.base_url", url)?;
    }

    builder.build()
}
