//! Configuration schema, defaults, and layered loading.
//!
//! Precedence: defaults < config file < environment < CLI
use anyhow::{ensure, Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5001";
pub const DEFAULT_PAGE_URL: &str = "https://lastsnap.app";
const MAX_REQUEST_TIMEOUT_SECS: u64 = 3600;

pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "lastsnap")
        .map(|p| p.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("lastsnap.toml"))
}

/// How the upload body is fed to the extraction service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// Body fed from a counting stream; reports intermediate progress.
    #[default]
    Streaming,
    /// Single buffered send; progress jumps 0 -> 100 at completion.
    Buffered,
}

/// Fully resolved application configuration after all layers merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the frame-extraction service.
    pub endpoint: String,
    pub transport: TransportMode,
    pub request_timeout_secs: u64,
    /// Canonical page address used by the share adapter.
    pub page_url: String,
    /// Where the extracted frame is saved.
    pub output: PathBuf,
}

impl AppConfig {
    /// Validates endpoint/page URLs and request bounds.
    pub fn validate(&self) -> Result<()> {
        let endpoint = Url::parse(&self.endpoint)
            .with_context(|| format!("Invalid config: endpoint '{}' is not a URL", self.endpoint))?;
        ensure!(
            matches!(endpoint.scheme(), "http" | "https"),
            "Invalid config: endpoint must be http or https"
        );
        Url::parse(&self.page_url)
            .with_context(|| format!("Invalid config: page_url '{}' is not a URL", self.page_url))?;
        ensure!(
            self.request_timeout_secs > 0,
            "Invalid config: request_timeout_secs must be > 0"
        );
        ensure!(
            self.request_timeout_secs <= MAX_REQUEST_TIMEOUT_SECS,
            "Invalid config: request_timeout_secs must be <= {MAX_REQUEST_TIMEOUT_SECS}"
        );
        ensure!(
            self.output.file_name().is_some(),
            "Invalid config: output must name a file"
        );
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            transport: TransportMode::default(),
            request_timeout_secs: 120,
            page_url: DEFAULT_PAGE_URL.to_string(),
            output: PathBuf::from(crate::consts::RESULT_FILENAME),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub endpoint: Option<String>,
    pub transport: Option<TransportMode>,
    pub output: Option<PathBuf>,
}

/// Loads config from defaults/file/env.
pub fn load_config() -> Result<AppConfig> {
    let path = config_path();

    let config: AppConfig = Figment::new()
        .merge(Serialized::defaults(AppConfig::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("LASTSNAP_"))
        .extract()
        .context("Failed to load configuration")?;

    config.validate()?;

    Ok(config)
}

/// Applies runtime overrides to a loaded config.
pub fn apply_overrides(mut config: AppConfig, overrides: &ConfigOverrides) -> AppConfig {
    if let Some(endpoint) = &overrides.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(transport) = overrides.transport {
        config.transport = transport;
    }
    if let Some(output) = &overrides.output {
        config.output = output.clone();
    }

    config
}
