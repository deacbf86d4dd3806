use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

pub const DEFAULT_UPSTREAM_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_PROXY_URL: &str = "http://localhost:3001";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3001;

/// Connection to the upstream weather/geocoding service. Only the proxy reads this.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_UPSTREAM_URL.to_string(), api_key: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: DEFAULT_BIND_ADDRESS.to_string(), port: DEFAULT_PORT }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub proxy_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { proxy_url: DEFAULT_PROXY_URL.to_string() }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [upstream]
/// api_key = "..."
///
/// [client]
/// proxy_url = "http://localhost:3001"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub upstream: UpstreamConfig,
    pub server: ServerConfig,
    pub client: ClientConfig,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load config from disk and apply overrides from the process environment.
    pub fn load_with_env() -> Result<Self> {
        Self::load()?.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-dashboard", "weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Apply environment overrides. `lookup` is `std::env::var` in production.
    ///
    /// Recognised keys: `OPENWEATHER_API_KEY`, `WEATHER_PROXY_URL`,
    /// `WEATHER_BIND_ADDRESS`, `WEATHER_PORT`.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("OPENWEATHER_API_KEY") {
            self.upstream.api_key = Some(key);
        }
        if let Some(url) = get("WEATHER_PROXY_URL") {
            self.client.proxy_url = url;
        }
        if let Some(addr) = get("WEATHER_BIND_ADDRESS") {
            self.server.bind_address = addr;
        }
        if let Some(port) = get("WEATHER_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("WEATHER_PORT is not a valid port: {port}"))?;
        }

        Ok(self)
    }

    /// Returns the upstream API key, or a hint on how to provide one.
    pub fn require_api_key(&self) -> Result<&str> {
        self.upstream.api_key.as_deref().filter(|k| !k.is_empty()).ok_or_else(|| {
            anyhow!(
                "No OpenWeather API key configured.\n\
                 Hint: set OPENWEATHER_API_KEY or run `weather configure` on the server host."
            )
        })
    }

    /// Convenience helper: set/replace the upstream API key.
    pub fn upsert_api_key(&mut self, api_key: String) {
        self.upstream.api_key = Some(api_key);
    }

    /// Base URL of the proxy without a trailing slash.
    pub fn proxy_url(&self) -> &str {
        self.client.proxy_url.trim_end_matches('/')
    }
}
