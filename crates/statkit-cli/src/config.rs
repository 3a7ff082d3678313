//! Configuration loading from TOML files.
//!
//! Lookup order:
//! 1. `$STATKIT_CONFIG` environment variable
//! 2. `~/.config/statkit/config.toml`
//! 3. Built-in defaults (everything is optional)

use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use statkit_core::solver::{usable_key, DEFAULT_ENDPOINT, DEFAULT_MODEL};
use statkit_gateway::GatewayConfig;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub gateway: GatewayConfig,
    pub solver: SolverConfig,
}

/// Preference database settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database path. Default: platform-specific data dir.
    pub path: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverMode {
    /// Send problems to the gateway, which holds the key.
    #[default]
    Proxied,
    /// Call the provider directly with a local key.
    Direct,
}

impl fmt::Display for SolverMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Proxied => write!(f, "proxied"),
            Self::Direct => write!(f, "direct"),
        }
    }
}

/// Problem solver settings.
#[derive(Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub mode: SolverMode,
    /// Gateway completion URL used in proxied mode.
    pub proxy_url: String,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            mode: SolverMode::Proxied,
            proxy_url: "http://127.0.0.1:8787/api/grok".into(),
            endpoint: None,
            model: None,
            api_key: None,
            timeout_secs: 60,
        }
    }
}

impl fmt::Debug for SolverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverConfig")
            .field("mode", &self.mode)
            .field("proxy_url", &self.proxy_url)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl SolverConfig {
    /// Fill unset values from the client-side `VITE_GROK_*` variables.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if usable_key(self.api_key.as_deref()).is_none() {
            self.api_key = var("VITE_GROK_API_KEY");
        }
        if blank(self.endpoint.as_deref()) {
            self.endpoint = var("VITE_GROK_API_ENDPOINT");
        }
        if blank(self.model.as_deref()) {
            self.model = var("VITE_GROK_MODEL");
        }
        self
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }
}

fn blank(value: Option<&str>) -> bool {
    value.map(str::trim).unwrap_or_default().is_empty()
}

/// Load config from disk and apply environment overrides. Returns defaults if
/// no config file exists.
pub fn load_config() -> Result<Config> {
    let mut config = read_config_file()?;
    config.gateway = config.gateway.with_process_env();
    config.solver = config.solver.with_env(|name| std::env::var(name).ok());
    Ok(config)
}

fn read_config_file() -> Result<Config> {
    let path = config_path();

    if let Some(p) = &path {
        if p.exists() {
            let content =
                std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;
            let config: Config =
                toml::from_str(&content).with_context(|| format!("parsing {}", p.display()))?;
            return Ok(config);
        }
    }

    Ok(Config::default())
}

/// Resolve the config file path.
fn config_path() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("STATKIT_CONFIG") {
        return Some(PathBuf::from(p));
    }

    directories::BaseDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(".config")
            .join("statkit")
            .join("config.toml")
    })
}

/// Show the active config path (for `statkit config`).
pub fn show_config_path() -> String {
    match config_path() {
        Some(p) if p.exists() => format!("{} (loaded)", p.display()),
        Some(p) => format!("{} (not found, using defaults)", p.display()),
        None => "no config path resolved (using defaults)".into(),
    }
}
