//! Gateway settings and credential resolution.
//!
//! Two slots hold the upstream settings. The primary slot is read from
//! `GROK_API_KEY`, `GROK_API_ENDPOINT` and `GROK_MODEL`; the fallback slot from
//! the `VITE_GROK_*` names. Each value is taken from the primary slot, then the
//! fallback slot, then the built-in default. Empty strings count as unset
//! everywhere.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, GatewayResult};

pub const DEFAULT_ENDPOINT: &str = "https://api.x.ai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "grok-4-latest";
pub const DEFAULT_COMPLETION_PATH: &str = "/api/grok";
pub const DEFAULT_BIND: &str = "127.0.0.1:8787";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Upstream bearer credential. Never printed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// One named group of upstream settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamSlot {
    #[serde(skip_serializing)]
    pub api_key: Option<ApiKey>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
}

impl UpstreamSlot {
    fn key(&self) -> Option<&ApiKey> {
        self.api_key.as_ref().filter(|k| !k.is_blank())
    }

    fn endpoint(&self) -> Option<&str> {
        non_empty(self.endpoint.as_deref())
    }

    fn model(&self) -> Option<&str> {
        non_empty(self.model.as_deref())
    }

    /// Replace fields with the non-empty variables found under `prefix`.
    fn overlay_env(&mut self, prefix: &str, lookup: &impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(&format!("{prefix}{name}")).filter(|v| !v.trim().is_empty());
        if let Some(key) = var("API_KEY") {
            self.api_key = Some(ApiKey::new(key));
        }
        if let Some(endpoint) = var("API_ENDPOINT") {
            self.endpoint = Some(endpoint);
        }
        if let Some(model) = var("MODEL") {
            self.model = Some(model);
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub bind: String,
    pub completion_path: String,
    pub timeout_secs: u64,
    /// Serve static files from this directory instead of the embedded bundle.
    pub assets_dir: Option<PathBuf>,
    pub primary: UpstreamSlot,
    pub fallback: UpstreamSlot,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.into(),
            completion_path: DEFAULT_COMPLETION_PATH.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            assets_dir: None,
            primary: UpstreamSlot::default(),
            fallback: UpstreamSlot::default(),
        }
    }
}

/// Settings for one forwarded request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUpstream {
    pub api_key: ApiKey,
    pub endpoint: String,
    pub model: String,
}

impl GatewayConfig {
    /// Apply the process environment on top of the file values.
    pub fn with_process_env(self) -> Self {
        self.with_env(|name| std::env::var(name).ok())
    }

    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        self.primary.overlay_env("GROK_", &lookup);
        self.fallback.overlay_env("VITE_GROK_", &lookup);
        self
    }

    pub fn resolve(&self) -> GatewayResult<ResolvedUpstream> {
        let api_key = self
            .primary
            .key()
            .or_else(|| self.fallback.key())
            .cloned()
            .ok_or(GatewayError::Configuration)?;
        let endpoint = self
            .primary
            .endpoint()
            .or_else(|| self.fallback.endpoint())
            .unwrap_or(DEFAULT_ENDPOINT);
        let model = self
            .primary
            .model()
            .or_else(|| self.fallback.model())
            .unwrap_or(DEFAULT_MODEL);
        Ok(ResolvedUpstream {
            api_key,
            endpoint: endpoint.to_string(),
            model: model.to_string(),
        })
    }

    pub fn has_credential(&self) -> bool {
        self.primary.key().is_some() || self.fallback.key().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = GatewayConfig::default();
        assert_eq!(cfg.completion_path, "/api/grok");
        assert_eq!(cfg.timeout_secs, 30);
        assert!(matches!(cfg.resolve(), Err(GatewayError::Configuration)));
    }

    #[test]
    fn test_primary_wins_over_fallback() {
        let cfg = GatewayConfig::default().with_env(env(&[
            ("GROK_API_KEY", "primary-key"),
            ("VITE_GROK_API_KEY", "fallback-key"),
            ("VITE_GROK_MODEL", "grok-3"),
        ]));
        let up = cfg.resolve().unwrap();
        assert_eq!(up.api_key.expose(), "primary-key");
        assert_eq!(up.model, "grok-3");
        assert_eq!(up.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_empty_values_are_unset() {
        let cfg = GatewayConfig::default().with_env(env(&[
            ("GROK_API_KEY", ""),
            ("VITE_GROK_API_KEY", "fallback-key"),
            ("GROK_MODEL", "  "),
        ]));
        let up = cfg.resolve().unwrap();
        assert_eq!(up.api_key.expose(), "fallback-key");
        assert_eq!(up.model, DEFAULT_MODEL);

        let mut cfg = GatewayConfig::default();
        cfg.primary.api_key = Some(ApiKey::new(""));
        assert!(!cfg.has_credential());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let cfg: GatewayConfig = toml::from_str(
            r#"
            timeout_secs = 5
            [primary]
            api_key = "from-file"
            endpoint = "http://localhost:9000/v1/chat/completions"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.timeout_secs, 5);
        assert_eq!(cfg.completion_path, DEFAULT_COMPLETION_PATH);

        let cfg = cfg.with_env(env(&[("GROK_API_KEY", "from-env")]));
        let up = cfg.resolve().unwrap();
        assert_eq!(up.api_key.expose(), "from-env");
        assert_eq!(up.endpoint, "http://localhost:9000/v1/chat/completions");
    }

    #[test]
    fn test_key_never_shown() {
        let cfg = GatewayConfig::default().with_env(env(&[("GROK_API_KEY", "xai-secret")]));
        assert!(!format!("{cfg:?}").contains("xai-secret"));
        assert!(!format!("{:?}", cfg.resolve().unwrap()).contains("xai-secret"));
        assert!(!toml::to_string(&cfg).unwrap().contains("xai-secret"));
    }
}
