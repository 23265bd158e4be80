//! Configuration loading and validation for tern.
//!
//! Loads configuration from `~/.tern/config.toml` with environment variable
//! overrides. The core consumes this surface but does not own it: the engine
//! and tool adapters receive plain values built from it at construction, so
//! nothing deep in the pipeline reads global state.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.tern/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Provider API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Provider host override (proxies, self-hosted gateways).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_host: Option<String>,

    /// Model id.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum output tokens per turn.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Tool-use configuration.
    #[serde(default)]
    pub tools: ToolsConfig,
}

fn default_model() -> String {
    "claude-3-5-haiku-latest".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_true() -> bool {
    true
}

/// Tool-use settings consumed by the engine and the adapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Whether tool use is enabled at all. When false the engine declares
    /// no tool schemas and an exchange is exactly one provider turn.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Ceiling on executed tool calls per exchange.
    #[serde(default = "default_max_tool_calls")]
    pub max_tool_calls: u32,

    /// Which search backend serves the `search` tool.
    #[serde(default)]
    pub search_backend: SearchBackendKind,

    /// Google Custom Search credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_cx: Option<String>,

    /// Exa credential (search backend 2 and the browse tool).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exa_api_key: Option<String>,

    /// Default per-page character cap for the browse tool.
    #[serde(default = "default_browse_max_characters")]
    pub browse_max_characters: usize,
}

fn default_max_tool_calls() -> u32 {
    3
}
fn default_browse_max_characters() -> usize {
    2048
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_tool_calls: default_max_tool_calls(),
            search_backend: SearchBackendKind::default(),
            google_api_key: None,
            google_cx: None,
            exa_api_key: None,
            browse_max_characters: default_browse_max_characters(),
        }
    }
}

/// The selectable search backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackendKind {
    #[default]
    Google,
    Exa,
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_host", &self.api_host)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("tools", &RedactedTools(&self.tools))
            .finish()
    }
}

struct RedactedTools<'a>(&'a ToolsConfig);

impl std::fmt::Debug for RedactedTools<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolsConfig")
            .field("enabled", &self.0.enabled)
            .field("max_tool_calls", &self.0.max_tool_calls)
            .field("search_backend", &self.0.search_backend)
            .field("google_api_key", &redact(&self.0.google_api_key))
            .field("google_cx", &self.0.google_cx)
            .field("exa_api_key", &redact(&self.0.exa_api_key))
            .field("browse_max_characters", &self.0.browse_max_characters)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (`~/.tern/config.toml`).
    ///
    /// Environment variables take priority over the file:
    /// - `TERN_API_KEY`, then `ANTHROPIC_API_KEY`, for the provider key
    /// - `TERN_MODEL` for the model id
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("TERN_API_KEY")
                .ok()
                .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("TERN_MODEL") {
            config.model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// The configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".tern")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.temperature < 0.0 || self.temperature > 2.0 {
            return Err(ConfigError::Validation(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.tools.max_tool_calls == 0 {
            return Err(ConfigError::Validation(
                "tools.max_tool_calls must be at least 1".into(),
            ));
        }
        if self.tools.browse_max_characters == 0 {
            return Err(ConfigError::Validation(
                "tools.browse_max_characters must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Whether a provider API key is available.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_host: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            tools: ToolsConfig::default(),
        }
    }
}

fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.model, "claude-3-5-haiku-latest");
        assert_eq!(config.tools.max_tool_calls, 3);
        assert_eq!(config.tools.search_backend, SearchBackendKind::Google);
        assert!(config.tools.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.model, config.model);
        assert_eq!(parsed.tools.max_tool_calls, config.tools.max_tool_calls);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_ceiling_rejected() {
        let config = AppConfig {
            tools: ToolsConfig {
                max_tool_calls: 0,
                ..ToolsConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.model, "claude-3-5-haiku-latest");
    }

    #[test]
    fn backend_selection_parses() {
        let toml_str = r#"
api_key = "sk-ant-test"
[tools]
search_backend = "exa"
exa_api_key = "exa-test"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.tools.search_backend, SearchBackendKind::Exa);
        assert_eq!(config.tools.exa_api_key.as_deref(), Some("exa-test"));
        assert!(config.has_api_key());
    }

    #[test]
    fn load_from_file_on_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "model = \"claude-3-opus-20240229\"").unwrap();
        writeln!(file, "[tools]").unwrap();
        writeln!(file, "max_tool_calls = 5").unwrap();
        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.model, "claude-3-opus-20240229");
        assert_eq!(config.tools.max_tool_calls, 5);
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = AppConfig {
            api_key: Some("sk-ant-secret".into()),
            tools: ToolsConfig {
                exa_api_key: Some("exa-secret".into()),
                ..ToolsConfig::default()
            },
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
