//! Configuration loading, validation, and management for Shopbot.
//!
//! Loads configuration from `~/.shopbot/config.toml` (or an explicit path)
//! with environment variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Providers the agent knows how to talk to.
pub const KNOWN_PROVIDERS: &[&str] = &["openrouter", "gigachat"];

/// Strategies the runner can solve tasks with.
pub const KNOWN_STRATEGIES: &[&str] = &["agent", "search"];

/// The root configuration structure.
///
/// Maps directly to `~/.shopbot/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// LLM provider used when `--provider` is not given
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Model override for every provider; per-provider `default_model` wins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,

    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Max tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Benchmark harness connection and session metadata
    #[serde(default)]
    pub benchmark: BenchmarkConfig,

    /// Agent loop limits
    #[serde(default)]
    pub agent: AgentSettings,

    /// Bounds for the deterministic search strategy
    #[serde(default)]
    pub search: SearchConfig,
}

fn default_provider() -> String {
    "openrouter".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_timeout_secs() -> u64 {
    120
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
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("providers", &self.providers)
            .field("benchmark", &self.benchmark)
            .field("agent", &self.agent)
            .field("search", &self.search)
            .finish()
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key; for GigaChat this is the base64 authorization key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Skip TLS verification; unset means on for GigaChat, whose
    /// certificate comes from a private CA, and off elsewhere
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept_invalid_certs: Option<bool>,
}

impl ProviderConfig {
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or_else(default_timeout_secs)
    }

    /// Whether TLS verification is skipped for `provider`.
    pub fn accepts_invalid_certs(&self, provider: &str) -> bool {
        self.accept_invalid_certs.unwrap_or(provider == "gigachat")
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .field("timeout_secs", &self.timeout_secs)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    #[serde(default = "default_benchmark_url")]
    pub api_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_benchmark")]
    pub benchmark: String,

    #[serde(default = "default_workspace")]
    pub workspace: String,

    #[serde(default = "default_flags")]
    pub flags: Vec<String>,
}

fn default_benchmark_url() -> String {
    "https://erc.timetoact-group.at".into()
}
fn default_benchmark() -> String {
    "store".into()
}
fn default_workspace() -> String {
    "my".into()
}
fn default_flags() -> Vec<String> {
    vec!["compete_accuracy".into()]
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            api_url: default_benchmark_url(),
            api_key: None,
            benchmark: default_benchmark(),
            workspace: default_workspace(),
            flags: default_flags(),
        }
    }
}

impl std::fmt::Debug for BenchmarkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchmarkConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("benchmark", &self.benchmark)
            .field("workspace", &self.workspace)
            .field("flags", &self.flags)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// "agent" (LLM drives the tools) or "search" (deterministic trials)
    #[serde(default = "default_strategy")]
    pub strategy: String,

    /// Hard cap on LLM round-trips per task
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// How many times the agent is told to keep going when it stops early
    #[serde(default = "default_max_nudges")]
    pub max_nudges: u32,
}

fn default_strategy() -> String {
    "agent".into()
}
fn default_max_iterations() -> u32 {
    100
}
fn default_max_nudges() -> u32 {
    3
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            max_iterations: default_max_iterations(),
            max_nudges: default_max_nudges(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Upper bound on pack combinations tried per task
    #[serde(default = "default_max_combinations")]
    pub max_combinations: usize,

    /// Upper bound on catalog pages fetched per task
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_max_combinations() -> usize {
    256
}
fn default_max_pages() -> u32 {
    20
}
fn default_page_size() -> u32 {
    50
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_combinations: default_max_combinations(),
            max_pages: default_max_pages(),
            page_size: default_page_size(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, or from the default location when
    /// `None`, then apply process environment overrides:
    /// - `SHOPBOT_PROVIDER`, `SHOPBOT_MODEL`
    /// - `OPENROUTER_API_KEY`, `GIGACHAT_CREDENTIALS`
    /// - `ERC3_API_KEY`, `ERC3_BASE_URL`
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let default_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(path.unwrap_or(&default_path))?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup. Keys already present in
    /// the file win over environment keys; provider and model selection is
    /// always taken from the environment when set.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(provider) = lookup("SHOPBOT_PROVIDER") {
            self.default_provider = provider;
        }
        if let Some(model) = lookup("SHOPBOT_MODEL") {
            self.default_model = Some(model);
        }

        for (provider, var) in [("openrouter", "OPENROUTER_API_KEY"), ("gigachat", "GIGACHAT_CREDENTIALS")] {
            let entry = self.providers.entry(provider.to_string()).or_default();
            if entry.api_key.is_none() {
                entry.api_key = lookup(var);
            }
        }

        if self.benchmark.api_key.is_none() {
            self.benchmark.api_key = lookup("ERC3_API_KEY");
        }
        if let Some(url) = lookup("ERC3_BASE_URL") {
            self.benchmark.api_url = url;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".shopbot")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if !KNOWN_PROVIDERS.contains(&self.default_provider.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "default_provider must be one of {KNOWN_PROVIDERS:?}, got '{}'",
                self.default_provider
            )));
        }

        if !KNOWN_STRATEGIES.contains(&self.agent.strategy.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "agent.strategy must be one of {KNOWN_STRATEGIES:?}, got '{}'",
                self.agent.strategy
            )));
        }

        if self.agent.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_iterations must be > 0".into(),
            ));
        }

        if self.search.max_combinations == 0 || self.search.max_pages == 0 {
            return Err(ConfigError::ValidationError(
                "search.max_combinations and search.max_pages must be > 0".into(),
            ));
        }

        if !(1..=50).contains(&self.search.page_size) {
            return Err(ConfigError::ValidationError(
                "search.page_size must be between 1 and 50".into(),
            ));
        }

        Ok(())
    }

    /// Settings for one provider (empty defaults when not configured).
    pub fn provider(&self, name: &str) -> ProviderConfig {
        self.providers.get(name).cloned().unwrap_or_default()
    }

    /// Resolve the model for a provider: provider entry, then the global
    /// override, then the provider's built-in default.
    pub fn model_for(&self, provider: &str) -> String {
        self.providers
            .get(provider)
            .and_then(|p| p.default_model.clone())
            .or_else(|| self.default_model.clone())
            .unwrap_or_else(|| builtin_model(provider).to_string())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

/// Model used when nothing is configured.
pub fn builtin_model(provider: &str) -> &'static str {
    match provider {
        "gigachat" => "GigaChat-2-Max",
        _ => "openai/gpt-4o",
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            default_model: None,
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            providers: HashMap::new(),
            benchmark: BenchmarkConfig::default(),
            agent: AgentSettings::default(),
            search: SearchConfig::default(),
        }
    }
}

/// Get the user's home directory.
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
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
