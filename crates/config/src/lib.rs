//! Configuration loading, validation, and management for Menagerie.
//!
//! Loads configuration from `~/.menagerie/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.menagerie/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gemini API key. Without one, the scripted offline generator is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Generation model
    #[serde(default = "default_model")]
    pub model: String,

    /// Simulation and content language
    #[serde(default = "default_language")]
    pub language: String,

    /// Global temperature for agent/post/comment generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Number of history items to include in generation context
    #[serde(default = "default_context_depth")]
    pub context_depth: usize,

    /// Upper bound on generated agent bios, in characters
    #[serde(default = "default_max_bio_length")]
    pub max_bio_length: usize,

    /// Simulation cadence and population settings
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// User-defined experiments, merged after the presets
    #[serde(default)]
    pub experiments: Vec<ExperimentConfig>,
}

fn default_model() -> String {
    "gemini-3-flash-preview".into()
}
fn default_language() -> String {
    "English".into()
}
fn default_temperature() -> f32 {
    1.0
}
fn default_context_depth() -> usize {
    3
}
fn default_max_bio_length() -> usize {
    100
}

/// Redact a secret string for Debug output.
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
            .field("model", &self.model)
            .field("language", &self.language)
            .field("temperature", &self.temperature)
            .field("context_depth", &self.context_depth)
            .field("max_bio_length", &self.max_bio_length)
            .field("simulation", &self.simulation)
            .field("gateway", &self.gateway)
            .field("experiments", &self.experiments)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Milliseconds between scheduler ticks
    #[serde(default = "default_action_delay_ms")]
    pub action_delay_ms: u64,

    /// Re-analyze the zeitgeist every N posts
    #[serde(default = "default_zeitgeist_interval")]
    pub zeitgeist_interval: usize,

    /// Population cap for randomly-created agents
    #[serde(default = "default_max_agents")]
    pub max_agents: usize,
}

fn default_action_delay_ms() -> u64 {
    5000
}
fn default_zeitgeist_interval() -> usize {
    10
}
fn default_max_agents() -> usize {
    20
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            action_delay_ms: default_action_delay_ms(),
            zeitgeist_interval: default_zeitgeist_interval(),
            max_agents: default_max_agents(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    47718
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// A user-defined experiment from a `[[experiments]]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub hypothesis: String,

    /// The exact directive injected into generative calls while active
    pub instruction: String,

    /// Whether this experiment activates the credit economy
    #[serde(default)]
    pub scarcity: bool,
}

impl AppConfig {
    /// Load configuration from the default path (~/.menagerie/config.toml).
    ///
    /// Also checks environment variables:
    /// - `MENAGERIE_API_KEY` (highest priority)
    /// - `GEMINI_API_KEY`
    /// - `MENAGERIE_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        // Environment variable overrides (highest priority)
        if config.api_key.is_none() {
            config.api_key = std::env::var("MENAGERIE_API_KEY")
                .ok()
                .or_else(|| std::env::var("GEMINI_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("MENAGERIE_MODEL") {
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

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".menagerie")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.simulation.action_delay_ms < 250 {
            return Err(ConfigError::ValidationError(
                "simulation.action_delay_ms must be at least 250".into(),
            ));
        }

        if self.simulation.zeitgeist_interval == 0 {
            return Err(ConfigError::ValidationError(
                "simulation.zeitgeist_interval must be at least 1".into(),
            ));
        }

        if self.simulation.max_agents < 5 {
            return Err(ConfigError::ValidationError(
                "simulation.max_agents must be at least 5 (the bootstrap floor)".into(),
            ));
        }

        for exp in &self.experiments {
            if exp.instruction.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "experiment '{}' has an empty instruction",
                    exp.title
                )));
            }
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            language: default_language(),
            temperature: default_temperature(),
            context_depth: default_context_depth(),
            max_bio_length: default_max_bio_length(),
            simulation: SimulationConfig::default(),
            gateway: GatewayConfig::default(),
            experiments: vec![],
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
