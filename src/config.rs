//! Configuration loading and management.
//!
//! Loads `stylesim.toml` (or the path in `$STYLESIM_CONFIG`, or `--config`).
//! Environment variables override file values; file values override defaults.
//! CLI flags are applied last by `main`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::dataset::source::DEFAULT_DATASETS_SERVER_URL;
use crate::error::ConfigError;
use crate::providers::ollama::DEFAULT_OLLAMA_URL;
use crate::providers::openai::DEFAULT_OPENAI_URL;
use crate::task::TaskKind;

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "stylesim.toml";

/// Env var holding an explicit config path.
pub const CONFIG_PATH_ENV: &str = "STYLESIM_CONFIG";

// ── Top-level config ────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base and edit model selection.
    pub models: ModelsConfig,
    /// Run driver settings.
    pub run: RunConfig,
    /// Task name -> datasets to process.
    pub tasks: BTreeMap<String, Vec<String>>,
    /// Backend endpoints.
    pub providers: ProvidersConfig,
    /// Extra users and guidelines merged into the built-in registry.
    pub preferences: PreferencesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            models: ModelsConfig::default(),
            run: RunConfig::default(),
            tasks: BTreeMap::from([(
                TaskKind::Summarization.name().to_owned(),
                vec!["cnn_dailymail".to_owned()],
            )]),
            providers: ProvidersConfig::default(),
            preferences: PreferencesConfig::default(),
        }
    }
}

/// Model selection for the two stages.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Base-stage model spec. `None` runs the single-stage pipeline.
    pub base: Option<String>,
    /// Edit-stage (or single-stage) model spec.
    pub edit: String,
    /// Maximum tokens per completion.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            base: Some("ollama/phi4-mini".to_owned()),
            edit: "openai/gpt-4o-mini".to_owned(),
            max_tokens: 4000,
            temperature: 0.0,
        }
    }
}

/// Run driver settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Directory receiving the JSON record files.
    pub output_dir: PathBuf,
    /// Directory receiving rotated JSON logs.
    pub logs_dir: PathBuf,
    /// Examples per dataset outside test mode.
    pub num_examples: usize,
    /// How many registry users examples are spread over.
    pub num_users: usize,
    /// Dataset split to read.
    pub split: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("synthesized"),
            logs_dir: PathBuf::from("logs"),
            num_examples: 100,
            num_users: 5,
            split: "train".to_owned(),
        }
    }
}

/// Backend endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Base URL of the hosted (OpenAI-compatible) API.
    pub openai_base_url: String,
    /// Base URL of the local Ollama server.
    pub ollama_base_url: String,
    /// Base URL of the Hugging Face datasets-server.
    pub datasets_server_url: String,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            openai_base_url: DEFAULT_OPENAI_URL.to_owned(),
            ollama_base_url: DEFAULT_OLLAMA_URL.to_owned(),
            datasets_server_url: DEFAULT_DATASETS_SERVER_URL.to_owned(),
        }
    }
}

/// Registry extensions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PreferencesConfig {
    /// User id -> intent identifiers.
    pub users: BTreeMap<String, Vec<String>>,
    /// Task name -> dataset -> guideline text.
    pub guidelines: BTreeMap<String, BTreeMap<String, String>>,
}

impl Config {
    /// Load configuration with precedence: env vars > TOML file > defaults.
    ///
    /// An explicit path must exist. Without one, `$STYLESIM_CONFIG` is tried,
    /// then `./stylesim.toml`; a missing default file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a file exists but cannot be read or parsed, or if
    /// an explicit path does not exist.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match explicit {
            Some(path) => load_config(path)?,
            None => {
                let path = config_path_with(|key| std::env::var(key).ok());
                if path.exists() {
                    load_config(&path)?
                } else {
                    tracing::info!("no config file found, using defaults");
                    Self::default()
                }
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// Takes a resolver function so tests need not mutate the process env.
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("STYLESIM_BASE_MODEL") {
            self.models.base = parse_optional_model(&v);
        }
        if let Some(v) = env("STYLESIM_EDIT_MODEL") {
            self.models.edit = v;
        }
        if let Some(v) = env("STYLESIM_OUTPUT_DIR") {
            self.run.output_dir = PathBuf::from(v);
        }
        if let Some(v) = env("STYLESIM_NUM_EXAMPLES") {
            match v.parse() {
                Ok(n) => self.run.num_examples = n,
                Err(_) => tracing::warn!(
                    var = "STYLESIM_NUM_EXAMPLES",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
    }

    /// Configured tasks, parsed, with their datasets.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownTask`] for a task name outside the supported set.
    pub fn task_plan(&self) -> Result<Vec<(TaskKind, Vec<String>)>, ConfigError> {
        self.tasks
            .iter()
            .map(|(name, datasets)| Ok((name.parse::<TaskKind>()?, datasets.clone())))
            .collect()
    }
}

/// `"none"` or an empty value disables the base stage.
pub fn parse_optional_model(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

/// Load configuration from a TOML file, without env overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config at {}", path.display()))?;
    tracing::info!(path = %path.display(), "loaded config from file");
    Ok(config)
}

/// Resolve the config path using a custom env resolver.
pub fn config_path_with(env: impl Fn(&str) -> Option<String>) -> PathBuf {
    env(CONFIG_PATH_ENV).map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from)
}
