//! Linter configuration.
//!
//! The CodeClimate runtime hands the engine a JSON document such as:
//!
//! ```json
//! {
//!   "include_paths": ["protos/set1"],
//!   "exclude_paths": ["vendor/", "^build/.*"],
//!   "config": { "protopaths": ["protos"] }
//! }
//! ```
//!
//! `config.protopaths` takes precedence over `include_paths`. Every other key
//! is kept verbatim and can be read back through [`LinterConfig::get`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::LinterError;

/// Configuration for a single lint run.
#[derive(Debug, Clone, Deserialize)]
pub struct LinterConfig {
    /// Paths to scan, relative to the workspace unless absolute.
    #[serde(default)]
    pub include_paths: Vec<String>,

    /// Paths to skip: exact entries, literal prefixes or regular expressions.
    #[serde(default)]
    pub exclude_paths: Vec<String>,

    /// Engine-specific section.
    #[serde(default)]
    pub config: EngineConfig,

    /// The parsed document, including keys this engine does not interpret.
    #[serde(skip)]
    raw: Map<String, Value>,

    /// Workspace directory as passed on the command line.
    #[serde(skip)]
    workspace: PathBuf,

    /// Path of the file this configuration was loaded from.
    #[serde(skip)]
    source: Option<PathBuf>,
}

/// The nested `config` object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    /// Overrides `include_paths` when present.
    #[serde(default)]
    pub protopaths: Option<Vec<String>>,
}

impl LinterConfig {
    /// Loads configuration from a file for the given workspace.
    pub fn from_file(
        path: impl AsRef<Path>,
        workspace: impl Into<PathBuf>,
    ) -> Result<Self, LinterError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            LinterError::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let mut config = Self::from_json(&content, workspace)?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parses configuration from a JSON string for the given workspace.
    pub fn from_json(json: &str, workspace: impl Into<PathBuf>) -> Result<Self, LinterError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| LinterError::config(format!("Invalid JSON: {}", e)))?;

        let Value::Object(raw) = value else {
            return Err(LinterError::config("Config must be a JSON object"));
        };

        let mut config: LinterConfig = serde_json::from_value(Value::Object(raw.clone()))
            .map_err(|e| LinterError::config(format!("Invalid config: {}", e)))?;
        config.raw = raw;
        config.workspace = workspace.into();

        debug!(
            "Parsed config: {}",
            serde_json::to_string_pretty(&config.raw).unwrap_or_default()
        );
        Ok(config)
    }

    /// Returns the paths to scan, honouring the `config.protopaths` override.
    pub fn include_paths(&self) -> &[String] {
        self.config
            .protopaths
            .as_deref()
            .unwrap_or(&self.include_paths)
    }

    /// Returns the configured exclude entries.
    pub fn exclude_paths(&self) -> &[String] {
        &self.exclude_paths
    }

    /// Returns the workspace directory as configured.
    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Returns the file this configuration was read from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Returns a top-level configuration value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }

    /// Returns every top-level key other than `include_paths`.
    pub fn config_items(&self) -> impl Iterator<Item = &str> {
        self.raw
            .keys()
            .map(String::as_str)
            .filter(|key| *key != "include_paths")
    }
}
