//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/cadtree/cadtree.toml`
//! 3. Explicit config file passed with `--config`
//! 4. Environment variables: `CADTREE_*` prefix, `__` between sections
//!
//! Command line flags are applied on top by the CLI layer.

use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::readers::DEFAULT_STEP_TITLE;
use crate::application::ApplicationError;
use crate::util::path::expand_env_vars;

/// Input format of the model behind a locator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    /// `Assembly:` / `Part:` / `EndAssembly` lines
    #[default]
    Tagged,
    /// JSON document with `assemblies` and `parts` records
    Records,
    /// STEP exchange file read through the CAD kernel
    Step,
}

/// Where locators are resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Filesystem paths
    #[default]
    File,
    /// Filesystem paths ending in `.json`
    Json,
    /// Built-in demo content (`mem:` locators)
    Memory,
}

/// Destination of listing log events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LoggerKind {
    /// Forward to the tracing subscriber
    #[default]
    Tracing,
    /// Discard
    Quiet,
}

macro_rules! display_as_value_name {
    ($($ty:ty),*) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.to_possible_value() {
                    Some(value) => f.write_str(value.get_name()),
                    None => write!(f, "{:?}", self),
                }
            }
        }
    )*};
}

display_as_value_name!(ModelFormat, SourceKind, LoggerKind);

/// STEP reader configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StepConfig {
    /// Root name when the file carries no `FILE_NAME` title
    pub default_title: String,
    /// Directory for the temporary copy handed to the kernel (default: system temp dir)
    pub temp_dir: Option<PathBuf>,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            default_title: DEFAULT_STEP_TITLE.to_string(),
            temp_dir: None,
        }
    }
}

/// Raw STEP config for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawStepConfig {
    pub default_title: Option<String>,
    pub temp_dir: Option<PathBuf>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub format: Option<ModelFormat>,
    pub source: Option<SourceKind>,
    pub logger: Option<LoggerKind>,
    pub step: RawStepConfig,
}

/// Unified configuration for cadtree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub format: ModelFormat,
    pub source: SourceKind,
    pub logger: LoggerKind,
    pub step: StepConfig,
}

/// Get the XDG config directory for cadtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "cadtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("cadtree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(dir) = &self.step.temp_dir {
            let expanded = expand_env_vars(dir.to_string_lossy().as_ref());
            self.step.temp_dir = Some(PathBuf::from(expanded));
        }
    }

    /// Overlay wins for every field it specifies.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            format: overlay.format.unwrap_or(self.format),
            source: overlay.source.unwrap_or(self.source),
            logger: overlay.logger.unwrap_or(self.logger),
            step: StepConfig {
                default_title: overlay
                    .step
                    .default_title
                    .clone()
                    .unwrap_or_else(|| self.step.default_title.clone()),
                temp_dir: overlay
                    .step
                    .temp_dir
                    .clone()
                    .or_else(|| self.step.temp_dir.clone()),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Explicit config file; must exist when given
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/cadtree/cadtree.toml` (optional)
    /// 3. Explicit config file
    /// 4. Environment variables: `CADTREE_*` prefix
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(path) = config_file {
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply CADTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("CADTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        let raw = RawSettings {
            format: Self::env_choice(&config, "format")?,
            source: Self::env_choice(&config, "source")?,
            logger: Self::env_choice(&config, "logger")?,
            step: RawStepConfig {
                default_title: config.get_string("step.default_title").ok(),
                temp_dir: config.get_string("step.temp_dir").ok().map(PathBuf::from),
            },
        };

        Ok(settings.merge_with(&raw))
    }

    /// Parse an enum-valued override; unset is `None`, an unknown value is an error.
    fn env_choice<T: ValueEnum>(config: &Config, key: &str) -> Result<Option<T>, ApplicationError> {
        let Ok(value) = config.get_string(key) else {
            return Ok(None);
        };
        T::from_str(&value, true)
            .map(Some)
            .map_err(|e| ApplicationError::Config {
                message: format!("CADTREE_{}: {}", key.to_uppercase(), e),
            })
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# cadtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global:   ~/.config/cadtree/cadtree.toml
#   Explicit: cadtree --config <file>
#   Env:      CADTREE_* environment variables (e.g. CADTREE_STEP__DEFAULT_TITLE)

# Input format: "tagged", "records" or "step"
# format = "tagged"

# Locator resolution: "file", "json" or "memory"
# source = "file"

# Listing log events: "tracing" or "quiet"
# logger = "tracing"

[step]
# Root name when the STEP header has no FILE_NAME title
# default_title = "STEP Model"

# Directory for the temporary copy handed to the CAD kernel
# temp_dir = "~/tmp"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
