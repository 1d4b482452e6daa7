//! Configuration loading
//!
//! `defaults/flohsm.default.toml` is embedded into the crate so documented defaults
//! and runtime behavior stay in sync. Callers layer user files and single-key
//! overrides on top via [Loader] before deserializing into [FloHsmConfig].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::flohsm::error::FloHsmError;
use crate::flohsm::guard::MAX_CONDITIONS;

const DEFAULT_TOML: &str = include_str!("../../defaults/flohsm.default.toml");


/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FloHsmConfig {
    pub analysis: AnalysisConfig,
    pub generation: GenerationConfig,
    pub output: OutputConfig,
}

/// Knobs for the semantic analyzer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnalysisConfig {
    pub max_guard_conditions: usize,
}

impl AnalysisConfig {
    /// Effective truth-table limit, capped at what an assignment can encode
    pub fn condition_limit(&self) -> usize {
        self.max_guard_conditions.min(MAX_CONDITIONS)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_guard_conditions: 16,
        }
    }
}

/// Policy for the generation gate
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GenerationConfig {
    pub block_on_warnings: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

/// How the command-line tool renders a model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Summary,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Summary => "summary",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = FloHsmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "summary" => Ok(OutputFormat::Summary),
            _ => Err(FloHsmError::UnknownFormat(s.to_string())),
        }
    }
}

/// Layers user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file, ignored if absent.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override, e.g. from a command-line flag.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<FloHsmConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_defaults() -> Result<FloHsmConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_defaults_match_default_impl() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config, FloHsmConfig::default());
        assert_eq!(config.analysis.max_guard_conditions, 16);
        assert!(!config.generation.block_on_warnings);
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_overrides() {
        let config = Loader::new()
            .set_override("output.format", "summary")
            .expect("override to apply")
            .set_override("generation.block_on_warnings", true)
            .expect("override to apply")
            .set_override("analysis.max_guard_conditions", 4i64)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.output.format, OutputFormat::Summary);
        assert!(config.generation.block_on_warnings);
        assert_eq!(config.analysis.condition_limit(), 4);
    }

    #[test]
    fn test_user_file_layers_over_defaults() {
        let path = std::env::temp_dir().join(format!("flohsm-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).expect("temp file");
        writeln!(file, "[analysis]\nmax_guard_conditions = 8").expect("write");
        drop(file);

        let config = Loader::new().with_file(&path).build();
        std::fs::remove_file(&path).ok();

        let config = config.expect("config to build");
        assert_eq!(config.analysis.max_guard_conditions, 8);
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_missing_files() {
        let missing = std::env::temp_dir().join("flohsm-definitely-missing.toml");
        assert!(Loader::new().with_file(&missing).build().is_err());
        let config = Loader::new()
            .with_optional_file(&missing)
            .build()
            .expect("optional file to be skipped");
        assert_eq!(config, FloHsmConfig::default());
    }

    #[test]
    fn test_condition_limit_is_capped() {
        let config = AnalysisConfig {
            max_guard_conditions: 1000,
        };
        assert_eq!(config.condition_limit(), 63);
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>().ok(), Some(OutputFormat::Json));
        assert_eq!("yml".parse::<OutputFormat>().ok(), Some(OutputFormat::Yaml));
        assert_eq!("summary".parse::<OutputFormat>().ok(), Some(OutputFormat::Summary));
        assert!(matches!(
            "xml".parse::<OutputFormat>(),
            Err(FloHsmError::UnknownFormat(name)) if name == "xml"
        ));
    }
}
