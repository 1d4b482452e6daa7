//! Fatal errors
//!
//! Problems with the descriptor itself are [diagnostics](crate::flohsm::diagnostics).
//! This type covers everything around it that stops a run: unreadable input,
//! broken configuration and output serialization.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FloHsmError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("unknown output format '{0}' (expected json, yaml or summary)")]
    UnknownFormat(String),

    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, FloHsmError>;
