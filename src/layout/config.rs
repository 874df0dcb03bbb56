//! Configuration for the layout solver and validator

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading a solver configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Thresholds used by the post-solve validator checks
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    /// Maximum distance between two joined connectors
    pub position_tolerance: f64,

    /// Maximum deviation from exact heading opposition at a rigid joint
    pub heading_tolerance_deg: f64,

    /// Offsets from a component's root beyond this magnitude are reported
    /// as likely drift
    pub extreme_coordinate: f64,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            position_tolerance: 0.01,
            heading_tolerance_deg: 0.1,
            extreme_coordinate: 10_000.0,
        }
    }
}

/// Configuration options for solving a layout
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Horizontal distance between the roots of disconnected components
    pub component_spacing: f64,

    /// Piece to use as the root of the first component
    pub preferred_root: Option<String>,

    /// Validator thresholds
    pub lint: LintConfig,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            component_spacing: 3000.0,
            preferred_root: None,
            lint: LintConfig::default(),
        }
    }
}

impl SolverConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from a TOML string; missing keys keep defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Set the spacing between component roots
    pub fn with_component_spacing(mut self, spacing: f64) -> Self {
        self.component_spacing = spacing;
        self
    }

    /// Set the piece used as the first root
    pub fn with_preferred_root(mut self, id: impl Into<String>) -> Self {
        self.preferred_root = Some(id.into());
        self
    }

    /// Set the validator thresholds
    pub fn with_lint(mut self, lint: LintConfig) -> Self {
        self.lint = lint;
        self
    }
}
