//! Error types for building and loading layouts

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while constructing or loading a layout.
///
/// Solving never fails; anomalies found while solving are reported as
/// warnings in the [`SolveReport`](super::SolveReport).
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Two pieces share an id
    #[error("duplicate piece id '{id}'")]
    DuplicatePiece { id: String },

    /// A builder step referenced a piece that was never added
    #[error("unknown piece '{id}'")]
    UnknownPiece { id: String },

    /// Error reading a layout file
    #[error("error reading layout file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed layout TOML
    #[error("failed to parse layout TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

impl LayoutError {
    /// Create a duplicate piece error
    pub fn duplicate(id: impl Into<String>) -> Self {
        Self::DuplicatePiece { id: id.into() }
    }

    /// Create an unknown piece error
    pub fn unknown(id: impl Into<String>) -> Self {
        Self::UnknownPiece { id: id.into() }
    }
}
