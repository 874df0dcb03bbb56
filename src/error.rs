//! Top-level error type for loading inputs
//!
//! Solving and validation never fail. Only reading catalogs, layouts and
//! configuration can, and each of those has its own error; [`Error`] wraps
//! them for callers that load all three.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::layout::{ConfigError, LayoutError};

#[derive(Debug, Error)]
pub enum Error {
    /// Error importing geometry templates
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Error building or loading a layout
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    /// Error loading solver configuration
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(layout: &str, config: &str) -> Result<(), Error> {
        crate::layout::Layout::from_toml_str(layout)?;
        crate::layout::SolverConfig::from_toml_str(config)?;
        Ok(())
    }

    #[test]
    fn test_errors_convert_with_question_mark() {
        let err = load("[[pieces]]\nid = 1", "").unwrap_err();
        assert!(matches!(err, Error::Layout(LayoutError::Parse(_))));
        assert!(err.to_string().starts_with("layout error: "));

        let err = load("", "component_spacing = []").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_duplicate_article_wraps() {
        let err: Error = CatalogError::Duplicate {
            article: "R1".into(),
        }
        .into();
        assert!(err.to_string().contains("R1"));
    }
}
