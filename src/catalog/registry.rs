//! Geometry catalog for storing and retrieving track templates

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::transform::Point;

/// Errors that can occur during catalog operations
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Article code already registered; the catalog is append-only
    #[error("duplicate geometry for article {article}")]
    Duplicate { article: String },

    /// Error reading a template file
    #[error("error reading template file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed template TOML
    #[error("failed to parse template TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// A single connector of a template in the piece's local frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connector {
    pub position: Point,
    /// Direction the track points away from the piece at this connector
    pub heading_deg: f64,
}

/// Geometry shared by every piece of one article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryTemplate {
    /// Connector positions in the unrotated local frame
    pub endpoints: Vec<Point>,
    /// One heading per endpoint, in degrees
    pub headings_deg: Vec<f64>,
    /// Opaque path descriptor for the renderer (SVG path data)
    #[serde(default)]
    pub path: String,
}

impl GeometryTemplate {
    pub fn new(endpoints: Vec<Point>, headings_deg: Vec<f64>, path: impl Into<String>) -> Self {
        Self {
            endpoints,
            headings_deg,
            path: path.into(),
        }
    }

    /// Number of usable connectors.
    ///
    /// A template with mismatched endpoint and heading lists only exposes the
    /// connectors that have both.
    pub fn connector_count(&self) -> usize {
        self.endpoints.len().min(self.headings_deg.len())
    }

    /// Get a connector by index
    pub fn connector(&self, index: usize) -> Option<Connector> {
        let position = *self.endpoints.get(index)?;
        let heading_deg = *self.headings_deg.get(index)?;
        Some(Connector {
            position,
            heading_deg,
        })
    }
}

/// TOML structure for imported templates
#[derive(Deserialize)]
struct TomlTemplates {
    #[serde(default)]
    templates: Vec<TomlTemplate>,
}

#[derive(Deserialize)]
struct TomlTemplate {
    article: String,
    #[serde(flatten)]
    geometry: GeometryTemplate,
}

/// Append-only registry mapping article codes to geometry templates
#[derive(Debug, Default, Clone)]
pub struct GeometryCatalog {
    templates: BTreeMap<String, GeometryTemplate>,
}

impl GeometryCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog pre-populated with the built-in track set
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        for (article, template) in super::builtin::templates() {
            // Built-in codes are unique, so registration into an empty
            // catalog cannot collide.
            catalog.templates.entry(article.to_string()).or_insert(template);
        }
        catalog
    }

    /// Register a template.
    ///
    /// Fails if the article code is already present, so imported templates
    /// can never shadow existing ones.
    pub fn register(
        &mut self,
        article: impl Into<String>,
        template: GeometryTemplate,
    ) -> Result<(), CatalogError> {
        let article = article.into();
        if self.templates.contains_key(&article) {
            return Err(CatalogError::Duplicate { article });
        }
        tracing::debug!(
            article = %article,
            connectors = template.connector_count(),
            "registered geometry"
        );
        self.templates.insert(article, template);
        Ok(())
    }

    /// Register every `[[templates]]` entry of a TOML document.
    ///
    /// Returns the number of templates added. Stops at the first duplicate;
    /// entries before it stay registered.
    pub fn register_from_toml(&mut self, content: &str) -> Result<usize, CatalogError> {
        let parsed: TomlTemplates = toml::from_str(content)?;
        let count = parsed.templates.len();
        for entry in parsed.templates {
            self.register(entry.article, entry.geometry)?;
        }
        Ok(count)
    }

    /// Register templates from a TOML file
    pub fn register_from_file(&mut self, path: &Path) -> Result<usize, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.register_from_toml(&content)
    }

    /// Look up a template by article code
    pub fn lookup(&self, article: &str) -> Option<&GeometryTemplate> {
        self.templates.get(article)
    }

    /// Check if an article is registered
    pub fn contains(&self, article: &str) -> bool {
        self.templates.contains_key(article)
    }

    /// All registered article codes, sorted
    pub fn article_codes(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
