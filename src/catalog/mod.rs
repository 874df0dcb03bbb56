//! Geometry catalog for track articles
//!
//! Every placed piece refers to an article code; the catalog maps that code
//! to the piece's connector geometry. The catalog is append-only: once an
//! article is registered its template can never be replaced, so imported
//! templates cannot silently override the built-in track set.
//!
//! # Example
//!
//! ```rust
//! use track_layout::catalog;
//!
//! let r1 = catalog::shared().lookup("R1").unwrap();
//! assert_eq!(r1.connector_count(), 2);
//! ```

pub mod builtin;
mod registry;

use std::sync::OnceLock;

pub use builtin::{Hand, BUILTIN_ARTICLES};
pub use registry::{CatalogError, Connector, GeometryCatalog, GeometryTemplate};

/// Process-wide catalog holding the built-in track set.
///
/// Built once on first use and read-only afterwards, so it can be shared by
/// concurrent solves without locking. Callers needing imported templates
/// should start from [`GeometryCatalog::with_builtins`] instead.
pub fn shared() -> &'static GeometryCatalog {
    static SHARED: OnceLock<GeometryCatalog> = OnceLock::new();
    SHARED.get_or_init(GeometryCatalog::with_builtins)
}
