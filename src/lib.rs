//! Track Layout - geometry solving for model railway track plans
//!
//! This library turns an abstract track plan (pieces identified by article
//! code, connections between numbered connectors, turnout switch states)
//! into world poses for every piece, then checks the result.
//!
//! # Example
//!
//! ```rust
//! use track_layout::{solve, LayoutBuilder};
//!
//! // Twelve 30° curves close into a circle
//! let mut circle = LayoutBuilder::new()
//!     .chain("r", "R1", 12)
//!     .connect("r12", 1, "r1", 0)
//!     .build()
//!     .unwrap();
//!
//! let report = solve(&mut circle);
//! assert!(report.is_clean());
//! assert_eq!(report.posed, 12);
//! ```

pub mod catalog;
pub mod error;
pub mod layout;

pub use catalog::{GeometryCatalog, GeometryTemplate};
pub use error::Error;
pub use layout::lint::{self, check};
pub use layout::{
    solve, solve_layout, Connection, ConstraintKind, Layout, LayoutBuilder, LayoutError, Piece,
    Pose, SolveReport, SolverConfig,
};
