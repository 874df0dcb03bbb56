//! Layout engine for computing track piece poses
//!
//! This module takes pieces and the connections between them and computes
//! where every piece sits in the plane, so that connectors meet exactly at
//! every joint. Switch states decide which turnout branches take part.

pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod lint;
pub mod solver;
pub mod transform;
pub mod types;

pub use builder::LayoutBuilder;
pub use config::{ConfigError, LintConfig, SolverConfig};
pub use engine::{solve_layout, SolveReport, SolveWarning, WarningKind};
pub use error::LayoutError;
pub use lint::{LintCategory, LintWarning};
pub use solver::solve_child_pose;
pub use transform::{Point, Pose};
pub use types::*;

/// Solve a layout against the built-in catalog with default settings
pub fn solve(layout: &mut Layout) -> SolveReport {
    solve_layout(layout, crate::catalog::shared(), &SolverConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_uses_builtin_catalog() {
        let mut layout = LayoutBuilder::new().chain("s", "G62", 2).build().unwrap();
        let report = solve(&mut layout);
        assert!(report.is_clean());
        let second = layout.pose_of("s2").unwrap();
        assert!((second.x - 61.88).abs() < 1e-9, "got {}", second.x);
    }
}
