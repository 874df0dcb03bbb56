//! Lint engine for detecting geometry and wiring defects in layouts.
//!
//! Catalog and connection checks can run before solving. Placement and
//! joint checks inspect solved poses: stray coordinates, pieces piled up at
//! the origin, and joints whose connectors drifted apart (loops that do not
//! close). Nothing here fails; every finding is a [`LintWarning`].

use std::fmt;

use crate::catalog::{GeometryCatalog, BUILTIN_ARTICLES};

use super::config::LintConfig;
use super::transform::angle_difference;
use super::types::{Connection, ConstraintKind, Layout};

/// A lint warning about a layout defect
#[derive(Debug, Clone, PartialEq)]
pub struct LintWarning {
    pub category: LintCategory,
    pub message: String,
}

impl fmt::Display for LintWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.message)
    }
}

/// Category of lint defect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintCategory {
    Catalog,
    Connection,
    Placement,
    Joint,
}

impl fmt::Display for LintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintCategory::Catalog => write!(f, "catalog"),
            LintCategory::Connection => write!(f, "connection"),
            LintCategory::Placement => write!(f, "placement"),
            LintCategory::Joint => write!(f, "joint"),
        }
    }
}

fn push(warnings: &mut Vec<LintWarning>, category: LintCategory, message: String) {
    warnings.push(LintWarning { category, message });
}

/// Run all lint checks on a layout. The catalog check covers the built-in
/// article list.
pub fn check(layout: &Layout, catalog: &GeometryCatalog, config: &LintConfig) -> Vec<LintWarning> {
    let mut warnings = check_catalog(catalog, BUILTIN_ARTICLES);
    warnings.extend(check_connections(layout, catalog));
    warnings.extend(check_placement(layout, config));
    warnings.extend(check_joints(layout, catalog, config));
    tracing::debug!(count = warnings.len(), "lint finished");
    warnings
}

// ── Catalog ───────────────────────────────────────────────────────

/// Check that every expected article resolves to a well-formed template
pub fn check_catalog(catalog: &GeometryCatalog, codes: &[&str]) -> Vec<LintWarning> {
    let mut warnings = Vec::new();

    for &code in codes {
        let Some(template) = catalog.lookup(code) else {
            push(
                &mut warnings,
                LintCategory::Catalog,
                format!("article {} is missing from the catalog", code),
            );
            continue;
        };

        if template.endpoints.len() != template.headings_deg.len() {
            push(
                &mut warnings,
                LintCategory::Catalog,
                format!(
                    "article {} has {} endpoints but {} headings",
                    code,
                    template.endpoints.len(),
                    template.headings_deg.len()
                ),
            );
        }
        if template.connector_count() < 2 {
            push(
                &mut warnings,
                LintCategory::Catalog,
                format!(
                    "article {} has {} connector(s); track needs at least two",
                    code,
                    template.connector_count()
                ),
            );
        }
        if template.path.trim().is_empty() {
            push(
                &mut warnings,
                LintCategory::Catalog,
                format!("article {} has an empty drawing path", code),
            );
        }
        for (i, &heading) in template.headings_deg.iter().enumerate() {
            if !(0.0..360.0).contains(&heading) {
                push(
                    &mut warnings,
                    LintCategory::Catalog,
                    format!(
                        "article {} connector {} heading {} is outside [0, 360)",
                        code, i, heading
                    ),
                );
            }
        }
    }

    warnings
}

// ── Connections ───────────────────────────────────────────────────

/// Check that every connection references existing pieces, known articles
/// and valid connector indices
pub fn check_connections(layout: &Layout, catalog: &GeometryCatalog) -> Vec<LintWarning> {
    let mut warnings = Vec::new();

    for conn in layout.connections() {
        for end in [&conn.a, &conn.b] {
            let Some(piece) = layout.piece(&end.piece) else {
                push(
                    &mut warnings,
                    LintCategory::Connection,
                    format!("connection {} references unknown piece '{}'", conn, end.piece),
                );
                continue;
            };
            let Some(template) = catalog.lookup(&piece.article) else {
                push(
                    &mut warnings,
                    LintCategory::Connection,
                    format!(
                        "connection {}: piece '{}' uses unknown article {}",
                        conn, piece.id, piece.article
                    ),
                );
                continue;
            };
            if end.connector >= template.connector_count() {
                push(
                    &mut warnings,
                    LintCategory::Connection,
                    format!(
                        "connection {}: connector {} is out of range for {} ({} connectors)",
                        conn,
                        end.connector,
                        piece.article,
                        template.connector_count()
                    ),
                );
            }
        }
    }

    warnings
}

// ── Placement ─────────────────────────────────────────────────────

/// Check solved poses for NaN, runaway coordinates and pieces stacked at
/// the origin. Unposed pieces are skipped.
pub fn check_placement(layout: &Layout, config: &LintConfig) -> Vec<LintWarning> {
    let mut warnings = Vec::new();
    let mut at_origin = Vec::new();

    for piece in layout.pieces() {
        let Some(pose) = piece.pose else {
            continue;
        };

        if pose.is_nan() {
            push(
                &mut warnings,
                LintCategory::Placement,
                format!("piece '{}' has a NaN pose", piece.id),
            );
            continue;
        }
        // Components are spread along X, so drift is measured from each root
        let origin = piece.component_origin.unwrap_or_default();
        let (dx, dy) = (pose.x - origin.x, pose.y - origin.y);
        if dx.abs() > config.extreme_coordinate || dy.abs() > config.extreme_coordinate {
            push(
                &mut warnings,
                LintCategory::Placement,
                format!(
                    "piece '{}' sits at ({:.1}, {:.1}), beyond ±{} of its component root",
                    piece.id, pose.x, pose.y, config.extreme_coordinate
                ),
            );
        }
        if pose.x.hypot(pose.y) < config.position_tolerance {
            at_origin.push(piece.id.as_str());
        }
    }

    if at_origin.len() > 1 {
        push(
            &mut warnings,
            LintCategory::Placement,
            format!(
                "{} pieces sit at the origin: {}",
                at_origin.len(),
                at_origin.join(", ")
            ),
        );
    }

    warnings
}

// ── Joints ────────────────────────────────────────────────────────

/// A connection counts as active when it is ungated or either end carries
/// the required switch state
fn is_active(layout: &Layout, conn: &Connection) -> bool {
    let Some(tag) = conn.active_when.as_deref() else {
        return true;
    };
    [&conn.a, &conn.b].iter().any(|end| {
        layout
            .piece(&end.piece)
            .and_then(|p| p.switch_state.as_deref())
            == Some(tag)
    })
}

/// Check that solved joints actually meet: connectors coincide (rigid and
/// parametric) and face each other (rigid). The connection that closes a
/// loop is never used for placement, so this is where a loop that fails to
/// close shows up.
pub fn check_joints(
    layout: &Layout,
    catalog: &GeometryCatalog,
    config: &LintConfig,
) -> Vec<LintWarning> {
    let mut warnings = Vec::new();

    for conn in layout.connections() {
        if conn.kind == ConstraintKind::Rotational || !is_active(layout, conn) {
            continue;
        }
        let (Some(a), Some(b)) = (
            layout.world_connector(&conn.a.piece, conn.a.connector, catalog),
            layout.world_connector(&conn.b.piece, conn.b.connector, catalog),
        ) else {
            continue;
        };

        let gap = a.position.distance(b.position);
        if gap > config.position_tolerance {
            push(
                &mut warnings,
                LintCategory::Joint,
                format!("connection {} is open by {:.3}", conn, gap),
            );
        }

        if conn.kind == ConstraintKind::Rigid {
            let misalignment = 180.0 - angle_difference(a.heading_deg, b.heading_deg).abs();
            if misalignment > config.heading_tolerance_deg {
                push(
                    &mut warnings,
                    LintCategory::Joint,
                    format!(
                        "connection {} is kinked by {:.3}° (headings {:.3}° and {:.3}°)",
                        conn, misalignment, a.heading_deg, b.heading_deg
                    ),
                );
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin::straight;
    use crate::catalog::GeometryTemplate;
    use crate::layout::transform::{Point, Pose};
    use crate::layout::types::Piece;

    fn posed(id: &str, article: &str, pose: Pose) -> Piece {
        let mut piece = Piece::new(id, article);
        piece.pose = Some(pose);
        piece
    }

    fn catalog() -> &'static GeometryCatalog {
        crate::catalog::shared()
    }

    // ── Catalog tests ──

    #[test]
    fn test_builtin_catalog_is_clean() {
        let warnings = check_catalog(catalog(), BUILTIN_ARTICLES);
        assert!(warnings.is_empty(), "{:?}", warnings);
    }

    #[test]
    fn test_catalog_missing_article() {
        let warnings = check_catalog(catalog(), &["G231", "NOPE"]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].category, LintCategory::Catalog);
        assert!(warnings[0].message.contains("NOPE"));
    }

    #[test]
    fn test_catalog_malformed_template() {
        let mut catalog = GeometryCatalog::new();
        catalog
            .register(
                "BAD",
                GeometryTemplate::new(vec![Point::new(0.0, 0.0)], vec![360.0, 0.0], ""),
            )
            .unwrap();
        let warnings = check_catalog(&catalog, &["BAD"]);
        let text: Vec<String> = warnings.iter().map(|w| w.to_string()).collect();
        assert_eq!(warnings.len(), 4, "{:?}", text);
        assert!(text.iter().any(|t| t.contains("1 endpoints but 2 headings")));
        assert!(text.iter().any(|t| t.contains("at least two")));
        assert!(text.iter().any(|t| t.contains("empty drawing path")));
        assert!(text.iter().any(|t| t.contains("outside [0, 360)")));
    }

    // ── Connection tests ──

    #[test]
    fn test_connection_problems() {
        let layout = Layout::from_parts(
            vec![Piece::new("a", "G231"), Piece::new("x", "NOPE")],
            vec![
                Connection::rigid("a", 1, "ghost", 0),
                Connection::rigid("a", 4, "x", 0),
            ],
        )
        .unwrap();
        let warnings = check_connections(&layout, catalog());
        let text: Vec<String> = warnings.iter().map(|w| w.message.clone()).collect();
        assert_eq!(warnings.len(), 3, "{:?}", text);
        assert!(text[0].contains("unknown piece 'ghost'"));
        assert!(text[1].contains("connector 4 is out of range"));
        assert!(text[2].contains("unknown article NOPE"));
    }

    #[test]
    fn test_valid_connection_is_clean() {
        let layout = Layout::from_parts(
            vec![Piece::new("t", "WL"), Piece::new("s", "G231")],
            vec![Connection::rigid("t", 2, "s", 0)],
        )
        .unwrap();
        assert!(check_connections(&layout, catalog()).is_empty());
    }

    // ── Placement tests ──

    #[test]
    fn test_placement_flags_nan_and_extreme() {
        let layout = Layout::from_parts(
            vec![
                posed("n", "G231", Pose { x: f64::NAN, y: 0.0, rotation_deg: 0.0 }),
                posed("far", "G231", Pose::new(0.0, -12_000.0, 0.0)),
                posed("ok", "G231", Pose::new(500.0, 500.0, 0.0)),
            ],
            vec![],
        )
        .unwrap();
        let warnings = check_placement(&layout, &LintConfig::default());
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].message.contains("'n'"));
        assert!(warnings[1].message.contains("'far'"));
    }

    #[test]
    fn test_placement_measures_from_component_root() {
        let mut spread = posed("spread", "G231", Pose::new(15_000.0, 0.0, 0.0));
        spread.component_origin = Some(Point::new(12_000.0, 0.0));
        let layout = Layout::from_parts(
            vec![spread, posed("stray", "G231", Pose::new(15_000.0, 0.0, 0.0))],
            vec![],
        )
        .unwrap();

        let warnings = check_placement(&layout, &LintConfig::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("'stray'"));
    }

    #[test]
    fn test_placement_flags_pile_at_origin() {
        let layout = Layout::from_parts(
            vec![
                posed("a", "G231", Pose::identity()),
                posed("b", "G231", Pose::new(0.0, 0.0, 90.0)),
                Piece::new("unposed", "G231"),
            ],
            vec![],
        )
        .unwrap();
        let warnings = check_placement(&layout, &LintConfig::default());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].message, "2 pieces sit at the origin: a, b");
    }

    // ── Joint tests ──

    #[test]
    fn test_joint_meets() {
        let layout = Layout::from_parts(
            vec![
                posed("a", "G231", Pose::identity()),
                posed("b", "G231", Pose::new(230.93, 0.0, 0.0)),
            ],
            vec![Connection::rigid("a", 1, "b", 0)],
        )
        .unwrap();
        assert!(check_joints(&layout, catalog(), &LintConfig::default()).is_empty());
    }

    #[test]
    fn test_joint_gap_and_kink() {
        let layout = Layout::from_parts(
            vec![
                posed("a", "G231", Pose::identity()),
                posed("b", "G231", Pose::new(231.93, 0.0, 5.0)),
            ],
            vec![Connection::rigid("a", 1, "b", 0)],
        )
        .unwrap();
        let warnings = check_joints(&layout, catalog(), &LintConfig::default());
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].to_string(), "joint: connection a[1] <-> b[0] is open by 1.000");
        assert!(warnings[1].message.contains("kinked by 5.000°"));
    }

    #[test]
    fn test_joint_skips_inactive_and_unposed() {
        let mut catalog = GeometryCatalog::new();
        catalog.register("S", straight(100.0)).unwrap();
        let layout = Layout::from_parts(
            vec![
                posed("t", "S", Pose::identity()).with_switch_state("straight"),
                posed("far", "S", Pose::new(900.0, 0.0, 0.0)),
                Piece::new("loose", "S"),
            ],
            vec![
                Connection::rigid("t", 1, "far", 0).active_when("diverging"),
                Connection::rigid("t", 1, "loose", 0),
            ],
        )
        .unwrap();
        assert!(check_joints(&layout, &catalog, &LintConfig::default()).is_empty());
    }

    #[test]
    fn test_check_runs_everything() {
        let layout = Layout::from_parts(
            vec![
                posed("a", "G231", Pose::identity()),
                posed("b", "G231", Pose::identity()),
            ],
            vec![Connection::rigid("a", 1, "b", 0)],
        )
        .unwrap();
        let warnings = check(&layout, catalog(), &LintConfig::default());
        let categories: Vec<LintCategory> = warnings.iter().map(|w| w.category).collect();
        // Both at the origin, and the joint is open by a full piece length
        assert_eq!(categories, vec![LintCategory::Placement, LintCategory::Joint]);
    }
}
