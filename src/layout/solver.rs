//! Constraint solver: derive a child's world pose from its parent's
//!
//! Given where the parent sits and which connectors touch, each
//! [`ConstraintKind`] fixes the child's pose:
//!
//! - **Rigid**: connectors coincide and face each other (headings differ by
//!   exactly 180°).
//! - **Rotational**: connectors coincide, the child keeps the parent's
//!   rotation.
//! - **Parametric**: connectors coincide, and the child connector's world
//!   heading is the parent connector's world heading plus `branchAngle`.
//!   A branch angle of 180° is therefore the same joint as Rigid.

use crate::catalog::{Connector, GeometryTemplate};

use super::transform::{normalize_angle, rotate, Pose};
use super::types::{ConstraintKind, ConstraintParams};

/// Compute the child's world pose across one connection.
///
/// If either connector index is out of range for its template, the parent's
/// pose is returned unchanged so that a traversal can carry on with a
/// best-effort result.
pub fn solve_child_pose(
    parent_pose: Pose,
    parent: &GeometryTemplate,
    parent_connector: usize,
    child: &GeometryTemplate,
    child_connector: usize,
    kind: ConstraintKind,
    params: Option<&ConstraintParams>,
) -> Pose {
    let (Some(p), Some(c)) = (
        parent.connector(parent_connector),
        child.connector(child_connector),
    ) else {
        tracing::warn!(
            parent_connector,
            child_connector,
            "invalid connector index, keeping parent pose"
        );
        return parent_pose;
    };

    match kind {
        ConstraintKind::Rigid => {
            let rotation = parent_pose.rotation_deg + p.heading_deg + 180.0 - c.heading_deg;
            align(parent_pose, p, c, rotation)
        }
        ConstraintKind::Rotational => {
            let rotation = parent_pose.rotation_deg + p.heading_deg + 180.0 - c.heading_deg;
            let rigid = align(parent_pose, p, c, rotation);
            Pose {
                rotation_deg: parent_pose.rotation_deg,
                ..rigid
            }
        }
        ConstraintKind::Parametric => {
            let branch_angle = params.map(ConstraintParams::branch_angle).unwrap_or(0.0);
            let rotation =
                parent_pose.rotation_deg + p.heading_deg + branch_angle - c.heading_deg;
            align(parent_pose, p, c, rotation)
        }
    }
}

/// Place the child so its connector lands on the parent's connector, with
/// the given child rotation.
fn align(parent_pose: Pose, parent: Connector, child: Connector, rotation: f64) -> Pose {
    let rotation = normalize_angle(rotation);
    let world_connector = parent_pose.transform_point(parent.position);
    let offset = rotate(child.position, rotation);
    Pose {
        x: world_connector.x - offset.x,
        y: world_connector.y - offset.y,
        rotation_deg: rotation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin::{curve, straight, turnout, Hand};
    use crate::layout::transform::{angle_difference, Point};

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_rigid_straight_continues_straight() {
        let s = straight(100.0);
        let child = solve_child_pose(Pose::identity(), &s, 1, &s, 0, ConstraintKind::Rigid, None);
        assert!(approx_eq(child.x, 100.0), "x: expected 100.0, got {}", child.x);
        assert!(approx_eq(child.y, 0.0), "y: expected 0.0, got {}", child.y);
        assert!(approx_eq(child.rotation_deg, 0.0));
    }

    #[test]
    fn test_rigid_reversed_piece_points_backwards() {
        // Joining end to end flips the child around
        let s = straight(100.0);
        let child = solve_child_pose(Pose::identity(), &s, 1, &s, 1, ConstraintKind::Rigid, None);
        assert!(approx_eq(child.x, 200.0), "x: expected 200.0, got {}", child.x);
        assert!(approx_eq(child.rotation_deg, 180.0));
    }

    #[test]
    fn test_rigid_connectors_coincide_and_oppose() {
        let parent = curve(360.0, 30.0, Hand::Left);
        let child = turnout(230.93, 907.97, 15.0, Hand::Right);
        let parent_pose = Pose::new(12.0, -40.0, 75.0);

        let pose = solve_child_pose(parent_pose, &parent, 1, &child, 2, ConstraintKind::Rigid, None);

        let pw = parent_pose.transform_point(parent.endpoints[1]);
        let cw = pose.transform_point(child.endpoints[2]);
        assert!(pw.distance(cw) < EPSILON, "connectors apart by {}", pw.distance(cw));

        let ph = parent_pose.transform_heading(parent.headings_deg[1]);
        let ch = pose.transform_heading(child.headings_deg[2]);
        assert!(approx_eq(angle_difference(ph, ch).abs(), 180.0));
    }

    #[test]
    fn test_rotational_keeps_parent_rotation() {
        let parent = curve(360.0, 30.0, Hand::Left);
        let child = straight(100.0);
        let parent_pose = Pose::new(0.0, 0.0, 45.0);

        let rigid = solve_child_pose(parent_pose, &parent, 1, &child, 0, ConstraintKind::Rigid, None);
        let rotational = solve_child_pose(
            parent_pose,
            &parent,
            1,
            &child,
            0,
            ConstraintKind::Rotational,
            None,
        );

        assert!(approx_eq(rotational.x, rigid.x));
        assert!(approx_eq(rotational.y, rigid.y));
        assert!(approx_eq(rotational.rotation_deg, 45.0));
    }

    #[test]
    fn test_parametric_branch_angle_180_matches_rigid() {
        let parent = turnout(230.93, 907.97, 15.0, Hand::Left);
        let child = straight(119.54);
        let parent_pose = Pose::new(500.0, 250.0, 120.0);
        let params = ConstraintParams::new().with("branchAngle", 180.0);

        let rigid = solve_child_pose(parent_pose, &parent, 2, &child, 0, ConstraintKind::Rigid, None);
        let parametric = solve_child_pose(
            parent_pose,
            &parent,
            2,
            &child,
            0,
            ConstraintKind::Parametric,
            Some(&params),
        );
        assert!(parametric.approx_eq(&rigid, EPSILON, EPSILON));
    }

    #[test]
    fn test_parametric_default_branch_angle_is_zero() {
        let s = straight(100.0);
        let without = solve_child_pose(
            Pose::identity(),
            &s,
            1,
            &s,
            0,
            ConstraintKind::Parametric,
            None,
        );
        // Child connector 0 heading (180°) is rotated onto the parent's 0°
        assert!(approx_eq(without.rotation_deg, 180.0));
        assert!(approx_eq(without.x, 100.0));
        assert!(approx_eq(without.y, 0.0));

        let empty = ConstraintParams::new();
        let with_empty = solve_child_pose(
            Pose::identity(),
            &s,
            1,
            &s,
            0,
            ConstraintKind::Parametric,
            Some(&empty),
        );
        assert_eq!(without, with_empty);
    }

    #[test]
    fn test_parametric_connectors_still_coincide() {
        let parent = straight(100.0);
        let child = curve(360.0, 30.0, Hand::Left);
        let params = ConstraintParams::new().with("branchAngle", 165.0);
        let pose = solve_child_pose(
            Pose::identity(),
            &parent,
            1,
            &child,
            0,
            ConstraintKind::Parametric,
            Some(&params),
        );
        let cw = pose.transform_point(child.endpoints[0]);
        assert!(cw.distance(Point::new(100.0, 0.0)) < EPSILON);
        // World heading of the child connector = 0° + 165°
        assert!(approx_eq(pose.transform_heading(child.headings_deg[0]), 165.0));
    }

    #[test]
    fn test_invalid_connector_returns_parent_pose() {
        let s = straight(100.0);
        let parent_pose = Pose::new(1.0, 2.0, 3.0);
        let pose = solve_child_pose(parent_pose, &s, 5, &s, 0, ConstraintKind::Rigid, None);
        assert_eq!(pose, parent_pose);
        let pose = solve_child_pose(parent_pose, &s, 0, &s, 2, ConstraintKind::Parametric, None);
        assert_eq!(pose, parent_pose);
    }
}
