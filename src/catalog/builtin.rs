//! Built-in track geometry (Piko A-track) and template constructors.
//!
//! Every template is derived from nominal catalog dimensions: straight
//! length, curve radius and sweep angle. Left-hand pieces curve towards +Y
//! (counter-clockwise), right-hand pieces are their exact mirror image
//! across the local X axis.
//!
//! Connector order per family:
//! - straights and curves: `[start, end]`
//! - turnouts: `[entry, straight, diverging]`
//! - curved turnouts: `[entry, inner exit, outer exit]`
//! - three-way turnouts: `[entry, straight, right, left]`
//! - Y-switches: `[entry, right, left]`
//! - crossings and double slips: `[entry A, exit A, entry B, exit B]`

use crate::layout::transform::{normalize_angle, Point};

use super::registry::GeometryTemplate;

/// Length of the standard G231 straight, also the base of every turnout
pub const STANDARD_LENGTH: f64 = 230.93;

/// Radius of the R9 curve used for turnout diverging routes
pub const TURNOUT_RADIUS: f64 = 907.97;

/// Diverging angle of standard turnouts
pub const TURNOUT_ANGLE: f64 = 15.0;

/// Sweep of the R1-R4 standard curves; twelve make a full circle
pub const CURVE_ANGLE: f64 = 30.0;

/// Radii of the standard curves, 61.88 mm apart
pub const R1: f64 = 360.0;
pub const R2: f64 = 421.88;
pub const R3: f64 = 483.75;
pub const R4: f64 = 545.63;

/// Every article code registered by [`templates`]
pub const BUILTIN_ARTICLES: &[&str] = &[
    "G239", "G231", "G119", "G115", "G107", "G62", "G940", "R1", "R2", "R3", "R4", "R9", "WL",
    "WR", "W3", "WY", "BWL", "BWR", "BWL-R3", "BWR-R3", "DKW", "K15", "K30", "Curve_545",
    "Curve_638", "Curve_732", "Curve_1374",
];

/// Which side a curve or diverging route turns to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hand {
    /// Counter-clockwise, towards +Y
    Left,
    /// Clockwise, towards -Y
    Right,
}

impl Hand {
    fn sign(self) -> f64 {
        match self {
            Hand::Left => 1.0,
            Hand::Right => -1.0,
        }
    }

    /// SVG arc sweep flag
    fn sweep_flag(self) -> u8 {
        match self {
            Hand::Left => 1,
            Hand::Right => 0,
        }
    }
}

/// End point and outward heading of an arc starting at the origin along +X
fn arc_end(radius: f64, angle_deg: f64, hand: Hand) -> (Point, f64) {
    let (sin_a, cos_a) = angle_deg.to_radians().sin_cos();
    let end = Point::new(radius * sin_a, hand.sign() * radius * (1.0 - cos_a));
    (end, normalize_angle(hand.sign() * angle_deg))
}

fn line_path(from: Point, to: Point) -> String {
    format!("M {:.2},{:.2} L {:.2},{:.2}", from.x, from.y, to.x, to.y)
}

fn arc_path(radius: f64, hand: Hand, to: Point) -> String {
    format!(
        "M 0,0 A {r:.2},{r:.2} 0 0 {} {:.2},{:.2}",
        hand.sweep_flag(),
        to.x,
        to.y,
        r = radius
    )
}

/// A straight of the given length
pub fn straight(length: f64) -> GeometryTemplate {
    let end = Point::new(length, 0.0);
    GeometryTemplate::new(
        vec![Point::new(0.0, 0.0), end],
        vec![180.0, 0.0],
        line_path(Point::new(0.0, 0.0), end),
    )
}

/// A circular curve of the given radius and sweep
pub fn curve(radius: f64, angle_deg: f64, hand: Hand) -> GeometryTemplate {
    let (end, heading) = arc_end(radius, angle_deg, hand);
    GeometryTemplate::new(
        vec![Point::new(0.0, 0.0), end],
        vec![180.0, heading],
        arc_path(radius, hand, end),
    )
}

/// A simple turnout: straight route plus one diverging arc
pub fn turnout(length: f64, radius: f64, angle_deg: f64, hand: Hand) -> GeometryTemplate {
    let straight_end = Point::new(length, 0.0);
    let (branch_end, branch_heading) = arc_end(radius, angle_deg, hand);
    GeometryTemplate::new(
        vec![Point::new(0.0, 0.0), straight_end, branch_end],
        vec![180.0, 0.0, branch_heading],
        format!(
            "{} {}",
            line_path(Point::new(0.0, 0.0), straight_end),
            arc_path(radius, hand, branch_end)
        ),
    )
}

/// A curved turnout: two concentric-start arcs of different radius
pub fn curved_turnout(
    inner_radius: f64,
    outer_radius: f64,
    angle_deg: f64,
    hand: Hand,
) -> GeometryTemplate {
    let (inner_end, inner_heading) = arc_end(inner_radius, angle_deg, hand);
    let (outer_end, outer_heading) = arc_end(outer_radius, angle_deg, hand);
    GeometryTemplate::new(
        vec![Point::new(0.0, 0.0), inner_end, outer_end],
        vec![180.0, inner_heading, outer_heading],
        format!(
            "{} {}",
            arc_path(inner_radius, hand, inner_end),
            arc_path(outer_radius, hand, outer_end)
        ),
    )
}

/// A three-way turnout: straight, right and left routes
pub fn three_way(length: f64, radius: f64, angle_deg: f64) -> GeometryTemplate {
    let straight_end = Point::new(length, 0.0);
    let (right_end, right_heading) = arc_end(radius, angle_deg, Hand::Right);
    let (left_end, left_heading) = arc_end(radius, angle_deg, Hand::Left);
    GeometryTemplate::new(
        vec![Point::new(0.0, 0.0), straight_end, right_end, left_end],
        vec![180.0, 0.0, right_heading, left_heading],
        format!(
            "{} {} {}",
            line_path(Point::new(0.0, 0.0), straight_end),
            arc_path(radius, Hand::Right, right_end),
            arc_path(radius, Hand::Left, left_end)
        ),
    )
}

/// A symmetric Y-switch splitting into a right and a left arc
pub fn y_switch(radius: f64, angle_deg: f64) -> GeometryTemplate {
    let (right_end, right_heading) = arc_end(radius, angle_deg, Hand::Right);
    let (left_end, left_heading) = arc_end(radius, angle_deg, Hand::Left);
    GeometryTemplate::new(
        vec![Point::new(0.0, 0.0), right_end, left_end],
        vec![180.0, right_heading, left_heading],
        format!(
            "{} {}",
            arc_path(radius, Hand::Right, right_end),
            arc_path(radius, Hand::Left, left_end)
        ),
    )
}

/// Two straights of equal length crossing at their midpoints.
///
/// Route A runs along the local X axis; route B is rotated by `angle_deg`
/// around the midpoint of A.
pub fn crossing(length: f64, angle_deg: f64) -> GeometryTemplate {
    let half = length / 2.0;
    let (sin_a, cos_a) = angle_deg.to_radians().sin_cos();
    let b_start = Point::new(half - half * cos_a, -half * sin_a);
    let b_end = Point::new(half + half * cos_a, half * sin_a);
    let a_end = Point::new(length, 0.0);
    GeometryTemplate::new(
        vec![Point::new(0.0, 0.0), a_end, b_start, b_end],
        vec![
            180.0,
            0.0,
            normalize_angle(180.0 + angle_deg),
            normalize_angle(angle_deg),
        ],
        format!(
            "{} {}",
            line_path(Point::new(0.0, 0.0), a_end),
            line_path(b_start, b_end)
        ),
    )
}

/// The built-in catalog contents, in registration order
pub fn templates() -> Vec<(&'static str, GeometryTemplate)> {
    vec![
        ("G239", straight(239.07)),
        ("G231", straight(STANDARD_LENGTH)),
        ("G119", straight(119.54)),
        ("G115", straight(115.46)),
        ("G107", straight(107.32)),
        ("G62", straight(61.88)),
        ("G940", straight(940.0)),
        ("R1", curve(R1, CURVE_ANGLE, Hand::Left)),
        ("R2", curve(R2, CURVE_ANGLE, Hand::Left)),
        ("R3", curve(R3, CURVE_ANGLE, Hand::Left)),
        ("R4", curve(R4, CURVE_ANGLE, Hand::Left)),
        ("R9", curve(TURNOUT_RADIUS, TURNOUT_ANGLE, Hand::Left)),
        (
            "WL",
            turnout(STANDARD_LENGTH, TURNOUT_RADIUS, TURNOUT_ANGLE, Hand::Left),
        ),
        (
            "WR",
            turnout(STANDARD_LENGTH, TURNOUT_RADIUS, TURNOUT_ANGLE, Hand::Right),
        ),
        ("W3", three_way(STANDARD_LENGTH, TURNOUT_RADIUS, TURNOUT_ANGLE)),
        ("WY", y_switch(TURNOUT_RADIUS, TURNOUT_ANGLE)),
        ("BWL", curved_turnout(R2, R3, CURVE_ANGLE, Hand::Left)),
        ("BWR", curved_turnout(R2, R3, CURVE_ANGLE, Hand::Right)),
        ("BWL-R3", curved_turnout(R3, R4, CURVE_ANGLE, Hand::Left)),
        ("BWR-R3", curved_turnout(R3, R4, CURVE_ANGLE, Hand::Right)),
        ("DKW", crossing(STANDARD_LENGTH, TURNOUT_ANGLE)),
        ("K15", crossing(STANDARD_LENGTH, 15.0)),
        ("K30", crossing(107.32, 30.0)),
        ("Curve_545", curve(545.0, CURVE_ANGLE, Hand::Left)),
        ("Curve_638", curve(638.0, CURVE_ANGLE, Hand::Left)),
        ("Curve_732", curve(732.0, CURVE_ANGLE, Hand::Left)),
        ("Curve_1374", curve(1374.0, TURNOUT_ANGLE, Hand::Left)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_builtin_list_matches_templates() {
        let codes: Vec<&str> = templates().iter().map(|(code, _)| *code).collect();
        assert_eq!(codes, BUILTIN_ARTICLES);
    }

    #[test]
    fn test_every_builtin_is_well_formed() {
        for (code, t) in templates() {
            assert!(t.endpoints.len() >= 2, "{} has too few endpoints", code);
            assert_eq!(t.endpoints.len(), t.headings_deg.len(), "{}", code);
            assert!(!t.path.is_empty(), "{} has no path", code);
            for h in &t.headings_deg {
                assert!((0.0..360.0).contains(h), "{} heading {} out of range", code, h);
            }
        }
    }

    #[test]
    fn test_r1_matches_catalog_dimensions() {
        let t = curve(R1, CURVE_ANGLE, Hand::Left);
        // Published end point: (180.00, 48.23)
        assert!((t.endpoints[1].x - 180.0).abs() < 0.01);
        assert!((t.endpoints[1].y - 48.23).abs() < 0.01);
        assert_eq!(t.headings_deg, vec![180.0, 30.0]);
    }

    #[test]
    fn test_turnout_hands_are_mirrored() {
        let left = turnout(STANDARD_LENGTH, TURNOUT_RADIUS, TURNOUT_ANGLE, Hand::Left);
        let right = turnout(STANDARD_LENGTH, TURNOUT_RADIUS, TURNOUT_ANGLE, Hand::Right);
        for (l, r) in left.endpoints.iter().zip(&right.endpoints) {
            assert!((l.x - r.x).abs() < EPSILON);
            assert!((l.y + r.y).abs() < EPSILON);
        }
        assert_eq!(left.headings_deg[2], 15.0);
        assert_eq!(right.headings_deg[2], 345.0);
    }

    #[test]
    fn test_crossing_routes_share_midpoint() {
        let t = crossing(STANDARD_LENGTH, 15.0);
        let mid_a = Point::new(
            (t.endpoints[0].x + t.endpoints[1].x) / 2.0,
            (t.endpoints[0].y + t.endpoints[1].y) / 2.0,
        );
        let mid_b = Point::new(
            (t.endpoints[2].x + t.endpoints[3].x) / 2.0,
            (t.endpoints[2].y + t.endpoints[3].y) / 2.0,
        );
        assert!(mid_a.distance(mid_b) < EPSILON);
        assert!((t.endpoints[2].distance(t.endpoints[3]) - STANDARD_LENGTH).abs() < EPSILON);
        assert_eq!(t.headings_deg, vec![180.0, 0.0, 195.0, 15.0]);
    }

    #[test]
    fn test_three_way_has_four_connectors() {
        let t = three_way(STANDARD_LENGTH, TURNOUT_RADIUS, TURNOUT_ANGLE);
        assert_eq!(t.connector_count(), 4);
        assert_eq!(t.headings_deg, vec![180.0, 0.0, 345.0, 15.0]);
    }
}
