//! Rigid 2D transforms for placing track pieces in the world frame.
//!
//! A [`Pose`] positions a piece's local frame inside the shared world frame:
//! local points are rotated by `rotation_deg` around the local origin and then
//! translated by `(x, y)`.
//!
//! ## Rotation Convention
//!
//! Angles are in degrees, counter-clockwise positive with the Y axis pointing
//! up (the usual mathematical frame). Headings are stored normalized to
//! `[0, 360)`.
//! - 0° = +X
//! - 90° = +Y
//! - 180° = -X
//! - 270° = -Y

use serde::{Deserialize, Serialize};

/// A 2D point, in either a piece's local frame or the world frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// Normalize an angle in degrees into `[0, 360)`.
///
/// Total over all finite inputs; NaN stays NaN.
pub fn normalize_angle(degrees: f64) -> f64 {
    let result = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if result >= 360.0 {
        0.0
    } else {
        result
    }
}

/// Signed shortest difference `b - a` in degrees, in `(-180, 180]`.
pub fn angle_difference(a: f64, b: f64) -> f64 {
    let diff = normalize_angle(b - a);
    if diff > 180.0 {
        diff - 360.0
    } else {
        diff
    }
}

/// Rotate a point around the origin.
///
/// ```text
/// x' = x * cos(θ) - y * sin(θ)
/// y' = x * sin(θ) + y * cos(θ)
/// ```
pub fn rotate(point: Point, degrees: f64) -> Point {
    let (sin_a, cos_a) = degrees.to_radians().sin_cos();
    Point {
        x: point.x * cos_a - point.y * sin_a,
        y: point.x * sin_a + point.y * cos_a,
    }
}

/// World placement of a single track piece.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    /// Rotation in degrees, normalized to `[0, 360)` by every constructor
    /// in this crate
    pub rotation_deg: f64,
}

impl Pose {
    /// Create a pose, normalizing the rotation.
    pub fn new(x: f64, y: f64, rotation_deg: f64) -> Self {
        Self {
            x,
            y,
            rotation_deg: normalize_angle(rotation_deg),
        }
    }

    /// The identity pose (origin, no rotation).
    pub const fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation_deg: 0.0,
        }
    }

    /// Translation component as a point
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Map a point from the piece's local frame into the world frame.
    pub fn transform_point(&self, local: Point) -> Point {
        let rotated = rotate(local, self.rotation_deg);
        Point {
            x: rotated.x + self.x,
            y: rotated.y + self.y,
        }
    }

    /// Map a local heading into a world heading.
    pub fn transform_heading(&self, local_heading_deg: f64) -> f64 {
        normalize_angle(self.rotation_deg + local_heading_deg)
    }

    /// Chain transforms: apply `other` inside this pose's frame.
    ///
    /// `self.compose(other).transform_point(p) == self.transform_point(other.transform_point(p))`
    pub fn compose(&self, other: &Pose) -> Pose {
        let origin = self.transform_point(other.position());
        Pose::new(origin.x, origin.y, self.rotation_deg + other.rotation_deg)
    }

    /// Inverse transform, so that `pose.compose(&pose.inverse())` is the identity.
    pub fn inverse(&self) -> Pose {
        let back = rotate(Point::new(-self.x, -self.y), -self.rotation_deg);
        Pose::new(back.x, back.y, -self.rotation_deg)
    }

    /// Compare with tolerances on position and (wrapped) rotation.
    pub fn approx_eq(&self, other: &Pose, pos_epsilon: f64, angle_epsilon: f64) -> bool {
        (self.x - other.x).abs() <= pos_epsilon
            && (self.y - other.y).abs() <= pos_epsilon
            && angle_difference(self.rotation_deg, other.rotation_deg).abs() <= angle_epsilon
    }

    /// True when any component is NaN.
    pub fn is_nan(&self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.rotation_deg.is_nan()
    }
}
