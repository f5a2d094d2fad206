use core::fmt;
use core::ops::{Add, Sub};

use glam::DVec2;
use tracing::warn;

/// Free direction/magnitude. Plain `glam` vector; extra semantics come from [`VectorExt`].
pub type Vector = DVec2;

/// Decimal places used by precision-aware comparisons when none is given.
pub const PRECISION: u32 = 10;

/// X coordinate a containment ray is cast towards (largest exactly representable integer).
pub const RAY_CAST_REACH: f64 = 9_007_199_254_740_991.0;

/// Round `value` to `decimals` decimal places.
pub fn fix(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

/// Normalize an angle in degrees into `[0, 360)`.
pub fn clamp_angle(degrees: f64) -> f64 {
    let a = degrees.rem_euclid(360.0);
    // rem_euclid can round tiny negatives up to exactly 360
    if a >= 360.0 { 0.0 } else { a }
}

pub fn to_rad(degrees: f64) -> f64 {
    degrees.to_radians()
}

/// Radians to degrees, normalized into `[0, 360)`.
pub fn to_deg(radians: f64) -> f64 {
    clamp_angle(radians.to_degrees())
}

/// A world or local-frame location.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Equality after rounding both points to `decimals` places.
    pub fn eq_within(self, other: Point, decimals: u32) -> bool {
        fix(self.x, decimals) == fix(other.x, decimals)
            && fix(self.y, decimals) == fix(other.y, decimals)
    }

    pub fn distance(self, other: Point) -> f64 {
        self.to_vector().distance(other.to_vector())
    }

    /// Bearing from `self` to `other` in radians.
    pub fn direction(self, other: Point) -> f64 {
        let d = other - self;
        d.y.atan2(d.x)
    }

    /// Bearing from `self` to `other` in degrees, `[0, 360)`.
    pub fn angle(self, other: Point) -> f64 {
        to_deg(self.direction(other))
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// Rotate about `pivot` by `degrees`. No-op when `self == pivot`.
    pub fn rotate(&mut self, pivot: Point, degrees: f64) {
        if *self == pivot {
            return;
        }
        let radius = self.distance(pivot);
        let heading = pivot.direction(*self) + to_rad(degrees);
        self.x = pivot.x + heading.cos() * radius;
        self.y = pivot.y + heading.sin() * radius;
    }

    /// Move away from (or toward) `anchor` by `offset * factor` per axis.
    /// No-op when `self == anchor`.
    pub fn scale(&mut self, anchor: Point, factor_x: f64, factor_y: f64) {
        if *self == anchor {
            return;
        }
        let offset = *self - anchor;
        self.x += offset.x * factor_x;
        self.y += offset.y * factor_y;
    }

    pub fn to_vector(self) -> Vector {
        DVec2::new(self.x, self.y)
    }
}

impl From<Vector> for Point {
    fn from(v: Vector) -> Self {
        Point::new(v.x, v.y)
    }
}

impl From<Point> for Vector {
    fn from(p: Point) -> Self {
        p.to_vector()
    }
}

impl Add<Vector> for Point {
    type Output = Point;

    fn add(self, rhs: Vector) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Vector;

    fn sub(self, rhs: Point) -> Vector {
        DVec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point[{}, {}]", self.x, self.y)
    }
}

/// Direction/magnitude helpers on top of `glam`.
pub trait VectorExt: Sized {
    fn magnitude(self) -> f64;
    /// Rescale to `magnitude` keeping the direction. A zero vector has no direction;
    /// it is treated as pointing along +x.
    fn with_magnitude(self, magnitude: f64) -> Self;
    /// Heading in radians.
    fn direction(self) -> f64;
    /// Same magnitude, new heading in radians. Zero vectors stay zero.
    fn with_direction(self, radians: f64) -> Self;
    /// Heading in degrees, `[0, 360)`.
    fn angle_deg(self) -> f64;
    fn with_angle_deg(self, degrees: f64) -> Self;
    fn rotated_deg(self, degrees: f64) -> Self;
    fn eq_within(self, other: Self, decimals: u32) -> bool;
}

impl VectorExt for DVec2 {
    fn magnitude(self) -> f64 {
        self.length()
    }

    fn with_magnitude(self, magnitude: f64) -> Self {
        let length = self.length();
        if length == 0.0 {
            if magnitude != 0.0 {
                warn!(magnitude, "magnitude set on a zero vector, assuming +x direction");
            }
            return DVec2::new(magnitude, 0.0);
        }
        self * (magnitude / length)
    }

    fn direction(self) -> f64 {
        self.y.atan2(self.x)
    }

    fn with_direction(self, radians: f64) -> Self {
        let length = self.length();
        if length == 0.0 {
            warn!(radians, "direction set on a zero vector, left unchanged");
            return self;
        }
        DVec2::from_angle(radians) * length
    }

    fn angle_deg(self) -> f64 {
        to_deg(self.direction())
    }

    fn with_angle_deg(self, degrees: f64) -> Self {
        self.with_direction(to_rad(degrees))
    }

    fn rotated_deg(self, degrees: f64) -> Self {
        DVec2::from_angle(to_rad(degrees)).rotate(self)
    }

    fn eq_within(self, other: Self, decimals: u32) -> bool {
        fix(self.x, decimals) == fix(other.x, decimals)
            && fix(self.y, decimals) == fix(other.y, decimals)
    }
}

/// Result of a segment/segment intersection test.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Crossing {
    None,
    /// Segments cross at a single point.
    Point(Point),
    /// Parallel segments sharing at least one endpoint-on-segment.
    Collinear,
}

impl Crossing {
    pub fn is_hit(self) -> bool {
        !matches!(self, Crossing::None)
    }
}

/// A segment between two points.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Line {
    pub p1: Point,
    pub p2: Point,
}

impl Line {
    pub const fn new(p1: Point, p2: Point) -> Self {
        Self { p1, p2 }
    }

    pub fn length(&self) -> f64 {
        self.p1.distance(self.p2)
    }

    /// Radians from `p1` toward `p2`.
    pub fn direction(&self) -> f64 {
        self.p1.direction(self.p2)
    }

    /// Degrees from `p1` toward `p2`, `[0, 360)`.
    pub fn angle(&self) -> f64 {
        self.p1.angle(self.p2)
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.p1.translate(dx, dy);
        self.p2.translate(dx, dy);
    }

    /// True if `point` lies on the segment, within `10^-precision` of it (default
    /// [`PRECISION`] decimals).
    pub fn contains(&self, point: Point, precision: Option<u32>) -> bool {
        let eps = 10f64.powi(-(precision.unwrap_or(PRECISION) as i32));
        let along = self.p2 - self.p1;
        let offset = point - self.p1;
        let length = along.length();
        if length == 0.0 {
            return offset.length() <= eps;
        }
        // |cross| / length is the distance to the carrier line
        if along.perp_dot(offset).abs() > eps * length {
            return false;
        }
        let t = offset.dot(along) / length;
        t >= -eps && t <= length + eps
    }

    /// Parametric segment intersection.
    ///
    /// With a zero determinant the segments are parallel and only count as crossing when an
    /// endpoint of one lies on the other.
    pub fn crosses(&self, other: &Line, precision: Option<u32>) -> Crossing {
        let (a, b) = (self.p1, self.p2);
        let (c, e) = (other.p1, other.p2);
        let d = (a.x - b.x) * (c.y - e.y) - (a.y - b.y) * (c.x - e.x);
        if d == 0.0 {
            let touching = self.contains(c, precision)
                || self.contains(e, precision)
                || other.contains(a, precision)
                || other.contains(b, precision);
            return if touching {
                Crossing::Collinear
            } else {
                Crossing::None
            };
        }
        let t = ((a.x - c.x) * (c.y - e.y) - (a.y - c.y) * (c.x - e.x)) / d;
        let u = -((a.x - b.x) * (a.y - c.y) - (a.y - b.y) * (a.x - c.x)) / d;
        if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
            Crossing::Point(Point::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y)))
        } else {
            Crossing::None
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line[{} - {}]", self.p1, self.p2)
    }
}

/// Closed edge ring of a polygon. Fewer than 3 vertices have no edges.
pub fn ring_edges(vertices: &[Point]) -> Vec<Line> {
    if vertices.len() < 3 {
        return Vec::new();
    }
    let n = vertices.len();
    (0..n)
        .map(|i| Line::new(vertices[i], vertices[(i + 1) % n]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_clamp_angle_wraps_into_range() {
        assert_eq!(clamp_angle(0.0), 0.0);
        assert_eq!(clamp_angle(360.0), 0.0);
        assert!((clamp_angle(-90.0) - 270.0).abs() < EPS);
        assert!((clamp_angle(725.0) - 5.0).abs() < EPS);
        assert!(clamp_angle(-1e-20) < 360.0);
    }

    #[test]
    fn test_point_distance_and_angle() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < EPS);
        assert!((a.angle(Point::new(0.0, -1.0)) - 270.0).abs() < EPS);
        assert!((a.angle(Point::new(1.0, 1.0)) - 45.0).abs() < EPS);
    }

    #[test]
    fn test_point_rotate_about_pivot() {
        let mut p = Point::new(2.0, 1.0);
        p.rotate(Point::new(1.0, 1.0), 90.0);
        assert!(p.eq_within(Point::new(1.0, 2.0), 9));
        p.rotate(Point::new(1.0, 1.0), -90.0);
        assert!(p.eq_within(Point::new(2.0, 1.0), 9));
    }

    #[test]
    fn test_point_rotate_and_scale_on_self_are_noops() {
        let mut p = Point::new(4.0, -2.0);
        p.rotate(p, 33.0);
        assert_eq!(p, Point::new(4.0, -2.0));
        p.scale(p, 3.0, 3.0);
        assert_eq!(p, Point::new(4.0, -2.0));
        assert!(!p.x.is_nan() && !p.y.is_nan());
    }

    #[test]
    fn test_point_scale_moves_by_offset_times_factor() {
        let mut p = Point::new(3.0, 2.0);
        p.scale(Point::new(1.0, 1.0), 1.0, -0.5);
        assert!(p.eq_within(Point::new(5.0, 1.5), 9));
    }

    #[test]
    fn test_with_magnitude_keeps_direction() {
        let v = Vector::new(3.0, 4.0).with_magnitude(10.0);
        assert!(v.eq_within(Vector::new(6.0, 8.0), 9));
    }

    #[test]
    fn test_with_magnitude_on_zero_vector_points_along_x() {
        let v = Vector::ZERO.with_magnitude(2.0);
        assert_eq!(v, Vector::new(2.0, 0.0));
        assert_eq!(Vector::ZERO.with_magnitude(0.0), Vector::ZERO);
    }

    #[test]
    fn test_rotated_deg_and_angle() {
        let v = Vector::new(1.0, 0.0).rotated_deg(90.0);
        assert!(v.eq_within(Vector::new(0.0, 1.0), 9));
        assert!((Vector::new(-1.0, 0.0).angle_deg() - 180.0).abs() < EPS);
        let w = Vector::new(2.0, 0.0).with_angle_deg(180.0);
        assert!(w.eq_within(Vector::new(-2.0, 0.0), 9));
        assert_eq!(Vector::ZERO.with_angle_deg(45.0), Vector::ZERO);
    }

    #[test]
    fn test_line_crosses_at_point() {
        let a = Line::new(Point::new(0.0, 0.0), Point::new(2.0, 2.0));
        let b = Line::new(Point::new(0.0, 2.0), Point::new(2.0, 0.0));
        match a.crosses(&b, None) {
            Crossing::Point(p) => assert!(p.eq_within(Point::new(1.0, 1.0), 9)),
            other => panic!("expected point crossing, got {other:?}"),
        }
    }

    #[test]
    fn test_line_crosses_miss_and_parallel() {
        let a = Line::new(Point::new(0.0, 0.0), Point::new(1.0, 0.0));
        let b = Line::new(Point::new(2.0, -1.0), Point::new(2.0, 1.0));
        assert_eq!(a.crosses(&b, None), Crossing::None);
        let c = Line::new(Point::new(0.0, 1.0), Point::new(1.0, 1.0));
        assert_eq!(a.crosses(&c, None), Crossing::None);
        let d = Line::new(Point::new(0.5, 0.0), Point::new(3.0, 0.0));
        assert_eq!(a.crosses(&d, None), Crossing::Collinear);
        assert!(a.crosses(&d, None).is_hit());
    }

    #[test]
    fn test_line_contains() {
        let l = Line::new(Point::new(0.0, 0.0), Point::new(4.0, 4.0));
        assert!(l.contains(Point::new(1.0, 1.0), None));
        assert!(l.contains(Point::new(0.0, 0.0), None));
        assert!(!l.contains(Point::new(1.0, 1.5), None));
        assert!(!l.contains(Point::new(5.0, 5.0), None));
    }

    #[test]
    fn test_line_contains_rejects_points_just_off_long_edges() {
        let short = Line::new(Point::new(105.0, 95.0), Point::new(105.0, 105.0));
        assert!(short.contains(Point::new(105.0, 100.0), None));
        assert!(!short.contains(Point::new(105.00001, 100.0), None));
        let long = Line::new(Point::new(1000.0, -1000.0), Point::new(1000.0, 1000.0));
        assert!(!long.contains(Point::new(1000.0002, 0.0), None));
        let huge = Line::new(Point::new(1e6, -1e6), Point::new(1e6, 1e6));
        assert!(!huge.contains(Point::new(1e6 + 0.004, 0.0), None));
        assert!(huge.contains(Point::new(1e6, 0.0), None));
        // beyond the endpoints on the carrier line
        assert!(!short.contains(Point::new(105.0, 105.001), None));
        assert!(short.contains(Point::new(105.0, 105.0), Some(6)));
    }

    #[test]
    fn test_ring_edges() {
        assert!(ring_edges(&[Point::ZERO]).is_empty());
        let tri = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)];
        let edges = ring_edges(&tri);
        assert_eq!(edges.len(), 3);
        assert_eq!(edges[2], Line::new(tri[2], tri[0]));
    }
}
