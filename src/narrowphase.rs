use tracing::trace;

use crate::api::NarrowphaseApi;
use crate::geom::{ring_edges, Line, Point, Vector, RAY_CAST_REACH};
use crate::shape::Shape;
use crate::types::*;

/// Convex collision view of a shape: a vertex ring, optionally inflated by a radius.
///
/// A circle is the one-vertex case (its center) with `radius > 0`; polygons have `radius == 0`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hull<'a> {
    pub vertices: &'a [Point],
    pub radius: f64,
}

impl<'a> Hull<'a> {
    pub fn new(vertices: &'a [Point], radius: f64) -> Self {
        Self { vertices, radius }
    }

    fn is_round(&self) -> bool {
        self.radius > 0.0
    }
}

/// Separating-axis narrowphase.
pub struct Narrowphase;

impl Narrowphase {
    /// Circle axes: from the center toward the nearest and the farthest vertex of `other`.
    /// The nearest one separates a circle from a polygon corner; the farthest one is where a
    /// polygon inside a circle would stick out.
    fn radial_axes(center: Point, other: &Hull<'_>) -> Vec<Vector> {
        let mut nearest: Option<(f64, Vector)> = None;
        let mut farthest: Option<(f64, Vector)> = None;
        for v in other.vertices {
            let offset = *v - center;
            let Some(axis) = offset.try_normalize() else {
                continue;
            };
            let d = offset.length_squared();
            if nearest.is_none_or(|(n, _)| d < n) {
                nearest = Some((d, axis));
            }
            if farthest.is_none_or(|(f, _)| d > f) {
                farthest = Some((d, axis));
            }
        }
        let mut axes: Vec<Vector> = nearest.into_iter().map(|(_, a)| a).collect();
        if let Some((_, far)) = farthest {
            if !axes.contains(&far) {
                axes.push(far);
            }
        }
        axes
    }
}

impl NarrowphaseApi for Narrowphase {
    fn project(hull: &Hull<'_>, axis: Vector) -> Projection {
        hull.vertices.iter().fold(Projection::EMPTY, |p, v| {
            let dot = v.to_vector().dot(axis);
            Projection {
                min: p.min.min(dot - hull.radius),
                max: p.max.max(dot + hull.radius),
            }
        })
    }

    fn axes(hull: &Hull<'_>, other: &Hull<'_>) -> Vec<Vector> {
        if hull.is_round() {
            return match hull.vertices.first() {
                Some(&center) => Self::radial_axes(center, other),
                None => Vec::new(),
            };
        }
        ring_edges(hull.vertices)
            .iter()
            .filter_map(|edge| (edge.p2 - edge.p1).perp().try_normalize())
            .collect()
    }

    fn separating_axis(a: &Hull<'_>, b: &Hull<'_>) -> SatState {
        let mut a_in_b = true;
        let mut b_in_a = true;
        let axes = Self::axes(a, b).into_iter().chain(Self::axes(b, a));
        for axis in axes {
            let pa = Self::project(a, axis);
            let pb = Self::project(b, axis);
            if pa.separated_from(&pb) {
                return SatState::Separate;
            }
            a_in_b &= pa.within(&pb);
            b_in_a &= pb.within(&pa);
        }
        if a_in_b || b_in_a {
            SatState::Enclosed
        } else {
            SatState::Overlapping
        }
    }

    fn circle_circle(c0: Point, r0: f64, c1: Point, r1: f64) -> SatState {
        let d = c0.distance(c1);
        if d > r0 + r1 {
            SatState::Separate
        } else if d < (r0 - r1).abs() {
            SatState::Enclosed
        } else {
            SatState::Overlapping
        }
    }

    fn classify(actor: &Shape, interactor: &Shape) -> Option<SatState> {
        match (actor.kind(), interactor.kind()) {
            (ShapeKind::Circle { .. }, ShapeKind::Circle { .. }) => {
                let c0 = *actor.vertices().first()?;
                let c1 = *interactor.vertices().first()?;
                Some(Self::circle_circle(c0, actor.radius()?, c1, interactor.radius()?))
            }
            _ => {
                let (Some(a), Some(b)) = (actor.hull(), interactor.hull()) else {
                    trace!(actor = %actor.id(), interactor = %interactor.id(), "no collision routine for shapeless pair");
                    return None;
                };
                Some(Self::separating_axis(&a, &b))
            }
        }
    }

    fn contains_point(shape: &Shape, point: Point) -> bool {
        match shape.kind() {
            ShapeKind::Circle { .. } => match (shape.vertices().first(), shape.radius()) {
                (Some(&center), Some(r)) => center.distance(point) <= r,
                _ => false,
            },
            ShapeKind::Rectangle { .. } => polygon_contains(shape.vertices(), point),
            ShapeKind::None => false,
        }
    }
}

/// Crossing-number test with a horizontal ray toward +x. Points on an edge count as inside.
/// Edges only count when they straddle the ray's height (half-open), so a ray passing through
/// a vertex is counted once.
fn polygon_contains(vertices: &[Point], point: Point) -> bool {
    let edges = ring_edges(vertices);
    if edges.iter().any(|e| e.contains(point, None)) {
        return true;
    }
    let ray = Line::new(point, Point::new(RAY_CAST_REACH, point.y));
    let crossings = edges
        .iter()
        .filter(|e| (e.p1.y > point.y) != (e.p2.y > point.y))
        .filter(|e| ray.crosses(e, None).is_hit())
        .count();
    crossings % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    fn square(cx: f64, cy: f64, half: f64) -> Vec<Point> {
        vec![
            Point::new(cx + half, cy - half),
            Point::new(cx + half, cy + half),
            Point::new(cx - half, cy + half),
            Point::new(cx - half, cy - half),
        ]
    }

    // --- Projection / axes --------------------------------------------------

    #[test]
    fn test_project_polygon_and_circle() {
        let sq = square(0.0, 0.0, 1.0);
        let p = Narrowphase::project(&Hull::new(&sq, 0.0), DVec2::X);
        assert_eq!(p, Projection { min: -1.0, max: 1.0 });

        let c = [Point::new(3.0, 4.0)];
        let p = Narrowphase::project(&Hull::new(&c, 2.0), DVec2::Y);
        assert_eq!(p, Projection { min: 2.0, max: 6.0 });
    }

    #[test]
    fn test_polygon_axes_are_unit_edge_normals() {
        let sq = square(0.0, 0.0, 2.0);
        let axes = Narrowphase::axes(&Hull::new(&sq, 0.0), &Hull::new(&[], 0.0));
        assert_eq!(axes.len(), 4);
        for a in &axes {
            assert!((a.length() - 1.0).abs() < 1e-12);
            assert!(a.x == 0.0 || a.y == 0.0);
        }
    }

    #[test]
    fn test_circle_axes_toward_nearest_and_farthest_vertex() {
        let c = [Point::ZERO];
        let poly = [Point::new(3.0, 0.0), Point::new(0.0, 5.0), Point::new(-4.0, 0.0)];
        let axes = Narrowphase::axes(&Hull::new(&c, 1.0), &Hull::new(&poly, 0.0));
        assert_eq!(axes, vec![DVec2::X, DVec2::Y]);
    }

    #[test]
    fn test_circle_axes_skip_coincident_vertex() {
        let c = [Point::ZERO];
        let other = [Point::ZERO];
        assert!(Narrowphase::axes(&Hull::new(&c, 1.0), &Hull::new(&other, 1.0)).is_empty());
    }

    // --- SAT ----------------------------------------------------------------

    #[test]
    fn test_sat_separate_overlap_enclosed() {
        let small = square(0.0, 0.0, 5.0);
        let big = square(100.0, 100.0, 10.0);
        let (a, b) = (Hull::new(&small, 0.0), Hull::new(&big, 0.0));
        assert_eq!(Narrowphase::separating_axis(&a, &b), SatState::Separate);

        let small = square(90.0, 90.0, 5.0);
        let a = Hull::new(&small, 0.0);
        assert_eq!(Narrowphase::separating_axis(&a, &b), SatState::Overlapping);

        let small = square(100.0, 100.0, 5.0);
        let a = Hull::new(&small, 0.0);
        assert_eq!(Narrowphase::separating_axis(&a, &b), SatState::Enclosed);
        assert_eq!(Narrowphase::separating_axis(&b, &a), SatState::Enclosed);
    }

    #[test]
    fn test_sat_touching_edges_overlap() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(2.0, 0.0, 1.0);
        let r = Narrowphase::separating_axis(&Hull::new(&a, 0.0), &Hull::new(&b, 0.0));
        assert_eq!(r, SatState::Overlapping);
    }

    #[test]
    fn test_sat_needs_both_shapes_axes() {
        // diamond beside a square: only the diamond's own edges separate them
        let sq = square(0.0, 0.0, 1.0);
        let diamond = [
            Point::new(3.5, 1.9),
            Point::new(2.0, 3.4),
            Point::new(0.5, 1.9),
            Point::new(2.0, 0.4),
        ];
        let (a, b) = (Hull::new(&sq, 0.0), Hull::new(&diamond, 0.0));
        assert_eq!(Narrowphase::separating_axis(&a, &b), SatState::Separate);
        assert_eq!(Narrowphase::separating_axis(&b, &a), SatState::Separate);
    }

    #[test]
    fn test_sat_circle_against_square_corner() {
        let sq = square(0.0, 0.0, 1.0);
        // about 1.27 from the corner along the diagonal, inside both axis-aligned bands
        let c = [Point::new(1.0 + 0.9, 1.0 + 0.9)];
        let (a, b) = (Hull::new(&c, 1.0), Hull::new(&sq, 0.0));
        assert_eq!(Narrowphase::separating_axis(&a, &b), SatState::Separate);

        let c = [Point::new(1.5, 1.5)];
        let a = Hull::new(&c, 1.0);
        assert_eq!(Narrowphase::separating_axis(&a, &b), SatState::Overlapping);
    }

    #[test]
    fn test_sat_square_enclosed_in_circle_only_when_corners_fit() {
        let sq = square(0.0, 0.0, 1.0);
        let c = [Point::ZERO];
        let fits = Narrowphase::separating_axis(&Hull::new(&c, 1.5), &Hull::new(&sq, 0.0));
        assert_eq!(fits, SatState::Enclosed);
        // radius 1.2 covers the edge midpoints but not the corners (~1.414)
        let pokes = Narrowphase::separating_axis(&Hull::new(&c, 1.2), &Hull::new(&sq, 0.0));
        assert_eq!(pokes, SatState::Overlapping);
    }

    #[test]
    fn test_rotated_square_corners_poke_out() {
        let cfg = ShapeConfig::default();
        let outer = Shape::rectangle(20.0, 20.0, cfg).unwrap();
        let mut inner = Shape::rectangle(16.0, 16.0, cfg).unwrap();
        assert_eq!(Narrowphase::classify(&inner, &outer), Some(SatState::Enclosed));
        // half-diagonal 11.3 reaches past the outer half-width of 10
        inner.set_angle(45.0);
        assert_eq!(Narrowphase::classify(&inner, &outer), Some(SatState::Overlapping));
        assert_eq!(Narrowphase::classify(&outer, &inner), Some(SatState::Overlapping));

        let mut small = Shape::rectangle(10.0, 10.0, cfg).unwrap();
        small.set_angle(45.0);
        assert_eq!(Narrowphase::classify(&small, &outer), Some(SatState::Enclosed));
        small.set_position(Point::new(20.0, 0.0));
        // corner at x = 20 - 7.07 clears the outer edge at x = 10
        assert_eq!(Narrowphase::classify(&small, &outer), Some(SatState::Separate));
    }

    #[test]
    fn test_circle_circle_bands() {
        let o = Point::ZERO;
        assert_eq!(Narrowphase::circle_circle(o, 10.0, Point::new(100.0, 100.0), 20.0), SatState::Separate);
        assert_eq!(Narrowphase::circle_circle(Point::new(85.0, 85.0), 10.0, Point::new(100.0, 100.0), 20.0), SatState::Overlapping);
        assert_eq!(Narrowphase::circle_circle(o, 10.0, o, 20.0), SatState::Enclosed);
        // tangent from outside and from inside both collide
        assert_eq!(Narrowphase::circle_circle(o, 1.0, Point::new(2.0, 0.0), 1.0), SatState::Overlapping);
        assert_eq!(Narrowphase::circle_circle(o, 1.0, Point::new(1.0, 0.0), 2.0), SatState::Overlapping);
    }

    // --- Shape dispatch -----------------------------------------------------

    #[test]
    fn test_classify_dispatch() {
        let cfg = ShapeConfig::default();
        let mut c = Shape::circle(1.0, cfg).unwrap();
        let r = Shape::rectangle(2.0, 2.0, cfg).unwrap();
        let none = Shape::new(ShapeKind::None, cfg).unwrap();
        // inscribed circle touches every side but stays within
        assert_eq!(Narrowphase::classify(&c, &r), Some(SatState::Enclosed));
        c.set_position(Point::new(1.5, 0.0));
        assert_eq!(Narrowphase::classify(&c, &r), Some(SatState::Overlapping));
        assert_eq!(Narrowphase::classify(&c, &none), None);
        assert_eq!(Narrowphase::classify(&none, &r), None);
        c.set_position(Point::new(10.0, 0.0));
        assert_eq!(Narrowphase::classify(&r, &c), Some(SatState::Separate));
    }

    #[test]
    fn test_classify_uses_scaled_radius() {
        let cfg = ShapeConfig::default();
        let mut a = Shape::circle(1.0, cfg).unwrap();
        let mut b = Shape::circle(1.0, cfg).unwrap();
        b.set_position(Point::new(3.0, 0.0));
        assert_eq!(Narrowphase::classify(&a, &b), Some(SatState::Separate));
        a.set_scale(DVec2::new(1.0, 2.0));
        assert_eq!(Narrowphase::classify(&a, &b), Some(SatState::Overlapping));
    }

    #[test]
    fn test_polygon_contains_rotated_vertex_row() {
        // diamond: the ray from a point level with the right vertex passes through it
        let diamond = [
            Point::new(2.0, 0.0),
            Point::new(0.0, 2.0),
            Point::new(-2.0, 0.0),
            Point::new(0.0, -2.0),
        ];
        assert!(polygon_contains(&diamond, Point::new(1.0, 0.0)));
        assert!(polygon_contains(&diamond, Point::new(0.5, 0.5)));
        assert!(!polygon_contains(&diamond, Point::new(-3.0, 0.0)));
        assert!(!polygon_contains(&diamond, Point::new(1.5, 1.5)));
    }

    #[test]
    fn test_polygon_contains_degenerate_ring() {
        let pair = [Point::ZERO, Point::new(1.0, 0.0)];
        assert!(!polygon_contains(&pair, Point::new(0.5, 0.0)));
    }

    #[test]
    fn test_polygon_boundary_is_inclusive() {
        let sq = square(100.0, 100.0, 5.0);
        assert!(polygon_contains(&sq, Point::new(100.0, 95.0)));
        assert!(polygon_contains(&sq, Point::new(105.0, 105.0)));
        assert!(!polygon_contains(&sq, Point::new(80.0, 95.0)));
    }
}
