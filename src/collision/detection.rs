//! Narrow phase: exact overlap tests and manifold generation.
//!
//! Simple pairs (circle-circle, axis-aligned box-box, segment-segment) have
//! dedicated tests. Every other combination goes through GJK, and only pairs
//! GJK confirms are refined with EPA and clipping.

use tracing::trace;

use super::manifold::Manifold;
use super::{clipping, epa, gjk};
use crate::math::{Vec2, EPSILON};
use crate::shapes::{Circle, Geometry, LineSegment, Rectangle, Shape, ShapeKind};

/// Fast path for one pair of shape kinds. `None` means the fast path does not
/// apply to these particular shapes and the general test must run.
type FastTest = fn(&Shape, &Shape) -> Option<bool>;

fn fast_test(kinds: (ShapeKind, ShapeKind)) -> Option<FastTest> {
    match kinds {
        (ShapeKind::Circle, ShapeKind::Circle) => Some(circles_overlap),
        (ShapeKind::Rectangle, ShapeKind::Rectangle) => Some(aligned_boxes_overlap),
        (ShapeKind::Segment, ShapeKind::Segment) => Some(segments_cross),
        _ => None,
    }
}

fn circles_overlap(a: &Shape, b: &Shape) -> Option<bool> {
    match (a, b) {
        (Shape::Circle(ca), Shape::Circle(cb)) => {
            let radii = ca.radius + cb.radius;
            Some(ca.center.distance_squared(cb.center) <= radii * radii)
        }
        _ => None,
    }
}

fn aligned_boxes_overlap(a: &Shape, b: &Shape) -> Option<bool> {
    match (a, b) {
        (Shape::Rectangle(ra), Shape::Rectangle(rb)) if ra.is_axis_aligned() && rb.is_axis_aligned() => {
            Some(ra.bounding_box().overlaps(&rb.bounding_box()))
        }
        _ => None,
    }
}

fn segments_cross(a: &Shape, b: &Shape) -> Option<bool> {
    match (a, b) {
        (Shape::Segment(sa), Shape::Segment(sb)) => Some(sa.intersection(sb).is_some()),
        _ => None,
    }
}

/// Narrow-phase settings shared by every test in a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NarrowPhase {
    pub gjk_max_iterations: usize,
    pub epa_max_iterations: usize,
    pub epa_tolerance: f64,
}

impl Default for NarrowPhase {
    fn default() -> Self {
        NarrowPhase {
            gjk_max_iterations: gjk::DEFAULT_MAX_ITERATIONS,
            epa_max_iterations: epa::DEFAULT_MAX_ITERATIONS,
            epa_tolerance: epa::DEFAULT_TOLERANCE,
        }
    }
}

impl NarrowPhase {
    /// Inclusive overlap test: touching shapes intersect.
    pub fn intersects(&self, a: &Shape, b: &Shape) -> bool {
        fast_test((a.kind(), b.kind()))
            .and_then(|test| test(a, b))
            .unwrap_or_else(|| gjk::intersect(a, b, self.gjk_max_iterations).is_some())
    }

    /// Builds the manifold for an overlapping pair, with the normal pointing
    /// from `a` to `b`. Returns `None` when the shapes do not touch.
    pub fn collide(&self, a: &Shape, b: &Shape) -> Option<Manifold> {
        let manifold = match (a, b) {
            (Shape::Circle(ca), Shape::Circle(cb)) => circle_circle(ca, cb),
            (Shape::Rectangle(ra), Shape::Rectangle(rb)) if ra.is_axis_aligned() && rb.is_axis_aligned() => {
                aligned_box_box(ra, rb)
            }
            (Shape::Segment(sa), Shape::Segment(sb)) => self.segment_segment(a, b, sa, sb),
            _ => self.convex(a, b),
        };
        if let Some(m) = &manifold {
            trace!(kind_a = ?a.kind(), kind_b = ?b.kind(), depth = m.depth, contacts = m.contacts.len(), "narrow phase hit");
        }
        manifold
    }

    fn convex(&self, a: &Shape, b: &Shape) -> Option<Manifold> {
        let simplex = gjk::intersect(a, b, self.gjk_max_iterations)?;
        let pen = epa::penetration(a, b, &simplex, self.epa_max_iterations, self.epa_tolerance);
        let contacts = clipping::contact_points(a, b, pen.normal);
        Some(Manifold::new(pen.normal, pen.depth, contacts))
    }

    fn segment_segment(&self, a: &Shape, b: &Shape, sa: &LineSegment, sb: &LineSegment) -> Option<Manifold> {
        let point = sa.intersection(sb)?;
        let pen = match gjk::intersect(a, b, self.gjk_max_iterations) {
            Some(simplex) => epa::penetration(a, b, &simplex, self.epa_max_iterations, self.epa_tolerance),
            None => {
                let mut normal = sb.unit_normal();
                if normal.dot(sb.center() - sa.center()) < 0.0 {
                    normal = -normal;
                }
                epa::Penetration { normal, depth: 0.0 }
            }
        };
        Some(Manifold::new(pen.normal, pen.depth, vec![point]))
    }
}

/// Inclusive overlap test with default settings.
pub fn intersects(a: &Shape, b: &Shape) -> bool {
    NarrowPhase::default().intersects(a, b)
}

/// Manifold for `a` against `b` with default settings.
pub fn collide(a: &Shape, b: &Shape) -> Option<Manifold> {
    NarrowPhase::default().collide(a, b)
}

fn circle_circle(a: &Circle, b: &Circle) -> Option<Manifold> {
    let offset = b.center - a.center;
    let dist_sq = offset.magnitude_squared();
    let radii = a.radius + b.radius;
    if dist_sq > radii * radii {
        return None;
    }
    let distance = dist_sq.sqrt();
    let normal = if distance > EPSILON {
        offset / distance
    } else {
        // Concentric: any direction separates them.
        Vec2::UP
    };
    let depth = radii - distance;
    let contact = a.center + normal * (a.radius - depth * 0.5);
    Some(Manifold::new(normal, depth, vec![contact]))
}

fn aligned_box_box(a: &Rectangle, b: &Rectangle) -> Option<Manifold> {
    let (ba, bb) = (a.bounding_box(), b.bounding_box());
    if !ba.overlaps(&bb) {
        return None;
    }
    let lo = ba.min.max(bb.min);
    let hi = ba.max.min(bb.max);
    let overlap = hi - lo;
    let offset = b.center - a.center;

    let (normal, depth, contacts) = if overlap.x < overlap.y {
        let sign = if offset.x < 0.0 { -1.0 } else { 1.0 };
        // Contacts lie on B's face that entered A.
        let x = if sign > 0.0 { bb.min.x } else { bb.max.x };
        (Vec2::new(sign, 0.0), overlap.x, [Vec2::new(x, lo.y), Vec2::new(x, hi.y)])
    } else {
        let sign = if offset.y < 0.0 { -1.0 } else { 1.0 };
        let y = if sign > 0.0 { bb.min.y } else { bb.max.y };
        (Vec2::new(0.0, sign), overlap.y, [Vec2::new(lo.x, y), Vec2::new(hi.x, y)])
    };

    let mut points = contacts.to_vec();
    if points[0].approx_eq(points[1], EPSILON) {
        points.pop();
    }
    Some(Manifold::new(normal, depth, points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Ellipse, Polygon};
    const EPS: f64 = 1e-9;

    fn circle(x: f64, y: f64, r: f64) -> Shape {
        Shape::Circle(Circle::new(Vec2::new(x, y), r).unwrap())
    }

    fn boxed(x: f64, y: f64, w: f64, h: f64, angle: f64) -> Shape {
        Shape::Rectangle(Rectangle::new(Vec2::new(x, y), Vec2::new(w, h), angle).unwrap())
    }

    fn seg(ax: f64, ay: f64, bx: f64, by: f64) -> Shape {
        Shape::Segment(LineSegment::new(Vec2::new(ax, ay), Vec2::new(bx, by)).unwrap())
    }

    fn translated(shape: &Shape, by: Vec2) -> Shape {
        shape.transformed(&crate::math::Transform::from_position(by))
    }

    #[test]
    fn test_dispatch_table_registers_fast_paths_only() {
        assert!(fast_test((ShapeKind::Circle, ShapeKind::Circle)).is_some());
        assert!(fast_test((ShapeKind::Rectangle, ShapeKind::Rectangle)).is_some());
        assert!(fast_test((ShapeKind::Segment, ShapeKind::Segment)).is_some());
        assert!(fast_test((ShapeKind::Circle, ShapeKind::Polygon)).is_none());
        assert!(fast_test((ShapeKind::Ellipse, ShapeKind::Ellipse)).is_none());
    }

    #[test]
    fn test_circle_circle_no_collision() {
        assert!(!intersects(&circle(0.0, 0.0, 1.0), &circle(3.0, 0.0, 1.0)));
        assert!(collide(&circle(0.0, 0.0, 1.0), &circle(3.0, 0.0, 1.0)).is_none());
    }

    #[test]
    fn test_circle_circle_touching_is_inclusive() {
        assert!(intersects(&circle(0.0, 0.0, 1.0), &circle(2.0, 0.0, 1.0)));
        let m = collide(&circle(0.0, 0.0, 1.0), &circle(2.0, 0.0, 1.0)).unwrap();
        assert!(m.depth.abs() < EPS);
    }

    #[test]
    fn test_circle_circle_colliding() {
        let m = collide(&circle(0.0, 0.0, 1.0), &circle(1.5, 0.0, 1.0)).unwrap();
        assert!(m.normal.approx_eq(Vec2::new(1.0, 0.0), EPS));
        assert!((m.depth - 0.5).abs() < EPS);
        assert_eq!(m.contacts.len(), 1);
        assert!(m.contacts[0].approx_eq(Vec2::new(0.75, 0.0), EPS));
    }

    #[test]
    fn test_circle_circle_concentric() {
        let m = collide(&circle(0.0, 0.0, 2.0), &circle(0.0, 0.0, 1.0)).unwrap();
        assert!((m.depth - 3.0).abs() < EPS);
        assert_eq!(m.normal, Vec2::UP);
    }

    #[test]
    fn test_aligned_boxes() {
        let a = boxed(0.0, 0.0, 2.0, 2.0, 0.0);
        assert!(intersects(&a, &boxed(2.0, 0.0, 2.0, 2.0, 0.0)));
        assert!(!intersects(&a, &boxed(2.1, 0.0, 2.0, 2.0, 0.0)));

        let m = collide(&a, &boxed(0.5, -1.5, 2.0, 2.0, 0.0)).unwrap();
        assert!(m.normal.approx_eq(Vec2::new(0.0, -1.0), EPS));
        assert!((m.depth - 0.5).abs() < EPS);
        assert_eq!(m.contacts.len(), 2);
        assert!(m.contacts.iter().all(|p| (p.y + 0.5).abs() < EPS));
    }

    #[test]
    fn test_rotated_boxes_fall_through_to_gjk() {
        let a = boxed(0.0, 0.0, 2.0, 2.0, std::f64::consts::FRAC_PI_4);
        let b = boxed(2.3, 1.3, 2.0, 2.0, 0.0);
        // Bounding boxes overlap but the corner (1.3, 0.3) is outside |x| + |y| <= sqrt(2).
        assert!(a.bounding_box().overlaps(&b.bounding_box()));
        assert!(!intersects(&a, &b));
        assert!(intersects(&a, &boxed(2.3, 0.0, 2.0, 2.0, std::f64::consts::FRAC_PI_4)));
    }

    #[test]
    fn test_segment_segment_crossing() {
        let a = seg(0.0, 0.0, 10.0, 0.0);
        let b = seg(5.0, -5.0, 5.0, 5.0);
        assert!(intersects(&a, &b));
        let m = collide(&a, &b).unwrap();
        assert!(m.contacts[0].approx_eq(Vec2::new(5.0, 0.0), EPS));
        assert!((m.normal.magnitude() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_segment_segment_parallel_apart() {
        assert!(!intersects(&seg(0.0, 0.0, 2.0, 0.0), &seg(0.0, 1.0, 2.0, 1.0)));
    }

    #[test]
    fn test_circle_against_box_uses_general_path() {
        let ball = circle(0.0, 0.8, 1.0);
        let floor = boxed(0.0, -0.5, 10.0, 1.0, 0.0);
        let m = collide(&ball, &floor).unwrap();
        assert!(m.normal.approx_eq(Vec2::new(0.0, -1.0), 1e-3));
        assert!((m.depth - 0.2).abs() < 1e-4);
        assert!(m.contacts[0].approx_eq(Vec2::new(0.0, -0.2), 1e-3));
    }

    #[test]
    fn test_polygon_against_ellipse() {
        let tri = Shape::Polygon(
            Polygon::new(vec![Vec2::new(-1.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)]).unwrap(),
        );
        let cap = Shape::Ellipse(Ellipse::new(Vec2::new(0.0, 1.5), Vec2::new(2.0, 0.6), 0.0).unwrap());
        let m = collide(&tri, &cap).unwrap();
        assert!(m.normal.y > 0.9);
        assert!((m.depth - 0.1).abs() < 1e-4);
    }

    #[test]
    fn test_manifold_translation_removes_overlap() {
        let pairs = [
            (circle(0.0, 0.0, 1.0), circle(1.2, 0.7, 1.0)),
            (boxed(0.0, 0.0, 2.0, 2.0, 0.0), boxed(1.4, 0.3, 2.0, 2.0, 0.0)),
            (boxed(0.0, 0.0, 2.0, 2.0, 0.4), boxed(1.5, 0.5, 2.0, 1.0, -0.2)),
            (circle(0.0, 1.0, 1.0), boxed(0.0, -0.4, 4.0, 2.0, 0.1)),
        ];
        for (a, b) in pairs.iter() {
            let m = collide(a, b).unwrap();
            let moved = translated(b, m.normal * (m.depth + 1e-3));
            assert!(!intersects(a, &moved), "pair still overlaps after separating: {m:?}");
        }
    }
}
