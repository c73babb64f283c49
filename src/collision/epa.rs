//! Expanding polytope refinement of a GJK simplex into a penetration normal
//! and depth.

use tracing::warn;

use super::gjk::{minkowski_support, Simplex};
use crate::math::{Vec2, EPSILON};
use crate::shapes::polygon::{outward_normal, signed_area};
use crate::shapes::{Geometry, Shape};

pub const DEFAULT_MAX_ITERATIONS: usize = 64;
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Minimum translation separating two overlapping shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetration {
    /// Unit normal pointing from A towards B.
    pub normal: Vec2,
    pub depth: f64,
}

/// Refines `simplex` (from [`super::gjk::intersect`]) into a penetration.
///
/// Simplices with fewer than three points mean the origin sits on a vertex or
/// edge of the Minkowski difference; they are widened before expanding, or
/// resolved as a zero-depth touch when the difference itself is flat.
pub fn penetration(
    a: &Shape,
    b: &Shape,
    simplex: &Simplex,
    max_iterations: usize,
    tolerance: f64,
) -> Penetration {
    let fallback_normal = {
        let n = (b.center() - a.center()).normalize();
        if n == Vec2::ZERO {
            Vec2::UP
        } else {
            n
        }
    };

    let mut polytope = match simplex.points() {
        [a_pt, b_pt] => match widen_segment(a, b, *a_pt, *b_pt) {
            Some(points) => points,
            None => {
                let mut normal = (*b_pt - *a_pt).perpendicular().normalize();
                if normal == Vec2::ZERO {
                    normal = fallback_normal;
                } else if normal.dot(fallback_normal) < 0.0 {
                    normal = -normal;
                }
                return Penetration { normal, depth: 0.0 };
            }
        },
        points if points.len() >= 3 => points.to_vec(),
        _ => return Penetration { normal: fallback_normal, depth: 0.0 },
    };

    if signed_area(&polytope) < 0.0 {
        polytope.reverse();
    }

    let mut best = Penetration { normal: fallback_normal, depth: 0.0 };
    for _ in 0..max_iterations {
        let Some((index, normal, distance)) = closest_edge(&polytope) else {
            return best;
        };
        best = Penetration { normal, depth: distance.max(0.0) };

        let support = minkowski_support(a, b, normal);
        if support.dot(normal) - distance < tolerance {
            return best;
        }
        polytope.insert(index + 1, support);
    }

    warn!(max_iterations, depth = best.depth, "EPA did not converge; using closest edge so far");
    best
}

/// Turns a two-point simplex into a polygon around it by probing both sides of
/// the segment. Returns `None` if the Minkowski difference is flat.
fn widen_segment(a: &Shape, b: &Shape, p: Vec2, q: Vec2) -> Option<Vec<Vec2>> {
    let side = (q - p).perpendicular().normalize();
    if side == Vec2::ZERO {
        return None;
    }
    let left = minkowski_support(a, b, side);
    let right = minkowski_support(a, b, -side);

    let mut points = vec![p];
    if (right - p).dot(-side) > EPSILON {
        points.push(right);
    }
    points.push(q);
    if (left - p).dot(side) > EPSILON {
        points.push(left);
    }
    (points.len() >= 3).then_some(points)
}

/// Edge of a counter-clockwise polytope nearest the origin, as
/// `(start index, outward normal, distance)`.
fn closest_edge(polytope: &[Vec2]) -> Option<(usize, Vec2, f64)> {
    let n = polytope.len();
    let mut best: Option<(usize, Vec2, f64)> = None;
    for i in 0..n {
        let start = polytope[i];
        let end = polytope[(i + 1) % n];
        if start.distance_squared(end) < EPSILON * EPSILON {
            continue;
        }
        let normal = outward_normal(start, end);
        let distance = normal.dot(start);
        if best.map_or(true, |(_, _, d)| distance < d) {
            best = Some((i, normal, distance));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::gjk;
    use crate::shapes::{Circle, LineSegment, Polygon, Rectangle};

    fn run(a: &Shape, b: &Shape) -> Penetration {
        let simplex = gjk::intersect(a, b, gjk::DEFAULT_MAX_ITERATIONS).unwrap();
        penetration(a, b, &simplex, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE)
    }

    #[test]
    fn test_epa_boxes() {
        let a = Shape::Polygon(Polygon::rectangle(Vec2::ZERO, Vec2::new(2.0, 2.0)).unwrap());
        let b = Shape::Polygon(Polygon::rectangle(Vec2::new(1.5, 0.5), Vec2::new(2.0, 2.0)).unwrap());
        let p = run(&a, &b);
        assert!(p.normal.approx_eq(Vec2::new(1.0, 0.0), 1e-9));
        assert!((p.depth - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_epa_circles_converge_to_analytic_depth() {
        let a = Shape::Circle(Circle::new(Vec2::ZERO, 1.0).unwrap());
        let b = Shape::Circle(Circle::new(Vec2::new(0.0, 1.5), 1.0).unwrap());
        let p = run(&a, &b);
        assert!(p.normal.approx_eq(Vec2::new(0.0, 1.0), 1e-3));
        assert!((p.depth - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_epa_touching_boxes_have_zero_depth() {
        let a = Shape::Rectangle(Rectangle::new(Vec2::ZERO, Vec2::new(2.0, 2.0), 0.0).unwrap());
        let b = Shape::Rectangle(Rectangle::new(Vec2::new(2.0, 0.0), Vec2::new(2.0, 2.0), 0.0).unwrap());
        let p = run(&a, &b);
        assert!(p.depth.abs() < 1e-9);
        assert!(p.normal.approx_eq(Vec2::new(1.0, 0.0), 1e-9));
    }

    #[test]
    fn test_epa_flat_difference_falls_back_to_segment_normal() {
        let a = Shape::Segment(LineSegment::new(Vec2::ZERO, Vec2::new(2.0, 0.0)).unwrap());
        let b = Shape::Segment(LineSegment::new(Vec2::new(1.0, 0.0), Vec2::new(3.0, 0.0)).unwrap());
        let simplex = gjk::intersect(&a, &b, gjk::DEFAULT_MAX_ITERATIONS).unwrap();
        let p = penetration(&a, &b, &simplex, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE);
        assert_eq!(p.depth, 0.0);
        assert!((p.normal.magnitude() - 1.0).abs() < 1e-9);
    }
}
