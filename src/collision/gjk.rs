//! GJK (Gilbert-Johnson-Keerthi) overlap test for convex shapes.
//!
//! Works on the Minkowski difference `A - B`: the shapes overlap exactly when
//! that set contains the origin. Only support points are needed, so every
//! shape kind goes through the same code path.

use tracing::warn;

use crate::math::{Vec2, EPSILON};
use crate::shapes::{Geometry, Shape};

pub const DEFAULT_MAX_ITERATIONS: usize = 32;

/// Simplex left behind by a successful GJK run. Holds one to three points of
/// the Minkowski difference, newest last.
#[derive(Debug, Clone, PartialEq)]
pub struct Simplex {
    points: Vec<Vec2>,
}

impl Simplex {
    fn new() -> Self {
        Self { points: Vec::with_capacity(3) }
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn push(&mut self, point: Vec2) {
        self.points.push(point);
    }

    fn contains(&self, point: Vec2) -> bool {
        self.points.iter().any(|p| p.approx_eq(point, EPSILON * EPSILON))
    }

    /// Reduces the simplex to the feature nearest the origin and picks the next
    /// search direction. Returns true once the origin is enclosed or lies on
    /// the simplex.
    fn evolve(&mut self, dir: &mut Vec2) -> bool {
        match self.points.len() {
            2 => self.line_case(dir),
            3 => self.triangle_case(dir),
            _ => false,
        }
    }

    fn line_case(&mut self, dir: &mut Vec2) -> bool {
        let a = self.points[1];
        let b = self.points[0];
        let ab = b - a;
        let ao = -a;

        if ab.dot(ao) > 0.0 {
            let towards = Vec2::triple_product(ab, ao, ab);
            if towards.magnitude_squared() < EPSILON * EPSILON {
                // Origin is on the segment: touching.
                return true;
            }
            *dir = towards;
        } else {
            self.points = vec![a];
            *dir = ao;
        }
        false
    }

    fn triangle_case(&mut self, dir: &mut Vec2) -> bool {
        let a = self.points[2];
        let b = self.points[1];
        let c = self.points[0];
        let ab = b - a;
        let ac = c - a;
        let ao = -a;

        if ab.cross(ac).abs() < EPSILON * EPSILON {
            // Flat triangle; keep the newest edge.
            self.points = vec![b, a];
            return self.line_case(dir);
        }

        let ab_perp = Vec2::triple_product(ac, ab, ab);
        if ab_perp.dot(ao) > 0.0 {
            self.points = vec![b, a];
            *dir = ab_perp;
            return false;
        }
        let ac_perp = Vec2::triple_product(ab, ac, ac);
        if ac_perp.dot(ao) > 0.0 {
            self.points = vec![c, a];
            *dir = ac_perp;
            return false;
        }
        true
    }
}

/// Support point of the Minkowski difference `a - b` along `direction`.
pub(crate) fn minkowski_support(a: &Shape, b: &Shape, direction: Vec2) -> Vec2 {
    a.support(direction) - b.support(-direction)
}

/// Runs GJK. Returns the enclosing simplex when the shapes overlap or touch,
/// `None` when they are separated or the search fails to converge.
pub fn intersect(a: &Shape, b: &Shape, max_iterations: usize) -> Option<Simplex> {
    let mut dir = b.center() - a.center();
    if dir.magnitude_squared() < EPSILON * EPSILON {
        dir = Vec2::RIGHT;
    }

    let mut simplex = Simplex::new();
    let first = minkowski_support(a, b, dir);
    simplex.push(first);
    dir = -first;

    for _ in 0..max_iterations {
        if dir.magnitude_squared() < EPSILON * EPSILON {
            // The last support point is the origin itself.
            return Some(simplex);
        }

        let point = minkowski_support(a, b, dir);
        let progress = point.dot(dir);
        if progress < 0.0 {
            return None;
        }
        if simplex.contains(point) {
            // No further progress: the origin sits on the boundary when the
            // best support only reaches it.
            return if progress <= EPSILON * dir.magnitude() { Some(simplex) } else { None };
        }

        simplex.push(point);
        if simplex.evolve(&mut dir) {
            return Some(simplex);
        }
    }

    warn!(max_iterations, "GJK did not converge; treating pair as separated");
    None
}
