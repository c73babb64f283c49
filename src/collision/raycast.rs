//! Ray queries against single shapes.
//!
//! Rays are independent of the step pipeline: they read geometry and never
//! touch bodies, so they can be issued at any time.

use crate::error::PhysicsError;
use crate::math::{Vec2, EPSILON};
use crate::shapes::{Geometry, Shape};

/// A half-line starting at `origin` and travelling along the unit `direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec2,
    pub direction: Vec2,
}

impl Ray {
    /// Builds a ray, normalizing `direction`. A zero-length direction is rejected.
    pub fn new(origin: Vec2, direction: Vec2) -> Result<Self, PhysicsError> {
        let direction = direction.normalize();
        if direction == Vec2::ZERO {
            return Err(PhysicsError::DegenerateRay);
        }
        Ok(Self { origin, direction })
    }

    /// Point reached after travelling `distance` units along the ray.
    pub fn point_at(&self, distance: f64) -> Vec2 {
        self.origin + self.direction * distance
    }
}

/// Nearest intersection of a ray with a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// World-space point where the ray enters the shape.
    pub contact: Vec2,
    /// Outward unit normal of the shape at `contact`.
    pub normal: Vec2,
    /// Distance travelled along the ray to reach `contact`.
    pub distance: f64,
}

impl RaycastHit {
    pub(crate) fn new(contact: Vec2, normal: Vec2, distance: f64) -> Self {
        Self { contact, normal: normal.normalize(), distance }
    }
}

/// Casts `ray` against `shape`. A `limit` of zero or less means the ray is unbounded.
pub fn raycast(ray: &Ray, shape: &Shape, limit: f64) -> Option<RaycastHit> {
    shape.raycast(ray, limit)
}

/// True when `distance` is within the optional limit.
pub(crate) fn within_limit(distance: f64, limit: f64) -> bool {
    limit <= 0.0 || distance <= limit
}

/// Intersects a ray with the segment `start..end`.
///
/// Returns the distance along the ray and the segment parameter in [0, 1].
/// Parallel rays never hit.
pub(crate) fn ray_segment(ray: &Ray, start: Vec2, end: Vec2) -> Option<(f64, f64)> {
    let edge = end - start;
    let denom = ray.direction.cross(edge);
    if denom.abs() < EPSILON {
        return None;
    }
    let w = start - ray.origin;
    let t = w.cross(edge) / denom;
    let s = w.cross(ray.direction) / denom;
    if t >= 0.0 && (-EPSILON..=1.0 + EPSILON).contains(&s) {
        Some((t, s.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// Casts against the boundary of a convex counter-clockwise polygon.
pub(crate) fn ray_polygon(ray: &Ray, vertices: &[Vec2], limit: f64) -> Option<RaycastHit> {
    let n = vertices.len();
    let mut best: Option<(f64, Vec2)> = None;
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        if let Some((t, _)) = ray_segment(ray, a, b) {
            if best.map_or(true, |(bt, _)| t < bt) {
                let edge = b - a;
                best = Some((t, Vec2::new(edge.y, -edge.x)));
            }
        }
    }
    let (t, normal) = best?;
    if !within_limit(t, limit) {
        return None;
    }
    Some(RaycastHit::new(ray.point_at(t), normal, t))
}
