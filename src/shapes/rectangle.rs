use crate::collision::raycast::ray_polygon;
use crate::collision::{Ray, RaycastHit, AABB};
use crate::error::ShapeError;
use crate::math::{Vec2, EPSILON};

use super::polygon::{support_of, Polygon};
use super::Geometry;

/// An oriented box. `angle` is the rotation about `center` in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    pub center: Vec2,
    pub size: Vec2,
    pub angle: f64,
}

impl Rectangle {
    pub fn new(center: Vec2, size: Vec2, angle: f64) -> Result<Self, ShapeError> {
        if !center.is_finite() || !angle.is_finite() {
            return Err(ShapeError::NonFinite);
        }
        if !size.is_finite() || size.x <= 0.0 || size.y <= 0.0 {
            return Err(ShapeError::InvalidExtents(size.x, size.y));
        }
        Ok(Self { center, size, angle })
    }

    pub fn half_extents(&self) -> Vec2 {
        self.size * 0.5
    }

    /// True when the edges line up with the world axes (any multiple of 90 degrees).
    pub fn is_axis_aligned(&self) -> bool {
        (2.0 * self.angle).sin().abs() < EPSILON
    }

    /// Corners in counter-clockwise order, starting bottom-left in local space.
    pub fn vertices(&self) -> [Vec2; 4] {
        let h = self.half_extents();
        [
            Vec2::new(-h.x, -h.y),
            Vec2::new(h.x, -h.y),
            Vec2::new(h.x, h.y),
            Vec2::new(-h.x, h.y),
        ]
        .map(|corner| corner.rotate(self.angle) + self.center)
    }

    pub fn to_polygon(&self) -> Polygon {
        Polygon::from_mapped(self.vertices().to_vec())
    }

    fn to_local(&self, point: Vec2) -> Vec2 {
        (point - self.center).rotate(-self.angle)
    }
}

impl Geometry for Rectangle {
    fn center(&self) -> Vec2 {
        self.center
    }

    fn bounding_box(&self) -> AABB {
        AABB::from_points(&self.vertices()).unwrap_or_else(|| AABB::from_center(self.center, self.half_extents()))
    }

    fn support(&self, direction: Vec2) -> Vec2 {
        support_of(&self.vertices(), direction)
    }

    fn contains_point(&self, point: Vec2) -> bool {
        let local = self.to_local(point);
        let h = self.half_extents();
        local.x.abs() <= h.x + EPSILON && local.y.abs() <= h.y + EPSILON
    }

    fn nearest_point(&self, point: Vec2) -> Vec2 {
        if self.contains_point(point) {
            return point;
        }
        let local = self.to_local(point);
        let h = self.half_extents();
        let clamped = Vec2::new(local.x.clamp(-h.x, h.x), local.y.clamp(-h.y, h.y));
        clamped.rotate(self.angle) + self.center
    }

    fn raycast(&self, ray: &Ray, limit: f64) -> Option<RaycastHit> {
        let local = self.to_local(ray.origin);
        let h = self.half_extents();
        if local.x.abs() < h.x - EPSILON && local.y.abs() < h.y - EPSILON {
            return None;
        }
        ray_polygon(ray, &self.vertices(), limit)
    }

    fn area(&self) -> f64 {
        self.size.x * self.size.y
    }

    fn angular_mass(&self, mass: f64) -> f64 {
        mass * self.size.magnitude_squared() / 12.0 + mass * self.center.magnitude_squared()
    }
}
