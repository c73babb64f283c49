use crate::collision::raycast::within_limit;
use crate::collision::{Ray, RaycastHit, AABB};
use crate::error::ShapeError;
use crate::math::Vec2;

use super::Geometry;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Vec2, radius: f64) -> Result<Self, ShapeError> {
        if !center.is_finite() {
            return Err(ShapeError::NonFinite);
        }
        if !radius.is_finite() || radius < 0.0 {
            return Err(ShapeError::InvalidRadius(radius));
        }
        Ok(Self { center, radius })
    }
}

impl Geometry for Circle {
    fn center(&self) -> Vec2 {
        self.center
    }

    fn bounding_box(&self) -> AABB {
        AABB::from_center(self.center, Vec2::new(self.radius, self.radius))
    }

    fn support(&self, direction: Vec2) -> Vec2 {
        self.center + direction.normalize() * self.radius
    }

    fn contains_point(&self, point: Vec2) -> bool {
        point.distance_squared(self.center) <= self.radius * self.radius
    }

    fn nearest_point(&self, point: Vec2) -> Vec2 {
        if self.contains_point(point) {
            return point;
        }
        self.center + (point - self.center).normalize() * self.radius
    }

    fn raycast(&self, ray: &Ray, limit: f64) -> Option<RaycastHit> {
        let offset = ray.origin - self.center;
        let b = offset.dot(ray.direction);
        let c = offset.magnitude_squared() - self.radius * self.radius;
        // Starting inside, or outside and pointing away.
        if c < 0.0 || (c > 0.0 && b > 0.0) {
            return None;
        }
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let t = (-b - discriminant.sqrt()).max(0.0);
        if !within_limit(t, limit) {
            return None;
        }
        let contact = ray.point_at(t);
        Some(RaycastHit::new(contact, contact - self.center, t))
    }

    fn area(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius
    }

    fn angular_mass(&self, mass: f64) -> f64 {
        0.5 * mass * self.radius * self.radius + mass * self.center.magnitude_squared()
    }
}
