use crate::collision::raycast::within_limit;
use crate::collision::{Ray, RaycastHit, AABB};
use crate::error::ShapeError;
use crate::math::{Vec2, EPSILON};

use super::Geometry;

const NEAREST_POINT_ITERATIONS: usize = 4;

/// An ellipse with semi-axes `half_extents`, rotated by `angle` about `center`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    pub center: Vec2,
    pub half_extents: Vec2,
    pub angle: f64,
}

impl Ellipse {
    pub fn new(center: Vec2, half_extents: Vec2, angle: f64) -> Result<Self, ShapeError> {
        if !center.is_finite() || !angle.is_finite() {
            return Err(ShapeError::NonFinite);
        }
        if !half_extents.is_finite() || half_extents.x <= 0.0 || half_extents.y <= 0.0 {
            return Err(ShapeError::InvalidExtents(half_extents.x, half_extents.y));
        }
        Ok(Self { center, half_extents, angle })
    }

    fn to_local(&self, point: Vec2) -> Vec2 {
        (point - self.center).rotate(-self.angle)
    }

    fn to_world(&self, local: Vec2) -> Vec2 {
        local.rotate(self.angle) + self.center
    }
}

impl Geometry for Ellipse {
    fn center(&self) -> Vec2 {
        self.center
    }

    fn bounding_box(&self) -> AABB {
        let (a, b) = (self.half_extents.x, self.half_extents.y);
        let (sin, cos) = self.angle.sin_cos();
        let ex = (a * a * cos * cos + b * b * sin * sin).sqrt();
        let ey = (a * a * sin * sin + b * b * cos * cos).sqrt();
        AABB::from_center(self.center, Vec2::new(ex, ey))
    }

    fn support(&self, direction: Vec2) -> Vec2 {
        let d = direction.rotate(-self.angle);
        let (a, b) = (self.half_extents.x, self.half_extents.y);
        let denom = (a * a * d.x * d.x + b * b * d.y * d.y).sqrt();
        if denom < EPSILON {
            return self.center;
        }
        self.to_world(Vec2::new(a * a * d.x, b * b * d.y) / denom)
    }

    fn contains_point(&self, point: Vec2) -> bool {
        let p = self.to_local(point);
        let (a, b) = (self.half_extents.x, self.half_extents.y);
        (p.x / a).powi(2) + (p.y / b).powi(2) <= 1.0 + EPSILON
    }

    fn nearest_point(&self, point: Vec2) -> Vec2 {
        if self.contains_point(point) {
            return point;
        }
        let p = self.to_local(point);
        let (a, b) = (self.half_extents.x, self.half_extents.y);
        let (px, py) = (p.x.abs(), p.y.abs());
        let (mut tx, mut ty) = (std::f64::consts::FRAC_1_SQRT_2, std::f64::consts::FRAC_1_SQRT_2);

        // Evolute iteration: walk the parametric angle toward the foot of the normal.
        for _ in 0..NEAREST_POINT_ITERATIONS {
            let (x, y) = (a * tx, b * ty);
            let ex = (a * a - b * b) * tx.powi(3) / a;
            let ey = (b * b - a * a) * ty.powi(3) / b;
            let (rx, ry) = (x - ex, y - ey);
            let (qx, qy) = (px - ex, py - ey);
            let r = rx.hypot(ry);
            let q = qx.hypot(qy);
            if q < EPSILON {
                break;
            }
            tx = ((qx * r / q + ex) / a).clamp(0.0, 1.0);
            ty = ((qy * r / q + ey) / b).clamp(0.0, 1.0);
            let t = tx.hypot(ty);
            tx /= t;
            ty /= t;
        }
        self.to_world(Vec2::new((a * tx).copysign(p.x), (b * ty).copysign(p.y)))
    }

    fn raycast(&self, ray: &Ray, limit: f64) -> Option<RaycastHit> {
        let (a, b) = (self.half_extents.x, self.half_extents.y);
        let origin = self.to_local(ray.origin);
        let dir = ray.direction.rotate(-self.angle);
        // Scale into the unit circle; `t` stays a world distance because `dir` is unit length.
        let o = Vec2::new(origin.x / a, origin.y / b);
        let d = Vec2::new(dir.x / a, dir.y / b);
        let qa = d.dot(d);
        let qb = o.dot(d);
        let qc = o.dot(o) - 1.0;
        if qc < 0.0 || (qc > 0.0 && qb > 0.0) {
            return None;
        }
        let discriminant = qb * qb - qa * qc;
        if discriminant < 0.0 {
            return None;
        }
        let t = ((-qb - discriminant.sqrt()) / qa).max(0.0);
        if !within_limit(t, limit) {
            return None;
        }
        let local_hit = origin + dir * t;
        let normal = Vec2::new(local_hit.x / (a * a), local_hit.y / (b * b)).rotate(self.angle);
        Some(RaycastHit::new(ray.point_at(t), normal, t))
    }

    fn area(&self) -> f64 {
        std::f64::consts::PI * self.half_extents.x * self.half_extents.y
    }

    fn angular_mass(&self, mass: f64) -> f64 {
        mass * self.half_extents.magnitude_squared() / 4.0 + mass * self.center.magnitude_squared()
    }
}
