use crate::collision::raycast::{ray_segment, within_limit};
use crate::collision::{Ray, RaycastHit, AABB};
use crate::error::ShapeError;
use crate::math::{in_range, Vec2, EPSILON};

use super::Geometry;

/// A line segment (edge) between `start` and `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub start: Vec2,
    pub end: Vec2,
}

impl LineSegment {
    pub fn new(start: Vec2, end: Vec2) -> Result<Self, ShapeError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(ShapeError::NonFinite);
        }
        if start.distance_squared(end) < EPSILON * EPSILON {
            return Err(ShapeError::DegenerateSegment);
        }
        Ok(Self { start, end })
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    pub fn length_squared(&self) -> f64 {
        self.start.distance_squared(self.end)
    }

    /// Direction vector from `start` to `end`.
    pub fn direction(&self) -> Vec2 {
        self.end - self.start
    }

    /// Unit normal to the left of the direction vector.
    pub fn unit_normal(&self) -> Vec2 {
        self.direction().perpendicular().normalize()
    }

    /// Closest point on the segment to `point`, with its parameter in [0, 1].
    pub fn closest_point(&self, point: Vec2) -> (Vec2, f64) {
        closest_point_on_segment(self.start, self.end, point)
    }

    /// Finds where two segments meet.
    ///
    /// Crossing segments report their unique intersection point. Parallel
    /// segments (cross product within tolerance) report an endpoint of one that
    /// lies on the other, if any.
    pub fn intersection(&self, other: &LineSegment) -> Option<Vec2> {
        let len1 = self.length();
        let len2 = other.length();
        let dir1 = self.direction() / len1;
        let dir2 = other.direction() / len2;
        let cross = dir1.cross(dir2);

        if cross.abs() < EPSILON {
            return [other.start, other.end]
                .into_iter()
                .find(|p| self.contains_point(*p))
                .or_else(|| [self.start, self.end].into_iter().find(|p| other.contains_point(*p)));
        }

        let diff_starts = other.start - self.start;
        let dist1 = diff_starts.cross(dir2) / cross;
        let dist2 = diff_starts.cross(dir1) / cross;
        if in_range(dist1, 0.0, len1) && in_range(dist2, 0.0, len2) {
            Some(self.start + dir1 * dist1)
        } else {
            None
        }
    }
}

/// Finds the point on `a..b` closest to `point`, and the clamped parameter along it.
pub(crate) fn closest_point_on_segment(a: Vec2, b: Vec2, point: Vec2) -> (Vec2, f64) {
    let segment = b - a;
    let length_sq = segment.magnitude_squared();
    if length_sq < EPSILON * EPSILON {
        return (a, 0.0);
    }
    let t = ((point - a).dot(segment) / length_sq).clamp(0.0, 1.0);
    (a + segment * t, t)
}

impl Geometry for LineSegment {
    fn center(&self) -> Vec2 {
        self.start.lerp(self.end, 0.5)
    }

    fn bounding_box(&self) -> AABB {
        AABB::new(self.start, self.end)
    }

    fn support(&self, direction: Vec2) -> Vec2 {
        if self.start.dot(direction) >= self.end.dot(direction) {
            self.start
        } else {
            self.end
        }
    }

    fn contains_point(&self, point: Vec2) -> bool {
        let (closest, _) = self.closest_point(point);
        closest.distance_squared(point) <= EPSILON * EPSILON
    }

    fn nearest_point(&self, point: Vec2) -> Vec2 {
        self.closest_point(point).0
    }

    fn raycast(&self, ray: &Ray, limit: f64) -> Option<RaycastHit> {
        let (t, _) = ray_segment(ray, self.start, self.end)?;
        if !within_limit(t, limit) {
            return None;
        }
        let mut normal = self.unit_normal();
        if normal.dot(ray.direction) > 0.0 {
            normal = -normal;
        }
        Some(RaycastHit::new(ray.point_at(t), normal, t))
    }

    fn area(&self) -> f64 {
        0.0
    }

    fn angular_mass(&self, mass: f64) -> f64 {
        mass * self.length_squared() / 12.0 + mass * self.center().magnitude_squared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    const EPS: f64 = 1e-9;

    fn seg(ax: f64, ay: f64, bx: f64, by: f64) -> LineSegment {
        LineSegment::new(Vec2::new(ax, ay), Vec2::new(bx, by)).unwrap()
    }

    #[test]
    fn test_line_segment_rejects_zero_length() {
        let p = Vec2::new(1.0, 1.0);
        assert_eq!(LineSegment::new(p, p), Err(ShapeError::DegenerateSegment));
    }

    #[test]
    fn test_line_segment_length_and_direction() {
        let line = seg(1.0, 2.0, 4.0, 6.0);
        assert!((line.length() - 5.0).abs() < EPS);
        assert!((line.length_squared() - 25.0).abs() < EPS);
        assert_eq!(line.direction(), Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_unit_normal_is_left_of_direction() {
        assert!(seg(0.0, 0.0, 4.0, 0.0).unit_normal().approx_eq(Vec2::new(0.0, 1.0), EPS));
        assert!(seg(4.0, 0.0, 0.0, 0.0).unit_normal().approx_eq(Vec2::new(0.0, -1.0), EPS));
    }

    #[test]
    fn test_contains_point() {
        let e = seg(0.0, 0.0, 2.0, 2.0);
        assert!(e.contains_point(Vec2::new(1.0, 1.0)));
        assert!(e.contains_point(Vec2::new(2.0, 2.0)));
        assert!(!e.contains_point(Vec2::new(3.0, 3.0)));
        assert!(!e.contains_point(Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn test_closest_point_clamps_to_endpoints() {
        let e = seg(1.0, 0.0, 3.0, 0.0);
        let (p, t) = e.closest_point(Vec2::new(0.0, 1.0));
        assert_eq!(p, Vec2::new(1.0, 0.0));
        assert_eq!(t, 0.0);
        let (p, t) = e.closest_point(Vec2::new(2.0, 5.0));
        assert!(p.approx_eq(Vec2::new(2.0, 0.0), EPS));
        assert!((t - 0.5).abs() < EPS);
    }

    #[test]
    fn test_intersection_perpendicular() {
        let a = seg(0.0, 0.0, 10.0, 0.0);
        let b = seg(5.0, -5.0, 5.0, 5.0);
        let p = a.intersection(&b).unwrap();
        assert!(p.approx_eq(Vec2::new(5.0, 0.0), EPS));
        assert!(b.intersection(&a).unwrap().approx_eq(Vec2::new(5.0, 0.0), EPS));
    }

    #[test]
    fn test_intersection_t_shape_touches_endpoint() {
        let a = seg(0.0, 0.0, 2.0, 2.0);
        let b = seg(1.0, 1.0, -1.0, 3.0);
        assert!(a.intersection(&b).unwrap().approx_eq(Vec2::new(1.0, 1.0), EPS));
    }

    #[test]
    fn test_intersection_parallel() {
        let a = seg(0.0, 0.0, 2.0, 2.0);
        assert!(a.intersection(&seg(1.0, 1.0, 3.0, 3.0)).is_some());
        assert!(a.intersection(&seg(0.0, 1.0, 2.0, 3.0)).is_none());
    }

    #[test]
    fn test_intersection_miss_oblique() {
        let a = seg(0.0, 0.0, 4.0, 3.0);
        let b = seg(9.0, 1.0, 5.0, 4.0);
        assert!(a.intersection(&b).is_none());
    }
}
