use crate::collision::raycast::ray_polygon;
use crate::collision::{Ray, RaycastHit, AABB};
use crate::error::ShapeError;
use crate::math::{Vec2, EPSILON};

use super::line_segment::closest_point_on_segment;
use super::Geometry;

/// A convex polygon defined by its vertices in local space.
/// Vertices are always stored counter-clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vec2>,
}

impl Polygon {
    /// Creates a polygon from at least three vertices.
    ///
    /// Clockwise input is reversed. Non-convex or zero-area input is rejected.
    pub fn new(mut vertices: Vec<Vec2>) -> Result<Self, ShapeError> {
        if vertices.len() < 3 {
            return Err(ShapeError::TooFewVertices(vertices.len()));
        }
        if vertices.iter().any(|v| !v.is_finite()) {
            return Err(ShapeError::NonFinite);
        }
        let area = signed_area(&vertices);
        if area.abs() < EPSILON {
            return Err(ShapeError::DegeneratePolygon);
        }
        if area < 0.0 {
            vertices.reverse();
        }
        let n = vertices.len();
        for i in 0..n {
            let a = vertices[i];
            let b = vertices[(i + 1) % n];
            let c = vertices[(i + 2) % n];
            if (b - a).cross(c - b) < -EPSILON {
                return Err(ShapeError::NonConvexPolygon);
            }
        }
        Ok(Self { vertices })
    }

    /// Axis-aligned box polygon centered at `center`.
    pub fn rectangle(center: Vec2, size: Vec2) -> Result<Self, ShapeError> {
        if !(size.x > 0.0 && size.y > 0.0) {
            return Err(ShapeError::InvalidExtents(size.x, size.y));
        }
        let h = size * 0.5;
        Self::new(vec![
            center + Vec2::new(-h.x, -h.y),
            center + Vec2::new(h.x, -h.y),
            center + Vec2::new(h.x, h.y),
            center + Vec2::new(-h.x, h.y),
        ])
    }

    /// Regular polygon with `sides` vertices on a circle of `radius`.
    pub fn regular(center: Vec2, sides: usize, radius: f64) -> Result<Self, ShapeError> {
        if sides < 3 {
            return Err(ShapeError::TooFewVertices(sides));
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(ShapeError::InvalidRadius(radius));
        }
        let step = std::f64::consts::TAU / sides as f64;
        let vertices = (0..sides)
            .map(|i| center + Vec2::new(radius, 0.0).rotate(step * i as f64))
            .collect();
        Self::new(vertices)
    }

    /// Rebuilds a polygon from mapped vertices of a valid one, fixing the winding
    /// if the mapping mirrored it.
    pub(crate) fn from_mapped(mut vertices: Vec<Vec2>) -> Self {
        if signed_area(&vertices) < 0.0 {
            vertices.reverse();
        }
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Centroid for uniform density.
    pub fn centroid(&self) -> Vec2 {
        let origin = self.vertices[0];
        let mut weighted = Vec2::ZERO;
        let mut total = 0.0;
        for pair in self.vertices[1..].windows(2) {
            let (v2, v3) = (pair[0], pair[1]);
            let tri_area = (v2 - origin).cross(v3 - origin) * 0.5;
            weighted += (origin + v2 + v3) / 3.0 * tri_area;
            total += tri_area;
        }
        if total.abs() < EPSILON {
            let sum = self.vertices.iter().fold(Vec2::ZERO, |acc, v| acc + *v);
            return sum / self.vertices.len() as f64;
        }
        weighted / total
    }

    /// Polar moment of area about the local origin (unit density).
    fn inertia_about_origin(&self) -> f64 {
        let n = self.vertices.len();
        let mut sum = 0.0;
        for i in 0..n {
            let v1 = self.vertices[i];
            let v2 = self.vertices[(i + 1) % n];
            sum += v1.cross(v2) * (v1.magnitude_squared() + v1.dot(v2) + v2.magnitude_squared());
        }
        sum / 12.0
    }

    /// Moment of inertia about the centroid for the given mass.
    pub fn inertia(&self, mass: f64) -> f64 {
        let area = self.area();
        if area < EPSILON {
            return 0.0;
        }
        let about_origin = self.inertia_about_origin() * mass / area;
        (about_origin - mass * self.centroid().magnitude_squared()).max(0.0)
    }

    /// Outward unit normal of each edge; edge `i` runs from vertex `i` to `i + 1`.
    pub fn edge_normals(&self) -> Vec<Vec2> {
        self.edges().map(|(a, b)| outward_normal(a, b)).collect()
    }

    pub(crate) fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    fn contains_strictly(&self, point: Vec2) -> bool {
        self.edges().all(|(a, b)| (b - a).cross(point - a) > EPSILON)
    }
}

/// Twice-halved shoelace sum; positive for counter-clockwise winding.
pub(crate) fn signed_area(vertices: &[Vec2]) -> f64 {
    let n = vertices.len();
    (0..n).map(|i| vertices[i].cross(vertices[(i + 1) % n])).sum::<f64>() * 0.5
}

/// Outward normal of a counter-clockwise edge.
pub(crate) fn outward_normal(a: Vec2, b: Vec2) -> Vec2 {
    let edge = b - a;
    Vec2::new(edge.y, -edge.x).normalize()
}

/// Furthest vertex along `direction`.
pub(crate) fn support_of(vertices: &[Vec2], direction: Vec2) -> Vec2 {
    vertices
        .iter()
        .copied()
        .fold((Vec2::ZERO, f64::NEG_INFINITY), |best, v| {
            let d = v.dot(direction);
            if d > best.1 {
                (v, d)
            } else {
                best
            }
        })
        .0
}

impl Geometry for Polygon {
    fn center(&self) -> Vec2 {
        self.centroid()
    }

    fn bounding_box(&self) -> AABB {
        AABB::from_points(&self.vertices).unwrap_or_else(|| AABB::new(Vec2::ZERO, Vec2::ZERO))
    }

    fn support(&self, direction: Vec2) -> Vec2 {
        support_of(&self.vertices, direction)
    }

    fn contains_point(&self, point: Vec2) -> bool {
        self.edges().all(|(a, b)| (b - a).cross(point - a) >= -EPSILON)
    }

    fn nearest_point(&self, point: Vec2) -> Vec2 {
        if self.contains_point(point) {
            return point;
        }
        self.edges()
            .map(|(a, b)| closest_point_on_segment(a, b, point).0)
            .fold((point, f64::INFINITY), |best, p| {
                let d = p.distance_squared(point);
                if d < best.1 {
                    (p, d)
                } else {
                    best
                }
            })
            .0
    }

    fn raycast(&self, ray: &Ray, limit: f64) -> Option<RaycastHit> {
        if self.contains_strictly(ray.origin) {
            return None;
        }
        ray_polygon(ray, &self.vertices, limit)
    }

    fn area(&self) -> f64 {
        signed_area(&self.vertices).abs()
    }

    fn angular_mass(&self, mass: f64) -> f64 {
        let area = self.area();
        if area < EPSILON {
            return 0.0;
        }
        self.inertia_about_origin() * mass / area
    }
}
