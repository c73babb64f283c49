//! Geometry kernel: shape primitives and the capability set shared by all of them.

pub mod circle;
pub mod ellipse;
pub mod line_segment;
pub mod polygon;
pub mod rectangle;

pub use circle::Circle;
pub use ellipse::Ellipse;
pub use line_segment::LineSegment;
pub use polygon::Polygon;
pub use rectangle::Rectangle;

use crate::collision::{Ray, RaycastHit, AABB};
use crate::math::{Transform, Vec2, EPSILON};

/// Operations every shape supports. Everything is expressed in the shape's
/// own coordinate frame; use [`Shape::transformed`] to move into world space.
pub trait Geometry {
    fn center(&self) -> Vec2;

    fn bounding_box(&self) -> AABB;

    /// Furthest point of the shape along `direction`.
    fn support(&self, direction: Vec2) -> Vec2;

    /// Inclusive: boundary points are contained.
    fn contains_point(&self, point: Vec2) -> bool;

    /// Closest point of the (solid) shape to `point`; `point` itself if it is inside.
    fn nearest_point(&self, point: Vec2) -> Vec2;

    fn raycast(&self, ray: &Ray, limit: f64) -> Option<RaycastHit>;

    fn area(&self) -> f64;

    /// Moment of inertia about the frame origin for a uniform body of `mass`.
    fn angular_mass(&self, mass: f64) -> f64;
}

/// Tag used by the narrow phase to pick a specialized test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeKind {
    Circle,
    Rectangle,
    Polygon,
    Segment,
    Ellipse,
}

/// Closed set of collision shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Rectangle(Rectangle),
    Polygon(Polygon),
    Segment(LineSegment),
    Ellipse(Ellipse),
}

macro_rules! dispatch {
    ($shape:expr, $s:ident => $body:expr) => {
        match $shape {
            Shape::Circle($s) => $body,
            Shape::Rectangle($s) => $body,
            Shape::Polygon($s) => $body,
            Shape::Segment($s) => $body,
            Shape::Ellipse($s) => $body,
        }
    };
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Rectangle(_) => ShapeKind::Rectangle,
            Shape::Polygon(_) => ShapeKind::Polygon,
            Shape::Segment(_) => ShapeKind::Segment,
            Shape::Ellipse(_) => ShapeKind::Ellipse,
        }
    }

    /// Circles and ellipses have no vertices to clip against.
    pub fn is_curved(&self) -> bool {
        matches!(self, Shape::Circle(_) | Shape::Ellipse(_))
    }

    /// Vertices of polygonal shapes in counter-clockwise order. Segments yield
    /// their two endpoints.
    pub fn vertices(&self) -> Option<Vec<Vec2>> {
        match self {
            Shape::Rectangle(r) => Some(r.vertices().to_vec()),
            Shape::Polygon(p) => Some(p.vertices().to_vec()),
            Shape::Segment(s) => Some(vec![s.start, s.end]),
            Shape::Circle(_) | Shape::Ellipse(_) => None,
        }
    }

    /// Maps local geometry into the frame described by `transform`.
    ///
    /// Circles scale by the largest scale component. A rectangle stays a
    /// rectangle while its mapped edges stay perpendicular and becomes a
    /// general polygon otherwise. Ellipses map exactly: the image of an
    /// ellipse under scale and rotation is again an ellipse.
    pub fn transformed(&self, transform: &Transform) -> Shape {
        let rigid = transform.scale == Vec2::new(1.0, 1.0);
        match self {
            Shape::Circle(c) => Shape::Circle(Circle {
                center: transform.apply(c.center),
                radius: c.radius * transform.max_scale(),
            }),
            Shape::Rectangle(r) if rigid => Shape::Rectangle(Rectangle {
                center: transform.apply(r.center),
                size: r.size,
                angle: r.angle + transform.rotation,
            }),
            Shape::Rectangle(r) => {
                let h = r.half_extents();
                let u = map_vector(transform, Vec2::new(h.x, 0.0).rotate(r.angle));
                let v = map_vector(transform, Vec2::new(0.0, h.y).rotate(r.angle));
                if u.dot(v).abs() <= EPSILON * u.magnitude() * v.magnitude() {
                    // Mirrored frames flip the edge order, not the box.
                    Shape::Rectangle(Rectangle {
                        center: transform.apply(r.center),
                        size: Vec2::new(u.magnitude(), v.magnitude()) * 2.0,
                        angle: u.y.atan2(u.x),
                    })
                } else {
                    Shape::Polygon(Polygon::from_mapped(
                        r.vertices().iter().map(|v| transform.apply(*v)).collect(),
                    ))
                }
            }
            Shape::Polygon(p) => Shape::Polygon(Polygon::from_mapped(
                p.vertices().iter().map(|v| transform.apply(*v)).collect(),
            )),
            Shape::Segment(s) => Shape::Segment(LineSegment {
                start: transform.apply(s.start),
                end: transform.apply(s.end),
            }),
            Shape::Ellipse(e) if rigid => Shape::Ellipse(Ellipse {
                center: transform.apply(e.center),
                half_extents: e.half_extents,
                angle: e.angle + transform.rotation,
            }),
            Shape::Ellipse(e) => {
                let u = map_vector(transform, Vec2::new(e.half_extents.x, 0.0).rotate(e.angle));
                let v = map_vector(transform, Vec2::new(0.0, e.half_extents.y).rotate(e.angle));
                // Principal axes of [u v][u v]^T.
                let p = u.x * u.x + v.x * v.x;
                let q = u.x * u.y + v.x * v.y;
                let r = u.y * u.y + v.y * v.y;
                let mid = (p + r) * 0.5;
                let radius = (((p - r) * 0.5).powi(2) + q * q).sqrt();
                Shape::Ellipse(Ellipse {
                    center: transform.apply(e.center),
                    half_extents: Vec2::new((mid + radius).sqrt(), (mid - radius).max(0.0).sqrt()),
                    angle: 0.5 * (2.0 * q).atan2(p - r),
                })
            }
        }
    }
}

/// Scales then rotates a local vector; translation does not apply.
fn map_vector(transform: &Transform, vector: Vec2) -> Vec2 {
    vector.component_mul(transform.scale).rotate(transform.rotation)
}

impl Geometry for Shape {
    fn center(&self) -> Vec2 {
        dispatch!(self, s => s.center())
    }

    fn bounding_box(&self) -> AABB {
        dispatch!(self, s => s.bounding_box())
    }

    fn support(&self, direction: Vec2) -> Vec2 {
        dispatch!(self, s => s.support(direction))
    }

    fn contains_point(&self, point: Vec2) -> bool {
        dispatch!(self, s => s.contains_point(point))
    }

    fn nearest_point(&self, point: Vec2) -> Vec2 {
        dispatch!(self, s => s.nearest_point(point))
    }

    fn raycast(&self, ray: &Ray, limit: f64) -> Option<RaycastHit> {
        dispatch!(self, s => s.raycast(ray, limit))
    }

    fn area(&self) -> f64 {
        dispatch!(self, s => s.area())
    }

    fn angular_mass(&self, mass: f64) -> f64 {
        dispatch!(self, s => s.angular_mass(mass))
    }
}

impl From<Circle> for Shape {
    fn from(c: Circle) -> Self {
        Shape::Circle(c)
    }
}

impl From<Rectangle> for Shape {
    fn from(r: Rectangle) -> Self {
        Shape::Rectangle(r)
    }
}

impl From<Polygon> for Shape {
    fn from(p: Polygon) -> Self {
        Shape::Polygon(p)
    }
}

impl From<LineSegment> for Shape {
    fn from(s: LineSegment) -> Self {
        Shape::Segment(s)
    }
}

impl From<Ellipse> for Shape {
    fn from(e: Ellipse) -> Self {
        Shape::Ellipse(e)
    }
}
