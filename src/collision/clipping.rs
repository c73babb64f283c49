//! Contact point generation by reference/incident edge clipping.

use crate::math::{Vec2, EPSILON};
use crate::shapes::polygon::support_of;
use crate::shapes::{Geometry, Shape};

/// The edge of a shape most involved in a contact, plus its deepest vertex.
#[derive(Debug, Clone, Copy)]
struct Feature {
    deepest: Vec2,
    start: Vec2,
    end: Vec2,
}

impl Feature {
    fn direction(&self) -> Vec2 {
        self.end - self.start
    }
}

/// Computes one or two world-space contact points for overlapping shapes.
///
/// Polygonal pairs clip the incident edge against the reference edge. When a
/// curved shape is involved, its deepest point along the normal is the contact.
pub(crate) fn contact_points(a: &Shape, b: &Shape, normal: Vec2) -> Vec<Vec2> {
    if let (Some(va), Some(vb)) = (a.vertices(), b.vertices()) {
        if let Some(points) = clip_polygons(&va, &vb, normal) {
            return points;
        }
        return vec![b.support(-normal)];
    }
    if a.is_curved() {
        vec![a.support(normal)]
    } else {
        vec![b.support(-normal)]
    }
}

fn best_edge(vertices: &[Vec2], normal: Vec2) -> Feature {
    let n = vertices.len();
    if n == 2 {
        return Feature { deepest: support_of(vertices, normal), start: vertices[0], end: vertices[1] };
    }
    let (index, _) = vertices
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, v)| {
            let d = v.dot(normal);
            if d > best.1 {
                (i, d)
            } else {
                best
            }
        });
    let v = vertices[index];
    let prev = vertices[(index + n - 1) % n];
    let next = vertices[(index + 1) % n];
    let left = (v - next).normalize();
    let right = (v - prev).normalize();
    // Pick the adjacent edge most perpendicular to the normal.
    if right.dot(normal) <= left.dot(normal) {
        Feature { deepest: v, start: prev, end: v }
    } else {
        Feature { deepest: v, start: v, end: next }
    }
}

/// Keeps the part of `v1..v2` on the positive side of the plane `dir . p = offset`.
fn clip(v1: Vec2, v2: Vec2, dir: Vec2, offset: f64) -> Vec<Vec2> {
    let d1 = dir.dot(v1) - offset;
    let d2 = dir.dot(v2) - offset;
    let mut out = Vec::with_capacity(2);
    if d1 >= 0.0 {
        out.push(v1);
    }
    if d2 >= 0.0 {
        out.push(v2);
    }
    if d1 * d2 < 0.0 {
        let t = d1 / (d1 - d2);
        out.push(v1 + (v2 - v1) * t);
    }
    out
}

fn clip_polygons(a: &[Vec2], b: &[Vec2], normal: Vec2) -> Option<Vec<Vec2>> {
    let edge_a = best_edge(a, normal);
    let edge_b = best_edge(b, -normal);

    let (reference, incident, flip) =
        if edge_a.direction().dot(normal).abs() <= edge_b.direction().dot(normal).abs() {
            (edge_a, edge_b, false)
        } else {
            (edge_b, edge_a, true)
        };

    let ref_dir = reference.direction().normalize();
    let clipped = clip(incident.start, incident.end, ref_dir, ref_dir.dot(reference.start));
    if clipped.len() < 2 {
        return None;
    }
    let clipped = clip(clipped[0], clipped[1], -ref_dir, -ref_dir.dot(reference.end));
    if clipped.len() < 2 {
        return None;
    }

    let towards_incident = if flip { -normal } else { normal };
    let mut face_normal = ref_dir.perpendicular();
    if face_normal.dot(towards_incident) < 0.0 {
        face_normal = -face_normal;
    }
    let face = face_normal.dot(reference.deepest);

    let mut points: Vec<Vec2> = clipped.into_iter().filter(|p| face_normal.dot(*p) <= face + EPSILON).collect();
    if points.len() == 2 && points[0].approx_eq(points[1], EPSILON) {
        points.pop();
    }
    (!points.is_empty()).then_some(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Circle, Polygon, Rectangle};

    fn boxed(cx: f64, cy: f64, w: f64, h: f64, angle: f64) -> Shape {
        Shape::Rectangle(Rectangle::new(Vec2::new(cx, cy), Vec2::new(w, h), angle).unwrap())
    }

    #[test]
    fn test_face_to_face_gives_two_points() {
        let a = boxed(0.0, 0.0, 2.0, 2.0, 0.0);
        let b = boxed(1.5, 0.5, 2.0, 2.0, 0.0);
        let points = contact_points(&a, &b, Vec2::new(1.0, 0.0));
        assert_eq!(points.len(), 2);
        assert!(points.iter().any(|p| p.approx_eq(Vec2::new(0.5, -0.5), 1e-9)));
        assert!(points.iter().any(|p| p.approx_eq(Vec2::new(0.5, 1.0), 1e-9)));
    }

    #[test]
    fn test_vertex_into_face_gives_one_point() {
        let floor = Shape::Polygon(Polygon::rectangle(Vec2::new(0.0, -1.0), Vec2::new(10.0, 2.0)).unwrap());
        let diamond = boxed(0.0, 0.6, 1.0, 1.0, std::f64::consts::FRAC_PI_4);
        let points = contact_points(&diamond, &floor, Vec2::new(0.0, -1.0));
        assert_eq!(points.len(), 1);
        let tip = 0.6 - std::f64::consts::FRAC_1_SQRT_2;
        assert!(points[0].approx_eq(Vec2::new(0.0, tip), 1e-9));
    }

    #[test]
    fn test_curved_shape_contributes_support_point() {
        let ball = Shape::Circle(Circle::new(Vec2::new(0.0, 0.8), 1.0).unwrap());
        let floor = boxed(0.0, -0.5, 10.0, 1.0, 0.0);
        let down = Vec2::new(0.0, -1.0);
        assert!(contact_points(&ball, &floor, down)[0].approx_eq(Vec2::new(0.0, -0.2), 1e-9));
        assert!(contact_points(&floor, &ball, -down)[0].approx_eq(Vec2::new(0.0, -0.2), 1e-9));
    }
}
