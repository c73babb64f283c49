// Axis-aligned bounding box used by the broad phase and the box fast path.

use crate::math::vec2::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: Vec2,
    pub max: Vec2,
}

impl AABB {
    /// Creates an AABB from two corners in any order.
    pub fn new(a: Vec2, b: Vec2) -> Self {
        AABB { min: a.min(b), max: a.max(b) }
    }

    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        AABB::new(center - half_extents, center + half_extents)
    }

    /// Inclusive overlap: boxes that share an edge or corner overlap.
    pub fn overlaps(&self, other: &AABB) -> bool {
        let x_overlap = self.min.x <= other.max.x && other.min.x <= self.max.x;
        let y_overlap = self.min.y <= other.max.y && other.min.y <= self.max.y;
        x_overlap && y_overlap
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn merge(&mut self, other: &AABB) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn expanded(&self, margin: f64) -> AABB {
        let m = Vec2::new(margin, margin);
        AABB { min: self.min - m, max: self.max + m }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn from_points(points: &[Vec2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (min, max) = rest
            .iter()
            .fold((*first, *first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        Some(AABB { min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_new_orders_corners() {
        let b = AABB::new(Vec2::new(2.0, -1.0), Vec2::new(-2.0, 3.0));
        assert_eq!(b.min, Vec2::new(-2.0, -1.0));
        assert_eq!(b.max, Vec2::new(2.0, 3.0));
    }

    #[test]
    fn test_aabb_overlap_is_inclusive() {
        let a = AABB::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        let touching = AABB::new(Vec2::new(1.0, 0.0), Vec2::new(2.0, 1.0));
        let apart = AABB::new(Vec2::new(1.1, 0.0), Vec2::new(2.0, 1.0));
        assert!(a.overlaps(&touching));
        assert!(touching.overlaps(&a));
        assert!(!a.overlaps(&apart));
    }

    #[test]
    fn test_aabb_from_points() {
        assert!(AABB::from_points(&[]).is_none());
        let b = AABB::from_points(&[Vec2::new(1.0, 5.0), Vec2::new(-3.0, 2.0), Vec2::new(0.0, -1.0)]).unwrap();
        assert_eq!(b.min, Vec2::new(-3.0, -1.0));
        assert_eq!(b.max, Vec2::new(1.0, 5.0));
    }

    #[test]
    fn test_aabb_merge_and_expand() {
        let mut a = AABB::new(Vec2::ZERO, Vec2::new(1.0, 1.0));
        a.merge(&AABB::new(Vec2::new(2.0, 2.0), Vec2::new(3.0, 3.0)));
        assert_eq!(a.max, Vec2::new(3.0, 3.0));
        let e = a.expanded(0.5);
        assert_eq!(e.min, Vec2::new(-0.5, -0.5));
        assert!(e.contains_point(Vec2::new(3.4, 3.4)));
    }
}
