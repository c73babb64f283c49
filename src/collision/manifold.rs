use crate::math::vec2::Vec2;

/// Contact information for one colliding pair in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifold {
    /// Unit separation normal, pointing from shape A towards shape B.
    pub normal: Vec2,
    /// Penetration depth along `normal`; never negative.
    pub depth: f64,
    /// One or two world-space contact points.
    pub contacts: Vec<Vec2>,
}

impl Manifold {
    pub fn new(normal: Vec2, depth: f64, contacts: Vec<Vec2>) -> Self {
        Manifold { normal: normal.normalize(), depth: depth.max(0.0), contacts }
    }

    /// The same contact seen from B's side.
    pub fn flipped(&self) -> Manifold {
        Manifold { normal: -self.normal, depth: self.depth, contacts: self.contacts.clone() }
    }

    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    /// Average of the contact points, or `None` for an empty manifold.
    pub fn midpoint(&self) -> Option<Vec2> {
        if self.contacts.is_empty() {
            return None;
        }
        let sum = self.contacts.iter().fold(Vec2::ZERO, |acc, p| acc + *p);
        Some(sum / self.contacts.len() as f64)
    }
}
