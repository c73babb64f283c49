use super::vec2::Vec2;

/// Position, orientation and scale of an object in the world.
///
/// Points are mapped scale-first, then rotated, then translated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    pub rotation: f64, // radians
    pub scale: Vec2,
}

impl Transform {
    pub fn new(position: Vec2, rotation: f64) -> Self {
        Self { position, rotation, scale: Vec2::new(1.0, 1.0) }
    }

    pub fn identity() -> Self {
        Self::new(Vec2::ZERO, 0.0)
    }

    pub fn from_position(position: Vec2) -> Self {
        Self::new(position, 0.0)
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// Maps a local point into world space.
    pub fn apply(self, point: Vec2) -> Vec2 {
        point.component_mul(self.scale).rotate(self.rotation) + self.position
    }

    /// Maps a world point back into local space. Zero scale components map to zero.
    pub fn apply_inverse(self, point: Vec2) -> Vec2 {
        let unrotated = (point - self.position).rotate(-self.rotation);
        let inv = |v: f64, s: f64| if s.abs() < f64::EPSILON { 0.0 } else { v / s };
        Vec2::new(inv(unrotated.x, self.scale.x), inv(unrotated.y, self.scale.y))
    }

    /// Rotates a direction without translating or scaling it.
    pub fn apply_vector(self, vector: Vec2) -> Vec2 {
        vector.rotate(self.rotation)
    }

    /// Returns `self ∘ local`: a child transform expressed relative to `self`.
    pub fn compose(self, local: Transform) -> Transform {
        Transform {
            position: self.apply(local.position),
            rotation: self.rotation + local.rotation,
            scale: self.scale.component_mul(local.scale),
        }
    }

    /// The largest absolute scale component, used for shapes that must stay round.
    pub fn max_scale(self) -> f64 {
        self.scale.x.abs().max(self.scale.y.abs())
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
