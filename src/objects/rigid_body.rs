use crate::math::{Transform, Vec2};
use crate::shapes::{Geometry, Shape};

/// A simulated body. The transform's position is the body's center of mass.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    pub transform: Transform,
    pub velocity: Vec2,
    /// Radians per second, counter-clockwise positive.
    pub angular_velocity: f64,

    // Accumulators, cleared after every integration step.
    pub force: Vec2,
    pub torque: f64,

    pub follows_gravity: bool,
    /// Keeps the body from rotating in response to torque or contacts.
    pub fixed_rotation: bool,
    /// Linear damping rate per second.
    pub drag: f64,
    /// Angular damping rate per second.
    pub angular_drag: f64,

    mass: f64,
    inv_mass: f64,
    inertia: f64,
    inv_inertia: f64,
    explicit_inertia: bool,
}

impl RigidBody {
    /// Creates a dynamic body at the origin. A mass that is not finite and
    /// positive makes the body static.
    ///
    /// Inertia starts infinite (no rotation) and is derived from the first
    /// collider attached in a world, unless set with [`RigidBody::with_inertia`].
    pub fn new(mass: f64) -> Self {
        let mut body = RigidBody {
            transform: Transform::identity(),
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            force: Vec2::ZERO,
            torque: 0.0,
            follows_gravity: true,
            fixed_rotation: false,
            drag: 0.0,
            angular_drag: 0.0,
            mass: 0.0,
            inv_mass: 0.0,
            inertia: f64::INFINITY,
            inv_inertia: 0.0,
            explicit_inertia: false,
        };
        body.set_mass(mass);
        body
    }

    /// Creates an immovable body with infinite mass.
    pub fn new_static() -> Self {
        let mut body = Self::new(0.0);
        body.follows_gravity = false;
        body
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.transform.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.transform.rotation = rotation;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_gravity(mut self, follows_gravity: bool) -> Self {
        self.follows_gravity = follows_gravity;
        self
    }

    pub fn with_fixed_rotation(mut self) -> Self {
        self.fixed_rotation = true;
        self
    }

    pub fn with_drag(mut self, drag: f64, angular_drag: f64) -> Self {
        self.drag = drag.max(0.0);
        self.angular_drag = angular_drag.max(0.0);
        self
    }

    /// Sets the moment of inertia explicitly; it will not be derived from colliders.
    pub fn with_inertia(mut self, inertia: f64) -> Self {
        self.set_inertia(inertia);
        self
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn inv_mass(&self) -> f64 {
        self.inv_mass
    }

    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    pub fn inv_inertia(&self) -> f64 {
        if self.fixed_rotation {
            0.0
        } else {
            self.inv_inertia
        }
    }

    /// Static bodies have infinite mass and never move.
    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }

    pub fn position(&self) -> Vec2 {
        self.transform.position
    }

    pub fn rotation(&self) -> f64 {
        self.transform.rotation
    }

    pub fn set_mass(&mut self, mass: f64) {
        if mass.is_finite() && mass > 0.0 {
            self.mass = mass;
            self.inv_mass = 1.0 / mass;
        } else {
            self.mass = 0.0;
            self.inv_mass = 0.0;
            self.inertia = f64::INFINITY;
            self.inv_inertia = 0.0;
            self.velocity = Vec2::ZERO;
            self.angular_velocity = 0.0;
        }
    }

    pub fn set_inertia(&mut self, inertia: f64) {
        self.explicit_inertia = true;
        self.assign_inertia(inertia);
    }

    /// Derives inertia from a collider shape given in body-local space, unless
    /// inertia was set explicitly.
    pub(crate) fn derive_inertia(&mut self, local_shape: &Shape) {
        if self.explicit_inertia || self.is_static() {
            return;
        }
        self.assign_inertia(local_shape.angular_mass(self.mass));
    }

    fn assign_inertia(&mut self, inertia: f64) {
        if self.is_static() {
            return;
        }
        self.inertia = inertia;
        self.inv_inertia = if inertia.is_finite() && inertia > 0.0 { 1.0 / inertia } else { 0.0 };
    }

    /// Applies a force at the center of mass.
    pub fn apply_force(&mut self, force: Vec2) {
        self.force += force;
    }

    /// Applies a force at a world-space point, generating torque about the
    /// center of mass.
    pub fn apply_force_at_point(&mut self, force: Vec2, point: Vec2) {
        self.force += force;
        self.torque += (point - self.transform.position).cross(force);
    }

    pub fn apply_torque(&mut self, torque: f64) {
        self.torque += torque;
    }

    /// Applies an instantaneous impulse at offset `arm` from the center of mass.
    pub fn apply_impulse(&mut self, impulse: Vec2, arm: Vec2) {
        if self.is_static() {
            return;
        }
        self.velocity += impulse * self.inv_mass;
        self.angular_velocity += arm.cross(impulse) * self.inv_inertia();
    }

    /// Velocity of the body's material at a world-space point.
    pub fn point_velocity(&self, point: Vec2) -> Vec2 {
        self.velocity + Vec2::cross_scalar(self.angular_velocity, point - self.transform.position)
    }

    /// Should typically be called after integration in each simulation step.
    pub fn clear_accumulators(&mut self) {
        self.force = Vec2::ZERO;
        self.torque = 0.0;
    }

    /// True when every state component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.transform.position.is_finite()
            && self.transform.rotation.is_finite()
            && self.velocity.is_finite()
            && self.angular_velocity.is_finite()
    }
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new(1.0)
    }
}
