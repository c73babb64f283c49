pub mod collider;
pub mod rigid_body;

pub use collider::{Collider, IGNORE_COLLISIONS_TAG};
pub use rigid_body::RigidBody;

/// Stable identifier of a body owned by a `PhysicsWorld`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u32);

/// Stable identifier of a collider owned by a `PhysicsWorld`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderHandle(pub u32);
