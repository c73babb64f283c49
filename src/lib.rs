//! Frame-stepped 2D rigid-body simulation.
//!
//! A [`PhysicsWorld`] owns bodies and colliders and advances them with
//! [`PhysicsWorld::step`]: integration, an all-pairs broad phase, exact narrow
//! phase tests (fast paths for simple pairs, GJK/EPA for the rest) and a
//! sequential-impulse contact solver.

pub mod collision;
pub mod common;
pub mod error;
pub mod integration;
pub mod math;
pub mod objects;
pub mod resolution;
pub mod shapes;
pub mod world;

// Re-export key types for easier use
pub use collision::{collide, intersects, raycast, CollisionListener, Manifold, PairKey, Ray, RaycastHit, AABB};
pub use common::{Material, RestitutionRule};
pub use error::{ConfigError, PhysicsError, ShapeError};
pub use math::{Transform, Vec2};
pub use objects::{BodyHandle, Collider, ColliderHandle, RigidBody};
pub use shapes::{Circle, Ellipse, Geometry, LineSegment, Polygon, Rectangle, Shape};
pub use world::{CollisionEvent, CollisionPhase, ContactFilter, PhysicsWorld, StepStats, WorldConfig};
