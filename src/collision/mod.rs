pub mod aabb;
pub mod broad_phase;
mod clipping;
pub mod detection;
pub mod epa;
pub mod gjk;
pub mod listener;
pub mod manifold;
pub mod raycast;

pub use aabb::AABB;
pub use broad_phase::{candidate_pairs, BroadPhaseProxy};
pub use detection::{collide, intersects, NarrowPhase};
pub use listener::{CollisionListener, PairKey};
pub use manifold::Manifold;
pub use raycast::{raycast, Ray, RaycastHit};
