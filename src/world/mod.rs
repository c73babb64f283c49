pub mod config;
pub mod events;
pub mod physics_world;

pub use config::WorldConfig;
pub use events::{CollisionEvent, CollisionPhase};
pub use physics_world::{ContactFilter, PhysicsWorld, StepStats};
