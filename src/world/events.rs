use crate::collision::PairKey;

/// Transition of a tracked pair between two frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionPhase {
    /// The pair touches this frame but did not last frame.
    Enter,
    /// The pair touched last frame and still does.
    Stay,
    /// The pair touched last frame and no longer does, or stopped being tracked.
    Exit,
}

/// Collision notification produced by one `PhysicsWorld::step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionEvent {
    pub pair: PairKey,
    pub phase: CollisionPhase,
    /// At least one of the colliders is a trigger; the pair was not resolved.
    pub trigger: bool,
}
