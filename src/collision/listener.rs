//! Persistent per-pair collision trackers.

use super::manifold::Manifold;
use crate::objects::ColliderHandle;
use crate::world::events::CollisionPhase;

/// Unordered pair of colliders, stored with the smaller handle first so that
/// `PairKey::new(a, b) == PairKey::new(b, a)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    first: ColliderHandle,
    second: ColliderHandle,
}

impl PairKey {
    pub fn new(a: ColliderHandle, b: ColliderHandle) -> Self {
        if a <= b {
            PairKey { first: a, second: b }
        } else {
            PairKey { first: b, second: a }
        }
    }

    pub fn first(&self) -> ColliderHandle {
        self.first
    }

    pub fn second(&self) -> ColliderHandle {
        self.second
    }

    pub fn contains(&self, handle: ColliderHandle) -> bool {
        self.first == handle || self.second == handle
    }

    /// The partner of `handle` in this pair, if `handle` is part of it.
    pub fn other(&self, handle: ColliderHandle) -> Option<ColliderHandle> {
        if self.first == handle {
            Some(self.second)
        } else if self.second == handle {
            Some(self.first)
        } else {
            None
        }
    }
}

/// Tracks one pair of colliders while they stay broad-phase eligible.
///
/// The manifold is always expressed with the normal pointing from
/// `key.first()` to `key.second()`.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionListener {
    key: PairKey,
    /// Whether the pair passed the broad phase this frame.
    pub broad_phase: bool,
    /// Narrow-phase result for this frame, if the shapes touch.
    pub manifold: Option<Manifold>,
    /// Whether the pair had a manifold at the end of the previous frame.
    pub was_colliding: bool,
    /// Either collider is a trigger: detected but never resolved.
    pub is_trigger: bool,
}

impl CollisionListener {
    pub fn new(key: PairKey, is_trigger: bool) -> Self {
        CollisionListener { key, broad_phase: true, manifold: None, was_colliding: false, is_trigger }
    }

    pub fn key(&self) -> PairKey {
        self.key
    }

    /// Symmetric: `matches(a, b) == matches(b, a)`.
    pub fn matches(&self, a: ColliderHandle, b: ColliderHandle) -> bool {
        self.key == PairKey::new(a, b)
    }

    pub fn involves(&self, handle: ColliderHandle) -> bool {
        self.key.contains(handle)
    }

    pub fn is_colliding(&self) -> bool {
        self.manifold.is_some()
    }

    /// Rolls the tracker into a new frame: remembers whether it was colliding
    /// and forgets this frame's results.
    pub fn begin_frame(&mut self) {
        self.was_colliding = self.manifold.is_some();
        self.manifold = None;
        self.broad_phase = false;
    }

    /// Enter/stay/exit transition produced by the current frame, if any.
    pub fn phase(&self) -> Option<CollisionPhase> {
        match (self.was_colliding, self.is_colliding()) {
            (false, true) => Some(CollisionPhase::Enter),
            (true, true) => Some(CollisionPhase::Stay),
            (true, false) => Some(CollisionPhase::Exit),
            (false, false) => None,
        }
    }
}
