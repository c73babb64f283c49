use tracing::trace;

use super::aabb::AABB;
use super::listener::PairKey;
use crate::objects::{BodyHandle, ColliderHandle};

/// What the broad phase needs to know about one collider this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BroadPhaseProxy {
    pub handle: ColliderHandle,
    pub body: Option<BodyHandle>,
    pub bounds: AABB,
    pub is_static: bool,
    pub enabled: bool,
    /// Carries the "Ignore Collisions" tag.
    pub ignored: bool,
}

/// All-pairs broad phase over proxies in index order.
///
/// Visits every `i < j` pair exactly once, so the output is deterministic when
/// the input order is. Disabled or ignored colliders, static-static pairs,
/// colliders sharing a body and pairs whose bounds do not touch are pruned.
/// Cost is `O(n^2)`.
pub fn candidate_pairs(proxies: &[BroadPhaseProxy]) -> Vec<PairKey> {
    let mut pairs = Vec::new();
    for (i, a) in proxies.iter().enumerate() {
        if !a.enabled || a.ignored {
            continue;
        }
        for b in proxies.iter().skip(i + 1) {
            if !b.enabled || b.ignored {
                continue;
            }
            if a.is_static && b.is_static {
                continue;
            }
            if a.body.is_some() && a.body == b.body {
                continue;
            }
            if a.bounds.overlaps(&b.bounds) {
                trace!(a = a.handle.0, b = b.handle.0, "broad phase candidate");
                pairs.push(PairKey::new(a.handle, b.handle));
            }
        }
    }
    pairs
}
