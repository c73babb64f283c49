//! Sequential-impulse contact solver with positional correction.

use tracing::trace;

use crate::collision::{Manifold, PairKey};
use crate::common::RestitutionRule;
use crate::math::{Vec2, EPSILON};
use crate::objects::{BodyHandle, Collider, RigidBody};

pub const DEFAULT_IMPULSE_ITERATIONS: usize = 8;
/// Fraction of the remaining penetration removed per step.
pub const DEFAULT_CORRECTION_PERCENT: f64 = 0.4;
/// Penetration allowed before correction kicks in.
pub const DEFAULT_SLOP: f64 = 0.01;
/// Closing speed below which contacts do not bounce. Zero bounces every
/// approaching contact; raise it to let resting stacks settle.
pub const DEFAULT_RESTITUTION_THRESHOLD: f64 = 0.0;

/// A confirmed manifold queued for resolution this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    /// Colliders in manifold order: the normal points from `pair.first()` to `pair.second()`.
    pub pair: PairKey,
    pub body_a: Option<BodyHandle>,
    pub body_b: Option<BodyHandle>,
    pub manifold: Manifold,
    /// Combined restitution in [0, 1].
    pub restitution: f64,
    pub friction: f64,
    /// Guards against resolving the same contact twice in a frame.
    pub resolved: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct PointState {
    ra: Vec2,
    rb: Vec2,
    normal_mass: f64,
    tangent_mass: f64,
    /// Target normal velocity after the bounce.
    bounce_velocity: f64,
    normal_impulse: f64,
    tangent_impulse: f64,
    active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Solver {
    pub impulse_iterations: usize,
    pub correction_percent: f64,
    pub slop: f64,
    pub restitution_rule: RestitutionRule,
    pub restitution_threshold: f64,
    invocations: usize,
}

impl Default for Solver {
    fn default() -> Self {
        Solver::new(DEFAULT_IMPULSE_ITERATIONS, DEFAULT_CORRECTION_PERCENT, DEFAULT_SLOP, RestitutionRule::default())
    }
}

impl Solver {
    pub fn new(
        impulse_iterations: usize,
        correction_percent: f64,
        slop: f64,
        restitution_rule: RestitutionRule,
    ) -> Self {
        Solver {
            impulse_iterations,
            correction_percent,
            slop,
            restitution_rule,
            restitution_threshold: DEFAULT_RESTITUTION_THRESHOLD,
            invocations: 0,
        }
    }

    pub fn with_restitution_threshold(mut self, threshold: f64) -> Self {
        self.restitution_threshold = threshold.max(0.0);
        self
    }

    /// Number of contacts resolved since the last reset.
    pub fn invocations(&self) -> usize {
        self.invocations
    }

    pub fn reset_invocations(&mut self) {
        self.invocations = 0;
    }

    /// Builds a contact, combining the colliders' materials.
    pub fn contact(&self, pair: PairKey, a: &Collider, b: &Collider, manifold: Manifold) -> Contact {
        Contact {
            pair,
            body_a: a.body,
            body_b: b.body,
            manifold,
            restitution: self.restitution_rule.combine(a.bounce(), b.bounce()),
            friction: (a.material.friction * b.material.friction).sqrt(),
            resolved: false,
        }
    }

    /// Resolves every unresolved contact: impulse passes first, then one
    /// positional correction pass. `bodies` and `colliders` are indexed by handle.
    pub fn solve(
        &mut self,
        contacts: &mut [Contact],
        bodies: &mut [Option<RigidBody>],
        colliders: &mut [Option<Collider>],
    ) {
        let mut states: Vec<Vec<PointState>> = contacts
            .iter()
            .map(|contact| {
                if contact.resolved {
                    return Vec::new();
                }
                let (a, b) = body_pair(bodies, contact.body_a, contact.body_b);
                prepare(contact, a.as_deref(), b.as_deref(), self.restitution_threshold)
            })
            .collect();

        for _ in 0..self.impulse_iterations {
            for (contact, points) in contacts.iter().zip(states.iter_mut()) {
                if contact.resolved {
                    continue;
                }
                let (mut a, mut b) = body_pair(bodies, contact.body_a, contact.body_b);
                for point in points.iter_mut().filter(|p| p.active) {
                    apply_point_impulse(contact, point, a.as_deref_mut(), b.as_deref_mut());
                }
            }
        }

        for contact in contacts.iter_mut() {
            if contact.resolved {
                continue;
            }
            let (a, b) = body_pair(bodies, contact.body_a, contact.body_b);
            self.correct_positions(&contact.manifold, a, b);

            contact.resolved = true;
            for handle in [contact.pair.first(), contact.pair.second()] {
                if let Some(Some(collider)) = colliders.get_mut(handle.0 as usize) {
                    collider.collision_resolved = true;
                }
            }
            self.invocations += 1;
            trace!(
                a = contact.pair.first().0,
                b = contact.pair.second().0,
                depth = contact.manifold.depth,
                "contact resolved"
            );
        }
    }

    fn correct_positions(&self, manifold: &Manifold, a: Option<&mut RigidBody>, b: Option<&mut RigidBody>) {
        let inv_a = a.as_ref().map_or(0.0, |body| body.inv_mass());
        let inv_b = b.as_ref().map_or(0.0, |body| body.inv_mass());
        let total_inv_mass = inv_a + inv_b;
        let excess = manifold.depth - self.slop;
        if total_inv_mass < EPSILON || excess <= 0.0 {
            return;
        }
        let correction = manifold.normal * (excess / total_inv_mass * self.correction_percent);
        if let Some(body) = a {
            body.transform.position -= correction * inv_a;
        }
        if let Some(body) = b {
            body.transform.position += correction * inv_b;
        }
    }
}

fn prepare(
    contact: &Contact,
    a: Option<&RigidBody>,
    b: Option<&RigidBody>,
    restitution_threshold: f64,
) -> Vec<PointState> {
    let normal = contact.manifold.normal;
    let tangent = normal.perpendicular();
    let (inv_ma, inv_ia) = a.map_or((0.0, 0.0), |body| (body.inv_mass(), body.inv_inertia()));
    let (inv_mb, inv_ib) = b.map_or((0.0, 0.0), |body| (body.inv_mass(), body.inv_inertia()));

    contact
        .manifold
        .contacts
        .iter()
        .map(|&point| {
            let ra = a.map_or(Vec2::ZERO, |body| point - body.position());
            let rb = b.map_or(Vec2::ZERO, |body| point - body.position());
            let effective = |axis: Vec2| {
                let rna = ra.cross(axis);
                let rnb = rb.cross(axis);
                inv_ma + inv_mb + rna * rna * inv_ia + rnb * rnb * inv_ib
            };
            let k_normal = effective(normal);
            let k_tangent = effective(tangent);

            let closing = relative_velocity(a, b, point).dot(normal);
            // Separating or resting contacts get no impulse.
            let active = k_normal > EPSILON && closing < -EPSILON;
            let bounces = active && closing < -restitution_threshold;

            PointState {
                ra,
                rb,
                normal_mass: if k_normal > EPSILON { 1.0 / k_normal } else { 0.0 },
                tangent_mass: if k_tangent > EPSILON { 1.0 / k_tangent } else { 0.0 },
                bounce_velocity: if bounces { -contact.restitution * closing } else { 0.0 },
                normal_impulse: 0.0,
                tangent_impulse: 0.0,
                active,
            }
        })
        .collect()
}

fn apply_point_impulse(
    contact: &Contact,
    point: &mut PointState,
    mut a: Option<&mut RigidBody>,
    mut b: Option<&mut RigidBody>,
) {
    let normal = contact.manifold.normal;
    let tangent = normal.perpendicular();
    let contact_point = match (a.as_deref(), b.as_deref()) {
        (Some(body), _) => body.position() + point.ra,
        (None, Some(body)) => body.position() + point.rb,
        (None, None) => return,
    };

    // Normal impulse, accumulated and clamped so the total never pulls.
    let vn = relative_velocity(a.as_deref(), b.as_deref(), contact_point).dot(normal);
    let lambda = point.normal_mass * (point.bounce_velocity - vn);
    let accumulated = (point.normal_impulse + lambda).max(0.0);
    let lambda = accumulated - point.normal_impulse;
    point.normal_impulse = accumulated;
    apply(&mut a, &mut b, normal * lambda, point);

    // Coulomb friction bounded by the normal impulse.
    if point.tangent_mass > 0.0 && contact.friction > 0.0 {
        let vt = relative_velocity(a.as_deref(), b.as_deref(), contact_point).dot(tangent);
        let max_friction = contact.friction * point.normal_impulse;
        let accumulated = (point.tangent_impulse - point.tangent_mass * vt).clamp(-max_friction, max_friction);
        let lambda = accumulated - point.tangent_impulse;
        point.tangent_impulse = accumulated;
        apply(&mut a, &mut b, tangent * lambda, point);
    }
}

fn apply(a: &mut Option<&mut RigidBody>, b: &mut Option<&mut RigidBody>, impulse: Vec2, point: &PointState) {
    if let Some(body) = a.as_deref_mut() {
        body.apply_impulse(-impulse, point.ra);
    }
    if let Some(body) = b.as_deref_mut() {
        body.apply_impulse(impulse, point.rb);
    }
}

/// Velocity of B relative to A at a world point; missing bodies are at rest.
fn relative_velocity(a: Option<&RigidBody>, b: Option<&RigidBody>, point: Vec2) -> Vec2 {
    let va = a.map_or(Vec2::ZERO, |body| body.point_velocity(point));
    let vb = b.map_or(Vec2::ZERO, |body| body.point_velocity(point));
    vb - va
}

/// Borrows the two bodies of a contact at once. A body shared by both sides is
/// only handed out once.
fn body_pair(
    bodies: &mut [Option<RigidBody>],
    a: Option<BodyHandle>,
    b: Option<BodyHandle>,
) -> (Option<&mut RigidBody>, Option<&mut RigidBody>) {
    match (a, b) {
        (Some(ha), Some(hb)) if ha != hb => {
            let (i, j) = (ha.0 as usize, hb.0 as usize);
            let (lo, hi) = (i.min(j), i.max(j));
            if hi >= bodies.len() {
                return (None, None);
            }
            // Split so that both slots can be borrowed mutably.
            let (left, right) = bodies.split_at_mut(hi);
            let low = left[lo].as_mut();
            let high = right[0].as_mut();
            if i < j {
                (low, high)
            } else {
                (high, low)
            }
        }
        (Some(ha), _) => (bodies.get_mut(ha.0 as usize).and_then(Option::as_mut), None),
        (None, Some(hb)) => (None, bodies.get_mut(hb.0 as usize).and_then(Option::as_mut)),
        (None, None) => (None, None),
    }
}
