use std::collections::BTreeMap;

use tracing::{debug, info, trace, warn};

use super::config::WorldConfig;
use super::events::{CollisionEvent, CollisionPhase};
use crate::collision::{
    candidate_pairs, BroadPhaseProxy, CollisionListener, Manifold, NarrowPhase, PairKey, Ray, RaycastHit,
};
use crate::error::PhysicsError;
use crate::integration::integrate;
use crate::math::Vec2;
use crate::objects::{BodyHandle, Collider, ColliderHandle, RigidBody};
use crate::resolution::{Contact, Solver};
use crate::shapes::{Geometry, Shape};

/// Gameplay hook consulted once per non-trigger contact during the narrow
/// phase. Returning `true` vetoes the response for this frame only.
pub trait ContactFilter {
    fn ignore_collision(&mut self, a: &Collider, b: &Collider, manifold: &Manifold) -> bool;
}

impl<F> ContactFilter for F
where
    F: FnMut(&Collider, &Collider, &Manifold) -> bool,
{
    fn ignore_collision(&mut self, a: &Collider, b: &Collider, manifold: &Manifold) -> bool {
        self(a, b, manifold)
    }
}

/// Counters for the last completed step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    pub bodies_integrated: usize,
    pub candidate_pairs: usize,
    pub manifolds: usize,
    pub solver_invocations: usize,
}

/// Owns bodies, colliders and pair trackers, and runs the per-frame pipeline:
/// integrate, broad phase, narrow phase, solve.
///
/// Bodies and colliders live in slot arenas indexed by their handles. Slots of
/// removed objects stay empty, so handles stay valid until [`PhysicsWorld::clear`].
pub struct PhysicsWorld {
    config: WorldConfig,
    narrow_phase: NarrowPhase,
    solver: Solver,
    bodies: Vec<Option<RigidBody>>,
    colliders: Vec<Option<Collider>>,
    listeners: BTreeMap<PairKey, CollisionListener>,
    contacts: Vec<Contact>,
    events: Vec<CollisionEvent>,
    stats: StepStats,
    filter: Option<Box<dyn ContactFilter>>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Creates an empty world with default settings.
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    pub fn with_config(config: WorldConfig) -> Self {
        PhysicsWorld {
            narrow_phase: config.narrow_phase(),
            solver: config.solver(),
            config,
            bodies: Vec::new(),
            colliders: Vec::new(),
            listeners: BTreeMap::new(),
            contacts: Vec::new(),
            events: Vec::new(),
            stats: StepStats::default(),
            filter: None,
        }
    }

    /// Builds a world from a JSON config document.
    pub fn from_json(json: &str) -> Result<Self, PhysicsError> {
        Ok(Self::with_config(WorldConfig::from_json(json)?))
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn gravity(&self) -> Vec2 {
        self.config.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.config.gravity = gravity;
    }

    pub fn set_contact_filter(&mut self, filter: impl ContactFilter + 'static) {
        self.filter = Some(Box::new(filter));
    }

    pub fn clear_contact_filter(&mut self) {
        self.filter = None;
    }

    pub fn add_body(&mut self, body: RigidBody) -> BodyHandle {
        let handle = BodyHandle(self.bodies.len() as u32);
        self.bodies.push(Some(body));
        handle
    }

    /// Adds a collider. The first collider attached to a body without explicit
    /// inertia sets that body's inertia.
    pub fn add_collider(&mut self, collider: Collider) -> ColliderHandle {
        if let Some(body_handle) = collider.body {
            let first = !self.colliders.iter().flatten().any(|c| c.body == Some(body_handle));
            if let (true, Some(Some(body))) = (first, self.bodies.get_mut(body_handle.0 as usize)) {
                body.derive_inertia(&collider.body_local_shape());
            }
        }
        let handle = ColliderHandle(self.colliders.len() as u32);
        self.colliders.push(Some(collider));
        handle
    }

    /// Removes a body together with every collider attached to it. Unknown
    /// handles are ignored.
    pub fn remove_body(&mut self, handle: BodyHandle) -> Option<RigidBody> {
        let body = self.bodies.get_mut(handle.0 as usize)?.take()?;
        let attached: Vec<ColliderHandle> = self
            .colliders
            .iter()
            .enumerate()
            .filter(|(_, slot)| matches!(slot, Some(c) if c.body == Some(handle)))
            .map(|(i, _)| ColliderHandle(i as u32))
            .collect();
        for collider in attached {
            self.remove_collider(collider);
        }
        Some(body)
    }

    /// Removes a collider and every tracker that references it. Unknown
    /// handles are ignored.
    pub fn remove_collider(&mut self, handle: ColliderHandle) -> Option<Collider> {
        let collider = self.colliders.get_mut(handle.0 as usize)?.take()?;
        self.listeners.retain(|key, _| !key.contains(handle));
        self.contacts.retain(|contact| !contact.pair.contains(handle));
        Some(collider)
    }

    /// Drops every body, collider and tracker.
    pub fn clear(&mut self) {
        info!(bodies = self.body_count(), colliders = self.collider_count(), "clearing physics world");
        self.bodies.clear();
        self.colliders.clear();
        self.listeners.clear();
        self.contacts.clear();
        self.events.clear();
        self.stats = StepStats::default();
        self.solver.reset_invocations();
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle.0 as usize)?.as_ref()
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle.0 as usize)?.as_mut()
    }

    pub fn collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.colliders.get(handle.0 as usize)?.as_ref()
    }

    pub fn collider_mut(&mut self, handle: ColliderHandle) -> Option<&mut Collider> {
        self.colliders.get_mut(handle.0 as usize)?.as_mut()
    }

    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &RigidBody)> {
        self.bodies.iter().enumerate().filter_map(|(i, slot)| Some((BodyHandle(i as u32), slot.as_ref()?)))
    }

    pub fn colliders(&self) -> impl Iterator<Item = (ColliderHandle, &Collider)> {
        self.colliders.iter().enumerate().filter_map(|(i, slot)| Some((ColliderHandle(i as u32), slot.as_ref()?)))
    }

    pub fn body_count(&self) -> usize {
        self.bodies.iter().flatten().count()
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.iter().flatten().count()
    }

    /// The body a collider follows, if it is attached to a live one.
    pub fn body_of(&self, collider: &Collider) -> Option<&RigidBody> {
        collider.body.and_then(|handle| self.body(handle))
    }

    /// The collider's shape in world space.
    pub fn world_shape(&self, handle: ColliderHandle) -> Option<Shape> {
        let collider = self.collider(handle)?;
        Some(collider.world_shape(self.body_of(collider)))
    }

    /// Pair trackers alive after the last step, in pair-key order.
    pub fn listeners(&self) -> impl Iterator<Item = &CollisionListener> {
        self.listeners.values()
    }

    /// The tracker for a pair, looked up in either order.
    pub fn listener(&self, a: ColliderHandle, b: ColliderHandle) -> Option<&CollisionListener> {
        self.listeners.get(&PairKey::new(a, b))
    }

    /// Every manifold detected in the last step, triggers and vetoed pairs included.
    pub fn manifolds(&self) -> impl Iterator<Item = (PairKey, &Manifold)> {
        self.listeners.iter().filter_map(|(key, listener)| Some((*key, listener.manifold.as_ref()?)))
    }

    /// Contacts handed to the solver in the last step.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn events(&self) -> &[CollisionEvent] {
        &self.events
    }

    pub fn stats(&self) -> StepStats {
        self.stats
    }

    /// Nearest hit of `ray` over all enabled colliders. `limit <= 0` is unbounded.
    pub fn raycast(&self, ray: &Ray, limit: f64) -> Option<(ColliderHandle, RaycastHit)> {
        self.colliders()
            .filter(|(_, collider)| collider.enabled)
            .filter_map(|(handle, collider)| {
                let shape = collider.world_shape(self.body_of(collider));
                Some((handle, shape.raycast(ray, limit)?))
            })
            .min_by(|(_, a), (_, b)| a.distance.total_cmp(&b.distance))
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// A non-positive `dt` does nothing. If integration would leave any body
    /// with non-finite state the frame is aborted: no body moves, no pair is
    /// tested, and the previous frame's manifolds are discarded.
    pub fn step(&mut self, dt: f64) -> Result<(), PhysicsError> {
        if !dt.is_finite() {
            return Err(PhysicsError::InvalidTimeStep(dt));
        }
        if dt <= 0.0 {
            return Ok(());
        }

        self.contacts.clear();
        self.events.clear();
        self.stats = StepStats::default();
        self.solver.reset_invocations();
        for listener in self.listeners.values_mut() {
            listener.begin_frame();
        }

        self.stats.bodies_integrated = self.integrate_bodies(dt)?;

        for collider in self.colliders.iter_mut().flatten() {
            collider.clear_frame_flags();
        }
        let shapes: Vec<Option<Shape>> = self
            .colliders
            .iter()
            .map(|slot| slot.as_ref().map(|c| c.world_shape(self.body_of(c))))
            .collect();

        self.stats.candidate_pairs = self.broad_phase(&shapes);
        self.run_narrow_phase(&shapes);
        self.collect_events();

        self.solver.solve(&mut self.contacts, &mut self.bodies, &mut self.colliders);
        self.stats.solver_invocations = self.solver.invocations();

        debug!(
            dt,
            bodies = self.stats.bodies_integrated,
            pairs = self.stats.candidate_pairs,
            manifolds = self.stats.manifolds,
            resolved = self.stats.solver_invocations,
            "step complete"
        );
        Ok(())
    }

    /// Integrates every dynamic body into a staging buffer and commits only
    /// when all of them stay finite.
    fn integrate_bodies(&mut self, dt: f64) -> Result<usize, PhysicsError> {
        let gravity = self.config.gravity;
        let mut staged = Vec::new();
        for (id, slot) in self.bodies.iter().enumerate() {
            let Some(body) = slot else { continue };
            if body.is_static() {
                continue;
            }
            let mut next = body.clone();
            integrate(&mut next, gravity, dt);
            if !next.is_finite() {
                warn!(body = id, "non-finite body state, aborting frame");
                return Err(PhysicsError::NonFiniteState(id as u32));
            }
            staged.push((id, next));
        }
        let integrated = staged.len();
        for (id, next) in staged {
            self.bodies[id] = Some(next);
        }
        Ok(integrated)
    }

    /// Refreshes the tracker set from this frame's candidate pairs. Trackers
    /// of pairs that are no longer candidates are dropped.
    fn broad_phase(&mut self, shapes: &[Option<Shape>]) -> usize {
        let proxies: Vec<BroadPhaseProxy> = self
            .colliders
            .iter()
            .zip(shapes)
            .enumerate()
            .filter_map(|(i, (slot, shape))| {
                let (collider, shape) = (slot.as_ref()?, shape.as_ref()?);
                Some(BroadPhaseProxy {
                    handle: ColliderHandle(i as u32),
                    body: collider.body,
                    bounds: shape.bounding_box(),
                    is_static: collider.is_static(self.body_of(collider)),
                    enabled: collider.enabled,
                    ignored: collider.ignores_collisions(),
                })
            })
            .collect();

        let pairs = candidate_pairs(&proxies);
        for key in &pairs {
            let is_trigger = self.is_trigger(key.first()) || self.is_trigger(key.second());
            let listener = self.listeners.entry(*key).or_insert_with(|| CollisionListener::new(*key, is_trigger));
            listener.broad_phase = true;
            listener.is_trigger = is_trigger;
        }

        let events = &mut self.events;
        self.listeners.retain(|key, listener| {
            if listener.broad_phase {
                return true;
            }
            if listener.was_colliding {
                events.push(CollisionEvent { pair: *key, phase: CollisionPhase::Exit, trigger: listener.is_trigger });
            }
            false
        });
        pairs.len()
    }

    fn run_narrow_phase(&mut self, shapes: &[Option<Shape>]) {
        for (key, listener) in self.listeners.iter_mut() {
            let (i, j) = (key.first().0 as usize, key.second().0 as usize);
            let (Some(Some(shape_a)), Some(Some(shape_b))) = (shapes.get(i), shapes.get(j)) else {
                continue;
            };
            listener.manifold = self.narrow_phase.collide(shape_a, shape_b);
            let Some(manifold) = &listener.manifold else {
                continue;
            };
            self.stats.manifolds += 1;
            if listener.is_trigger {
                continue;
            }

            let vetoed = match (self.colliders.get(i), self.colliders.get(j), self.filter.as_mut()) {
                (Some(Some(a)), Some(Some(b)), Some(filter)) => filter.ignore_collision(a, b, manifold),
                _ => false,
            };
            if vetoed {
                raise_veto(&mut self.colliders, [i, j]);
            }
            if consume_veto(&mut self.colliders, [i, j]) {
                trace!(a = i, b = j, "contact vetoed for this frame");
                continue;
            }
            let (Some(Some(a)), Some(Some(b))) = (self.colliders.get(i), self.colliders.get(j)) else {
                continue;
            };
            self.contacts.push(self.solver.contact(*key, a, b, manifold.clone()));
        }
    }

    fn collect_events(&mut self) {
        for (key, listener) in &self.listeners {
            if let Some(phase) = listener.phase() {
                self.events.push(CollisionEvent { pair: *key, phase, trigger: listener.is_trigger });
            }
        }
    }

    fn is_trigger(&self, handle: ColliderHandle) -> bool {
        self.collider(handle).is_some_and(|c| c.is_trigger)
    }
}

fn raise_veto(colliders: &mut [Option<Collider>], pair: [usize; 2]) {
    for index in pair {
        if let Some(Some(collider)) = colliders.get_mut(index) {
            collider.ignore_current_collision = true;
        }
    }
}

/// Whether either collider of the pair carries a veto. The flags of both are
/// lowered, so a veto covers a single pair.
fn consume_veto(colliders: &mut [Option<Collider>], pair: [usize; 2]) -> bool {
    let mut raised = false;
    for index in pair {
        if let Some(Some(collider)) = colliders.get_mut(index) {
            raised |= std::mem::take(&mut collider.ignore_current_collision);
        }
    }
    raised
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Circle, Rectangle};

    fn ball_at(world: &mut PhysicsWorld, position: Vec2) -> (BodyHandle, ColliderHandle) {
        let body = world.add_body(RigidBody::new(1.0).with_position(position));
        let collider = world.add_collider(Collider::new(Circle::new(Vec2::ZERO, 1.0).unwrap()).with_body(body));
        (body, collider)
    }

    #[test]
    fn test_handles_are_sequential_and_stable() {
        let mut world = PhysicsWorld::new();
        let (b0, c0) = ball_at(&mut world, Vec2::ZERO);
        let (b1, c1) = ball_at(&mut world, Vec2::new(5.0, 0.0));
        assert_eq!((b0, b1), (BodyHandle(0), BodyHandle(1)));
        assert_eq!((c0, c1), (ColliderHandle(0), ColliderHandle(1)));

        assert!(world.remove_body(b0).is_some());
        assert!(world.collider(c0).is_none());
        assert!(world.body(b1).is_some());
        assert!(world.remove_body(b0).is_none());
        assert!(world.remove_collider(ColliderHandle(99)).is_none());
    }

    #[test]
    fn test_first_collider_sets_inertia() {
        let mut world = PhysicsWorld::new();
        let body = world.add_body(RigidBody::new(2.0));
        world.add_collider(Collider::new(Circle::new(Vec2::ZERO, 1.0).unwrap()).with_body(body));
        world.add_collider(Collider::new(Circle::new(Vec2::ZERO, 10.0).unwrap()).with_body(body));
        assert!((world.body(body).unwrap().inertia() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_step_rejects_non_finite_dt() {
        let mut world = PhysicsWorld::new();
        assert!(matches!(world.step(f64::NAN), Err(PhysicsError::InvalidTimeStep(_))));
        assert!(world.step(0.0).is_ok());
        assert!(world.step(-1.0).is_ok());
    }

    #[test]
    fn test_zero_dt_leaves_bodies_alone() {
        let mut world = PhysicsWorld::new();
        let (body, _) = ball_at(&mut world, Vec2::new(0.0, 3.0));
        world.step(0.0).unwrap();
        assert_eq!(world.body(body).unwrap().position(), Vec2::new(0.0, 3.0));
        assert_eq!(world.stats(), StepStats::default());
    }

    #[test]
    fn test_non_finite_state_aborts_frame() {
        let mut world = PhysicsWorld::new();
        let (body, _) = ball_at(&mut world, Vec2::ZERO);
        world.body_mut(body).unwrap().velocity = Vec2::new(f64::INFINITY, 0.0);
        assert!(matches!(world.step(0.1), Err(PhysicsError::NonFiniteState(0))));
    }

    #[test]
    fn test_aborted_frame_moves_no_body() {
        let mut world = PhysicsWorld::new();
        world.add_collider(Collider::new(Rectangle::new(Vec2::new(0.0, -0.5), Vec2::new(10.0, 1.0), 0.0).unwrap()));
        let (healthy, _) = ball_at(&mut world, Vec2::new(0.0, 0.99));
        world.step(1.0 / 60.0).unwrap();
        assert_eq!(world.manifolds().count(), 1);

        let (broken, _) = ball_at(&mut world, Vec2::new(20.0, 0.0));
        world.body_mut(broken).unwrap().velocity = Vec2::new(f64::INFINITY, 0.0);
        let before = world.body(healthy).unwrap().clone();
        for _ in 0..120 {
            assert!(matches!(world.step(1.0 / 60.0), Err(PhysicsError::NonFiniteState(1))));
        }
        assert_eq!(world.body(healthy).unwrap(), &before);
        assert_eq!(world.manifolds().count(), 0);
        assert!(world.contacts().is_empty());

        world.remove_body(broken);
        world.step(1.0 / 60.0).unwrap();
        assert_eq!(world.manifolds().count(), 1);
        assert!(world.body(healthy).unwrap().position().y > 0.9);
    }

    #[test]
    fn test_contact_filter_vetoes_resolution() {
        let mut world = PhysicsWorld::with_config(WorldConfig { gravity: Vec2::ZERO, ..WorldConfig::default() });
        let (body, _) = ball_at(&mut world, Vec2::new(0.0, 0.9));
        world.body_mut(body).unwrap().velocity = Vec2::new(0.0, -1.0);
        world.add_collider(Collider::new(Rectangle::new(Vec2::new(0.0, -0.5), Vec2::new(10.0, 1.0), 0.0).unwrap()));
        world.set_contact_filter(|_: &Collider, _: &Collider, _: &Manifold| true);

        world.step(1.0 / 60.0).unwrap();
        assert_eq!(world.manifolds().count(), 1);
        assert!(world.contacts().is_empty());
        assert_eq!(world.stats().solver_invocations, 0);
        assert!(world.colliders().all(|(_, c)| !c.ignore_current_collision()));
        assert!(world.body(body).unwrap().velocity.y < 0.0);

        world.clear_contact_filter();
        world.step(1.0 / 60.0).unwrap();
        assert_eq!(world.stats().solver_invocations, 1);
    }

    #[test]
    fn test_veto_is_consumed_by_one_pair() {
        let mut colliders: Vec<Option<Collider>> =
            (0..3).map(|_| Some(Collider::new(Circle::new(Vec2::ZERO, 1.0).unwrap()))).collect();
        raise_veto(&mut colliders, [0, 1]);
        assert!(colliders[0].as_ref().unwrap().ignore_current_collision());
        assert!(colliders[1].as_ref().unwrap().ignore_current_collision());

        assert!(consume_veto(&mut colliders, [1, 0]));
        assert!(colliders.iter().flatten().all(|c| !c.ignore_current_collision()));
        assert!(!consume_veto(&mut colliders, [0, 2]));

        // One raised side is enough.
        colliders[2].as_mut().unwrap().ignore_current_collision = true;
        assert!(consume_veto(&mut colliders, [0, 2]));
        assert!(!colliders[2].as_ref().unwrap().ignore_current_collision());
    }

    #[test]
    fn test_world_raycast_picks_nearest() {
        let mut world = PhysicsWorld::new();
        ball_at(&mut world, Vec2::new(10.0, 0.0));
        let (_, near) = ball_at(&mut world, Vec2::new(5.0, 0.0));
        let ray = Ray::new(Vec2::ZERO, Vec2::RIGHT).unwrap();
        let (handle, hit) = world.raycast(&ray, 0.0).unwrap();
        assert_eq!(handle, near);
        assert!((hit.distance - 4.0).abs() < 1e-9);
        assert!(world.raycast(&ray, 3.0).is_none());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut world = PhysicsWorld::new();
        ball_at(&mut world, Vec2::ZERO);
        ball_at(&mut world, Vec2::new(1.0, 0.0));
        world.step(1.0 / 60.0).unwrap();
        assert!(world.listeners().count() > 0);

        world.clear();
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.collider_count(), 0);
        assert_eq!(world.listeners().count(), 0);
        assert!(world.events().is_empty());
    }
}
