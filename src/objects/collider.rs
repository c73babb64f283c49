use std::collections::BTreeSet;

use super::rigid_body::RigidBody;
use super::BodyHandle;
use crate::collision::AABB;
use crate::common::Material;
use crate::math::Transform;
use crate::shapes::{Geometry, Shape};

/// Colliders carrying this tag are skipped by the broad phase.
pub const IGNORE_COLLISIONS_TAG: &str = "Ignore Collisions";

/// A shape taking part in collision detection.
///
/// The shape is described in the collider's local frame. Attached colliders
/// follow their body's transform composed with `offset`; detached colliders
/// are static and use `transform` instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    pub shape: Shape,
    pub offset: Transform,
    pub body: Option<BodyHandle>,
    pub transform: Transform,
    pub material: Material,
    /// Detected and reported, but never resolved.
    pub is_trigger: bool,
    pub enabled: bool,
    tags: BTreeSet<String>,
    pub(crate) collision_resolved: bool,
    pub(crate) ignore_current_collision: bool,
}

impl Collider {
    pub fn new(shape: impl Into<Shape>) -> Self {
        Collider {
            shape: shape.into(),
            offset: Transform::identity(),
            body: None,
            transform: Transform::identity(),
            material: Material::default(),
            is_trigger: false,
            enabled: true,
            tags: BTreeSet::new(),
            collision_resolved: false,
            ignore_current_collision: false,
        }
    }

    pub fn with_body(mut self, body: BodyHandle) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_offset(mut self, offset: Transform) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = Material::new(material.bounce, material.friction);
        self
    }

    pub fn with_bounce(mut self, bounce: f64) -> Self {
        self.set_bounce(bounce);
        self
    }

    pub fn with_friction(mut self, friction: f64) -> Self {
        self.material = Material::new(self.material.bounce, friction);
        self
    }

    pub fn as_trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.add_tag(tag);
        self
    }

    pub fn bounce(&self) -> f64 {
        self.material.bounce
    }

    /// Sets restitution, clamped to [0, 1].
    pub fn set_bounce(&mut self, bounce: f64) {
        self.material = Material::new(bounce, self.material.friction);
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        self.tags.insert(tag.into());
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn ignores_collisions(&self) -> bool {
        self.has_tag(IGNORE_COLLISIONS_TAG)
    }

    /// Set once the solver has handled a contact involving this collider in the
    /// current frame.
    pub fn collision_resolved(&self) -> bool {
        self.collision_resolved
    }

    /// Set while this frame's response for the collider is vetoed.
    pub fn ignore_current_collision(&self) -> bool {
        self.ignore_current_collision
    }

    pub(crate) fn clear_frame_flags(&mut self) {
        self.collision_resolved = false;
        self.ignore_current_collision = false;
    }

    /// Static when detached, or when the attached body has infinite mass.
    pub fn is_static(&self, body: Option<&RigidBody>) -> bool {
        body.map_or(true, RigidBody::is_static)
    }

    pub fn world_transform(&self, body: Option<&RigidBody>) -> Transform {
        match body {
            Some(b) => b.transform.compose(self.offset),
            None => self.transform.compose(self.offset),
        }
    }

    pub fn world_shape(&self, body: Option<&RigidBody>) -> Shape {
        self.shape.transformed(&self.world_transform(body))
    }

    pub fn bounding_box(&self, body: Option<&RigidBody>) -> AABB {
        self.world_shape(body).bounding_box()
    }

    /// The shape expressed in the attached body's frame, used to derive inertia.
    pub(crate) fn body_local_shape(&self) -> Shape {
        self.shape.transformed(&self.offset)
    }
}
