//! rapier2d world wrapper.
//!
//! [`PhysicsWorld`] owns every rapier set and pipeline needed to step a 2D
//! simulation, plus a debug-render pipeline whose output is exposed as a
//! [`DebugRenderBuffer`]. Game code talks to it in terms of handles and
//! [`glam::Vec2`]; rapier types do not leak beyond the handle types.
//!
//! Each frame the driver calls, in order:
//!
//! 1. [`set_translation`](PhysicsWorld::set_translation) for kinematic bodies.
//! 2. [`step`](PhysicsWorld::step), exactly once.
//! 3. [`contacts_with`](PhysicsWorld::contacts_with) to enumerate touches.
//! 4. [`debug_render`](PhysicsWorld::debug_render) for drawing.

use std::collections::HashMap;

use glam::Vec2;
use rapier2d::pipeline::{DebugRenderMode, DebugRenderPipeline, DebugRenderStyle};
use rapier2d::prelude::*;

use crate::debug::{DebugLineCollector, DebugLineSource, DebugRenderBuffer};
use crate::error::PhysicsError;

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

/// Description of an axis-aligned box collider and its body.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CuboidDesc {
    /// Name reported by [`PhysicsWorld::label`].
    pub label: Option<String>,
    /// Half extents along x and y.
    pub half_extents: Vec2,
    /// Initial centre position.
    pub translation: Vec2,
    /// Coefficient of restitution.
    pub restitution: f32,
    /// Friction coefficient.
    pub friction: f32,
    /// Initial linear velocity (dynamic bodies only).
    pub linvel: Vec2,
    /// Prevent the body from rotating.
    pub lock_rotations: bool,
    /// Allow the body to fall asleep when at rest.
    pub can_sleep: bool,
    /// Report collision start/stop events for this collider.
    pub collision_events: bool,
}

impl CuboidDesc {
    /// A box with the given half extents centred at `translation`.
    pub fn new(half_extents: Vec2, translation: Vec2) -> Self {
        Self {
            label: None,
            half_extents,
            translation,
            restitution: 0.0,
            friction: 0.5,
            linvel: Vec2::ZERO,
            lock_rotations: false,
            can_sleep: true,
            collision_events: false,
        }
    }

    /// Attach a label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the restitution.
    pub fn restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    /// Set the friction.
    pub fn friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    /// Set the initial linear velocity.
    pub fn linvel(mut self, linvel: Vec2) -> Self {
        self.linvel = linvel;
        self
    }

    /// Lock rotations.
    pub fn lock_rotations(mut self) -> Self {
        self.lock_rotations = true;
        self
    }

    /// Keep the body awake forever.
    pub fn never_sleep(mut self) -> Self {
        self.can_sleep = false;
        self
    }

    /// Enable collision events.
    pub fn collision_events(mut self) -> Self {
        self.collision_events = true;
        self
    }

    /// Build the collider, offset from its parent (or the world origin).
    fn collider(&self, offset: Vec2) -> Collider {
        let mut builder = ColliderBuilder::cuboid(self.half_extents.x, self.half_extents.y)
            .translation(vector![offset.x, offset.y])
            .restitution(self.restitution)
            .friction(self.friction);
        if self.collision_events {
            builder = builder.active_events(ActiveEvents::COLLISION_EVENTS);
        }
        builder.build()
    }
}

/// Handles of an object created in a [`PhysicsWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsObject {
    /// The rigid body, absent for free-standing fixed colliders.
    pub body: Option<RigidBodyHandle>,
    /// The collider.
    pub collider: ColliderHandle,
}

impl PhysicsObject {
    /// The rigid body handle.
    ///
    /// # Errors
    ///
    /// [`PhysicsError::UnknownCollider`] if the object has no body.
    pub fn body(&self) -> Result<RigidBodyHandle, PhysicsError> {
        self.body.ok_or(PhysicsError::UnknownCollider(self.collider))
    }
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// A rapier2d simulation with debug-line output.
pub struct PhysicsWorld {
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_params: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    debug_pipeline: DebugRenderPipeline,
    debug_lines: DebugLineCollector,
    /// Collider names, used to identify contact partners.
    labels: HashMap<ColliderHandle, String>,
    step_count: u64,
}

impl PhysicsWorld {
    /// Create a world with the given gravity.
    pub fn new(gravity: Vec2) -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: vector![gravity.x, gravity.y],
            integration_params: IntegrationParameters::default(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            debug_pipeline: DebugRenderPipeline::new(
                DebugRenderStyle::default(),
                DebugRenderMode::COLLIDER_SHAPES,
            ),
            debug_lines: DebugLineCollector::default(),
            labels: HashMap::new(),
            step_count: 0,
        }
    }

    /// Create a world without gravity (top-down games such as pong).
    pub fn new_zero_gravity() -> Self {
        Self::new(Vec2::ZERO)
    }

    /// Set the integration step used by [`step`](Self::step).
    pub fn set_timestep(&mut self, dt: f32) {
        self.integration_params.dt = dt;
    }

    /// Integration step in seconds.
    pub fn timestep(&self) -> f32 {
        self.integration_params.dt
    }

    /// Insert a collider with no rigid body. It never moves.
    pub fn add_fixed_cuboid(&mut self, desc: &CuboidDesc) -> PhysicsObject {
        let handle = self.collider_set.insert(desc.collider(desc.translation));
        self.remember_label(handle, desc);
        PhysicsObject {
            body: None,
            collider: handle,
        }
    }

    /// Insert a position-driven kinematic body with a box collider.
    pub fn add_kinematic_cuboid(&mut self, desc: &CuboidDesc) -> PhysicsObject {
        let rb = RigidBodyBuilder::kinematic_position_based()
            .translation(vector![desc.translation.x, desc.translation.y])
            .build();
        self.insert_with_body(rb, desc)
    }

    /// Insert a fully simulated body with a box collider.
    pub fn add_dynamic_cuboid(&mut self, desc: &CuboidDesc) -> PhysicsObject {
        let mut builder = RigidBodyBuilder::dynamic()
            .translation(vector![desc.translation.x, desc.translation.y])
            .linvel(vector![desc.linvel.x, desc.linvel.y])
            .can_sleep(desc.can_sleep);
        if desc.lock_rotations {
            builder = builder.lock_rotations();
        }
        self.insert_with_body(builder.build(), desc)
    }

    fn insert_with_body(&mut self, rb: RigidBody, desc: &CuboidDesc) -> PhysicsObject {
        let body = self.rigid_body_set.insert(rb);
        let collider =
            self.collider_set
                .insert_with_parent(desc.collider(Vec2::ZERO), body, &mut self.rigid_body_set);
        self.remember_label(collider, desc);
        PhysicsObject {
            body: Some(body),
            collider,
        }
    }

    fn remember_label(&mut self, collider: ColliderHandle, desc: &CuboidDesc) {
        if let Some(label) = &desc.label {
            self.labels.insert(collider, label.clone());
        }
    }

    /// Advance the simulation by one integration step.
    pub fn step(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
        self.step_count += 1;
    }

    /// Number of completed [`step`](Self::step) calls.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Visit every collider currently in active contact with `collider`.
    ///
    /// Partners are visited in ascending handle order so repeated runs
    /// observe the same sequence.
    pub fn contacts_with(&self, collider: ColliderHandle, mut visit: impl FnMut(ColliderHandle)) {
        let mut partners: Vec<ColliderHandle> = self
            .narrow_phase
            .contact_pairs_with(collider)
            .filter(|pair| pair.has_any_active_contact)
            .map(|pair| {
                if pair.collider1 == collider {
                    pair.collider2
                } else {
                    pair.collider1
                }
            })
            .collect();
        partners.sort_by_key(|h| h.into_raw_parts());
        for other in partners {
            visit(other);
        }
    }

    /// Current centre of a body.
    ///
    /// # Errors
    ///
    /// [`PhysicsError::UnknownBody`] if the handle is stale.
    pub fn translation(&self, body: RigidBodyHandle) -> Result<Vec2, PhysicsError> {
        let rb = self
            .rigid_body_set
            .get(body)
            .ok_or(PhysicsError::UnknownBody(body))?;
        let t = rb.translation();
        Ok(Vec2::new(t.x, t.y))
    }

    /// Move a kinematic body. The move takes effect on the next step, which
    /// lets the solver derive the body's velocity for contact response.
    ///
    /// # Errors
    ///
    /// [`PhysicsError::UnknownBody`] for a stale handle,
    /// [`PhysicsError::NotKinematic`] for dynamic or fixed bodies.
    pub fn set_translation(&mut self, body: RigidBodyHandle, position: Vec2) -> Result<(), PhysicsError> {
        let rb = self
            .rigid_body_set
            .get_mut(body)
            .ok_or(PhysicsError::UnknownBody(body))?;
        if !rb.is_kinematic() {
            return Err(PhysicsError::NotKinematic(body));
        }
        rb.set_next_kinematic_translation(vector![position.x, position.y]);
        Ok(())
    }

    /// Linear velocity of a body.
    ///
    /// # Errors
    ///
    /// [`PhysicsError::UnknownBody`] if the handle is stale.
    pub fn linvel(&self, body: RigidBodyHandle) -> Result<Vec2, PhysicsError> {
        let rb = self
            .rigid_body_set
            .get(body)
            .ok_or(PhysicsError::UnknownBody(body))?;
        let v = rb.linvel();
        Ok(Vec2::new(v.x, v.y))
    }

    /// Replace the linear velocity of a body and wake it.
    ///
    /// # Errors
    ///
    /// [`PhysicsError::UnknownBody`] if the handle is stale.
    pub fn set_linvel(&mut self, body: RigidBodyHandle, linvel: Vec2) -> Result<(), PhysicsError> {
        let rb = self
            .rigid_body_set
            .get_mut(body)
            .ok_or(PhysicsError::UnknownBody(body))?;
        rb.set_linvel(vector![linvel.x, linvel.y], true);
        Ok(())
    }

    /// Label given to a collider at creation.
    pub fn label(&self, collider: ColliderHandle) -> Option<&str> {
        self.labels.get(&collider).map(String::as_str)
    }

    /// Run rapier's debug-render pipeline and return the resulting lines.
    pub fn debug_render(&mut self) -> &DebugRenderBuffer {
        self.debug_lines.reset();
        self.debug_pipeline.render(
            &mut self.debug_lines,
            &self.rigid_body_set,
            &self.collider_set,
            &self.impulse_joint_set,
            &self.multibody_joint_set,
            &self.narrow_phase,
        );
        tracing::trace!(
            segments = self.debug_lines.buffer().segment_count(),
            "debug render buffer rebuilt"
        );
        self.debug_lines.buffer()
    }

    /// Number of rigid bodies.
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    /// Number of colliders, including free-standing ones.
    pub fn collider_count(&self) -> usize {
        self.collider_set.len()
    }
}

impl DebugLineSource for PhysicsWorld {
    fn debug_lines(&mut self) -> Result<&DebugRenderBuffer, PhysicsError> {
        Ok(self.debug_render())
    }
}

impl std::fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("bodies", &self.rigid_body_set.len())
            .field("colliders", &self.collider_set.len())
            .field("step_count", &self.step_count)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
