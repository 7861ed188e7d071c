//! Rigid body physics world backed by rapier2d
//!
//! The simulation treats rapier as an opaque collaborator: it inserts and
//! removes bodies, steps the pipeline, and asks geometric questions about
//! specific bodies. Point and bounds queries are answered per body from the
//! body's current pose, so they stay correct right after a teleport or an
//! insertion that has not been stepped yet.

use glam::Vec2;
use rapier2d::crossbeam::channel::{Receiver, unbounded};
use rapier2d::parry::bounding_volume::Aabb;
use rapier2d::parry::query::PointQuery;
use rapier2d::parry::shape::Shape;
use rapier2d::prelude::*;

/// Axis-aligned bounds in screen space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Smallest bounds enclosing both
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

pub fn to_vector(v: Vec2) -> Vector<Real> {
    vector![v.x, v.y]
}

pub fn to_vec2(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

fn to_bounds(aabb: &Aabb) -> Bounds {
    Bounds::new(
        Vec2::new(aabb.mins.x, aabb.mins.y),
        Vec2::new(aabb.maxs.x, aabb.maxs.y),
    )
}

/// Manages the rapier2d physics world
pub struct PhysicsWorld {
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    pipeline: PhysicsPipeline,
    integration_parameters: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    gravity: Vector<Real>,
    event_handler: ChannelEventCollector,
    collision_recv: Receiver<CollisionEvent>,
    contact_force_recv: Receiver<ContactForceEvent>,
}

impl PhysicsWorld {
    /// Create an empty world with the given gravity (pixels/s^2) and step length
    pub fn new(gravity: Vec2, dt: f32) -> Self {
        let integration_parameters = IntegrationParameters {
            dt,
            ..Default::default()
        };

        let (collision_send, collision_recv) = unbounded();
        let (contact_force_send, contact_force_recv) = unbounded();

        log::debug!(
            "Physics: world created with gravity ({:.1}, {:.1}), dt={:.4}",
            gravity.x,
            gravity.y,
            dt
        );

        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            pipeline: PhysicsPipeline::new(),
            integration_parameters,
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            gravity: to_vector(gravity),
            event_handler: ChannelEventCollector::new(collision_send, contact_force_send),
            collision_recv,
            contact_force_recv,
        }
    }

    /// Insert a body and attach its colliders
    pub fn insert(&mut self, body: RigidBody, colliders: Vec<Collider>) -> RigidBodyHandle {
        let handle = self.rigid_body_set.insert(body);
        for collider in colliders {
            self.collider_set
                .insert_with_parent(collider, handle, &mut self.rigid_body_set);
        }
        handle
    }

    /// Remove a body together with its colliders. Returns false if it was already gone.
    pub fn remove(&mut self, handle: RigidBodyHandle) -> bool {
        self.rigid_body_set
            .remove(
                handle,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            )
            .is_some()
    }

    pub fn contains(&self, handle: RigidBodyHandle) -> bool {
        self.rigid_body_set.contains(handle)
    }

    pub fn body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.rigid_body_set.get(handle)
    }

    pub fn body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.rigid_body_set.get_mut(handle)
    }

    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    pub fn gravity(&self) -> Vec2 {
        to_vec2(&self.gravity)
    }

    /// Advance the simulation one step.
    ///
    /// Returns body pairs whose contact began during this step.
    pub fn step(&mut self) -> Vec<(RigidBodyHandle, RigidBodyHandle)> {
        let physics_hooks = ();

        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &physics_hooks,
            &self.event_handler,
        );

        // Contact forces are not consumed; keep the channel from growing
        while self.contact_force_recv.try_recv().is_ok() {}

        let mut started = Vec::new();
        while let Ok(event) = self.collision_recv.try_recv() {
            if let CollisionEvent::Started(c1, c2, _flags) = event {
                let b1 = self.collider_set.get(c1).and_then(|c| c.parent());
                let b2 = self.collider_set.get(c2).and_then(|c| c.parent());
                if let (Some(b1), Some(b2)) = (b1, b2) {
                    started.push((b1, b2));
                }
            }
        }
        started
    }

    pub fn position(&self, handle: RigidBodyHandle) -> Option<Vec2> {
        self.body(handle).map(|b| to_vec2(b.translation()))
    }

    pub fn velocity(&self, handle: RigidBodyHandle) -> Option<Vec2> {
        self.body(handle).map(|b| to_vec2(b.linvel()))
    }

    pub fn set_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec2) {
        if let Some(body) = self.body_mut(handle) {
            body.set_linvel(to_vector(velocity), true);
        }
    }

    /// Teleport a body, keeping its current rotation
    pub fn set_position(&mut self, handle: RigidBodyHandle, position: Vec2) {
        if let Some(body) = self.body_mut(handle) {
            body.set_translation(to_vector(position), true);
        }
    }

    pub fn is_dynamic(&self, handle: RigidBodyHandle) -> bool {
        self.body(handle).is_some_and(|b| b.is_dynamic())
    }

    /// Body mass, summed from the colliders when the body has not been stepped yet
    pub fn mass(&self, handle: RigidBodyHandle) -> Option<f32> {
        let body = self.body(handle)?;
        if body.mass() > 0.0 {
            return Some(body.mass());
        }
        Some(
            body.colliders()
                .iter()
                .filter_map(|h| self.collider_set.get(*h))
                .map(|c| c.mass())
                .sum(),
        )
    }

    /// Add a force consumed by the next step
    pub fn add_force(&mut self, handle: RigidBodyHandle, force: Vec2) {
        if let Some(body) = self.body_mut(handle) {
            body.add_force(to_vector(force), true);
        }
    }

    /// Clear the forces accumulated on every body
    pub fn reset_forces(&mut self) {
        for (_, body) in self.rigid_body_set.iter_mut() {
            body.reset_forces(false);
        }
    }

    /// Clamp the linear speed of every dynamic body
    pub fn clamp_velocities(&mut self, max_speed: f32) {
        for (_, body) in self.rigid_body_set.iter_mut() {
            if !body.is_dynamic() {
                continue;
            }
            let v = to_vec2(body.linvel());
            if v.length_squared() > max_speed * max_speed {
                body.set_linvel(to_vector(v.clamp_length_max(max_speed)), true);
            }
        }
    }

    /// Stop all rotation of a body
    pub fn set_angular_velocity(&mut self, handle: RigidBodyHandle, angvel: f32) {
        if let Some(body) = self.body_mut(handle) {
            body.set_angvel(angvel, true);
        }
    }

    pub fn angle(&self, handle: RigidBodyHandle) -> Option<f32> {
        self.body(handle).map(|b| b.rotation().angle())
    }

    /// Force the body upright and stop any spin
    pub fn pin_upright(&mut self, handle: RigidBodyHandle) {
        if let Some(body) = self.body_mut(handle) {
            let translation = *body.translation();
            body.set_position(Isometry::new(translation, 0.0), true);
            body.set_angvel(0.0, true);
        }
    }

    /// Replace the interaction groups of every collider on a body
    pub fn set_collision_groups(&mut self, handle: RigidBodyHandle, groups: InteractionGroups) {
        let Some(body) = self.rigid_body_set.get(handle) else {
            return;
        };
        for collider_handle in body.colliders().to_vec() {
            if let Some(collider) = self.collider_set.get_mut(collider_handle) {
                collider.set_collision_groups(groups);
            }
        }
    }

    /// Interaction groups of the first collider on a body
    pub fn collision_groups(&self, handle: RigidBodyHandle) -> Option<InteractionGroups> {
        let body = self.rigid_body_set.get(handle)?;
        let first = body.colliders().first()?;
        self.collider_set.get(*first).map(|c| c.collision_groups())
    }

    /// World-space pose of every collider attached to a body
    pub fn collider_poses(&self, handle: RigidBodyHandle) -> Vec<(Isometry<Real>, &Collider)> {
        let Some(body) = self.rigid_body_set.get(handle) else {
            return Vec::new();
        };
        body.colliders()
            .iter()
            .filter_map(|h| self.collider_set.get(*h))
            .map(|collider| {
                let local = collider
                    .position_wrt_parent()
                    .copied()
                    .unwrap_or_else(Isometry::identity);
                (*body.position() * local, collider)
            })
            .collect()
    }

    /// Bounding box over all colliders of a body
    pub fn bounds(&self, handle: RigidBodyHandle) -> Option<Bounds> {
        self.collider_poses(handle)
            .iter()
            .map(|(pose, collider)| to_bounds(&collider.shape().compute_aabb(pose)))
            .reduce(|a, b| a.union(&b))
    }

    /// Distance from a point to the closest collider of a body (0 when inside)
    pub fn distance_to_point(&self, handle: RigidBodyHandle, point: Vec2) -> Option<f32> {
        let pt = point![point.x, point.y];
        self.collider_poses(handle)
            .iter()
            .map(|(pose, collider)| collider.shape().distance_to_point(pose, &pt, true))
            .reduce(f32::min)
    }

    pub fn contains_point(&self, handle: RigidBodyHandle, point: Vec2) -> bool {
        self.distance_to_point(handle, point)
            .is_some_and(|d| d <= 0.0)
    }
}
