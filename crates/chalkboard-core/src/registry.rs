//! Body registry
//!
//! Tracks every body the simulation created, partitioned into the wall list
//! (strokes), the entity list (everything spawned) and unlisted bodies
//! (ground). Registration and removal always touch the physics world in the
//! same call, so the registry never refers to a body the world has dropped.

use ahash::AHashMap;
use glam::Vec2;
use rapier2d::prelude::RigidBodyHandle;

use crate::entity::{EntityBlueprint, EntityKind};
use crate::humanoid::HumanoidRecord;
use crate::physics::PhysicsWorld;
use crate::render::RenderStyle;
use crate::types::EntityId;

/// Which list a body belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyList {
    /// Drawn strokes, eligible for erasure and humanoid probes
    Wall,
    /// Spawned entities
    Entity,
    /// Tracked but in neither list (ground)
    Unlisted,
}

#[derive(Debug, Clone)]
pub struct RegisteredBody {
    pub handle: RigidBodyHandle,
    pub kind: EntityKind,
    pub style: RenderStyle,
    pub list: BodyList,
}

/// What a removal took out of the registry
#[derive(Debug, Clone)]
pub struct RemovedBody {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Last position before removal
    pub position: Option<Vec2>,
    pub humanoid: Option<HumanoidRecord>,
}

#[derive(Debug, Default)]
pub struct BodyRegistry {
    bodies: AHashMap<EntityId, RegisteredBody>,
    by_handle: AHashMap<RigidBodyHandle, EntityId>,
    walls: Vec<EntityId>,
    entities: Vec<EntityId>,
    unlisted: Vec<EntityId>,
    humanoids: Vec<HumanoidRecord>,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a blueprint into the world and the given list
    pub fn insert(&mut self, physics: &mut PhysicsWorld, blueprint: EntityBlueprint, list: BodyList) -> EntityId {
        let id = EntityId::new();
        let handle = physics.insert(blueprint.body, blueprint.colliders);

        self.bodies.insert(
            id,
            RegisteredBody {
                handle,
                kind: blueprint.kind,
                style: blueprint.style,
                list,
            },
        );
        self.by_handle.insert(handle, id);
        match list {
            BodyList::Wall => self.walls.push(id),
            BodyList::Entity => self.entities.push(id),
            BodyList::Unlisted => self.unlisted.push(id),
        }

        log::trace!("Registry: inserted {} into {:?}", id, list);
        id
    }

    /// Insert a humanoid body into the entity list and create its AI record
    pub fn insert_humanoid(
        &mut self,
        physics: &mut PhysicsWorld,
        blueprint: EntityBlueprint,
        direction: f32,
    ) -> EntityId {
        let id = self.insert(physics, blueprint, BodyList::Entity);
        self.humanoids.push(HumanoidRecord::new(id, direction));
        id
    }

    /// Remove a body from the world and from every list. Returns `None` if unknown.
    pub fn remove(&mut self, physics: &mut PhysicsWorld, id: EntityId) -> Option<RemovedBody> {
        let body = self.bodies.remove(&id)?;
        let position = physics.position(body.handle);
        physics.remove(body.handle);
        self.by_handle.remove(&body.handle);

        match body.list {
            BodyList::Wall => self.walls.retain(|w| *w != id),
            BodyList::Entity => self.entities.retain(|e| *e != id),
            BodyList::Unlisted => self.unlisted.retain(|u| *u != id),
        }

        let humanoid = self
            .humanoids
            .iter()
            .position(|h| h.entity == id)
            .map(|index| self.humanoids.remove(index));

        log::trace!("Registry: removed {} ({})", id, body.kind.tag());
        Some(RemovedBody {
            id,
            kind: body.kind,
            position,
            humanoid,
        })
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.bodies.contains_key(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&RegisteredBody> {
        self.bodies.get(&id)
    }

    pub fn handle(&self, id: EntityId) -> Option<RigidBodyHandle> {
        self.bodies.get(&id).map(|b| b.handle)
    }

    pub fn kind(&self, id: EntityId) -> Option<&EntityKind> {
        self.bodies.get(&id).map(|b| &b.kind)
    }

    pub fn kind_mut(&mut self, id: EntityId) -> Option<&mut EntityKind> {
        self.bodies.get_mut(&id).map(|b| &mut b.kind)
    }

    pub fn id_for_handle(&self, handle: RigidBodyHandle) -> Option<EntityId> {
        self.by_handle.get(&handle).copied()
    }

    pub fn walls(&self) -> &[EntityId] {
        &self.walls
    }

    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// Every tracked id: unlisted first, then walls, then entities
    pub fn all_ids(&self) -> Vec<EntityId> {
        self.unlisted
            .iter()
            .chain(&self.walls)
            .chain(&self.entities)
            .copied()
            .collect()
    }

    /// Ids whose kind matches the predicate, in list order
    pub fn ids_where(&self, predicate: impl Fn(&EntityKind) -> bool) -> Vec<EntityId> {
        self.all_ids()
            .into_iter()
            .filter(|id| self.kind(*id).is_some_and(&predicate))
            .collect()
    }

    pub fn humanoids(&self) -> &[HumanoidRecord] {
        &self.humanoids
    }

    pub fn humanoid(&self, id: EntityId) -> Option<&HumanoidRecord> {
        self.humanoids.iter().find(|h| h.entity == id)
    }

    pub fn humanoid_mut(&mut self, id: EntityId) -> Option<&mut HumanoidRecord> {
        self.humanoids.iter_mut().find(|h| h.entity == id)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Every registered body exists in the world and every record has a body
    pub fn is_consistent(&self, physics: &PhysicsWorld) -> bool {
        self.bodies.values().all(|b| physics.contains(b.handle))
            && self.humanoids.iter().all(|h| {
                self.kind(h.entity)
                    .is_some_and(|k| matches!(k, EntityKind::Humanoid))
            })
            && self.walls.len() + self.entities.len() + self.unlisted.len() == self.bodies.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityFactory;

    fn world() -> PhysicsWorld {
        PhysicsWorld::new(Vec2::new(0.0, 980.0), 1.0 / 60.0)
    }

    #[test]
    fn test_insert_registers_in_world_and_list() {
        let mut physics = world();
        let mut registry = BodyRegistry::new();

        let wall = registry.insert(
            &mut physics,
            EntityFactory::create_wall_segment(Vec2::new(10.0, 10.0), 3.0),
            BodyList::Wall,
        );
        let ball = registry.insert(
            &mut physics,
            EntityFactory::create_ball(Vec2::new(50.0, 10.0), 10.0),
            BodyList::Entity,
        );

        assert_eq!(registry.walls(), &[wall]);
        assert_eq!(registry.entities(), &[ball]);
        assert_eq!(physics.body_count(), 2);
        assert!(registry.is_consistent(&physics));

        let handle = registry.handle(ball).unwrap();
        assert_eq!(registry.id_for_handle(handle), Some(ball));
    }

    #[test]
    fn test_remove_humanoid_drops_record() {
        let mut physics = world();
        let mut registry = BodyRegistry::new();
        let id = registry.insert_humanoid(
            &mut physics,
            EntityFactory::create_humanoid(Vec2::new(100.0, 100.0)),
            -1.0,
        );
        assert_eq!(registry.humanoids().len(), 1);
        assert_eq!(registry.humanoid(id).unwrap().direction, -1.0);

        let removed = registry.remove(&mut physics, id).unwrap();
        assert!(removed.humanoid.is_some());
        assert_eq!(removed.position, Some(Vec2::new(100.0, 100.0)));
        assert!(registry.humanoids().is_empty());
        assert!(registry.entities().is_empty());
        assert_eq!(physics.body_count(), 0);
    }

    #[test]
    fn test_remove_unknown_is_none() {
        let mut physics = world();
        let mut registry = BodyRegistry::new();
        let id = registry.insert(
            &mut physics,
            EntityFactory::create_coin(Vec2::ZERO),
            BodyList::Entity,
        );
        assert!(registry.remove(&mut physics, id).is_some());
        assert!(registry.remove(&mut physics, id).is_none());
        assert!(registry.is_consistent(&physics));
    }

    #[test]
    fn test_ids_where_filters_by_kind() {
        let mut physics = world();
        let mut registry = BodyRegistry::new();
        registry.insert(
            &mut physics,
            EntityFactory::create_ground(800.0, 600.0, 20.0),
            BodyList::Unlisted,
        );
        let ladder = registry.insert(
            &mut physics,
            EntityFactory::create_ladder(Vec2::new(200.0, 500.0)),
            BodyList::Entity,
        );

        let ladders = registry.ids_where(|k| matches!(k, EntityKind::Ladder));
        assert_eq!(ladders, vec![ladder]);
        assert_eq!(registry.all_ids().len(), 2);
    }
}
