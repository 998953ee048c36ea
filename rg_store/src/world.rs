use std::sync::atomic::{AtomicU32, Ordering};

use log::{debug, trace};

use crate::{
    archetype::{ArchetypeGraph, ArchetypeId, ArchetypeStorage, Signature},
    builder::Builder,
    component::{ComponentRegistry, ComponentType},
    config::WorldConfig,
    entity::{Entity, EntityDirectory, EntityLocation},
    error::EntityError,
    query::{ComponentSet, Filter, Query},
    removal::RemovalQueue,
};

static WORLD_SEQ: AtomicU32 = AtomicU32::new(0);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct WorldId(u32);

///
/// World. Owns component registry, archetypes and entity directory and keeps them consistent
/// on every structural change.
///
pub struct World {
    id: WorldId,
    registry: ComponentRegistry,
    graph: ArchetypeGraph,
    directory: EntityDirectory,
    removals: RemovalQueue,
}

impl World {
    /// Creates world with entity directory pre-sized to `capacity_hint`
    pub fn new(capacity_hint: usize) -> Self {
        Self::with_config(WorldConfig::with_capacity_hint(capacity_hint))
    }

    pub fn with_config(config: WorldConfig) -> Self {
        World {
            id: WorldId(WORLD_SEQ.fetch_add(1, Ordering::Relaxed)),
            registry: ComponentRegistry::new(),
            graph: ArchetypeGraph::new(config.archetype_capacity),
            directory: EntityDirectory::with_capacity(config.capacity_hint),
            removals: RemovalQueue::with_capacity(config.removal_queue_capacity),
        }
    }

    #[inline(always)]
    pub(crate) fn id(&self) -> WorldId {
        self.id
    }

    #[inline]
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    #[inline]
    pub fn archetypes(&self) -> &ArchetypeGraph {
        &self.graph
    }

    #[inline]
    pub fn directory(&self) -> &EntityDirectory {
        &self.directory
    }

    #[inline]
    pub fn archetype(&self, id: ArchetypeId) -> Option<&ArchetypeStorage> {
        self.graph.get(id)
    }

    #[inline]
    pub fn archetype_count(&self) -> usize {
        self.graph.len()
    }

    ///
    /// Registers component type. Registering the same type again returns the same descriptor.
    ///
    #[inline]
    pub fn register<T>(&mut self) -> Result<ComponentType, EntityError>
    where
        T: Default + 'static,
    {
        self.registry.register::<T>()
    }

    #[inline]
    pub fn component_type<T>(&self) -> Result<ComponentType, EntityError>
    where
        T: 'static,
    {
        self.registry.get::<T>()
    }

    fn archetype_for<S>(&mut self) -> Result<ArchetypeId, EntityError>
    where
        S: ComponentSet,
    {
        let signature = Signature::new(S::component_ids(&self.registry)?);
        self.graph.get_or_create(signature, &self.registry)
    }

    ///
    /// Creates `count` default-initialized entities carrying the components of `S`.
    /// The target archetype is resolved once and its columns grow once.
    ///
    pub fn create_entities<S>(&mut self, count: usize) -> Result<Vec<Entity>, EntityError>
    where
        S: ComponentSet,
    {
        let archetype = self.archetype_for::<S>()?;
        self.spawn_batch(archetype, count)
    }

    pub fn create_entity<S>(&mut self) -> Result<Entity, EntityError>
    where
        S: ComponentSet,
    {
        let archetype = self.archetype_for::<S>()?;
        self.spawn(archetype)
    }

    /// Creates builder bound to the archetype of `S`
    pub fn create_builder<S>(&mut self) -> Result<Builder<S>, EntityError>
    where
        S: ComponentSet,
    {
        let archetype = self.archetype_for::<S>()?;
        Ok(Builder::new(self.id, archetype))
    }

    /// Creates filter over all archetypes having every component of `Q`
    pub fn create_filter<Q>(&self) -> Result<Filter<Q>, EntityError>
    where
        Q: Query,
    {
        Filter::new(self)
    }

    pub(crate) fn spawn_batch(
        &mut self,
        archetype: ArchetypeId,
        count: usize,
    ) -> Result<Vec<Entity>, EntityError> {
        let storage = self
            .graph
            .get_mut(archetype)
            .ok_or(EntityError::NoSuchArchetype(archetype))?;
        let entities = self
            .directory
            .allocate_batch(count, archetype, storage.row_count());
        let rows = storage.append(entities.iter().map(Entity::index));
        trace!("Created {count} entities in {archetype}, rows {rows:?}");
        Ok(entities)
    }

    pub(crate) fn spawn(&mut self, archetype: ArchetypeId) -> Result<Entity, EntityError> {
        let storage = self
            .graph
            .get_mut(archetype)
            .ok_or(EntityError::NoSuchArchetype(archetype))?;
        let entity = self
            .directory
            .allocate(EntityLocation::new(archetype, storage.row_count()));
        storage.add(entity.index());
        Ok(entity)
    }

    /// Current location of a live entity
    #[inline]
    pub fn resolve(&self, entity: Entity) -> Option<EntityLocation> {
        self.directory.resolve(entity)
    }

    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.directory.is_alive(entity)
    }

    /// Number of live entities
    #[inline]
    pub fn len(&self) -> usize {
        self.directory.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.directory.is_empty()
    }

    /// Number of entities waiting for [`World::process_removals`]
    #[inline]
    pub fn pending_removals(&self) -> usize {
        self.removals.len()
    }

    ///
    /// Removes entity immediately (swap-remove). Must not be called while a filter is iterating
    /// the entity's archetype.
    ///
    pub fn remove_entity(&mut self, entity: Entity) -> Result<(), EntityError> {
        let location = self
            .directory
            .resolve(entity)
            .ok_or(EntityError::StaleEntity(entity))?;
        let storage = self
            .graph
            .get_mut(location.archetype)
            .ok_or(EntityError::NoSuchArchetype(location.archetype))?;
        if let Some(moved) = storage.remove(location.row()) {
            self.directory.relocate(moved, location);
        }
        self.directory.free(entity);
        Ok(())
    }

    ///
    /// Marks entities for removal. They stop resolving at once, their rows stay in storage
    /// (and visible to filters) until [`World::process_removals`]. Returns number of entities queued,
    /// stale and already queued handles are skipped.
    ///
    pub fn remove_entities(&mut self, entities: &[Entity]) -> usize {
        let mut queued = 0;
        for entity in entities {
            if self.directory.mark_pending(*entity).is_some() {
                self.removals.push(*entity);
                queued += 1;
            }
        }
        queued
    }

    ///
    /// Compacts rows of all queued entities out of their archetypes, highest row first within
    /// each archetype, then frees their slots. Returns number of removed rows.
    ///
    pub fn process_removals(&mut self) -> usize {
        let mut removed = 0;
        for batch in self.removals.drain_plan(&self.directory) {
            let Some(storage) = self.graph.get_mut(batch.archetype) else {
                continue;
            };
            for (row, index) in batch.rows {
                debug_assert_eq!(Some(index), storage.entity_at(row));
                if let Some(moved) = storage.remove(row) {
                    self.directory
                        .relocate(moved, EntityLocation::new(batch.archetype, row));
                }
                self.directory.release(index);
                removed += 1;
            }
        }
        if removed > 0 {
            debug!("Processed {removed} removals");
        }
        removed
    }

    ///
    /// Gets the value of component of specified entity.
    ///
    pub fn get<T, F, R>(&self, entity: Entity, consumer: F) -> Option<R>
    where
        T: Default + 'static,
        F: FnOnce(&T) -> R,
    {
        let id = self.registry.id_of::<T>().ok()?;
        let location = self.directory.resolve(entity)?;
        let value = self.graph.get(location.archetype)?.get::<T>(id, location.row())?;
        Some(consumer(&*value))
    }

    /// Mutates the value of component of specified entity in place
    pub fn update<T, F, R>(&mut self, entity: Entity, f: F) -> Option<R>
    where
        T: Default + 'static,
        F: FnOnce(&mut T) -> R,
    {
        let id = self.registry.id_of::<T>().ok()?;
        let location = self.directory.resolve(entity)?;
        let value = self
            .graph
            .get_mut(location.archetype)?
            .get_mut::<T>(id, location.row())?;
        Some(f(value))
    }

    ///
    /// Sets component on specified entity.
    /// Entity will be moved to another (possibly new) archetype if current one doesn't have such component column.
    ///
    pub fn set<T>(&mut self, entity: Entity, value: T) -> Result<(), EntityError>
    where
        T: Default + 'static,
    {
        let id = self.registry.id_of::<T>()?;
        let mut location = self
            .directory
            .resolve(entity)
            .ok_or(EntityError::StaleEntity(entity))?;
        if !self
            .graph
            .get(location.archetype)
            .is_some_and(|a| a.signature().contains(id))
        {
            let to = self
                .graph
                .transition(location.archetype, Some(id), None, &self.registry)?;
            location = self.move_entity(entity, location, to)?;
        }
        if let Some(slot) = self
            .graph
            .get_mut(location.archetype)
            .and_then(|a| a.get_mut::<T>(id, location.row()))
        {
            *slot = value;
        }
        Ok(())
    }

    ///
    /// Removes component from specified entity, moving it to the narrower archetype.
    /// Returns false if entity had no such component.
    ///
    pub fn remove_component<T>(&mut self, entity: Entity) -> Result<bool, EntityError>
    where
        T: Default + 'static,
    {
        let id = self.registry.id_of::<T>()?;
        let location = self
            .directory
            .resolve(entity)
            .ok_or(EntityError::StaleEntity(entity))?;
        if !self
            .graph
            .get(location.archetype)
            .is_some_and(|a| a.signature().contains(id))
        {
            return Ok(false);
        }
        let to = self
            .graph
            .transition(location.archetype, None, Some(id), &self.registry)?;
        self.move_entity(entity, location, to)?;
        Ok(true)
    }

    fn move_entity(
        &mut self,
        entity: Entity,
        from: EntityLocation,
        to: ArchetypeId,
    ) -> Result<EntityLocation, EntityError> {
        let (src, dest) = self
            .graph
            .get_pair_mut(from.archetype, to)
            .ok_or(EntityError::NoSuchArchetype(to))?;
        let (row, swapped) = src.move_to(from.row(), dest);
        if let Some(swapped) = swapped {
            self.directory.relocate(swapped, from);
        }
        let location = EntityLocation::new(to, row);
        self.directory.relocate(entity.index(), location);
        trace!("Moved {entity} from {} to {to}", from.archetype);
        Ok(location)
    }

    /// Removes all entities, pending ones included. Archetypes are kept.
    pub fn clear(&mut self) {
        for storage in self.graph.iter_mut() {
            storage.clear();
        }
        self.directory.clear();
        self.removals.clear();
    }
}

impl Default for World {
    fn default() -> Self {
        Self::with_config(WorldConfig::default())
    }
}
