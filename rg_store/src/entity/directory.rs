use log::debug;

use crate::{
    archetype::ArchetypeId,
    entity::{Entity, EntityLocation},
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum SlotState {
    Free,
    Alive,
    /// Logically removed, row still in storage until the removal queue is flushed
    Pending,
}

#[derive(Clone, Copy, Debug)]
struct EntityEntry {
    generation: u32,
    location: EntityLocation,
    state: SlotState,
}

///
/// Maps entity handles to their current archetype row. Single source of truth for entity locations.
///
#[derive(Default)]
pub struct EntityDirectory {
    entries: Vec<EntityEntry>,
    free: Vec<u32>,
    alive: usize,
    pending: usize,
}

impl EntityDirectory {
    pub fn with_capacity(capacity: usize) -> Self {
        EntityDirectory {
            entries: Vec::with_capacity(capacity),
            free: Vec::new(),
            alive: 0,
            pending: 0,
        }
    }

    ///
    /// Returns fresh handle placed at `location`, reusing a free slot if there is one
    ///
    pub fn allocate(&mut self, location: EntityLocation) -> Entity {
        self.alive += 1;
        if let Some(index) = self.free.pop() {
            let entry = &mut self.entries[index as usize];
            debug_assert_eq!(SlotState::Free, entry.state);
            entry.location = location;
            entry.state = SlotState::Alive;
            return Entity::new(index, entry.generation);
        }
        let index = self.entries.len() as u32;
        self.entries.push(EntityEntry {
            generation: 0,
            location,
            state: SlotState::Alive,
        });
        Entity::new(index, 0)
    }

    ///
    /// Allocates `count` handles placed at consecutive rows of one archetype starting at `first_row`
    ///
    pub fn allocate_batch(
        &mut self,
        count: usize,
        archetype: ArchetypeId,
        first_row: usize,
    ) -> Vec<Entity> {
        let fresh = count.saturating_sub(self.free.len());
        self.entries.reserve(fresh);
        (0..count)
            .map(|i| self.allocate(EntityLocation::new(archetype, first_row + i)))
            .collect()
    }

    /// Live location of the entity, None for stale, pending or never issued handles
    #[inline]
    pub fn resolve(&self, entity: Entity) -> Option<EntityLocation> {
        self.entries
            .get(entity.index() as usize)
            .filter(|e| e.state == SlotState::Alive && e.generation == entity.generation())
            .map(|e| e.location)
    }

    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.resolve(entity).is_some()
    }

    /// Updates stored coordinates of the slot, alive or pending
    #[inline]
    pub fn relocate(&mut self, index: u32, location: EntityLocation) {
        if let Some(entry) = self.entries.get_mut(index as usize) {
            debug_assert_ne!(SlotState::Free, entry.state);
            entry.location = location;
        }
    }

    /// Location of a slot which still occupies storage
    pub(crate) fn location_of(&self, index: u32) -> Option<EntityLocation> {
        self.entries
            .get(index as usize)
            .filter(|e| e.state != SlotState::Free)
            .map(|e| e.location)
    }

    /// Handle currently owning the slot which still occupies storage
    pub(crate) fn entity_of(&self, index: u32) -> Option<Entity> {
        self.entries
            .get(index as usize)
            .filter(|e| e.state != SlotState::Free)
            .map(|e| Entity::new(index, e.generation))
    }

    ///
    /// Marks live entity as pending removal. Its slot is not reused until [`Self::release`].
    ///
    pub fn mark_pending(&mut self, entity: Entity) -> Option<EntityLocation> {
        let location = self.resolve(entity)?;
        self.entries[entity.index() as usize].state = SlotState::Pending;
        self.alive -= 1;
        self.pending += 1;
        Some(location)
    }

    ///
    /// Frees slot of the live entity: bumps generation and puts the slot on the free list
    ///
    pub fn free(&mut self, entity: Entity) -> Option<EntityLocation> {
        let location = self.resolve(entity)?;
        self.alive -= 1;
        self.recycle(entity.index());
        Some(location)
    }

    /// Frees slot of a pending entity
    pub(crate) fn release(&mut self, index: u32) {
        if self
            .entries
            .get(index as usize)
            .is_some_and(|e| e.state == SlotState::Pending)
        {
            self.pending -= 1;
            self.recycle(index);
        }
    }

    ///
    /// Bumps generation and returns slot to the free list. A slot whose generation is exhausted
    /// is retired instead: it stays free forever so no earlier handle can resolve again.
    ///
    fn recycle(&mut self, index: u32) {
        let entry = &mut self.entries[index as usize];
        entry.state = SlotState::Free;
        entry.location = EntityLocation::default();
        match entry.generation.checked_add(1) {
            Some(generation) => {
                entry.generation = generation;
                self.free.push(index);
            }
            None => debug!("Retired entity slot {index}"),
        }
    }

    /// Frees every slot
    pub fn clear(&mut self) {
        for index in 0..self.entries.len() as u32 {
            if self.entries[index as usize].state != SlotState::Free {
                self.recycle(index);
            }
        }
        self.alive = 0;
        self.pending = 0;
    }

    /// Number of live entities
    #[inline]
    pub fn len(&self) -> usize {
        self.alive
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.alive == 0
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Number of slots ever allocated
    #[inline]
    pub fn slots(&self) -> usize {
        self.entries.len()
    }
}
