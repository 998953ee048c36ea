use std::marker::PhantomData;

use crate::{
    archetype::ArchetypeId,
    entity::Entity,
    error::EntityError,
    query::ComponentSet,
    world::{World, WorldId},
};

///
/// Bulk constructor bound to the archetype of one component set
///
pub struct Builder<S>
where
    S: ComponentSet,
{
    world: WorldId,
    archetype: ArchetypeId,
    _set: PhantomData<fn() -> S>,
}

impl<S> Builder<S>
where
    S: ComponentSet,
{
    pub(crate) fn new(world: WorldId, archetype: ArchetypeId) -> Self {
        Builder {
            world,
            archetype,
            _set: PhantomData,
        }
    }

    #[inline]
    pub fn archetype(&self) -> ArchetypeId {
        self.archetype
    }

    /// Creates `count` default-initialized entities
    pub fn new_entities(&self, world: &mut World, count: usize) -> Result<Vec<Entity>, EntityError> {
        if world.id() != self.world {
            return Err(EntityError::NoSuchArchetype(self.archetype));
        }
        world.spawn_batch(self.archetype, count)
    }

    pub fn new_entity(&self, world: &mut World) -> Result<Entity, EntityError> {
        if world.id() != self.world {
            return Err(EntityError::NoSuchArchetype(self.archetype));
        }
        world.spawn(self.archetype)
    }
}
