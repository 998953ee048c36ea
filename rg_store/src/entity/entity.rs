use std::fmt::Display;

use crate::archetype::ArchetypeId;

///
/// Generational entity handle. `index` addresses a directory slot, `generation` invalidates
/// handles issued before the slot was recycled.
///
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    #[inline(always)]
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Entity { index, generation }
    }

    #[inline(always)]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[inline(always)]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

///
/// Storage coordinates of an entity
///
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct EntityLocation {
    pub archetype: ArchetypeId,
    pub row: u32,
}

impl EntityLocation {
    pub(crate) fn new(archetype: ArchetypeId, row: usize) -> Self {
        EntityLocation {
            archetype,
            row: row as u32,
        }
    }

    #[inline(always)]
    pub fn row(&self) -> usize {
        self.row as usize
    }
}
