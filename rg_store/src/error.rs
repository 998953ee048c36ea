use thiserror::Error;

use crate::{archetype::ArchetypeId, component::ComponentId, entity::Entity};

///
/// EntityError
///
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntityError {
    #[error("Component type `{0}` is not registered!")]
    UnknownComponentType(&'static str),
    #[error("Entity {0} is stale or was never allocated!")]
    StaleEntity(Entity),
    #[error(
        "Component type `{name}` re-registered with size {size}/align {align}, expected {expected_size}/{expected_align}!"
    )]
    DuplicateSizeMismatch {
        name: &'static str,
        size: u32,
        align: u32,
        expected_size: u32,
        expected_align: u32,
    },
    #[error("Component {0} is requested more than once by the same query!")]
    ConflictingAccess(ComponentId),
    #[error("No such archetype: {0}!")]
    NoSuchArchetype(ArchetypeId),
}
