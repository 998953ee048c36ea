pub mod archetype_storage;
pub mod graph;
pub mod signature;

pub use archetype_storage::ArchetypeId;
pub use archetype_storage::ArchetypeStorage;
pub use graph::ArchetypeGraph;
pub use signature::Signature;
