//!
//! Archetype-based in-memory entity-component store.
//!
//! Entities live in [`archetype::ArchetypeStorage`] tables, one per distinct component set,
//! with one dense column per component. [`World`] keeps the [`entity::EntityDirectory`]
//! in sync with every row move and offers both immediate and deferred (queued then flushed) removal.
//! [`Filter`] iterates all archetypes containing a set of components with direct access to the columns.
//!
pub mod archetype;
pub mod builder;
pub mod component;
pub mod config;
pub mod entity;
pub mod error;
pub mod query;
mod removal;
pub mod world;

pub use builder::Builder;
pub use component::{ComponentId, ComponentType};
pub use config::WorldConfig;
pub use entity::{Entity, EntityLocation};
pub use error::EntityError;
pub use query::{ComponentSet, Fetch, Filter, Query};
pub use world::World;
