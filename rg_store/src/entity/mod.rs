mod directory;
mod entity;

pub use directory::EntityDirectory;
pub use entity::Entity;
pub use entity::EntityLocation;
