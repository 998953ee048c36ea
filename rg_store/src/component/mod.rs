pub mod registry;
pub mod storage;

pub use registry::ComponentId;
pub use registry::ComponentRegistry;
pub use registry::ComponentType;
pub use storage::ComponentStorage;
pub use storage::TypedComponentStorage;
pub use storage::{try_cast, try_cast_mut};
