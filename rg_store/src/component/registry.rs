use std::{
    any::{TypeId, type_name},
    fmt::Display,
    mem::{align_of, size_of},
    sync::Arc,
};

use fxhash::FxHashMap;
use log::warn;

use crate::{
    component::storage::{ColumnFactory, ComponentStorage, TypedColumnFactory},
    error::EntityError,
};

///
/// ComponentId
///
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
#[repr(transparent)]
pub struct ComponentId(u32);

impl ComponentId {
    #[inline(always)]
    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ComponentId({})", self.0)
    }
}

///
/// Registered component type descriptor
///
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct ComponentType {
    pub id: ComponentId,
    pub size: u32,
    pub alignment: u32,
}

struct ComponentInfo {
    name: &'static str,
    ty: ComponentType,
    factory: Arc<dyn ColumnFactory>,
}

///
/// Append-only table of component types. Ids are assigned sequentially and never reused.
///
#[derive(Default)]
pub struct ComponentRegistry {
    by_type: FxHashMap<TypeId, ComponentId>,
    infos: Vec<ComponentInfo>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T`, or returns the type already registered for it
    pub fn register<T>(&mut self) -> Result<ComponentType, EntityError>
    where
        T: Default + 'static,
    {
        let size = size_of::<T>() as u32;
        let alignment = align_of::<T>() as u32;
        if let Some(id) = self.by_type.get(&TypeId::of::<T>()) {
            let info = &self.infos[id.index()];
            if info.ty.size != size || info.ty.alignment != alignment {
                warn!("Rejected re-registration of {}", info.name);
                return Err(EntityError::DuplicateSizeMismatch {
                    name: info.name,
                    size,
                    align: alignment,
                    expected_size: info.ty.size,
                    expected_align: info.ty.alignment,
                });
            }
            return Ok(info.ty);
        }
        let ty = ComponentType {
            id: ComponentId(self.infos.len() as u32),
            size,
            alignment,
        };
        self.by_type.insert(TypeId::of::<T>(), ty.id);
        self.infos.push(ComponentInfo {
            name: type_name::<T>(),
            ty,
            factory: Arc::new(TypedColumnFactory::<T>::new()),
        });
        Ok(ty)
    }

    /// Looks up the registered type of `T`
    pub fn get<T>(&self) -> Result<ComponentType, EntityError>
    where
        T: 'static,
    {
        self.by_type
            .get(&TypeId::of::<T>())
            .map(|id| self.infos[id.index()].ty)
            .ok_or(EntityError::UnknownComponentType(type_name::<T>()))
    }

    #[inline]
    pub fn id_of<T>(&self) -> Result<ComponentId, EntityError>
    where
        T: 'static,
    {
        self.get::<T>().map(|ty| ty.id)
    }

    pub fn by_id(&self, id: ComponentId) -> Option<ComponentType> {
        self.infos.get(id.index()).map(|info| info.ty)
    }

    pub fn name(&self, id: ComponentId) -> Option<&'static str> {
        self.infos.get(id.index()).map(|info| info.name)
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    pub(crate) fn create_column(
        &self,
        id: ComponentId,
        capacity: usize,
    ) -> Option<Box<dyn ComponentStorage>> {
        self.infos
            .get(id.index())
            .map(|info| info.factory.create(capacity))
    }
}
