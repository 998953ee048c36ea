use std::cell::{Ref, RefMut};

use crate::{
    archetype::ArchetypeStorage,
    component::{ComponentId, ComponentRegistry, try_cast, try_cast_mut},
    error::EntityError,
};

///
/// Access to one component column: `&T` borrows shared, `&mut T` borrows exclusive.
/// Borrows are checked per column, a conflicting borrow yields `None`.
///
pub trait Fetch {
    type Component: Default + 'static;
    type Item<'w>;

    fn fetch(archetype: &ArchetypeStorage, position: usize, row: usize) -> Option<Self::Item<'_>>;
}

impl<T> Fetch for &T
where
    T: Default + 'static,
{
    type Component = T;
    type Item<'w> = Ref<'w, T>;

    #[inline]
    fn fetch(archetype: &ArchetypeStorage, position: usize, row: usize) -> Option<Self::Item<'_>> {
        let guard = archetype.column(position)?.try_borrow().ok()?;
        Ref::filter_map(guard, |c| {
            try_cast::<T>(c.as_ref()).and_then(|s| s.as_slice().get(row))
        })
        .ok()
    }
}

impl<T> Fetch for &mut T
where
    T: Default + 'static,
{
    type Component = T;
    type Item<'w> = RefMut<'w, T>;

    #[inline]
    fn fetch(archetype: &ArchetypeStorage, position: usize, row: usize) -> Option<Self::Item<'_>> {
        let guard = archetype.column(position)?.try_borrow_mut().ok()?;
        RefMut::filter_map(guard, |c| {
            try_cast_mut::<T>(c.as_mut()).and_then(|s| s.as_mut_slice().get_mut(row))
        })
        .ok()
    }
}

///
/// Tuple of [`Fetch`] items. Item fields follow the order of the tuple's type parameters.
///
pub trait Query {
    type Item<'w>;

    /// Component ids in type parameter order
    fn component_ids(registry: &ComponentRegistry) -> Result<Vec<ComponentId>, EntityError>;

    /// `columns` holds the column position of each component, in type parameter order
    fn fetch<'w>(
        archetype: &'w ArchetypeStorage,
        columns: &[usize],
        row: usize,
    ) -> Option<Self::Item<'w>>;
}

///
/// Tuple of component types selecting an archetype for bulk construction
///
pub trait ComponentSet {
    fn component_ids(registry: &ComponentRegistry) -> Result<Vec<ComponentId>, EntityError>;
}

impl ComponentSet for () {
    fn component_ids(_: &ComponentRegistry) -> Result<Vec<ComponentId>, EntityError> {
        Ok(Vec::new())
    }
}

macro_rules! impl_tuples {
    ($($name:ident),+) => {
        impl<$($name),+> Query for ($($name,)+)
        where
            $($name: Fetch,)+
        {
            type Item<'w> = ($(<$name as Fetch>::Item<'w>,)+);

            fn component_ids(registry: &ComponentRegistry) -> Result<Vec<ComponentId>, EntityError> {
                Ok(vec![$(registry.id_of::<<$name as Fetch>::Component>()?),+])
            }

            #[inline]
            fn fetch<'w>(
                archetype: &'w ArchetypeStorage,
                columns: &[usize],
                row: usize,
            ) -> Option<Self::Item<'w>> {
                let mut columns = columns.iter();
                Some(($(<$name as Fetch>::fetch(archetype, *columns.next()?, row)?,)+))
            }
        }

        impl<$($name),+> ComponentSet for ($($name,)+)
        where
            $($name: Default + 'static,)+
        {
            fn component_ids(registry: &ComponentRegistry) -> Result<Vec<ComponentId>, EntityError> {
                Ok(vec![$(registry.id_of::<$name>()?),+])
            }
        }
    };
}

impl_tuples!(A);
impl_tuples!(A, B);
impl_tuples!(A, B, C);
impl_tuples!(A, B, C, D);
impl_tuples!(A, B, C, D, E);
impl_tuples!(A, B, C, D, E, F);
impl_tuples!(A, B, C, D, E, F, G);
impl_tuples!(A, B, C, D, E, F, G, H);

#[cfg(test)]
mod test {
    use crate::{
        archetype::{ArchetypeId, ArchetypeStorage, Signature},
        component::ComponentRegistry,
    };

    use super::{ComponentSet, Fetch, Query};

    #[derive(Default, Debug, PartialEq)]
    struct Position(i32, i32);

    #[derive(Default, Debug, PartialEq)]
    struct Direction(i8, i8);

    fn storage(registry: &mut ComponentRegistry) -> ArchetypeStorage {
        registry.register::<Position>().unwrap();
        registry.register::<Direction>().unwrap();
        registry.register::<bool>().unwrap();
        let signature = Signature::new(
            <(Position, Direction, bool) as ComponentSet>::component_ids(registry).unwrap(),
        );
        let columns = signature
            .components()
            .iter()
            .map(|c| registry.create_column(*c, 0).unwrap())
            .collect();
        let mut storage = ArchetypeStorage::new(ArchetypeId::new(1), signature, columns, 0);
        storage.append(0..4u32);
        storage
    }

    #[test]
    fn shared_and_exclusive() {
        let mut registry = ComponentRegistry::new();
        let storage = storage(&mut registry);
        let p = storage.signature().position(registry.id_of::<Position>().unwrap()).unwrap();
        let d = storage.signature().position(registry.id_of::<Direction>().unwrap()).unwrap();

        {
            let mut position = <&mut Position as Fetch>::fetch(&storage, p, 2).unwrap();
            position.0 += 17;
            position.1 += 77;
            // column is exclusively borrowed
            assert!(<&Position as Fetch>::fetch(&storage, p, 2).is_none());
            assert!(<&Direction as Fetch>::fetch(&storage, d, 2).is_some());
        }
        assert_eq!(Position(17, 77), *<&Position as Fetch>::fetch(&storage, p, 2).unwrap());
        assert!(<&Position as Fetch>::fetch(&storage, p, 4).is_none());
        // wrong column type
        assert!(<&Position as Fetch>::fetch(&storage, d, 0).is_none());
    }

    #[test]
    fn tuple_follows_parameter_order() {
        let mut registry = ComponentRegistry::new();
        let storage = storage(&mut registry);
        let ids = <(&Direction, &mut Position) as Query>::component_ids(&registry).unwrap();
        assert_eq!(registry.id_of::<Direction>().unwrap(), ids[0]);
        let columns = ids
            .iter()
            .map(|c| storage.signature().position(*c).unwrap())
            .collect::<Vec<_>>();

        let (direction, mut position) =
            <(&Direction, &mut Position) as Query>::fetch(&storage, &columns, 1).unwrap();
        assert_eq!(Direction(0, 0), *direction);
        position.0 = direction.0 as i32 + 5;
        drop(position);
        assert_eq!(Position(5, 0), *storage.get::<Position>(ids[1], 1).unwrap());
    }

    #[test]
    fn unregistered() {
        let registry = ComponentRegistry::new();
        assert!(<(&Position,) as Query>::component_ids(&registry).is_err());
        assert!(<(Position, bool) as ComponentSet>::component_ids(&registry).is_err());
        assert!(<() as ComponentSet>::component_ids(&registry).unwrap().is_empty());
    }
}
