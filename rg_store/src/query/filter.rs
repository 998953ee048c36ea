use std::marker::PhantomData;

use itertools::Itertools;

use crate::{
    archetype::ArchetypeId,
    component::ComponentId,
    entity::Entity,
    error::EntityError,
    query::Query,
    world::{World, WorldId},
};

struct MatchedArchetype {
    id: ArchetypeId,
    /// Column position per queried component, in query order
    columns: Vec<usize>,
    /// Row count seen at the last reset
    rows: usize,
}

///
/// Restartable cursor over the rows of every archetype containing the queried components.
///
/// The filter does not hold the world; each call borrows it. Matching archetypes and their row
/// counts are captured by [`Filter::reset`], archetypes created later stay invisible until the next reset.
/// Entities must not be created or removed between [`Filter::next`] and [`Filter::get`].
///
pub struct Filter<Q>
where
    Q: Query,
{
    world: WorldId,
    required: Vec<ComponentId>,
    matches: Vec<MatchedArchetype>,
    current: usize,
    row: Option<usize>,
    _query: PhantomData<fn() -> Q>,
}

impl<Q> Filter<Q>
where
    Q: Query,
{
    pub(crate) fn new(world: &World) -> Result<Self, EntityError> {
        let required = Q::component_ids(world.registry())?;
        if let Some(id) = required.iter().duplicates().next() {
            return Err(EntityError::ConflictingAccess(*id));
        }
        let mut filter = Filter {
            world: world.id(),
            required,
            matches: Vec::new(),
            current: 0,
            row: None,
            _query: PhantomData,
        };
        filter.reset(world);
        Ok(filter)
    }

    /// Re-evaluates matching archetypes and moves cursor before the first row
    pub fn reset(&mut self, world: &World) {
        self.matches.clear();
        self.current = 0;
        self.row = None;
        if world.id() != self.world {
            return;
        }
        self.matches
            .extend(world.archetypes().matching(&self.required).map(|a| {
                MatchedArchetype {
                    id: a.id(),
                    columns: self
                        .required
                        .iter()
                        .filter_map(|c| a.signature().position(*c))
                        .collect(),
                    rows: a.row_count(),
                }
            }));
    }

    /// Advances to the next row, crossing archetype boundaries. False when all rows were visited.
    pub fn next(&mut self, world: &World) -> bool {
        if world.id() != self.world {
            return false;
        }
        while let Some(matched) = self.matches.get(self.current) {
            let next = self.row.map_or(0, |row| row + 1);
            let rows = world
                .archetypes()
                .get(matched.id)
                .map_or(0, |a| a.row_count().min(matched.rows));
            if next < rows {
                self.row = Some(next);
                return true;
            }
            self.current += 1;
            self.row = None;
        }
        false
    }

    /// Handle owning the current row
    pub fn entity(&self, world: &World) -> Option<Entity> {
        if world.id() != self.world {
            return None;
        }
        let matched = self.matches.get(self.current)?;
        let index = world.archetypes().get(matched.id)?.entity_at(self.row?)?;
        world.directory().entity_of(index)
    }

    /// Borrows components of the current row
    pub fn get<'w>(&self, world: &'w World) -> Option<Q::Item<'w>> {
        if world.id() != self.world {
            return None;
        }
        let matched = self.matches.get(self.current)?;
        let archetype = world.archetypes().get(matched.id)?;
        Q::fetch(archetype, &matched.columns, self.row?)
    }

    /// Resets the filter and calls `f` for every matching row
    pub fn for_each<F>(&mut self, world: &World, mut f: F)
    where
        F: FnMut(Entity, Q::Item<'_>),
    {
        self.reset(world);
        while self.next(world) {
            if let (Some(entity), Some(item)) = (self.entity(world), self.get(world)) {
                f(entity, item);
            }
        }
    }

    /// Archetypes matched at the last reset, in iteration order
    pub fn archetypes(&self) -> impl Iterator<Item = ArchetypeId> + '_ {
        self.matches.iter().map(|m| m.id)
    }

    /// Total rows matched at the last reset
    pub fn row_count(&self) -> usize {
        self.matches.iter().map(|m| m.rows).sum()
    }
}

#[cfg(test)]
mod test {
    use crate::{entity::Entity, error::EntityError, world::World};

    #[derive(Default, Clone, Copy, Debug, PartialEq)]
    struct A {
        v: i64,
    }

    #[derive(Default, Clone, Copy, Debug, PartialEq)]
    struct B {
        v: i64,
        w: i64,
    }

    #[derive(Default, Clone, Debug, PartialEq)]
    struct Name(String);

    fn world() -> World {
        let mut world = World::new(16);
        world.register::<A>().unwrap();
        world.register::<B>().unwrap();
        world.register::<Name>().unwrap();
        world
    }

    #[test]
    fn sees_new_archetypes_after_reset() -> Result<(), EntityError> {
        let mut world = world();
        world.create_entities::<(A,)>(2)?;
        let mut filter = world.create_filter::<(&mut A,)>()?;
        world.create_entities::<(A, Name)>(3)?;
        world.create_entities::<(A,)>(4)?;

        let mut count = 0;
        while filter.next(&world) {
            count += 1;
        }
        // bounded by the rows seen at the last reset
        assert_eq!(2, count);

        filter.reset(&world);
        let mut count = 0;
        while filter.next(&world) {
            count += 1;
        }
        assert_eq!(9, count);
        assert_eq!(2, filter.archetypes().count());
        Ok(())
    }

    #[test]
    fn item_order() -> Result<(), EntityError> {
        let mut world = world();
        let e = world.create_entity::<(Name, B, A)>()?;
        world.set(e, Name("first".to_owned()))?;
        world.set(e, B { v: 7, w: 8 })?;

        let mut filter = world.create_filter::<(&B, &mut Name, &mut A)>()?;
        assert!(filter.next(&world));
        assert_eq!(Some(e), filter.entity(&world));
        {
            let (b, mut name, mut a) = filter.get(&world).unwrap();
            name.0.push_str(" entity");
            a.v = b.v * b.w;
        }
        assert!(!filter.next(&world));
        assert!(filter.get(&world).is_none());
        assert_eq!(Some("first entity".to_owned()), world.get::<Name, _, _>(e, |n| n.0.clone()));
        assert_eq!(Some(56), world.get::<A, _, _>(e, |a| a.v));
        Ok(())
    }

    #[test]
    fn pending_rows_visible_until_processed() -> Result<(), EntityError> {
        let mut world = world();
        let e = world.create_entities::<(A,)>(3)?;
        for (i, entity) in e.iter().enumerate() {
            world.set(*entity, A { v: i as i64 })?;
        }
        assert_eq!(2, world.remove_entities(&e[..2]));

        let mut filter = world.create_filter::<(&mut A,)>()?;
        let mut seen: Vec<(Entity, bool, i64)> = Vec::new();
        while filter.next(&world) {
            let entity = filter.entity(&world).unwrap();
            let mut a = filter.get(&world).unwrap().0;
            a.v += 10;
            seen.push((entity, world.is_alive(entity), a.v));
        }
        assert_eq!(
            vec![(e[0], false, 10), (e[1], false, 11), (e[2], true, 12)],
            seen
        );

        assert_eq!(2, world.process_removals());
        let mut survivors = Vec::new();
        filter.for_each(&world, |entity, (a,)| survivors.push((entity, a.v)));
        assert_eq!(vec![(e[2], 12)], survivors);
        Ok(())
    }
}
