use fxhash::FxHashMap;
use log::debug;

use crate::{
    archetype::{ArchetypeId, ArchetypeStorage, Signature},
    component::{ComponentId, ComponentRegistry, ComponentStorage},
    error::EntityError,
};

///
/// Interns archetypes by signature and caches add/remove transitions between them.
/// Archetypes are never deleted, so an `ArchetypeId` stays valid for the graph's lifetime.
///
pub struct ArchetypeGraph {
    archetypes: Vec<ArchetypeStorage>,
    by_signature: FxHashMap<Signature, ArchetypeId>,
    add_edges: FxHashMap<(ArchetypeId, ComponentId), ArchetypeId>,
    remove_edges: FxHashMap<(ArchetypeId, ComponentId), ArchetypeId>,
    archetype_capacity: usize,
}

impl ArchetypeGraph {
    /// Creates graph holding only the empty archetype
    pub fn new(archetype_capacity: usize) -> Self {
        let mut graph = ArchetypeGraph {
            archetypes: Vec::new(),
            by_signature: FxHashMap::default(),
            add_edges: FxHashMap::default(),
            remove_edges: FxHashMap::default(),
            archetype_capacity,
        };
        let empty = Signature::default();
        graph.insert(empty, Vec::new());
        graph
    }

    /// Id of the archetype with no components
    #[inline]
    pub fn empty(&self) -> ArchetypeId {
        ArchetypeId::new(0)
    }

    pub fn find(&self, signature: &Signature) -> Option<ArchetypeId> {
        self.by_signature.get(signature).copied()
    }

    ///
    /// Returns archetype for the signature, creating it with zero-length columns if absent
    ///
    pub fn get_or_create(
        &mut self,
        signature: Signature,
        registry: &ComponentRegistry,
    ) -> Result<ArchetypeId, EntityError> {
        if let Some(id) = self.by_signature.get(&signature) {
            return Ok(*id);
        }
        let columns = signature
            .components()
            .iter()
            .map(|c| {
                registry
                    .create_column(*c, self.archetype_capacity)
                    .ok_or(EntityError::UnknownComponentType("<unregistered id>"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.insert(signature, columns))
    }

    fn insert(
        &mut self,
        signature: Signature,
        columns: Vec<Box<dyn ComponentStorage>>,
    ) -> ArchetypeId {
        let id = ArchetypeId::new(self.archetypes.len());
        debug!("New archetype {id} with signature {signature}");
        self.by_signature.insert(signature.clone(), id);
        self.archetypes.push(ArchetypeStorage::new(
            id,
            signature,
            columns,
            self.archetype_capacity,
        ));
        id
    }

    ///
    /// Destination archetype after adding and/or removing one component from `from`'s signature.
    /// Single-component transitions are cached as graph edges.
    ///
    pub fn transition(
        &mut self,
        from: ArchetypeId,
        add: Option<ComponentId>,
        remove: Option<ComponentId>,
        registry: &ComponentRegistry,
    ) -> Result<ArchetypeId, EntityError> {
        let edge = match (add, remove) {
            (Some(c), None) => self.add_edges.get(&(from, c)).copied(),
            (None, Some(c)) => self.remove_edges.get(&(from, c)).copied(),
            (None, None) => return Ok(from),
            (Some(_), Some(_)) => None,
        };
        if let Some(to) = edge {
            return Ok(to);
        }
        let mut signature = self
            .get(from)
            .ok_or(EntityError::NoSuchArchetype(from))?
            .signature()
            .clone();
        if let Some(c) = remove {
            signature = signature.without(c);
        }
        if let Some(c) = add {
            signature = signature.with(c);
        }
        let to = self.get_or_create(signature, registry)?;
        if to == from {
            return Ok(to);
        }
        match (add, remove) {
            (Some(c), None) => {
                self.add_edges.insert((from, c), to);
                self.remove_edges.insert((to, c), from);
            }
            (None, Some(c)) => {
                self.remove_edges.insert((from, c), to);
                self.add_edges.insert((to, c), from);
            }
            _ => {}
        }
        Ok(to)
    }

    #[inline]
    pub fn get(&self, id: ArchetypeId) -> Option<&ArchetypeStorage> {
        self.archetypes.get(id.index())
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: ArchetypeId) -> Option<&mut ArchetypeStorage> {
        self.archetypes.get_mut(id.index())
    }

    /// Two distinct archetypes borrowed mutably at once
    pub(crate) fn get_pair_mut(
        &mut self,
        a: ArchetypeId,
        b: ArchetypeId,
    ) -> Option<(&mut ArchetypeStorage, &mut ArchetypeStorage)> {
        let (i, j) = (a.index(), b.index());
        if i == j || i.max(j) >= self.archetypes.len() {
            return None;
        }
        if i < j {
            let (left, right) = self.archetypes.split_at_mut(j);
            Some((&mut left[i], &mut right[0]))
        } else {
            let (left, right) = self.archetypes.split_at_mut(i);
            Some((&mut right[0], &mut left[j]))
        }
    }

    /// Archetypes whose signature contains every required component, in creation order
    pub fn matching<'a>(
        &'a self,
        required: &'a [ComponentId],
    ) -> impl Iterator<Item = &'a ArchetypeStorage> + 'a {
        self.archetypes
            .iter()
            .filter(move |a| a.signature().is_superset_of(required))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ArchetypeStorage> {
        self.archetypes.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, ArchetypeStorage> {
        self.archetypes.iter_mut()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }
}
