use std::{
    cell::{Ref, RefCell},
    fmt::Display,
    ops::Range,
};

use crate::{
    archetype::Signature,
    component::{ComponentId, ComponentStorage, try_cast, try_cast_mut},
};

///
/// ArchetypeId
///
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug, Default)]
#[repr(transparent)]
pub struct ArchetypeId(u32);

impl ArchetypeId {
    pub(crate) fn new(index: usize) -> Self {
        ArchetypeId(index as u32)
    }

    #[inline(always)]
    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl Display for ArchetypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ArchetypeId({})", self.0)
    }
}

pub(crate) type Column = RefCell<Box<dyn ComponentStorage>>;

///
/// Structure-of-arrays table of all entities sharing one signature.
/// Row `i` of every column and of the entity array belongs to the same entity.
///
pub struct ArchetypeStorage {
    id: ArchetypeId,
    signature: Signature,
    columns: Vec<Column>,
    entities: Vec<u32>,
}

impl ArchetypeStorage {
    /// Wraps supplied columns, one per signature component in signature order
    pub(crate) fn new(
        id: ArchetypeId,
        signature: Signature,
        columns: Vec<Box<dyn ComponentStorage>>,
        capacity: usize,
    ) -> Self {
        debug_assert_eq!(signature.len(), columns.len());
        ArchetypeStorage {
            id,
            signature,
            columns: columns.into_iter().map(RefCell::new).collect(),
            entities: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn id(&self) -> ArchetypeId {
        self.id
    }

    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Raw entity indices, one per row
    #[inline]
    pub fn entities(&self) -> &[u32] {
        &self.entities
    }

    #[inline]
    pub fn entity_at(&self, row: usize) -> Option<u32> {
        self.entities.get(row).copied()
    }

    /// True if every column is exactly as long as the entity array
    pub fn is_dense(&self) -> bool {
        self.columns
            .iter()
            .all(|c| c.try_borrow().is_ok_and(|c| c.row_count() == self.entities.len()))
    }

    #[inline(always)]
    pub(crate) fn column(&self, position: usize) -> Option<&Column> {
        self.columns.get(position)
    }

    /// Borrows the value of component `id` at `row`
    pub fn get<T>(&self, id: ComponentId, row: usize) -> Option<Ref<'_, T>>
    where
        T: Default + 'static,
    {
        let column = self.columns.get(self.signature.position(id)?)?;
        Ref::filter_map(column.try_borrow().ok()?, |c| {
            try_cast::<T>(c.as_ref()).and_then(|s| s.as_slice().get(row))
        })
        .ok()
    }

    pub(crate) fn get_mut<T>(&mut self, id: ComponentId, row: usize) -> Option<&mut T>
    where
        T: Default + 'static,
    {
        let position = self.signature.position(id)?;
        let column = self.columns.get_mut(position)?.get_mut();
        try_cast_mut::<T>(column.as_mut())
            .and_then(|s| s.as_mut_slice().get_mut(row))
    }

    /// Appends one default-initialized row for passed entity index and returns its row
    pub(crate) fn add(&mut self, index: u32) -> usize {
        self.append(std::iter::once(index)).start
    }

    ///
    /// Appends one default-initialized row per supplied entity index.
    /// Columns grow once by the whole batch.
    ///
    pub(crate) fn append(&mut self, indices: impl ExactSizeIterator<Item = u32>) -> Range<usize> {
        let start = self.entities.len();
        let count = indices.len();
        for column in self.columns.iter_mut() {
            let column = column.get_mut();
            column.reserve(count);
            column.extend_default(count);
        }
        self.entities.extend(indices);
        start..self.entities.len()
    }

    ///
    /// Swap-removes row. Returns the index of the entity moved into `row` (None if `row` was the last one).
    ///
    pub(crate) fn remove(&mut self, row: usize) -> Option<u32> {
        debug_assert!(row < self.entities.len());
        if row >= self.entities.len() {
            return None;
        }
        for column in self.columns.iter_mut() {
            column.get_mut().remove(row);
        }
        self.entities.swap_remove(row);
        self.entities.get(row).copied()
    }

    ///
    /// Moves row to `dest`: shared columns are moved, columns missing here are default-initialized in `dest`,
    /// columns missing in `dest` are dropped. Source side is swap-removed exactly like [`Self::remove`].
    /// Returns new row in `dest` and the index of the entity swapped into `row` here.
    ///
    pub(crate) fn move_to(&mut self, row: usize, dest: &mut ArchetypeStorage) -> (usize, Option<u32>) {
        debug_assert!(row < self.entities.len());
        for (id, column) in self.signature.components().iter().zip(self.columns.iter_mut()) {
            let column = column.get_mut();
            match dest.signature.position(*id) {
                Some(position) => column.move_to(row, dest.columns[position].get_mut().as_mut()),
                None => column.remove(row),
            }
        }
        for (id, column) in dest.signature.components().iter().zip(dest.columns.iter_mut()) {
            if !self.signature.contains(*id) {
                column.get_mut().extend_default(1);
            }
        }
        let index = self.entities.swap_remove(row);
        let dest_row = dest.entities.len();
        dest.entities.push(index);
        (dest_row, self.entities.get(row).copied())
    }

    /// Removes all rows
    pub(crate) fn clear(&mut self) {
        for column in self.columns.iter_mut() {
            column.get_mut().clear();
        }
        self.entities.clear();
    }
}

impl std::fmt::Debug for ArchetypeStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchetypeStorage")
            .field("id", &self.id)
            .field("signature", &self.signature)
            .field("rows", &self.entities.len())
            .finish()
    }
}
