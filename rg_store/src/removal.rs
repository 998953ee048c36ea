use itertools::Itertools;

use crate::{archetype::ArchetypeId, entity::Entity, entity::EntityDirectory};

///
/// Rows of one archetype to compact, highest row first.
/// Swap-removing from the back keeps every not yet processed row index valid.
///
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct RemovalBatch {
    pub(crate) archetype: ArchetypeId,
    /// (row, entity index) pairs
    pub(crate) rows: Vec<(usize, u32)>,
}

///
/// Entities marked for removal whose rows are still in storage
///
#[derive(Default)]
pub(crate) struct RemovalQueue {
    queue: Vec<Entity>,
}

impl RemovalQueue {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        RemovalQueue {
            queue: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, entity: Entity) {
        self.queue.push(entity);
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn clear(&mut self) {
        self.queue.clear();
    }

    ///
    /// Drains the queue into per-archetype batches. Rows are read from the directory at
    /// this point, so relocations made after marking are taken into account.
    ///
    pub(crate) fn drain_plan(&mut self, directory: &EntityDirectory) -> Vec<RemovalBatch> {
        let rows = self
            .queue
            .drain(..)
            .filter(|e| directory.entity_of(e.index()) == Some(*e))
            .filter_map(|e| directory.location_of(e.index()).map(|l| (l, e.index())))
            .sorted_unstable_by(|(a, _), (b, _)| {
                a.archetype.cmp(&b.archetype).then(b.row.cmp(&a.row))
            })
            .dedup_by(|(a, _), (b, _)| a == b);
        rows.chunk_by(|(location, _)| location.archetype)
            .into_iter()
            .map(|(archetype, group)| RemovalBatch {
                archetype,
                rows: group.map(|(l, index)| (l.row(), index)).collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use crate::{
        archetype::ArchetypeId,
        entity::{EntityDirectory, EntityLocation},
    };

    use super::{RemovalBatch, RemovalQueue};

    #[test]
    fn descending_rows_per_archetype() {
        let first = ArchetypeId::new(1);
        let second = ArchetypeId::new(2);
        let mut dir = EntityDirectory::with_capacity(16);
        let a = dir.allocate_batch(10, first, 0);
        let b = dir.allocate_batch(4, second, 0);

        let mut queue = RemovalQueue::with_capacity(8);
        for e in [a[2], b[1], a[7], a[5], b[3]] {
            dir.mark_pending(e).unwrap();
            queue.push(e);
        }
        assert_eq!(5, queue.len());

        let plan = queue.drain_plan(&dir);
        assert_eq!(
            vec![
                RemovalBatch {
                    archetype: first,
                    rows: vec![(7, a[7].index()), (5, a[5].index()), (2, a[2].index())],
                },
                RemovalBatch {
                    archetype: second,
                    rows: vec![(3, b[3].index()), (1, b[1].index())],
                },
            ],
            plan
        );
        assert_eq!(0, queue.len());
    }

    #[test]
    fn uses_current_rows() {
        let archetype = ArchetypeId::new(1);
        let mut dir = EntityDirectory::with_capacity(4);
        let e = dir.allocate_batch(4, archetype, 0);
        let mut queue = RemovalQueue::default();
        dir.mark_pending(e[3]).unwrap();
        queue.push(e[3]);
        // row 3 swapped into row 0 by an immediate removal
        dir.free(e[0]);
        dir.relocate(e[3].index(), EntityLocation::new(archetype, 0));

        let plan = queue.drain_plan(&dir);
        assert_eq!(vec![(0, e[3].index())], plan[0].rows);
    }

    #[test]
    fn skips_unmarked() {
        let mut dir = EntityDirectory::with_capacity(4);
        let e = dir.allocate_batch(2, ArchetypeId::new(1), 0);
        let mut queue = RemovalQueue::default();
        dir.mark_pending(e[0]).unwrap();
        dir.release(e[0].index());
        queue.push(e[0]);
        assert!(queue.drain_plan(&dir).is_empty());
    }
}
