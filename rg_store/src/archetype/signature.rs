use std::fmt::Display;

use itertools::Itertools;

use crate::component::ComponentId;

///
/// Sorted, duplicate-free set of component ids. Key of the archetype graph.
///
#[derive(PartialEq, Eq, Hash, Clone, Debug, Default)]
pub struct Signature(Vec<ComponentId>);

impl Signature {
    pub fn new(components: impl IntoIterator<Item = ComponentId>) -> Self {
        Signature(components.into_iter().sorted().dedup().collect())
    }

    #[inline]
    pub fn components(&self) -> &[ComponentId] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: ComponentId) -> bool {
        self.0.binary_search(&id).is_ok()
    }

    /// Position of the column holding `id`
    #[inline]
    pub fn position(&self, id: ComponentId) -> Option<usize> {
        self.0.binary_search(&id).ok()
    }

    pub fn is_superset_of(&self, other: &[ComponentId]) -> bool {
        other.iter().all(|c| self.contains(*c))
    }

    pub fn with(&self, id: ComponentId) -> Self {
        Signature::new(self.0.iter().copied().chain(Some(id)))
    }

    pub fn without(&self, id: ComponentId) -> Self {
        Signature(self.0.iter().copied().filter(|c| *c != id).collect())
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0.iter().map(|c| c.index()).join(", "))
    }
}
