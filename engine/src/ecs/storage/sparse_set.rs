//! Sparse-set storage for a single component type.
//!
//! A [`SparseSet`] pairs an index-addressed lookup array (`sparse`) with two parallel, densely
//! packed arrays (`entities` and `components`):
//!
//! ```text
//! sparse:      [ 1 | - | 0 | - | 2 ]      indexed by entity index
//! entities:    [ 2v0 | 0v0 | 4v1 ]        dense, same order as components
//! components:  [  c  |  a  |  b  ]
//! ```
//!
//! Presence tests, inserts, lookups and removals are O(1); iteration walks the dense arrays only.
//! Removal moves the last dense entry into the hole it leaves, so dense order carries no meaning
//! and changes whenever an entry is removed.
//!
//! The storage keys entries by entity index only. Validating generations is the job of the
//! [`Registry`](crate::ecs::Registry), which purges an entity's components before its index can
//! be reused.

use std::{iter::Zip, marker::PhantomData, slice};

use crate::ecs::entity::Entity;

/// Marker for an entity index with no packed entry.
const VACANT: usize = usize::MAX;

/// Densely packed storage of `T` values keyed by entity index.
#[derive(Debug, Clone)]
pub struct SparseSet<T> {
    /// Maps an entity index to its slot in the dense arrays, or `VACANT`.
    sparse: Vec<usize>,

    /// Owner of each dense slot.
    entities: Vec<Entity>,

    /// Component of each dense slot.
    components: Vec<T>,
}

impl<T> Default for SparseSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SparseSet<T> {
    /// Construct an empty storage.
    #[inline]
    pub const fn new() -> Self {
        Self {
            sparse: Vec::new(),
            entities: Vec::new(),
            components: Vec::new(),
        }
    }

    /// Construct an empty storage with room for `capacity` components.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sparse: Vec::with_capacity(capacity),
            entities: Vec::with_capacity(capacity),
            components: Vec::with_capacity(capacity),
        }
    }

    /// Grow the sparse array so `index` is addressable.
    pub fn assure(&mut self, index: usize) {
        if self.sparse.len() <= index {
            self.sparse.resize(index + 1, VACANT);
        }
    }

    /// Insert a component for the entity, replacing any value already present, and return a
    /// reference to the stored value.
    pub fn insert(&mut self, entity: Entity, component: T) -> &mut T {
        let index = entity.index();
        self.assure(index);

        let slot = self.sparse[index];
        if slot == VACANT {
            let slot = self.components.len();
            self.entities.push(entity);
            self.components.push(component);
            self.sparse[index] = slot;
            &mut self.components[slot]
        } else {
            self.entities[slot] = entity;
            self.components[slot] = component;
            &mut self.components[slot]
        }
    }

    /// Get the dense slot of the entity, if it has a component here.
    #[inline]
    fn slot(&self, entity: Entity) -> Option<usize> {
        match self.sparse.get(entity.index()) {
            Some(&slot) if slot != VACANT => Some(slot),
            _ => None,
        }
    }

    /// Determine if the entity has a component in this storage.
    #[inline]
    pub fn contains(&self, entity: Entity) -> bool {
        self.slot(entity).is_some()
    }

    /// Get the entity's component, if present.
    #[inline]
    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.slot(entity).map(|slot| &self.components[slot])
    }

    /// Get the entity's component mutably, if present.
    #[inline]
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.slot(entity).map(|slot| &mut self.components[slot])
    }

    /// Remove the entity's component and return it. Does nothing if the entity has none.
    ///
    /// The last dense entry is moved into the freed slot to keep the dense arrays contiguous.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let slot = self.slot(entity)?;
        self.sparse[entity.index()] = VACANT;

        self.entities.swap_remove(slot);
        let component = self.components.swap_remove(slot);

        // Point the moved entry's sparse slot at its new home, unless the removed entry was last.
        if let Some(moved) = self.entities.get(slot) {
            self.sparse[moved.index()] = slot;
        }

        Some(component)
    }

    /// Number of packed components.
    #[inline]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Determine if no components are packed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Drop every component and release the backing arrays.
    pub fn clear(&mut self) {
        self.sparse = Vec::new();
        self.entities = Vec::new();
        self.components = Vec::new();
    }

    /// The owning entities, in dense order.
    #[inline]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// The packed components, in dense order.
    #[inline]
    pub fn components(&self) -> &[T] {
        &self.components
    }

    /// Iterate `(entity, &component)` pairs in dense order.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.entities.iter().zip(self.components.iter()),
        }
    }

    /// Iterate `(entity, &mut component)` pairs in dense order.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            inner: self.entities.iter().zip(self.components.iter_mut()),
        }
    }

    /// Split the storage into a view that hands out component references for distinct entities
    /// without holding a unique borrow per reference.
    pub(crate) fn slots_mut(&mut self) -> SlotsMut<'_, T> {
        let Self {
            sparse,
            entities,
            components,
        } = self;
        SlotsMut {
            sparse,
            entities,
            components: components.as_mut_ptr(),
            len: components.len(),
            _marker: PhantomData,
        }
    }
}

impl<'a, T> IntoIterator for &'a SparseSet<T> {
    type Item = (Entity, &'a T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut SparseSet<T> {
    type Item = (Entity, &'a mut T);
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Iterator over the `(entity, &component)` pairs of a [`SparseSet`].
pub struct Iter<'a, T> {
    inner: Zip<slice::Iter<'a, Entity>, slice::Iter<'a, T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (Entity, &'a T);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(&entity, component)| (entity, component))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// Iterator over the `(entity, &mut component)` pairs of a [`SparseSet`].
pub struct IterMut<'a, T> {
    inner: Zip<slice::Iter<'a, Entity>, slice::IterMut<'a, T>>,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = (Entity, &'a mut T);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(&entity, component)| (entity, component))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

/// Mutable view of a [`SparseSet`] used by multi-type queries.
///
/// Components are reached through a raw pointer so that references to different entities' slots
/// can be live at the same time. The dense entity array stays borrowed for `'w`, which also keeps
/// the storage from being structurally modified while the view exists.
pub struct SlotsMut<'w, T> {
    sparse: &'w [usize],
    entities: &'w [Entity],
    components: *mut T,
    len: usize,
    _marker: PhantomData<&'w mut [T]>,
}

impl<'w, T> SlotsMut<'w, T> {
    /// The owning entities, in dense order.
    #[inline]
    pub fn entities(&self) -> &'w [Entity] {
        self.entities
    }

    /// Number of packed components.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Determine if no components are packed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the entity's component mutably for the whole view lifetime.
    ///
    /// # Safety
    /// The caller must not request the same entity index twice while a previously returned
    /// reference is still in use.
    #[inline]
    pub(crate) unsafe fn get(&self, entity: Entity) -> Option<&'w mut T> {
        match self.sparse.get(entity.index()) {
            Some(&slot) if slot != VACANT => {
                debug_assert!(slot < self.len);
                // SAFETY: `slot < len` by the sparse/dense invariant and the caller guarantees the
                // slot is not aliased.
                Some(unsafe { &mut *self.components.add(slot) })
            }
            _ => None,
        }
    }
}
