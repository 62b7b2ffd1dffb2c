//! Component storage and the per-registry table of storages.
//!
//! Every component type gets its own [`SparseSet`]. The [`Storages`] table owns them behind the
//! type-erased [`ErasedStorage`] interface, so a registry can purge an entity from every storage
//! without knowing which component types exist.
//!
//! Storages are created lazily: the first time a registry assigns, removes or queries a type, the
//! type is given the next [`Family`] and an empty storage is pushed at that position.

mod sparse_set;

use std::{
    any::{Any, TypeId, type_name},
    collections::HashMap,
    fmt,
    marker::PhantomData,
};

use fixedbitset::FixedBitSet;
use log::debug;

use crate::ecs::{
    component::{Component, Family},
    entity::Entity,
};

pub use sparse_set::{Iter, IterMut, SlotsMut, SparseSet};

/// Operations a registry needs on a storage without knowing its component type.
pub trait ErasedStorage: Any {
    /// Name of the stored component type.
    fn component_name(&self) -> &'static str;

    /// Number of packed components.
    fn len(&self) -> usize;

    /// Determine if no components are packed.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove the entity's component, if any.
    fn remove_entity(&mut self, entity: Entity);

    /// Drop every component and release memory.
    fn clear(&mut self);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedStorage for SparseSet<T> {
    fn component_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn len(&self) -> usize {
        SparseSet::len(self)
    }

    fn remove_entity(&mut self, entity: Entity) {
        self.remove(entity);
    }

    fn clear(&mut self) {
        SparseSet::clear(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// The storages of one registry, indexed by [`Family`].
#[derive(Default)]
pub struct Storages {
    /// Family of each component type seen so far.
    families: HashMap<TypeId, Family>,

    /// One storage per family, at the family's index.
    entries: Vec<Box<dyn ErasedStorage>>,
}

impl Storages {
    /// Construct an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the family of `T`, if a storage for it exists.
    #[inline]
    pub fn family<T: Component>(&self) -> Option<Family> {
        self.families.get(&TypeId::of::<T>()).copied()
    }

    /// Get the family of `T`, creating an empty storage for it on first use.
    pub fn assure<T: Component>(&mut self) -> Family {
        if let Some(family) = self.family::<T>() {
            return family;
        }

        let family = Family::from(self.entries.len());
        self.entries.push(Box::new(SparseSet::<T>::new()));
        self.families.insert(TypeId::of::<T>(), family);
        debug!("created storage for component `{}` as family {family}", type_name::<T>());
        family
    }

    /// Get the storage of `T`, if it exists.
    pub fn get<T: Component>(&self) -> Option<&SparseSet<T>> {
        let family = self.family::<T>()?;
        self.entries[family.index()].as_any().downcast_ref()
    }

    /// Get the storage of `T` mutably, if it exists.
    pub fn get_mut<T: Component>(&mut self) -> Option<&mut SparseSet<T>> {
        let family = self.family::<T>()?;
        self.entries[family.index()].as_any_mut().downcast_mut()
    }

    /// Get the storage of `T` mutably, creating it on first use.
    pub fn assure_mut<T: Component>(&mut self) -> &mut SparseSet<T> {
        let family = self.assure::<T>();
        match self.entries[family.index()].as_any_mut().downcast_mut() {
            Some(storage) => storage,
            None => unreachable!("family {family} does not store `{}`", type_name::<T>()),
        }
    }

    /// Remove the entity's components from every storage.
    pub fn remove_entity(&mut self, entity: Entity) {
        for storage in &mut self.entries {
            storage.remove_entity(entity);
        }
    }

    /// Number of component types with a storage.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Determine if no storage has been created yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clean every storage, then release all of them and forget every family.
    pub fn clear(&mut self) {
        for storage in &mut self.entries {
            storage.clear();
        }
        self.entries.clear();
        self.families.clear();
    }

    /// Split the table into independently borrowable storages.
    pub(crate) fn cells(&mut self) -> Cells<'_> {
        Cells {
            families: &self.families,
            entries: self.entries.as_mut_ptr(),
            len: self.entries.len(),
            _marker: PhantomData,
        }
    }
}

impl fmt::Debug for Storages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.entries
                    .iter()
                    .map(|storage| (storage.component_name(), storage.len())),
            )
            .finish()
    }
}

/// Unique access to the whole table, handing out one storage per family at a time.
pub(crate) struct Cells<'s> {
    families: &'s HashMap<TypeId, Family>,
    entries: *mut Box<dyn ErasedStorage>,
    len: usize,
    _marker: PhantomData<&'s mut [Box<dyn ErasedStorage>]>,
}

impl<'s> Cells<'s> {
    /// Panic unless every requested family is distinct.
    pub(crate) fn assert_disjoint(&self, requested: &[(Family, &'static str)]) {
        let mut seen = FixedBitSet::with_capacity(self.len);
        for &(family, name) in requested {
            if seen.put(family.index()) {
                panic!("query requests mutable access to `{name}` more than once");
            }
        }
    }

    /// Get the storage of `T` mutably for the lifetime of the table borrow.
    ///
    /// # Safety
    /// The caller must not request the same component type twice from one `Cells`.
    pub(crate) unsafe fn get_mut<T: Component>(&self) -> Option<&'s mut SparseSet<T>> {
        let family = *self.families.get(&TypeId::of::<T>())?;
        debug_assert!(family.index() < self.len);
        // SAFETY: the family indexes a live entry and the caller guarantees it is not aliased.
        let entry = unsafe { &mut *self.entries.add(family.index()) };
        entry.as_any_mut().downcast_mut()
    }
}
