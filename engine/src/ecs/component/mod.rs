//! Component types and their per-registry family identifiers.
//!
//! Components are the plain data values attached to entities. Any `'static` type can be a
//! component once it implements [`Component`], usually through `#[derive(Component)]`:
//!
//! ```ignore
//! use rusty_sparse::ecs::Component;
//!
//! #[derive(Component)]
//! struct Position { x: f32, y: f32, z: f32 }
//! ```
//!
//! Each registry assigns every component type it sees a [`Family`] on first use. Families are
//! dense, start at zero and are scoped to the registry that handed them out, so two registries
//! never disagree about which storage a type dispatches to.

use std::fmt;

/// A trait representing a component.
///
/// At present this only sets the required trait bounds for a type to be stored in a registry.
pub trait Component: 'static + Sized {}

/// A component family identifier, assigned per registry the first time a component type is used.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Family(u32);

impl Family {
    /// Construct a new family from a raw u32 value.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the index of this family for use in indexable storage (e.g. Vec, bitset).
    #[inline]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for Family {
    #[inline]
    fn from(value: usize) -> Self {
        Self::new(value as u32)
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
