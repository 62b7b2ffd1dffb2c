//! Entity handles and their allocation.
//!
//! An [`Entity`] is an opaque, copyable 64-bit handle. The low 56 bits hold the index of the slot
//! the entity occupies, the high 8 bits hold the [`Generation`] of that slot at the time the handle
//! was handed out. Entities carry no data; components are attached to them through a
//! [`Registry`](crate::ecs::Registry).
//!
//! # Generation Tracking
//!
//! When an entity is freed its slot's generation is incremented before the index is queued for
//! reuse. Any handle still pointing at the old occupant keeps the old generation and is therefore
//! recognised as stale, even once a new entity lives at the same index:
//!
//! ```rust,ignore
//! let entity = allocator.alloc(); // 0v0
//! allocator.free(entity);
//! // ... once enough indices are queued, 0 is handed out again as 0v1
//! assert!(!allocator.is_alive(entity));
//! ```
//!
//! # Delayed Reuse
//!
//! Generations are only 8 bits wide and wrap after 256 reuses of a slot. To keep a long-stale
//! handle from matching a wrapped generation, freed indices are only recycled once more than
//! [`Config::min_free_indices`](crate::ecs::Config::min_free_indices) of them are waiting. Until
//! then fresh indices are allocated.

use std::fmt;

use crossbeam::queue::SegQueue;
use log::trace;

/// The generation of an entity slot. Starts at `FIRST` and is incremented, wrapping at 256, each
/// time the slot is freed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u8);

impl Generation {
    /// The generation of a freshly allocated slot.
    pub const FIRST: Self = Self(0);

    /// Get the generation that follows this one, wrapping back to `FIRST` after 255.
    #[inline]
    pub const fn next(&self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Get the raw generation value.
    #[inline]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl From<u8> for Generation {
    #[inline]
    fn from(value: u8) -> Self {
        Self(value)
    }
}

/// A generation-tagged handle to an entity.
///
/// Equality is structural: two handles are equal only if both index and generation match.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity(u64);

impl Entity {
    /// Number of low bits holding the slot index.
    pub const INDEX_BITS: u32 = 56;

    /// Mask selecting the index bits of a raw handle.
    pub const INDEX_MASK: u64 = (1 << Self::INDEX_BITS) - 1;

    /// Number of slots addressable by a handle.
    pub const MAX_INDICES: u64 = 1 << Self::INDEX_BITS;

    /// The sentinel handle, raw value `0`.
    ///
    /// Note that it shares its bits with index 0 at the first generation, so it only serves as a
    /// placeholder value and must not be used to test whether a handle was ever assigned.
    pub const INVALID: Self = Self(0);

    /// Construct a handle from a slot index and generation.
    ///
    /// # Panics
    /// Debug builds panic if `index` does not fit in [`Entity::INDEX_BITS`] bits.
    #[inline]
    pub(crate) const fn new(index: usize, generation: Generation) -> Self {
        debug_assert!((index as u64) < Self::MAX_INDICES, "entity index out of range");
        Self(((generation.0 as u64) << Self::INDEX_BITS) | (index as u64 & Self::INDEX_MASK))
    }

    /// Rebuild a handle from its raw bits, as produced by [`Entity::to_bits`].
    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Get the raw 64-bit value of this handle.
    #[inline]
    pub const fn to_bits(&self) -> u64 {
        self.0
    }

    /// Get the slot index of this entity, for use in indexable storage (e.g. Vec).
    #[inline]
    pub const fn index(&self) -> usize {
        (self.0 & Self::INDEX_MASK) as usize
    }

    /// Get the generation of the slot this handle was issued for.
    #[inline]
    pub const fn generation(&self) -> Generation {
        Generation((self.0 >> Self::INDEX_BITS) as u8)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation().0)
    }
}

/// Validate a fresh slot index against the 56 bits a handle can address.
///
/// # Panics
/// Panics if `index` is not below [`Entity::MAX_INDICES`].
#[inline]
const fn checked_index(index: usize) -> usize {
    assert!(
        (index as u64) < Entity::MAX_INDICES,
        "entity index space exhausted"
    );
    index
}

/// An allocator for entity handles.
///
/// Keeps the current generation of every slot ever handed out and a FIFO pool of freed indices.
/// The allocator does not validate what it is asked to free; the
/// [`Registry`](crate::ecs::Registry) only frees entities it has checked to be alive.
#[derive(Debug, Default)]
pub struct Allocator {
    /// Current generation of each slot, indexed by entity index.
    generations: Vec<Generation>,

    /// Freed indices, oldest first.
    dead_pool: SegQueue<usize>,

    /// Freed indices are only reused while more than this many are pooled.
    min_free_indices: usize,
}

impl Allocator {
    /// Construct an allocator that reuses indices once more than `min_free_indices` are free.
    #[inline]
    pub const fn new(min_free_indices: usize) -> Self {
        Self {
            generations: Vec::new(),
            dead_pool: SegQueue::new(),
            min_free_indices,
        }
    }

    /// Allocate an entity, reusing the oldest freed index when enough are pooled and allocating a
    /// fresh index otherwise.
    ///
    /// # Panics
    /// Panics if all [`Entity::MAX_INDICES`] slots are in use.
    pub fn alloc(&mut self) -> Entity {
        if self.dead_pool.len() > self.min_free_indices
            && let Some(index) = self.dead_pool.pop()
        {
            let generation = self.generations[index];
            trace!("recycling entity index {index} at generation {}", generation.0);
            return Entity::new(index, generation);
        }

        let index = checked_index(self.generations.len());
        self.generations.push(Generation::FIRST);
        Entity::new(index, Generation::FIRST)
    }

    /// Free an entity's slot: bump its generation and queue the index for reuse.
    ///
    /// The entity must be alive. Freeing a stale handle would bump the generation of whichever
    /// entity currently occupies the slot.
    pub fn free(&mut self, entity: Entity) {
        let index = entity.index();
        let generation = self.generations[index].next();
        if generation == Generation::FIRST {
            trace!("generation of entity index {index} wrapped");
        }
        self.generations[index] = generation;
        self.dead_pool.push(index);
    }

    /// Determine if the handle refers to the current occupant of its slot.
    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.generations.get(entity.index()) == Some(&entity.generation())
    }

    /// Get the current generation of a slot, or `None` if the index was never allocated.
    #[inline]
    pub fn generation(&self, index: usize) -> Option<Generation> {
        self.generations.get(index).copied()
    }

    /// Number of entities currently alive.
    #[inline]
    pub fn alive_count(&self) -> usize {
        self.generations.len() - self.dead_pool.len()
    }

    /// Number of freed indices waiting to be reused.
    #[inline]
    pub fn free_count(&self) -> usize {
        self.dead_pool.len()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    #[test]
    fn entity_bit_layout() {
        // Given
        let entity = Entity::new(42, Generation(7));

        // Then
        assert_eq!(entity.index(), 42);
        assert_eq!(entity.generation(), Generation(7));
        assert_eq!(entity.to_bits(), (7u64 << 56) | 42);
        assert_eq!(Entity::from_bits(entity.to_bits()), entity);
    }

    #[test]
    fn entity_max_index_keeps_generation_intact() {
        // Given
        let index = (Entity::MAX_INDICES - 1) as usize;

        // When
        let entity = Entity::new(index, Generation(255));

        // Then
        assert_eq!(entity.index(), index);
        assert_eq!(entity.generation(), Generation(255));
    }

    #[test]
    fn entity_invalid_is_zero() {
        assert_eq!(Entity::INVALID.to_bits(), 0);
        assert_eq!(Entity::default(), Entity::INVALID);
    }

    #[test]
    fn entity_display() {
        assert_eq!(Entity::new(3, Generation(2)).to_string(), "3v2");
    }

    #[test]
    fn entity_equality() {
        // Given
        let e1 = Entity::new(42, Generation::FIRST);
        let e2 = Entity::new(42, Generation::FIRST);
        let e3 = Entity::new(43, Generation::FIRST);
        let e1_gen1 = Entity::new(42, Generation::FIRST.next());

        // Then
        assert_eq!(e1, e2);
        assert_ne!(e1, e3);
        assert_ne!(e1, e1_gen1);
    }

    #[test]
    fn generation_wraps() {
        assert_eq!(Generation(254).next(), Generation(255));
        assert_eq!(Generation(255).next(), Generation::FIRST);
    }

    #[test]
    fn allocator_uniqueness() {
        // Given
        let mut allocator = Allocator::new(0);

        // When
        let mut entities: Vec<_> = (0..200).map(|_| allocator.alloc()).collect();

        // Then - No dupes generated
        let pre_len = entities.len();
        entities.sort();
        entities.dedup();
        assert_eq!(pre_len, entities.len());
    }

    #[test]
    fn allocator_fresh_indices_are_sequential() {
        // Given
        let mut allocator = Allocator::new(1024);

        // When
        let e0 = allocator.alloc();
        let e1 = allocator.alloc();
        let e2 = allocator.alloc();

        // Then
        assert_eq!([e0.index(), e1.index(), e2.index()], [0, 1, 2]);
        assert!([e0, e1, e2].iter().all(|e| e.generation() == Generation::FIRST));
        assert_eq!(allocator.alive_count(), 3);
    }

    #[test]
    fn allocator_free_kills_handle() {
        // Given
        let mut allocator = Allocator::new(1024);
        let entity = allocator.alloc();
        assert!(allocator.is_alive(entity));

        // When
        allocator.free(entity);

        // Then
        assert!(!allocator.is_alive(entity));
        assert_eq!(allocator.generation(0), Some(Generation(1)));
        assert_eq!(allocator.free_count(), 1);
        assert_eq!(allocator.alive_count(), 0);
    }

    #[test]
    fn allocator_holds_back_reuse_below_low_water_mark() {
        // Given
        let mut allocator = Allocator::new(4);
        let first = allocator.alloc();
        allocator.free(first);

        // When - Only one index pooled, which is not more than 4
        let next = allocator.alloc();

        // Then - A fresh index is used
        assert_eq!(next.index(), 1);
        assert_eq!(next.generation(), Generation::FIRST);
    }

    #[test]
    fn allocator_reuses_oldest_index_first() {
        // Given
        let mut allocator = Allocator::new(2);
        let entities: Vec<_> = (0..3).map(|_| allocator.alloc()).collect();
        for &entity in entities.iter().rev() {
            allocator.free(entity);
        }

        // When - Three indices pooled, more than 2
        let reused = allocator.alloc();

        // Then - The first one freed (index 2) comes back with the next generation
        assert_eq!(reused.index(), 2);
        assert_eq!(reused.generation(), Generation(1));
        assert!(allocator.is_alive(reused));
        assert!(!allocator.is_alive(entities[2]));
    }

    #[test]
    fn allocator_zero_low_water_mark_reuses_immediately() {
        // Given
        let mut allocator = Allocator::new(0);
        let entity = allocator.alloc();

        // When - Free and reallocate multiple times
        allocator.free(entity);
        let gen1 = allocator.alloc();
        allocator.free(gen1);
        let gen2 = allocator.alloc();

        // Then - Same index, incrementing generations
        assert_eq!(gen1.index(), entity.index());
        assert_eq!(gen1.generation(), Generation(1));
        assert_eq!(gen2.index(), entity.index());
        assert_eq!(gen2.generation(), Generation(2));
    }

    #[test]
    fn allocator_churn_past_low_water_mark() {
        // Given
        let mut allocator = Allocator::new(1024);
        let mut freed = VecDeque::new();

        // When - Create and destroy 2000 entities one at a time
        for _ in 0..2000 {
            let entity = allocator.alloc();
            allocator.free(entity);
            freed.push_back(entity);
        }
        // Mirror the allocator's reuse of the queue head.
        while freed.len() > allocator.free_count() {
            freed.pop_front();
        }
        let oldest = freed.front().copied().unwrap();
        let entity = allocator.alloc();

        // Then - The oldest freed index comes back one generation later
        assert_eq!(entity.index(), oldest.index());
        assert_eq!(entity.generation(), oldest.generation().next());
        assert!(!allocator.is_alive(oldest));
        assert!(allocator.is_alive(entity));
    }

    #[test]
    fn checked_index_accepts_last_slot() {
        let last = (Entity::MAX_INDICES - 1) as usize;
        assert_eq!(checked_index(0), 0);
        assert_eq!(checked_index(last), last);
    }

    #[test]
    #[should_panic(expected = "exhausted")]
    fn checked_index_rejects_index_past_last_slot() {
        checked_index(Entity::MAX_INDICES as usize);
    }

    #[test]
    fn allocator_is_alive_for_foreign_index() {
        // Given
        let allocator = Allocator::new(1024);

        // Then - Never allocated slots are not alive
        assert!(!allocator.is_alive(Entity::new(10, Generation::FIRST)));
        assert_eq!(allocator.generation(10), None);
    }
}
