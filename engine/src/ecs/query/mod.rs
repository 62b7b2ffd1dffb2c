//! Queries over the entities that carry a set of component types.
//!
//! A [`Query`] names the component types to visit. It is implemented for every [`Component`]
//! type, which walks that type's storage directly, and for tuples of 1 to 12 component types,
//! which join their storages:
//!
//! ```rust,ignore
//! registry.for_each::<Name, _>(|entity, name| println!("{entity}: {}", name.0));
//!
//! registry.for_each::<(Name, Position), _>(|entity, (name, position)| {
//!     println!("{entity}: {} at {:?}", name.0, position);
//! });
//! ```
//!
//! # Join Strategy
//!
//! A tuple query picks the storage with the fewest packed entries as the *driver*, walks the
//! driver's entities in dense order and probes every requested storage for each one. Entities
//! missing any of the types are skipped. The driver only affects how many probes are made, never
//! which entities are visited.
//!
//! # Mutation During Iteration
//!
//! Queries borrow the registry mutably for the whole traversal, so storages cannot be
//! structurally changed from inside the callback.
//!
//! Mutable queries hand out `&mut` references to several storages at once and panic if the same
//! component type is requested twice, e.g. `(Position, Position)`.

use std::any::type_name;

use crate::ecs::{
    component::Component,
    entity::Entity,
    storage::{SlotsMut, SparseSet, Storages},
};

/// A set of component types that can be visited together.
pub trait Query: 'static {
    /// Shared borrows of the storages visited by the query.
    type Fetch<'w>;

    /// Unique borrows of the storages visited by the query.
    type FetchMut<'w>;

    /// What the callback receives for each matching entity.
    type Item<'w>;

    /// What the mutable callback receives for each matching entity.
    type ItemMut<'w>;

    /// Create any missing storage for the requested types.
    fn register(storages: &mut Storages);

    /// Borrow the requested storages, or `None` if one of them does not exist.
    fn fetch(storages: &Storages) -> Option<Self::Fetch<'_>>;

    /// Borrow the requested storages uniquely, or `None` if one of them does not exist.
    ///
    /// # Panics
    /// Panics if the same component type is requested more than once.
    fn fetch_mut(storages: &mut Storages) -> Option<Self::FetchMut<'_>>;

    /// Call `f` once for every entity carrying all requested types.
    fn each<'w, F>(fetch: Self::Fetch<'w>, f: F)
    where
        F: FnMut(Entity, Self::Item<'w>);

    /// Call `f` once for every entity carrying all requested types, with mutable access.
    fn each_mut<'w, F>(fetch: Self::FetchMut<'w>, f: F)
    where
        F: FnMut(Entity, Self::ItemMut<'w>);
}

impl<T: Component> Query for T {
    type Fetch<'w> = &'w SparseSet<T>;
    type FetchMut<'w> = &'w mut SparseSet<T>;
    type Item<'w> = &'w T;
    type ItemMut<'w> = &'w mut T;

    fn register(storages: &mut Storages) {
        storages.assure::<T>();
    }

    fn fetch(storages: &Storages) -> Option<Self::Fetch<'_>> {
        storages.get::<T>()
    }

    fn fetch_mut(storages: &mut Storages) -> Option<Self::FetchMut<'_>> {
        storages.get_mut::<T>()
    }

    fn each<'w, F>(fetch: Self::Fetch<'w>, mut f: F)
    where
        F: FnMut(Entity, Self::Item<'w>),
    {
        for (entity, component) in fetch.iter() {
            f(entity, component);
        }
    }

    fn each_mut<'w, F>(fetch: Self::FetchMut<'w>, mut f: F)
    where
        F: FnMut(Entity, Self::ItemMut<'w>),
    {
        for (entity, component) in fetch.iter_mut() {
            f(entity, component);
        }
    }
}

/// Pick the shortest entity list to drive a join.
#[inline]
fn driver<'w>(candidates: &[&'w [Entity]]) -> &'w [Entity] {
    candidates
        .iter()
        .copied()
        .min_by_key(|entities| entities.len())
        .unwrap_or(&[])
}

macro_rules! impl_query_for_tuple {
    ($($name:ident),*) => {
        #[allow(non_snake_case)]
        impl<$($name: Component),*> Query for ($($name,)*) {
            type Fetch<'w> = ($(&'w SparseSet<$name>,)*);
            type FetchMut<'w> = ($(SlotsMut<'w, $name>,)*);
            type Item<'w> = ($(&'w $name,)*);
            type ItemMut<'w> = ($(&'w mut $name,)*);

            fn register(storages: &mut Storages) {
                $(storages.assure::<$name>();)*
            }

            fn fetch(storages: &Storages) -> Option<Self::Fetch<'_>> {
                Some(($(storages.get::<$name>()?,)*))
            }

            fn fetch_mut(storages: &mut Storages) -> Option<Self::FetchMut<'_>> {
                let requested = [$((storages.family::<$name>()?, type_name::<$name>()),)*];
                let cells = storages.cells();
                cells.assert_disjoint(&requested);
                // SAFETY: every requested family was checked to be distinct above.
                Some(($(unsafe { cells.get_mut::<$name>() }?.slots_mut(),)*))
            }

            fn each<'w, Func>(fetch: Self::Fetch<'w>, mut f: Func)
            where
                Func: FnMut(Entity, Self::Item<'w>),
            {
                let ($($name,)*) = fetch;
                for &entity in driver(&[$($name.entities(),)*]) {
                    if let ($(Some($name),)*) = ($($name.get(entity),)*) {
                        f(entity, ($($name,)*));
                    }
                }
            }

            fn each_mut<'w, Func>(fetch: Self::FetchMut<'w>, mut f: Func)
            where
                Func: FnMut(Entity, Self::ItemMut<'w>),
            {
                let ($($name,)*) = fetch;
                for &entity in driver(&[$($name.entities(),)*]) {
                    // SAFETY: a dense entity list holds each index once, so no slot is handed
                    // out twice.
                    if let ($(Some($name),)*) = ($(unsafe { $name.get(entity) },)*) {
                        f(entity, ($($name,)*));
                    }
                }
            }
        }
    };
}

crate::all_tuples!(impl_query_for_tuple);

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::ecs::entity::Generation;

    #[derive(rusty_sparse_macros::Component, Debug, Clone, PartialEq)]
    struct A(u32);

    #[derive(rusty_sparse_macros::Component, Debug, Clone, PartialEq)]
    struct B(u32);

    #[derive(rusty_sparse_macros::Component, Debug, Clone, PartialEq)]
    struct C(u32);

    fn entity(index: usize) -> Entity {
        Entity::new(index, Generation::FIRST)
    }

    /// A on 0..10, B on even indices, C on multiples of 3.
    fn populated() -> Storages {
        let mut storages = Storages::new();
        for index in 0..10 {
            storages.assure_mut::<A>().insert(entity(index), A(index as u32));
            if index % 2 == 0 {
                storages.assure_mut::<B>().insert(entity(index), B(index as u32 * 10));
            }
            if index % 3 == 0 {
                storages.assure_mut::<C>().insert(entity(index), C(index as u32 * 100));
            }
        }
        storages
    }

    fn visit<Q: Query>(storages: &Storages) -> Vec<usize> {
        let mut visited = Vec::new();
        Q::each(Q::fetch(storages).unwrap(), |entity, _| visited.push(entity.index()));
        visited.sort();
        visited
    }

    #[test]
    fn driver_is_smallest_candidate() {
        // Given
        let long = [entity(0), entity(1), entity(2)];
        let short = [entity(2)];

        // Then
        assert_eq!(driver(&[&long[..], &short[..]]), &short[..]);
        assert_eq!(driver(&[]), &[] as &[Entity]);
    }

    #[test]
    fn single_type_visits_whole_storage() {
        // Given
        let storages = populated();

        // Then
        assert_eq!(visit::<A>(&storages), (0..10).collect::<Vec<_>>());
        assert_eq!(visit::<C>(&storages), vec![0, 3, 6, 9]);
    }

    #[test]
    fn pair_visits_intersection() {
        // Given
        let storages = populated();

        // Then
        assert_eq!(visit::<(A, B)>(&storages), vec![0, 2, 4, 6, 8]);
        assert_eq!(visit::<(B, C)>(&storages), vec![0, 6]);
    }

    #[test]
    fn join_is_independent_of_type_order() {
        // Given
        let storages = populated();

        // Then
        assert_eq!(visit::<(A, B, C)>(&storages), visit::<(C, B, A)>(&storages));
        assert_eq!(visit::<(A, B, C)>(&storages), vec![0, 6]);
    }

    #[test]
    fn join_yields_components_in_requested_order() {
        // Given
        let storages = populated();
        let mut seen = Vec::new();

        // When
        <(C, A)>::each(<(C, A)>::fetch(&storages).unwrap(), |entity, (c, a)| {
            seen.push((entity.index(), c.0, a.0));
        });
        seen.sort();

        // Then
        assert_eq!(seen, vec![(0, 0, 0), (3, 300, 3), (6, 600, 6), (9, 900, 9)]);
    }

    #[test]
    fn join_visits_each_entity_once() {
        // Given
        let storages = populated();
        let mut seen = HashSet::new();

        // When
        <(A, A)>::each(<(A, A)>::fetch(&storages).unwrap(), |entity, (a1, a2)| {
            assert_eq!(a1, a2);
            assert!(seen.insert(entity));
        });

        // Then
        assert_eq!(seen.len(), 10);
    }

    #[test]
    fn fetch_fails_for_missing_storage() {
        // Given
        let mut storages = Storages::new();
        storages.assure::<A>();

        // Then
        assert!(<(A, B)>::fetch(&storages).is_none());

        // When
        <(A, B)>::register(&mut storages);

        // Then
        assert!(<(A, B)>::fetch(&storages).is_some());
    }

    #[test]
    fn mutable_join_updates_only_matches() {
        // Given
        let mut storages = populated();

        // When
        let fetch = <(B, C)>::fetch_mut(&mut storages).unwrap();
        <(B, C)>::each_mut(fetch, |_, (b, c)| {
            b.0 += 1;
            c.0 += 1;
        });

        // Then
        let b = storages.get::<B>().unwrap();
        let c = storages.get::<C>().unwrap();
        assert_eq!(b.get(entity(6)), Some(&B(61)));
        assert_eq!(b.get(entity(2)), Some(&B(20)));
        assert_eq!(c.get(entity(0)), Some(&C(1)));
        assert_eq!(c.get(entity(3)), Some(&C(300)));
    }

    #[test]
    fn mutable_single_type() {
        // Given
        let mut storages = populated();

        // When
        let fetch = C::fetch_mut(&mut storages).unwrap();
        C::each_mut(fetch, |_, c| c.0 = 7);

        // Then
        assert!(storages.get::<C>().unwrap().components().iter().all(|c| c.0 == 7));
    }

    #[test]
    #[should_panic(expected = "more than once")]
    fn mutable_join_rejects_aliasing() {
        // Given
        let mut storages = populated();

        // Then
        let _ = <(A, B, A)>::fetch_mut(&mut storages);
    }
}
