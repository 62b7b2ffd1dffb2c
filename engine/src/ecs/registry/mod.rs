//! The registry is the container for every entity and component of one storage engine instance.
//!
//! A `Registry` owns an entity [`Allocator`](entity::Allocator) and one
//! [`SparseSet`] per component type it has seen. Component types are dispatched to their storage
//! through a [`Family`](crate::ecs::Family) assigned the first time the type is used with *this*
//! registry, so independent registries never share or disturb each other's type mapping.
//!
//! # Example
//!
//! ```ignore
//! use rusty_sparse::ecs::{Component, Registry};
//!
//! #[derive(Component)]
//! struct Name(&'static str);
//!
//! #[derive(Component)]
//! struct Position { x: f32, y: f32, z: f32 }
//!
//! let mut registry = Registry::new();
//!
//! let entity = registry.create();
//! registry.assign(entity, Name("Test"));
//! registry.assign(entity, Position { x: 25.0, y: 50.0, z: 100.0 });
//!
//! registry.for_each::<(Name, Position), _>(|entity, (name, position)| {
//!     println!("{entity}: {} at {}", name.0, position.x);
//! });
//!
//! registry.destroy(entity);
//! assert!(registry.get::<Name>(entity).is_none());
//! ```
//!
//! # Stale Handles
//!
//! Every component accessor checks the handle's generation first. A handle whose entity was
//! destroyed reads as "absent" everywhere, even after its index has been handed to a new entity.
mod config;

use std::{any::type_name, fmt, marker::PhantomData};

use log::{debug, warn};

use crate::ecs::{
    component::Component,
    entity::{self, Entity},
    error::Error,
    query::Query,
    storage::{SparseSet, Storages},
};

pub use config::Config;

/// Owns the entities and component storages of one storage engine instance.
pub struct Registry {
    /// The registry's configuration.
    config: Config,

    /// The registry's entity allocator.
    allocator: entity::Allocator,

    /// One storage per component type used with this registry.
    storages: Storages,

    /// Marker to make Registry !Send. A registry is driven from a single thread.
    _not_send: PhantomData<*mut ()>,
}

impl Registry {
    /// Construct an empty registry with the default [`Config`].
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Construct an empty registry with the given configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            allocator: entity::Allocator::new(config.min_free_indices()),
            storages: Storages::new(),
            _not_send: PhantomData,
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Create a new entity with no components.
    ///
    /// # Panics
    /// Panics if the entity index space is exhausted.
    pub fn create(&mut self) -> Entity {
        self.allocator.alloc()
    }

    /// Destroy an entity, dropping its components of every type.
    ///
    /// Returns `false` and leaves the registry untouched if the handle is not alive.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        if !self.allocator.is_alive(entity) {
            warn!("Attempted to destroy entity {entity} which is not alive");
            return false;
        }

        self.storages.remove_entity(entity);
        self.allocator.free(entity);
        true
    }

    /// Determine if the handle refers to a live entity.
    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.allocator.is_alive(entity)
    }

    /// Number of live entities.
    #[inline]
    pub fn alive_count(&self) -> usize {
        self.allocator.alive_count()
    }

    /// Attach a component to an entity, replacing any existing component of the same type, and
    /// return a reference to the stored value.
    ///
    /// # Panics
    /// Panics if the entity is not alive.
    pub fn assign<T: Component>(&mut self, entity: Entity, component: T) -> &mut T {
        assert!(
            self.allocator.is_alive(entity),
            "cannot assign `{}` to entity {entity} which is not alive",
            type_name::<T>()
        );
        self.storages.assure_mut::<T>().insert(entity, component)
    }

    /// Determine if a live entity has a component of type `T`.
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.get::<T>(entity).is_some()
    }

    /// Get the entity's component of type `T`, or `None` if the entity is dead or has none.
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        if !self.allocator.is_alive(entity) {
            return None;
        }
        self.storages.get::<T>()?.get(entity)
    }

    /// Get the entity's component of type `T` mutably, or `None` if the entity is dead or has
    /// none.
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.allocator.is_alive(entity) {
            return None;
        }
        self.storages.get_mut::<T>()?.get_mut(entity)
    }

    /// Get the entity's component of type `T`, reporting why it is unavailable.
    pub fn fetch<T: Component>(&self, entity: Entity) -> Result<&T, Error> {
        if !self.allocator.is_alive(entity) {
            return Err(Error::DeadEntity(entity));
        }
        self.storages
            .get::<T>()
            .and_then(|storage| storage.get(entity))
            .ok_or(Error::MissingComponent {
                entity,
                component: type_name::<T>(),
            })
    }

    /// Get the entity's component of type `T` mutably, reporting why it is unavailable.
    pub fn fetch_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T, Error> {
        if !self.allocator.is_alive(entity) {
            return Err(Error::DeadEntity(entity));
        }
        self.storages
            .get_mut::<T>()
            .and_then(|storage| storage.get_mut(entity))
            .ok_or(Error::MissingComponent {
                entity,
                component: type_name::<T>(),
            })
    }

    /// Detach and return the entity's component of type `T`.
    ///
    /// Does nothing if the entity has no such component. A dead handle never removes the
    /// component of whichever entity reused its index.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> Option<T> {
        let storage = self.storages.assure_mut::<T>();
        if !self.allocator.is_alive(entity) {
            warn!(
                "Attempted to remove `{}` from entity {entity} which is not alive",
                type_name::<T>()
            );
            return None;
        }
        storage.remove(entity)
    }

    /// Number of entities with a component of type `T`.
    pub fn count<T: Component>(&self) -> usize {
        self.storages.get::<T>().map_or(0, SparseSet::len)
    }

    /// Get read access to the storage of `T`, if the type has been used with this registry.
    #[inline]
    pub fn storage<T: Component>(&self) -> Option<&SparseSet<T>> {
        self.storages.get::<T>()
    }

    /// Call `f` for every entity carrying all component types named by `Q`.
    ///
    /// `Q` is a single component type or a tuple of them. Storages that do not exist yet are
    /// created empty, in which case nothing is visited.
    pub fn for_each<'w, Q, F>(&'w mut self, f: F)
    where
        Q: Query,
        F: FnMut(Entity, Q::Item<'w>),
    {
        Q::register(&mut self.storages);
        let storages: &'w Storages = &self.storages;
        if let Some(fetch) = Q::fetch(storages) {
            Q::each(fetch, f);
        }
    }

    /// Call `f` with mutable component references for every entity carrying all component types
    /// named by `Q`.
    ///
    /// # Panics
    /// Panics if `Q` names the same component type more than once.
    pub fn for_each_mut<'w, Q, F>(&'w mut self, f: F)
    where
        Q: Query,
        F: FnMut(Entity, Q::ItemMut<'w>),
    {
        Q::register(&mut self.storages);
        let storages: &'w mut Storages = &mut self.storages;
        if let Some(fetch) = Q::fetch_mut(storages) {
            Q::each_mut(fetch, f);
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        debug!(
            "Tearing down registry with {} storages and {} live entities",
            self.storages.len(),
            self.allocator.alive_count()
        );
        self.storages.clear();
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("alive", &self.allocator.alive_count())
            .field("storages", &self.storages)
            .finish()
    }
}
