//! Errors reported by fallible registry lookups.

use crate::ecs::entity::Entity;

/// Errors returned by [`Registry::fetch`](crate::ecs::Registry::fetch) and
/// [`Registry::fetch_mut`](crate::ecs::Registry::fetch_mut).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The handle does not refer to a live entity.
    #[error("entity {0} is not alive")]
    DeadEntity(Entity),

    /// The entity is alive but has no component of the requested type.
    #[error("entity {entity} has no `{component}` component")]
    MissingComponent {
        entity: Entity,
        component: &'static str,
    },
}
