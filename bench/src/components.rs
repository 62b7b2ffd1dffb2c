//! Component types shared by the benchmarks.
//!
//! Sizes vary on purpose: every type gets its own dense array, so the size of a component decides
//! how many fit in a cache line while a query walks its storage.

use rusty_sparse_macros::Component;

/// Declare `x`/`y`/`z` float components (12 bytes each).
macro_rules! vector_components {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
            pub struct $name {
                pub x: f32,
                pub y: f32,
                pub z: f32,
            }
        )*
    };
}

vector_components!(
    /// World-space position.
    Position,
    /// Units per second along each axis.
    Velocity,
);

/// A wide component (64 bytes) for measuring the cost of moving large values.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Payload(pub [f32; 16]);

/// Display name, owning a heap allocation.
#[derive(Component, Clone, Debug, Default)]
pub struct Name(pub String);

/// Hit points, clamped to `max` when regenerating.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

/// Where an NPC is heading and when it next changes its mind.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Steering {
    pub mode: u32,
    pub cooldown: f32,
    pub target: [f32; 2],
}

/// Faction id.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Team(pub u32);

/// Seconds left before a short-lived entity is destroyed.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Lifetime {
    pub remaining: f32,
    pub total: f32,
}

/// Particle tint with an alpha that fades out over its lifetime.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Tint {
    pub rgb: [f32; 3],
    pub alpha: f32,
}

/// Zero-sized tag, stored as a dense entity list with no component bytes.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Marker;

#[cfg(test)]
mod tests {
    use rusty_sparse::ecs::SparseSet;
    use std::mem::size_of_val;

    use super::*;

    #[test]
    fn dense_arrays_hold_component_bytes_only() {
        // Given
        let mut positions = SparseSet::new();
        let mut payloads = SparseSet::new();
        let mut markers = SparseSet::new();
        let mut registry = rusty_sparse::ecs::Registry::new();
        for _ in 0..4 {
            let entity = registry.create();
            positions.insert(entity, Position::default());
            payloads.insert(entity, Payload::default());
            markers.insert(entity, Marker);
        }

        // Then
        assert_eq!(size_of_val(positions.components()), 4 * 12);
        assert_eq!(size_of_val(payloads.components()), 4 * 64);
        assert_eq!(size_of_val(markers.components()), 0);
        assert_eq!(markers.len(), 4);
    }
}
