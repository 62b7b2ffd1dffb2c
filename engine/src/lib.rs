//! An in-process entity/component storage engine.
//!
//! Entities are generation-tagged [`Entity`](ecs::Entity) handles. Components are plain data
//! stored per type in sparse sets and joined by multi-type queries through a
//! [`Registry`](ecs::Registry).

// Lets `#[derive(Component)]` expand to `::rusty_sparse::...` inside this crate too.
extern crate self as rusty_sparse;

pub mod ecs;

pub use ecs::{Component, Config, Entity, Error, Query, Registry};
