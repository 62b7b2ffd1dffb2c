//! Entity/component storage built on generational handles and sparse sets.
//!
//! - [`Entity`] handles are allocated and recycled by a [`Registry`].
//! - Each component type lives in its own [`SparseSet`], created the first time the registry
//!   sees the type.
//! - [`Query`] walks the entities that carry one or more component types.
pub mod component;
pub mod entity;
pub mod query;
pub mod registry;
pub mod storage;

mod error;
pub(crate) mod util;

pub use component::{Component, Family};
pub use entity::{Entity, Generation};
pub use error::Error;
pub use query::Query;
pub use registry::{Config, Registry};
pub use storage::SparseSet;

pub use rusty_sparse_macros::Component;
