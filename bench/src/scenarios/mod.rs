//! Realistic workload benchmarks.
//!
//! These scenarios simulate real-world registry usage with representative entity counts,
//! component combinations and per-frame update passes.
//!
//! # Scenarios
//!
//! - **Particles**: High entity count, simple components, constant destroy/create churn
//! - **Game World**: Storages of very different sizes joined by multi-type queries

pub mod game_world;
pub mod particles;

pub use game_world::{GameWorldConfig, GameWorldScenario};
pub use particles::{ParticleConfig, ParticleScenario};

/// Common trait for benchmark scenarios.
pub trait Scenario {
    /// Human-readable name of the scenario.
    fn name(&self) -> &'static str;

    /// Brief description of what this scenario tests.
    fn description(&self) -> &'static str;

    /// Number of entities in this scenario.
    fn entity_count(&self) -> usize;

    /// Set up the scenario (create entities, initialize state).
    fn setup(&mut self);

    /// Run one "frame" of the scenario.
    fn update(&mut self);

    /// Clean up the scenario.
    fn teardown(&mut self);
}
