//! Particle system benchmark scenario.
//!
//! Simulates a high-volume particle system with:
//! - 100,000 particles
//! - Simple components: Position, Velocity, Lifetime, Tint
//! - Passes: movement, lifetime decay, fade, destroy and respawn dead particles
//!
//! This scenario tests:
//! - Joins over storages of equal size
//! - Entity create/destroy throughput and index recycling

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rusty_sparse::ecs::{Entity, Registry};

use crate::components::{Lifetime, Position, Tint, Velocity};
use crate::scenarios::Scenario;

/// Configuration for the particle benchmark.
pub struct ParticleConfig {
    /// Total number of particles to maintain.
    pub particle_count: usize,
    /// Simulated delta time per frame.
    pub delta_time: f32,
    /// Random seed for reproducibility.
    pub seed: u64,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            particle_count: 100_000,
            delta_time: 1.0 / 60.0, // 60 FPS
            seed: 12345,
        }
    }
}

struct ParticleFactory(ChaCha8Rng);

impl ParticleFactory {
    fn create_particle(&mut self, registry: &mut Registry) -> Entity {
        let rng = &mut self.0;
        let entity = registry.create();
        registry.assign(
            entity,
            Position {
                x: rng.gen_range(-100.0..100.0),
                y: rng.gen_range(-100.0..100.0),
                z: rng.gen_range(-100.0..100.0),
            },
        );
        registry.assign(
            entity,
            Velocity {
                x: rng.gen_range(-10.0..10.0),
                y: rng.gen_range(-10.0..10.0),
                z: rng.gen_range(-10.0..10.0),
            },
        );
        registry.assign(
            entity,
            Lifetime {
                remaining: rng.gen_range(0.1..1.0),
                total: 1.0,
            },
        );
        registry.assign(
            entity,
            Tint {
                rgb: [
                    rng.gen_range(0.0..1.0),
                    rng.gen_range(0.0..1.0),
                    rng.gen_range(0.0..1.0),
                ],
                alpha: 1.0,
            },
        );
        entity
    }
}

/// Particle system benchmark scenario.
pub struct ParticleScenario {
    config: ParticleConfig,
    registry: Registry,
    factory: ParticleFactory,
    dead: Vec<Entity>,
}

impl ParticleScenario {
    /// Create a new particle scenario with default config.
    pub fn new() -> Self {
        Self::with_config(ParticleConfig::default())
    }

    /// Create a new particle scenario with custom config.
    pub fn with_config(config: ParticleConfig) -> Self {
        Self {
            registry: Registry::new(),
            factory: ParticleFactory(ChaCha8Rng::seed_from_u64(config.seed)),
            dead: Vec::new(),
            config,
        }
    }

    /// Get current particle count.
    pub fn current_count(&self) -> usize {
        self.registry.alive_count()
    }

    /// Apply velocity to position.
    pub fn movement(&mut self) {
        let dt = self.config.delta_time;
        self.registry
            .for_each_mut::<(Position, Velocity), _>(|_, (pos, vel)| {
                pos.x += vel.x * dt;
                pos.y += vel.y * dt;
                pos.z += vel.z * dt;
            });
    }

    /// Decay lifetimes and collect the particles that ran out.
    pub fn lifetime_decay(&mut self) {
        let dt = self.config.delta_time;
        let dead = &mut self.dead;
        self.registry
            .for_each_mut::<Lifetime, _>(|entity, lifetime| {
                lifetime.remaining -= dt;
                if lifetime.remaining <= 0.0 {
                    dead.push(entity);
                }
            });
    }

    /// Fade particles based on remaining lifetime.
    pub fn fade(&mut self) {
        self.registry
            .for_each_mut::<(Lifetime, Tint), _>(|_, (lifetime, tint)| {
                tint.alpha = (lifetime.remaining / lifetime.total).max(0.0);
            });
    }

    /// Replace every dead particle with a fresh one.
    pub fn respawn(&mut self) {
        for entity in self.dead.drain(..) {
            self.registry.destroy(entity);
            self.factory.create_particle(&mut self.registry);
        }
    }
}

impl Default for ParticleScenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario for ParticleScenario {
    fn name(&self) -> &'static str {
        "particles"
    }

    fn description(&self) -> &'static str {
        "High-volume particle system with movement, lifetime, and respawn"
    }

    fn entity_count(&self) -> usize {
        self.config.particle_count
    }

    fn setup(&mut self) {
        for _ in 0..self.config.particle_count {
            self.factory.create_particle(&mut self.registry);
        }
    }

    fn update(&mut self) {
        self.movement();
        self.lifetime_decay();
        self.fade();
        self.respawn();
    }

    fn teardown(&mut self) {
        let mut entities = Vec::with_capacity(self.registry.alive_count());
        self.registry
            .for_each::<Lifetime, _>(|entity, _| entities.push(entity));
        for entity in entities {
            self.registry.destroy(entity);
        }
    }
}
