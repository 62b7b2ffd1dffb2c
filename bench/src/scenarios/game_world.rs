//! Game world benchmark scenario.
//!
//! Simulates a mixed game world with:
//! - ~10,000 entities sharing a position storage
//! - NPCs with AI, health, team affiliation
//! - Players with health and team
//! - Projectiles with short lifetimes
//! - Static objects
//!
//! This scenario tests:
//! - Driver selection when joined storages differ in size by orders of magnitude
//! - Complex component combinations
//! - Destroy/create churn mixed with iteration

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rusty_sparse::ecs::{Entity, Registry};

use crate::components::{Health, Lifetime, Name, Position, Steering, Team, Velocity};
use crate::scenarios::Scenario;

/// Configuration for the game world benchmark.
#[derive(Clone)]
pub struct GameWorldConfig {
    /// Number of NPC entities.
    pub npc_count: usize,
    /// Number of player entities.
    pub player_count: usize,
    /// Number of projectile entities.
    pub projectile_count: usize,
    /// Number of static objects.
    pub static_count: usize,
    /// Simulated delta time per frame.
    pub delta_time: f32,
    /// Random seed for reproducibility.
    pub seed: u64,
}

impl Default for GameWorldConfig {
    fn default() -> Self {
        Self {
            npc_count: 5_000,
            player_count: 100,
            projectile_count: 2_000,
            static_count: 3_000,
            delta_time: 1.0 / 60.0,
            seed: 54321,
        }
    }
}

/// Game world benchmark scenario.
pub struct GameWorldScenario {
    config: GameWorldConfig,
    registry: Registry,
    rng: ChaCha8Rng,
    dead: Vec<Entity>,
}

impl GameWorldScenario {
    /// Create a new game world scenario with default config.
    pub fn new() -> Self {
        Self::with_config(GameWorldConfig::default())
    }

    /// Create a new game world scenario with custom config.
    pub fn with_config(config: GameWorldConfig) -> Self {
        Self {
            registry: Registry::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            dead: Vec::new(),
            config,
        }
    }

    /// Direct access to the registry.
    pub fn registry(&mut self) -> &mut Registry {
        &mut self.registry
    }

    fn random_position(&mut self) -> Position {
        Position {
            x: self.rng.gen_range(-500.0..500.0),
            y: self.rng.gen_range(-500.0..500.0),
            z: 0.0,
        }
    }

    fn spawn_npc(&mut self) {
        let position = self.random_position();
        let steering = Steering {
            mode: self.rng.gen_range(0..4),
            cooldown: self.rng.gen_range(0.0..2.0),
            target: [
                self.rng.gen_range(-500.0..500.0),
                self.rng.gen_range(-500.0..500.0),
            ],
        };
        let team = Team(self.rng.gen_range(0..4));

        let entity = self.registry.create();
        self.registry.assign(entity, position);
        self.registry.assign(entity, Velocity::default());
        self.registry.assign(entity, steering);
        self.registry.assign(entity, Health { current: 100.0, max: 100.0 });
        self.registry.assign(entity, team);
    }

    fn spawn_player(&mut self, index: usize) {
        let position = self.random_position();
        let entity = self.registry.create();
        self.registry.assign(entity, position);
        self.registry.assign(entity, Velocity::default());
        self.registry.assign(entity, Health { current: 200.0, max: 200.0 });
        self.registry.assign(entity, Team(0));
        self.registry.assign(entity, Name(format!("player-{index}")));
    }

    fn spawn_projectile(&mut self) {
        let position = self.random_position();
        let velocity = Velocity {
            x: self.rng.gen_range(-50.0..50.0),
            y: self.rng.gen_range(-50.0..50.0),
            z: 0.0,
        };
        let lifetime = Lifetime {
            remaining: self.rng.gen_range(0.1..2.0),
            total: 2.0,
        };

        let entity = self.registry.create();
        self.registry.assign(entity, position);
        self.registry.assign(entity, velocity);
        self.registry.assign(entity, lifetime);
    }

    fn spawn_static(&mut self) {
        let position = self.random_position();
        let entity = self.registry.create();
        self.registry.assign(entity, position);
    }

    /// Steer NPCs towards their targets.
    pub fn steer(&mut self) {
        let dt = self.config.delta_time;
        self.registry
            .for_each_mut::<(Position, Steering, Velocity), _>(|_, (pos, steering, vel)| {
                steering.cooldown -= dt;
                if steering.cooldown <= 0.0 {
                    steering.mode = (steering.mode + 1) % 4;
                    steering.cooldown = 2.0;
                }

                let dx = steering.target[0] - pos.x;
                let dy = steering.target[1] - pos.y;
                let dist = (dx * dx + dy * dy).sqrt().max(0.001);
                let speed = 10.0;
                vel.x = dx / dist * speed;
                vel.y = dy / dist * speed;
            });
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

    /// Regenerate the health of players only. `Name` is the smallest storage and drives the join.
    pub fn regenerate(&mut self) {
        let dt = self.config.delta_time;
        self.registry
            .for_each_mut::<(Position, Team, Health, Name), _>(|_, (_, _, health, _)| {
                health.current = (health.current + dt).min(health.max);
            });
    }

    /// Decay projectile lifetimes, then replace the expired ones.
    pub fn projectile_lifetime(&mut self) {
        let dt = self.config.delta_time;
        let dead = &mut self.dead;
        self.registry
            .for_each_mut::<Lifetime, _>(|entity, lifetime| {
                lifetime.remaining -= dt;
                if lifetime.remaining <= 0.0 {
                    dead.push(entity);
                }
            });

        for entity in std::mem::take(&mut self.dead) {
            self.registry.destroy(entity);
            self.spawn_projectile();
        }
    }
}

impl Default for GameWorldScenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario for GameWorldScenario {
    fn name(&self) -> &'static str {
        "game_world"
    }

    fn description(&self) -> &'static str {
        "Mixed game world with AI, movement, and projectile churn"
    }

    fn entity_count(&self) -> usize {
        self.config.npc_count
            + self.config.player_count
            + self.config.projectile_count
            + self.config.static_count
    }

    fn setup(&mut self) {
        for _ in 0..self.config.npc_count {
            self.spawn_npc();
        }
        for index in 0..self.config.player_count {
            self.spawn_player(index);
        }
        for _ in 0..self.config.projectile_count {
            self.spawn_projectile();
        }
        for _ in 0..self.config.static_count {
            self.spawn_static();
        }
    }

    fn update(&mut self) {
        self.steer();
        self.movement();
        self.regenerate();
        self.projectile_lifetime();
    }

    fn teardown(&mut self) {
        let mut entities = Vec::with_capacity(self.registry.alive_count());
        self.registry
            .for_each::<Position, _>(|entity, _| entities.push(entity));
        for entity in entities {
            self.registry.destroy(entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> GameWorldConfig {
        GameWorldConfig {
            npc_count: 50,
            player_count: 5,
            projectile_count: 20,
            static_count: 30,
            ..Default::default()
        }
    }

    #[test]
    fn game_world_setup() {
        let mut scenario = GameWorldScenario::with_config(small());

        scenario.setup();
        assert_eq!(scenario.registry().alive_count(), scenario.entity_count());
        assert_eq!(scenario.registry().count::<Steering>(), 50);
        assert_eq!(scenario.registry().count::<Name>(), 5);

        scenario.teardown();
        assert_eq!(scenario.registry().alive_count(), 0);
    }

    #[test]
    fn game_world_update_keeps_projectile_count() {
        let mut scenario = GameWorldScenario::with_config(small());

        scenario.setup();
        for _ in 0..180 {
            scenario.update();
        }

        assert_eq!(scenario.registry().count::<Lifetime>(), 20);
        assert_eq!(scenario.registry().alive_count(), scenario.entity_count());

        scenario.teardown();
    }
}
