//! Tunable simulation parameters
//!
//! Defaults reproduce the original arena: a 5000x5000 world ticking every
//! 15 ms, power-ups every 3 s, weapons every 5 s.

use shared::{PowerUpKind, WorldBounds, PROJECTILE_RADIUS, WORLD_HEIGHT, WORLD_WIDTH};
use std::time::Duration;

/// How long each power-up kind stays active, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerUpDurations {
    pub speed: u64,
    pub multi_shot: u64,
    pub health: u64,
    pub damage: u64,
    pub shield: u64,
    pub rapid_fire: u64,
    pub fire: u64,
}

impl PowerUpDurations {
    pub fn for_kind(&self, kind: PowerUpKind) -> u64 {
        match kind {
            PowerUpKind::Speed => self.speed,
            PowerUpKind::MultiShot => self.multi_shot,
            PowerUpKind::Health => self.health,
            PowerUpKind::Damage => self.damage,
            PowerUpKind::Shield => self.shield,
            PowerUpKind::RapidFire => self.rapid_fire,
            PowerUpKind::Fire => self.fire,
        }
    }
}

impl Default for PowerUpDurations {
    fn default() -> Self {
        Self {
            speed: 5000,
            multi_shot: 3000,
            health: 1000,
            damage: 5000,
            shield: 6000,
            rapid_fire: 3000,
            fire: 5000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub world_width: f32,
    pub world_height: f32,
    pub tick_interval: Duration,
    pub projectile_radius: f32,

    pub power_up_radius: f32,
    pub power_up_spawn_interval_ms: u64,
    pub max_power_up_pickups: usize,

    pub weapon_pickup_radius: f32,
    pub weapon_spawn_interval_ms: u64,
    pub max_weapon_pickups: usize,

    /// Pickups never spawn closer than this to a world edge
    pub spawn_margin: f32,

    pub punch_cooldown_ms: u64,

    pub burn_damage: f32,
    pub burn_interval_ms: u64,
    pub burn_window_ms: u64,

    pub power_up_durations: PowerUpDurations,
}

impl GameConfig {
    pub fn bounds(&self) -> WorldBounds {
        WorldBounds::new(self.world_width, self.world_height)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            tick_interval: Duration::from_millis(15),
            projectile_radius: PROJECTILE_RADIUS,
            power_up_radius: 22.0,
            power_up_spawn_interval_ms: 3000,
            max_power_up_pickups: 15,
            weapon_pickup_radius: 20.0,
            weapon_spawn_interval_ms: 5000,
            max_weapon_pickups: 10,
            spawn_margin: 50.0,
            punch_cooldown_ms: 1000,
            burn_damage: 35.0,
            burn_interval_ms: 3000,
            burn_window_ms: 5000,
            power_up_durations: PowerUpDurations::default(),
        }
    }
}
