//! Entity data model shared by the authoritative server and the client mirror
//!
//! Everything in here is plain data plus the fixed per-class and per-weapon
//! stat tables. Mutation rules live in the server's store, combat and
//! power-up modules; the client only ever reads these values out of snapshots.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Selectable character class, fixed for the lifetime of a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerClass {
    Tank,
    Mage,
    Rogue,
    Gunner,
}

/// Base stats a class hands to a freshly spawned player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassStats {
    pub health: f32,
    pub max_health: f32,
    pub radius: f32,
    pub speed: f32,
    pub light_multiplier: f32,
    pub heavy_multiplier: f32,
    pub magic_multiplier: f32,
    pub inventory_slots: usize,
}

impl PlayerClass {
    pub const ALL: [PlayerClass; 4] = [
        PlayerClass::Tank,
        PlayerClass::Mage,
        PlayerClass::Rogue,
        PlayerClass::Gunner,
    ];

    pub fn stats(self) -> ClassStats {
        match self {
            PlayerClass::Tank => ClassStats {
                health: 150.0,
                max_health: 150.0,
                radius: 17.0,
                speed: 0.5,
                light_multiplier: 1.0,
                heavy_multiplier: 1.0,
                magic_multiplier: 1.0,
                inventory_slots: 2,
            },
            PlayerClass::Mage => ClassStats {
                health: 100.0,
                max_health: 100.0,
                radius: 12.0,
                speed: 1.0,
                light_multiplier: 1.0,
                heavy_multiplier: 0.8,
                magic_multiplier: 1.5,
                inventory_slots: 2,
            },
            PlayerClass::Rogue => ClassStats {
                health: 80.0,
                max_health: 80.0,
                radius: 12.0,
                speed: 1.4,
                light_multiplier: 1.4,
                heavy_multiplier: 0.5,
                magic_multiplier: 1.1,
                inventory_slots: 2,
            },
            PlayerClass::Gunner => ClassStats {
                health: 100.0,
                max_health: 100.0,
                radius: 14.0,
                speed: 1.2,
                light_multiplier: 1.3,
                heavy_multiplier: 1.3,
                magic_multiplier: 0.7,
                inventory_slots: 3,
            },
        }
    }

    /// Damage multiplier this class applies to weapons of the given type
    pub fn weapon_multiplier(self, weapon_type: WeaponType) -> f32 {
        let stats = self.stats();
        match weapon_type {
            WeaponType::Light => stats.light_multiplier,
            WeaponType::Heavy => stats.heavy_multiplier,
            WeaponType::Magic => stats.magic_multiplier,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PlayerClass::Tank => "Tank",
            PlayerClass::Mage => "Mage",
            PlayerClass::Rogue => "Rogue",
            PlayerClass::Gunner => "Gunner",
        }
    }

    /// Case-insensitive lookup used by the client's command line
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|class| class.name().eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponType {
    Light,
    Heavy,
    Magic,
}

/// Weapon catalog. `Fist` is the bare-handed fallback and never occupies an
/// inventory slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weapon {
    Fist,
    Pistol,
    SubmachineGun,
    Sniper,
    Shuriken,
}

impl Weapon {
    /// Weapons that can appear as world pickups
    pub const SPAWNABLE: [Weapon; 4] = [
        Weapon::Pistol,
        Weapon::SubmachineGun,
        Weapon::Sniper,
        Weapon::Shuriken,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Weapon::Fist => "Fist",
            Weapon::Pistol => "Pistol",
            Weapon::SubmachineGun => "Submachine Gun",
            Weapon::Sniper => "Sniper",
            Weapon::Shuriken => "Shuriken",
        }
    }

    pub fn weapon_type(self) -> WeaponType {
        match self {
            Weapon::Sniper => WeaponType::Heavy,
            _ => WeaponType::Light,
        }
    }

    pub fn damage(self) -> f32 {
        match self {
            Weapon::Fist => 40.0,
            Weapon::Pistol => 20.0,
            Weapon::SubmachineGun => 10.0,
            Weapon::Sniper => 50.0,
            Weapon::Shuriken => 25.0,
        }
    }

    /// Minimum time between two shots, in milliseconds
    pub fn fire_interval_ms(self) -> u64 {
        match self {
            Weapon::Fist => 250,
            Weapon::Pistol => 3000,
            Weapon::SubmachineGun => 1000,
            Weapon::Sniper => 4500,
            Weapon::Shuriken => 1500,
        }
    }

    /// Distance a projectile fired by this weapon travels per tick
    pub fn projectile_speed(self) -> f32 {
        match self {
            Weapon::Sniper => 10.0,
            _ => 5.0,
        }
    }
}

/// Closed set of timed pickup effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Speed,
    MultiShot,
    Health,
    Damage,
    Shield,
    RapidFire,
    Fire,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 7] = [
        PowerUpKind::Speed,
        PowerUpKind::MultiShot,
        PowerUpKind::Health,
        PowerUpKind::Damage,
        PowerUpKind::Shield,
        PowerUpKind::RapidFire,
        PowerUpKind::Fire,
    ];

    /// Health is instant and never occupies one of the capped effect slots
    pub fn counts_toward_cap(self) -> bool {
        self != PowerUpKind::Health
    }

    pub fn name(self) -> &'static str {
        match self {
            PowerUpKind::Speed => "speed",
            PowerUpKind::MultiShot => "multiShot",
            PowerUpKind::Health => "health",
            PowerUpKind::Damage => "damage",
            PowerUpKind::Shield => "shield",
            PowerUpKind::RapidFire => "rapidFire",
            PowerUpKind::Fire => "fire",
        }
    }
}

/// Bookkeeping for one power-up kind on one player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub active: bool,
    /// Server clock (milliseconds since server start) at which the effect ends
    pub expires_at: u64,
}

impl ActiveEffect {
    pub fn is_live(&self, now: u64) -> bool {
        self.active && self.expires_at > now
    }
}

/// Authoritative player record, also sent verbatim inside snapshots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    pub username: String,
    pub class: PlayerClass,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub base_speed: f32,
    pub speed: f32,
    pub health: f32,
    pub max_health: f32,
    pub score: u32,
    pub equipped: Weapon,
    pub inventory: Vec<Option<Weapon>>,
    pub shield: f32,
    pub damage_multiplier: f32,
    pub has_multi_shot: bool,
    pub has_rapid_fire: bool,
    pub has_fire: bool,
    pub active_power_ups: HashMap<PowerUpKind, ActiveEffect>,
    /// Highest input sequence number the server has applied for this player
    pub last_processed_input: u32,
    pub can_shoot: bool,
    pub can_punch: bool,
    pub punching: bool,
    pub pickup_requested: bool,
}

impl Player {
    pub fn new(id: u32, username: String, class: PlayerClass, x: f32, y: f32) -> Self {
        let stats = class.stats();
        Self {
            id,
            username,
            class,
            x,
            y,
            radius: stats.radius,
            base_speed: stats.speed,
            speed: stats.speed,
            health: stats.health,
            max_health: stats.max_health,
            score: 0,
            equipped: Weapon::Fist,
            inventory: vec![None; stats.inventory_slots],
            shield: 0.0,
            damage_multiplier: 1.0,
            has_multi_shot: false,
            has_rapid_fire: false,
            has_fire: false,
            active_power_ups: HashMap::new(),
            last_processed_input: 0,
            can_shoot: true,
            can_punch: true,
            punching: false,
            pickup_requested: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn is_effect_live(&self, kind: PowerUpKind, now: u64) -> bool {
        self.active_power_ups
            .get(&kind)
            .is_some_and(|effect| effect.is_live(now))
    }

    /// Number of live effects that occupy one of the capped slots
    pub fn capped_effect_count(&self, now: u64) -> usize {
        self.active_power_ups
            .iter()
            .filter(|(kind, effect)| kind.counts_toward_cap() && effect.is_live(now))
            .count()
    }

    pub fn first_free_slot(&self) -> Option<usize> {
        self.inventory.iter().position(|slot| slot.is_none())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub owner_id: u32,
    pub weapon: Weapon,
    pub x: f32,
    pub y: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PickupKind {
    Weapon(Weapon),
    PowerUp(PowerUpKind),
}

/// A collectible lying in the world. Identifiers are unique across weapon and
/// power-up pickups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub kind: PickupKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_id: u32,
    pub username: String,
    pub score: u32,
}

/// What finished off a player, reported in the kill feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KillCause {
    Weapon(Weapon),
    Burn,
}
