pub mod combat;
pub mod entity;

pub use combat::{
    absorb_damage, apply_movement, clamp_to_world, circles_overlap, is_out_of_bounds,
    movement_delta, raw_damage, shot_angles, smooth_towards, DamageOutcome, WorldBounds,
};
pub use entity::{
    ActiveEffect, KillCause, LeaderboardEntry, Pickup, PickupKind, Player, PlayerClass,
    PowerUpKind, Projectile, Weapon, WeaponType,
};

use serde::{Deserialize, Serialize};

pub const WORLD_WIDTH: f32 = 5000.0;
pub const WORLD_HEIGHT: f32 = 5000.0;
/// Distance covered by one movement input at speed 1.0
pub const MOVE_STEP: f32 = 5.0;
pub const PROJECTILE_RADIUS: f32 = 5.0;
/// Angular offset of the side shots fired under multi-shot (15 degrees)
pub const MULTI_SHOT_SPREAD: f32 = 15.0 * std::f32::consts::PI / 180.0;
/// Fraction of the remaining distance a drawn entity covers each frame
pub const INTERPOLATION_FACTOR: f32 = 0.5;
/// Concurrently active non-health power-ups allowed per player
pub const MAX_ACTIVE_POWER_UPS: usize = 3;
/// Largest datagram either side will send or accept
pub const MAX_PACKET_SIZE: usize = 65_507;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Packet {
    Join {
        username: String,
        class: PlayerClass,
    },
    Input(InputCommand),
    Shoot {
        x: f32,
        y: f32,
        angle: f32,
    },
    Ping {
        timestamp: u64,
    },
    Disconnect,

    Joined {
        player_id: u32,
        world_width: f32,
        world_height: f32,
    },
    Rejected {
        reason: String,
    },
    Snapshot {
        tick: u32,
        timestamp: u64,
        players: Vec<Player>,
        projectiles: Vec<Projectile>,
        weapon_pickups: Vec<Pickup>,
        power_up_pickups: Vec<Pickup>,
    },
    PickupSpawned {
        pickup: Pickup,
    },
    PickupRemoved {
        id: u32,
    },
    PowerUpCollected {
        kind: PowerUpKind,
        duration_ms: u64,
    },
    KillFeed {
        killer: String,
        victim: String,
        cause: KillCause,
    },
    Respawn,
    Leaderboard {
        entries: Vec<LeaderboardEntry>,
    },
    Pong {
        timestamp: u64,
    },
}

/// Discrete command a client sends, tagged with its own sequence number
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InputCommand {
    pub sequence: u32,
    pub timestamp: u64,
    pub action: InputAction,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub enum InputAction {
    /// Direction components; the server scales them by `MOVE_STEP * speed`
    Move { dx: f32, dy: f32 },
    SelectSlot { slot: u8 },
    DropWeapon,
    PickUpWeapon,
    Punch,
}
