//! Authoritative entity registries
//!
//! The store is owned by `GameState` and never shared; every identifier it
//! hands out is unique for the lifetime of the server, so a stale reference
//! (a timer or projectile outliving its player) can only ever miss.

use shared::{LeaderboardEntry, Pickup, PickupKind, Player, PlayerClass, Projectile, Weapon};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct EntityStore {
    pub players: HashMap<u32, Player>,
    pub projectiles: HashMap<u32, Projectile>,
    pub weapon_pickups: HashMap<u32, Pickup>,
    pub power_up_pickups: HashMap<u32, Pickup>,
    next_player_id: u32,
    next_projectile_id: u32,
    next_pickup_id: u32,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            players: HashMap::new(),
            projectiles: HashMap::new(),
            weapon_pickups: HashMap::new(),
            power_up_pickups: HashMap::new(),
            next_player_id: 1,
            next_projectile_id: 1,
            next_pickup_id: 1,
        }
    }

    pub fn add_player(&mut self, username: String, class: PlayerClass, x: f32, y: f32) -> u32 {
        let id = self.next_player_id;
        self.next_player_id += 1;

        self.players.insert(id, Player::new(id, username, class, x, y));
        id
    }

    pub fn remove_player(&mut self, id: u32) -> Option<Player> {
        self.players.remove(&id)
    }

    pub fn spawn_projectile(
        &mut self,
        owner_id: u32,
        weapon: Weapon,
        (x, y): (f32, f32),
        (vel_x, vel_y): (f32, f32),
        radius: f32,
    ) -> u32 {
        let id = self.next_projectile_id;
        self.next_projectile_id = self.next_projectile_id.wrapping_add(1);

        self.projectiles.insert(
            id,
            Projectile {
                id,
                owner_id,
                weapon,
                x,
                y,
                vel_x,
                vel_y,
                radius,
            },
        );
        id
    }

    /// Places a pickup in the registry matching its kind
    pub fn add_pickup(&mut self, x: f32, y: f32, radius: f32, kind: PickupKind) -> Pickup {
        let id = self.next_pickup_id;
        self.next_pickup_id += 1;

        let pickup = Pickup {
            id,
            x,
            y,
            radius,
            kind,
        };
        match kind {
            PickupKind::Weapon(_) => self.weapon_pickups.insert(id, pickup.clone()),
            PickupKind::PowerUp(_) => self.power_up_pickups.insert(id, pickup.clone()),
        };
        pickup
    }

    pub fn remove_pickup(&mut self, id: u32) -> Option<Pickup> {
        self.weapon_pickups
            .remove(&id)
            .or_else(|| self.power_up_pickups.remove(&id))
    }

    /// Top `limit` players ordered by score, ties broken by id
    pub fn leaderboard(&self, limit: usize) -> Vec<LeaderboardEntry> {
        let mut entries: Vec<LeaderboardEntry> = self
            .players
            .values()
            .map(|player| LeaderboardEntry {
                player_id: player.id,
                username: player.username.clone(),
                score: player.score,
            })
            .collect();

        entries.sort_by(|a, b| b.score.cmp(&a.score).then(a.player_id.cmp(&b.player_id)));
        entries.truncate(limit);
        entries
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}
