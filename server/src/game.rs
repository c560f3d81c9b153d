use crate::client_manager::{PlayerInputs, ShootRequest};
use crate::combat::{resolve_projectile_hits, HitReport};
use crate::config::GameConfig;
use crate::error::ActionError;
use crate::powerups;
use crate::store::EntityStore;
use crate::timers::{TimerEvent, TimerQueue};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::combat::{advance_projectile, projectile_velocity};
use shared::{
    apply_movement, circles_overlap, clamp_to_world, is_out_of_bounds, movement_delta,
    shot_angles, InputAction, InputCommand, KillCause, Packet, Pickup, PickupKind, Player,
    PlayerClass, PowerUpKind, Weapon,
};

/// Leaderboard length broadcast to clients
pub const LEADERBOARD_SIZE: usize = 10;

/// Something clients need to hear about beyond the next snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    PickupSpawned(Pickup),
    PickupRemoved {
        id: u32,
    },
    PowerUpCollected {
        player_id: u32,
        kind: PowerUpKind,
        duration_ms: u64,
    },
    PlayerEliminated {
        victim_id: u32,
        victim_name: String,
        killer_name: Option<String>,
        cause: KillCause,
    },
    LeaderboardChanged,
}

/// Authoritative world state and the fixed-step rules that advance it.
///
/// All clocks are milliseconds since server start, supplied by the caller,
/// so the simulation itself never reads the wall clock.
pub struct GameState {
    pub tick: u32,
    pub store: EntityStore,
    pub config: GameConfig,
    timers: TimerQueue,
    rng: StdRng,
    events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic spawn positions and pickup kinds, for tests and replays
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Self {
        let mut timers = TimerQueue::new();
        timers.schedule(config.power_up_spawn_interval_ms, TimerEvent::SpawnPowerUp);
        timers.schedule(config.weapon_spawn_interval_ms, TimerEvent::SpawnWeapon);

        Self {
            tick: 0,
            store: EntityStore::new(),
            config,
            timers,
            rng,
            events: Vec::new(),
        }
    }

    /// Takes every event raised since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn next_timer_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    fn random_point(&mut self, margin: f32) -> (f32, f32) {
        let (width, height) = (self.config.world_width, self.config.world_height);
        let rng = &mut self.rng;
        let mut axis = |extent: f32| {
            if extent > 2.0 * margin {
                rng.gen_range(margin..extent - margin)
            } else {
                extent / 2.0
            }
        };
        (axis(width), axis(height))
    }

    /// Creates a player at a random position with the class's base stats
    pub fn spawn_player(&mut self, username: String, class: PlayerClass) -> u32 {
        let radius = class.stats().radius;
        let (x, y) = self.random_point(self.config.spawn_margin.max(radius));
        let (x, y) = clamp_to_world(x, y, radius, self.config.bounds());

        let id = self.store.add_player(username, class, x, y);
        info!(
            "Spawned player {} as {} at ({:.0}, {:.0})",
            id,
            class.name(),
            x,
            y
        );
        self.events.push(GameEvent::LeaderboardChanged);
        id
    }

    /// Removes a player and every timer that still targets them
    pub fn remove_player(&mut self, player_id: u32) -> Option<Player> {
        let player = self.store.remove_player(player_id)?;
        self.timers.cancel_player(player_id);
        info!("Removed player {}", player_id);
        self.events.push(GameEvent::LeaderboardChanged);
        Some(player)
    }

    /// Runs one simulation step and returns the events it raised.
    ///
    /// Order: queued commands and shots, projectile travel, projectile hits,
    /// pickup collection, then the expiry sweep.
    pub fn tick(&mut self, now: u64, batches: Vec<PlayerInputs>) -> Vec<GameEvent> {
        for batch in batches {
            for command in &batch.commands {
                if let Err(e) = self.apply_command(batch.player_id, command, now) {
                    debug!(
                        "Player {} command {} rejected: {}",
                        batch.player_id, command.sequence, e
                    );
                }
            }
            for shot in batch.shots {
                if let Err(e) = self.shoot(batch.player_id, shot, now) {
                    debug!("Player {} shot rejected: {}", batch.player_id, e);
                }
            }
        }

        self.advance_projectiles();

        for report in resolve_projectile_hits(&mut self.store) {
            self.handle_hit(report, now);
        }

        self.collect_pickups(now);

        for player in self.store.players.values_mut() {
            powerups::sweep_expired(player, now);
        }

        self.tick = self.tick.wrapping_add(1);
        self.take_events()
    }

    /// Applies one queued command and records its sequence on the player.
    ///
    /// The sequence is recorded even when the action is rejected, so the
    /// client can stop replaying it.
    pub fn apply_command(
        &mut self,
        player_id: u32,
        command: &InputCommand,
        now: u64,
    ) -> Result<(), ActionError> {
        let bounds = self.config.bounds();
        let player = self
            .store
            .players
            .get_mut(&player_id)
            .ok_or(ActionError::MissingPlayer(player_id))?;
        player.last_processed_input = player.last_processed_input.max(command.sequence);

        match command.action {
            InputAction::Move { dx, dy } => {
                if !dx.is_finite() || !dy.is_finite() {
                    return Ok(());
                }
                let (dx, dy) = movement_delta(dx, dy, player.speed);
                let (x, y) = apply_movement(player.x, player.y, dx, dy, player.radius, bounds);
                player.x = x;
                player.y = y;
                Ok(())
            }
            InputAction::SelectSlot { slot } => select_slot(player, slot as usize),
            InputAction::DropWeapon => {
                let weapon = drop_equipped(player)?;
                let (x, y) = (player.x, player.y);
                let pickup = self.store.add_pickup(
                    x,
                    y,
                    self.config.weapon_pickup_radius,
                    PickupKind::Weapon(weapon),
                );
                debug!("Player {} dropped {}", player_id, weapon.name());
                self.events.push(GameEvent::PickupSpawned(pickup));
                Ok(())
            }
            InputAction::PickUpWeapon => {
                if player.first_free_slot().is_none() {
                    return Err(ActionError::InventoryFull);
                }
                player.pickup_requested = true;
                Ok(())
            }
            InputAction::Punch => {
                if !player.can_punch {
                    return Err(ActionError::OnCooldown);
                }
                player.can_punch = false;
                player.punching = true;
                self.timers.schedule(
                    now + self.config.punch_cooldown_ms,
                    TimerEvent::PunchReady { player_id },
                );
                Ok(())
            }
        }
    }

    /// Fires the equipped weapon and starts its cooldown.
    ///
    /// Returns how many projectiles were created (three under multi-shot).
    pub fn shoot(
        &mut self,
        player_id: u32,
        shot: ShootRequest,
        now: u64,
    ) -> Result<usize, ActionError> {
        let bounds = self.config.bounds();
        let projectile_radius = self.config.projectile_radius;
        let player = self
            .store
            .players
            .get_mut(&player_id)
            .ok_or(ActionError::MissingPlayer(player_id))?;

        if !player.can_shoot {
            return Err(ActionError::OnCooldown);
        }
        if !shot.angle.is_finite() {
            return Err(ActionError::InvalidAim);
        }

        let weapon = player.equipped;
        let angles = shot_angles(shot.angle, player.has_multi_shot);
        let mut cooldown = weapon.fire_interval_ms();
        if player.has_rapid_fire {
            cooldown /= powerups::RAPID_FIRE_FACTOR;
        }
        player.can_shoot = false;

        let origin = clamp_to_world(shot.x, shot.y, projectile_radius, bounds);
        for angle in &angles {
            let velocity = projectile_velocity(*angle, weapon.projectile_speed());
            self.store
                .spawn_projectile(player_id, weapon, origin, velocity, projectile_radius);
        }

        self.timers
            .schedule(now + cooldown, TimerEvent::ShootReady { player_id });
        Ok(angles.len())
    }

    fn advance_projectiles(&mut self) {
        let bounds = self.config.bounds();
        self.store.projectiles.retain(|_, projectile| {
            advance_projectile(projectile);
            !is_out_of_bounds(projectile.x, projectile.y, projectile.radius, bounds)
        });
    }

    fn handle_hit(&mut self, report: HitReport, now: u64) {
        if report.damage.is_none() {
            return;
        }

        if let Some(victim) = report.eliminated {
            let killer_name = self
                .store
                .players
                .get(&report.shooter_id)
                .map(|shooter| shooter.username.clone());
            self.on_eliminated(victim, killer_name, KillCause::Weapon(report.weapon));
            return;
        }

        if report.shooter_has_fire {
            self.ignite(report.victim_id, report.shooter_id, now);
        }
    }

    /// Queues damage-over-time ticks on `target_id`
    fn ignite(&mut self, target_id: u32, shooter_id: u32, now: u64) {
        let interval = self.config.burn_interval_ms;
        if interval == 0 {
            return;
        }

        let mut offset = interval;
        while offset <= self.config.burn_window_ms {
            self.timers.schedule(
                now + offset,
                TimerEvent::Burn {
                    target_id,
                    shooter_id,
                },
            );
            offset += interval;
        }
    }

    fn on_eliminated(&mut self, victim: Player, killer_name: Option<String>, cause: KillCause) {
        self.timers.cancel_player(victim.id);
        match &killer_name {
            Some(killer) => info!("{} eliminated {}", killer, victim.username),
            None => info!("{} was eliminated", victim.username),
        }

        self.events.push(GameEvent::PlayerEliminated {
            victim_id: victim.id,
            victim_name: victim.username,
            killer_name,
            cause,
        });
        self.events.push(GameEvent::LeaderboardChanged);
    }

    fn collect_pickups(&mut self, now: u64) {
        let player_ids: Vec<u32> = self.store.players.keys().copied().collect();
        for player_id in player_ids {
            self.collect_power_ups(player_id, now);
            self.collect_weapon(player_id);
        }
    }

    fn collect_power_ups(&mut self, player_id: u32, now: u64) {
        let Some(player) = self.store.players.get(&player_id) else {
            return;
        };

        let touching: Vec<(u32, PowerUpKind)> = self
            .store
            .power_up_pickups
            .values()
            .filter(|pickup| overlaps(player, pickup))
            .filter_map(|pickup| match pickup.kind {
                PickupKind::PowerUp(kind) => Some((pickup.id, kind)),
                PickupKind::Weapon(_) => None,
            })
            .collect();

        for (pickup_id, kind) in touching {
            let Some(player) = self.store.players.get_mut(&player_id) else {
                return;
            };
            match powerups::apply(player, kind, now, &self.config.power_up_durations) {
                Ok(expires_at) => {
                    self.store.remove_pickup(pickup_id);
                    self.timers.schedule(
                        expires_at,
                        TimerEvent::EffectExpired { player_id, kind },
                    );
                    info!("Player {} collected {}", player_id, kind.name());
                    self.events.push(GameEvent::PowerUpCollected {
                        player_id,
                        kind,
                        duration_ms: expires_at - now,
                    });
                    self.events.push(GameEvent::PickupRemoved { id: pickup_id });
                }
                Err(e) => debug!("Player {} left {} in place: {}", player_id, kind.name(), e),
            }
        }
    }

    fn collect_weapon(&mut self, player_id: u32) {
        let Some(player) = self.store.players.get_mut(&player_id) else {
            return;
        };
        if !std::mem::take(&mut player.pickup_requested) {
            return;
        }
        let player: &Player = player;

        let found = self
            .store
            .weapon_pickups
            .values()
            .find(|pickup| overlaps(player, pickup))
            .and_then(|pickup| match pickup.kind {
                PickupKind::Weapon(weapon) => Some((pickup.id, weapon)),
                PickupKind::PowerUp(_) => None,
            });
        let Some((pickup_id, weapon)) = found else {
            return;
        };

        let Some(slot) = player.first_free_slot() else {
            debug!("Player {} cannot carry {}: inventory full", player_id, weapon.name());
            return;
        };
        if let Some(player) = self.store.players.get_mut(&player_id) {
            player.inventory[slot] = Some(weapon);
        }
        self.store.remove_pickup(pickup_id);

        debug!("Player {} picked up {} into slot {}", player_id, weapon.name(), slot);
        self.events.push(GameEvent::PickupRemoved { id: pickup_id });
    }

    /// Fires every timer due at or before `now` and returns the events raised
    pub fn run_due_timers(&mut self, now: u64) -> Vec<GameEvent> {
        while let Some(event) = self.timers.pop_due(now) {
            self.handle_timer(event, now);
        }
        self.take_events()
    }

    fn handle_timer(&mut self, event: TimerEvent, now: u64) {
        if let Some(player_id) = event.player_id() {
            if !self.store.players.contains_key(&player_id) {
                return;
            }
        }

        match event {
            TimerEvent::EffectExpired { player_id, kind } => {
                if let Some(player) = self.store.players.get_mut(&player_id) {
                    powerups::revert(player, kind, now);
                }
            }
            TimerEvent::ShootReady { player_id } => {
                if let Some(player) = self.store.players.get_mut(&player_id) {
                    player.can_shoot = true;
                }
            }
            TimerEvent::PunchReady { player_id } => {
                if let Some(player) = self.store.players.get_mut(&player_id) {
                    player.can_punch = true;
                    player.punching = false;
                }
            }
            TimerEvent::Burn {
                target_id,
                shooter_id,
            } => self.burn(target_id, shooter_id),
            TimerEvent::SpawnPowerUp => {
                self.spawn_power_up();
                self.timers.schedule(
                    now + self.config.power_up_spawn_interval_ms.max(1),
                    TimerEvent::SpawnPowerUp,
                );
            }
            TimerEvent::SpawnWeapon => {
                self.spawn_weapon();
                self.timers.schedule(
                    now + self.config.weapon_spawn_interval_ms.max(1),
                    TimerEvent::SpawnWeapon,
                );
            }
        }
    }

    /// One damage-over-time tick. Burns bypass the shield.
    fn burn(&mut self, target_id: u32, shooter_id: u32) {
        let Some(target) = self.store.players.get_mut(&target_id) else {
            return;
        };
        target.health -= self.config.burn_damage;
        if target.is_alive() {
            return;
        }

        let Some(victim) = self.store.remove_player(target_id) else {
            return;
        };
        let killer_name = self.store.players.get_mut(&shooter_id).map(|shooter| {
            shooter.score += 1;
            shooter.username.clone()
        });
        self.on_eliminated(victim, killer_name, KillCause::Burn);
    }

    fn spawn_power_up(&mut self) {
        if self.store.players.is_empty()
            || self.store.power_up_pickups.len() >= self.config.max_power_up_pickups
        {
            return;
        }

        let kind = PowerUpKind::ALL[self.rng.gen_range(0..PowerUpKind::ALL.len())];
        let (x, y) = self.random_point(self.config.spawn_margin);
        let pickup = self.store.add_pickup(
            x,
            y,
            self.config.power_up_radius,
            PickupKind::PowerUp(kind),
        );
        debug!("Spawned {} power-up {} at ({:.0}, {:.0})", kind.name(), pickup.id, x, y);
        self.events.push(GameEvent::PickupSpawned(pickup));
    }

    fn spawn_weapon(&mut self) {
        if self.store.players.is_empty()
            || self.store.weapon_pickups.len() >= self.config.max_weapon_pickups
        {
            return;
        }

        let weapon = Weapon::SPAWNABLE[self.rng.gen_range(0..Weapon::SPAWNABLE.len())];
        let (x, y) = self.random_point(self.config.spawn_margin);
        let pickup = self.store.add_pickup(
            x,
            y,
            self.config.weapon_pickup_radius,
            PickupKind::Weapon(weapon),
        );
        debug!("Spawned {} pickup {} at ({:.0}, {:.0})", weapon.name(), pickup.id, x, y);
        self.events.push(GameEvent::PickupSpawned(pickup));
    }

    /// Full world state for broadcast
    pub fn snapshot(&self, timestamp: u64) -> Packet {
        Packet::Snapshot {
            tick: self.tick,
            timestamp,
            players: self.store.players.values().cloned().collect(),
            projectiles: self.store.projectiles.values().cloned().collect(),
            weapon_pickups: self.store.weapon_pickups.values().cloned().collect(),
            power_up_pickups: self.store.power_up_pickups.values().cloned().collect(),
        }
    }

    pub fn leaderboard(&self) -> Packet {
        Packet::Leaderboard {
            entries: self.store.leaderboard(LEADERBOARD_SIZE),
        }
    }
}

fn overlaps(player: &Player, pickup: &Pickup) -> bool {
    circles_overlap(
        player.x,
        player.y,
        player.radius,
        pickup.x,
        pickup.y,
        pickup.radius,
    )
}

/// Equips the weapon in `slot`, falling back to the fist for an empty slot
fn select_slot(player: &mut Player, slot: usize) -> Result<(), ActionError> {
    match player.inventory.get(slot) {
        None => Err(ActionError::InvalidSlot(slot)),
        Some(Some(weapon)) => {
            player.equipped = *weapon;
            Ok(())
        }
        Some(None) if player.equipped != Weapon::Fist => {
            player.equipped = Weapon::Fist;
            Ok(())
        }
        Some(None) => Err(ActionError::EmptySlot(slot)),
    }
}

/// Clears the equipped weapon's slot and returns the weapon
fn drop_equipped(player: &mut Player) -> Result<Weapon, ActionError> {
    let weapon = player.equipped;
    if weapon == Weapon::Fist {
        return Err(ActionError::NothingToDrop);
    }

    if let Some(slot) = player.inventory.iter().position(|s| *s == Some(weapon)) {
        player.inventory[slot] = None;
    }
    player.equipped = Weapon::Fist;
    Ok(weapon)
}
