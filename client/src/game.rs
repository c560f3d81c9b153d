use log::{debug, info, warn};
use shared::{
    apply_movement, movement_delta, smooth_towards, InputAction, InputCommand, KillCause,
    LeaderboardEntry, Packet, Pickup, PickupKind, Player, PowerUpKind, Projectile, WorldBounds,
    INTERPOLATION_FACTOR, WORLD_HEIGHT, WORLD_WIDTH,
};
use std::collections::{HashMap, VecDeque};

/// Kill-feed lines kept for display
pub const KILL_FEED_LEN: usize = 5;

/// A sent command the server has not yet acknowledged, with the position
/// delta it was predicted to cause
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingInput {
    pub sequence: u32,
    pub dx: f32,
    pub dy: f32,
}

/// A player as the client draws it: the last server record, where it is
/// heading, and where it is currently drawn
#[derive(Debug, Clone)]
pub struct RenderedPlayer {
    pub state: Player,
    pub target_x: f32,
    pub target_y: f32,
    pub draw_x: f32,
    pub draw_y: f32,
}

impl RenderedPlayer {
    fn new(state: Player) -> Self {
        Self {
            target_x: state.x,
            target_y: state.y,
            draw_x: state.x,
            draw_y: state.y,
            state,
        }
    }
}

/// Replays unacknowledged deltas on top of an authoritative position,
/// clamping after each step exactly as the server does
pub fn replay_pending<'a>(
    x: f32,
    y: f32,
    radius: f32,
    pending: impl IntoIterator<Item = &'a PendingInput>,
    bounds: WorldBounds,
) -> (f32, f32) {
    pending.into_iter().fold((x, y), |(x, y), input| {
        apply_movement(x, y, input.dx, input.dy, radius, bounds)
    })
}

pub struct ClientGameState {
    pub local_id: Option<u32>,
    pub bounds: WorldBounds,
    pub last_tick: Option<u32>,
    next_sequence: u32,
    pub pending: VecDeque<PendingInput>,

    pub players: HashMap<u32, RenderedPlayer>,
    pub projectiles: Vec<Projectile>,
    pub weapon_pickups: HashMap<u32, Pickup>,
    pub power_up_pickups: HashMap<u32, Pickup>,

    pub leaderboard: Vec<LeaderboardEntry>,
    pub kill_feed: VecDeque<String>,
    pub last_power_up: Option<(PowerUpKind, u64)>,
    pub eliminated: bool,
    pub ping_ms: u64,

    pub prediction_enabled: bool,
    pub reconciliation_enabled: bool,
    pub interpolation_enabled: bool,
}

impl ClientGameState {
    pub fn new() -> Self {
        Self {
            local_id: None,
            bounds: WorldBounds::new(WORLD_WIDTH, WORLD_HEIGHT),
            last_tick: None,
            next_sequence: 1,
            pending: VecDeque::new(),
            players: HashMap::new(),
            projectiles: Vec::new(),
            weapon_pickups: HashMap::new(),
            power_up_pickups: HashMap::new(),
            leaderboard: Vec::new(),
            kill_feed: VecDeque::new(),
            last_power_up: None,
            eliminated: false,
            ping_ms: 0,
            prediction_enabled: true,
            reconciliation_enabled: true,
            interpolation_enabled: true,
        }
    }

    pub fn on_joined(&mut self, player_id: u32, world_width: f32, world_height: f32) {
        info!("Joined as player {}", player_id);
        self.local_id = Some(player_id);
        self.bounds = WorldBounds::new(world_width, world_height);
        self.pending.clear();
        self.next_sequence = 1;
        self.eliminated = false;
    }

    /// Routes one server packet to the matching handler
    pub fn handle_packet(&mut self, packet: Packet, now_ms: u64) {
        match packet {
            Packet::Joined {
                player_id,
                world_width,
                world_height,
            } => self.on_joined(player_id, world_width, world_height),
            Packet::Rejected { reason } => warn!("Join rejected: {}", reason),
            Packet::Snapshot {
                tick,
                players,
                projectiles,
                weapon_pickups,
                power_up_pickups,
                ..
            } => self.apply_snapshot(tick, players, projectiles, weapon_pickups, power_up_pickups),
            Packet::PickupSpawned { pickup } => self.on_pickup_spawned(pickup),
            Packet::PickupRemoved { id } => self.on_pickup_removed(id),
            Packet::PowerUpCollected { kind, duration_ms } => {
                self.on_power_up_collected(kind, duration_ms)
            }
            Packet::KillFeed {
                killer,
                victim,
                cause,
            } => self.on_kill_feed(&killer, &victim, cause),
            Packet::Respawn => self.on_respawn(),
            Packet::Leaderboard { entries } => self.leaderboard = entries,
            Packet::Pong { timestamp } => self.ping_ms = now_ms.saturating_sub(timestamp),
            _ => warn!("Unexpected packet type"),
        }
    }

    pub fn local_player(&self) -> Option<&RenderedPlayer> {
        self.local_id.and_then(|id| self.players.get(&id))
    }

    /// Sequences and buffers a command, predicting its movement locally.
    ///
    /// Returns the command to send, or None before the player has joined.
    pub fn record_input(&mut self, action: InputAction, timestamp: u64) -> Option<InputCommand> {
        let local_id = self.local_id?;

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let (dx, dy) = match (action, self.players.get(&local_id)) {
            (InputAction::Move { dx, dy }, Some(local)) => {
                movement_delta(dx, dy, local.state.speed)
            }
            _ => (0.0, 0.0),
        };
        let input = PendingInput { sequence, dx, dy };
        self.pending.push_back(input);

        if self.prediction_enabled {
            let bounds = self.bounds;
            if let Some(local) = self.players.get_mut(&local_id) {
                let (x, y) = apply_movement(
                    local.target_x,
                    local.target_y,
                    dx,
                    dy,
                    local.state.radius,
                    bounds,
                );
                local.target_x = x;
                local.target_y = y;
            }
        }

        Some(InputCommand {
            sequence,
            timestamp,
            action,
        })
    }

    /// Drops buffered inputs the server has already applied
    pub fn trim_acknowledged(&mut self, acked: u32) {
        while self
            .pending
            .front()
            .is_some_and(|input| input.sequence <= acked)
        {
            self.pending.pop_front();
        }
    }

    /// Adopts an authoritative snapshot and reconciles the local player.
    ///
    /// Snapshots older than the last one applied are ignored.
    pub fn apply_snapshot(
        &mut self,
        tick: u32,
        players: Vec<Player>,
        projectiles: Vec<Projectile>,
        weapon_pickups: Vec<Pickup>,
        power_up_pickups: Vec<Pickup>,
    ) {
        if self.last_tick.is_some_and(|last| tick <= last) {
            debug!("Dropping stale snapshot for tick {}", tick);
            return;
        }
        self.last_tick = Some(tick);

        self.players
            .retain(|id, _| players.iter().any(|player| player.id == *id));

        for server in players {
            let is_local = Some(server.id) == self.local_id;
            if is_local {
                self.trim_acknowledged(server.last_processed_input);
            }

            let (target_x, target_y) = if is_local && self.reconciliation_enabled {
                replay_pending(server.x, server.y, server.radius, &self.pending, self.bounds)
            } else {
                (server.x, server.y)
            };

            let rendered = self
                .players
                .entry(server.id)
                .or_insert_with(|| RenderedPlayer::new(server.clone()));
            rendered.state = server;
            rendered.target_x = target_x;
            rendered.target_y = target_y;
        }

        self.projectiles = projectiles;
        self.weapon_pickups = weapon_pickups.into_iter().map(|p| (p.id, p)).collect();
        self.power_up_pickups = power_up_pickups.into_iter().map(|p| (p.id, p)).collect();
    }

    /// Moves every drawn position a fixed fraction towards its target
    pub fn interpolate(&mut self) {
        for player in self.players.values_mut() {
            if self.interpolation_enabled {
                player.draw_x = smooth_towards(player.draw_x, player.target_x, INTERPOLATION_FACTOR);
                player.draw_y = smooth_towards(player.draw_y, player.target_y, INTERPOLATION_FACTOR);
            } else {
                player.draw_x = player.target_x;
                player.draw_y = player.target_y;
            }
        }
    }

    pub fn on_pickup_spawned(&mut self, pickup: Pickup) {
        match pickup.kind {
            PickupKind::Weapon(_) => self.weapon_pickups.insert(pickup.id, pickup),
            PickupKind::PowerUp(_) => self.power_up_pickups.insert(pickup.id, pickup),
        };
    }

    pub fn on_pickup_removed(&mut self, id: u32) {
        self.weapon_pickups.remove(&id);
        self.power_up_pickups.remove(&id);
    }

    pub fn on_power_up_collected(&mut self, kind: PowerUpKind, duration_ms: u64) {
        info!("Collected {} for {} ms", kind.name(), duration_ms);
        self.last_power_up = Some((kind, duration_ms));
    }

    pub fn on_kill_feed(&mut self, killer: &str, victim: &str, cause: KillCause) {
        let how = match cause {
            KillCause::Weapon(weapon) => weapon.name(),
            KillCause::Burn => "fire",
        };
        self.kill_feed
            .push_back(format!("{} eliminated {} ({})", killer, victim, how));
        while self.kill_feed.len() > KILL_FEED_LEN {
            self.kill_feed.pop_front();
        }
    }

    /// The local player was eliminated; wait for a new join
    pub fn on_respawn(&mut self) {
        info!("Eliminated, press Enter to respawn");
        if let Some(id) = self.local_id.take() {
            self.players.remove(&id);
        }
        self.pending.clear();
        self.eliminated = true;
    }

    pub fn toggle_prediction(&mut self) {
        self.prediction_enabled = !self.prediction_enabled;
        info!("Client-side prediction: {}", self.prediction_enabled);
    }

    pub fn toggle_reconciliation(&mut self) {
        self.reconciliation_enabled = !self.reconciliation_enabled;
        info!("Server reconciliation: {}", self.reconciliation_enabled);
    }

    pub fn toggle_interpolation(&mut self) {
        self.interpolation_enabled = !self.interpolation_enabled;
        info!("Interpolation: {}", self.interpolation_enabled);
    }
}

impl Default for ClientGameState {
    fn default() -> Self {
        Self::new()
    }
}
