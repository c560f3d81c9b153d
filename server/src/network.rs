//! Server network layer handling UDP communications and game loop coordination

use crate::client_manager::{ClientManager, ShootRequest};
use crate::config::GameConfig;
use crate::game::{GameEvent, GameState};
use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use shared::{Packet, MAX_PACKET_SIZE};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};

/// Longest username kept from a join request
pub const MAX_USERNAME_LEN: usize = 16;

/// Messages sent from network tasks to main server loop
#[derive(Debug)]
pub enum ServerMessage {
    PacketReceived { packet: Packet, addr: SocketAddr },
    Shutdown,
}

/// Messages sent from game loop to network tasks
#[derive(Debug)]
pub enum GameMessage {
    SendPacket {
        packet: Packet,
        addr: SocketAddr,
    },
    BroadcastPacket {
        packet: Packet,
        addrs: Vec<SocketAddr>,
    },
}

/// Main server coordinating networking and game simulation
///
/// `run` is the only place the game state and client roster are touched:
/// packets, ticks, timers and timeouts are all multiplexed onto that one
/// task, so none of them ever observe a half-applied update.
pub struct Server {
    socket: Arc<UdpSocket>,
    clients: ClientManager,
    game_state: GameState,
    tick_duration: Duration,
    started: Instant,

    // Communication channels
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    game_tx: mpsc::UnboundedSender<GameMessage>,
    game_rx: mpsc::UnboundedReceiver<GameMessage>,
}

impl Server {
    pub async fn new(
        addr: &str,
        config: GameConfig,
        max_clients: usize,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = Arc::new(UdpSocket::bind(addr).await?);
        info!("Server listening on {}", socket.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (game_tx, game_rx) = mpsc::unbounded_channel();

        Ok(Server {
            socket,
            clients: ClientManager::new(max_clients),
            tick_duration: config.tick_interval,
            game_state: GameState::new(config),
            started: Instant::now(),
            server_tx,
            server_rx,
            game_tx,
            game_rx,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Sender that can stop the loop with `ServerMessage::Shutdown`
    pub fn handle(&self) -> mpsc::UnboundedSender<ServerMessage> {
        self.server_tx.clone()
    }

    /// Milliseconds since the server started, the simulation's clock
    fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Spawns task that continuously listens for incoming packets
    fn spawn_network_receiver(&self) {
        let socket = Arc::clone(&self.socket);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut buffer = vec![0u8; MAX_PACKET_SIZE];

            loop {
                match socket.recv_from(&mut buffer).await {
                    Ok((len, addr)) => {
                        if let Ok(packet) = deserialize::<Packet>(&buffer[0..len]) {
                            if let Err(e) =
                                server_tx.send(ServerMessage::PacketReceived { packet, addr })
                            {
                                error!("Failed to send packet to main loop: {}", e);
                                break;
                            }
                        } else {
                            warn!("Failed to deserialize packet from {}", addr);
                        }
                    }
                    Err(e) => {
                        error!("Error receiving packet: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Spawns task that processes outgoing packet queue
    fn spawn_network_sender(&mut self) {
        let socket = Arc::clone(&self.socket);
        let mut game_rx = std::mem::replace(&mut self.game_rx, mpsc::unbounded_channel().1);

        tokio::spawn(async move {
            while let Some(message) = game_rx.recv().await {
                match message {
                    GameMessage::SendPacket { packet, addr } => {
                        if let Err(e) = Self::send_packet_impl(&socket, &packet, addr).await {
                            error!("Failed to send packet to {}: {}", addr, e);
                        }
                    }
                    GameMessage::BroadcastPacket { packet, addrs } => {
                        let data = match serialize(&packet) {
                            Ok(data) => data,
                            Err(e) => {
                                error!("Failed to serialize broadcast: {}", e);
                                continue;
                            }
                        };

                        for addr in addrs {
                            if let Err(e) = socket.send_to(&data, addr).await {
                                error!("Failed to send to {}: {}", addr, e);
                            }
                        }
                    }
                }
            }
        });
    }

    async fn send_packet_impl(
        socket: &UdpSocket,
        packet: &Packet,
        addr: SocketAddr,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let data = serialize(packet)?;
        socket.send_to(&data, addr).await?;
        Ok(())
    }

    fn send_packet(&self, packet: Packet, addr: SocketAddr) {
        if let Err(e) = self.game_tx.send(GameMessage::SendPacket { packet, addr }) {
            error!("Failed to queue packet for sending: {}", e);
        }
    }

    fn broadcast_packet(&self, packet: Packet) {
        let addrs: Vec<SocketAddr> = self
            .clients
            .get_client_addrs()
            .into_iter()
            .map(|(_, addr)| addr)
            .collect();
        if addrs.is_empty() {
            return;
        }

        if let Err(e) = self
            .game_tx
            .send(GameMessage::BroadcastPacket { packet, addrs })
        {
            error!("Failed to queue broadcast packet: {}", e);
        }
    }

    /// Processes incoming packets and updates game state
    fn handle_packet(&mut self, packet: Packet, addr: SocketAddr) {
        let client_id = self.clients.find_client_by_addr(addr);

        match packet {
            Packet::Join { username, class } => {
                let client_id = match client_id.or_else(|| self.clients.add_client(addr)) {
                    Some(id) => id,
                    None => {
                        warn!("Rejected join from {}: server full", addr);
                        self.send_packet(
                            Packet::Rejected {
                                reason: "Server full".to_string(),
                            },
                            addr,
                        );
                        return;
                    }
                };
                self.clients.touch(client_id);

                let existing = self
                    .clients
                    .get(client_id)
                    .and_then(|client| client.player_id)
                    .filter(|id| self.game_state.store.players.contains_key(id));

                let player_id = match existing {
                    Some(player_id) => player_id,
                    None => {
                        let username = sanitize_username(&username, client_id);
                        let player_id = self.game_state.spawn_player(username, class);
                        self.clients.attach_player(client_id, player_id);
                        player_id
                    }
                };

                self.send_packet(
                    Packet::Joined {
                        player_id,
                        world_width: self.game_state.config.world_width,
                        world_height: self.game_state.config.world_height,
                    },
                    addr,
                );
            }

            Packet::Input(command) => {
                if let Some(client_id) = client_id {
                    self.clients.add_input(client_id, command);
                }
            }

            Packet::Shoot { x, y, angle } => {
                if let Some(client_id) = client_id {
                    self.clients.add_shot(client_id, ShootRequest { x, y, angle });
                }
            }

            Packet::Ping { timestamp } => {
                if let Some(client_id) = client_id {
                    self.clients.touch(client_id);
                }
                self.send_packet(Packet::Pong { timestamp }, addr);
            }

            Packet::Disconnect => {
                if let Some(client_id) = client_id {
                    if let Some(Some(player_id)) = self.clients.remove_client(&client_id) {
                        self.game_state.remove_player(player_id);
                    }
                }
            }

            _ => {
                warn!("Unexpected packet type from client at {}", addr);
            }
        }

        let events = self.game_state.take_events();
        self.dispatch_events(events);
    }

    /// Turns simulation events into targeted and broadcast packets
    fn dispatch_events(&mut self, events: Vec<GameEvent>) {
        let mut leaderboard_changed = false;

        for event in events {
            match event {
                GameEvent::PickupSpawned(pickup) => {
                    self.broadcast_packet(Packet::PickupSpawned { pickup });
                }
                GameEvent::PickupRemoved { id } => {
                    self.broadcast_packet(Packet::PickupRemoved { id });
                }
                GameEvent::PowerUpCollected {
                    player_id,
                    kind,
                    duration_ms,
                } => {
                    if let Some(client) = self.clients.client_for_player(player_id) {
                        self.send_packet(Packet::PowerUpCollected { kind, duration_ms }, client.addr);
                    }
                }
                GameEvent::PlayerEliminated {
                    victim_id,
                    victim_name,
                    killer_name,
                    cause,
                } => {
                    if let Some(client_id) = self.clients.detach_player(victim_id) {
                        if let Some(client) = self.clients.get(client_id) {
                            self.send_packet(Packet::Respawn, client.addr);
                        }
                    }
                    if let Some(killer) = killer_name {
                        self.broadcast_packet(Packet::KillFeed {
                            killer,
                            victim: victim_name,
                            cause,
                        });
                    }
                }
                GameEvent::LeaderboardChanged => leaderboard_changed = true,
            }
        }

        if leaderboard_changed {
            self.broadcast_packet(self.game_state.leaderboard());
        }
    }

    /// Drains queued input, advances the simulation and broadcasts a snapshot
    fn run_tick(&mut self) {
        let now = self.now_ms();
        let batches = self.clients.drain_inputs();
        let events = self.game_state.tick(now, batches);
        self.dispatch_events(events);

        if self.clients.is_empty() {
            return;
        }
        self.broadcast_packet(self.game_state.snapshot(now));
    }

    fn run_timers(&mut self) {
        let now = self.now_ms();
        let events = self.game_state.run_due_timers(now);
        self.dispatch_events(events);
    }

    fn check_timeouts(&mut self) {
        for (client_id, player_id) in self.clients.check_timeouts() {
            info!("Client {} timed out", client_id);
            if let Some(player_id) = player_id {
                self.game_state.remove_player(player_id);
            }
        }
        let events = self.game_state.take_events();
        self.dispatch_events(events);
    }

    /// Main server loop coordinating all operations
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        // Initialize concurrent tasks
        self.spawn_network_receiver();
        self.spawn_network_sender();

        let mut tick_interval = interval(self.tick_duration);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut timeout_interval = interval(Duration::from_secs(1));
        let mut last_tick = Instant::now();

        info!("Server started successfully");

        loop {
            let timer_deadline = self
                .game_state
                .next_timer_deadline()
                .map(|ms| self.started + Duration::from_millis(ms));

            tokio::select! {
                // Handle network events
                message = self.server_rx.recv() => {
                    match message {
                        Some(ServerMessage::PacketReceived { packet, addr }) => {
                            self.handle_packet(packet, addr);
                        },
                        Some(ServerMessage::Shutdown) | None => {
                            info!("Server shutting down");
                            break;
                        }
                    }
                },

                // Handle server tick events
                _ = tick_interval.tick() => {
                    let now = Instant::now();
                    let dt = now.duration_since(last_tick).as_secs_f32();
                    last_tick = now;

                    self.run_tick();

                    // Periodic performance monitoring
                    if self.game_state.tick % 60 == 0 && !self.clients.is_empty() {
                        debug!(
                            "Tick {}: {} clients, {} players, {} projectiles, {:.1}Hz, {} timers",
                            self.game_state.tick,
                            self.clients.len(),
                            self.game_state.store.players.len(),
                            self.game_state.store.projectiles.len(),
                            1.0 / dt.max(f32::EPSILON),
                            self.game_state.pending_timers()
                        );
                    }
                },

                // Power-up expiry, cooldowns, burns and pickup spawns
                _ = async {
                    match timer_deadline {
                        Some(deadline) => sleep_until(deadline).await,
                        None => std::future::pending::<()>().await,
                    }
                } => {
                    self.run_timers();
                },

                _ = timeout_interval.tick() => {
                    self.check_timeouts();
                },
            }
        }

        Ok(())
    }
}

/// Trims a requested username, falling back to a generated one
pub fn sanitize_username(requested: &str, client_id: u32) -> String {
    let name: String = requested
        .trim()
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_USERNAME_LEN)
        .collect();

    if name.is_empty() {
        format!("Player{}", client_id)
    } else {
        name
    }
}
