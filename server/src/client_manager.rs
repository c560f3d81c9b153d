//! Client connection management and input queuing for the arena server
//!
//! This module handles the server-side management of connected clients, including:
//! - Client connection lifecycle (connect, join, disconnect, timeout)
//! - Per-client buffering of movement/action commands in sequence order
//! - Queued shoot requests, drained once per tick after movement
//! - Connection health monitoring and client capacity limits
//!
//! A client is a network peer; a player is the entity it controls. The two
//! are linked once the client's `Join` is accepted and unlinked when the
//! player dies or the client leaves, so one client can play many lives.

use log::info;
use shared::InputCommand;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Silence after which a client is considered gone
pub const CLIENT_TIMEOUT: Duration = Duration::from_secs(5);

/// A request to fire the equipped weapon from `(x, y)` towards `angle`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShootRequest {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
}

/// Everything one player asked for since the previous tick
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerInputs {
    pub player_id: u32,
    /// Commands in strictly increasing sequence order
    pub commands: Vec<InputCommand>,
    pub shots: Vec<ShootRequest>,
}

/// Represents a connected client and their queued commands
///
/// Each client maintains:
/// - Connection metadata (ID, address, last activity)
/// - The player it currently controls, if it has joined
/// - Buffered commands and shots waiting for the next tick
#[derive(Debug)]
pub struct Client {
    /// Unique client identifier assigned by the server
    pub id: u32,
    /// Network address for sending responses
    pub addr: SocketAddr,
    /// Last time we received any packet from this client
    pub last_seen: Instant,
    /// Player controlled by this client, once joined
    pub player_id: Option<u32>,
    /// Highest command sequence number handed to the simulation
    pub last_processed_input: u32,
    /// Buffered commands waiting to be processed
    pub pending_inputs: Vec<InputCommand>,
    /// Shoot requests waiting to be processed
    pub pending_shots: Vec<ShootRequest>,
}

impl Client {
    /// Creates a new client with the given ID and network address
    ///
    /// The client starts unjoined, with no processed inputs and empty
    /// buffers, and is marked as recently active.
    pub fn new(id: u32, addr: SocketAddr) -> Self {
        Self {
            id,
            addr,
            last_seen: Instant::now(),
            player_id: None,
            last_processed_input: 0,
            pending_inputs: Vec::new(),
            pending_shots: Vec::new(),
        }
    }

    /// Adds a command to the client's pending queue
    ///
    /// Commands at or below the last processed sequence are late duplicates
    /// and are dropped. The buffer is kept sorted so out-of-order datagrams
    /// are still applied in the order the client issued them.
    pub fn add_input(&mut self, command: InputCommand) {
        self.last_seen = Instant::now();
        if command.sequence <= self.last_processed_input {
            return;
        }
        self.pending_inputs.push(command);
        // Sort by sequence to handle out-of-order packet delivery
        self.pending_inputs.sort_by_key(|c| c.sequence);
    }

    pub fn add_shot(&mut self, shot: ShootRequest) {
        self.last_seen = Instant::now();
        self.pending_shots.push(shot);
    }

    /// Clears any queued work, used when the controlled player goes away
    pub fn clear_pending(&mut self) {
        self.pending_inputs.clear();
        self.pending_shots.clear();
    }

    /// Checks if the client has exceeded the connection timeout
    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }
}

/// Manages all connected clients and their queued input
///
/// The ClientManager enforces server capacity, maps addresses and players
/// back to clients, and hands the simulation one ordered batch of commands
/// per joined player each tick.
pub struct ClientManager {
    /// Connected clients indexed by their unique ID
    clients: HashMap<u32, Client>,
    /// Next available client ID for new connections
    next_client_id: u32,
    /// Maximum number of concurrent clients allowed
    max_clients: usize,
}

impl ClientManager {
    /// Creates a new client manager with the specified capacity limit
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: HashMap::new(),
            next_client_id: 1,
            max_clients,
        }
    }

    /// Attempts to add a new client connection
    ///
    /// Returns Some(client_id) if successful, None if server is at capacity.
    pub fn add_client(&mut self, addr: SocketAddr) -> Option<u32> {
        // Enforce server capacity limits
        if self.clients.len() >= self.max_clients {
            return None;
        }

        let client_id = self.next_client_id;
        self.next_client_id += 1;

        let client = Client::new(client_id, addr);
        info!("Client {} connected from {}", client_id, addr);
        self.clients.insert(client_id, client);

        Some(client_id)
    }

    /// Removes a client from the server
    ///
    /// Returns the player the client was controlling, if any, so the caller
    /// can remove it from the simulation as well.
    pub fn remove_client(&mut self, client_id: &u32) -> Option<Option<u32>> {
        self.clients.remove(client_id).map(|client| {
            info!("Client {} disconnected", client.id);
            client.player_id
        })
    }

    /// Finds a client ID by their network address
    pub fn find_client_by_addr(&self, addr: SocketAddr) -> Option<u32> {
        self.clients
            .iter()
            .find(|(_, client)| client.addr == addr)
            .map(|(id, _)| *id)
    }

    pub fn get(&self, client_id: u32) -> Option<&Client> {
        self.clients.get(&client_id)
    }

    /// Finds the client controlling `player_id`
    pub fn client_for_player(&self, player_id: u32) -> Option<&Client> {
        self.clients
            .values()
            .find(|client| client.player_id == Some(player_id))
    }

    /// Links a client to the player it now controls
    ///
    /// Sequence tracking restarts because a fresh player begins a fresh
    /// command stream.
    pub fn attach_player(&mut self, client_id: u32, player_id: u32) -> bool {
        if let Some(client) = self.clients.get_mut(&client_id) {
            client.player_id = Some(player_id);
            client.last_processed_input = 0;
            client.clear_pending();
            true
        } else {
            false
        }
    }

    /// Unlinks whichever client controls `player_id` and returns its ID
    pub fn detach_player(&mut self, player_id: u32) -> Option<u32> {
        let client = self
            .clients
            .values_mut()
            .find(|client| client.player_id == Some(player_id))?;
        client.player_id = None;
        client.clear_pending();
        Some(client.id)
    }

    /// Records activity without queuing anything (pings, joins)
    pub fn touch(&mut self, client_id: u32) {
        if let Some(client) = self.clients.get_mut(&client_id) {
            client.last_seen = Instant::now();
        }
    }

    /// Adds a command to a specific client's pending queue
    ///
    /// Returns false if the client ID is invalid or the client has no player.
    pub fn add_input(&mut self, client_id: u32, command: InputCommand) -> bool {
        match self.clients.get_mut(&client_id) {
            Some(client) if client.player_id.is_some() => {
                client.add_input(command);
                true
            }
            _ => false,
        }
    }

    pub fn add_shot(&mut self, client_id: u32, shot: ShootRequest) -> bool {
        match self.clients.get_mut(&client_id) {
            Some(client) if client.player_id.is_some() => {
                client.add_shot(shot);
                true
            }
            _ => false,
        }
    }

    /// Takes every queued command and shot for the next tick
    ///
    /// Commands are returned in sequence order with duplicates removed, and
    /// each client's processed watermark advances to the highest sequence
    /// handed out so a re-sent command is never applied twice.
    pub fn drain_inputs(&mut self) -> Vec<PlayerInputs> {
        let mut batches = Vec::new();

        for client in self.clients.values_mut() {
            let Some(player_id) = client.player_id else {
                continue;
            };

            let mut commands = std::mem::take(&mut client.pending_inputs);
            commands.retain(|c| c.sequence > client.last_processed_input);
            commands.dedup_by_key(|c| c.sequence);
            let shots = std::mem::take(&mut client.pending_shots);

            if commands.is_empty() && shots.is_empty() {
                continue;
            }

            if let Some(last) = commands.last() {
                client.last_processed_input = last.sequence;
            }

            batches.push(PlayerInputs {
                player_id,
                commands,
                shots,
            });
        }

        batches
    }

    /// Checks for and removes timed-out clients
    ///
    /// Returns each removed client's ID together with the player it was
    /// controlling, for cleanup in the simulation.
    pub fn check_timeouts(&mut self) -> Vec<(u32, Option<u32>)> {
        let timed_out: Vec<u32> = self
            .clients
            .iter()
            .filter(|(_, client)| client.is_timed_out(CLIENT_TIMEOUT))
            .map(|(id, _)| *id)
            .collect();

        timed_out
            .into_iter()
            .filter_map(|client_id| {
                self.remove_client(&client_id)
                    .map(|player_id| (client_id, player_id))
            })
            .collect()
    }

    /// Gets all client IDs and their network addresses
    ///
    /// Every connected client receives broadcasts, joined or not, so a
    /// spectator waiting to respawn keeps seeing the world.
    pub fn get_client_addrs(&self) -> Vec<(u32, SocketAddr)> {
        self.clients
            .iter()
            .map(|(id, client)| (*id, client.addr))
            .collect()
    }

    /// Returns the number of currently connected clients
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns true if no clients are currently connected
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
