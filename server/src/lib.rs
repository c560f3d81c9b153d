//! # Arena Server Library
//!
//! This library provides the authoritative server for the arena shooter. It
//! owns the canonical world, applies client commands, resolves combat and
//! timed power-ups, and broadcasts snapshots so clients can reconcile their
//! predictions.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Simulation
//! Every position, hit and pickup is decided here. Clients only ever send
//! intentions (move, shoot, pick up) and conform to the snapshots they get
//! back.
//!
//! ### Client Management
//! Handles the lifecycle of a connection:
//! - Joining, which spawns a player with the requested class
//! - Buffering of sequenced commands and shoot requests between ticks
//! - Respawn after elimination by re-joining on the same connection
//! - Explicit disconnects and silent-client timeouts
//!
//! ### State Broadcasting
//! After every tick the full world is sent to all clients. Discrete events
//! (pickups appearing and disappearing, kills, power-up notices, leaderboard
//! changes) are sent as separate packets when they happen.
//!
//! ## Architecture Design
//!
//! ### Single Owner Event Loop
//! `network::Server::run` is the only task that touches the game state. It
//! multiplexes inbound packets, the fixed tick, pending timers and the
//! timeout check with `tokio::select!`, so there are no locks around the
//! simulation and no two mutations ever interleave.
//!
//! ### Timers Instead of Callbacks
//! Power-up expiry, weapon and punch cooldowns, burn damage and pickup
//! spawning are entries in a min-heap owned by the game state. The loop
//! sleeps until the earliest deadline and runs due entries in order.
//!
//! ### UDP-Based Communication
//! Packets are `bincode`-encoded `shared::Packet` values over UDP. Snapshots
//! are full-state, so a lost one is simply superseded by the next.
//!
//! ## Module Organization
//!
//! - `client_manager`: connections, per-client command queues, timeouts
//! - `combat`: projectile hit resolution against the entity store
//! - `config`: world size, tick rate, spawn and effect tuning
//! - `error`: rejections raised by simulation operations
//! - `game`: the tick itself, commands, pickups, timers, snapshots
//! - `network`: sockets, the event loop and packet dispatch
//! - `powerups`: apply and revert rules for each power-up kind
//! - `store`: player, projectile and pickup registries
//! - `timers`: the deadline-ordered timer queue
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::GameConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 5000x5000 world ticking every 15 ms, up to 32 clients
//!     let mut server = Server::new("127.0.0.1:8080", GameConfig::default(), 32).await?;
//!
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod combat;
pub mod config;
pub mod error;
pub mod game;
pub mod network;
pub mod powerups;
pub mod store;
pub mod timers;
