//! # Arena Client Library
//!
//! This library provides the client side of the arena shooter: input capture,
//! the network link, the predicted and reconciled local view of the world, and
//! rendering with macroquad.
//!
//! ## Architecture Overview
//!
//! The server is the only authority. The client sends sequenced commands and
//! shoot requests, shows their effect immediately, and quietly corrects itself
//! whenever a snapshot says otherwise.
//!
//! ### Client-Side Prediction
//! Every movement command is applied to the local player's target position as
//! soon as it is sent, using the same delta and clamp as the server.
//!
//! ### Server Reconciliation
//! Each snapshot carries the last command sequence the server applied for this
//! player. Buffered commands up to that sequence are dropped and the rest are
//! replayed on top of the authoritative position, so an idle client always
//! converges to exactly the server's answer.
//!
//! ### Interpolation
//! Drawn positions move half of the remaining distance to their targets each
//! frame, which hides both snapshot jitter and reconciliation corrections.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! - Pending command buffer and sequence numbering
//! - Snapshot application, trimming and replay
//! - Pickups, kill feed, leaderboard and respawn state
//!
//! ### Input Module (`input`)
//! - WASD movement, weapon slots, drop, pick up and punch keys
//! - Mouse aiming and shooting
//! - Debug toggles for prediction, reconciliation and interpolation
//!
//! ### Network Module (`network`)
//! - UDP socket on a background thread with its own tokio runtime
//! - Non-blocking hand-off of packets to and from the render loop
//! - Optional artificial latency for testing
//!
//! ### Rendering Module (`rendering`)
//! - Camera that follows the local player
//! - Players, projectiles and pickups
//! - HUD with ping, inventory, effects, leaderboard and kill feed
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::game::ClientGameState;
//! use client::network::{get_timestamp, NetworkClient};
//! use shared::{InputAction, Packet, PlayerClass};
//!
//! let network = NetworkClient::connect("127.0.0.1:8080", 0).unwrap();
//! network.send(Packet::Join { username: "me".to_string(), class: PlayerClass::Rogue });
//!
//! let mut game = ClientGameState::new();
//! loop {
//!     let now = get_timestamp();
//!     for packet in network.poll() {
//!         game.handle_packet(packet, now);
//!     }
//!
//!     // Predicted locally, confirmed by the next snapshot
//!     if let Some(command) = game.record_input(InputAction::Move { dx: 1.0, dy: 0.0 }, now) {
//!         network.send(Packet::Input(command));
//!     }
//!
//!     game.interpolate();
//! }
//! ```

pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
