//! Integration tests for networked multiplayer components
//!
//! These tests validate cross-component interactions and real network behavior.

use assert_approx_eq::assert_approx_eq;
use bincode::{deserialize, serialize};
use client::game::ClientGameState;
use server::client_manager::{PlayerInputs, ShootRequest};
use server::config::GameConfig;
use server::game::{GameEvent, GameState};
use shared::{
    InputAction, InputCommand, KillCause, Packet, PlayerClass, Weapon, WORLD_HEIGHT, WORLD_WIDTH,
};
use std::time::Duration;
use tokio::time::sleep;

/// NETWORK PROTOCOL TESTS
mod protocol_tests {
    use super::*;

    /// Tests that the messages the reconciliation loop depends on survive encoding
    #[test]
    fn packet_serialization_preserves_reconciliation_fields() {
        let mut game = GameState::with_seed(GameConfig::default(), 1);
        let id = game.spawn_player("alice".to_string(), PlayerClass::Gunner);
        game.store.players.get_mut(&id).unwrap().last_processed_input = 77;

        let bytes = serialize(&game.snapshot(1234)).unwrap();
        match deserialize::<Packet>(&bytes).unwrap() {
            Packet::Snapshot {
                timestamp, players, ..
            } => {
                assert_eq!(timestamp, 1234);
                assert_eq!(players.len(), 1);
                assert_eq!(players[0].last_processed_input, 77);
                assert_eq!(players[0].inventory.len(), 3);
            }
            other => panic!("Unexpected packet {:?}", other),
        }

        let command = InputCommand {
            sequence: 9,
            timestamp: 5,
            action: InputAction::SelectSlot { slot: 2 },
        };
        let bytes = serialize(&Packet::Input(command.clone())).unwrap();
        match deserialize::<Packet>(&bytes).unwrap() {
            Packet::Input(decoded) => assert_eq!(decoded, command),
            other => panic!("Unexpected packet {:?}", other),
        }
    }

    /// Tests malformed packet handling
    #[test]
    fn malformed_packet_handling() {
        let malformed_packets: Vec<&[u8]> = vec![
            &[],
            &[0xFF],
            &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
            &[42, 0, 0, 0],
        ];

        for data in malformed_packets {
            assert!(
                deserialize::<Packet>(data).is_err(),
                "Should reject malformed packet {:?}",
                data
            );
        }
    }
}

/// GAME LOGIC INTEGRATION TESTS
mod game_logic_tests {
    use super::*;

    fn duel() -> (GameState, u32, u32) {
        let mut game = GameState::with_seed(GameConfig::default(), 3);
        let shooter = game.spawn_player("shooter".to_string(), PlayerClass::Gunner);
        let victim = game.spawn_player("victim".to_string(), PlayerClass::Tank);
        {
            let player = game.store.players.get_mut(&shooter).unwrap();
            player.x = 1000.0;
            player.y = 1000.0;
        }
        {
            let player = game.store.players.get_mut(&victim).unwrap();
            player.x = 1100.0;
            player.y = 1000.0;
        }
        (game, shooter, victim)
    }

    fn fire_at_victim(game: &mut GameState, shooter: u32) -> Vec<GameEvent> {
        let shot = ShootRequest {
            x: 1000.0,
            y: 1000.0,
            angle: 0.0,
        };
        let batch = PlayerInputs {
            player_id: shooter,
            commands: Vec::new(),
            shots: vec![shot],
        };

        let mut events = game.tick(0, vec![batch]);
        for step in 1..100u64 {
            if game.store.projectiles.is_empty() {
                break;
            }
            events.extend(game.tick(step * 15, Vec::new()));
        }
        events
    }

    /// Tests a projectile travelling across the world and damaging its target
    #[test]
    fn projectile_hit_applies_class_scaled_damage() {
        let (mut game, shooter, victim) = duel();

        fire_at_victim(&mut game, shooter);

        // Fist 40 scaled by the gunner's light multiplier of 1.3
        let health = game.store.players[&victim].health;
        assert_approx_eq!(health, 98.0, 1e-3);
        assert!(game.store.projectiles.is_empty());
    }

    /// Tests elimination, scoring and the kill feed event
    #[test]
    fn lethal_hit_eliminates_and_scores() {
        let (mut game, shooter, victim) = duel();
        game.store.players.get_mut(&victim).unwrap().health = 10.0;

        let events = fire_at_victim(&mut game, shooter);

        assert!(!game.store.players.contains_key(&victim));
        assert_eq!(game.store.players[&shooter].score, 1);
        assert!(events.iter().any(|event| matches!(
            event,
            GameEvent::PlayerEliminated {
                victim_id,
                cause: KillCause::Weapon(Weapon::Fist),
                ..
            } if *victim_id == victim
        )));

        match game.leaderboard() {
            Packet::Leaderboard { entries } => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].player_id, shooter);
                assert_eq!(entries[0].score, 1);
            }
            other => panic!("Unexpected packet {:?}", other),
        }
    }

    /// Tests player boundary constraint enforcement under long runs of input
    #[test]
    fn boundary_constraint_integration() {
        let mut game = GameState::with_seed(GameConfig::default(), 11);
        let id = game.spawn_player("runner".to_string(), PlayerClass::Rogue);

        for sequence in 1..=2000u32 {
            let command = InputCommand {
                sequence,
                timestamp: 0,
                action: InputAction::Move { dx: -1.0, dy: -1.0 },
            };
            let batch = PlayerInputs {
                player_id: id,
                commands: vec![command],
                shots: Vec::new(),
            };
            game.tick(sequence as u64 * 15, vec![batch]);
        }

        let player = &game.store.players[&id];
        assert_eq!(player.x, player.radius);
        assert_eq!(player.y, player.radius);
        assert_eq!(player.last_processed_input, 2000);
    }
}

/// CLIENT-SERVER INTEGRATION TESTS
mod client_server_tests {
    use super::*;

    fn joined_client(game: &GameState, player_id: u32) -> ClientGameState {
        let mut client = ClientGameState::new();
        client.handle_packet(
            Packet::Joined {
                player_id,
                world_width: WORLD_WIDTH,
                world_height: WORLD_HEIGHT,
            },
            0,
        );
        client.handle_packet(game.snapshot(0), 0);
        client
    }

    /// Tests that prediction, partial acknowledgement and replay agree with the server
    #[test]
    fn reconciliation_converges_on_server_position() {
        let mut game = GameState::with_seed(GameConfig::default(), 5);
        let id = game.spawn_player("me".to_string(), PlayerClass::Rogue);
        {
            // Close enough to the right wall that the moves get clamped
            let player = game.store.players.get_mut(&id).unwrap();
            player.x = WORLD_WIDTH - 30.0;
            player.y = 2500.0;
        }
        let mut client = joined_client(&game, id);

        let commands: Vec<InputCommand> = (0..6)
            .filter_map(|_| client.record_input(InputAction::Move { dx: 1.0, dy: 0.0 }, 0))
            .collect();
        assert_eq!(commands.len(), 6);
        let predicted = client
            .local_player()
            .map(|p| (p.target_x, p.target_y))
            .unwrap();

        // Server has only seen the first half
        let first_half = PlayerInputs {
            player_id: id,
            commands: commands[..3].to_vec(),
            shots: Vec::new(),
        };
        game.tick(15, vec![first_half]);
        client.handle_packet(game.snapshot(15), 0);

        assert_eq!(client.pending.len(), 3);
        let reconciled = client.local_player().map(|p| (p.target_x, p.target_y));
        assert_eq!(reconciled, Some(predicted));

        let second_half = PlayerInputs {
            player_id: id,
            commands: commands[3..].to_vec(),
            shots: Vec::new(),
        };
        game.tick(30, vec![second_half]);
        client.handle_packet(game.snapshot(30), 0);

        let server_player = &game.store.players[&id];
        let local = client.local_player().unwrap();
        assert!(client.pending.is_empty());
        assert_eq!((local.target_x, local.target_y), (server_player.x, server_player.y));
        assert_eq!(local.target_x, WORLD_WIDTH - server_player.radius);
    }

    /// Tests that a server-side correction overrides the client's prediction
    #[test]
    fn server_correction_wins_over_prediction() {
        let mut game = GameState::with_seed(GameConfig::default(), 8);
        let id = game.spawn_player("me".to_string(), PlayerClass::Mage);
        let mut client = joined_client(&game, id);

        let command = client
            .record_input(InputAction::Move { dx: 0.0, dy: 1.0 }, 0)
            .unwrap();
        game.tick(
            15,
            vec![PlayerInputs {
                player_id: id,
                commands: vec![command],
                shots: Vec::new(),
            }],
        );

        // Something the client could not predict moved the player
        game.store.players.get_mut(&id).unwrap().x = 100.0;
        client.handle_packet(game.snapshot(15), 0);

        let local = client.local_player().unwrap();
        assert_eq!(local.target_x, 100.0);
        for _ in 0..40 {
            client.interpolate();
        }
        let local = client.local_player().unwrap();
        assert_approx_eq!(local.draw_x, 100.0, 1e-2);
    }
}

/// STRESS AND ERROR HANDLING TESTS
mod stress_tests {
    use super::*;
    use client::network::NetworkClient;
    use server::network::{Server, ServerMessage};

    /// Tests duplicated and reordered commands are applied exactly once
    #[test]
    fn duplicate_and_reordered_commands() {
        use server::client_manager::ClientManager;
        use std::net::SocketAddr;

        let mut clients = ClientManager::new(4);
        let addr: SocketAddr = "127.0.0.1:5000".parse().unwrap();
        let client_id = clients.add_client(addr).unwrap();
        clients.attach_player(client_id, 1);

        for sequence in [3u32, 1, 2, 2, 3, 1] {
            clients.add_input(
                client_id,
                InputCommand {
                    sequence,
                    timestamp: 0,
                    action: InputAction::Move { dx: 1.0, dy: 0.0 },
                },
            );
        }
        let batches = clients.drain_inputs();
        let sequences: Vec<u32> = batches[0].commands.iter().map(|c| c.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3]);

        // Late duplicates of already-applied commands are dropped
        clients.add_input(
            client_id,
            InputCommand {
                sequence: 2,
                timestamp: 0,
                action: InputAction::Punch,
            },
        );
        assert!(clients.drain_inputs().iter().all(|b| b.commands.is_empty()));
    }

    /// Tests a full join, move and acknowledge cycle over real sockets
    #[tokio::test]
    async fn full_udp_session() {
        let mut server = Server::new("127.0.0.1:0", GameConfig::default(), 8)
            .await
            .unwrap();
        let server_addr = server.local_addr().unwrap();
        let handle = server.handle();
        tokio::spawn(async move {
            let _ = server.run().await;
        });

        let network = NetworkClient::connect(&server_addr.to_string(), 0).unwrap();
        network.send(Packet::Join {
            username: "integration".to_string(),
            class: PlayerClass::Mage,
        });

        let mut game = ClientGameState::new();
        let mut sent = None;
        let mut acknowledged = false;

        for _ in 0..300 {
            for packet in network.poll() {
                game.handle_packet(packet, 0);
            }

            if sent.is_none() && game.local_player().is_some() {
                let command = game
                    .record_input(InputAction::Move { dx: 1.0, dy: 0.0 }, 0)
                    .unwrap();
                sent = Some(command.sequence);
                network.send(Packet::Input(command));
            }

            if let (Some(sequence), Some(local)) = (sent, game.local_player()) {
                if local.state.last_processed_input >= sequence {
                    acknowledged = true;
                    break;
                }
            }

            sleep(Duration::from_millis(10)).await;
        }

        assert!(acknowledged, "Input was never acknowledged");
        assert!(game.pending.is_empty());
        let local = game.local_player().unwrap();
        assert_eq!((local.target_x, local.target_y), (local.state.x, local.state.y));

        network.shutdown();
        handle.send(ServerMessage::Shutdown).unwrap();
    }
}
