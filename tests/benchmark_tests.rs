//! Performance benchmarks for critical game systems

use server::client_manager::PlayerInputs;
use server::config::GameConfig;
use server::game::GameState;
use shared::{circles_overlap, InputAction, InputCommand, Player, PlayerClass, Weapon};
use std::time::Instant;

/// Benchmarks circle overlap checks, the core of every hit and pickup test
#[test]
fn benchmark_collision_detection() {
    let iterations = 100_000;
    let start = Instant::now();

    let mut hits = 0;
    for i in 0..iterations {
        let offset = (i % 50) as f32;
        if circles_overlap(100.0, 100.0, 14.0, 100.0 + offset, 100.0, 5.0) {
            hits += 1;
        }
    }

    let duration = start.elapsed();
    println!(
        "Collision detection: {} iterations in {:?} ({:.2} ns/iter, {} hits)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64,
        hits
    );

    // Should complete in under 200ms for 100k iterations
    assert!(duration.as_millis() < 200);
}

/// Benchmarks projectile hit resolution with a crowded arena
#[test]
fn benchmark_projectile_resolution() {
    use server::combat::resolve_projectile_hits;
    use server::store::EntityStore;

    let iterations = 200;
    let start = Instant::now();

    for _ in 0..iterations {
        let mut store = EntityStore::new();
        let ids: Vec<u32> = (0..32)
            .map(|i| {
                store.add_player(
                    format!("p{}", i),
                    PlayerClass::Tank,
                    100.0 + i as f32 * 100.0,
                    500.0,
                )
            })
            .collect();
        for (i, owner) in ids.iter().enumerate() {
            for j in 0..10 {
                store.spawn_projectile(
                    *owner,
                    Weapon::Pistol,
                    (100.0 + i as f32 * 100.0 + j as f32 * 7.0, 480.0 + j as f32),
                    (5.0, 0.0),
                    5.0,
                );
            }
        }

        let _ = resolve_projectile_hits(&mut store);
    }

    let duration = start.elapsed();
    println!(
        "Projectile resolution: {} rounds of 320x32 in {:?} ({:.2} μs/round)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Should complete in under 2 seconds
    assert!(duration.as_millis() < 2000);
}

/// Benchmarks full simulation ticks with moving and shooting players
#[test]
fn benchmark_simulation_tick() {
    use server::client_manager::ShootRequest;

    let mut game = GameState::with_seed(GameConfig::default(), 99);
    let ids: Vec<u32> = (0..32)
        .map(|i| game.spawn_player(format!("p{}", i), PlayerClass::ALL[i % 4]))
        .collect();

    let ticks = 1_000u32;
    let start = Instant::now();

    for tick in 1..=ticks {
        let now = tick as u64 * 15;
        let batches: Vec<PlayerInputs> = ids
            .iter()
            .map(|&player_id| {
                let angle = (tick + player_id) as f32 / 30.0;
                let (x, y) = game
                    .store
                    .players
                    .get(&player_id)
                    .map(|p| (p.x, p.y))
                    .unwrap_or((0.0, 0.0));
                PlayerInputs {
                    player_id,
                    commands: vec![InputCommand {
                        sequence: tick,
                        timestamp: now,
                        action: InputAction::Move {
                            dx: angle.cos(),
                            dy: angle.sin(),
                        },
                    }],
                    shots: vec![ShootRequest { x, y, angle }],
                }
            })
            .collect();

        game.tick(now, batches);
        game.run_due_timers(now);
    }

    let duration = start.elapsed();
    println!(
        "Simulation: {} ticks with {} players in {:?} ({:.2} μs/tick)",
        ticks,
        ids.len(),
        duration,
        duration.as_micros() as f64 / ticks as f64
    );

    // Well under the 15 ms tick budget on average
    assert!(duration.as_millis() < 5000);
}

/// Benchmarks network packet serialization performance
#[test]
fn benchmark_packet_serialization() {
    use bincode::{deserialize, serialize};
    use shared::Packet;

    let mut game = GameState::with_seed(GameConfig::default(), 4);
    for i in 0..50 {
        game.spawn_player(format!("p{}", i), PlayerClass::Gunner);
    }
    let packet = game.snapshot(1234567890);

    let iterations = 10_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let serialized = serialize(&packet).unwrap();
        let _deserialized: Packet = deserialize(&serialized).unwrap();
    }

    let duration = start.elapsed();
    println!(
        "Packet serialization: {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Should complete in under 5 seconds
    assert!(duration.as_millis() < 5000);
}

/// Checks a busy snapshot still fits in one datagram
#[test]
fn benchmark_large_snapshot_size() {
    use bincode::serialize;
    use server::client_manager::ShootRequest;
    use shared::MAX_PACKET_SIZE;

    let mut game = GameState::with_seed(GameConfig::default(), 6);
    let ids: Vec<u32> = (0..64)
        .map(|i| game.spawn_player(format!("player_{:02}", i), PlayerClass::Gunner))
        .collect();
    for (i, &id) in ids.iter().enumerate() {
        let _ = game.shoot(
            id,
            ShootRequest {
                x: 2500.0,
                y: 2500.0,
                angle: i as f32,
            },
            0,
        );
    }

    let start = Instant::now();
    let size = serialize(&game.snapshot(0)).unwrap().len();
    let duration = start.elapsed();
    println!(
        "Large snapshot: {} players, {} projectiles, {} bytes in {:?}",
        ids.len(),
        game.store.projectiles.len(),
        size,
        duration
    );

    assert!(size < MAX_PACKET_SIZE);
}

/// Stress tests command queueing under high load
#[test]
fn stress_test_many_inputs() {
    use server::client_manager::ClientManager;
    use std::net::SocketAddr;

    let mut clients = ClientManager::new(64);
    for i in 0..64u32 {
        let addr: SocketAddr = format!("127.0.0.1:{}", 20000 + i).parse().unwrap();
        let client_id = clients.add_client(addr).unwrap();
        clients.attach_player(client_id, i + 1);
    }
    let client_ids: Vec<u32> = clients.get_client_addrs().into_iter().map(|(id, _)| id).collect();

    let start = Instant::now();

    // Reverse order forces the sorted insert to do real work
    for &client_id in &client_ids {
        for sequence in (1..=200u32).rev() {
            clients.add_input(
                client_id,
                InputCommand {
                    sequence,
                    timestamp: sequence as u64 * 16,
                    action: InputAction::Move { dx: 1.0, dy: 0.0 },
                },
            );
        }
    }
    let batches = clients.drain_inputs();

    let duration = start.elapsed();
    println!(
        "Input queueing: {} commands in {:?}",
        client_ids.len() * 200,
        duration
    );

    assert_eq!(batches.len(), 64);
    for batch in &batches {
        assert_eq!(batch.commands.len(), 200);
        assert!(batch
            .commands
            .windows(2)
            .all(|pair| pair[0].sequence < pair[1].sequence));
    }

    // Should complete in under 2 seconds
    assert!(duration.as_millis() < 2000);
}

/// Benchmarks client-side prediction of movement commands
#[test]
fn benchmark_client_prediction() {
    use client::game::ClientGameState;

    let mut client_state = ClientGameState::new();
    client_state.on_joined(1, 5000.0, 5000.0);
    let player = Player::new(1, "me".to_string(), PlayerClass::Rogue, 2500.0, 2500.0);
    client_state.apply_snapshot(1, vec![player], Vec::new(), Vec::new(), Vec::new());

    let iterations = 10_000;
    let start = Instant::now();

    for i in 0..iterations {
        let angle = i as f32 / 100.0;
        let action = InputAction::Move {
            dx: angle.cos(),
            dy: angle.sin(),
        };
        let _ = client_state.record_input(action, i as u64);
        // Keep the buffer bounded the way acknowledgements would
        if client_state.pending.len() > 64 {
            client_state.pending.pop_front();
        }
    }

    let duration = start.elapsed();
    println!(
        "Client prediction: {} inputs in {:?} ({:.2} ns/input)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    // Should complete in under 200ms
    assert!(duration.as_millis() < 200);
}

/// Benchmarks reconciliation performance under load
#[test]
fn benchmark_reconciliation_performance() {
    use client::game::ClientGameState;

    let mut client_state = ClientGameState::new();
    client_state.on_joined(1, 5000.0, 5000.0);
    let player = Player::new(1, "me".to_string(), PlayerClass::Mage, 100.0, 100.0);
    client_state.apply_snapshot(1, vec![player], Vec::new(), Vec::new(), Vec::new());

    // Add input history
    for i in 1..=100 {
        let action = InputAction::Move {
            dx: if i % 2 == 0 { 1.0 } else { -1.0 },
            dy: if i % 3 == 0 { 1.0 } else { 0.0 },
        };
        client_state.record_input(action, i as u64 * 16);
    }

    let iterations = 100;
    let start = Instant::now();

    for tick in 0..iterations {
        // Different position to trigger a visible correction; nothing acknowledged
        let player = Player::new(1, "me".to_string(), PlayerClass::Mage, 150.0, 100.0);
        client_state.apply_snapshot(tick + 2, vec![player], Vec::new(), Vec::new(), Vec::new());
    }

    let duration = start.elapsed();
    println!(
        "Reconciliation: {} reconciliations in {:?} ({:.2} ms/reconciliation)",
        iterations,
        duration,
        duration.as_millis() as f64 / iterations as f64
    );

    assert_eq!(client_state.pending.len(), 100);
    // Should handle 100 reconciliations of 100 inputs in under 200ms
    assert!(duration.as_millis() < 200);
}
