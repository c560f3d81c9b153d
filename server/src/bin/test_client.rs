//! Headless bot for poking a running server from the terminal.
//!
//! Joins, wanders in a circle while shooting, and prints what comes back.

use bincode::{deserialize, serialize};
use clap::Parser;
use shared::{InputAction, InputCommand, Packet, PlayerClass, MAX_PACKET_SIZE};
use std::net::SocketAddr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::net::UdpSocket;
use tokio::time::{interval, timeout};

#[derive(Parser, Debug)]
#[command(about = "Headless arena bot")]
struct Args {
    /// Server address to connect to
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Bot username
    #[arg(short, long, default_value = "bot")]
    name: String,

    /// Number of movement commands to send before leaving
    #[arg(short, long, default_value = "200")]
    steps: u32,
}

// Get current timestamp in milliseconds
fn get_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_millis() as u64
}

async fn send(
    socket: &UdpSocket,
    packet: &Packet,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error>> {
    socket.send_to(&serialize(packet)?, addr).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let server_addr = args.server.parse::<SocketAddr>()?;

    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    println!("Bot socket bound to {}", socket.local_addr()?);

    let join = Packet::Join {
        username: args.name.clone(),
        class: PlayerClass::Gunner,
    };
    send(&socket, &join, server_addr).await?;

    let mut buf = vec![0u8; MAX_PACKET_SIZE];
    let player_id = loop {
        let (len, _) = timeout(Duration::from_secs(3), socket.recv_from(&mut buf)).await??;
        match deserialize::<Packet>(&buf[..len])? {
            Packet::Joined { player_id, .. } => break player_id,
            Packet::Rejected { reason } => {
                println!("Join rejected: {}", reason);
                return Ok(());
            }
            _ => continue,
        }
    };
    println!("Joined as player {}", player_id);

    let mut ticker = interval(Duration::from_millis(16));
    let mut sequence = 0u32;

    while sequence < args.steps {
        tokio::select! {
            _ = ticker.tick() => {
                sequence += 1;
                let angle = sequence as f32 / 20.0;
                let command = InputCommand {
                    sequence,
                    timestamp: get_timestamp(),
                    action: InputAction::Move { dx: angle.cos(), dy: angle.sin() },
                };
                send(&socket, &Packet::Input(command), server_addr).await?;

                if sequence % 30 == 0 {
                    send(&socket, &Packet::Shoot { x: 0.0, y: 0.0, angle }, server_addr).await?;
                    send(&socket, &Packet::Ping { timestamp: get_timestamp() }, server_addr).await?;
                }
            }

            result = socket.recv_from(&mut buf) => {
                let (len, _) = result?;
                match deserialize::<Packet>(&buf[..len]) {
                    Ok(Packet::Snapshot { tick, players, projectiles, .. }) => {
                        if tick % 60 == 0 {
                            let me = players.iter().find(|p| p.id == player_id);
                            if let Some(me) = me {
                                println!(
                                    "tick {}: at ({:.0}, {:.0}) hp {:.0}, acked {}/{}, {} players, {} projectiles",
                                    tick, me.x, me.y, me.health, me.last_processed_input,
                                    sequence, players.len(), projectiles.len()
                                );
                            }
                        }
                    }
                    Ok(Packet::Pong { timestamp }) => {
                        println!("ping {} ms", get_timestamp().saturating_sub(timestamp));
                    }
                    Ok(Packet::Respawn) => {
                        println!("Eliminated");
                        break;
                    }
                    Ok(other) => println!("{:?}", other),
                    Err(e) => println!("Failed to deserialize packet: {}", e),
                }
            }
        }
    }

    send(&socket, &Packet::Disconnect, server_addr).await?;
    println!("Disconnected");
    Ok(())
}
