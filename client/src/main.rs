use clap::Parser;
use client::game::ClientGameState;
use client::input::InputManager;
use client::network::{get_timestamp, NetworkClient};
use client::rendering::{frame_camera, Renderer, UiConfig};
use log::{error, info};
use macroquad::prelude::*;
use shared::{Packet, PlayerClass};
use std::time::{Duration, Instant};

const PING_INTERVAL: Duration = Duration::from_secs(1);

fn parse_class(name: &str) -> Result<PlayerClass, String> {
    PlayerClass::from_name(name)
        .ok_or_else(|| format!("unknown class '{}', expected tank, mage, rogue or gunner", name))
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Name shown to other players
    #[arg(short = 'n', long, default_value = "Player")]
    name: String,

    /// Player class: tank, mage, rogue or gunner
    #[arg(short = 'c', long, default_value = "gunner", value_parser = parse_class)]
    class: PlayerClass,

    /// Simulate network latency in milliseconds
    #[arg(short = 'l', long, default_value = "0")]
    fake_ping: u64,

    /// Window width
    #[arg(short = 'w', long, default_value = "1024")]
    width: i32,

    /// Window height (no short flag to avoid conflict with --help)
    #[arg(long, default_value = "768")]
    height: i32,
}

fn window_conf() -> Conf {
    let args = Args::parse();
    Conf {
        window_title: "Arena".to_string(),
        window_width: args.width,
        window_height: args.height,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Starting client...");
    info!("Connecting to: {}", args.server);
    if args.fake_ping > 0 {
        info!("Simulating {}ms latency", args.fake_ping);
    }
    info!("Controls: WASD to move, mouse to shoot, E to punch, 1/2/3 to switch weapon");
    info!("Q to drop, F to pick up, Enter to respawn");
    info!("Press F1/F2/F3 to toggle Prediction/Reconciliation/Interpolation");

    let network = match NetworkClient::connect(&args.server, args.fake_ping) {
        Ok(network) => network,
        Err(e) => {
            error!("Failed to start networking: {}", e);
            return;
        }
    };

    let join = Packet::Join {
        username: args.name.clone(),
        class: args.class,
    };
    network.send(join.clone());

    let mut game = ClientGameState::new();
    let mut input_manager = InputManager::new();
    let mut renderer = Renderer::new();
    let mut last_ping = Instant::now();

    while !is_key_pressed(KeyCode::Escape) {
        let now = get_timestamp();
        for packet in network.poll() {
            game.handle_packet(packet, now);
        }

        let frame = input_manager.update();
        if frame.toggles.0 {
            game.toggle_prediction();
        }
        if frame.toggles.1 {
            game.toggle_reconciliation();
        }
        if frame.toggles.2 {
            game.toggle_interpolation();
        }
        if frame.respawn && game.eliminated {
            network.send(join.clone());
        }

        for action in frame.actions {
            if let Some(command) = game.record_input(action, now) {
                network.send(Packet::Input(command));
            }
        }

        if let (Some((mouse_x, mouse_y)), Some(local)) = (frame.shoot_at, game.local_player()) {
            let (aim_x, aim_y) = frame_camera(&game).to_world(mouse_x, mouse_y);
            let angle = (aim_y - local.draw_y).atan2(aim_x - local.draw_x);
            network.send(Packet::Shoot {
                x: local.target_x,
                y: local.target_y,
                angle,
            });
        }

        if last_ping.elapsed() >= PING_INTERVAL {
            network.send(Packet::Ping { timestamp: now });
            last_ping = Instant::now();
        }

        game.interpolate();
        renderer.render(
            &game,
            UiConfig {
                ping_ms: game.ping_ms,
                fake_ping_ms: network.fake_ping_ms,
            },
        );

        next_frame().await;
    }

    network.shutdown();
}
