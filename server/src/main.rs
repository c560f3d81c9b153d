use clap::Parser;
use log::info;
use server::config::GameConfig;
use server::network::Server;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Milliseconds between simulation ticks
    #[arg(short, long, default_value = "15")]
    tick_ms: u64,

    /// Maximum number of concurrent clients
    #[arg(short, long, default_value = "32")]
    max_clients: usize,

    /// World width in game units
    #[arg(long, default_value = "5000")]
    world_width: f32,

    /// World height in game units
    #[arg(long, default_value = "5000")]
    world_height: f32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = GameConfig {
        world_width: args.world_width,
        world_height: args.world_height,
        tick_interval: Duration::from_millis(args.tick_ms.max(1)),
        ..GameConfig::default()
    };

    let address = format!("{}:{}", args.host, args.port);
    info!(
        "Starting arena server on {} ({}x{} world, {} ms ticks, {} clients max)",
        address, config.world_width, config.world_height, args.tick_ms, args.max_clients
    );

    let mut server = Server::new(&address, config, args.max_clients).await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
