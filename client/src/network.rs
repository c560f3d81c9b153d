//! UDP link to the server, run on its own thread so the render loop never blocks

use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use shared::{Packet, MAX_PACKET_SIZE};
use std::net::SocketAddr;
use std::sync::{mpsc as std_mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::sleep;

/// Wall-clock milliseconds, used for command timestamps and ping
pub fn get_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_millis() as u64
}

pub struct NetworkClient {
    outgoing: mpsc::UnboundedSender<Packet>,
    incoming: std_mpsc::Receiver<Packet>,
    thread: JoinHandle<()>,
    pub server_addr: SocketAddr,
    pub fake_ping_ms: u64,
}

impl NetworkClient {
    /// Binds a local socket and starts the network thread.
    ///
    /// `fake_ping_ms` is split evenly between the outbound and inbound legs.
    pub fn connect(server: &str, fake_ping_ms: u64) -> Result<Self, Box<dyn std::error::Error>> {
        let server_addr: SocketAddr = server.parse()?;
        let socket = std::net::UdpSocket::bind("0.0.0.0:0")?;
        socket.set_nonblocking(true)?;
        info!("Client socket bound to {}", socket.local_addr()?);

        let (outgoing, outgoing_rx) = mpsc::unbounded_channel();
        let (incoming_tx, incoming) = std_mpsc::channel();

        let thread = thread::Builder::new()
            .name("network".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        error!("Failed to start network runtime: {}", e);
                        return;
                    }
                };

                let link = run_link(socket, server_addr, fake_ping_ms, outgoing_rx, incoming_tx);
                if let Err(e) = runtime.block_on(link) {
                    error!("Network thread stopped: {}", e);
                }
            })?;

        Ok(Self {
            outgoing,
            incoming,
            thread,
            server_addr,
            fake_ping_ms,
        })
    }

    pub fn send(&self, packet: Packet) {
        if self.outgoing.send(packet).is_err() {
            warn!("Network thread is gone, dropping packet");
        }
    }

    /// Everything that arrived since the last call, without blocking
    pub fn poll(&self) -> Vec<Packet> {
        self.incoming.try_iter().collect()
    }

    /// Sends a disconnect, then waits for the network thread to flush and exit
    pub fn shutdown(self) {
        self.send(Packet::Disconnect);
        drop(self.outgoing);
        if self.thread.join().is_err() {
            error!("Network thread panicked");
        }
    }
}

async fn run_link(
    socket: std::net::UdpSocket,
    server_addr: SocketAddr,
    fake_ping_ms: u64,
    mut outgoing: mpsc::UnboundedReceiver<Packet>,
    incoming: std_mpsc::Sender<Packet>,
) -> Result<(), Box<dyn std::error::Error>> {
    let socket = Arc::new(UdpSocket::from_std(socket)?);
    let delay = Duration::from_millis(fake_ping_ms / 2);
    let mut buffer = vec![0u8; MAX_PACKET_SIZE];

    loop {
        tokio::select! {
            packet = outgoing.recv() => {
                // The game loop dropped its sender
                let Some(packet) = packet else { break };

                let data = serialize(&packet)?;
                if delay.is_zero() || matches!(packet, Packet::Disconnect) {
                    socket.send_to(&data, server_addr).await?;
                } else {
                    let socket = Arc::clone(&socket);
                    tokio::spawn(async move {
                        sleep(delay).await;
                        if let Err(e) = socket.send_to(&data, server_addr).await {
                            error!("Error sending packet: {}", e);
                        }
                    });
                }
            }

            result = socket.recv_from(&mut buffer) => {
                let (len, addr) = match result {
                    Ok(received) => received,
                    Err(e) => {
                        error!("Error receiving packet: {}", e);
                        continue;
                    }
                };
                if addr != server_addr {
                    debug!("Ignoring packet from {}", addr);
                    continue;
                }

                let packet = match deserialize::<Packet>(&buffer[..len]) {
                    Ok(packet) => packet,
                    Err(e) => {
                        warn!("Failed to deserialize packet: {}", e);
                        continue;
                    }
                };

                if delay.is_zero() {
                    if incoming.send(packet).is_err() {
                        break;
                    }
                } else {
                    let incoming = incoming.clone();
                    tokio::spawn(async move {
                        sleep(delay).await;
                        let _ = incoming.send(packet);
                    });
                }
            }
        }
    }

    Ok(())
}
