//! # Meter Host
//!
//! Serve o binding remoto do console via UDP: telemetria de um medidor
//! simulado, configuração serial e o snapshot salvo.
//!
//! ## Uso
//! ```bash
//! meter_host            # usa config.toml ao lado do executável
//! RUST_LOG=debug meter_host
//! ```

mod device;
mod snapshot_file;

use device::{HostState, SimulatedMeter};
use meter_core::config::AppConfig;
use meter_core::protocol::{MAX_UDP_PAYLOAD, PROTOCOL_VERSION, Response, decode_request, encode_response};
use snapshot_file::SnapshotFile;
use tokio::net::UdpSocket;
use tracing::{debug, error, warn};

#[tokio::main]
async fn main() {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── Carregar config ──
    let config = AppConfig::load_or_init(&AppConfig::default_path());
    for problem in config.validate() {
        warn!("Config: {problem}");
    }

    let addr = match config.host_socket() {
        Ok(addr) => addr,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    // ── Socket UDP ──
    let socket = match UdpSocket::bind(addr).await {
        Ok(socket) => socket,
        Err(e) => {
            error!("Falha ao abrir UDP {addr}: {e}");
            std::process::exit(1);
        }
    };

    let mut state = HostState::new(
        config.host.channels.clone(),
        SimulatedMeter::new(),
        SnapshotFile::new(&config.host.snapshot_path),
    );

    // ── Banner ──
    println!();
    println!("══════════════════════════════════════════════");
    println!("   ⚡ METER HOST – ATIVO");
    println!("══════════════════════════════════════════════");
    println!("  Escutando: {addr}");
    println!("  Portas:    {}", config.host.channels.join(", "));
    println!("  Snapshot:  {}", config.host.snapshot_path);
    println!("  Protocolo: bincode v{PROTOCOL_VERSION}");
    println!("══════════════════════════════════════════════");
    println!();

    // ── Loop principal ──
    let mut buf = vec![0u8; MAX_UDP_PAYLOAD];
    loop {
        let (len, peer) = match socket.recv_from(&mut buf).await {
            Ok(received) => received,
            Err(e) => {
                warn!("Erro ao receber UDP: {e}");
                continue;
            }
        };

        let (id, request) = match decode_request(&buf[..len]) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!("Frame inválido de {peer}: {e}");
                continue;
            }
        };

        let name = request.name();
        let response = state.handle(request);
        if let Response::Failed(reason) = &response {
            warn!("{name} falhou: {reason}");
        } else {
            debug!("{name} ← {peer}");
        }

        match encode_response(id, &response) {
            Ok(frame) => {
                if let Err(e) = socket.send_to(&frame, peer).await {
                    error!("Erro ao responder {peer}: {e}");
                }
            }
            Err(e) => error!("Erro ao serializar resposta: {e}"),
        }
    }
}
