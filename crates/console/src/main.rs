//! # Meter Console
//!
//! Console do operador do medidor: acompanha a telemetria do host em
//! tempo real, edita a configuração serial e salva/restaura um snapshot
//! dela.
//!
//! Logs vão para stderr; painéis e respostas para stdout.
//!
//! ## Uso
//! ```bash
//! meter_console
//! RUST_LOG=meter_core=debug meter_console 2>console.log
//! ```

mod console;
mod panels;

use console::Console;
use meter_core::binding::{RemoteBinding, UdpBinding};
use meter_core::config::AppConfig;
use meter_core::local_store::{FileStore, LocalStore};
use meter_core::persistence::SettingsController;
use meter_core::poller::IntervalTicker;
use meter_core::signal::{SettingsRestored, SignalBus};
use meter_core::store::TelemetryStore;
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── Config ──
    let config = AppConfig::load_or_init(&AppConfig::default_path());
    for problem in config.validate() {
        warn!("Config: {problem}");
    }
    let console_cfg = &config.console;

    let target = match config.console_target() {
        Ok(addr) => addr,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    // ── Componentes ──
    let binding: Arc<dyn RemoteBinding> =
        Arc::new(UdpBinding::new(target, console_cfg.request_timeout()));
    let data_dir = console_cfg.data_dir();
    let local: Arc<dyn LocalStore> = Arc::new(FileStore::new(&data_dir));
    let bus = Arc::new(SignalBus::<SettingsRestored>::default());

    let store = TelemetryStore::start(
        console_cfg.protocol_label.clone(),
        Arc::clone(&binding),
        IntervalTicker::new(console_cfg.poll_interval()),
    );
    let settings = Arc::new(SettingsController::new(Arc::clone(&binding), local, bus));
    let restored_rx = settings.restore_signal().subscribe();
    let save_state = settings.refresh_save_state().await;
    if let Err(e) = settings.sync_live().await {
        warn!("Host ainda não recebeu a configuração salva: {e}");
    }

    let (tx, updates) = crossbeam_channel::bounded(1);
    let subscription = store.subscribe(move || {
        let _ = tx.try_send(());
    });

    // ── Banner ──
    println!();
    println!("══════════════════════════════════════════════");
    println!("   ⚡ METER CONSOLE");
    println!("══════════════════════════════════════════════");
    println!("  Host:       {target}");
    println!("  Polling:    {} ms", console_cfg.poll_interval_ms);
    println!("  Dados:      {}", data_dir.display());
    println!("  Salvamento: {save_state:?}");
    println!("══════════════════════════════════════════════");
    println!("{}", console::HELP);
    println!();

    Console::new(Arc::clone(&store), binding, settings)
        .run(restored_rx, updates)
        .await;

    subscription.unsubscribe();
    info!("Console encerrado");
}
