//! # Meter Core
//!
//! Crate compartilhada do console do medidor: tipos, sincronização de
//! telemetria, persistência da configuração serial e o protocolo binário
//! (bincode) falado entre console e host.
//!
//! ## Módulos
//! - [`types`] – Status, telemetria e configuração serial
//! - [`telemetry`] – Validação e arredondamento das leituras
//! - [`store`] – Store de telemetria com assinaturas
//! - [`poller`] – Loop de polling com relógio injetável
//! - [`persistence`] – Salvamento e restauração da configuração
//! - [`input`] – Validação da entrada do operador
//! - [`acquisition`] – Início/parada da aquisição serial
//! - [`binding`] – Trait do binding remoto e implementação UDP
//! - [`protocol`] – Encode/decode binário com magic byte
//! - [`local_store`] – Slots locais chave → JSON
//! - [`signal`] – Barramento do sinal de restauração
//! - [`snapshot`] – Leitura tolerante de snapshots salvos
//! - [`config`] – Configuração unificada via TOML

pub mod types;
pub mod telemetry;
pub mod store;
pub mod poller;
pub mod persistence;
pub mod input;
pub mod acquisition;
pub mod binding;
pub mod protocol;
pub mod local_store;
pub mod signal;
pub mod snapshot;
pub mod config;

#[cfg(test)]
mod testing;

// Re-exports convenientes
pub use types::{DeviceStatus, Parity, SerialSettings, SettingsField, StatusUpdate, TelemetrySample};
pub use store::{Subscription, TelemetryStore};
pub use persistence::{SaveState, SettingsController, SettingsError};
pub use binding::{RemoteBinding, UdpBinding};
pub use config::{AppConfig, ConsoleConfig, HostConfig};
