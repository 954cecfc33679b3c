//! Medidor monofásico simulado e o estado do host.
//!
//! Gera leituras em torno de 220 V / 50 Hz com carga variável. A energia
//! ativa acumula entre leituras. Ocasionalmente simula uma leitura zerada
//! (queda do escravo Modbus), que o console deve rejeitar.

use crate::snapshot_file::SnapshotFile;
use chrono::{SecondsFormat, Utc};
use meter_core::protocol::{Request, Response};
use meter_core::snapshot::SnapshotPayload;
use meter_core::types::{RawTelemetry, SerialSettings};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Probabilidade de uma leitura zerada.
const DROPOUT_CHANCE: f64 = 0.02;

pub struct SimulatedMeter {
    rng: StdRng,
    /// kWh acumulados
    energy: f64,
    last_read: Option<Instant>,
}

impl SimulatedMeter {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            energy: 0.0,
            last_read: None,
        }
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn read(&mut self) -> RawTelemetry {
        let now = Instant::now();
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        if self.rng.gen_bool(DROPOUT_CHANCE) {
            debug!("Leitura zerada simulada");
            return RawTelemetry {
                voltage: Some(0.0),
                current: Some(0.0),
                active_power: Some(0.0),
                frequency: Some(0.0),
                active_energy: Some(0.0),
                timestamp: Some(timestamp),
                ..Default::default()
            };
        }

        let voltage = 220.0 + self.rng.gen_range(-3.0..3.0);
        let current = self.rng.gen_range(0.5..5.0);
        let power_factor: f64 = self.rng.gen_range(0.85..0.99);
        let frequency = 50.0 + self.rng.gen_range(-0.05..0.05);

        let apparent = voltage * current / 1000.0;
        let active = apparent * power_factor;
        let reactive = (apparent * apparent - active * active).max(0.0).sqrt();

        if let Some(last) = self.last_read {
            let hours = now.duration_since(last).as_secs_f64() / 3600.0;
            self.energy += active * hours;
        }
        self.last_read = Some(now);

        RawTelemetry {
            voltage: Some(voltage),
            current: Some(current),
            active_power: Some(active),
            reactive_power: Some(reactive),
            apparent_power: Some(apparent),
            power_factor: Some(power_factor),
            frequency: Some(frequency),
            active_energy: Some(self.energy),
            timestamp: Some(timestamp),
        }
    }
}

impl Default for SimulatedMeter {
    fn default() -> Self {
        Self::new()
    }
}

/// Estado do host: configuração viva, aquisição e snapshot salvo.
pub struct HostState {
    settings: SerialSettings,
    acquiring: bool,
    channels: Vec<String>,
    meter: SimulatedMeter,
    snapshot: SnapshotFile,
}

impl HostState {
    pub fn new(channels: Vec<String>, meter: SimulatedMeter, snapshot: SnapshotFile) -> Self {
        Self {
            settings: SerialSettings::default(),
            acquiring: false,
            channels,
            meter,
            snapshot,
        }
    }

    /// Executa uma chamada do console.
    pub fn handle(&mut self, request: Request) -> Response {
        match request {
            Request::FetchTelemetry => {
                if self.acquiring {
                    Response::Telemetry(Some(self.meter.read()))
                } else {
                    Response::Telemetry(None)
                }
            }
            Request::ListChannels => Response::Channels(self.channels.clone()),
            Request::StartAcquisition => {
                if self.settings.port.trim().is_empty() {
                    warn!("Aquisição recusada: nenhuma porta configurada");
                    return Response::Started(false);
                }
                self.acquiring = true;
                info!(
                    "Aquisição iniciada: {} {} baud, escravo 0x{:02X}",
                    self.settings.port, self.settings.baud_rate, self.settings.slave_address
                );
                Response::Started(true)
            }
            Request::StopAcquisition => {
                if self.acquiring {
                    info!("Aquisição parada ({:.3} kWh acumulados)", self.meter.energy());
                }
                self.acquiring = false;
                Response::Ack
            }
            Request::UpdateSettings(settings) => {
                if !self.channels.is_empty()
                    && !settings.port.is_empty()
                    && !self.channels.contains(&settings.port)
                {
                    warn!("Porta desconhecida: {}", settings.port);
                    return Response::Updated(false);
                }
                debug!("Configuração recebida: {settings:?}");
                self.settings = settings;
                Response::Updated(true)
            }
            Request::SaveSnapshot(settings) => match self.snapshot.save(&settings) {
                Ok(()) => Response::Ack,
                Err(e) => Response::Failed(e.to_string()),
            },
            Request::LoadSnapshot => match self.snapshot.load() {
                Ok(text) => Response::Snapshot(text.map(SnapshotPayload::Text)),
                Err(e) => Response::Failed(e.to_string()),
            },
            Request::ClearSnapshot => match self.snapshot.clear() {
                Ok(()) => Response::Ack,
                Err(e) => Response::Failed(e.to_string()),
            },
        }
    }
}
