//! Definição de tipos/structs do console do medidor.
//!
//! Status do dispositivo, amostras de telemetria (bruta e formatada) e a
//! configuração serial que o operador edita e persiste.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rótulo de protocolo exibido enquanto nada for configurado.
pub const DEFAULT_PROTOCOL: &str = "Modbus RTU";

// ──────────────────────────────────────────────
// Status do dispositivo
// ──────────────────────────────────────────────

/// Estado de conexão com o dispositivo.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceStatus {
    /// Aquisição ativa
    pub connected: bool,
    /// Protocolo em uso (ex: "Modbus RTU")
    pub protocol: String,
    /// Última alteração do status
    pub last_update: DateTime<Utc>,
    /// Último erro reportado ao operador
    pub error_message: Option<String>,
}

impl DeviceStatus {
    pub fn new(protocol: impl Into<String>) -> Self {
        Self {
            connected: false,
            protocol: protocol.into(),
            last_update: Utc::now(),
            error_message: None,
        }
    }

    /// Aplica uma atualização parcial e carimba `last_update`.
    pub(crate) fn merge(&mut self, update: StatusUpdate, now: DateTime<Utc>) {
        if let Some(connected) = update.connected {
            self.connected = connected;
        }
        if let Some(protocol) = update.protocol {
            self.protocol = protocol;
        }
        if let Some(error_message) = update.error_message {
            self.error_message = error_message;
        }
        self.last_update = now;
    }
}

impl Default for DeviceStatus {
    fn default() -> Self {
        Self::new(DEFAULT_PROTOCOL)
    }
}

/// Atualização parcial de [`DeviceStatus`]. Campos `None` ficam intactos.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusUpdate {
    pub connected: Option<bool>,
    pub protocol: Option<String>,
    /// `Some(None)` limpa a mensagem de erro.
    pub error_message: Option<Option<String>>,
}

impl StatusUpdate {
    pub fn connected(connected: bool) -> Self {
        Self {
            connected: Some(connected),
            ..Default::default()
        }
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(Some(message.into()));
        self
    }

    pub fn clear_error(mut self) -> Self {
        self.error_message = Some(None);
        self
    }
}

// ──────────────────────────────────────────────
// Telemetria
// ──────────────────────────────────────────────

/// Leitura como devolvida pelo binding remoto. Qualquer campo pode faltar.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTelemetry {
    pub voltage: Option<f64>,
    pub current: Option<f64>,
    pub active_power: Option<f64>,
    pub reactive_power: Option<f64>,
    pub apparent_power: Option<f64>,
    pub power_factor: Option<f64>,
    pub frequency: Option<f64>,
    pub active_energy: Option<f64>,
    pub timestamp: Option<String>,
}

/// Amostra validada e arredondada, pronta para exibição.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySample {
    /// Tensão (V)
    pub voltage: f64,
    /// Corrente (A)
    pub current: f64,
    /// Potência ativa (kW)
    pub active_power: f64,
    /// Potência reativa (kvar)
    pub reactive_power: f64,
    /// Potência aparente (kVA)
    pub apparent_power: f64,
    pub power_factor: f64,
    /// Frequência (Hz)
    pub frequency: f64,
    /// Energia ativa acumulada (kWh)
    pub active_energy: f64,
    /// RFC 3339
    pub timestamp: String,
}

// ──────────────────────────────────────────────
// Configuração serial
// ──────────────────────────────────────────────

/// Paridade da porta serial.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parity {
    #[default]
    None,
    Even,
    Odd,
}

impl Parity {
    pub const ALL: [Parity; 3] = [Parity::None, Parity::Even, Parity::Odd];

    /// Código numérico usado pelo host (0 = None, 1 = Odd, 2 = Even).
    pub fn code(self) -> u8 {
        match self {
            Parity::None => 0,
            Parity::Odd => 1,
            Parity::Even => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Parity::None),
            1 => Some(Parity::Odd),
            2 => Some(Parity::Even),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Parity::None => "None",
            Parity::Even => "Even",
            Parity::Odd => "Odd",
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Parity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parity::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("paridade desconhecida: {s}"))
    }
}

/// Configuração da porta serial enviada ao host.
///
/// O `Default` é o registro de referência gravado em `current-settings`
/// quando o operador desativa o salvamento: sem porta e endereço 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SerialSettings {
    pub port: String,
    pub baud_rate: u32,
    pub data_bits: u8,
    pub stop_bits: u8,
    pub parity: Parity,
    /// Endereço Modbus do escravo (1–255, 0 = não configurado)
    pub slave_address: u8,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: 9600,
            data_bits: 8,
            stop_bits: 1,
            parity: Parity::None,
            slave_address: 0,
        }
    }
}

impl SerialSettings {
    /// Há algo que valha persistir: porta escolhida ou endereço > 0.
    pub fn is_meaningful(&self) -> bool {
        !self.port.trim().is_empty() || self.slave_address > 0
    }
}

/// Alteração de um único campo de [`SerialSettings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsField {
    Port(String),
    BaudRate(u32),
    DataBits(u8),
    StopBits(u8),
    Parity(Parity),
    SlaveAddress(u8),
}

impl SettingsField {
    pub fn name(&self) -> &'static str {
        match self {
            SettingsField::Port(_) => "port",
            SettingsField::BaudRate(_) => "baudRate",
            SettingsField::DataBits(_) => "dataBits",
            SettingsField::StopBits(_) => "stopBits",
            SettingsField::Parity(_) => "parity",
            SettingsField::SlaveAddress(_) => "slaveAddress",
        }
    }

    pub fn apply(&self, settings: &mut SerialSettings) {
        match self {
            SettingsField::Port(port) => settings.port = port.clone(),
            SettingsField::BaudRate(v) => settings.baud_rate = *v,
            SettingsField::DataBits(v) => settings.data_bits = *v,
            SettingsField::StopBits(v) => settings.stop_bits = *v,
            SettingsField::Parity(p) => settings.parity = *p,
            SettingsField::SlaveAddress(v) => settings.slave_address = *v,
        }
    }
}

impl fmt::Display for SettingsField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsField::Port(port) => write!(f, "port = {port}"),
            SettingsField::BaudRate(v) => write!(f, "baudRate = {v}"),
            SettingsField::DataBits(v) => write!(f, "dataBits = {v}"),
            SettingsField::StopBits(v) => write!(f, "stopBits = {v}"),
            SettingsField::Parity(p) => write!(f, "parity = {p}"),
            SettingsField::SlaveAddress(v) => write!(f, "slaveAddress = 0x{v:02X}"),
        }
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_not_meaningful() {
        let settings = SerialSettings::default();
        assert!(!settings.is_meaningful());
        assert_eq!(settings.baud_rate, 9600);
        assert_eq!(settings.parity, Parity::None);
    }

    #[test]
    fn port_or_slave_makes_settings_meaningful() {
        let with_port = SerialSettings {
            port: "COM3".into(),
            ..Default::default()
        };
        let with_slave = SerialSettings {
            slave_address: 12,
            ..Default::default()
        };
        let blank_port = SerialSettings {
            port: "   ".into(),
            ..Default::default()
        };
        assert!(with_port.is_meaningful());
        assert!(with_slave.is_meaningful());
        assert!(!blank_port.is_meaningful());
    }

    #[test]
    fn merge_keeps_untouched_fields_and_stamps_time() {
        let mut status = DeviceStatus::default();
        status.error_message = Some("falha".into());
        let before = status.last_update;

        let later = before + chrono::Duration::seconds(5);
        status.merge(StatusUpdate::connected(true), later);

        assert!(status.connected);
        assert_eq!(status.protocol, DEFAULT_PROTOCOL);
        assert_eq!(status.error_message.as_deref(), Some("falha"));
        assert_eq!(status.last_update, later);

        status.merge(StatusUpdate::default().clear_error(), later);
        assert!(status.error_message.is_none());
    }

    #[test]
    fn settings_json_uses_camel_case() {
        let settings = SerialSettings {
            port: "COM3".into(),
            slave_address: 12,
            ..Default::default()
        };
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["baudRate"], 9600);
        assert_eq!(json["slaveAddress"], 12);
        assert_eq!(json["parity"], "None");
    }

    #[test]
    fn parity_codes_follow_host_numbering() {
        assert_eq!(Parity::from_code(1), Some(Parity::Odd));
        assert_eq!(Parity::from_code(2), Some(Parity::Even));
        assert_eq!(Parity::Even.code(), 2);
        assert_eq!(Parity::from_code(7), None);
        assert_eq!("even".parse::<Parity>(), Ok(Parity::Even));
    }

    #[test]
    fn field_apply_changes_only_that_field() {
        let mut settings = SerialSettings::default();
        SettingsField::SlaveAddress(12).apply(&mut settings);
        assert_eq!(settings.slave_address, 12);
        assert_eq!(settings.port, "");
        assert_eq!(SettingsField::SlaveAddress(12).to_string(), "slaveAddress = 0x0C");
    }
}
