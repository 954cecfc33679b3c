//! Snapshot de configuração salvo para a próxima inicialização.
//!
//! O host pode devolver o snapshot como registro tipado ou como texto JSON
//! no formato dele (`slaveID`, paridade e stop bits como códigos
//! numéricos). O decoder aceita as duas grafias.

use crate::types::{Parity, SerialSettings};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Resultado de "carregar snapshot" no binding remoto.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum SnapshotPayload {
    Record(SerialSettings),
    Text(String),
}

impl SnapshotPayload {
    /// Texto vazio conta como "nenhum snapshot".
    pub fn is_empty(&self) -> bool {
        matches!(self, SnapshotPayload::Text(text) if text.trim().is_empty())
    }

    /// Converte para [`SerialSettings`]; `None` se vazio ou ilegível.
    pub fn decode(&self) -> Option<SerialSettings> {
        match self {
            SnapshotPayload::Record(settings) => Some(settings.clone()),
            SnapshotPayload::Text(text) => decode_snapshot_text(text),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ParityRepr {
    Name(String),
    Code(u8),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LenientSnapshot {
    port: Option<String>,
    baud_rate: Option<u32>,
    data_bits: Option<u8>,
    stop_bits: Option<u8>,
    parity: Option<ParityRepr>,
    #[serde(alias = "slaveID", alias = "slaveId")]
    slave_address: Option<i64>,
}

impl LenientSnapshot {
    fn into_settings(self) -> SerialSettings {
        let defaults = SerialSettings::default();
        let parity = match self.parity {
            Some(ParityRepr::Name(name)) => name.parse().unwrap_or(defaults.parity),
            Some(ParityRepr::Code(code)) => Parity::from_code(code).unwrap_or(defaults.parity),
            None => defaults.parity,
        };
        // Host grava 0 = um stop bit, 2 = dois
        let stop_bits = match self.stop_bits {
            Some(2) => 2,
            Some(0 | 1) | None => 1,
            Some(_) => defaults.stop_bits,
        };
        SerialSettings {
            port: self.port.unwrap_or_default(),
            baud_rate: self.baud_rate.filter(|b| *b > 0).unwrap_or(defaults.baud_rate),
            data_bits: self.data_bits.filter(|d| *d > 0).unwrap_or(defaults.data_bits),
            stop_bits,
            parity,
            slave_address: self
                .slave_address
                .and_then(|v| u8::try_from(v).ok())
                .unwrap_or(0),
        }
    }
}

/// Decodifica o texto JSON de um snapshot. Texto vazio ou inválido → `None`.
pub fn decode_snapshot_text(text: &str) -> Option<SerialSettings> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str::<LenientSnapshot>(text) {
        Ok(snapshot) => Some(snapshot.into_settings()),
        Err(e) => {
            debug!("Snapshot ilegível ignorado: {e}");
            None
        }
    }
}
