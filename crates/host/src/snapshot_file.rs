//! Snapshot salvo em disco, no formato JSON histórico do host: `slaveID`,
//! paridade como código (0 = None, 1 = Odd, 2 = Even) e stop bits como
//! código (0 = um, 2 = dois).

use meter_core::types::SerialSettings;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotFileError {
    #[error("Erro de I/O em {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Erro ao serializar snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSettings {
    port: String,
    baud_rate: u32,
    data_bits: u8,
    stop_bits: u8,
    parity: u8,
    #[serde(rename = "slaveID")]
    slave_id: u8,
}

impl From<&SerialSettings> for StoredSettings {
    fn from(settings: &SerialSettings) -> Self {
        Self {
            port: settings.port.clone(),
            baud_rate: settings.baud_rate,
            data_bits: settings.data_bits,
            stop_bits: if settings.stop_bits == 2 { 2 } else { 0 },
            parity: settings.parity.code(),
            slave_id: settings.slave_address,
        }
    }
}

pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, source: io::Error) -> SnapshotFileError {
        SnapshotFileError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    pub fn save(&self, settings: &SerialSettings) -> Result<(), SnapshotFileError> {
        let json = serde_json::to_string_pretty(&StoredSettings::from(settings))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        std::fs::write(&self.path, json).map_err(|e| self.io_error(e))?;
        info!("Snapshot salvo em {}", self.path.display());
        Ok(())
    }

    /// Conteúdo bruto do arquivo; `None` se não existir ou estiver vazio.
    pub fn load(&self) -> Result<Option<String>, SnapshotFileError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(None),
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    pub fn clear(&self) -> Result<(), SnapshotFileError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Snapshot removido");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}
