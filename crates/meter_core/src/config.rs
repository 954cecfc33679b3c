//! Configuração unificada via TOML.
//!
//! Um único `config.toml` ao lado do executável serve ao host e ao console.

use crate::types::DEFAULT_PROTOCOL;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Configuração do host (servidor do binding remoto).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// IP local para bind
    pub bind_addr: String,
    /// Porta UDP
    pub port: u16,
    /// Portas seriais anunciadas ao console
    pub channels: Vec<String>,
    /// Arquivo JSON do snapshot salvo
    pub snapshot_path: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".into(),
            port: 5015,
            channels: vec!["COM1".into(), "COM2".into(), "COM3".into()],
            snapshot_path: "saved-settings.json".into(),
        }
    }
}

/// Configuração do console do operador.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Endereço do host (ip:porta)
    pub host_addr: String,
    /// Intervalo do polling de telemetria (ms)
    pub poll_interval_ms: u64,
    /// Timeout de cada chamada ao host (ms)
    pub request_timeout_ms: u64,
    /// Diretório dos slots locais (vazio = ao lado do executável)
    pub data_dir: String,
    /// Protocolo exibido no status
    pub protocol_label: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            host_addr: "127.0.0.1:5015".into(),
            poll_interval_ms: 1000,
            request_timeout_ms: 800,
            data_dir: String::new(),
            protocol_label: DEFAULT_PROTOCOL.into(),
        }
    }
}

impl ConsoleConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Diretório dos slots; relativo ao executável quando vazio.
    pub fn data_dir(&self) -> PathBuf {
        if self.data_dir.trim().is_empty() {
            exe_dir().join("data")
        } else {
            PathBuf::from(&self.data_dir)
        }
    }
}

/// Configuração raiz do aplicativo (host e console).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub host: HostConfig,
    pub console: ConsoleConfig,
}

fn exe_dir() -> PathBuf {
    std::env::current_exe()
        .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
        .unwrap_or_else(|_| PathBuf::from("."))
}

impl AppConfig {
    /// Carrega configuração de um arquivo TOML.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str::<AppConfig>(&content) {
                    Ok(config) => {
                        info!("Configuração carregada de {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Erro ao parsear {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Erro ao ler {}: {}", path.display(), e);
                }
            }
        }

        info!("Usando configuração padrão");
        AppConfig::default()
    }

    /// Salva configuração em arquivo TOML.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = toml::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, content).map_err(|e| e.to_string())?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Carrega e, se o arquivo não existir, grava os padrões para edição.
    pub fn load_or_init(path: &Path) -> Self {
        let config = Self::load(path);
        if !path.exists() {
            if let Err(e) = config.save(path) {
                warn!("Não foi possível criar {}: {}", path.display(), e);
            }
        }
        config
    }

    /// Retorna o caminho padrão do config.toml.
    pub fn default_path() -> PathBuf {
        exe_dir().join("config.toml")
    }

    /// Endereço de bind do host.
    pub fn host_socket(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host.bind_addr, self.host.port)
            .parse()
            .map_err(|e| format!("Endereço do host inválido: {e}"))
    }

    /// Endereço do host visto pelo console.
    pub fn console_target(&self) -> Result<SocketAddr, String> {
        self.console
            .host_addr
            .parse()
            .map_err(|e| format!("host_addr inválido ({}): {e}", self.console.host_addr))
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.host.port == 0 {
            errors.push("Porta do host não pode ser 0".into());
        }
        if let Err(e) = self.host_socket() {
            errors.push(e);
        }
        if let Err(e) = self.console_target() {
            errors.push(e);
        }
        if self.console.poll_interval_ms < 100 || self.console.poll_interval_ms > 60_000 {
            errors.push(format!(
                "Intervalo de polling inválido: {} ms (100–60000)",
                self.console.poll_interval_ms
            ));
        }
        if self.console.request_timeout_ms == 0 {
            errors.push("Timeout de requisição não pode ser 0".into());
        }

        errors
    }
}
