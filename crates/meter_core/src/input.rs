//! Validação da entrada do operador.
//!
//! Converte texto digitado em [`SettingsField`] e implementa o campo de
//! endereço do escravo (hexadecimal, confirmado ao sair do campo).

use crate::types::{Parity, SettingsField};

/// Velocidades oferecidas ao operador.
pub const BAUD_RATES: [u32; 5] = [4800, 9600, 19200, 38400, 115200];
pub const DATA_BITS: [u8; 2] = [7, 8];
pub const STOP_BITS: [u8; 2] = [1, 2];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Campo vazio")]
    Empty,

    #[error("Endereço inválido: {0:?} (use hexadecimal entre 01 e FF)")]
    InvalidSlaveAddress(String),

    #[error("Valor não permitido para {field}: {value:?}")]
    NotAllowed { field: &'static str, value: String },

    #[error("Campo desconhecido: {0:?}")]
    UnknownField(String),
}

/// Endereço hexadecimal (prefixo `0x` opcional) entre 1 e 255.
pub fn parse_slave_address(text: &str) -> Result<u8, InputError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(InputError::Empty);
    }
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    match u32::from_str_radix(digits, 16) {
        Ok(value @ 1..=255) => Ok(value as u8),
        _ => Err(InputError::InvalidSlaveAddress(trimmed.to_string())),
    }
}

/// `0` (sem endereço) vira campo vazio.
pub fn format_slave_address(address: u8) -> String {
    if address == 0 {
        String::new()
    } else {
        format!("{address:02X}")
    }
}

fn not_allowed(field: &'static str, value: &str) -> InputError {
    InputError::NotAllowed {
        field,
        value: value.trim().to_string(),
    }
}

pub fn parse_baud_rate(text: &str) -> Result<u32, InputError> {
    text.trim()
        .parse::<u32>()
        .ok()
        .filter(|rate| BAUD_RATES.contains(rate))
        .ok_or_else(|| not_allowed("baudRate", text))
}

pub fn parse_data_bits(text: &str) -> Result<u8, InputError> {
    text.trim()
        .parse::<u8>()
        .ok()
        .filter(|bits| DATA_BITS.contains(bits))
        .ok_or_else(|| not_allowed("dataBits", text))
}

pub fn parse_stop_bits(text: &str) -> Result<u8, InputError> {
    text.trim()
        .parse::<u8>()
        .ok()
        .filter(|bits| STOP_BITS.contains(bits))
        .ok_or_else(|| not_allowed("stopBits", text))
}

pub fn parse_parity(text: &str) -> Result<Parity, InputError> {
    text.parse::<Parity>().map_err(|_| not_allowed("parity", text))
}

/// Monta o campo a partir do nome (camelCase ou snake_case) e do texto.
pub fn parse_field(name: &str, value: &str) -> Result<SettingsField, InputError> {
    match name.trim().to_ascii_lowercase().replace('_', "").as_str() {
        "port" => {
            let port = value.trim();
            if port.is_empty() {
                return Err(InputError::Empty);
            }
            Ok(SettingsField::Port(port.to_string()))
        }
        "baudrate" | "baud" => parse_baud_rate(value).map(SettingsField::BaudRate),
        "databits" | "data" => parse_data_bits(value).map(SettingsField::DataBits),
        "stopbits" | "stop" => parse_stop_bits(value).map(SettingsField::StopBits),
        "parity" => parse_parity(value).map(SettingsField::Parity),
        "slaveaddress" | "slave" => parse_slave_address(value).map(SettingsField::SlaveAddress),
        _ => Err(InputError::UnknownField(name.to_string())),
    }
}

// ──────────────────────────────────────────────
// Campo do endereço do escravo
// ──────────────────────────────────────────────

/// Resultado de sair do campo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlurOutcome {
    /// Texto vazio ou igual ao último aceito.
    Unchanged,
    Committed(u8),
    /// Texto inválido; o campo volta ao último valor aceito.
    Rejected { error: InputError, reverted_to: String },
}

/// Estado de edição do endereço: o texto digitado e o último valor aceito.
#[derive(Debug, Clone)]
pub struct SlaveAddressInput {
    text: String,
    accepted_text: String,
    accepted: u8,
}

impl SlaveAddressInput {
    pub fn new(address: u8) -> Self {
        let text = format_slave_address(address);
        Self {
            accepted_text: text.clone(),
            text,
            accepted: address,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn accepted(&self) -> u8 {
        self.accepted
    }

    /// Atualiza o texto (em maiúsculas). Campo vazio gera aviso, mas não é
    /// erro definitivo.
    pub fn edit(&mut self, text: &str) -> Result<(), InputError> {
        self.text = text.to_uppercase();
        if self.text.trim().is_empty() {
            Err(InputError::Empty)
        } else {
            Ok(())
        }
    }

    pub fn blur(&mut self) -> BlurOutcome {
        let text = self.text.trim().to_string();
        if text.is_empty() || text == self.accepted_text {
            return BlurOutcome::Unchanged;
        }
        match parse_slave_address(&text) {
            Ok(address) => {
                self.accepted = address;
                self.accepted_text = text.clone();
                self.text = text;
                BlurOutcome::Committed(address)
            }
            Err(error) => {
                self.text = self.accepted_text.clone();
                BlurOutcome::Rejected {
                    error,
                    reverted_to: self.accepted_text.clone(),
                }
            }
        }
    }

    /// Sincroniza com um valor vindo de fora (ex.: restauração).
    pub fn reset_to(&mut self, address: u8) {
        *self = Self::new(address);
    }
}
