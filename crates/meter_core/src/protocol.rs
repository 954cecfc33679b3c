//! Protocolo de comunicação binário entre console e host.
//!
//! Cada chamada do binding remoto vira um datagrama UDP com um
//! [`Request`]; o host responde com um [`Response`] carregando o mesmo id.
//! Formato do frame:
//!
//! ```text
//! ┌──────────┬─────────┬───────────────────────────┐
//! │ Magic(1) │ Ver.(1) │ bincode (id: u32, corpo)  │
//! └──────────┴─────────┴───────────────────────────┘
//! ```

use crate::snapshot::SnapshotPayload;
use crate::types::{RawTelemetry, SerialSettings};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Magic byte que identifica pacotes do console do medidor.
pub const MAGIC_BYTE: u8 = 0x4D; // 'M'

/// Versão atual do protocolo.
pub const PROTOCOL_VERSION: u8 = 1;

/// Tamanho do header (magic + version).
const HEADER_SIZE: usize = 2;

/// Tamanho máximo de pacote UDP seguro (sem fragmentação).
pub const MAX_UDP_PAYLOAD: usize = 65507;

/// Erros do protocolo.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Pacote muito curto ({0} bytes, mínimo {HEADER_SIZE})")]
    TooShort(usize),

    #[error("Magic byte inválido: 0x{0:02X} (esperado 0x{MAGIC_BYTE:02X})")]
    InvalidMagic(u8),

    #[error("Versão incompatível: {0} (suportada: {PROTOCOL_VERSION})")]
    VersionMismatch(u8),

    #[error("Erro de serialização: {0}")]
    Serialize(String),

    #[error("Erro de deserialização: {0}")]
    Deserialize(String),
}

/// Funções expostas pelo host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Request {
    FetchTelemetry,
    ListChannels,
    StartAcquisition,
    StopAcquisition,
    UpdateSettings(SerialSettings),
    SaveSnapshot(SerialSettings),
    LoadSnapshot,
    ClearSnapshot,
}

impl Request {
    pub fn name(&self) -> &'static str {
        match self {
            Request::FetchTelemetry => "fetch_telemetry",
            Request::ListChannels => "list_channels",
            Request::StartAcquisition => "start_acquisition",
            Request::StopAcquisition => "stop_acquisition",
            Request::UpdateSettings(_) => "update_settings",
            Request::SaveSnapshot(_) => "save_snapshot",
            Request::LoadSnapshot => "load_snapshot",
            Request::ClearSnapshot => "clear_snapshot",
        }
    }
}

/// Respostas do host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Response {
    Telemetry(Option<RawTelemetry>),
    Channels(Vec<String>),
    Started(bool),
    Updated(bool),
    Snapshot(Option<SnapshotPayload>),
    Ack,
    /// O host não conseguiu executar a chamada.
    Failed(String),
}

fn encode_frame<T: Serialize>(id: u32, body: &T) -> Result<Vec<u8>, ProtocolError> {
    let body = bincode::serialize(&(id, body)).map_err(|e| ProtocolError::Serialize(e.to_string()))?;

    let mut frame = Vec::with_capacity(HEADER_SIZE + body.len());
    frame.push(MAGIC_BYTE);
    frame.push(PROTOCOL_VERSION);
    frame.extend_from_slice(&body);

    Ok(frame)
}

fn decode_frame<T: DeserializeOwned>(data: &[u8]) -> Result<(u32, T), ProtocolError> {
    if data.len() < HEADER_SIZE {
        return Err(ProtocolError::TooShort(data.len()));
    }

    let magic = data[0];
    if magic != MAGIC_BYTE {
        return Err(ProtocolError::InvalidMagic(magic));
    }

    let version = data[1];
    if version != PROTOCOL_VERSION {
        return Err(ProtocolError::VersionMismatch(version));
    }

    bincode::deserialize(&data[HEADER_SIZE..]).map_err(|e| ProtocolError::Deserialize(e.to_string()))
}

/// Codifica uma chamada: `[MAGIC][VERSION][id, request]`.
pub fn encode_request(id: u32, request: &Request) -> Result<Vec<u8>, ProtocolError> {
    encode_frame(id, request)
}

/// Decodifica uma chamada recebida pelo host.
pub fn decode_request(data: &[u8]) -> Result<(u32, Request), ProtocolError> {
    decode_frame(data)
}

/// Codifica a resposta para a chamada `id`.
pub fn encode_response(id: u32, response: &Response) -> Result<Vec<u8>, ProtocolError> {
    encode_frame(id, response)
}

/// Decodifica uma resposta recebida pelo console.
pub fn decode_response(data: &[u8]) -> Result<(u32, Response), ProtocolError> {
    decode_frame(data)
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
