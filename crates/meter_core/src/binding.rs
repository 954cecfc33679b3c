//! Binding remoto – as funções que o host expõe ao console.
//!
//! O núcleo só conhece o trait [`RemoteBinding`]; [`UdpBinding`] é a
//! implementação que fala com o `meter_host` via frames do
//! [`protocol`](crate::protocol).

use crate::protocol::{
    MAX_UDP_PAYLOAD, ProtocolError, Request, Response, decode_response, encode_request,
};
use crate::snapshot::SnapshotPayload;
use crate::types::{RawTelemetry, SerialSettings};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::debug;

/// Erros de uma chamada remota.
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    #[error("Host não respondeu em {0} ms")]
    Timeout(u64),

    #[error("Erro de I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("Host falhou em {call}: {message}")]
    Remote { call: &'static str, message: String },

    #[error("Resposta inesperada para {0}")]
    UnexpectedResponse(&'static str),
}

/// Superfície assíncrona do host. Qualquer chamada pode falhar ou voltar
/// vazia.
#[async_trait]
pub trait RemoteBinding: Send + Sync {
    async fn fetch_telemetry(&self) -> Result<Option<RawTelemetry>, BindingError>;

    async fn list_channels(&self) -> Result<Vec<String>, BindingError>;

    async fn start_acquisition(&self) -> Result<bool, BindingError>;

    async fn stop_acquisition(&self) -> Result<(), BindingError>;

    /// Envia os seis campos de uma vez.
    async fn update_settings(&self, settings: &SerialSettings) -> Result<bool, BindingError>;

    async fn save_snapshot(&self, settings: &SerialSettings) -> Result<(), BindingError>;

    async fn load_snapshot(&self) -> Result<Option<SnapshotPayload>, BindingError>;

    async fn clear_snapshot(&self) -> Result<(), BindingError>;
}

/// Binding via UDP: um socket efêmero por chamada, resposta casada pelo id.
pub struct UdpBinding {
    host: SocketAddr,
    timeout: Duration,
    next_id: AtomicU32,
}

impl UdpBinding {
    pub fn new(host: SocketAddr, timeout: Duration) -> Self {
        Self {
            host,
            timeout,
            next_id: AtomicU32::new(1),
        }
    }

    async fn call(&self, request: Request) -> Result<Response, BindingError> {
        let call = request.name();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let frame = encode_request(id, &request)?;

        let local = if self.host.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let sock = UdpSocket::bind(local).await?;
        sock.connect(self.host).await?;
        sock.send(&frame).await?;

        let mut buf = vec![0u8; MAX_UDP_PAYLOAD];
        let exchange = async {
            loop {
                let size = sock.recv(&mut buf).await?;
                match decode_response(&buf[..size]) {
                    Ok((resp_id, response)) if resp_id == id => {
                        return Ok::<Response, std::io::Error>(response);
                    }
                    Ok((resp_id, _)) => debug!("Resposta {resp_id} descartada (esperado {id})"),
                    Err(e) => debug!("Pacote inválido do host: {e}"),
                }
            }
        };

        let response = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| BindingError::Timeout(self.timeout.as_millis() as u64))?
            .map_err(BindingError::Io)?;

        match response {
            Response::Failed(message) => Err(BindingError::Remote { call, message }),
            other => Ok(other),
        }
    }
}

#[async_trait]
impl RemoteBinding for UdpBinding {
    async fn fetch_telemetry(&self) -> Result<Option<RawTelemetry>, BindingError> {
        match self.call(Request::FetchTelemetry).await? {
            Response::Telemetry(raw) => Ok(raw),
            _ => Err(BindingError::UnexpectedResponse("fetch_telemetry")),
        }
    }

    async fn list_channels(&self) -> Result<Vec<String>, BindingError> {
        match self.call(Request::ListChannels).await? {
            Response::Channels(channels) => Ok(channels),
            _ => Err(BindingError::UnexpectedResponse("list_channels")),
        }
    }

    async fn start_acquisition(&self) -> Result<bool, BindingError> {
        match self.call(Request::StartAcquisition).await? {
            Response::Started(ok) => Ok(ok),
            _ => Err(BindingError::UnexpectedResponse("start_acquisition")),
        }
    }

    async fn stop_acquisition(&self) -> Result<(), BindingError> {
        match self.call(Request::StopAcquisition).await? {
            Response::Ack => Ok(()),
            _ => Err(BindingError::UnexpectedResponse("stop_acquisition")),
        }
    }

    async fn update_settings(&self, settings: &SerialSettings) -> Result<bool, BindingError> {
        match self.call(Request::UpdateSettings(settings.clone())).await? {
            Response::Updated(ok) => Ok(ok),
            _ => Err(BindingError::UnexpectedResponse("update_settings")),
        }
    }

    async fn save_snapshot(&self, settings: &SerialSettings) -> Result<(), BindingError> {
        match self.call(Request::SaveSnapshot(settings.clone())).await? {
            Response::Ack => Ok(()),
            _ => Err(BindingError::UnexpectedResponse("save_snapshot")),
        }
    }

    async fn load_snapshot(&self) -> Result<Option<SnapshotPayload>, BindingError> {
        match self.call(Request::LoadSnapshot).await? {
            Response::Snapshot(payload) => Ok(payload),
            _ => Err(BindingError::UnexpectedResponse("load_snapshot")),
        }
    }

    async fn clear_snapshot(&self) -> Result<(), BindingError> {
        match self.call(Request::ClearSnapshot).await? {
            Response::Ack => Ok(()),
            _ => Err(BindingError::UnexpectedResponse("clear_snapshot")),
        }
    }
}
