//! Liga/desliga a aquisição serial no host e reflete o resultado no
//! [`TelemetryStore`].

use crate::binding::{BindingError, RemoteBinding};
use crate::store::TelemetryStore;
use crate::types::{SerialSettings, StatusUpdate};
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum AcquisitionError {
    #[error("Nenhuma porta selecionada")]
    NoPortSelected,

    #[error("Host não conseguiu iniciar a aquisição")]
    StartRejected,

    #[error(transparent)]
    Remote(#[from] BindingError),
}

/// Marca o dispositivo como conectado e pede ao host para iniciar. Se o
/// host recusar ou falhar, volta para desconectado com a mensagem de erro.
pub async fn start_acquisition(
    store: &TelemetryStore,
    binding: &dyn RemoteBinding,
    settings: &SerialSettings,
) -> Result<(), AcquisitionError> {
    if settings.port.trim().is_empty() {
        warn!("Aquisição não iniciada: nenhuma porta selecionada");
        return Err(AcquisitionError::NoPortSelected);
    }

    store.update_status(StatusUpdate::connected(true).clear_error());

    match binding.start_acquisition().await {
        Ok(true) => {
            info!("Aquisição iniciada em {}", settings.port);
            Ok(())
        }
        Ok(false) => {
            warn!("Host recusou iniciar a aquisição em {}", settings.port);
            store.update_status(StatusUpdate::connected(false).with_error("falha ao iniciar"));
            Err(AcquisitionError::StartRejected)
        }
        Err(e) => {
            warn!("Erro ao iniciar aquisição: {e}");
            store.update_status(StatusUpdate::connected(false).with_error(e.to_string()));
            Err(AcquisitionError::Remote(e))
        }
    }
}

/// Desconecta localmente na hora; o pedido ao host é best-effort.
pub async fn stop_acquisition(store: &TelemetryStore, binding: &dyn RemoteBinding) {
    store.update_status(StatusUpdate::connected(false).clear_error());
    match binding.stop_acquisition().await {
        Ok(()) => info!("Aquisição parada"),
        Err(e) => warn!("Falha ao parar aquisição no host (ignorada): {e}"),
    }
}

/// Portas disponíveis no host; lista vazia em caso de falha.
pub async fn list_channels(binding: &dyn RemoteBinding) -> Vec<String> {
    match binding.list_channels().await {
        Ok(channels) => channels,
        Err(e) => {
            warn!("Não foi possível listar as portas: {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poller::poll_once;
    use crate::testing::{FakeBinding, Scripted, live_reading};
    use crate::types::DEFAULT_PROTOCOL;

    fn com3() -> SerialSettings {
        SerialSettings {
            port: "COM3".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn start_without_port_changes_nothing() {
        let store = TelemetryStore::new(DEFAULT_PROTOCOL);
        let binding = FakeBinding::new();

        let err = start_acquisition(&store, &binding, &SerialSettings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AcquisitionError::NoPortSelected));
        assert!(!store.get_status().connected);
        assert!(binding.calls().is_empty());
    }

    #[tokio::test]
    async fn start_connects_and_clears_error() {
        let store = TelemetryStore::new(DEFAULT_PROTOCOL);
        store.update_status(StatusUpdate::default().with_error("antigo"));
        let binding = FakeBinding::new();

        start_acquisition(&store, &binding, &com3()).await.unwrap();
        let status = store.get_status();
        assert!(status.connected);
        assert_eq!(status.error_message, None);
        assert_eq!(binding.calls(), vec!["start_acquisition"]);
    }

    #[tokio::test]
    async fn rejected_start_reports_error() {
        let store = TelemetryStore::new(DEFAULT_PROTOCOL);
        let binding = FakeBinding::new();
        binding.set_start_result(Some(false));

        let err = start_acquisition(&store, &binding, &com3()).await.unwrap_err();
        assert!(matches!(err, AcquisitionError::StartRejected));
        let status = store.get_status();
        assert!(!status.connected);
        assert_eq!(status.error_message.as_deref(), Some("falha ao iniciar"));
    }

    #[tokio::test]
    async fn transport_failure_on_start_disconnects() {
        let store = TelemetryStore::new(DEFAULT_PROTOCOL);
        let binding = FakeBinding::new();
        binding.set_start_result(None);

        let err = start_acquisition(&store, &binding, &com3()).await.unwrap_err();
        assert!(matches!(err, AcquisitionError::Remote(_)));
        assert!(!store.get_status().connected);
        assert!(store.get_status().error_message.is_some());
    }

    #[tokio::test]
    async fn stop_drops_sample_immediately() {
        let store = TelemetryStore::new(DEFAULT_PROTOCOL);
        let binding = FakeBinding::new();
        binding.script([Scripted::Reading(live_reading(221.0))]);
        start_acquisition(&store, &binding, &com3()).await.unwrap();
        poll_once(&store, &binding).await;
        assert!(store.get_sample().is_some());

        stop_acquisition(&store, &binding).await;
        assert!(!store.get_status().connected);
        assert!(store.get_sample().is_none());
        assert_eq!(binding.calls().last(), Some(&"stop_acquisition"));
    }

    #[tokio::test]
    async fn channel_listing_failure_is_empty() {
        let binding = FakeBinding::new();
        binding.set_channels(&["COM1", "COM3"]);
        assert_eq!(list_channels(&binding).await, vec!["COM1", "COM3"]);

        binding.set_persistence_down(true);
        assert!(list_channels(&binding).await.is_empty());
    }
}
