//! Controle de persistência da configuração serial.
//!
//! Mantém a configuração "viva" sincronizada com o host e gerencia o
//! snapshot salvo pelo operador em duas camadas: o host (autoritativo) e o
//! armazenamento local (fallback). O salvamento é uma máquina de estados
//! [`SaveState`]; a restauração é em duas etapas (proposta → confirmação).

use crate::binding::{BindingError, RemoteBinding};
use crate::local_store::{CURRENT_SETTINGS_KEY, LocalStore, SAVED_SETTINGS_KEY, StoreError};
use crate::signal::{SettingsRestored, SignalBus};
use crate::snapshot::{SnapshotPayload, decode_snapshot_text};
use crate::types::{Parity, SerialSettings, SettingsField};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Erros (e avisos) do controle de configuração.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Host recusou a atualização de {0}")]
    UpdateRejected(&'static str),

    #[error("Falha ao enviar configuração: {0}")]
    Remote(#[from] BindingError),

    #[error("Nenhuma configuração para salvar: selecione a porta e o endereço do escravo primeiro")]
    NothingToSave,

    #[error("Nenhuma configuração salva encontrada")]
    NoSavedSettings,

    #[error("A configuração salva não contém porta nem endereço válido; restauração cancelada")]
    NothingToRestore,

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("Erro ao serializar configuração: {0}")]
    Encode(#[from] serde_json::Error),
}

impl SettingsError {
    /// Avisos ao operador (nada foi gravado), não falhas.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            SettingsError::NothingToSave | SettingsError::NoSavedSettings | SettingsError::NothingToRestore
        )
    }
}

/// Estado do salvamento do snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    Disabled,
    /// Snapshot gravado no host e no slot local.
    EnabledSynced,
    /// Host indisponível; só o slot local tem o snapshot.
    EnabledLocalOnly,
}

/// De onde veio o snapshot proposto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreSource {
    Remote,
    Local,
}

/// Restauração aguardando confirmação do operador. Descartar a proposta
/// cancela sem gravar nada.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoreProposal {
    payload: SnapshotPayload,
    source: RestoreSource,
}

impl RestoreProposal {
    pub fn source(&self) -> RestoreSource {
        self.source
    }

    /// O que seria aplicado, se o snapshot for legível.
    pub fn preview(&self) -> Option<SerialSettings> {
        self.payload.decode()
    }
}

pub struct SettingsController {
    binding: Arc<dyn RemoteBinding>,
    store: Arc<dyn LocalStore>,
    restored: Arc<SignalBus<SettingsRestored>>,
    live: Mutex<SerialSettings>,
    save_state: Mutex<SaveState>,
}

fn guard<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SettingsController {
    /// A configuração viva parte do slot `current-settings`, ou do padrão.
    /// O estado de salvamento parte do slot local; use
    /// [`refresh_save_state`](Self::refresh_save_state) para consultar o host.
    pub fn new(
        binding: Arc<dyn RemoteBinding>,
        store: Arc<dyn LocalStore>,
        restored: Arc<SignalBus<SettingsRestored>>,
    ) -> Self {
        let live = match store.get(CURRENT_SETTINGS_KEY) {
            Ok(Some(text)) => decode_snapshot_text(&text).unwrap_or_default(),
            Ok(None) => SerialSettings::default(),
            Err(e) => {
                warn!("Não foi possível ler {CURRENT_SETTINGS_KEY}: {e}");
                SerialSettings::default()
            }
        };
        let save_state = match store.get(SAVED_SETTINGS_KEY) {
            Ok(Some(_)) => SaveState::EnabledLocalOnly,
            _ => SaveState::Disabled,
        };

        Self {
            binding,
            store,
            restored,
            live: Mutex::new(live),
            save_state: Mutex::new(save_state),
        }
    }

    /// Cópia da configuração viva.
    pub fn live_settings(&self) -> SerialSettings {
        guard(&self.live).clone()
    }

    pub fn save_state(&self) -> SaveState {
        *guard(&self.save_state)
    }

    /// Barramento onde as restaurações confirmadas são publicadas.
    pub fn restore_signal(&self) -> &Arc<SignalBus<SettingsRestored>> {
        &self.restored
    }

    fn set_save_state(&self, state: SaveState) {
        *guard(&self.save_state) = state;
    }

    fn write_current(&self, settings: &SerialSettings) -> Result<(), SettingsError> {
        let json = serde_json::to_string(settings)?;
        self.store.set(CURRENT_SETTINGS_KEY, &json)?;
        Ok(())
    }

    // ──────────────────────────────────────────
    // Edição de campos
    // ──────────────────────────────────────────

    /// Aplica o campo à configuração viva, grava o slot corrente e envia
    /// os seis campos ao host. Em caso de falha o valor local permanece.
    pub async fn update_field(&self, field: SettingsField) -> Result<(), SettingsError> {
        let settings = {
            let mut live = guard(&self.live);
            field.apply(&mut live);
            live.clone()
        };

        if let Err(e) = self.write_current(&settings) {
            warn!("Falha ao gravar {CURRENT_SETTINGS_KEY}: {e}");
        }

        match self.binding.update_settings(&settings).await {
            Ok(true) => {
                info!("Configuração atualizada: {field}");
                Ok(())
            }
            Ok(false) => {
                warn!("Host recusou {field}");
                Err(SettingsError::UpdateRejected(field.name()))
            }
            Err(e) => {
                warn!("Falha ao enviar {field}: {e}");
                Err(SettingsError::Remote(e))
            }
        }
    }

    pub async fn set_port(&self, port: impl Into<String>) -> Result<(), SettingsError> {
        self.update_field(SettingsField::Port(port.into())).await
    }

    pub async fn set_baud_rate(&self, baud_rate: u32) -> Result<(), SettingsError> {
        self.update_field(SettingsField::BaudRate(baud_rate)).await
    }

    pub async fn set_data_bits(&self, data_bits: u8) -> Result<(), SettingsError> {
        self.update_field(SettingsField::DataBits(data_bits)).await
    }

    pub async fn set_stop_bits(&self, stop_bits: u8) -> Result<(), SettingsError> {
        self.update_field(SettingsField::StopBits(stop_bits)).await
    }

    pub async fn set_parity(&self, parity: Parity) -> Result<(), SettingsError> {
        self.update_field(SettingsField::Parity(parity)).await
    }

    pub async fn set_slave_address(&self, slave_address: u8) -> Result<(), SettingsError> {
        self.update_field(SettingsField::SlaveAddress(slave_address)).await
    }

    /// Reenvia ao host a configuração viva carregada do slot corrente.
    /// O registro padrão não é enviado. Retorna `true` se houve envio.
    pub async fn sync_live(&self) -> Result<bool, SettingsError> {
        let settings = self.live_settings();
        if settings == SerialSettings::default() {
            return Ok(false);
        }
        match self.binding.update_settings(&settings).await {
            Ok(true) => {
                info!("Configuração inicial enviada ao host: porta {:?}", settings.port);
                Ok(true)
            }
            Ok(false) => {
                warn!("Host recusou a configuração inicial");
                Err(SettingsError::UpdateRejected("settings"))
            }
            Err(e) => {
                warn!("Falha ao enviar a configuração inicial: {e}");
                Err(SettingsError::Remote(e))
            }
        }
    }

    // ──────────────────────────────────────────
    // Salvamento
    // ──────────────────────────────────────────

    /// Estado inicial do interruptor: snapshot no host, senão slot local.
    pub async fn refresh_save_state(&self) -> SaveState {
        let remote = match self.binding.load_snapshot().await {
            Ok(Some(payload)) => !payload.is_empty(),
            Ok(None) => false,
            Err(e) => {
                debug!("Host sem snapshot disponível: {e}");
                false
            }
        };
        let state = if remote {
            SaveState::EnabledSynced
        } else {
            match self.store.get(SAVED_SETTINGS_KEY) {
                Ok(Some(_)) => SaveState::EnabledLocalOnly,
                Ok(None) => SaveState::Disabled,
                Err(e) => {
                    warn!("Não foi possível ler {SAVED_SETTINGS_KEY}: {e}");
                    SaveState::Disabled
                }
            }
        };
        self.set_save_state(state);
        state
    }

    /// Liga ou desliga o salvamento do snapshot.
    pub async fn toggle_save_enabled(&self, enabled: bool) -> Result<SaveState, SettingsError> {
        if enabled {
            self.enable_save().await
        } else {
            self.disable_save().await;
            Ok(SaveState::Disabled)
        }
    }

    /// O snapshot reflete o slot corrente no instante da leitura.
    fn current_for_save(&self) -> SerialSettings {
        match self.store.get(CURRENT_SETTINGS_KEY) {
            Ok(Some(text)) => decode_snapshot_text(&text).unwrap_or_default(),
            Ok(None) => self.live_settings(),
            Err(e) => {
                warn!("Não foi possível ler {CURRENT_SETTINGS_KEY}: {e}");
                self.live_settings()
            }
        }
    }

    async fn enable_save(&self) -> Result<SaveState, SettingsError> {
        let current = self.current_for_save();
        if !current.is_meaningful() {
            self.set_save_state(SaveState::Disabled);
            warn!("Salvamento recusado: configuração sem porta e sem endereço");
            return Err(SettingsError::NothingToSave);
        }
        let json = serde_json::to_string(&current)?;

        let synced = match self.binding.save_snapshot(&current).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Host indisponível para salvar o snapshot, usando só o slot local: {e}");
                false
            }
        };

        if let Err(e) = self.store.set(SAVED_SETTINGS_KEY, &json) {
            if !synced {
                self.set_save_state(SaveState::Disabled);
                return Err(SettingsError::Storage(e));
            }
            warn!("Falha ao gravar {SAVED_SETTINGS_KEY}: {e}");
        }

        let state = if synced {
            SaveState::EnabledSynced
        } else {
            SaveState::EnabledLocalOnly
        };
        self.set_save_state(state);
        info!("Snapshot salvo ({state:?}): porta {:?}, escravo {}", current.port, current.slave_address);
        Ok(state)
    }

    async fn disable_save(&self) {
        if let Err(e) = self.binding.clear_snapshot().await {
            debug!("Falha ao limpar snapshot no host (ignorada): {e}");
        }
        if let Err(e) = self.store.remove(SAVED_SETTINGS_KEY) {
            warn!("Falha ao remover {SAVED_SETTINGS_KEY}: {e}");
        }
        if let Err(e) = self.write_current(&SerialSettings::default()) {
            warn!("Falha ao redefinir {CURRENT_SETTINGS_KEY}: {e}");
        }
        self.set_save_state(SaveState::Disabled);
        info!("Salvamento da configuração desativado");
    }

    // ──────────────────────────────────────────
    // Restauração
    // ──────────────────────────────────────────

    /// Busca o snapshot (host primeiro, depois slot local) sem gravar nada.
    pub async fn propose_restore(&self) -> Result<RestoreProposal, SettingsError> {
        match self.binding.load_snapshot().await {
            Ok(Some(payload)) if !payload.is_empty() => {
                return Ok(RestoreProposal {
                    payload,
                    source: RestoreSource::Remote,
                });
            }
            Ok(_) => debug!("Host sem snapshot salvo"),
            Err(e) => debug!("Falha ao carregar snapshot do host: {e}"),
        }

        match self.store.get(SAVED_SETTINGS_KEY) {
            Ok(Some(text)) if !text.trim().is_empty() => Ok(RestoreProposal {
                payload: SnapshotPayload::Text(text),
                source: RestoreSource::Local,
            }),
            Ok(_) => Err(SettingsError::NoSavedSettings),
            Err(e) => {
                warn!("Não foi possível ler {SAVED_SETTINGS_KEY}: {e}");
                Err(SettingsError::NoSavedSettings)
            }
        }
    }

    /// Aplica a proposta confirmada: grava o slot corrente, troca a
    /// configuração viva, reenvia ao host e publica [`SettingsRestored`].
    pub async fn confirm_restore(&self, proposal: RestoreProposal) -> Result<SerialSettings, SettingsError> {
        let Some(settings) = proposal.payload.decode().filter(SerialSettings::is_meaningful) else {
            warn!("Snapshot sem porta nem endereço válido; restauração cancelada");
            if let Err(e) = self.store.remove(CURRENT_SETTINGS_KEY) {
                warn!("Falha ao limpar {CURRENT_SETTINGS_KEY}: {e}");
            }
            return Err(SettingsError::NothingToRestore);
        };

        self.write_current(&settings)?;
        *guard(&self.live) = settings.clone();

        match self.binding.update_settings(&settings).await {
            Ok(true) => {}
            Ok(false) => warn!("Host recusou a configuração restaurada"),
            Err(e) => warn!("Falha ao enviar a configuração restaurada: {e}"),
        }

        let delivered = self.restored.publish(SettingsRestored {
            settings: settings.clone(),
        });
        info!(
            "Configuração restaurada de {:?} ({delivered} assinantes notificados)",
            proposal.source
        );
        Ok(settings)
    }

    /// Proposta e confirmação numa chamada só.
    pub async fn restore(&self) -> Result<SerialSettings, SettingsError> {
        let proposal = self.propose_restore().await?;
        self.confirm_restore(proposal).await
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_store::MemoryStore;
    use crate::testing::FakeBinding;

    struct Rig {
        binding: Arc<FakeBinding>,
        store: Arc<MemoryStore>,
        bus: Arc<SignalBus<SettingsRestored>>,
        controller: SettingsController,
    }

    fn rig_with(store: MemoryStore) -> Rig {
        let binding = Arc::new(FakeBinding::new());
        let store = Arc::new(store);
        let bus = Arc::new(SignalBus::default());
        let controller = SettingsController::new(binding.clone(), store.clone(), Arc::clone(&bus));
        Rig {
            binding,
            store,
            bus,
            controller,
        }
    }

    fn rig() -> Rig {
        rig_with(MemoryStore::new())
    }

    fn com3() -> SerialSettings {
        SerialSettings {
            port: "COM3".into(),
            slave_address: 12,
            ..Default::default()
        }
    }

    fn current_slot(rig: &Rig) -> Option<SerialSettings> {
        rig.store
            .get(CURRENT_SETTINGS_KEY)
            .unwrap()
            .and_then(|text| decode_snapshot_text(&text))
    }

    #[test]
    fn live_settings_start_from_current_slot() {
        let store = MemoryStore::new();
        store
            .set(CURRENT_SETTINGS_KEY, &serde_json::to_string(&com3()).unwrap())
            .unwrap();
        let rig = rig_with(store);
        assert_eq!(rig.controller.live_settings(), com3());
        assert_eq!(rig.controller.save_state(), SaveState::Disabled);
    }

    #[tokio::test]
    async fn startup_pushes_record_from_current_slot() {
        let store = MemoryStore::new();
        store
            .set(CURRENT_SETTINGS_KEY, &serde_json::to_string(&com3()).unwrap())
            .unwrap();
        let rig = rig_with(store);

        assert!(rig.controller.sync_live().await.unwrap());
        assert_eq!(rig.binding.pushed(), vec![com3()]);
    }

    #[tokio::test]
    async fn startup_with_default_record_pushes_nothing() {
        let rig = rig();
        assert!(!rig.controller.sync_live().await.unwrap());
        assert!(rig.binding.pushed().is_empty());
    }

    #[tokio::test]
    async fn startup_push_failure_keeps_live_record() {
        let store = MemoryStore::new();
        store
            .set(CURRENT_SETTINGS_KEY, &serde_json::to_string(&com3()).unwrap())
            .unwrap();
        let rig = rig_with(store);
        rig.binding.set_update_result(None);

        let err = rig.controller.sync_live().await.unwrap_err();
        assert!(matches!(err, SettingsError::Remote(_)));
        assert_eq!(rig.controller.live_settings(), com3());
    }

    #[tokio::test]
    async fn update_field_pushes_whole_record() {
        let rig = rig();
        rig.controller.set_port("COM3").await.unwrap();
        rig.controller.set_slave_address(12).await.unwrap();

        let pushed = rig.binding.pushed();
        assert_eq!(pushed.len(), 2);
        assert_eq!(pushed[1], com3());
        assert_eq!(current_slot(&rig), Some(com3()));
    }

    #[tokio::test]
    async fn slave_address_sticks_even_when_host_fails() {
        let rig = rig();
        rig.binding.set_update_result(None);

        let err = rig.controller.set_slave_address(12).await.unwrap_err();
        assert!(matches!(err, SettingsError::Remote(_)));
        assert_eq!(rig.controller.live_settings().slave_address, 12);

        rig.binding.set_update_result(Some(false));
        let err = rig.controller.set_baud_rate(19200).await.unwrap_err();
        assert!(matches!(err, SettingsError::UpdateRejected("baudRate")));
        assert_eq!(rig.controller.live_settings().baud_rate, 19200);
        assert_eq!(rig.controller.live_settings().slave_address, 12);
    }

    #[tokio::test]
    async fn enabling_save_with_blank_settings_is_refused() {
        let rig = rig();

        let err = rig.controller.toggle_save_enabled(true).await.unwrap_err();
        assert!(matches!(err, SettingsError::NothingToSave));
        assert!(err.is_warning());
        assert_eq!(rig.controller.save_state(), SaveState::Disabled);
        assert_eq!(rig.store.write_count(), 0);
        assert!(rig.binding.saved().is_empty());
    }

    #[tokio::test]
    async fn enabling_save_writes_both_tiers() {
        let rig = rig();
        rig.controller.set_port("COM3").await.unwrap();
        rig.controller.set_slave_address(12).await.unwrap();

        let state = rig.controller.toggle_save_enabled(true).await.unwrap();
        assert_eq!(state, SaveState::EnabledSynced);
        assert_eq!(rig.binding.saved(), vec![com3()]);
        let local = rig.store.get(SAVED_SETTINGS_KEY).unwrap().unwrap();
        assert_eq!(decode_snapshot_text(&local), Some(com3()));
    }

    #[tokio::test]
    async fn save_falls_back_to_local_when_host_is_down() {
        let rig = rig();
        rig.controller.set_port("COM3").await.unwrap();
        rig.binding.set_persistence_down(true);

        let state = rig.controller.toggle_save_enabled(true).await.unwrap();
        assert_eq!(state, SaveState::EnabledLocalOnly);
        assert!(rig.store.contains(SAVED_SETTINGS_KEY));
    }

    #[tokio::test]
    async fn disabling_clears_snapshot_and_resets_current() {
        let rig = rig();
        rig.controller.set_port("COM3").await.unwrap();
        rig.controller.toggle_save_enabled(true).await.unwrap();
        let bus_rx = rig.bus.subscribe();

        let state = rig.controller.toggle_save_enabled(false).await.unwrap();
        assert_eq!(state, SaveState::Disabled);
        assert!(rig.binding.snapshot().is_none());
        assert!(!rig.store.contains(SAVED_SETTINGS_KEY));
        assert_eq!(current_slot(&rig), Some(SerialSettings::default()));
        // O valor vivo não muda e nada é publicado
        assert_eq!(rig.controller.live_settings().port, "COM3");
        assert!(bus_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn disabling_ignores_host_failures() {
        let rig = rig();
        rig.binding.set_persistence_down(true);
        rig.store.set(SAVED_SETTINGS_KEY, "{}").unwrap();

        let state = rig.controller.toggle_save_enabled(false).await.unwrap();
        assert_eq!(state, SaveState::Disabled);
        assert!(!rig.store.contains(SAVED_SETTINGS_KEY));
    }

    #[tokio::test]
    async fn refresh_prefers_host_then_local_slot() {
        let rig = rig();
        assert_eq!(rig.controller.refresh_save_state().await, SaveState::Disabled);

        // Sentinela vazia conta como "ligado"
        rig.store.set(SAVED_SETTINGS_KEY, "").unwrap();
        assert_eq!(rig.controller.refresh_save_state().await, SaveState::EnabledLocalOnly);

        rig.binding.set_snapshot(Some(SnapshotPayload::Record(com3())));
        assert_eq!(rig.controller.refresh_save_state().await, SaveState::EnabledSynced);
    }

    #[tokio::test]
    async fn restore_prefers_host_snapshot_and_broadcasts_record() {
        let rig = rig();
        let rx = rig.bus.subscribe();
        rig.binding.set_snapshot(Some(SnapshotPayload::Text(
            r#"{"port":"COM7","baudRate":19200,"dataBits":8,"stopBits":0,"parity":1,"slaveID":3}"#.into(),
        )));
        rig.store
            .set(SAVED_SETTINGS_KEY, &serde_json::to_string(&com3()).unwrap())
            .unwrap();

        let restored = rig.controller.restore().await.unwrap();
        assert_eq!(restored.port, "COM7");
        assert_eq!(restored.parity, Parity::Odd);
        assert_eq!(restored.slave_address, 3);
        assert_eq!(current_slot(&rig), Some(restored.clone()));
        assert_eq!(rig.controller.live_settings(), restored);
        assert_eq!(rx.try_recv().unwrap().settings, restored);
        assert_eq!(rig.binding.pushed().last(), Some(&restored));
    }

    #[tokio::test]
    async fn restore_falls_back_to_local_slot() {
        let rig = rig();
        rig.binding.set_persistence_down(true);
        rig.store
            .set(SAVED_SETTINGS_KEY, &serde_json::to_string(&com3()).unwrap())
            .unwrap();

        let proposal = rig.controller.propose_restore().await.unwrap();
        assert_eq!(proposal.source(), RestoreSource::Local);
        assert_eq!(rig.controller.confirm_restore(proposal).await.unwrap(), com3());
    }

    #[tokio::test]
    async fn restore_twice_is_idempotent() {
        let rig = rig();
        rig.binding.set_snapshot(Some(SnapshotPayload::Record(com3())));

        rig.controller.restore().await.unwrap();
        let first = current_slot(&rig);
        rig.controller.restore().await.unwrap();
        assert_eq!(current_slot(&rig), first);
        assert_eq!(first, Some(com3()));
    }

    #[tokio::test]
    async fn restore_without_any_snapshot_warns() {
        let rig = rig();
        let err = rig.controller.restore().await.unwrap_err();
        assert!(matches!(err, SettingsError::NoSavedSettings));
        assert_eq!(rig.store.write_count(), 0);
    }

    #[tokio::test]
    async fn restore_without_any_snapshot_keeps_current_slot() {
        let store = MemoryStore::new();
        store
            .set(CURRENT_SETTINGS_KEY, &serde_json::to_string(&com3()).unwrap())
            .unwrap();
        let rig = rig_with(store);
        let rx = rig.bus.subscribe();
        let writes = rig.store.write_count();

        let err = rig.controller.restore().await.unwrap_err();

        assert!(matches!(err, SettingsError::NoSavedSettings));
        assert_eq!(rig.store.write_count(), writes);
        assert_eq!(current_slot(&rig), Some(com3()));
        assert_eq!(rig.controller.live_settings(), com3());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn meaningless_snapshot_cancels_and_clears_current() {
        let rig = rig();
        let rx = rig.bus.subscribe();
        rig.store
            .set(CURRENT_SETTINGS_KEY, &serde_json::to_string(&com3()).unwrap())
            .unwrap();
        rig.binding
            .set_snapshot(Some(SnapshotPayload::Text(r#"{"port":"","slaveID":0}"#.into())));

        let err = rig.controller.restore().await.unwrap_err();
        assert!(matches!(err, SettingsError::NothingToRestore));
        assert!(!rig.store.contains(CURRENT_SETTINGS_KEY));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn cancelled_proposal_writes_nothing() {
        let rig = rig();
        rig.binding.set_snapshot(Some(SnapshotPayload::Record(com3())));

        let proposal = rig.controller.propose_restore().await.unwrap();
        assert_eq!(proposal.preview(), Some(com3()));
        drop(proposal);

        assert_eq!(rig.store.write_count(), 0);
        assert!(rig.binding.pushed().is_empty());
    }
}
