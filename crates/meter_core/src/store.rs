//! Store de telemetria – fonte única do status do dispositivo e da última
//! amostra válida.
//!
//! Produtores (poller, controle de aquisição) alteram o estado; a UI lê
//! cópias e assina notificações. A notificação é síncrona: quando
//! `update_status` retorna, todos os assinantes já foram chamados.

use crate::telemetry::{format_sample, is_live};
use crate::types::{DeviceStatus, RawTelemetry, StatusUpdate, TelemetrySample};
use chrono::Utc;
use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, warn};

type Listener = Arc<dyn Fn() + Send + Sync>;
type Listeners = Mutex<BTreeMap<u64, Listener>>;

struct Inner {
    status: DeviceStatus,
    sample: Option<TelemetrySample>,
    /// Incrementado a cada desconexão; fetches de épocas antigas são
    /// descartados.
    epoch: u64,
    next_seq: u64,
    /// Maior sequência já aplicada nesta época.
    applied_seq: u64,
}

/// Identifica um fetch iniciado num tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    epoch: u64,
    seq: u64,
}

/// O que aconteceu com o resultado de um fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Nova amostra publicada.
    Committed,
    /// Leitura reprovada na validação; amostra anterior mantida.
    Retained,
    /// Leitura reprovada e não havia amostra: ausência notificada.
    Cleared,
    /// Fetch falhou ou voltou vazio; nada muda, ninguém é notificado.
    Skipped,
    /// Desconectou (ou um fetch mais novo já foi aplicado) antes de
    /// terminar.
    Stale,
}

/// Estado do tick antes do fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStart {
    Fetch(FetchTicket),
    Idle,
}

pub struct TelemetryStore {
    inner: Mutex<Inner>,
    listeners: Arc<Listeners>,
    next_listener: AtomicU64,
}

impl TelemetryStore {
    pub fn new(protocol: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                status: DeviceStatus::new(protocol),
                sample: None,
                epoch: 0,
                next_seq: 0,
                applied_seq: 0,
            }),
            listeners: Arc::new(Mutex::new(BTreeMap::new())),
            next_listener: AtomicU64::new(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cópia do status atual.
    pub fn get_status(&self) -> DeviceStatus {
        self.lock().status.clone()
    }

    /// Cópia da última amostra válida, se houver.
    pub fn get_sample(&self) -> Option<TelemetrySample> {
        self.lock().sample.clone()
    }

    /// Mescla os campos, carimba `last_update` e notifica.
    ///
    /// A passagem para `connected = false` descarta a amostra na mesma
    /// chamada e invalida qualquer fetch em andamento.
    pub fn update_status(&self, update: StatusUpdate) {
        {
            let mut inner = self.lock();
            let was_connected = inner.status.connected;
            inner.status.merge(update, Utc::now());
            if was_connected && !inner.status.connected {
                inner.sample = None;
                inner.epoch += 1;
                inner.applied_seq = 0;
            }
        }
        self.notify();
    }

    /// Registra `listener`; chamado a cada mudança de status ou amostra.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_listener.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(listener));
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Chama cada assinante fora dos locks. Um assinante que entra em
    /// pânico é registrado e os demais seguem.
    fn notify(&self) {
        let listeners: Vec<(u64, Listener)> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, l)| (*id, Arc::clone(l)))
            .collect();

        for (id, listener) in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener())).is_err() {
                warn!("Assinante {id} falhou durante a notificação");
            }
        }
    }

    // ──────────────────────────────────────────
    // Ciclo do poller
    // ──────────────────────────────────────────

    /// Início de tick. Conectado → ticket para um novo fetch. Desconectado
    /// → descarta a amostra remanescente (notificando se havia uma).
    pub fn begin_tick(&self) -> TickStart {
        let cleared = {
            let mut inner = self.lock();
            if inner.status.connected {
                inner.next_seq += 1;
                return TickStart::Fetch(FetchTicket {
                    epoch: inner.epoch,
                    seq: inner.next_seq,
                });
            }
            inner.sample.take().is_some()
        };
        if cleared {
            self.notify();
        }
        TickStart::Idle
    }

    /// Aplica o resultado de um fetch.
    ///
    /// Resultados de épocas anteriores, de quando já se desconectou, ou
    /// mais antigos que o último aplicado são descartados.
    pub fn commit(&self, ticket: FetchTicket, fetched: Option<RawTelemetry>) -> CommitOutcome {
        let Some(raw) = fetched else {
            return CommitOutcome::Skipped;
        };

        let outcome = {
            let mut inner = self.lock();
            if !inner.status.connected || ticket.epoch != inner.epoch || ticket.seq <= inner.applied_seq {
                debug!(
                    "Fetch {} (época {}) descartado: estado já avançou",
                    ticket.seq, ticket.epoch
                );
                return CommitOutcome::Stale;
            }
            inner.applied_seq = ticket.seq;

            if is_live(&raw) {
                inner.sample = Some(format_sample(&raw, Utc::now()));
                CommitOutcome::Committed
            } else if inner.sample.is_some() {
                CommitOutcome::Retained
            } else {
                CommitOutcome::Cleared
            }
        };

        if outcome != CommitOutcome::Retained {
            self.notify();
        }
        outcome
    }
}

/// Token de assinatura. `unsubscribe` remove o callback; soltar o token
/// sem chamá-lo mantém a assinatura.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    listeners: Weak<Listeners>,
}

impl Subscription {
    /// Retorna `true` se o callback ainda estava registrado.
    pub fn unsubscribe(self) -> bool {
        match self.listeners.upgrade() {
            Some(listeners) => listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&self.id)
                .is_some(),
            None => false,
        }
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
