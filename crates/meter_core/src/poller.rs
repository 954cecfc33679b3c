//! Poller – busca telemetria no binding a cada tick enquanto conectado.
//!
//! O relógio é injetado via [`Ticker`]. Cada tick dispara o fetch numa task
//! própria, então um binding lento não atrasa os ticks seguintes; a ordem
//! dos resultados é resolvida pelo [`TelemetryStore::commit`].

use crate::binding::RemoteBinding;
use crate::store::{CommitOutcome, FetchTicket, TelemetryStore, TickStart};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tracing::{debug, info};

/// Fonte de ticks do poller.
#[async_trait]
pub trait Ticker: Send {
    /// Espera o próximo tick. `false` encerra o loop.
    async fn tick(&mut self) -> bool;
}

/// Ticks periódicos; o primeiro acontece após um período completo.
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

/// Ticks disparados por quem segura o `Sender`. Fechar o canal encerra o
/// poller.
pub struct ChannelTicker {
    rx: mpsc::Receiver<()>,
}

impl ChannelTicker {
    pub fn new(buffer: usize) -> (mpsc::Sender<()>, Self) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (tx, Self { rx })
    }
}

#[async_trait]
impl Ticker for ChannelTicker {
    async fn tick(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }
}

async fn fetch_and_commit(
    store: &TelemetryStore,
    binding: &dyn RemoteBinding,
    ticket: FetchTicket,
) -> CommitOutcome {
    let fetched = match binding.fetch_telemetry().await {
        Ok(raw) => raw,
        Err(e) => {
            debug!("Falha ao buscar telemetria: {e}");
            None
        }
    };
    let outcome = store.commit(ticket, fetched);
    debug!("Tick: {outcome:?}");
    outcome
}

/// Executa um tick completo aguardando o fetch. `None` se desconectado.
pub async fn poll_once(store: &TelemetryStore, binding: &dyn RemoteBinding) -> Option<CommitOutcome> {
    match store.begin_tick() {
        TickStart::Fetch(ticket) => Some(fetch_and_commit(store, binding, ticket).await),
        TickStart::Idle => None,
    }
}

/// Inicia o loop de polling. Roda até o `ticker` encerrar.
pub fn spawn_poller<T>(
    store: Arc<TelemetryStore>,
    binding: Arc<dyn RemoteBinding>,
    mut ticker: T,
) -> JoinHandle<()>
where
    T: Ticker + 'static,
{
    tokio::spawn(async move {
        info!("Poller de telemetria iniciado");
        while ticker.tick().await {
            if let TickStart::Fetch(ticket) = store.begin_tick() {
                let store = Arc::clone(&store);
                let binding = Arc::clone(&binding);
                tokio::spawn(async move {
                    fetch_and_commit(&store, binding.as_ref(), ticket).await;
                });
            }
        }
        info!("Poller de telemetria encerrado");
    })
}

impl TelemetryStore {
    /// Cria o store e já inicia o polling; o loop vive enquanto o `ticker`
    /// produzir ticks.
    pub fn start<T>(protocol: impl Into<String>, binding: Arc<dyn RemoteBinding>, ticker: T) -> Arc<Self>
    where
        T: Ticker + 'static,
    {
        let store = Arc::new(TelemetryStore::new(protocol));
        spawn_poller(Arc::clone(&store), binding, ticker);
        store
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
