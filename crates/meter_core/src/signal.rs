//! Barramento de sinais entre componentes.
//!
//! Cada assinante recebe seu próprio canal `crossbeam`; publicar é
//! não-bloqueante e assinantes desconectados são descartados.

use crate::types::SerialSettings;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Emitido depois que uma restauração é confirmada e gravada.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsRestored {
    pub settings: SerialSettings,
}

pub struct SignalBus<T> {
    subscribers: Mutex<Vec<Sender<T>>>,
    capacity: usize,
}

impl<T: Clone + Send> SignalBus<T> {
    /// `capacity` é o buffer de cada assinante.
    pub fn new(capacity: usize) -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn subscribe(&self) -> Receiver<T> {
        let (tx, rx) = bounded(self.capacity);
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Entrega o sinal a todos os assinantes vivos. Retorna quantos
    /// receberam.
    pub fn publish(&self, signal: T) -> usize {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        let mut delivered = 0;
        subscribers.retain(|tx| match tx.try_send(signal.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                debug!("Assinante lento, sinal descartado");
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        });
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<T: Clone + Send> Default for SignalBus<T> {
    fn default() -> Self {
        Self::new(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_subscriber_gets_the_payload() {
        let bus = SignalBus::<SettingsRestored>::default();
        let a = bus.subscribe();
        let b = bus.subscribe();
        let signal = SettingsRestored {
            settings: SerialSettings {
                port: "COM3".into(),
                ..Default::default()
            },
        };

        assert_eq!(bus.publish(signal.clone()), 2);
        assert_eq!(a.try_recv().unwrap(), signal);
        assert_eq!(b.try_recv().unwrap(), signal);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let bus = SignalBus::<u32>::new(4);
        let kept = bus.subscribe();
        drop(bus.subscribe());

        assert_eq!(bus.publish(1), 1);
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(kept.try_recv(), Ok(1));
    }

    #[test]
    fn full_subscriber_does_not_block_others() {
        let bus = SignalBus::<u32>::new(1);
        let slow = bus.subscribe();
        let fast = bus.subscribe();

        assert_eq!(bus.publish(1), 2);
        assert_eq!(fast.try_recv(), Ok(1));
        // `slow` ainda tem o 1 pendente
        assert_eq!(bus.publish(2), 1);
        assert_eq!(fast.try_recv(), Ok(2));
        assert_eq!(slow.try_recv(), Ok(1));
        assert!(slow.try_recv().is_err());
    }

    #[test]
    fn publish_without_subscribers_is_harmless() {
        let bus = SignalBus::<u32>::default();
        assert_eq!(bus.publish(9), 0);
    }
}
