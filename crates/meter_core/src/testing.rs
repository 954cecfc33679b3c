//! Binding roteirizado para os testes do crate.

use crate::binding::{BindingError, RemoteBinding};
use crate::snapshot::SnapshotPayload;
use crate::types::{RawTelemetry, SerialSettings};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Próxima resposta de `fetch_telemetry`.
pub(crate) enum Scripted {
    Reading(RawTelemetry),
    Empty,
    Fail,
}

pub(crate) fn live_reading(voltage: f64) -> RawTelemetry {
    RawTelemetry {
        voltage: Some(voltage),
        current: Some(1.25),
        active_power: Some(0.275),
        power_factor: Some(0.99),
        frequency: Some(50.0),
        active_energy: Some(12.5),
        ..Default::default()
    }
}

fn unavailable(call: &'static str) -> BindingError {
    BindingError::Remote {
        call,
        message: "host indisponível".into(),
    }
}

/// Estado observável do fake.
#[derive(Default)]
struct State {
    readings: VecDeque<Scripted>,
    fetches: usize,
    calls: Vec<&'static str>,
    pushed: Vec<SerialSettings>,
    saved: Vec<SerialSettings>,
    snapshot: Option<SnapshotPayload>,
    update_result: Option<bool>,
    start_result: Option<bool>,
    persistence_down: bool,
    channels: Vec<String>,
}

#[derive(Default)]
pub(crate) struct FakeBinding {
    state: Mutex<State>,
}

impl FakeBinding {
    pub(crate) fn new() -> Self {
        let binding = Self::default();
        {
            let mut state = binding.state.lock().unwrap();
            state.update_result = Some(true);
            state.start_result = Some(true);
        }
        binding
    }

    pub(crate) fn script(&self, readings: impl IntoIterator<Item = Scripted>) {
        self.state.lock().unwrap().readings.extend(readings);
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.state.lock().unwrap().fetches
    }

    /// `None` faz `update_settings` falhar com erro de transporte.
    pub(crate) fn set_update_result(&self, result: Option<bool>) {
        self.state.lock().unwrap().update_result = result;
    }

    pub(crate) fn set_start_result(&self, result: Option<bool>) {
        self.state.lock().unwrap().start_result = result;
    }

    /// Derruba save/load/clear do snapshot remoto.
    pub(crate) fn set_persistence_down(&self, down: bool) {
        self.state.lock().unwrap().persistence_down = down;
    }

    pub(crate) fn set_snapshot(&self, snapshot: Option<SnapshotPayload>) {
        self.state.lock().unwrap().snapshot = snapshot;
    }

    pub(crate) fn snapshot(&self) -> Option<SnapshotPayload> {
        self.state.lock().unwrap().snapshot.clone()
    }

    pub(crate) fn set_channels(&self, channels: &[&str]) {
        self.state.lock().unwrap().channels = channels.iter().map(|c| c.to_string()).collect();
    }

    pub(crate) fn pushed(&self) -> Vec<SerialSettings> {
        self.state.lock().unwrap().pushed.clone()
    }

    pub(crate) fn saved(&self) -> Vec<SerialSettings> {
        self.state.lock().unwrap().saved.clone()
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl RemoteBinding for FakeBinding {
    async fn fetch_telemetry(&self) -> Result<Option<RawTelemetry>, BindingError> {
        let mut state = self.state.lock().unwrap();
        state.fetches += 1;
        match state.readings.pop_front() {
            Some(Scripted::Reading(raw)) => Ok(Some(raw)),
            Some(Scripted::Empty) | None => Ok(None),
            Some(Scripted::Fail) => Err(unavailable("fetch_telemetry")),
        }
    }

    async fn list_channels(&self) -> Result<Vec<String>, BindingError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("list_channels");
        if state.persistence_down {
            return Err(unavailable("list_channels"));
        }
        Ok(state.channels.clone())
    }

    async fn start_acquisition(&self) -> Result<bool, BindingError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("start_acquisition");
        state.start_result.ok_or_else(|| unavailable("start_acquisition"))
    }

    async fn stop_acquisition(&self) -> Result<(), BindingError> {
        self.state.lock().unwrap().calls.push("stop_acquisition");
        Ok(())
    }

    async fn update_settings(&self, settings: &SerialSettings) -> Result<bool, BindingError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("update_settings");
        state.pushed.push(settings.clone());
        state.update_result.ok_or_else(|| unavailable("update_settings"))
    }

    async fn save_snapshot(&self, settings: &SerialSettings) -> Result<(), BindingError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("save_snapshot");
        if state.persistence_down {
            return Err(unavailable("save_snapshot"));
        }
        state.saved.push(settings.clone());
        state.snapshot = Some(SnapshotPayload::Record(settings.clone()));
        Ok(())
    }

    async fn load_snapshot(&self) -> Result<Option<SnapshotPayload>, BindingError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("load_snapshot");
        if state.persistence_down {
            return Err(unavailable("load_snapshot"));
        }
        Ok(state.snapshot.clone())
    }

    async fn clear_snapshot(&self) -> Result<(), BindingError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("clear_snapshot");
        if state.persistence_down {
            return Err(unavailable("clear_snapshot"));
        }
        state.snapshot = None;
        Ok(())
    }
}
