//! Validação e formatação das leituras de telemetria.

use crate::types::{RawTelemetry, TelemetrySample};
use chrono::{DateTime, SecondsFormat, Utc};

/// Casas decimais exibidas por grandeza.
pub const VOLTAGE_DECIMALS: i32 = 1;
pub const CURRENT_DECIMALS: i32 = 6;
pub const POWER_DECIMALS: i32 = 3;
pub const POWER_FACTOR_DECIMALS: i32 = 3;
pub const FREQUENCY_DECIMALS: i32 = 2;
pub const ENERGY_DECIMALS: i32 = 3;

/// Uma leitura é aproveitável se algum canal primário está vivo:
/// tensão, frequência, corrente, potência ativa ou energia ativa > 0.
pub fn is_live(raw: &RawTelemetry) -> bool {
    let positive = |value: Option<f64>| value.is_some_and(|v| v > 0.0);

    positive(raw.voltage)
        || positive(raw.frequency)
        || positive(raw.current)
        || positive(raw.active_power)
        || positive(raw.active_energy)
}

/// Arredonda para `decimals` casas. Ausente ou NaN vira 0.
pub fn round_to(value: Option<f64>, decimals: i32) -> f64 {
    match value {
        Some(v) if !v.is_nan() => {
            let factor = 10f64.powi(decimals);
            (v * factor).round() / factor
        }
        _ => 0.0,
    }
}

/// Monta a amostra exibida a partir de uma leitura já validada.
pub fn format_sample(raw: &RawTelemetry, now: DateTime<Utc>) -> TelemetrySample {
    let timestamp = raw
        .timestamp
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Millis, true));

    TelemetrySample {
        voltage: round_to(raw.voltage, VOLTAGE_DECIMALS),
        current: round_to(raw.current, CURRENT_DECIMALS),
        active_power: round_to(raw.active_power, POWER_DECIMALS),
        reactive_power: round_to(raw.reactive_power, POWER_DECIMALS),
        apparent_power: round_to(raw.apparent_power, POWER_DECIMALS),
        power_factor: round_to(raw.power_factor, POWER_FACTOR_DECIMALS),
        frequency: round_to(raw.frequency, FREQUENCY_DECIMALS),
        active_energy: round_to(raw.active_energy, ENERGY_DECIMALS),
        timestamp,
    }
}
