//! Painéis de texto do console.

use meter_core::input::format_slave_address;
use meter_core::persistence::SaveState;
use meter_core::types::{DeviceStatus, SerialSettings, TelemetrySample};

// ──────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────

pub fn format_value(value: f64, unit: &str) -> String {
    match unit {
        " V" => format!("{value:.1}{unit}"),
        " A" => format!("{value:.3}{unit}"),
        " kW" | " kvar" | " kVA" | " kWh" => format!("{value:.3}{unit}"),
        " Hz" => format!("{value:.2}{unit}"),
        "" => format!("{value:.3}"),
        _ => format!("{value:.1}{unit}"),
    }
}

fn row(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!("  {label:<16}{value:>16}\n"));
}

fn title(out: &mut String, text: &str) {
    out.push_str(&format!("── {text} ──\n"));
}

// ──────────────────────────────────────────
// Painéis
// ──────────────────────────────────────────

pub fn status_panel(status: &DeviceStatus) -> String {
    let mut out = String::new();
    title(&mut out, "DISPOSITIVO");
    row(
        &mut out,
        "Estado",
        if status.connected { "● CONECTADO" } else { "○ DESCONECTADO" },
    );
    row(&mut out, "Protocolo", &status.protocol);
    row(
        &mut out,
        "Atualizado",
        &status.last_update.format("%H:%M:%S").to_string(),
    );
    if let Some(error) = &status.error_message {
        row(&mut out, "Erro", error);
    }
    out
}

pub fn telemetry_panel(sample: Option<&TelemetrySample>) -> String {
    let mut out = String::new();
    title(&mut out, "MEDIDOR");
    let Some(s) = sample else {
        out.push_str("  Sem leitura\n");
        return out;
    };
    row(&mut out, "Tensão", &format_value(s.voltage, " V"));
    row(&mut out, "Corrente", &format_value(s.current, " A"));
    row(&mut out, "P. ativa", &format_value(s.active_power, " kW"));
    row(&mut out, "P. reativa", &format_value(s.reactive_power, " kvar"));
    row(&mut out, "P. aparente", &format_value(s.apparent_power, " kVA"));
    row(&mut out, "Fator de pot.", &format_value(s.power_factor, ""));
    row(&mut out, "Frequência", &format_value(s.frequency, " Hz"));
    row(&mut out, "Energia", &format_value(s.active_energy, " kWh"));
    row(&mut out, "Leitura", &s.timestamp);
    out
}

pub fn settings_panel(settings: &SerialSettings, save_state: SaveState) -> String {
    let mut out = String::new();
    title(&mut out, "SERIAL");
    let port = if settings.port.is_empty() { "—" } else { settings.port.as_str() };
    row(&mut out, "Porta", port);
    row(&mut out, "Baud rate", &settings.baud_rate.to_string());
    row(&mut out, "Data bits", &settings.data_bits.to_string());
    row(&mut out, "Stop bits", &settings.stop_bits.to_string());
    row(&mut out, "Paridade", settings.parity.as_str());
    let slave = format_slave_address(settings.slave_address);
    row(&mut out, "Escravo (hex)", if slave.is_empty() { "—" } else { slave.as_str() });
    let save = match save_state {
        SaveState::Disabled => "desligado",
        SaveState::EnabledSynced => "ligado (host)",
        SaveState::EnabledLocalOnly => "ligado (local)",
    };
    row(&mut out, "Salvamento", save);
    out
}
