//! Loop interativo do operador: comandos de texto, painéis e os sinais
//! vindos do store e do barramento de restauração.

use crate::panels;
use crossbeam_channel::Receiver;
use meter_core::acquisition::{list_channels, start_acquisition, stop_acquisition};
use meter_core::binding::RemoteBinding;
use meter_core::input::{BlurOutcome, SlaveAddressInput, parse_field};
use meter_core::persistence::{RestoreProposal, RestoreSource, SettingsController, SettingsError};
use meter_core::signal::SettingsRestored;
use meter_core::store::TelemetryStore;
use meter_core::types::SettingsField;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

/// Frequência de drenagem dos canais de sinal.
const DRAIN_INTERVAL: Duration = Duration::from_millis(100);

pub const HELP: &str = "\
Comandos:
  ports                 lista as portas do host
  open | close          inicia / para a aquisição
  status                estado do dispositivo e última leitura
  show                  configuração serial
  watch                 liga/desliga a exibição contínua das leituras
  set <campo> <valor>   port, baud, data, stop, parity
  slave <hex>           endereço do escravo (01–FF)
  save on|off           salvamento da configuração
  restore               restaura a configuração salva (pede confirmação)
  y | n                 confirma / cancela a restauração
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    Ports,
    Open,
    Close,
    Status,
    Show,
    Watch,
    Set { field: String, value: String },
    Slave(String),
    Save(bool),
    Restore,
    Confirm(bool),
}

/// Linha em branco → `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = parts.collect();

    let command = match (head.to_ascii_lowercase().as_str(), rest.as_slice()) {
        ("help" | "?", []) => Command::Help,
        ("quit" | "exit" | "q", []) => Command::Quit,
        ("ports", []) => Command::Ports,
        ("open", []) => Command::Open,
        ("close", []) => Command::Close,
        ("status", []) => Command::Status,
        ("show", []) => Command::Show,
        ("watch", []) => Command::Watch,
        ("set", [field, value @ ..]) if !value.is_empty() => Command::Set {
            field: field.to_string(),
            value: value.join(" "),
        },
        ("slave", [value]) => Command::Slave(value.to_string()),
        ("slave", []) => Command::Slave(String::new()),
        ("save", [flag]) => match flag.to_ascii_lowercase().as_str() {
            "on" => Command::Save(true),
            "off" => Command::Save(false),
            other => return Err(format!("save espera on|off, recebeu {other:?}")),
        },
        ("restore", []) => Command::Restore,
        ("y" | "yes" | "s" | "sim", []) => Command::Confirm(true),
        ("n" | "no" | "nao" | "não", []) => Command::Confirm(false),
        (other, _) => return Err(format!("Comando inválido: {other:?} (digite help)")),
    };
    Ok(Some(command))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Console {
    store: Arc<TelemetryStore>,
    binding: Arc<dyn RemoteBinding>,
    settings: Arc<SettingsController>,
    slave_input: SlaveAddressInput,
    pending_restore: Option<RestoreProposal>,
    watching: bool,
}

impl Console {
    pub fn new(
        store: Arc<TelemetryStore>,
        binding: Arc<dyn RemoteBinding>,
        settings: Arc<SettingsController>,
    ) -> Self {
        let slave_input = SlaveAddressInput::new(settings.live_settings().slave_address);
        Self {
            store,
            binding,
            settings,
            slave_input,
            pending_restore: None,
            watching: true,
        }
    }

    fn report_update(&self, field: &str, result: Result<(), SettingsError>) {
        match result {
            Ok(()) => println!("✓ {field} atualizado"),
            Err(e) if e.is_warning() => println!("⚠ {e}"),
            Err(e) => println!("✗ {e} (valor local mantido)"),
        }
    }

    async fn apply_field(&mut self, field: SettingsField) {
        if let SettingsField::SlaveAddress(address) = field {
            self.slave_input.reset_to(address);
        }
        let name = field.name();
        let result = self.settings.update_field(field).await;
        self.report_update(name, result);
    }

    pub async fn execute(&mut self, command: Command) -> Flow {
        match command {
            Command::Help => println!("{HELP}"),
            Command::Quit => return Flow::Quit,
            Command::Ports => {
                let channels = list_channels(self.binding.as_ref()).await;
                if channels.is_empty() {
                    println!("Nenhuma porta disponível");
                } else {
                    println!("Portas: {}", channels.join(", "));
                }
            }
            Command::Open => {
                let settings = self.settings.live_settings();
                match start_acquisition(&self.store, self.binding.as_ref(), &settings).await {
                    Ok(()) => println!("✓ Aquisição iniciada em {}", settings.port),
                    Err(e) => println!("✗ {e}"),
                }
            }
            Command::Close => {
                stop_acquisition(&self.store, self.binding.as_ref()).await;
                println!("Aquisição parada");
            }
            Command::Status => {
                print!("{}", panels::status_panel(&self.store.get_status()));
                print!("{}", panels::telemetry_panel(self.store.get_sample().as_ref()));
            }
            Command::Show => print!(
                "{}",
                panels::settings_panel(&self.settings.live_settings(), self.settings.save_state())
            ),
            Command::Watch => {
                self.watching = !self.watching;
                println!("Exibição contínua {}", if self.watching { "ligada" } else { "desligada" });
            }
            Command::Set { field, value } => match parse_field(&field, &value) {
                Ok(field) => self.apply_field(field).await,
                Err(e) => println!("⚠ {e}"),
            },
            Command::Slave(text) => {
                if let Err(e) = self.slave_input.edit(&text) {
                    println!("⚠ {e}");
                }
                match self.slave_input.blur() {
                    BlurOutcome::Unchanged => debug!("Endereço inalterado"),
                    BlurOutcome::Committed(address) => {
                        let result = self.settings.set_slave_address(address).await;
                        self.report_update("slaveAddress", result);
                    }
                    BlurOutcome::Rejected { error, reverted_to } => {
                        let shown = if reverted_to.is_empty() { "—" } else { reverted_to.as_str() };
                        println!("⚠ {error}; mantido {shown}");
                    }
                }
            }
            Command::Save(enabled) => match self.settings.toggle_save_enabled(enabled).await {
                Ok(state) => println!("Salvamento: {state:?}"),
                Err(e) if e.is_warning() => println!("⚠ {e}"),
                Err(e) => println!("✗ {e}"),
            },
            Command::Restore => match self.settings.propose_restore().await {
                Ok(proposal) => {
                    let origin = match proposal.source() {
                        RestoreSource::Remote => "host",
                        RestoreSource::Local => "local",
                    };
                    match proposal.preview() {
                        Some(preview) => print!(
                            "Snapshot ({origin}):\n{}",
                            panels::settings_panel(&preview, self.settings.save_state())
                        ),
                        None => println!("Snapshot ({origin}) ilegível"),
                    }
                    println!("Aplicar esta configuração? (y/n)");
                    self.pending_restore = Some(proposal);
                }
                Err(e) => println!("⚠ {e}"),
            },
            Command::Confirm(accepted) => match self.pending_restore.take() {
                None => println!("Nada a confirmar"),
                Some(_) if !accepted => println!("Restauração cancelada"),
                Some(proposal) => match self.settings.confirm_restore(proposal).await {
                    Ok(_) => println!("✓ Configuração restaurada"),
                    Err(e) if e.is_warning() => println!("⚠ {e}"),
                    Err(e) => println!("✗ {e}"),
                },
            },
        }
        Flow::Continue
    }

    /// Aplica os sinais pendentes: restaurações e mudanças no store.
    fn drain(&mut self, restored: &Receiver<SettingsRestored>, updates: &Receiver<()>) {
        while let Ok(signal) = restored.try_recv() {
            self.slave_input.reset_to(signal.settings.slave_address);
            print!(
                "{}",
                panels::settings_panel(&signal.settings, self.settings.save_state())
            );
        }

        let mut changed = false;
        while updates.try_recv().is_ok() {
            changed = true;
        }
        if changed && self.watching {
            print!("{}", panels::telemetry_panel(self.store.get_sample().as_ref()));
        }
    }

    /// Lê comandos do stdin até `quit` ou EOF.
    pub async fn run(mut self, restored: Receiver<SettingsRestored>, updates: Receiver<()>) {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut drain = tokio::time::interval(DRAIN_INTERVAL);

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let line = match line {
                        Ok(Some(line)) => line,
                        Ok(None) => break,
                        Err(e) => {
                            warn!("Erro ao ler stdin: {e}");
                            break;
                        }
                    };
                    match parse_command(&line) {
                        Ok(Some(command)) => {
                            if self.execute(command).await == Flow::Quit {
                                break;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => println!("⚠ {e}"),
                    }
                }
                _ = drain.tick() => self.drain(&restored, &updates),
            }
        }

        if self.store.get_status().connected {
            stop_acquisition(&self.store, self.binding.as_ref()).await;
        }
    }
}
