//! Armazenamento local chave → texto, síncrono.
//!
//! Dois slots interessam ao console: a configuração corrente e o snapshot
//! salvo. Ambos guardam JSON; o snapshot pode conter a string vazia
//! ("salvamento ligado, mas sem conteúdo").

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Configuração corrente (espelho da última enviada ao host).
pub const CURRENT_SETTINGS_KEY: &str = "current-settings";

/// Snapshot escolhido pelo operador para a próxima inicialização.
pub const SAVED_SETTINGS_KEY: &str = "saved-settings-snapshot";

/// Erros do armazenamento local.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Chave inválida: {0:?}")]
    InvalidKey(String),

    #[error("Erro de I/O em {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
}

pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

// ──────────────────────────────────────────────
// Memória
// ──────────────────────────────────────────────

/// Store em memória. Conta escritas para os testes verificarem que nada
/// foi gravado.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Número de `set`/`remove` desde a criação.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

// ──────────────────────────────────────────────
// Arquivos
// ──────────────────────────────────────────────

/// Um arquivo `<chave>.json` por slot dentro de `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_owned(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let io_err = |source| StoreError::Io {
            key: key.to_owned(),
            source,
        };
        std::fs::create_dir_all(&self.dir).map_err(io_err)?;
        std::fs::write(&path, value).map_err(io_err)?;
        debug!("Slot {key} gravado em {}", path.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                key: key.to_owned(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "meter_core_{name}_{}_{}",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn memory_store_counts_writes() {
        let store = MemoryStore::new();
        assert_eq!(store.get(CURRENT_SETTINGS_KEY).unwrap(), None);
        store.set(CURRENT_SETTINGS_KEY, "{}").unwrap();
        store.remove(SAVED_SETTINGS_KEY).unwrap();
        assert_eq!(store.write_count(), 2);
        assert_eq!(store.get(CURRENT_SETTINGS_KEY).unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn file_store_set_get_remove() {
        let dir = scratch_dir("roundtrip");
        let store = FileStore::new(&dir);

        assert_eq!(store.get(SAVED_SETTINGS_KEY).unwrap(), None);
        store.set(SAVED_SETTINGS_KEY, r#"{"port":"COM3"}"#).unwrap();
        assert_eq!(
            store.get(SAVED_SETTINGS_KEY).unwrap().as_deref(),
            Some(r#"{"port":"COM3"}"#)
        );

        store.remove(SAVED_SETTINGS_KEY).unwrap();
        assert_eq!(store.get(SAVED_SETTINGS_KEY).unwrap(), None);
        // Remover de novo não é erro
        store.remove(SAVED_SETTINGS_KEY).unwrap();

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn file_store_keeps_empty_sentinel() {
        let dir = scratch_dir("sentinel");
        let store = FileStore::new(&dir);
        store.set(SAVED_SETTINGS_KEY, "").unwrap();
        assert_eq!(store.get(SAVED_SETTINGS_KEY).unwrap().as_deref(), Some(""));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let store = FileStore::new(scratch_dir("keys"));
        assert!(matches!(
            store.set("../escape", "x"),
            Err(StoreError::InvalidKey(_))
        ));
    }
}
