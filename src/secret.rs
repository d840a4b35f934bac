//! Credential storage for key-based providers.
//!
//! A store holds exactly one value. Writing the empty string clears it.

use crate::error::Result;
use secrecy::{ExposeSecret, SecretString};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Storage key of the Gemini API key.
pub const GEMINI_KEY_NAME: &str = "gemini_api_key";

/// An opaque provider credential. `Debug` never prints the value.
pub struct Credential(SecretString);

impl Credential {
    /// Wraps a raw credential value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    /// Returns the raw value for use in a request.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

/// Durable holder of a single provider credential.
pub trait SecretStore: Send + Sync {
    /// Returns the stored credential, or `None` when absent or cleared.
    fn get(&self) -> Option<Credential>;

    /// Overwrites the stored credential. An empty value clears it.
    fn set(&self, value: &str) -> Result<()>;
}

/// In-process store. Used for tests and for one-off key overrides.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    value: RwLock<Option<String>>,
}

impl MemorySecretStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds a value.
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: RwLock::new(Some(value.into())),
        }
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self) -> Option<Credential> {
        let guard = self.value.read().unwrap_or_else(|e| e.into_inner());
        guard
            .as_deref()
            .filter(|v| !v.is_empty())
            .map(Credential::new)
    }

    fn set(&self, value: &str) -> Result<()> {
        let mut guard = self.value.write().unwrap_or_else(|e| e.into_inner());
        *guard = (!value.is_empty()).then(|| value.to_string());
        Ok(())
    }
}

/// Store backed by a JSON key-value file.
///
/// The file may hold other keys; only `key` is read and written.
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    path: PathBuf,
    key: String,
}

impl FileSecretStore {
    /// Creates a store for `key` in the file at `path`.
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    /// Store for the Gemini key in the user config directory
    /// (e.g. `~/.config/chimeragen/credentials.json`).
    pub fn default_location() -> Option<Self> {
        let dir = dirs::config_dir()?;
        Some(Self::new(
            dir.join("chimeragen").join("credentials.json"),
            GEMINI_KEY_NAME,
        ))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }
}

impl SecretStore for FileSecretStore {
    fn get(&self) -> Option<Credential> {
        match self.load() {
            Ok(mut entries) => entries
                .remove(&self.key)
                .filter(|v| !v.is_empty())
                .map(Credential::new),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "unreadable credential file: {e}");
                None
            }
        }
    }

    fn set(&self, value: &str) -> Result<()> {
        let mut entries = self.load()?;
        if value.is_empty() {
            entries.remove(&self.key);
        } else {
            entries.insert(self.key.clone(), value.to_string());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemorySecretStore::new();
        assert!(store.get().is_none());

        store.set("abc").unwrap();
        assert_eq!(store.get().unwrap().expose(), "abc");

        store.set("def").unwrap();
        assert_eq!(store.get().unwrap().expose(), "def");
    }

    #[test]
    fn test_memory_store_empty_clears() {
        let store = MemorySecretStore::with_value("abc");
        store.set("").unwrap();
        assert!(store.get().is_none());
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::new("super-secret");
        let printed = format!("{credential:?}");
        assert!(!printed.contains("super-secret"));
    }

    #[test]
    fn test_file_store_missing_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSecretStore::new(dir.path().join("none.json"), GEMINI_KEY_NAME);
        assert!(store.get().is_none());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.json");

        FileSecretStore::new(&path, GEMINI_KEY_NAME)
            .set("AIza-test")
            .unwrap();

        let reopened = FileSecretStore::new(&path, GEMINI_KEY_NAME);
        assert_eq!(reopened.get().unwrap().expose(), "AIza-test");

        reopened.set("").unwrap();
        assert!(FileSecretStore::new(&path, GEMINI_KEY_NAME).get().is_none());
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, r#"{"other": "value"}"#).unwrap();

        let store = FileSecretStore::new(&path, GEMINI_KEY_NAME);
        store.set("k1").unwrap();

        let raw: BTreeMap<String, String> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["other"], "value");
        assert_eq!(raw[GEMINI_KEY_NAME], "k1");
    }

    #[test]
    fn test_file_store_corrupt_file_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileSecretStore::new(&path, GEMINI_KEY_NAME);
        assert!(store.get().is_none());
        assert!(store.set("k").is_err());
    }
}
