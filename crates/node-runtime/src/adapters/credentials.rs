//! # Credential Stores
//!
//! `InMemoryCredentialStore` for tests and embedding, `TomlCredentialStore`
//! for a read-only file kept next to the config.
//!
//! ## File Format
//!
//! ```toml
//! [[network]]
//! ssid = "home"
//! security = "psk"
//! secret = "correct horse"
//! band_5ghz = true
//! ```

use crate::container::ConfigError;
use crate::ports::CredentialStore;
use serde::Deserialize;
use shared_types::{CredentialFlags, CredentialRecord, SecurityType};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Credential store backed by a `Vec`, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    records: Vec<CredentialRecord>,
}

impl InMemoryCredentialStore {
    pub fn new(records: Vec<CredentialRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn lookup(&self, predicate: &dyn Fn(&CredentialRecord) -> bool) -> Option<CredentialRecord> {
        self.records.iter().find(|r| predicate(r)).cloned()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StoreFile {
    #[serde(default)]
    network: Vec<NetworkEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NetworkEntry {
    ssid: String,
    #[serde(default)]
    security: SecurityType,
    secret: Option<String>,
    #[serde(default)]
    band_5ghz: bool,
    #[serde(default)]
    favorite: bool,
}

impl From<NetworkEntry> for CredentialRecord {
    fn from(entry: NetworkEntry) -> Self {
        let mut flags = CredentialFlags::empty();
        flags.set(CredentialFlags::BAND_5GHZ, entry.band_5ghz);
        flags.set(CredentialFlags::FAVORITE, entry.favorite);
        CredentialRecord {
            ssid: entry.ssid,
            security: entry.security,
            secret: entry.secret,
            flags,
        }
    }
}

/// Read-only credential store loaded from a TOML file.
#[derive(Debug, Clone)]
pub struct TomlCredentialStore {
    inner: InMemoryCredentialStore,
}

impl TomlCredentialStore {
    /// Load credentials from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;
        let store = Self::parse(&content)?;
        debug!(
            path = %path.as_ref().display(),
            records = store.inner.len(),
            "Credential store loaded"
        );
        Ok(store)
    }

    /// Parse credentials from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let file: StoreFile =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let records = file.network.into_iter().map(CredentialRecord::from).collect();
        Ok(Self {
            inner: InMemoryCredentialStore::new(records),
        })
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl CredentialStore for TomlCredentialStore {
    fn lookup(&self, predicate: &dyn Fn(&CredentialRecord) -> bool) -> Option<CredentialRecord> {
        self.inner.lookup(predicate)
    }
}
