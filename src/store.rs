//! Session persistence shared between CLI invocations

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use aichainx_protocol::common::User;

use crate::error::{MarketError, Result};

/// Persisted identity session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub user: User,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl StoredSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionStoreConfig {
    pub enabled: bool,
    pub storage_path: Option<PathBuf>,
    /// XOR key; the file is written as base64 when set
    pub encryption_key: Option<String>,
}

/// Session storage manager
#[derive(Debug)]
pub struct SessionStore {
    config: SessionStoreConfig,
    session: Option<StoredSession>,
}

impl SessionStore {
    pub fn new(config: SessionStoreConfig) -> Result<Self> {
        let mut store = Self {
            config,
            session: None,
        };

        if store.config.enabled {
            store.load_session()?;
        }

        Ok(store)
    }

    pub fn store_session(&mut self, session: StoredSession) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }

        self.session = Some(session);
        self.save_session()
    }

    pub fn session(&self) -> Option<&StoredSession> {
        if !self.config.enabled {
            return None;
        }
        self.session.as_ref()
    }

    pub fn has_session(&self) -> bool {
        self.session().is_some()
    }

    pub fn clear(&mut self) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }

        self.session = None;
        self.save_session()
    }

    pub fn storage_path(&self) -> Option<&Path> {
        self.config.storage_path.as_deref()
    }

    fn get_storage_path(&self) -> Result<PathBuf> {
        self.config
            .storage_path
            .clone()
            .ok_or_else(|| MarketError::invalid_input("Session storage path not configured"))
    }

    fn load_session(&mut self) -> Result<()> {
        let path = self.get_storage_path()?;

        if !path.exists() {
            return Ok(());
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| MarketError::io_from_error("Failed to read session storage", e))?;

        if content.trim().is_empty() {
            return Ok(());
        }

        let plain = match &self.config.encryption_key {
            Some(key) => deobfuscate(&content, key)?,
            None => content,
        };

        self.session = serde_json::from_str(&plain).map_err(|e| {
            MarketError::internal(format!("Failed to parse session storage: {}", e))
        })?;

        Ok(())
    }

    fn save_session(&self) -> Result<()> {
        let path = self.get_storage_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| MarketError::io_from_error("Failed to create storage directory", e))?;
        }

        let content = serde_json::to_string_pretty(&self.session)?;

        let final_content = match &self.config.encryption_key {
            Some(key) => obfuscate(&content, key),
            None => content,
        };

        fs::write(&path, final_content)
            .map_err(|e| MarketError::io_from_error("Failed to write session storage", e))?;

        tracing::debug!("Session written to {}", path.display());
        Ok(())
    }
}

fn xor_with_key(bytes: &[u8], key: &str) -> Vec<u8> {
    let key_bytes = key.as_bytes();
    if key_bytes.is_empty() {
        return bytes.to_vec();
    }
    bytes
        .iter()
        .enumerate()
        .map(|(i, &b)| b ^ key_bytes[i % key_bytes.len()])
        .collect()
}

fn obfuscate(content: &str, key: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(xor_with_key(content.as_bytes(), key))
}

fn deobfuscate(encoded: &str, key: &str) -> Result<String> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| MarketError::internal(format!("Failed to decode session storage: {}", e)))?;

    String::from_utf8(xor_with_key(&bytes, key))
        .map_err(|e| MarketError::internal(format!("Failed to decode session storage: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::utils::test_helpers::{reference_now, temp_storage};
    use chrono::Duration;

    fn session() -> StoredSession {
        StoredSession {
            user: User {
                uid: "uid-1".to_string(),
                email: "creator@example.com".to_string(),
            },
            id_token: "id".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: reference_now() + Duration::hours(1),
            created_at: reference_now(),
        }
    }

    #[test]
    fn test_session_survives_reload() {
        let (_dir, path) = temp_storage("session.json");
        let config = SessionStoreConfig {
            enabled: true,
            storage_path: Some(path.clone()),
            encryption_key: None,
        };

        let mut store = SessionStore::new(config.clone()).unwrap();
        store.store_session(session()).unwrap();

        let reloaded = SessionStore::new(config).unwrap();
        assert_eq!(reloaded.session(), Some(&session()));
    }

    #[test]
    fn test_obfuscated_file_is_not_plain_json() {
        let (_dir, path) = temp_storage("session.json");
        let config = SessionStoreConfig {
            enabled: true,
            storage_path: Some(path.clone()),
            encryption_key: Some("k3y".to_string()),
        };

        let mut store = SessionStore::new(config.clone()).unwrap();
        store.store_session(session()).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("creator@example.com"));
        assert!(SessionStore::new(config).unwrap().has_session());
    }

    #[test]
    fn test_clear_removes_session() {
        let (_dir, path) = temp_storage("session.json");
        let config = SessionStoreConfig {
            enabled: true,
            storage_path: Some(path),
            encryption_key: None,
        };

        let mut store = SessionStore::new(config.clone()).unwrap();
        store.store_session(session()).unwrap();
        store.clear().unwrap();

        assert!(!SessionStore::new(config).unwrap().has_session());
    }

    #[test]
    fn test_disabled_store_keeps_nothing() {
        let mut store = SessionStore::new(SessionStoreConfig::default()).unwrap();
        store.store_session(session()).unwrap();
        assert!(!store.has_session());
    }

    #[test]
    fn test_expiry() {
        let s = session();
        assert!(!s.is_expired(reference_now()));
        assert!(s.is_expired(reference_now() + Duration::hours(2)));
    }
}
