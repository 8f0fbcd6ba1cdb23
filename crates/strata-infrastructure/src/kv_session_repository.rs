//! Session repository over a key-value substrate.
//!
//! Each session is stored under `strata_session_<id>` as a flat versioned JSON
//! object produced by the session migrator. Records written before versioning
//! carry no `version` key and are read as schema 1.0.0.

use async_trait::async_trait;
use std::sync::Arc;
use version_migrate::Migrator;

use strata_core::StrataError;
use strata_core::error::Result;
use strata_core::kv::KeyValueStore;
use strata_core::session::{Session, SessionRepository};

use crate::dto::create_session_migrator;

pub const SESSION_KEY_PREFIX: &str = "strata_session_";
pub const ACTIVE_SESSION_KEY: &str = "strata_active_session";

const LEGACY_VERSION: &str = "1.0.0";

/// `SessionRepository` implementation over any `KeyValueStore`.
pub struct KvSessionRepository {
    store: Arc<dyn KeyValueStore>,
    migrator: Migrator,
}

impl KvSessionRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            migrator: create_session_migrator(),
        }
    }

    /// Key under which a session is stored.
    pub fn session_key(session_id: &str) -> String {
        format!("{}{}", SESSION_KEY_PREFIX, session_id)
    }

    /// Parses and migrates one stored record.
    fn decode(&self, raw: &str) -> Result<Session> {
        let mut value: serde_json::Value = serde_json::from_str(raw)?;

        let object = value
            .as_object_mut()
            .ok_or_else(|| StrataError::data_access("Session record is not a JSON object"))?;
        if !object.get("diagnosis").is_some_and(|d| d.is_object()) {
            return Err(StrataError::data_access(
                "Session record has no diagnosis object",
            ));
        }
        if !object.contains_key("version") {
            object.insert(
                "version".to_string(),
                serde_json::Value::String(LEGACY_VERSION.to_string()),
            );
        }

        self.migrator
            .load_flat_from("session", value)
            .map_err(|e| StrataError::migration(format!("Failed to migrate session: {}", e)))
    }
}

#[async_trait]
impl SessionRepository for KvSessionRepository {
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>> {
        match self.store.get(&Self::session_key(session_id)).await? {
            Some(raw) => self.decode(&raw).map(Some),
            None => Ok(None),
        }
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let serialized = self
            .migrator
            .save_domain_flat("session", session.clone())
            .map_err(|e| {
                StrataError::serialization(
                    "JSON",
                    format!("Failed to serialize session {}: {}", session.id, e),
                )
            })?;

        self.store
            .set(&Self::session_key(&session.id), &serialized)
            .await?;
        tracing::debug!("Saved session {} ({} bytes)", session.id, serialized.len());
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        self.store.remove(&Self::session_key(session_id)).await?;

        if self.get_active_session_id().await?.as_deref() == Some(session_id) {
            self.set_active_session_id(None).await?;
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Session>> {
        let keys = self.store.keys_with_prefix(SESSION_KEY_PREFIX).await?;

        let mut sessions = Vec::with_capacity(keys.len());
        for key in keys {
            let raw = match self.store.get(&key).await {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!("Skipping unreadable session record {}: {}", key, e);
                    continue;
                }
            };
            match self.decode(&raw) {
                Ok(session) => sessions.push(session),
                Err(e) => tracing::warn!("Skipping corrupt session record {}: {}", key, e),
            }
        }

        sessions.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        Ok(sessions)
    }

    async fn get_active_session_id(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .get(ACTIVE_SESSION_KEY)
            .await?
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty()))
    }

    async fn set_active_session_id(&self, session_id: Option<&str>) -> Result<()> {
        match session_id {
            Some(id) => self.store.set(ACTIVE_SESSION_KEY, id).await,
            None => self.store.remove(ACTIVE_SESSION_KEY).await,
        }
    }
}
