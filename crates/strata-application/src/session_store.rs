//! Session Store: the active session plus the persisted history.
//!
//! Mutations are applied in memory and never fail. Persistence is a separate
//! write-through step gated on identifying content, so an untouched
//! placeholder session never reaches the store.

use std::sync::Arc;

use strata_core::error::{Result, StrataError};
use strata_core::session::{
    ChallengePatch, DiagnosisPatch, HistoryRecord, Session, SessionRepository,
};

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generates a new opaque session identifier.
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub struct SessionStore {
    repository: Arc<dyn SessionRepository>,
    active: Session,
}

impl SessionStore {
    /// Creates a store with a fresh, unsaved active session.
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self {
            repository,
            active: Session::new(new_session_id(), now_ms()),
        }
    }

    pub fn active(&self) -> &Session {
        &self.active
    }

    /// Replaces the active session with a new one carrying all defaults.
    pub fn create_session(&mut self) -> &Session {
        self.active = Session::new(new_session_id(), now_ms());
        tracing::info!("Created session {}", self.active.id);
        &self.active
    }

    /// Starts an empty session under a known id, e.g. a pointer whose record
    /// was never saved.
    pub fn create_session_with_id(&mut self, id: &str) -> &Session {
        self.active = Session::new(id, now_ms());
        &self.active
    }

    pub fn update_diagnosis(&mut self, patch: DiagnosisPatch) -> &Session {
        patch.apply(&mut self.active.diagnosis);
        self.active.touch(now_ms());
        &self.active
    }

    pub fn update_challenge(&mut self, patch: ChallengePatch) -> &Session {
        patch.apply(&mut self.active.challenge);
        self.active.touch(now_ms());
        &self.active
    }

    /// Replaces the avenue list wholesale.
    pub fn update_prompts(&mut self, prompts: Vec<String>) -> &Session {
        self.active.generated_prompts = prompts;
        self.active.touch(now_ms());
        &self.active
    }

    /// Writes the active session through to the repository.
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: The session was saved and marked active
    /// - `Ok(false)`: Nothing identifying entered yet; nothing written
    /// - `Err(_)`: The write failed
    pub async fn persist(&self) -> Result<bool> {
        if !self.active.has_identifying_content() {
            tracing::debug!("Session {} has no identifying content yet", self.active.id);
            return Ok(false);
        }

        self.repository.save(&self.active).await?;
        self.repository
            .set_active_session_id(Some(&self.active.id))
            .await?;
        Ok(true)
    }

    /// Persisted sessions, most recently modified first. Corrupt records are
    /// skipped by the repository.
    pub async fn list_history(&self) -> Result<Vec<HistoryRecord>> {
        let sessions = self.repository.list_all().await?;
        Ok(sessions.iter().map(HistoryRecord::from).collect())
    }

    /// Removes a persisted session. Deleting an unknown id is not an error.
    ///
    /// Returns `true` when the active session was the one deleted; it is then
    /// replaced by a fresh session.
    pub async fn delete_session(&mut self, id: &str) -> Result<bool> {
        self.repository.delete(id).await?;
        tracing::info!("Deleted session {}", id);

        if self.active.id == id {
            self.create_session();
            return Ok(true);
        }
        Ok(false)
    }

    /// Fetches a persisted session by id.
    pub async fn find(&self, id: &str) -> Result<Session> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| StrataError::not_found("session", id))
    }

    /// Replaces the active session wholesale and marks it active in storage.
    pub async fn load_session(&mut self, session: Session) -> Result<&Session> {
        self.repository
            .set_active_session_id(Some(&session.id))
            .await?;
        tracing::info!("Loaded session {}", session.id);
        self.active = session;
        Ok(&self.active)
    }

    /// Id recorded as active by the last run, if any.
    pub async fn last_active_id(&self) -> Result<Option<String>> {
        self.repository.get_active_session_id().await
    }

    /// Points the active-session marker at the current session even before
    /// it has been saved.
    pub async fn mark_active(&self) -> Result<()> {
        self.repository
            .set_active_session_id(Some(&self.active.id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::session::{ConsumerContextPatch, FunnelStage};
    use strata_infrastructure::{KvSessionRepository, MemoryKeyValueStore};

    fn store() -> SessionStore {
        let repository = KvSessionRepository::new(Arc::new(MemoryKeyValueStore::new()));
        SessionStore::new(Arc::new(repository))
    }

    #[test]
    fn test_update_touches_only_named_fields() {
        let mut store = store();
        store.update_diagnosis(DiagnosisPatch {
            market: Some("Spain".to_string()),
            ..Default::default()
        });
        let before = store.active().clone();

        store.update_diagnosis(DiagnosisPatch {
            consumer_context: Some(ConsumerContextPatch {
                funnel_stage: Some(FunnelStage::Loyalty),
                ..Default::default()
            }),
            ..Default::default()
        });
        let after = store.active();

        assert!(after.last_modified > before.last_modified);
        assert_eq!(after.diagnosis.market, "Spain");
        assert_eq!(after.diagnosis.consumer_context.funnel_stage, FunnelStage::Loyalty);
        assert_eq!(after.diagnosis.consumer_context.barriers, before.diagnosis.consumer_context.barriers);
        assert_eq!(after.challenge, before.challenge);
    }

    #[test]
    fn test_prompts_replaced_wholesale() {
        let mut store = store();
        store.update_prompts(vec!["a".to_string(), "b".to_string()]);
        store.update_prompts(vec!["c".to_string()]);
        assert_eq!(store.active().generated_prompts, vec!["c"]);
    }

    #[tokio::test]
    async fn test_persist_is_gated_on_identifying_content() {
        let mut store = store();
        assert!(!store.persist().await.unwrap());
        assert!(store.list_history().await.unwrap().is_empty());

        store.update_diagnosis(DiagnosisPatch {
            business_challenge: Some("Share loss".to_string()),
            ..Default::default()
        });
        assert!(store.persist().await.unwrap());

        let history = store.list_history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, store.active().id);
        assert_eq!(history[0].last_modified, store.active().last_modified);
        assert_eq!(
            store.last_active_id().await.unwrap().as_deref(),
            Some(store.active().id.as_str())
        );
    }

    #[tokio::test]
    async fn test_delete_active_starts_fresh_session() {
        let mut store = store();
        store.update_diagnosis(DiagnosisPatch {
            client_name: Some("Acme".to_string()),
            ..Default::default()
        });
        store.persist().await.unwrap();
        let id = store.active().id.clone();

        assert!(store.delete_session(&id).await.unwrap());
        assert_ne!(store.active().id, id);
        assert!(store.list_history().await.unwrap().is_empty());

        assert!(!store.delete_session("never-existed").await.unwrap());
    }

    #[tokio::test]
    async fn test_load_replaces_active_session() {
        let mut store = store();
        let mut saved = Session::new("s1", 1_000);
        saved.diagnosis.client_name = "Acme".to_string();

        store.load_session(saved.clone()).await.unwrap();
        assert_eq!(store.active(), &saved);
        assert_eq!(store.last_active_id().await.unwrap().as_deref(), Some("s1"));

        let err = store.find("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
