//! Storage boundary for strategy sessions.

use async_trait::async_trait;

use super::model::Session;
use crate::error::Result;

/// Where sessions live between runs.
///
/// Implementors own schema versioning of the stored records and keep a
/// pointer to the session that was active last, so a new process can resume.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Loads one session.
    ///
    /// # Returns
    ///
    /// - `Ok(None)`: no record under this id
    /// - `Err(_)`: a record exists but could not be decoded or migrated
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>>;

    /// Saves a session, replacing any previous record with the same ID.
    async fn save(&self, session: &Session) -> Result<()>;

    /// Removes a session. Unknown ids are not an error.
    async fn delete(&self, session_id: &str) -> Result<()>;

    /// Lists all readable sessions, most recently modified first.
    ///
    /// Corrupt records are skipped and logged, never returned as an error.
    async fn list_all(&self) -> Result<Vec<Session>>;

    /// Gets the ID of the session that was active last.
    async fn get_active_session_id(&self) -> Result<Option<String>>;

    /// Records the ID of the active session. `None` clears it.
    async fn set_active_session_id(&self, session_id: Option<&str>) -> Result<()>;
}
