//! Secret management service trait.

use crate::config::SecretConfig;
use crate::error::Result;

/// Service for loading secret configuration (API keys).
///
/// # Security Note
///
/// Implementations should ensure that:
/// - Secret files have appropriate permissions (e.g., 600 on Unix)
/// - Secrets are never logged or exposed in error messages
#[async_trait::async_trait]
pub trait SecretService: Send + Sync {
    /// Loads the secret configuration. A missing file yields the default.
    async fn load_secrets(&self) -> Result<SecretConfig>;
}
