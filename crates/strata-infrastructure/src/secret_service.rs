//! Secret service implementation.
//!
//! Reads API keys from `secret.json`. The file is versioned through the
//! secret migrator; a file without a `version` key is read as 1.0.0.

use std::path::PathBuf;

use strata_core::StrataError;
use strata_core::config::SecretConfig;
use strata_core::error::Result;
use strata_core::secret::SecretService;

use crate::dto::create_secret_migrator;
use crate::paths::StrataPaths;

/// Service for loading secret configuration.
///
/// # Example
///
/// ```ignore
/// use strata_infrastructure::{SecretServiceImpl, StrataPaths};
/// use strata_core::secret::SecretService;
///
/// let service = SecretServiceImpl::new(&StrataPaths::default())?;
/// let secrets = service.load_secrets().await?;
/// ```
#[derive(Debug, Clone)]
pub struct SecretServiceImpl {
    file_path: PathBuf,
}

impl SecretServiceImpl {
    pub fn new(paths: &StrataPaths) -> Result<Self> {
        let file_path = paths
            .secret_file()
            .map_err(|e| StrataError::config(format!("Failed to get secret path: {}", e)))?;
        Ok(Self { file_path })
    }

    pub fn file_path(&self) -> &PathBuf {
        &self.file_path
    }
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig> {
        let content = match tokio::fs::read_to_string(&self.file_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No secret file at {}", self.file_path.display());
                return Ok(SecretConfig::default());
            }
            Err(e) => return Err(e.into()),
        };

        let mut value: serde_json::Value = serde_json::from_str(&content)?;
        if let Some(object) = value.as_object_mut() {
            object
                .entry("version")
                .or_insert_with(|| serde_json::Value::String("1.0.0".to_string()));
        }

        create_secret_migrator()
            .load_flat_from("secret", value)
            .map_err(|e| StrataError::config(format!("Invalid secret file: {}", e)))
    }
}
