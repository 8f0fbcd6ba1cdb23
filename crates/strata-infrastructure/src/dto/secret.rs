//! Secret configuration DTOs and migrator.

use serde::{Deserialize, Serialize};
use version_migrate::{FromDomain, IntoDomain, Versioned};

use strata_core::config::{GeminiConfig, SecretConfig};

/// Secret configuration schema V1.0.0.
///
/// Stores the Gemini API key in `secret.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct SecretConfigV1_0_0 {
    /// Gemini API configuration
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
}

impl IntoDomain<SecretConfig> for SecretConfigV1_0_0 {
    fn into_domain(self) -> SecretConfig {
        SecretConfig {
            gemini: self.gemini,
        }
    }
}

impl FromDomain<SecretConfig> for SecretConfigV1_0_0 {
    fn from_domain(config: SecretConfig) -> Self {
        SecretConfigV1_0_0 {
            gemini: config.gemini,
        }
    }
}

/// Creates a migrator for secret configuration entities.
pub fn create_secret_migrator() -> version_migrate::Migrator {
    version_migrate::migrator!("secret" => [SecretConfigV1_0_0, SecretConfig], save = true)
        .expect("Failed to create secret migrator")
}
