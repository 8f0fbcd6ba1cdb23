//! Path management for Strata configuration and session files.
//!
//! Default locations come from `AppPaths` (version-migrate), which resolves
//! the platform config directory. A base directory can be supplied instead,
//! which is how tests and `--data-dir` redirect everything.

use std::path::{Path, PathBuf};
use version_migrate::AppPaths;

use strata_core::config::{GeminiConfig, SecretConfig};

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolves Strata's files.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/strata/            # Config directory (or the base override)
/// ├── config.toml              # Application configuration
/// ├── secret.json              # API keys
/// ├── sessions/                # One file per session key
/// └── logs/                    # Optional CLI log files
///     └── strata.log.YYYY-MM-DD
/// ```
#[derive(Debug, Clone, Default)]
pub struct StrataPaths {
    base: Option<PathBuf>,
}

impl StrataPaths {
    const APP_NAME: &'static str = "strata";

    /// Creates a resolver rooted at `base`, or at the platform config dir.
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the root configuration directory.
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => AppPaths::new(Self::APP_NAME)
                .config_dir()
                .map_err(|_| PathError::HomeDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secrets file.
    ///
    /// # Security Note
    ///
    /// Ensure this file has appropriate permissions (e.g., 600).
    pub fn secret_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("secret.json"))
    }

    pub fn sessions_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("sessions"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("logs"))
    }

    /// Ensures the secret file exists, creating a template if it doesn't.
    ///
    /// The template is written with the current schema version and an empty
    /// Gemini key. On Unix the file mode is set to 600.
    pub fn ensure_secret_file(&self) -> Result<PathBuf, std::io::Error> {
        let secret_path = self
            .secret_file()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()))?;

        if secret_path.exists() {
            return Ok(secret_path);
        }

        if let Some(parent) = secret_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: String::new(),
            }),
        };
        let template_json = crate::dto::create_secret_migrator()
            .save_domain_flat("secret", template)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

        std::fs::write(&secret_path, template_json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&secret_path, permissions)?;
        }

        Ok(secret_path)
    }
}
