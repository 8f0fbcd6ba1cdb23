//! Loads `config.toml` from the Strata config directory, creating it with
//! defaults on first access, and keeps it cached for the process lifetime.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use strata_core::StrataError;
use strata_core::config::RootConfig;
use strata_core::error::Result;

use crate::paths::StrataPaths;

/// Reads and writes `config.toml`, caching the parsed value.
#[derive(Debug, Clone)]
pub struct ConfigService {
    paths: StrataPaths,
    /// `None` until first read or after `invalidate_cache`.
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    pub fn new(paths: StrataPaths) -> Self {
        Self {
            paths,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// The current configuration.
    ///
    /// A file that cannot be read or parsed is reported and replaced by the
    /// defaults for this process; the file itself is left untouched.
    pub fn get_config(&self) -> RootConfig {
        if let Some(cached) = self
            .config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
        {
            return cached.clone();
        }

        let loaded = self.load().unwrap_or_else(|e| {
            tracing::warn!("Using default configuration: {}", e);
            RootConfig::default()
        });

        *self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(loaded.clone());
        loaded
    }

    /// Drops the cached value so the next read goes to disk.
    pub fn invalidate_cache(&self) {
        *self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    /// Reads `config.toml`, writing the defaults first if it does not exist.
    pub fn load(&self) -> Result<RootConfig> {
        let path = self.config_path()?;

        if !path.exists() {
            let default_config = RootConfig::default();
            write_atomic(&path, &toml::to_string_pretty(&default_config)?)?;
            tracing::info!("Created default configuration at {}", path.display());
            return Ok(default_config);
        }

        let content = fs::read_to_string(&path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Persists `config` and refreshes the cache.
    pub fn save(&self, config: &RootConfig) -> Result<()> {
        let path = self.config_path()?;
        write_atomic(&path, &toml::to_string_pretty(config)?)?;

        *self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(config.clone());
        Ok(())
    }

    fn config_path(&self) -> Result<PathBuf> {
        self.paths
            .config_file()
            .map_err(|e| StrataError::config(e.to_string()))
    }
}

fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| StrataError::io("Config path has no parent directory"))?;
    fs::create_dir_all(parent)?;

    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, content)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
