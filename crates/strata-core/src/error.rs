//! Error type shared by the domain, persistence and configuration layers.
//!
//! Gateway and workbench failures have their own taxonomies in
//! `strata-application`; `StrataError` covers everything underneath them.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum StrataError {
    /// A lookup by id found nothing.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("I/O failure: {0}")]
    Io(String),

    /// The key-value substrate or repository rejected the operation.
    #[error("Storage failure: {0}")]
    DataAccess(String),

    /// A record could not be encoded or decoded. `format` is "JSON" or "TOML".
    #[error("Invalid {format} data: {message}")]
    Serialization { format: &'static str, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A stored record could not be brought up to the current schema.
    #[error("Schema migration failed: {0}")]
    Migration(String),

    #[error("Unexpected failure: {0}")]
    Internal(String),
}

impl StrataError {
    // ============================================================================
    // Constructors
    // ============================================================================

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { kind, id: id.into() }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }

    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    pub fn serialization(format: &'static str, message: impl Into<String>) -> Self {
        Self::Serialization {
            format,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn migration(message: impl Into<String>) -> Self {
        Self::Migration(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Classification
    // ============================================================================

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}

impl From<std::io::Error> for StrataError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(format!("{} ({:?})", e, e.kind()))
    }
}

impl From<serde_json::Error> for StrataError {
    fn from(e: serde_json::Error) -> Self {
        Self::serialization("JSON", e.to_string())
    }
}

impl From<toml::de::Error> for StrataError {
    fn from(e: toml::de::Error) -> Self {
        Self::serialization("TOML", e.to_string())
    }
}

impl From<toml::ser::Error> for StrataError {
    fn from(e: toml::ser::Error) -> Self {
        Self::serialization("TOML", e.to_string())
    }
}

impl From<version_migrate::MigrationError> for StrataError {
    fn from(e: version_migrate::MigrationError) -> Self {
        match e {
            version_migrate::MigrationError::EntityNotFound(entity) => {
                Self::not_found("record", entity)
            }
            version_migrate::MigrationError::DeserializationError(_)
            | version_migrate::MigrationError::SerializationError(_) => {
                Self::serialization("JSON", e.to_string())
            }
            other => Self::Migration(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, StrataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion_keeps_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StrataError = io.into();
        assert!(err.is_io());
        assert!(err.to_string().contains("PermissionDenied"));
    }

    #[test]
    fn test_json_error_conversion() {
        let err: StrataError = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert!(err.is_serialization());
        assert!(err.to_string().starts_with("Invalid JSON data"));
    }

    #[test]
    fn test_not_found_display() {
        let err = StrataError::not_found("session", "s1");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "session 's1' not found");
    }
}
