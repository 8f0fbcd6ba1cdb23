pub mod config_service;
pub mod document_extractor;
pub mod dto;
pub mod kv;
pub mod kv_session_repository;
pub mod paths;
pub mod secret_service;

pub use crate::config_service::ConfigService;
pub use crate::document_extractor::BuiltinDocumentExtractor;
pub use crate::kv::{FileKeyValueStore, MemoryKeyValueStore};
pub use crate::kv_session_repository::KvSessionRepository;
pub use crate::paths::StrataPaths;
pub use crate::secret_service::SecretServiceImpl;
