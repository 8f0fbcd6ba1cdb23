pub mod config;
pub mod error;
pub mod extractor;
pub mod i18n;
pub mod kv;
pub mod provider;
pub mod secret;
pub mod session;
pub mod step;

// Re-export common error type
pub use error::StrataError;
