//! Versioned DTOs and migrator factories.
//!
//! DTOs are the persisted shape; the domain types in `strata-core` never
//! appear on disk directly.

mod secret;
mod session;

pub use secret::{SecretConfigV1_0_0, create_secret_migrator};
pub use session::{
    ChallengeV1_0_0, ConsumerContextV1_0_0, DiagnosisV1_0_0, DiagnosisV1_1_0,
    LEGACY_ERROR_CONTENT_PREFIX, LEGACY_ERROR_FILE_PREFIX, ScreenshotV1_0_0, SessionV1_0_0,
    SessionV1_1_0, create_session_migrator,
};
