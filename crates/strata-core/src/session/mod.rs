//! Strategy session domain: model, typed patches and the repository boundary.

mod model;
mod patch;
mod repository;

pub use model::{
    Alternative, BriefingExtraction, ChallengeField, ConsumerContext, DiagnosisField,
    DiagnosisInput, DigitalMaturity, FormulatedChallenge, FunnelStage, HistoryRecord,
    InvolvementLevel, MAX_SCREENSHOTS, MediaRole, OpportunityType, Screenshot, Session,
};
pub use patch::{ChallengePatch, ConsumerContextPatch, DiagnosisPatch, FieldError};
pub use repository::SessionRepository;
