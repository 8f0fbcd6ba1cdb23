//! Session DTOs and migrations
//!
//! ## Version History
//! - **1.0.0**: Shape written before records carried a version. A failed
//!   briefing extraction was encoded in the file name (`"Error parsing <name>"`)
//!   and content (`"Error: <reason>"`).
//! - **1.1.0**: Adds `diagnosis.briefingExtraction` with an explicit status.
//!
//! Guided-choice fields are stored as their display strings. Unknown strings
//! read back as unset rather than failing the whole record.

use serde::{Deserialize, Serialize};
use version_migrate::{FromDomain, IntoDomain, MigratesTo, Versioned};

use strata_core::session::{
    BriefingExtraction, ConsumerContext, DiagnosisInput, FormulatedChallenge, Screenshot,
    Session,
};

pub const LEGACY_ERROR_FILE_PREFIX: &str = "Error parsing ";
pub const LEGACY_ERROR_CONTENT_PREFIX: &str = "Error: ";

// ============================================================================
// Shared sub-DTOs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotV1_0_0 {
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    pub data: String,
    #[serde(default)]
    pub preview_url: String,
}

impl From<ScreenshotV1_0_0> for Screenshot {
    fn from(dto: ScreenshotV1_0_0) -> Self {
        let preview_url = if dto.preview_url.is_empty() {
            format!("data:{};base64,{}", dto.mime_type, dto.data)
        } else {
            dto.preview_url
        };
        Screenshot {
            name: dto.name,
            mime_type: dto.mime_type,
            data: dto.data,
            preview_url,
        }
    }
}

impl From<&Screenshot> for ScreenshotV1_0_0 {
    fn from(shot: &Screenshot) -> Self {
        ScreenshotV1_0_0 {
            name: shot.name.clone(),
            mime_type: shot.mime_type.clone(),
            data: shot.data.clone(),
            preview_url: shot.preview_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConsumerContextV1_0_0 {
    pub involvement: String,
    pub funnel_stage: String,
    pub barriers: String,
}

impl From<ConsumerContextV1_0_0> for ConsumerContext {
    fn from(dto: ConsumerContextV1_0_0) -> Self {
        ConsumerContext {
            involvement: parse_or_unset(&dto.involvement),
            funnel_stage: parse_or_unset(&dto.funnel_stage),
            barriers: dto.barriers,
        }
    }
}

impl From<&ConsumerContext> for ConsumerContextV1_0_0 {
    fn from(context: &ConsumerContext) -> Self {
        ConsumerContextV1_0_0 {
            involvement: context.involvement.as_ref().to_string(),
            funnel_stage: context.funnel_stage.as_ref().to_string(),
            barriers: context.barriers.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChallengeV1_0_0 {
    pub strategic_alternative_a: String,
    pub strategic_alternative_b: String,
    pub strategic_alternative_c: String,
    pub selected_alternative: String,
    pub cultural_tension: String,
    pub market_opportunity: String,
    pub consumer_insight: String,
    pub rumelt_diagnosis: String,
    pub rumelt_guiding_policy: String,
    pub behavioral_justification: String,
    pub key_assumptions: String,
    pub relevant_mental_models: String,
}

impl From<ChallengeV1_0_0> for FormulatedChallenge {
    fn from(dto: ChallengeV1_0_0) -> Self {
        FormulatedChallenge {
            strategic_alternative_a: dto.strategic_alternative_a,
            strategic_alternative_b: dto.strategic_alternative_b,
            strategic_alternative_c: dto.strategic_alternative_c,
            selected_alternative: parse_or_unset(&dto.selected_alternative),
            cultural_tension: dto.cultural_tension,
            market_opportunity: dto.market_opportunity,
            consumer_insight: dto.consumer_insight,
            rumelt_diagnosis: dto.rumelt_diagnosis,
            rumelt_guiding_policy: dto.rumelt_guiding_policy,
            behavioral_justification: dto.behavioral_justification,
            key_assumptions: dto.key_assumptions,
            relevant_mental_models: dto.relevant_mental_models,
        }
    }
}

impl From<&FormulatedChallenge> for ChallengeV1_0_0 {
    fn from(challenge: &FormulatedChallenge) -> Self {
        ChallengeV1_0_0 {
            strategic_alternative_a: challenge.strategic_alternative_a.clone(),
            strategic_alternative_b: challenge.strategic_alternative_b.clone(),
            strategic_alternative_c: challenge.strategic_alternative_c.clone(),
            selected_alternative: challenge.selected_alternative.as_ref().to_string(),
            cultural_tension: challenge.cultural_tension.clone(),
            market_opportunity: challenge.market_opportunity.clone(),
            consumer_insight: challenge.consumer_insight.clone(),
            rumelt_diagnosis: challenge.rumelt_diagnosis.clone(),
            rumelt_guiding_policy: challenge.rumelt_guiding_policy.clone(),
            behavioral_justification: challenge.behavioral_justification.clone(),
            key_assumptions: challenge.key_assumptions.clone(),
            relevant_mental_models: challenge.relevant_mental_models.clone(),
        }
    }
}

// ============================================================================
// Diagnosis DTOs
// ============================================================================

/// Diagnosis V1.0.0 (legacy, no extraction status)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiagnosisV1_0_0 {
    pub client_name: String,
    pub briefing_file_name: Option<String>,
    pub briefing_file_content: Option<String>,
    pub manual_briefing_text: String,
    pub screenshots: Vec<ScreenshotV1_0_0>,
    pub opportunity_type: String,
    pub media_role: String,
    pub digital_maturity: String,
    pub customer_type: String,
    pub market: String,
    pub sector: String,
    pub product_or_service: String,
    pub business_challenge: String,
    pub customer_challenge: String,
    pub consumer_context: ConsumerContextV1_0_0,
    pub current_strategy_attempt: String,
}

/// Extraction status as persisted from V1.1.0 on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum BriefingExtractionV1_1_0 {
    #[default]
    NotAttempted,
    Extracted,
    Unsupported,
    Failed {
        #[serde(default)]
        reason: String,
    },
}

impl From<BriefingExtractionV1_1_0> for BriefingExtraction {
    fn from(dto: BriefingExtractionV1_1_0) -> Self {
        match dto {
            BriefingExtractionV1_1_0::NotAttempted => BriefingExtraction::NotAttempted,
            BriefingExtractionV1_1_0::Extracted => BriefingExtraction::Extracted,
            BriefingExtractionV1_1_0::Unsupported => BriefingExtraction::Unsupported,
            BriefingExtractionV1_1_0::Failed { reason } => BriefingExtraction::Failed { reason },
        }
    }
}

impl From<&BriefingExtraction> for BriefingExtractionV1_1_0 {
    fn from(status: &BriefingExtraction) -> Self {
        match status {
            BriefingExtraction::NotAttempted => BriefingExtractionV1_1_0::NotAttempted,
            BriefingExtraction::Extracted => BriefingExtractionV1_1_0::Extracted,
            BriefingExtraction::Unsupported => BriefingExtractionV1_1_0::Unsupported,
            BriefingExtraction::Failed { reason } => BriefingExtractionV1_1_0::Failed {
                reason: reason.clone(),
            },
        }
    }
}

/// Diagnosis V1.1.0: adds `briefingExtraction`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiagnosisV1_1_0 {
    pub client_name: String,
    pub briefing_file_name: Option<String>,
    pub briefing_file_content: Option<String>,
    pub briefing_extraction: BriefingExtractionV1_1_0,
    pub manual_briefing_text: String,
    pub screenshots: Vec<ScreenshotV1_0_0>,
    pub opportunity_type: String,
    pub media_role: String,
    pub digital_maturity: String,
    pub customer_type: String,
    pub market: String,
    pub sector: String,
    pub product_or_service: String,
    pub business_challenge: String,
    pub customer_challenge: String,
    pub consumer_context: ConsumerContextV1_0_0,
    pub current_strategy_attempt: String,
}

impl From<DiagnosisV1_0_0> for DiagnosisV1_1_0 {
    fn from(legacy: DiagnosisV1_0_0) -> Self {
        let (briefing_file_name, briefing_file_content, briefing_extraction) =
            classify_legacy_briefing(legacy.briefing_file_name, legacy.briefing_file_content);

        DiagnosisV1_1_0 {
            client_name: legacy.client_name,
            briefing_file_name,
            briefing_file_content,
            briefing_extraction,
            manual_briefing_text: legacy.manual_briefing_text,
            screenshots: legacy.screenshots,
            opportunity_type: legacy.opportunity_type,
            media_role: legacy.media_role,
            digital_maturity: legacy.digital_maturity,
            customer_type: legacy.customer_type,
            market: legacy.market,
            sector: legacy.sector,
            product_or_service: legacy.product_or_service,
            business_challenge: legacy.business_challenge,
            customer_challenge: legacy.customer_challenge,
            consumer_context: legacy.consumer_context,
            current_strategy_attempt: legacy.current_strategy_attempt,
        }
    }
}

/// Derives the extraction status from the legacy file name/content pair.
///
/// A legacy failure restores the real file name and drops the error text
/// from the content, keeping it as the failure reason instead.
fn classify_legacy_briefing(
    name: Option<String>,
    content: Option<String>,
) -> (Option<String>, Option<String>, BriefingExtractionV1_1_0) {
    match name {
        Some(name) if name.starts_with(LEGACY_ERROR_FILE_PREFIX) => {
            let original = name[LEGACY_ERROR_FILE_PREFIX.len()..].to_string();
            let reason = content
                .map(|c| {
                    c.strip_prefix(LEGACY_ERROR_CONTENT_PREFIX)
                        .map(str::to_string)
                        .unwrap_or(c)
                })
                .unwrap_or_default();
            (
                Some(original),
                None,
                BriefingExtractionV1_1_0::Failed { reason },
            )
        }
        Some(name) if name.trim().is_empty() => (None, None, BriefingExtractionV1_1_0::NotAttempted),
        Some(name) => match content {
            Some(text) if !text.is_empty() => {
                (Some(name), Some(text), BriefingExtractionV1_1_0::Extracted)
            }
            _ => (Some(name), None, BriefingExtractionV1_1_0::Unsupported),
        },
        None => (None, content, BriefingExtractionV1_1_0::NotAttempted),
    }
}

impl From<DiagnosisV1_1_0> for DiagnosisInput {
    fn from(dto: DiagnosisV1_1_0) -> Self {
        DiagnosisInput {
            client_name: dto.client_name,
            briefing_file_name: dto.briefing_file_name,
            briefing_file_content: dto.briefing_file_content,
            briefing_extraction: dto.briefing_extraction.into(),
            manual_briefing_text: dto.manual_briefing_text,
            screenshots: dto.screenshots.into_iter().map(Into::into).collect(),
            opportunity_type: parse_or_unset(&dto.opportunity_type),
            media_role: parse_or_unset(&dto.media_role),
            digital_maturity: parse_or_unset(&dto.digital_maturity),
            customer_type: dto.customer_type,
            market: dto.market,
            sector: dto.sector,
            product_or_service: dto.product_or_service,
            business_challenge: dto.business_challenge,
            customer_challenge: dto.customer_challenge,
            consumer_context: dto.consumer_context.into(),
            current_strategy_attempt: dto.current_strategy_attempt,
        }
    }
}

impl From<&DiagnosisInput> for DiagnosisV1_1_0 {
    fn from(diagnosis: &DiagnosisInput) -> Self {
        DiagnosisV1_1_0 {
            client_name: diagnosis.client_name.clone(),
            briefing_file_name: diagnosis.briefing_file_name.clone(),
            briefing_file_content: diagnosis.briefing_file_content.clone(),
            briefing_extraction: (&diagnosis.briefing_extraction).into(),
            manual_briefing_text: diagnosis.manual_briefing_text.clone(),
            screenshots: diagnosis.screenshots.iter().map(Into::into).collect(),
            opportunity_type: diagnosis.opportunity_type.as_ref().to_string(),
            media_role: diagnosis.media_role.as_ref().to_string(),
            digital_maturity: diagnosis.digital_maturity.as_ref().to_string(),
            customer_type: diagnosis.customer_type.clone(),
            market: diagnosis.market.clone(),
            sector: diagnosis.sector.clone(),
            product_or_service: diagnosis.product_or_service.clone(),
            business_challenge: diagnosis.business_challenge.clone(),
            customer_challenge: diagnosis.customer_challenge.clone(),
            consumer_context: (&diagnosis.consumer_context).into(),
            current_strategy_attempt: diagnosis.current_strategy_attempt.clone(),
        }
    }
}

// ============================================================================
// Session DTOs
// ============================================================================

/// Session V1.0.0 (legacy, unversioned on disk)
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
#[serde(rename_all = "camelCase")]
pub struct SessionV1_0_0 {
    pub id: String,
    pub last_modified: i64,
    /// Required: a record without a diagnosis object is not a session.
    pub diagnosis: DiagnosisV1_0_0,
    #[serde(default)]
    pub challenge: ChallengeV1_0_0,
    #[serde(default)]
    pub generated_prompts: Vec<String>,
}

/// Session V1.1.0: explicit briefing extraction status
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.1.0")]
#[serde(rename_all = "camelCase")]
pub struct SessionV1_1_0 {
    pub id: String,
    pub last_modified: i64,
    pub diagnosis: DiagnosisV1_1_0,
    #[serde(default)]
    pub challenge: ChallengeV1_0_0,
    #[serde(default)]
    pub generated_prompts: Vec<String>,
}

impl MigratesTo<SessionV1_1_0> for SessionV1_0_0 {
    fn migrate(self) -> SessionV1_1_0 {
        SessionV1_1_0 {
            id: self.id,
            last_modified: self.last_modified,
            diagnosis: self.diagnosis.into(),
            challenge: self.challenge,
            generated_prompts: self.generated_prompts,
        }
    }
}

impl IntoDomain<Session> for SessionV1_1_0 {
    fn into_domain(self) -> Session {
        Session {
            id: self.id,
            last_modified: self.last_modified,
            diagnosis: self.diagnosis.into(),
            challenge: self.challenge.into(),
            generated_prompts: self.generated_prompts,
        }
    }
}

impl FromDomain<Session> for SessionV1_1_0 {
    fn from_domain(session: Session) -> Self {
        SessionV1_1_0 {
            diagnosis: (&session.diagnosis).into(),
            challenge: (&session.challenge).into(),
            id: session.id,
            last_modified: session.last_modified,
            generated_prompts: session.generated_prompts,
        }
    }
}

fn parse_or_unset<E>(raw: &str) -> E
where
    E: std::str::FromStr + Default,
{
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::debug!("Unrecognized stored choice '{}', reading as unset", raw);
            E::default()
        }
    }
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Creates a Migrator for Session entities.
///
/// Migration path: V1.0.0 → V1.1.0 → Session
pub fn create_session_migrator() -> version_migrate::Migrator {
    let mut migrator = version_migrate::Migrator::builder().build();

    let session_path = version_migrate::Migrator::define("session")
        .from::<SessionV1_0_0>()
        .step::<SessionV1_1_0>()
        .into_with_save::<Session>();

    migrator
        .register(session_path)
        .expect("Failed to register session migration path");

    migrator
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use strata_core::session::{Alternative, FunnelStage, MediaRole};

    fn legacy_record(file_name: serde_json::Value, content: serde_json::Value) -> serde_json::Value {
        json!({
            "version": "1.0.0",
            "id": "legacy",
            "lastModified": 1_700_000_000_000i64,
            "diagnosis": {
                "clientName": "Acme",
                "briefingFileName": file_name,
                "briefingFileContent": content,
                "manualBriefingText": "",
                "screenshots": [],
                "mediaRole": "Retail Media",
                "consumerContext": { "involvement": "", "funnelStage": "Loyalty", "barriers": "" }
            },
            "challenge": { "selectedAlternative": "B", "rumeltDiagnosis": "root cause" },
            "generatedPrompts": ["one"]
        })
    }

    #[test]
    fn test_legacy_record_loads() {
        let migrator = create_session_migrator();
        let session: Session = migrator
            .load_flat_from("session", legacy_record(json!(null), json!(null)))
            .unwrap();

        assert_eq!(session.id, "legacy");
        assert_eq!(session.diagnosis.media_role, MediaRole::RetailMedia);
        assert_eq!(session.diagnosis.consumer_context.funnel_stage, FunnelStage::Loyalty);
        assert_eq!(session.challenge.selected_alternative, Alternative::B);
        assert_eq!(session.challenge.rumelt_diagnosis, "root cause");
        assert_eq!(session.challenge.cultural_tension, "");
        assert_eq!(session.diagnosis.briefing_extraction, BriefingExtraction::NotAttempted);
    }

    #[test]
    fn test_legacy_failure_encoding_becomes_status() {
        let migrator = create_session_migrator();
        let session: Session = migrator
            .load_flat_from(
                "session",
                legacy_record(
                    json!("Error parsing brief.pdf"),
                    json!("Error: bad xref table"),
                ),
            )
            .unwrap();

        assert_eq!(session.diagnosis.briefing_file_name.as_deref(), Some("brief.pdf"));
        assert!(session.diagnosis.briefing_file_content.is_none());
        assert_eq!(
            session.diagnosis.briefing_extraction,
            BriefingExtraction::Failed {
                reason: "bad xref table".to_string()
            }
        );
    }

    #[test]
    fn test_legacy_extracted_and_unsupported() {
        assert_eq!(
            classify_legacy_briefing(Some("a.txt".into()), Some("body".into())).2,
            BriefingExtractionV1_1_0::Extracted
        );
        assert_eq!(
            classify_legacy_briefing(Some("deck.pptx".into()), None).2,
            BriefingExtractionV1_1_0::Unsupported
        );
    }

    #[test]
    fn test_unknown_choice_reads_as_unset() {
        let mut record = legacy_record(json!(null), json!(null));
        record["diagnosis"]["mediaRole"] = json!("Radio");
        let session: Session = create_session_migrator()
            .load_flat_from("session", record)
            .unwrap();
        assert_eq!(session.diagnosis.media_role, MediaRole::Unset);
    }

    #[test]
    fn test_record_without_diagnosis_is_rejected() {
        let record = json!({ "version": "1.0.0", "id": "x", "lastModified": 1 });
        let result: Result<Session, _> = create_session_migrator().load_flat_from("session", record);
        assert!(result.is_err());
    }

    #[test]
    fn test_save_writes_latest_version() {
        let migrator = create_session_migrator();
        let mut session = Session::new("s1", 42);
        session.diagnosis.briefing_file_name = Some("deck.pptx".to_string());
        session.diagnosis.briefing_extraction = BriefingExtraction::Unsupported;

        let saved = migrator.save_domain_flat("session", session.clone()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&saved).unwrap();

        assert_eq!(value["version"], "1.1.0");
        assert_eq!(value["lastModified"], 42);
        assert_eq!(value["diagnosis"]["briefingExtraction"]["status"], "unsupported");

        let reloaded: Session = migrator.load_flat_from("session", value).unwrap();
        assert_eq!(reloaded, session);
    }
}
