//! Strategy session domain model.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

use crate::i18n::TextKey;

/// Maximum number of screenshots attached to one diagnosis.
pub const MAX_SCREENSHOTS: usize = 5;

/// Kind of commercial opportunity being pursued.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, AsRefStr, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum OpportunityType {
    #[default]
    #[serde(rename = "")]
    #[strum(serialize = "")]
    Unset,
    #[serde(rename = "New Business")]
    #[strum(serialize = "New Business")]
    NewBusiness,
    #[serde(rename = "Upsell")]
    #[strum(serialize = "Upsell")]
    Upsell,
    #[serde(rename = "Cross-sell")]
    #[strum(serialize = "Cross-sell")]
    CrossSell,
}

/// Role media is expected to play in the engagement.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, AsRefStr, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum MediaRole {
    #[default]
    #[serde(rename = "")]
    #[strum(serialize = "")]
    Unset,
    #[serde(rename = "Brand")]
    #[strum(serialize = "Brand")]
    Brand,
    #[serde(rename = "Performance")]
    #[strum(serialize = "Performance")]
    Performance,
    #[serde(rename = "Retail Media")]
    #[strum(serialize = "Retail Media")]
    RetailMedia,
    #[serde(rename = "Mixed / Full Funnel")]
    #[strum(serialize = "Mixed / Full Funnel")]
    FullFunnel,
}

/// Client's digital maturity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, AsRefStr, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum DigitalMaturity {
    #[default]
    #[serde(rename = "")]
    #[strum(serialize = "")]
    Unset,
    #[serde(rename = "Low (Legacy / Siloed)")]
    #[strum(to_string = "Low (Legacy / Siloed)", serialize = "Low")]
    Low,
    #[serde(rename = "Mid (Developing / Hybrid)")]
    #[strum(to_string = "Mid (Developing / Hybrid)", serialize = "Mid")]
    Mid,
    #[serde(rename = "High (Data-Driven / Integrated)")]
    #[strum(to_string = "High (Data-Driven / Integrated)", serialize = "High")]
    High,
}

/// Consumer involvement in the purchase decision.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, AsRefStr, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum InvolvementLevel {
    #[default]
    #[serde(rename = "")]
    #[strum(serialize = "")]
    Unset,
    #[serde(rename = "High Involvement")]
    #[strum(serialize = "High Involvement")]
    High,
    #[serde(rename = "Medium Involvement")]
    #[strum(serialize = "Medium Involvement")]
    Medium,
    #[serde(rename = "Low Involvement")]
    #[strum(serialize = "Low Involvement")]
    Low,
}

/// Funnel stage where the target interaction typically happens.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, AsRefStr, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum FunnelStage {
    #[default]
    #[serde(rename = "")]
    #[strum(serialize = "")]
    Unset,
    Awareness,
    Consideration,
    Decision,
    Loyalty,
    Retention,
    Advocacy,
}

/// The strategic alternative picked by the user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, AsRefStr, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Alternative {
    #[default]
    #[serde(rename = "")]
    #[strum(serialize = "")]
    Unset,
    A,
    B,
    C,
}

/// Outcome of extracting text from the attached briefing file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum BriefingExtraction {
    /// No file attached, or the file was removed.
    #[default]
    NotAttempted,
    Extracted,
    /// The file type has no extractor; only the file name is kept.
    Unsupported,
    Failed {
        reason: String,
    },
}

/// An image attached as additional model input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Screenshot {
    pub name: String,
    pub mime_type: String,
    /// Base64 payload without the data URL prefix.
    pub data: String,
    /// `data:<mime>;base64,<data>`
    pub preview_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerContext {
    pub involvement: InvolvementLevel,
    pub funnel_stage: FunnelStage,
    pub barriers: String,
}

/// Structured and unstructured context about the client engagement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisInput {
    pub client_name: String,

    pub briefing_file_name: Option<String>,
    /// Extracted text; `None` when extraction was not possible.
    pub briefing_file_content: Option<String>,
    pub briefing_extraction: BriefingExtraction,
    pub manual_briefing_text: String,
    pub screenshots: Vec<Screenshot>,

    pub opportunity_type: OpportunityType,
    pub media_role: MediaRole,
    pub digital_maturity: DigitalMaturity,

    pub customer_type: String,
    pub market: String,
    pub sector: String,
    pub product_or_service: String,
    pub business_challenge: String,
    pub customer_challenge: String,
    pub consumer_context: ConsumerContext,
    pub current_strategy_attempt: String,
}

impl DiagnosisInput {
    /// True when there is something for briefing analysis to read.
    pub fn has_briefing_source(&self) -> bool {
        !self.manual_briefing_text.trim().is_empty()
            || self
                .briefing_file_name
                .as_deref()
                .is_some_and(|name| !name.trim().is_empty())
    }

    /// Mandatory fields for challenge formulation that are still empty, in form order.
    pub fn missing_formulation_fields(&self) -> Vec<DiagnosisField> {
        [
            (DiagnosisField::CustomerType, &self.customer_type),
            (DiagnosisField::Market, &self.market),
            (DiagnosisField::Sector, &self.sector),
            (DiagnosisField::BusinessChallenge, &self.business_challenge),
            (DiagnosisField::CustomerChallenge, &self.customer_challenge),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}

/// The strategic output of challenge formulation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulatedChallenge {
    pub strategic_alternative_a: String,
    pub strategic_alternative_b: String,
    pub strategic_alternative_c: String,
    pub selected_alternative: Alternative,

    pub cultural_tension: String,
    pub market_opportunity: String,
    pub consumer_insight: String,

    pub rumelt_diagnosis: String,
    pub rumelt_guiding_policy: String,

    pub behavioral_justification: String,
    pub key_assumptions: String,
    pub relevant_mental_models: String,
}

impl FormulatedChallenge {
    /// Both kernel fields are non-empty. Any content counts, whitespace included.
    pub fn is_kernel_formulated(&self) -> bool {
        !self.rumelt_diagnosis.is_empty() && !self.rumelt_guiding_policy.is_empty()
    }

    pub fn alternative(&self, which: Alternative) -> Option<&str> {
        match which {
            Alternative::A => Some(&self.strategic_alternative_a),
            Alternative::B => Some(&self.strategic_alternative_b),
            Alternative::C => Some(&self.strategic_alternative_c),
            Alternative::Unset => None,
        }
    }
}

/// One user's working engagement through all steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    /// Milliseconds since the Unix epoch.
    pub last_modified: i64,
    pub diagnosis: DiagnosisInput,
    pub challenge: FormulatedChallenge,
    pub generated_prompts: Vec<String>,
}

impl Session {
    /// Creates a session with all defaults.
    pub fn new(id: impl Into<String>, now_ms: i64) -> Self {
        Self {
            id: id.into(),
            last_modified: now_ms,
            diagnosis: DiagnosisInput::default(),
            challenge: FormulatedChallenge::default(),
            generated_prompts: Vec::new(),
        }
    }

    /// Advances `last_modified` to `now_ms`, or by one millisecond if the
    /// clock has not moved past the previous value.
    pub fn touch(&mut self, now_ms: i64) {
        self.last_modified = now_ms.max(self.last_modified + 1);
    }

    /// Whether the user has entered anything worth persisting.
    pub fn has_identifying_content(&self) -> bool {
        !self.diagnosis.client_name.trim().is_empty()
            || !self.diagnosis.business_challenge.trim().is_empty()
    }
}

/// Read projection used to list saved sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: String,
    pub client_name: String,
    pub business_challenge: String,
    pub last_modified: i64,
}

impl From<&Session> for HistoryRecord {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            client_name: session.diagnosis.client_name.clone(),
            business_challenge: session.diagnosis.business_challenge.clone(),
            last_modified: session.last_modified,
        }
    }
}

/// Editable diagnosis fields, addressed by their serialized name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum DiagnosisField {
    ClientName,
    ManualBriefingText,
    OpportunityType,
    MediaRole,
    DigitalMaturity,
    CustomerType,
    Market,
    Sector,
    ProductOrService,
    BusinessChallenge,
    CustomerChallenge,
    CurrentStrategyAttempt,
    Involvement,
    FunnelStage,
    Barriers,
}

impl DiagnosisField {
    /// Fields that live inside `consumerContext`.
    pub fn is_consumer_context(self) -> bool {
        matches!(self, Self::Involvement | Self::FunnelStage | Self::Barriers)
    }

    pub fn label_key(self) -> TextKey {
        match self {
            Self::ClientName => TextKey::LabelClientName,
            Self::ManualBriefingText => TextKey::LabelManualBriefing,
            Self::OpportunityType => TextKey::LabelOpportunityType,
            Self::MediaRole => TextKey::LabelMediaRole,
            Self::DigitalMaturity => TextKey::LabelDigitalMaturity,
            Self::CustomerType => TextKey::LabelCustomerType,
            Self::Market => TextKey::LabelMarketCategory,
            Self::Sector => TextKey::LabelSectorIndustry,
            Self::ProductOrService => TextKey::LabelProductService,
            Self::BusinessChallenge => TextKey::LabelBusinessChallenge,
            Self::CustomerChallenge => TextKey::LabelCustomerChallenge,
            Self::CurrentStrategyAttempt => TextKey::LabelCurrentStrategy,
            Self::Involvement => TextKey::LabelConsumerInvolvement,
            Self::FunnelStage => TextKey::LabelFunnelStage,
            Self::Barriers => TextKey::LabelConsumerBarriers,
        }
    }

    /// Current value of this field in `diagnosis`, as the user would type it.
    pub fn value_in(self, diagnosis: &DiagnosisInput) -> String {
        match self {
            Self::ClientName => diagnosis.client_name.clone(),
            Self::ManualBriefingText => diagnosis.manual_briefing_text.clone(),
            Self::OpportunityType => diagnosis.opportunity_type.as_ref().to_string(),
            Self::MediaRole => diagnosis.media_role.as_ref().to_string(),
            Self::DigitalMaturity => diagnosis.digital_maturity.as_ref().to_string(),
            Self::CustomerType => diagnosis.customer_type.clone(),
            Self::Market => diagnosis.market.clone(),
            Self::Sector => diagnosis.sector.clone(),
            Self::ProductOrService => diagnosis.product_or_service.clone(),
            Self::BusinessChallenge => diagnosis.business_challenge.clone(),
            Self::CustomerChallenge => diagnosis.customer_challenge.clone(),
            Self::CurrentStrategyAttempt => diagnosis.current_strategy_attempt.clone(),
            Self::Involvement => diagnosis.consumer_context.involvement.as_ref().to_string(),
            Self::FunnelStage => diagnosis.consumer_context.funnel_stage.as_ref().to_string(),
            Self::Barriers => diagnosis.consumer_context.barriers.clone(),
        }
    }
}

/// Editable challenge fields. The three alternatives are read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum ChallengeField {
    CulturalTension,
    MarketOpportunity,
    ConsumerInsight,
    RumeltDiagnosis,
    RumeltGuidingPolicy,
    BehavioralJustification,
    KeyAssumptions,
    RelevantMentalModels,
}

impl ChallengeField {
    pub fn label_key(self) -> TextKey {
        match self {
            Self::CulturalTension => TextKey::HeaderCulturalTension,
            Self::MarketOpportunity => TextKey::HeaderMarketOpportunity,
            Self::ConsumerInsight => TextKey::HeaderConsumerInsight,
            Self::RumeltDiagnosis => TextKey::HeaderRumeltDiagnosis,
            Self::RumeltGuidingPolicy => TextKey::HeaderRumeltGuidingPolicy,
            Self::BehavioralJustification => TextKey::HeaderBehavioralJustification,
            Self::KeyAssumptions => TextKey::HeaderKeyAssumptions,
            Self::RelevantMentalModels => TextKey::HeaderRelevantMentalModels,
        }
    }

    pub fn value_in(self, challenge: &FormulatedChallenge) -> &str {
        match self {
            Self::CulturalTension => &challenge.cultural_tension,
            Self::MarketOpportunity => &challenge.market_opportunity,
            Self::ConsumerInsight => &challenge.consumer_insight,
            Self::RumeltDiagnosis => &challenge.rumelt_diagnosis,
            Self::RumeltGuidingPolicy => &challenge.rumelt_guiding_policy,
            Self::BehavioralJustification => &challenge.behavioral_justification,
            Self::KeyAssumptions => &challenge.key_assumptions,
            Self::RelevantMentalModels => &challenge.relevant_mental_models,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session_serializes_every_key() {
        let session = Session::new("s1", 1_700_000_000_000);
        let value = serde_json::to_value(&session).unwrap();

        assert_eq!(value["id"], "s1");
        assert_eq!(value["lastModified"], 1_700_000_000_000i64);
        assert_eq!(value["diagnosis"]["clientName"], "");
        assert!(value["diagnosis"]["briefingFileName"].is_null());
        assert_eq!(value["diagnosis"]["consumerContext"]["funnelStage"], "");
        assert_eq!(value["diagnosis"]["briefingExtraction"]["status"], "notAttempted");
        assert_eq!(value["challenge"]["selectedAlternative"], "");
        assert_eq!(value["challenge"]["strategicAlternativeA"], "");
        assert_eq!(value["generatedPrompts"], serde_json::json!([]));
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_value(OpportunityType::CrossSell).unwrap(),
            "Cross-sell"
        );
        assert_eq!(
            serde_json::to_value(InvolvementLevel::High).unwrap(),
            "High Involvement"
        );
        assert_eq!(
            "mixed / full funnel".parse::<MediaRole>().unwrap(),
            MediaRole::FullFunnel
        );
        assert_eq!("mid".parse::<DigitalMaturity>().unwrap(), DigitalMaturity::Mid);
        assert_eq!(FunnelStage::Advocacy.as_ref(), "Advocacy");
    }

    #[test]
    fn test_touch_is_strictly_increasing() {
        let mut session = Session::new("s1", 1_000);
        session.touch(1_000);
        assert_eq!(session.last_modified, 1_001);
        session.touch(900);
        assert_eq!(session.last_modified, 1_002);
        session.touch(5_000);
        assert_eq!(session.last_modified, 5_000);
    }

    #[test]
    fn test_missing_formulation_fields() {
        let mut diagnosis = DiagnosisInput {
            market: "Retail".to_string(),
            sector: "Grocery".to_string(),
            ..Default::default()
        };
        assert_eq!(
            diagnosis.missing_formulation_fields(),
            vec![
                DiagnosisField::CustomerType,
                DiagnosisField::BusinessChallenge,
                DiagnosisField::CustomerChallenge
            ]
        );

        diagnosis.customer_type = "Families".to_string();
        diagnosis.business_challenge = "Share loss".to_string();
        diagnosis.customer_challenge = "Price fatigue".to_string();
        assert!(diagnosis.missing_formulation_fields().is_empty());
    }

    #[test]
    fn test_briefing_source() {
        let mut diagnosis = DiagnosisInput::default();
        assert!(!diagnosis.has_briefing_source());
        diagnosis.briefing_file_name = Some("brief.pptx".to_string());
        assert!(diagnosis.has_briefing_source());
    }

    #[test]
    fn test_kernel_formulated_requires_both_fields() {
        let mut challenge = FormulatedChallenge {
            rumelt_diagnosis: "x".to_string(),
            ..Default::default()
        };
        assert!(!challenge.is_kernel_formulated());
        challenge.rumelt_guiding_policy = "y".to_string();
        assert!(challenge.is_kernel_formulated());
    }

    #[test]
    fn test_kernel_accepts_whitespace_content() {
        let challenge = FormulatedChallenge {
            rumelt_diagnosis: "   ".to_string(),
            rumelt_guiding_policy: "\n".to_string(),
            ..Default::default()
        };
        assert!(challenge.is_kernel_formulated());
    }

    #[test]
    fn test_whitespace_formulation_field_is_not_missing() {
        let diagnosis = DiagnosisInput {
            customer_type: " ".to_string(),
            market: "Retail".to_string(),
            sector: "Grocery".to_string(),
            business_challenge: "Share loss".to_string(),
            customer_challenge: "Price fatigue".to_string(),
            ..Default::default()
        };
        assert!(diagnosis.missing_formulation_fields().is_empty());
    }

    #[test]
    fn test_field_names() {
        assert_eq!(
            "funnelStage".parse::<DiagnosisField>().unwrap(),
            DiagnosisField::FunnelStage
        );
        assert!(DiagnosisField::Barriers.is_consumer_context());
        assert!(!DiagnosisField::Market.is_consumer_context());
        assert_eq!(ChallengeField::RumeltGuidingPolicy.as_ref(), "rumeltGuidingPolicy");
    }
}
