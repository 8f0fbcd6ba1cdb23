//! Typed partial updates for session slices.
//!
//! Every field is optional; `None` leaves the target untouched. The merge
//! functions destructure the patch exhaustively, so adding a field to a patch
//! without handling it is a compile error.

use thiserror::Error;

use super::model::{
    Alternative, BriefingExtraction, ChallengeField, ConsumerContext, DiagnosisField,
    DiagnosisInput, DigitalMaturity, FormulatedChallenge, FunnelStage, InvolvementLevel,
    MediaRole, OpportunityType, Screenshot,
};

/// Error produced when a raw field value cannot be routed into a patch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Invalid value '{value}' for {field}; expected one of: {allowed}")]
    InvalidValue {
        field: String,
        value: String,
        allowed: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumerContextPatch {
    pub involvement: Option<InvolvementLevel>,
    pub funnel_stage: Option<FunnelStage>,
    pub barriers: Option<String>,
}

impl ConsumerContextPatch {
    pub fn apply(self, target: &mut ConsumerContext) {
        let ConsumerContextPatch {
            involvement,
            funnel_stage,
            barriers,
        } = self;

        set(&mut target.involvement, involvement);
        set(&mut target.funnel_stage, funnel_stage);
        set(&mut target.barriers, barriers);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosisPatch {
    pub client_name: Option<String>,
    /// `Some(None)` clears the attached file name.
    pub briefing_file_name: Option<Option<String>>,
    pub briefing_file_content: Option<Option<String>>,
    pub briefing_extraction: Option<BriefingExtraction>,
    pub manual_briefing_text: Option<String>,
    pub screenshots: Option<Vec<Screenshot>>,
    pub opportunity_type: Option<OpportunityType>,
    pub media_role: Option<MediaRole>,
    pub digital_maturity: Option<DigitalMaturity>,
    pub customer_type: Option<String>,
    pub market: Option<String>,
    pub sector: Option<String>,
    pub product_or_service: Option<String>,
    pub business_challenge: Option<String>,
    pub customer_challenge: Option<String>,
    /// Merged one level deeper than the other fields.
    pub consumer_context: Option<ConsumerContextPatch>,
    pub current_strategy_attempt: Option<String>,
}

impl DiagnosisPatch {
    /// Merges the patch into `target`.
    pub fn apply(self, target: &mut DiagnosisInput) {
        let DiagnosisPatch {
            client_name,
            briefing_file_name,
            briefing_file_content,
            briefing_extraction,
            manual_briefing_text,
            screenshots,
            opportunity_type,
            media_role,
            digital_maturity,
            customer_type,
            market,
            sector,
            product_or_service,
            business_challenge,
            customer_challenge,
            consumer_context,
            current_strategy_attempt,
        } = self;

        set(&mut target.client_name, client_name);
        set(&mut target.briefing_file_name, briefing_file_name);
        set(&mut target.briefing_file_content, briefing_file_content);
        set(&mut target.briefing_extraction, briefing_extraction);
        set(&mut target.manual_briefing_text, manual_briefing_text);
        set(&mut target.screenshots, screenshots);
        set(&mut target.opportunity_type, opportunity_type);
        set(&mut target.media_role, media_role);
        set(&mut target.digital_maturity, digital_maturity);
        set(&mut target.customer_type, customer_type);
        set(&mut target.market, market);
        set(&mut target.sector, sector);
        set(&mut target.product_or_service, product_or_service);
        set(&mut target.business_challenge, business_challenge);
        set(&mut target.customer_challenge, customer_challenge);
        if let Some(nested) = consumer_context {
            nested.apply(&mut target.consumer_context);
        }
        set(&mut target.current_strategy_attempt, current_strategy_attempt);
    }

    /// Builds a single-field patch from a field name and a raw value.
    ///
    /// Consumer context fields are routed into the nested patch. Guided enum
    /// fields accept their display names case-insensitively; an empty value
    /// resets them to unset.
    pub fn for_field(field: DiagnosisField, value: &str) -> Result<Self, FieldError> {
        let text = Some(value.to_string());
        let mut patch = Self::default();

        match field {
            DiagnosisField::ClientName => patch.client_name = text,
            DiagnosisField::ManualBriefingText => patch.manual_briefing_text = text,
            DiagnosisField::OpportunityType => {
                patch.opportunity_type = Some(parse_choice(field, value)?)
            }
            DiagnosisField::MediaRole => patch.media_role = Some(parse_choice(field, value)?),
            DiagnosisField::DigitalMaturity => {
                patch.digital_maturity = Some(parse_choice(field, value)?)
            }
            DiagnosisField::CustomerType => patch.customer_type = text,
            DiagnosisField::Market => patch.market = text,
            DiagnosisField::Sector => patch.sector = text,
            DiagnosisField::ProductOrService => patch.product_or_service = text,
            DiagnosisField::BusinessChallenge => patch.business_challenge = text,
            DiagnosisField::CustomerChallenge => patch.customer_challenge = text,
            DiagnosisField::CurrentStrategyAttempt => patch.current_strategy_attempt = text,
            DiagnosisField::Involvement => {
                patch.consumer_context = Some(ConsumerContextPatch {
                    involvement: Some(parse_choice(field, value)?),
                    ..Default::default()
                })
            }
            DiagnosisField::FunnelStage => {
                patch.consumer_context = Some(ConsumerContextPatch {
                    funnel_stage: Some(parse_choice(field, value)?),
                    ..Default::default()
                })
            }
            DiagnosisField::Barriers => {
                patch.consumer_context = Some(ConsumerContextPatch {
                    barriers: text,
                    ..Default::default()
                })
            }
        }
        Ok(patch)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChallengePatch {
    pub strategic_alternative_a: Option<String>,
    pub strategic_alternative_b: Option<String>,
    pub strategic_alternative_c: Option<String>,
    pub selected_alternative: Option<Alternative>,
    pub cultural_tension: Option<String>,
    pub market_opportunity: Option<String>,
    pub consumer_insight: Option<String>,
    pub rumelt_diagnosis: Option<String>,
    pub rumelt_guiding_policy: Option<String>,
    pub behavioral_justification: Option<String>,
    pub key_assumptions: Option<String>,
    pub relevant_mental_models: Option<String>,
}

impl ChallengePatch {
    pub fn apply(self, target: &mut FormulatedChallenge) {
        let ChallengePatch {
            strategic_alternative_a,
            strategic_alternative_b,
            strategic_alternative_c,
            selected_alternative,
            cultural_tension,
            market_opportunity,
            consumer_insight,
            rumelt_diagnosis,
            rumelt_guiding_policy,
            behavioral_justification,
            key_assumptions,
            relevant_mental_models,
        } = self;

        set(&mut target.strategic_alternative_a, strategic_alternative_a);
        set(&mut target.strategic_alternative_b, strategic_alternative_b);
        set(&mut target.strategic_alternative_c, strategic_alternative_c);
        set(&mut target.selected_alternative, selected_alternative);
        set(&mut target.cultural_tension, cultural_tension);
        set(&mut target.market_opportunity, market_opportunity);
        set(&mut target.consumer_insight, consumer_insight);
        set(&mut target.rumelt_diagnosis, rumelt_diagnosis);
        set(&mut target.rumelt_guiding_policy, rumelt_guiding_policy);
        set(&mut target.behavioral_justification, behavioral_justification);
        set(&mut target.key_assumptions, key_assumptions);
        set(&mut target.relevant_mental_models, relevant_mental_models);
    }

    /// Builds a single-field patch for a user edit.
    pub fn for_field(field: ChallengeField, value: &str) -> Self {
        let text = Some(value.to_string());
        let mut patch = Self::default();
        match field {
            ChallengeField::CulturalTension => patch.cultural_tension = text,
            ChallengeField::MarketOpportunity => patch.market_opportunity = text,
            ChallengeField::ConsumerInsight => patch.consumer_insight = text,
            ChallengeField::RumeltDiagnosis => patch.rumelt_diagnosis = text,
            ChallengeField::RumeltGuidingPolicy => patch.rumelt_guiding_policy = text,
            ChallengeField::BehavioralJustification => patch.behavioral_justification = text,
            ChallengeField::KeyAssumptions => patch.key_assumptions = text,
            ChallengeField::RelevantMentalModels => patch.relevant_mental_models = text,
        }
        patch
    }
}

/// A full replacement expressed as a patch.
impl From<FormulatedChallenge> for ChallengePatch {
    fn from(challenge: FormulatedChallenge) -> Self {
        Self {
            strategic_alternative_a: Some(challenge.strategic_alternative_a),
            strategic_alternative_b: Some(challenge.strategic_alternative_b),
            strategic_alternative_c: Some(challenge.strategic_alternative_c),
            selected_alternative: Some(challenge.selected_alternative),
            cultural_tension: Some(challenge.cultural_tension),
            market_opportunity: Some(challenge.market_opportunity),
            consumer_insight: Some(challenge.consumer_insight),
            rumelt_diagnosis: Some(challenge.rumelt_diagnosis),
            rumelt_guiding_policy: Some(challenge.rumelt_guiding_policy),
            behavioral_justification: Some(challenge.behavioral_justification),
            key_assumptions: Some(challenge.key_assumptions),
            relevant_mental_models: Some(challenge.relevant_mental_models),
        }
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn parse_choice<E>(field: DiagnosisField, value: &str) -> Result<E, FieldError>
where
    E: std::str::FromStr + AsRef<str> + strum::IntoEnumIterator,
{
    value.trim().parse::<E>().map_err(|_| FieldError::InvalidValue {
        field: field.as_ref().to_string(),
        value: value.to_string(),
        allowed: E::iter()
            .map(|choice| choice.as_ref().to_string())
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DiagnosisInput {
        DiagnosisInput {
            client_name: "Acme".to_string(),
            market: "Retail".to_string(),
            consumer_context: ConsumerContext {
                involvement: InvolvementLevel::Low,
                funnel_stage: FunnelStage::Decision,
                barriers: "price".to_string(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_apply_only_touches_patched_fields() {
        let mut diagnosis = sample();
        let before = diagnosis.clone();

        DiagnosisPatch {
            sector: Some("Grocery".to_string()),
            ..Default::default()
        }
        .apply(&mut diagnosis);

        assert_eq!(diagnosis.sector, "Grocery");
        assert_eq!(diagnosis.client_name, before.client_name);
        assert_eq!(diagnosis.market, before.market);
        assert_eq!(diagnosis.consumer_context, before.consumer_context);
    }

    #[test]
    fn test_nested_consumer_context_merge() {
        let mut diagnosis = sample();
        DiagnosisPatch::for_field(DiagnosisField::FunnelStage, "awareness")
            .unwrap()
            .apply(&mut diagnosis);

        assert_eq!(diagnosis.consumer_context.funnel_stage, FunnelStage::Awareness);
        assert_eq!(diagnosis.consumer_context.involvement, InvolvementLevel::Low);
        assert_eq!(diagnosis.consumer_context.barriers, "price");
    }

    #[test]
    fn test_for_field_rejects_unknown_choice() {
        let err = DiagnosisPatch::for_field(DiagnosisField::MediaRole, "Radio").unwrap_err();
        match err {
            FieldError::InvalidValue { allowed, .. } => {
                assert!(allowed.contains("Retail Media"));
                assert!(!allowed.starts_with(", "));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_choice_resets_to_unset() {
        let mut diagnosis = DiagnosisInput {
            opportunity_type: OpportunityType::Upsell,
            ..Default::default()
        };
        DiagnosisPatch::for_field(DiagnosisField::OpportunityType, "")
            .unwrap()
            .apply(&mut diagnosis);
        assert_eq!(diagnosis.opportunity_type, OpportunityType::Unset);
    }

    #[test]
    fn test_clear_briefing_file() {
        let mut diagnosis = DiagnosisInput {
            briefing_file_name: Some("brief.pdf".to_string()),
            ..Default::default()
        };
        DiagnosisPatch {
            briefing_file_name: Some(None),
            ..Default::default()
        }
        .apply(&mut diagnosis);
        assert!(diagnosis.briefing_file_name.is_none());
    }

    #[test]
    fn test_challenge_full_replacement() {
        let mut challenge = FormulatedChallenge {
            key_assumptions: "old".to_string(),
            ..Default::default()
        };
        let next = FormulatedChallenge {
            rumelt_diagnosis: "d".to_string(),
            selected_alternative: Alternative::C,
            ..Default::default()
        };
        ChallengePatch::from(next.clone()).apply(&mut challenge);
        assert_eq!(challenge, next);
    }

    #[test]
    fn test_challenge_field_edit() {
        let mut challenge = FormulatedChallenge {
            strategic_alternative_a: "bold".to_string(),
            ..Default::default()
        };
        ChallengePatch::for_field(ChallengeField::RumeltGuidingPolicy, "focus")
            .apply(&mut challenge);
        assert_eq!(challenge.rumelt_guiding_policy, "focus");
        assert_eq!(challenge.strategic_alternative_a, "bold");
    }
}
