//! AI Gateway: the four model-backed operations.
//!
//! Each operation checks its preconditions before touching the provider,
//! builds a task-specific instruction set, makes exactly one provider call and
//! validates the answer into a typed result. Nothing is retried here.

pub mod prompts;
pub mod repair;
pub mod schema;
pub mod sections;

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use strata_core::config::GatewayConfig;
use strata_core::i18n::{Language, TextCatalog, TextKey};
use strata_core::provider::{
    GroundingSource, InlineImage, ModelProvider, ModelRequest, ProviderError,
};
use strata_core::session::{
    Alternative, ConsumerContextPatch, DiagnosisField, DiagnosisInput, DiagnosisPatch,
    FormulatedChallenge, FunnelStage, InvolvementLevel,
};

use self::prompts::{CHALLENGE_HEADINGS, OutputShape, PromptBuilder, Task};
use self::repair::{JsonShape, repair_json};
use self::sections::parse_sections;

/// Maximum number of phrasings returned by `suggest_field_text`.
pub const MAX_SUGGESTIONS: usize = 5;

/// An action refused before any provider call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("Client name is required")]
    MissingClientName,

    #[error("A briefing text or file is required")]
    MissingBriefingSource,

    #[error("Diagnosis is incomplete; missing: {}", field_names(missing))]
    DiagnosisIncomplete { missing: Vec<DiagnosisField> },

    #[error("The strategic kernel has not been formulated")]
    ChallengeNotFormulated,
}

fn field_names(fields: &[DiagnosisField]) -> String {
    fields
        .iter()
        .map(|field| field.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}

impl PreconditionError {
    pub fn text_key(&self) -> TextKey {
        match self {
            PreconditionError::MissingClientName => TextKey::ErrorMissingClientName,
            PreconditionError::MissingBriefingSource => TextKey::ErrorMissingBriefingSource,
            PreconditionError::DiagnosisIncomplete { .. } => TextKey::ErrorDiagnosisFieldsMissing,
            PreconditionError::ChallengeNotFormulated => TextKey::ErrorChallengeNotFormulated,
        }
    }

    /// The user-facing message, with missing fields named by their labels.
    pub fn localized(&self, catalog: &TextCatalog, lang: Language) -> String {
        match self {
            PreconditionError::DiagnosisIncomplete { missing } => {
                let labels = missing
                    .iter()
                    .map(|field| catalog.get(lang, field.label_key()))
                    .collect::<Vec<_>>()
                    .join(", ");
                catalog.format(lang, self.text_key(), &[("fields", &labels)])
            }
            _ => catalog.get(lang, self.text_key()),
        }
    }
}

/// Failure of a gateway operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Missing credential or unusable request. Fatal until fixed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The model answered with something that cannot be used.
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    /// Network or provider failure.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Precondition(#[from] PreconditionError),
}

impl GatewayError {
    /// Message key shown to the user. Everything but a precondition is generic.
    pub fn text_key(&self) -> TextKey {
        match self {
            GatewayError::Precondition(precondition) => precondition.text_key(),
            _ => TextKey::ErrorGeneric,
        }
    }

    pub fn is_precondition(&self) -> bool {
        matches!(self, GatewayError::Precondition(_))
    }
}

impl From<ProviderError> for GatewayError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::MissingCredential | ProviderError::InvalidRequest(_) => {
                GatewayError::Configuration(err.to_string())
            }
            ProviderError::Transport { .. } | ProviderError::EmptyResponse => {
                GatewayError::Transport(err.to_string())
            }
        }
    }
}

impl From<minijinja::Error> for GatewayError {
    fn from(err: minijinja::Error) -> Self {
        GatewayError::Configuration(format!("Prompt template failed: {}", err))
    }
}

/// Model selection and mode switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySettings {
    pub model: String,
    /// Model for best-effort field suggestions.
    pub fast_model: String,
    /// Ground formulation with web search, using the text contract.
    pub search_grounding: bool,
}

impl From<&GatewayConfig> for GatewaySettings {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            model: config.model.clone(),
            fast_model: config.fast_model.clone(),
            search_grounding: config.search_grounding,
        }
    }
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self::from(&GatewayConfig::default())
    }
}

/// Result of challenge formulation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Formulation {
    pub challenge: FormulatedChallenge,
    /// Web sources when search grounding was used. Shown, never persisted.
    pub sources: Vec<GroundingSource>,
}

/// The four model-backed operations over one injected provider.
pub struct AiGateway {
    provider: Arc<dyn ModelProvider>,
    settings: GatewaySettings,
    prompts: PromptBuilder,
}

impl AiGateway {
    pub fn new(provider: Arc<dyn ModelProvider>, settings: GatewaySettings) -> Self {
        Self {
            provider,
            settings,
            prompts: PromptBuilder::new(),
        }
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    /// Deduces the context fields from the briefing material.
    ///
    /// # Returns
    ///
    /// - `Ok(DiagnosisPatch)`: Only the deduced fields; identity and raw
    ///   source fields are never touched. Fields the model left blank are
    ///   absent from the patch.
    /// - `Err(GatewayError::Precondition(_))`: No client name or no briefing source
    /// - `Err(_)`: Provider failure or unusable answer
    pub async fn analyze_briefing(
        &self,
        diagnosis: &DiagnosisInput,
        lang: Language,
    ) -> Result<DiagnosisPatch, GatewayError> {
        if diagnosis.client_name.trim().is_empty() {
            return Err(PreconditionError::MissingClientName.into());
        }
        if !diagnosis.has_briefing_source() {
            return Err(PreconditionError::MissingBriefingSource.into());
        }

        let request = ModelRequest::new(
            &self.settings.model,
            self.prompts.briefing_analysis(diagnosis)?,
        )
        .with_system_instruction(self.prompts.system_instruction(
            Task::BriefingAnalysis,
            lang,
            OutputShape::JsonObject,
        ))
        .with_images(inline_images(diagnosis))
        .with_response_schema(schema::briefing_analysis_schema());

        let response = self.call("analyze_briefing", request).await?;
        let value = repair_json(&response.text, JsonShape::Object).ok_or_else(|| {
            malformed("analyze_briefing", "briefing analysis is not a JSON object", &response.text)
        })?;

        let patch = briefing_patch(&value);
        tracing::info!("Briefing analysis deduced fields for '{}'", diagnosis.client_name);
        Ok(patch)
    }

    /// Formulates alternatives, context blocks, kernel and rationale.
    ///
    /// The selected alternative defaults to C, the synthesis.
    pub async fn formulate_challenge(
        &self,
        diagnosis: &DiagnosisInput,
        lang: Language,
    ) -> Result<Formulation, GatewayError> {
        let missing = diagnosis.missing_formulation_fields();
        if !missing.is_empty() {
            return Err(PreconditionError::DiagnosisIncomplete { missing }.into());
        }

        let grounded = self.settings.search_grounding;
        let shape = if grounded {
            OutputShape::Sections
        } else {
            OutputShape::JsonObject
        };

        let mut request = ModelRequest::new(
            &self.settings.model,
            self.prompts.challenge_formulation(diagnosis, grounded)?,
        )
        .with_system_instruction(self.prompts.system_instruction(
            Task::ChallengeFormulation,
            lang,
            shape,
        ))
        .with_images(inline_images(diagnosis));
        request = if grounded {
            request.with_search_augmentation()
        } else {
            request.with_response_schema(schema::challenge_schema())
        };

        let response = self.call("formulate_challenge", request).await?;

        let mut challenge = if grounded {
            challenge_from_sections(&response.text)
        } else {
            let value = repair_json(&response.text, JsonShape::Object).ok_or_else(|| {
                malformed("formulate_challenge", "formulation is not a JSON object", &response.text)
            })?;
            challenge_from_json(&value)
        };
        challenge.selected_alternative = Alternative::C;

        tracing::info!(
            "Challenge formulated for '{}' ({} grounding sources)",
            diagnosis.client_name,
            response.grounding.len()
        );
        Ok(Formulation {
            challenge,
            sources: response.grounding,
        })
    }

    /// Generates avenues of strategic investigation from the kernel.
    ///
    /// Refuses without calling the provider unless both kernel fields are set.
    pub async fn generate_avenues(
        &self,
        challenge: &FormulatedChallenge,
        diagnosis: &DiagnosisInput,
        lang: Language,
    ) -> Result<Vec<String>, GatewayError> {
        if !challenge.is_kernel_formulated() {
            return Err(PreconditionError::ChallengeNotFormulated.into());
        }

        let request = ModelRequest::new(
            &self.settings.model,
            self.prompts.avenues(challenge, diagnosis)?,
        )
        .with_system_instruction(self.prompts.system_instruction(
            Task::Avenues,
            lang,
            OutputShape::JsonStringArray,
        ))
        .with_response_schema(schema::string_array_schema());

        let response = self.call("generate_avenues", request).await?;
        let avenues = string_list(&response.text).ok_or_else(|| {
            malformed("generate_avenues", "avenues are not a JSON array", &response.text)
        })?;

        tracing::info!("Generated {} avenues", avenues.len());
        Ok(avenues)
    }

    /// Suggests up to five alternative phrasings for one field.
    ///
    /// Best effort: any failure yields an empty list.
    pub async fn suggest_field_text(
        &self,
        field_label: &str,
        current_draft: &str,
        context_snapshot: &Value,
        lang: Language,
    ) -> Vec<String> {
        let prompt = match self
            .prompts
            .field_suggestion(field_label, current_draft, context_snapshot, lang)
        {
            Ok(prompt) => prompt,
            Err(e) => {
                tracing::warn!("Suggestion prompt for '{}' failed: {}", field_label, e);
                return Vec::new();
            }
        };

        let request = ModelRequest::new(&self.settings.fast_model, prompt)
            .with_response_schema(schema::string_array_schema())
            .with_thinking_budget(0);

        match self.provider.generate(request).await {
            Ok(response) => {
                let mut suggestions = string_list(&response.text).unwrap_or_else(|| {
                    tracing::warn!("Suggestions for '{}' were not a JSON array", field_label);
                    Vec::new()
                });
                suggestions.truncate(MAX_SUGGESTIONS);
                suggestions
            }
            Err(e) => {
                tracing::warn!("Suggestions for '{}' failed: {}", field_label, e);
                Vec::new()
            }
        }
    }

    async fn call(
        &self,
        operation: &str,
        request: ModelRequest,
    ) -> Result<strata_core::provider::ModelResponse, GatewayError> {
        tracing::debug!(
            "{}: model={}, prompt={} chars",
            operation,
            request.model,
            request.user_text.len()
        );
        self.provider.generate(request).await.map_err(|e| {
            tracing::error!("{} failed: {}", operation, e);
            GatewayError::from(e)
        })
    }
}

/// Diagnosis as context for field suggestions, without bulky raw material.
pub fn suggestion_context(diagnosis: &DiagnosisInput) -> Value {
    let mut value = serde_json::to_value(diagnosis).unwrap_or(Value::Null);
    if let Some(object) = value.as_object_mut() {
        object.remove("screenshots");
        object.remove("briefingFileContent");
        object.remove("briefingExtraction");
    }
    value
}

fn malformed(operation: &str, reason: &str, raw: &str) -> GatewayError {
    let preview: String = raw.chars().take(200).collect();
    tracing::error!("{}: {}; response starts with: {:?}", operation, reason, preview);
    GatewayError::MalformedResponse(reason.to_string())
}

fn inline_images(diagnosis: &DiagnosisInput) -> Vec<InlineImage> {
    diagnosis
        .screenshots
        .iter()
        .map(|shot| InlineImage {
            mime_type: shot.mime_type.clone(),
            data: shot.data.clone(),
        })
        .collect()
}

/// Reads `key` as text, tolerating lists and scalars where a string was asked for.
fn text_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(text)) => text.trim().to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => text.trim().to_string(),
                other => other.to_string(),
            })
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    }
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

fn parse_involvement(text: &str) -> Option<InvolvementLevel> {
    text.parse::<InvolvementLevel>()
        .or_else(|_| format!("{} Involvement", text).parse())
        .ok()
        .filter(|level| *level != InvolvementLevel::Unset)
}

fn parse_funnel_stage(text: &str) -> Option<FunnelStage> {
    text.parse::<FunnelStage>()
        .ok()
        .filter(|stage| *stage != FunnelStage::Unset)
}

fn briefing_patch(value: &Value) -> DiagnosisPatch {
    let consumer = value.get("consumerContext").unwrap_or(&Value::Null);
    let consumer_patch = ConsumerContextPatch {
        involvement: parse_involvement(&text_field(consumer, "involvement")),
        funnel_stage: parse_funnel_stage(&text_field(consumer, "funnelStage")),
        barriers: non_empty(text_field(consumer, "barriers")),
    };

    DiagnosisPatch {
        sector: non_empty(text_field(value, "sector")),
        market: non_empty(text_field(value, "market")),
        product_or_service: non_empty(text_field(value, "productOrService")),
        customer_type: non_empty(text_field(value, "customerType")),
        business_challenge: non_empty(text_field(value, "businessChallenge")),
        customer_challenge: non_empty(text_field(value, "customerChallenge")),
        current_strategy_attempt: non_empty(text_field(value, "currentStrategyAttempt")),
        consumer_context: (consumer_patch != ConsumerContextPatch::default())
            .then_some(consumer_patch),
        ..Default::default()
    }
}

/// Builds the challenge from a schema-mode object; missing keys become "".
fn challenge_from_json(value: &Value) -> FormulatedChallenge {
    FormulatedChallenge {
        strategic_alternative_a: text_field(value, "strategicAlternativeA"),
        strategic_alternative_b: text_field(value, "strategicAlternativeB"),
        strategic_alternative_c: text_field(value, "strategicAlternativeC"),
        selected_alternative: Alternative::Unset,
        cultural_tension: text_field(value, "culturalTension"),
        market_opportunity: text_field(value, "marketOpportunity"),
        consumer_insight: text_field(value, "consumerInsight"),
        rumelt_diagnosis: text_field(value, "rumeltDiagnosis"),
        rumelt_guiding_policy: text_field(value, "rumeltGuidingPolicy"),
        behavioral_justification: text_field(value, "behavioralJustification"),
        key_assumptions: text_field(value, "keyAssumptions"),
        relevant_mental_models: text_field(value, "relevantMentalModels"),
    }
}

/// Builds the challenge from the text contract.
///
/// Without a single recognizable heading the whole answer goes into the
/// diagnosis, so the user still sees what the model said.
fn challenge_from_sections(text: &str) -> FormulatedChallenge {
    let headings: Vec<&str> = CHALLENGE_HEADINGS.iter().map(|(_, heading)| *heading).collect();
    let bodies = parse_sections(text, &headings);

    if bodies.iter().all(Option::is_none) {
        tracing::warn!("No section headings found; keeping the raw answer as the diagnosis");
        return FormulatedChallenge {
            rumelt_diagnosis: text.trim().to_string(),
            ..Default::default()
        };
    }

    let object: serde_json::Map<String, Value> = CHALLENGE_HEADINGS
        .iter()
        .zip(bodies)
        .filter_map(|((key, _), body)| body.map(|body| (key.to_string(), Value::String(body))))
        .collect();
    challenge_from_json(&Value::Object(object))
}

/// Reads a list of strings, accepting an object that wraps the list.
fn string_list(raw: &str) -> Option<Vec<String>> {
    let value = repair_json(raw, JsonShape::Array)
        .or_else(|| {
            repair_json(raw, JsonShape::Object)?
                .as_object()?
                .values()
                .find(|value| value.is_array())
                .cloned()
        })?;

    let items = value.as_array()?;
    Some(
        items
            .iter()
            .map(|item| match item {
                Value::String(text) => text.trim().to_string(),
                other => other.to_string(),
            })
            .filter(|item| !item.is_empty())
            .collect(),
    )
}
